//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target.
//!
//! Native targets require `Send + Sync` so bridge implementations can be shared
//! across tokio tasks. WebAssembly builds run on the browser's single thread and
//! hold `JsValue` handles, which are neither `Send` nor `Sync`.

/// Marker trait that applies `Send + Sync` on native targets while becoming a
/// no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}

/// Boxed future that is `Send` wherever the target allows it.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformBoxFuture<'a, T> = futures::future::BoxFuture<'a, T>;

#[cfg(target_arch = "wasm32")]
pub type PlatformBoxFuture<'a, T> = futures::future::LocalBoxFuture<'a, T>;

/// Box a future with the bound that matches the current target.
#[cfg(not(target_arch = "wasm32"))]
pub fn boxed<'a, F>(future: F) -> PlatformBoxFuture<'a, F::Output>
where
    F: std::future::Future + Send + 'a,
{
    Box::pin(future)
}

#[cfg(target_arch = "wasm32")]
pub fn boxed<'a, F>(future: F) -> PlatformBoxFuture<'a, F::Output>
where
    F: std::future::Future + 'a,
{
    Box::pin(future)
}

