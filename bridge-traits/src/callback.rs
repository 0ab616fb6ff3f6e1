//! One-shot bridge from callback-style host APIs to a single awaitable value.
//!
//! Popup token clients and revoke endpoints in the browser report their result
//! through a callback. [`completion`] returns a [`Completer`] to hand to that
//! callback and a [`Completion`] future to await. The pair resolves exactly
//! once: either with the value passed to [`Completer::complete`], or with
//! [`CallbackDropped`] when the completer is dropped without firing (for
//! example, when the host tears down the popup handler). The future therefore
//! never stays pending after the host has let go of the callback.
//!
//! # Example
//!
//! ```
//! use bridge_traits::callback::completion;
//!
//! # futures::executor::block_on(async {
//! let (completer, pending) = completion::<u32>();
//! completer.complete(7);
//! assert_eq!(pending.await, Ok(7));
//! # });
//! ```

use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use thiserror::Error;

/// The callback was released without reporting a result.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("callback was dropped before it reported a result")]
pub struct CallbackDropped;

/// Sending half of a one-shot callback bridge.
///
/// Cloneable so it can be captured by several host closures (e.g. a success
/// callback and an error callback); only the first `complete` wins.
pub struct Completer<T> {
    sender: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Completer<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T> Completer<T> {
    /// Resolve the paired [`Completion`].
    ///
    /// Returns `false` if a value was already delivered or the receiver is gone.
    pub fn complete(&self, value: T) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(sender) => sender.send(value).is_ok(),
            None => false,
        }
    }
}

/// Receiving half of a one-shot callback bridge.
pub struct Completion<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> Future for Completion<T> {
    type Output = Result<T, CallbackDropped>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| CallbackDropped))
    }
}

/// Create a connected [`Completer`] / [`Completion`] pair.
pub fn completion<T>() -> (Completer<T>, Completion<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Completer {
            sender: Arc::new(Mutex::new(Some(sender))),
        },
        Completion { receiver },
    )
}
