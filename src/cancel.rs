//! Cooperative, poll-based cancellation.
//!
//! A [`CancellationToken`] is handed to long-running calls such as
//! [`crate::ResourceCodec::load`]. The callee polls it between units of work;
//! nothing is interrupted mid-entry.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::error::Error;

/// A clonable cancellation flag. All clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns `Err(Error::Cancelled)` when cancellation was requested.
    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Wraps an entry iterator so that the token is polled before every item.
///
/// Once cancellation is observed the adapter yields a single
/// `Err(Error::Cancelled)` and then ends, without advancing the inner iterator.
/// After the inner iterator yields an error the adapter also ends.
pub(crate) struct Cancellable<I> {
    inner: I,
    token: CancellationToken,
    done: bool,
}

impl<I> Cancellable<I> {
    pub(crate) fn new(inner: I, token: CancellationToken) -> Self {
        Self {
            inner,
            token,
            done: false,
        }
    }
}

impl<I, T> Iterator for Cancellable<I>
where
    I: Iterator<Item = Result<T, Error>>,
{
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.token.is_cancelled() {
            self.done = true;
            return Some(Err(Error::Cancelled));
        }
        match self.inner.next() {
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            Some(Ok(item)) => Some(Ok(item)),
            None => {
                self.done = true;
                None
            }
        }
    }
}
