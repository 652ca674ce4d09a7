//! Reactive state cells
//!
//! A [`StateCell`] holds one value and notifies subscribers when it actually
//! changes. Writes of an equal value are dropped, so a synchronizer can write
//! on every pass without waking readers.

use tokio::sync::watch;

/// Observable value
#[derive(Debug)]
pub struct StateCell<T> {
    tx: watch::Sender<T>,
}

impl<T> StateCell<T>
where
    T: Clone + PartialEq,
{
    /// Cell holding `initial`
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Current value
    #[must_use]
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Inspect the current value without cloning
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Store `value`, notifying subscribers if it differs
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    /// Compute the next value from the current one
    ///
    /// `f` runs under the cell's lock. Returning `Ok(None)` leaves the value
    /// untouched; errors are passed through without modifying the cell.
    ///
    /// # Errors
    /// Whatever `f` returns.
    pub fn try_update<E>(&self, f: impl FnOnce(&T) -> Result<Option<T>, E>) -> Result<bool, E> {
        let mut outcome = Ok(false);
        self.tx.send_if_modified(|current| match f(current) {
            Ok(Some(next)) if next != *current => {
                *current = next;
                outcome = Ok(true);
                true
            }
            Ok(_) => false,
            Err(err) => {
                outcome = Err(err);
                false
            }
        });
        outcome
    }

    /// Receiver notified on every change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T> Default for StateCell<T>
where
    T: Clone + PartialEq + Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}
