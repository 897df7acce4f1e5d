//! A one-shot slot that an [`Engine`](crate::engine::Engine) fills
//! with the [`Outcome`] of an interaction, and the submitter polls.
//!
//! ```
//! use ribbit::completion::{self, Canceled};
//! use ribbit::interaction::{Failure, Handler};
//!
//! let (tx, rx) = completion::channel();
//! assert_eq!(rx.poll(), Err(nb::Error::WouldBlock));
//!
//! Box::new(tx).handle(Err(Failure::Reset));
//! assert_eq!(rx.poll(), Ok(Err(Failure::Reset)));
//!
//! // taken; nothing will ever arrive again
//! assert_eq!(rx.poll(), Err(nb::Error::Other(Canceled)));
//! ```

use core::cell::RefCell;
use std_alloc::boxed::Box;
use std_alloc::rc::Rc;

use crate::interaction::{Handler, Outcome};

#[derive(Debug)]
enum Slot {
  Pending,
  Ready(Outcome),
  Done,
}

/// The outcome will never arrive: the interaction was canceled
/// (its handler dropped) or the outcome was already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Canceled;

/// Sending half of a completion channel; give it to
/// [`Engine::submit`](crate::engine::Engine::submit) as the handler.
#[derive(Debug)]
pub struct Sender(Rc<RefCell<Slot>>);

/// Receiving half of a completion channel
#[derive(Debug)]
pub struct Receiver(Rc<RefCell<Slot>>);

/// Create a completion channel
pub fn channel() -> (Sender, Receiver) {
  let slot = Rc::new(RefCell::new(Slot::Pending));
  (Sender(slot.clone()), Receiver(slot))
}

impl Handler for Sender {
  fn handle(self: Box<Self>, outcome: Outcome) {
    *self.0.borrow_mut() = Slot::Ready(outcome);
  }
}

impl Drop for Sender {
  fn drop(&mut self) {
    let mut slot = self.0.borrow_mut();
    if matches!(*slot, Slot::Pending) {
      *slot = Slot::Done;
    }
  }
}

impl Receiver {
  /// Take the outcome if it has arrived.
  ///
  /// Yields [`nb::Error::WouldBlock`] while the interaction is in flight,
  /// and [`Canceled`] once the outcome can no longer arrive.
  pub fn poll(&self) -> nb::Result<Outcome, Canceled> {
    let mut slot = self.0.borrow_mut();

    match core::mem::replace(&mut *slot, Slot::Done) {
      | Slot::Ready(outcome) => Ok(outcome),
      | Slot::Pending => {
        *slot = Slot::Pending;
        Err(nb::Error::WouldBlock)
      },
      | Slot::Done => Err(nb::Error::Other(Canceled)),
    }
  }
}
