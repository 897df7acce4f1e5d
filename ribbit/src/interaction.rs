use core::fmt;

use embedded_time::Instant;
use ribbit_msg::{Id, Message, Token, Type};
use std_alloc::boxed::Box;
use std_alloc::vec::Vec;

use crate::net::Addrd;
use crate::retry::{Attempts, RetryTimer};
use crate::time::Clock;

/// Where an [`Interaction`] is in its lifecycle
///
/// ```text
///  Created ──send──▶ WaitingResponse ──match──▶ ResponseReceived ──▶ Finished
///                        │    ▲
///                        │    └─ retransmit
///                        └──── retries exhausted / timeout ──▶ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
  /// Registered, but the request has not been successfully sent yet
  Created,
  /// The request went out at least once and we are waiting
  /// for something that matches it
  WaitingResponse,
  /// A matching response arrived and is being handed to the handler
  ResponseReceived,
  /// The handler has been given a response (or a reset)
  Finished,
  /// The handler has been told that the exchange timed out
  Failed,
}

impl State {
  /// Whether the interaction will never change state again
  pub fn is_terminal(&self) -> bool {
    matches!(self, State::Finished | State::Failed)
  }
}

/// Why an interaction did not yield a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Failure {
  /// Gave up waiting.
  ///
  /// For CON requests, `attempts` is the number of retransmissions
  /// performed before giving up.
  Timeout {
    /// Number of retransmissions (or send retries) performed
    attempts: Attempts,
  },
  /// The remote endpoint rejected the request with a Reset
  Reset,
}

/// What a [`Handler`] is given when an interaction completes
pub type Outcome = Result<Addrd<Message>, Failure>;

/// Single-shot completion for an interaction
///
/// Any `FnOnce(Outcome)` is a handler; see also
/// [`completion::channel`](crate::completion::channel).
pub trait Handler {
  /// Consume the handler with the outcome of the interaction
  fn handle(self: Box<Self>, outcome: Outcome);
}

impl<F: FnOnce(Outcome)> Handler for F {
  fn handle(self: Box<Self>, outcome: Outcome) {
    (*self)(outcome)
  }
}

/// A single request/response exchange that is in-flight (or recently finished)
pub struct Interaction<C: Clock> {
  request: Addrd<Message>,
  dgram: Vec<u8>,
  state: State,
  retry: Option<RetryTimer<C>>,
  expires_at: Option<Instant<C>>,
  acked: bool,
  created_at: Instant<C>,
  handler: Option<Box<dyn Handler>>,
  settled_at: Option<Instant<C>>,
  observed: bool,
}

impl<C: Clock> fmt::Debug for Interaction<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Interaction")
     .field("request", &self.request)
     .field("state", &self.state)
     .field("retry", &self.retry)
     .field("expires_at", &self.expires_at)
     .field("acked", &self.acked)
     .field("created_at", &self.created_at)
     .field("has_handler", &self.handler.is_some())
     .field("settled_at", &self.settled_at)
     .field("observed", &self.observed)
     .finish()
  }
}

impl<C: Clock> Interaction<C> {
  /// Create an interaction for a request that has already been
  /// encoded to `dgram`.
  pub fn new(request: Addrd<Message>,
             dgram: Vec<u8>,
             created_at: Instant<C>,
             handler: Box<dyn Handler>)
             -> Self {
    Self { request,
           dgram,
           state: State::Created,
           retry: None,
           expires_at: None,
           acked: false,
           created_at,
           handler: Some(handler),
           settled_at: None,
           observed: false }
  }

  /// The request, and the endpoint it is sent to
  pub fn request(&self) -> Addrd<&Message> {
    self.request.as_ref()
  }

  /// The encoded request
  pub fn dgram(&self) -> Addrd<&[u8]> {
    Addrd(self.dgram.as_slice(), self.request.addr())
  }

  /// Current state
  pub fn state(&self) -> State {
    self.state
  }

  /// When the interaction was submitted
  pub fn created_at(&self) -> Instant<C> {
    self.created_at
  }

  /// The request's token
  pub fn token(&self) -> Token {
    self.request.data().token
  }

  /// The request's message ID
  pub fn id(&self) -> Id {
    self.request.data().id
  }

  /// Whether the request is confirmable
  pub fn is_con(&self) -> bool {
    self.request.data().ty == Type::Con
  }

  /// Whether an empty ACK has been received for the request
  pub fn is_acked(&self) -> bool {
    self.acked
  }

  /// How many times the request was re-sent
  pub fn retransmit_count(&self) -> Attempts {
    self.retry.as_ref().map(|r| r.attempts()).unwrap_or_default()
  }

  /// When the request will next be re-sent, if ever
  pub fn next_retransmit_deadline(&self) -> Option<Instant<C>> {
    if self.acked || self.state.is_terminal() {
      return None;
    }

    self.retry.as_ref().and_then(|r| r.deadline())
  }

  pub(crate) fn retry_mut(&mut self) -> Option<&mut RetryTimer<C>> {
    self.retry.as_mut()
  }

  pub(crate) fn set_retry(&mut self, retry: Option<RetryTimer<C>>) {
    self.retry = retry;
  }

  pub(crate) fn expires_at(&self) -> Option<Instant<C>> {
    self.expires_at
  }

  pub(crate) fn set_expires_at(&mut self, at: Option<Instant<C>>) {
    self.expires_at = at;
  }

  pub(crate) fn settled_at(&self) -> Option<Instant<C>> {
    self.settled_at
  }

  /// Remember when the interaction was first seen terminal
  pub(crate) fn settle(&mut self, now: Instant<C>) {
    self.settled_at.get_or_insert(now);
  }

  pub(crate) fn is_observed(&self) -> bool {
    self.observed
  }

  pub(crate) fn observe(&mut self) {
    self.observed = true;
  }

  /// The request was sent successfully (for the first time)
  pub(crate) fn sent(&mut self) {
    if self.state == State::Created {
      self.state = State::WaitingResponse;
    }
  }

  /// An empty ACK arrived; stop retransmitting and wait for the separate response
  pub(crate) fn ack(&mut self) {
    self.acked = true;
    self.expires_at = None;
  }

  /// A matching response arrived; hand it to the handler
  pub(crate) fn respond(&mut self, rep: Addrd<Message>) {
    if self.state.is_terminal() {
      return;
    }

    self.state = State::ResponseReceived;
    self.complete(State::Finished, Ok(rep));
  }

  /// Give up on the interaction, telling the handler why
  pub(crate) fn fail(&mut self, failure: Failure) {
    let state = match failure {
      | Failure::Reset => State::Finished,
      | Failure::Timeout { .. } => State::Failed,
    };

    self.complete(state, Err(failure));
  }

  fn complete(&mut self, state: State, outcome: Outcome) {
    if self.state.is_terminal() {
      return;
    }

    self.state = state;
    self.expires_at = None;

    if let Some(handler) = self.handler.take() {
      handler.handle(outcome);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::rc::Rc;

  use ribbit_msg::Code;

  use super::*;
  use crate::test::{at, dummy_addr, ClockMock};

  fn interaction(outcomes: Rc<RefCell<Vec<Outcome>>>) -> Interaction<ClockMock> {
    let req = Message::new(Type::Con, Code::GET, Id(1), Token::opaque(b"a"));
    Interaction::new(Addrd(req, dummy_addr()),
                     vec![],
                     at(0),
                     Box::new(move |o: Outcome| outcomes.borrow_mut().push(o)))
  }

  #[test]
  fn respond_then_finished() {
    let outcomes = Rc::new(RefCell::new(vec![]));
    let mut ixn = interaction(outcomes.clone());
    assert_eq!(ixn.state(), State::Created);

    ixn.sent();
    assert_eq!(ixn.state(), State::WaitingResponse);

    let rep = Message::new(Type::Ack, Code::new(2, 5), Id(1), Token::opaque(b"a"));
    ixn.respond(Addrd(rep.clone(), dummy_addr()));

    assert_eq!(ixn.state(), State::Finished);
    assert_eq!(ixn.next_retransmit_deadline(), None);
    assert_eq!(outcomes.borrow().as_slice(), &[Ok(Addrd(rep, dummy_addr()))]);
  }

  #[test]
  fn handler_called_once() {
    let outcomes = Rc::new(RefCell::new(vec![]));
    let mut ixn = interaction(outcomes.clone());
    ixn.sent();

    ixn.fail(Failure::Timeout { attempts: Attempts(4) });
    ixn.fail(Failure::Reset);

    assert_eq!(ixn.state(), State::Failed);
    assert_eq!(outcomes.borrow().as_slice(),
               &[Err(Failure::Timeout { attempts: Attempts(4) })]);
  }

  #[test]
  fn reset_finishes() {
    let outcomes = Rc::new(RefCell::new(vec![]));
    let mut ixn = interaction(outcomes.clone());
    ixn.sent();
    ixn.fail(Failure::Reset);

    assert_eq!(ixn.state(), State::Finished);
    assert!(ixn.state().is_terminal());

    ixn.settle(at(10));
    ixn.settle(at(20));
    assert_eq!(ixn.settled_at(), Some(at(10)));
    assert_eq!(outcomes.borrow().as_slice(), &[Err(Failure::Reset)]);
  }
}
