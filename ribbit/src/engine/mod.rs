//! # The exchange engine
//!
//! An [`Engine`] owns every in-flight request and advances them only when
//! asked to:
//!
//!  - [`Engine::submit`] registers a request and sends it for the first time
//!  - [`Engine::tick`] retransmits CON requests whose deadline elapsed,
//!    fails interactions that ran out of attempts or time, and forgets
//!    finished interactions
//!  - [`Engine::deliver`] matches a received datagram to the interaction it
//!    answers and hands the response to that interaction's [`Handler`]
//!  - [`Engine::state_of`] reports progress, and lets the engine forget
//!    an interaction once its terminal state has been seen
//!
//! The engine never reads a clock and never receives from the transport;
//! the caller passes `now` in and feeds received datagrams to `deliver`.
//! Nothing blocks.

use core::fmt;

use embedded_time::Instant;
use no_std_net::SocketAddr;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ribbit_msg::{CodeKind, Id, Message, Token, TryFromBytes, TryIntoBytes, Type};
use std_alloc::boxed::Box;

use crate::config::Config;
use crate::interaction::{Failure, Handler, Interaction, State};
use crate::logging::msg_summary;
use crate::net::{Addrd, Transport};
use crate::provision::{IdGenerator, TokenGenerator};
use crate::registry::{Handle, InsertError, Registry};
use crate::retry::{RetryTimer, YouShould};
use crate::time::{self, Clock};

mod error;
#[doc(inline)]
pub use error::*;

/// What a call to [`Engine::tick`] did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Activity {
  /// Number of retransmissions attempted
  /// (including ones the transport failed to send)
  pub resent: usize,
  /// Number of interactions that failed
  pub failed: usize,
  /// Number of terminal interactions that were forgotten
  pub reaped: usize,
}

/// What a call to [`Engine::deliver`] did with a datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivered {
  /// The datagram completed an interaction; its handler has been invoked
  Completed(Handle),
  /// The datagram was an empty ACK; the interaction stopped retransmitting
  /// and waits for a separate response
  Acked(Handle),
  /// The datagram matched an interaction that already completed
  /// (or was already acknowledged) and was discarded
  Duplicate(Handle),
}

/// A client-side CoAP exchange engine
///
/// See the [module documentation](crate::engine) for an overview.
pub struct Engine<C: Clock, T: Transport> {
  config: Config,
  transport: T,
  registry: Registry<C>,
  ids: IdGenerator,
  tokens: TokenGenerator,
  rand: ChaCha8Rng,
}

impl<C: Clock, T: Transport> fmt::Debug for Engine<C, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Engine")
     .field("config", &self.config)
     .field("registry", &self.registry)
     .field("ids", &self.ids)
     .field("tokens", &self.tokens)
     .finish()
  }
}

impl<C: Clock, T: Transport> Engine<C, T> {
  /// Create an engine with the default [`Config`]
  pub fn new(transport: T) -> Self {
    Self::new_config(Config::default(), transport)
  }

  /// Create an engine with a specific runtime config
  pub fn new_config(config: Config, transport: T) -> Self {
    let mut rand = ChaCha8Rng::seed_from_u64(config.msg.token_seed as u64);
    let ids = IdGenerator::new(rand.gen());
    let tokens = TokenGenerator::new(config.msg.token_seed);

    Self { config,
           transport,
           registry: Registry::new(),
           ids,
           tokens,
           rand }
  }

  /// Start the ID & token generators over, as if the engine was just created.
  ///
  /// Registered interactions are kept; generated IDs and tokens
  /// still skip the ones they hold.
  pub fn reinitialize(&mut self) {
    self.rand = ChaCha8Rng::seed_from_u64(self.config.msg.token_seed as u64);
    self.ids.reset(self.rand.gen());
    self.tokens.reset();
  }

  /// Runtime config
  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Borrow the transport
  pub fn transport(&self) -> &T {
    &self.transport
  }

  /// Borrow a registered interaction
  pub fn interaction(&self, handle: Handle) -> Option<&Interaction<C>> {
    self.registry.get(handle)
  }

  /// Number of registered interactions (including terminal ones
  /// that have not been forgotten yet)
  pub fn len(&self) -> usize {
    self.registry.len()
  }

  /// Whether there are no registered interactions
  pub fn is_empty(&self) -> bool {
    self.registry.is_empty()
  }

  /// The oldest registered interaction.
  ///
  /// `None` means there is nothing left to drive.
  pub fn longest_pending(&self) -> Option<Handle> {
    self.registry.longest_pending()
  }

  /// Generate a message ID not in use by any registered interaction
  pub fn next_id(&mut self) -> Option<Id> {
    let registry = &self.registry;
    self.ids.next(|id| registry.is_id_live(id))
  }

  /// Generate a token not in use by any registered interaction
  pub fn next_token(&mut self, now: Instant<C>) -> Option<Token> {
    let registry = &self.registry;
    self.tokens
        .next(time::epoch_millis(now), |t| registry.is_token_live(t))
  }

  /// Register a CON or NON request and send it to `addr`.
  ///
  /// A request with message ID `0` gets a generated ID, and a request
  /// with an empty token gets a generated token.
  ///
  /// The handler is invoked exactly once when the interaction completes
  /// or fails, and never if it is [canceled](Engine::cancel).
  ///
  /// A failure to send is not an error here; it counts as a retransmission
  /// attempt and the request is re-sent on the next [`tick`](Engine::tick).
  pub fn submit(&mut self,
                now: Instant<C>,
                mut msg: Message,
                addr: SocketAddr,
                handler: impl Handler + 'static)
                -> Result<Handle, Error> {
    let when = When::Submitting(addr);

    if !matches!(msg.ty, Type::Con | Type::Non) || !msg.is_request() {
      return Err(when.what(What::NotARequest));
    }

    if self.registry.len() >= self.config.max_interactions {
      return Err(when.what(What::RegistryFull));
    }

    if msg.id == Id(0) {
      msg.id = self.next_id()
                   .ok_or_else(|| when.what(What::IdsExhausted))?;
    } else if self.registry.is_id_live(msg.id) {
      return Err(when.what(What::IdInUse(msg.id)));
    }

    if msg.token.is_empty() {
      msg.token = self.next_token(now)
                      .ok_or_else(|| when.what(What::TokensExhausted))?;
    } else if self.registry.is_token_live(msg.token) {
      return Err(when.what(What::TokenInUse(msg.token)));
    }

    let dgram = msg.clone()
                   .try_into_bytes()
                   .map_err(|e| when.what(What::ToBytes(e)))?;

    let mut ixn = Interaction::new(Addrd(msg, addr), dgram, now, Box::new(handler));

    if ixn.is_con() {
      ixn.set_retry(Some(RetryTimer::new(now,
                                         self.config.msg.con.retry_strategy,
                                         self.config.msg.con.max_retransmits,
                                         &mut self.rand)));
    }

    let handle = self.registry.insert(ixn).map_err(|e| match e {
                                            | InsertError::IdInUse(id) => when.what(What::IdInUse(id)),
                                            | InsertError::TokenInUse(t) => {
                                              when.what(What::TokenInUse(t))
                                            },
                                          })?;

    let Self { config,
               transport,
               registry,
               .. } = self;

    if let Some(ixn) = registry.get_mut(handle) {
      log::debug!("{:?} registered {}", handle, msg_summary(ixn.request().data()));
      let ok = Self::transmit(transport, ixn);
      Self::after_send(config, ixn, now, ok);
    }

    Ok(handle)
  }

  /// Advance every registered interaction to `now`, oldest first:
  ///
  ///  - CON requests whose retransmission deadline elapsed are re-sent,
  ///    or failed with [`Failure::Timeout`] if they are out of attempts
  ///  - interactions waiting past their timeout (NON timeout, or the wait for
  ///    a separate response after an empty ACK) fail with [`Failure::Timeout`]
  ///  - terminal interactions whose state was observed with [`Engine::state_of`],
  ///    or that have been terminal longer than the exchange lifetime, are forgotten
  pub fn tick(&mut self, now: Instant<C>) -> Activity {
    let mut activity = Activity::default();
    let lifetime = self.config.exchange_lifetime_millis();

    let Self { config,
               transport,
               registry,
               .. } = self;

    for handle in registry.by_age() {
      let ixn = match registry.get_mut(handle) {
        | Some(ixn) => ixn,
        | None => continue,
      };

      if ixn.state().is_terminal() {
        ixn.settle(now);
        let stale = ixn.settled_at()
                       .map(|at| time::millis_since(now, at) >= lifetime)
                       .unwrap_or(false);

        if ixn.is_observed() || stale {
          log::debug!("{:?} forgotten ({:?})", handle, ixn.state());
          registry.remove(handle);
          activity.reaped += 1;
        }

        continue;
      }

      if ixn.is_acked() && ixn.expires_at().is_none() {
        ixn.set_expires_at(config.msg.con.acked_timeout.deadline(now));
      }

      if ixn.expires_at().map(|at| now >= at).unwrap_or(false) {
        log::debug!("{:?} timed out waiting for a response", handle);
        let attempts = ixn.retransmit_count();
        ixn.fail(Failure::Timeout { attempts });
        ixn.settle(now);
        activity.failed += 1;
        continue;
      }

      if ixn.is_acked() {
        continue;
      }

      let should = match ixn.retry_mut() {
        | Some(retry) => retry.what_should_i_do(now),
        | None => continue,
      };

      match should {
        | Ok(YouShould::Retry) => {
          log::debug!("{:?} retransmitting (attempt {})",
                      handle,
                      ixn.retransmit_count().0);
          let ok = Self::transmit(transport, ixn);
          Self::after_send(config, ixn, now, ok);
          activity.resent += 1;
        },
        | Ok(YouShould::Cry) => {
          let attempts = ixn.retransmit_count();
          log::debug!("{:?} failed after {} retransmissions", handle, attempts.0);
          ixn.fail(Failure::Timeout { attempts });
          ixn.settle(now);
          activity.failed += 1;
        },
        | Err(nb::Error::WouldBlock) => (),
        | Err(nb::Error::Other(never)) => match never {},
      }
    }

    activity
  }

  /// Match a datagram received from `sender` to the interaction it answers.
  ///
  /// - ACKs and Resets are matched by message ID; a piggybacked response
  ///   must also carry the request's token
  /// - CON and NON responses are matched by token. CON responses are
  ///   acknowledged; a CON response that matches nothing is rejected with a Reset.
  ///
  /// Engine state only changes when the datagram decodes and matches.
  pub fn deliver(&mut self, bytes: &[u8], sender: SocketAddr) -> Result<Delivered, Error> {
    let when = When::Delivering(sender);
    let msg = Message::try_from_bytes(bytes).map_err(|e| when.what(What::FromBytes(e)))?;

    log::trace!("recvd {} <- {}", msg_summary(&msg), sender);

    match msg.ty {
      | Type::Ack | Type::Reset => self.deliver_ack_or_reset(msg, sender),
      | Type::Con | Type::Non => self.deliver_response(msg, sender),
    }
  }

  /// Get the state of an interaction.
  ///
  /// Once a terminal state has been returned, the interaction
  /// is forgotten on the next [`tick`](Engine::tick).
  pub fn state_of(&mut self, handle: Handle) -> Option<State> {
    self.registry.get_mut(handle).map(|ixn| {
                                   let state = ixn.state();
                                   if state.is_terminal() {
                                     ixn.observe();
                                   }
                                   state
                                 })
  }

  /// Forget an interaction without invoking its handler.
  ///
  /// Returns whether the interaction was registered.
  pub fn cancel(&mut self, handle: Handle) -> bool {
    match self.registry.remove(handle) {
      | Some(ixn) => {
        log::debug!("{:?} canceled ({:?})", handle, ixn.state());
        true
      },
      | None => false,
    }
  }

  fn deliver_ack_or_reset(&mut self,
                          msg: Message,
                          sender: SocketAddr)
                          -> Result<Delivered, Error> {
    let unmatched = When::Delivering(sender).what(What::Unmatched);

    let handle = self.registry
                     .find_by_id(msg.id, sender)
                     .ok_or(unmatched)?;
    let ixn = self.registry.get_mut(handle).ok_or(unmatched)?;

    if ixn.state().is_terminal() {
      log::trace!("{:?} already finished; ignoring {:?}", handle, msg.ty);
      return Ok(Delivered::Duplicate(handle));
    }

    match (msg.ty, msg.code.kind()) {
      | (Type::Reset, _) => {
        log::debug!("{:?} was reset", handle);
        ixn.fail(Failure::Reset);
        Ok(Delivered::Completed(handle))
      },
      | (_, CodeKind::Empty) if ixn.is_acked() => Ok(Delivered::Duplicate(handle)),
      | (_, CodeKind::Empty) => {
        log::debug!("{:?} was acked; waiting for a separate response", handle);
        ixn.ack();
        Ok(Delivered::Acked(handle))
      },
      | (_, CodeKind::Response) if msg.token == ixn.token() => {
        log::debug!("{:?} got piggybacked response {}", handle, msg_summary(&msg));
        ixn.respond(Addrd(msg, sender));
        Ok(Delivered::Completed(handle))
      },
      | _ => Err(unmatched),
    }
  }

  fn deliver_response(&mut self, msg: Message, sender: SocketAddr) -> Result<Delivered, Error> {
    let unmatched = When::Delivering(sender).what(What::Unmatched);
    let con = msg.ty == Type::Con;

    let handle = match msg.is_response() {
      | true => self.registry.find_by_token(msg.token, sender),
      | false => None,
    };

    let handle = match handle {
      | Some(handle) => handle,
      | None => {
        if con {
          log::trace!("rejecting unmatched {}", msg_summary(&msg));
          Self::send_empty(&self.transport, Addrd(msg.reset(), sender));
        }
        return Err(unmatched);
      },
    };

    if con {
      Self::send_empty(&self.transport, Addrd(msg.ack(), sender));
    }

    let ixn = self.registry.get_mut(handle).ok_or(unmatched)?;

    if ixn.state().is_terminal() {
      log::trace!("{:?} already finished; ignoring duplicate response", handle);
      return Ok(Delivered::Duplicate(handle));
    }

    log::debug!("{:?} got response {}", handle, msg_summary(&msg));
    ixn.respond(Addrd(msg, sender));
    Ok(Delivered::Completed(handle))
  }

  fn transmit(transport: &T, ixn: &Interaction<C>) -> bool {
    let dgram = ixn.dgram();
    log::trace!("sending {} -> {}",
                msg_summary(ixn.request().data()),
                dgram.addr());

    match transport.send(dgram) {
      | Ok(()) => {
        log::trace!("sent {}b -> {}", dgram.data().len(), dgram.addr());
        true
      },
      | Err(nb::Error::WouldBlock) => {
        log::warn!("transport not ready to send to {}", dgram.addr());
        false
      },
      | Err(nb::Error::Other(e)) => {
        log::warn!("failed to send to {}: {:?}", dgram.addr(), e);
        false
      },
    }
  }

  fn after_send(config: &Config, ixn: &mut Interaction<C>, now: Instant<C>, ok: bool) {
    if ok {
      if ixn.state() == State::Created && !ixn.is_con() {
        ixn.set_retry(None);
        ixn.set_expires_at(config.msg.non.timeout.deadline(now));
      }

      ixn.sent();
      return;
    }

    match ixn.retry_mut() {
      | Some(retry) => retry.expire(now),
      | None => {
        ixn.set_retry(Some(RetryTimer::immediate(now, config.msg.non.max_send_attempts)))
      },
    }
  }

  fn send_empty(transport: &T, msg: Addrd<Message>) {
    let addr = msg.addr();
    let result = msg.unwrap()
                    .try_into_bytes()
                    .map_err(|e| log::warn!("failed to serialize {:?}", e))
                    .map(|bytes| transport.send(Addrd(bytes.as_slice(), addr)));

    if let Ok(Err(e)) = result {
      log::warn!("failed to send to {}: {:?}", addr, e);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::rc::Rc;

  use embedded_time::duration::Milliseconds;
  use ribbit_msg::{Code, Payload};

  use super::*;
  use crate::completion::{self, Canceled};
  use crate::interaction::Outcome;
  use crate::retry::{Attempts, Strategy};
  use crate::test::{at, dummy_addr, other_addr, ClockMock, TransportMock};
  use crate::time::Timeout;

  type Outcomes = Rc<RefCell<Vec<Outcome>>>;

  fn config() -> Config {
    let mut config = Config::default();
    config.msg.con.retry_strategy = Strategy::Exponential { init_min: Milliseconds(1000),
                                                            init_max: Milliseconds(1000) };
    config
  }

  fn engine() -> Engine<ClockMock, TransportMock> {
    Engine::new_config(config(), TransportMock::new())
  }

  fn recorder() -> (Outcomes, impl Handler + 'static) {
    let outcomes: Outcomes = Default::default();
    let sink = outcomes.clone();
    (outcomes, move |o: Outcome| sink.borrow_mut().push(o))
  }

  fn get(ty: Type) -> Message {
    Message::new(ty, Code::GET, Id(0), Token::default())
  }

  fn submitted(engine: &mut Engine<ClockMock, TransportMock>, ty: Type) -> (Handle, Message, Outcomes) {
    let (outcomes, handler) = recorder();
    let handle = engine.submit(at(0), get(ty), dummy_addr(), handler).unwrap();
    let req = engine.interaction(handle).unwrap().request().unwrap().clone();
    (handle, req, outcomes)
  }

  fn bytes(msg: Message) -> Vec<u8> {
    msg.try_into_bytes().unwrap()
  }

  fn content(ty: Type, id: Id, token: Token) -> Message {
    let mut rep = Message::new(ty, Code::new(2, 5), id, token);
    rep.payload = Payload(b"hi".to_vec());
    rep
  }

  #[test]
  fn submit_provisions_and_sends() {
    let mut engine = engine();
    let (handle, req, _) = submitted(&mut engine, Type::Con);

    assert_ne!(req.id, Id(0));
    assert_eq!(req.token.len(), 8);
    assert_eq!(engine.state_of(handle), Some(State::WaitingResponse));
    assert_eq!(engine.transport().take_sent(), vec![Addrd(req, dummy_addr())]);
  }

  #[test]
  fn submit_rejects_non_requests() {
    let mut engine = engine();
    let (_, handler) = recorder();
    let ack = Message::new(Type::Ack, Code::GET, Id(1), Token::default());
    assert_eq!(engine.submit(at(0), ack, dummy_addr(), handler).unwrap_err().what,
               What::NotARequest);

    let (_, handler) = recorder();
    let rep = content(Type::Con, Id(1), Token::default());
    assert_eq!(engine.submit(at(0), rep, dummy_addr(), handler).unwrap_err().what,
               What::NotARequest);
    assert!(engine.is_empty());
  }

  #[test]
  fn submit_rejects_colliding_token_and_id() {
    let mut engine = engine();
    let token = Token::opaque(b"taken");

    let mut a = get(Type::Con);
    a.token = token;
    a.id = Id(5);
    let (_, handler) = recorder();
    engine.submit(at(0), a.clone(), dummy_addr(), handler).unwrap();

    let mut b = a.clone();
    b.id = Id(6);
    let (_, handler) = recorder();
    let err = engine.submit(at(0), b, dummy_addr(), handler).unwrap_err();
    assert_eq!(err.what, What::TokenInUse(token));
    assert_eq!(err.when, When::Submitting(dummy_addr()));

    let mut c = a;
    c.token = Token::opaque(b"free");
    let (_, handler) = recorder();
    let err = engine.submit(at(0), c, dummy_addr(), handler).unwrap_err();
    assert_eq!(err.what, What::IdInUse(Id(5)));

    assert_eq!(engine.len(), 1);
  }

  #[test]
  fn submit_rejects_when_full() {
    let mut config = config();
    config.max_interactions = 1;
    let mut engine = Engine::<ClockMock, _>::new_config(config, TransportMock::new());

    submitted(&mut engine, Type::Con);
    let (_, handler) = recorder();
    assert_eq!(engine.submit(at(0), get(Type::Con), dummy_addr(), handler)
                     .unwrap_err()
                     .what,
               What::RegistryFull);
  }

  #[test]
  fn con_times_out() {
    let mut engine = engine();
    let (handle, _, outcomes) = submitted(&mut engine, Type::Con);

    assert_eq!(engine.tick(at(999)), Activity::default());

    for now in [1_000, 3_000, 7_000, 15_000] {
      assert_eq!(engine.tick(at(now)).resent, 1);
    }

    assert_eq!(engine.tick(at(30_999)), Activity::default());
    assert_eq!(engine.tick(at(31_000)).failed, 1);

    assert_eq!(engine.transport().sent_count(), 5);
    assert_eq!(outcomes.borrow().as_slice(),
               &[Err(Failure::Timeout { attempts: Attempts(4) })]);

    assert_eq!(engine.state_of(handle), Some(State::Failed));
    assert_eq!(engine.tick(at(31_001)).reaped, 1);
    assert_eq!(engine.longest_pending(), None);
  }

  #[test]
  fn retransmits_identical_bytes() {
    let mut engine = engine();
    submitted(&mut engine, Type::Con);
    engine.tick(at(1_000));

    let sent = engine.transport().tx.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
  }

  #[test]
  fn piggybacked_response() {
    let mut engine = engine();
    let (handle, req, outcomes) = submitted(&mut engine, Type::Con);

    let rep = content(Type::Ack, req.id, req.token);
    assert_eq!(engine.deliver(&bytes(rep.clone()), dummy_addr()),
               Ok(Delivered::Completed(handle)));

    assert_eq!(outcomes.borrow().as_slice(), &[Ok(Addrd(rep.clone(), dummy_addr()))]);
    assert_eq!(engine.tick(at(1_000)).resent, 0);

    assert_eq!(engine.deliver(&bytes(rep), dummy_addr()),
               Ok(Delivered::Duplicate(handle)));
    assert_eq!(outcomes.borrow().len(), 1);

    assert_eq!(engine.state_of(handle), Some(State::Finished));
    engine.tick(at(1_001));
    assert_eq!(engine.state_of(handle), None);
  }

  #[test]
  fn piggybacked_response_needs_token() {
    let mut engine = engine();
    let (_, req, outcomes) = submitted(&mut engine, Type::Con);

    let rep = content(Type::Ack, req.id, Token::opaque(b"other"));
    assert!(engine.deliver(&bytes(rep), dummy_addr())
                  .unwrap_err()
                  .is_unmatched());
    assert!(outcomes.borrow().is_empty());
  }

  #[test]
  fn empty_ack_then_separate_response() {
    let mut engine = engine();
    let (handle, req, outcomes) = submitted(&mut engine, Type::Con);
    engine.transport().take_sent();

    assert_eq!(engine.deliver(&bytes(req.ack()), dummy_addr()),
               Ok(Delivered::Acked(handle)));
    assert_eq!(engine.deliver(&bytes(req.ack()), dummy_addr()),
               Ok(Delivered::Duplicate(handle)));

    assert_eq!(engine.tick(at(5_000)), Activity::default());
    assert_eq!(engine.state_of(handle), Some(State::WaitingResponse));

    let rep = content(Type::Con, Id(999), req.token);
    assert_eq!(engine.deliver(&bytes(rep.clone()), dummy_addr()),
               Ok(Delivered::Completed(handle)));
    assert_eq!(outcomes.borrow().as_slice(), &[Ok(Addrd(rep.clone(), dummy_addr()))]);

    // the separate response was acknowledged
    assert_eq!(engine.transport().take_sent(), vec![Addrd(rep.ack(), dummy_addr())]);
  }

  #[test]
  fn acked_timeout() {
    let mut config = config();
    config.msg.con.acked_timeout = Timeout::Millis(10_000);
    let mut engine = Engine::new_config(config, TransportMock::new());
    let (handle, req, outcomes) = submitted(&mut engine, Type::Con);

    engine.deliver(&bytes(req.ack()), dummy_addr()).unwrap();
    engine.tick(at(100));
    assert_eq!(engine.tick(at(10_099)), Activity::default());
    assert_eq!(engine.tick(at(10_100)).failed, 1);

    assert_eq!(engine.state_of(handle), Some(State::Failed));
    assert_eq!(outcomes.borrow().as_slice(),
               &[Err(Failure::Timeout { attempts: Attempts(0) })]);
  }

  #[test]
  fn reset_finishes() {
    let mut engine = engine();
    let (handle, req, outcomes) = submitted(&mut engine, Type::Con);

    assert_eq!(engine.deliver(&bytes(req.reset()), dummy_addr()),
               Ok(Delivered::Completed(handle)));
    assert_eq!(engine.state_of(handle), Some(State::Finished));
    assert_eq!(outcomes.borrow().as_slice(), &[Err(Failure::Reset)]);
  }

  #[test]
  fn unmatched_datagrams() {
    let mut engine = engine();
    let (_, req, outcomes) = submitted(&mut engine, Type::Con);
    engine.transport().take_sent();

    // right token, wrong sender
    let rep = content(Type::Non, Id(100), req.token);
    assert!(engine.deliver(&bytes(rep), other_addr())
                  .unwrap_err()
                  .is_unmatched());

    // unknown token, confirmable: rejected with a reset
    let rep = content(Type::Con, Id(101), Token::opaque(b"who?"));
    assert!(engine.deliver(&bytes(rep.clone()), dummy_addr())
                  .unwrap_err()
                  .is_unmatched());
    assert_eq!(engine.transport().take_sent(), vec![Addrd(rep.reset(), dummy_addr())]);

    // unknown message ID
    let ack = Message::new(Type::Ack, Code::EMPTY, Id(req.id.0.wrapping_add(1)), Token::default());
    assert!(engine.deliver(&bytes(ack), dummy_addr())
                  .unwrap_err()
                  .is_unmatched());

    assert!(outcomes.borrow().is_empty());
  }

  #[test]
  fn garbage_is_a_parse_error() {
    let mut engine = engine();
    let (handle, _, _) = submitted(&mut engine, Type::Con);

    let err = engine.deliver(&[0xff, 0, 0], dummy_addr()).unwrap_err();
    assert!(err.message_parse_error().is_some());
    assert_eq!(err.when, When::Delivering(dummy_addr()));
    assert_eq!(engine.state_of(handle), Some(State::WaitingResponse));
  }

  #[test]
  fn non_is_not_retransmitted() {
    let mut engine = engine();
    let (handle, req, outcomes) = submitted(&mut engine, Type::Non);

    assert_eq!(engine.tick(at(100_000)), Activity::default());
    assert_eq!(engine.transport().sent_count(), 1);

    let rep = content(Type::Non, Id(77), req.token);
    assert_eq!(engine.deliver(&bytes(rep), dummy_addr()),
               Ok(Delivered::Completed(handle)));
    assert_eq!(outcomes.borrow().len(), 1);
  }

  #[test]
  fn non_timeout() {
    let mut config = config();
    config.msg.non.timeout = Timeout::Millis(500);
    let mut engine = Engine::new_config(config, TransportMock::new());
    let (handle, _, outcomes) = submitted(&mut engine, Type::Non);

    assert_eq!(engine.tick(at(499)), Activity::default());
    assert_eq!(engine.tick(at(500)).failed, 1);
    assert_eq!(engine.state_of(handle), Some(State::Failed));
    assert_eq!(outcomes.borrow().as_slice(),
               &[Err(Failure::Timeout { attempts: Attempts(0) })]);
  }

  #[test]
  fn send_failure_counts_as_attempt() {
    let mut engine = engine();
    engine.transport().fail.set(true);
    let (handle, _, outcomes) = submitted(&mut engine, Type::Con);

    assert_eq!(engine.state_of(handle), Some(State::Created));

    for _ in 0..4 {
      assert_eq!(engine.tick(at(0)).resent, 1);
    }

    assert_eq!(engine.tick(at(0)).failed, 1);
    assert_eq!(outcomes.borrow().as_slice(),
               &[Err(Failure::Timeout { attempts: Attempts(4) })]);
  }

  #[test]
  fn send_failure_recovers() {
    let mut engine = engine();
    engine.transport().fail.set(true);
    let (handle, _, _) = submitted(&mut engine, Type::Non);

    engine.transport().fail.set(false);
    assert_eq!(engine.tick(at(10)).resent, 1);
    assert_eq!(engine.state_of(handle), Some(State::WaitingResponse));
    assert_eq!(engine.transport().sent_count(), 1);

    assert_eq!(engine.tick(at(20)), Activity::default());
  }

  #[test]
  fn tick_services_oldest_first() {
    let mut engine = engine();
    let (_, a) = recorder();
    let (_, b) = recorder();
    engine.submit(at(10), get(Type::Con), dummy_addr(), b).unwrap();
    engine.submit(at(0), get(Type::Con), dummy_addr(), a).unwrap();

    let first = engine.longest_pending().unwrap();
    let first_id = engine.interaction(first).unwrap().id();

    engine.transport().take_sent();
    assert_eq!(engine.tick(at(1_010)).resent, 2);

    let sent = engine.transport().take_sent();
    assert_eq!(sent[0].data().id, first_id);
    assert_ne!(sent[1].data().id, first_id);
  }

  #[test]
  fn unobserved_reaped_after_lifetime() {
    let mut engine = engine();
    let (handle, req, _) = submitted(&mut engine, Type::Con);
    engine.deliver(&bytes(content(Type::Ack, req.id, req.token)), dummy_addr())
          .unwrap();

    let lifetime = engine.config().exchange_lifetime_millis();

    assert_eq!(engine.tick(at(10)).reaped, 0);
    assert_eq!(engine.tick(at(10 + lifetime - 1)).reaped, 0);
    assert_eq!(engine.tick(at(10 + lifetime)).reaped, 1);
    assert_eq!(engine.state_of(handle), None);
  }

  #[test]
  fn cancel_drops_handler() {
    let mut engine = engine();
    let (tx, rx) = completion::channel();
    let handle = engine.submit(at(0), get(Type::Con), dummy_addr(), tx)
                       .unwrap();

    assert!(engine.cancel(handle));
    assert!(!engine.cancel(handle));
    assert_eq!(rx.poll(), Err(nb::Error::Other(Canceled)));
    assert_eq!(engine.longest_pending(), None);
  }

  #[test]
  fn ids_and_tokens_skip_live() {
    let mut engine = engine();
    let (_, req, _) = submitted(&mut engine, Type::Con);

    engine.reinitialize();
    assert_ne!(engine.next_id(), Some(req.id));
    assert_ne!(engine.next_token(at(0)), Some(req.token));
  }
}
