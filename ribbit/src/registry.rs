use std_alloc::collections::{BTreeMap, BTreeSet};
use std_alloc::vec::Vec;

use no_std_net::SocketAddr;
use ribbit_msg::{Id, Token};

use crate::interaction::Interaction;
use crate::time::{self, Clock};

/// Opaque reference to an [`Interaction`] owned by a [`Registry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u64);

/// Reasons an interaction could not be registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InsertError {
  /// Another live interaction already uses this token
  TokenInUse(Token),
  /// Another live interaction already uses this message ID
  IdInUse(Id),
}

/// The set of live interactions, indexed by token,
/// by message ID and by age.
///
/// No two interactions in a registry share a token,
/// and no two share a message ID.
#[derive(Debug)]
pub struct Registry<C: Clock> {
  ixns: BTreeMap<Handle, Interaction<C>>,
  by_token: BTreeMap<Token, Handle>,
  by_id: BTreeMap<Id, Handle>,
  by_age: BTreeSet<(u64, Handle)>,
  next_handle: u64,
}

impl<C: Clock> Default for Registry<C> {
  fn default() -> Self {
    Self { ixns: BTreeMap::new(),
           by_token: BTreeMap::new(),
           by_id: BTreeMap::new(),
           by_age: BTreeSet::new(),
           next_handle: 0 }
  }
}

impl<C: Clock> Registry<C> {
  /// Create an empty registry
  pub fn new() -> Self {
    Default::default()
  }

  /// Take ownership of an interaction, yielding a handle to it
  pub fn insert(&mut self, ixn: Interaction<C>) -> Result<Handle, InsertError> {
    let (token, id) = (ixn.token(), ixn.id());

    if self.is_token_live(token) {
      return Err(InsertError::TokenInUse(token));
    }

    if self.is_id_live(id) {
      return Err(InsertError::IdInUse(id));
    }

    let handle = Handle(self.next_handle);
    self.next_handle += 1;

    self.by_token.insert(token, handle);
    self.by_id.insert(id, handle);
    self.by_age.insert((time::epoch_micros(ixn.created_at()), handle));
    self.ixns.insert(handle, ixn);

    Ok(handle)
  }

  /// Stop tracking an interaction, yielding it if it was present
  pub fn remove(&mut self, handle: Handle) -> Option<Interaction<C>> {
    let ixn = self.ixns.remove(&handle)?;

    self.by_token.remove(&ixn.token());
    self.by_id.remove(&ixn.id());
    self.by_age
        .remove(&(time::epoch_micros(ixn.created_at()), handle));

    Some(ixn)
  }

  /// Borrow an interaction
  pub fn get(&self, handle: Handle) -> Option<&Interaction<C>> {
    self.ixns.get(&handle)
  }

  /// Mutably borrow an interaction
  pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Interaction<C>> {
    self.ixns.get_mut(&handle)
  }

  /// The interaction that was created first.
  ///
  /// Interactions created at the same instant are ordered by insertion.
  pub fn longest_pending(&self) -> Option<Handle> {
    self.by_age.iter().next().map(|(_, h)| *h)
  }

  /// All handles, oldest first
  pub fn by_age(&self) -> Vec<Handle> {
    self.by_age.iter().map(|(_, h)| *h).collect()
  }

  /// Find the interaction whose request had token `token`
  /// and was sent to `addr`
  pub fn find_by_token(&self, token: Token, addr: SocketAddr) -> Option<Handle> {
    self.by_token
        .get(&token)
        .copied()
        .filter(|h| self.sent_to(*h, addr))
  }

  /// Find the interaction whose request had message ID `id`
  /// and was sent to `addr`
  pub fn find_by_id(&self, id: Id, addr: SocketAddr) -> Option<Handle> {
    self.by_id
        .get(&id)
        .copied()
        .filter(|h| self.sent_to(*h, addr))
  }

  /// Whether a registered interaction uses this token
  pub fn is_token_live(&self, token: Token) -> bool {
    self.by_token.contains_key(&token)
  }

  /// Whether a registered interaction uses this message ID
  pub fn is_id_live(&self, id: Id) -> bool {
    self.by_id.contains_key(&id)
  }

  /// Number of registered interactions
  pub fn len(&self) -> usize {
    self.ixns.len()
  }

  /// Whether there are no registered interactions
  pub fn is_empty(&self) -> bool {
    self.ixns.is_empty()
  }

  fn sent_to(&self, handle: Handle, addr: SocketAddr) -> bool {
    self.ixns
        .get(&handle)
        .map(|ixn| ixn.request().addr() == addr)
        .unwrap_or(false)
  }
}

#[cfg(test)]
mod tests {
  use embedded_time::Instant;
  use ribbit_msg::{Code, Message, Type};

  use super::*;
  use crate::interaction::Outcome;
  use crate::net::Addrd;
  use crate::test::{at, dummy_addr, other_addr, ClockMock};

  fn ixn(id: u16, token: &[u8], created: Instant<ClockMock>) -> Interaction<ClockMock> {
    let msg = Message::new(Type::Con, Code::GET, Id(id), Token::opaque(token));
    Interaction::new(Addrd(msg, dummy_addr()), vec![], created, Box::new(|_: Outcome| ()))
  }

  #[test]
  fn insert_find_remove() {
    let mut reg = Registry::new();
    let h = reg.insert(ixn(1, b"a", at(0))).unwrap();

    assert_eq!(reg.len(), 1);
    assert_eq!(reg.find_by_token(Token::opaque(b"a"), dummy_addr()), Some(h));
    assert_eq!(reg.find_by_id(Id(1), dummy_addr()), Some(h));
    assert_eq!(reg.find_by_token(Token::opaque(b"b"), dummy_addr()), None);

    assert!(reg.remove(h).is_some());
    assert!(reg.is_empty());
    assert!(!reg.is_token_live(Token::opaque(b"a")));
    assert!(!reg.is_id_live(Id(1)));
    assert!(reg.remove(h).is_none());
  }

  #[test]
  fn lookups_check_sender() {
    let mut reg = Registry::new();
    reg.insert(ixn(1, b"a", at(0))).unwrap();

    assert_eq!(reg.find_by_token(Token::opaque(b"a"), other_addr()), None);
    assert_eq!(reg.find_by_id(Id(1), other_addr()), None);
  }

  #[test]
  fn rejects_colliding_token_and_id() {
    let mut reg = Registry::new();
    reg.insert(ixn(1, b"a", at(0))).unwrap();

    assert_eq!(reg.insert(ixn(2, b"a", at(1))).unwrap_err(),
               InsertError::TokenInUse(Token::opaque(b"a")));
    assert_eq!(reg.insert(ixn(1, b"b", at(1))).unwrap_err(),
               InsertError::IdInUse(Id(1)));
    assert_eq!(reg.len(), 1);
  }

  #[test]
  fn longest_pending_is_oldest() {
    let mut reg = Registry::new();
    let b = reg.insert(ixn(2, b"b", at(20))).unwrap();
    let a = reg.insert(ixn(1, b"a", at(10))).unwrap();
    let c = reg.insert(ixn(3, b"c", at(20))).unwrap();

    assert_eq!(reg.longest_pending(), Some(a));
    assert_eq!(reg.by_age(), vec![a, b, c]);

    reg.remove(a);
    assert_eq!(reg.longest_pending(), Some(b));
    reg.remove(b);
    assert_eq!(reg.longest_pending(), Some(c));
    reg.remove(c);
    assert_eq!(reg.longest_pending(), None);
  }
}
