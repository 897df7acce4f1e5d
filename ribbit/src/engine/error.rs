use no_std_net::SocketAddr;
use ribbit_msg::{Id, MessageParseError, MessageToBytesError, Token};

/// The context that an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
  /// We were submitting a request headed for this address
  Submitting(SocketAddr),
  /// We were handling a datagram that came from this address
  Delivering(SocketAddr),
}

impl When {
  /// Construct a specific error from the context the error occurred in
  pub fn what(self, what: What) -> Error {
    Error { when: self, what }
  }
}

/// An error encounterable from within an [`Engine`](super::Engine)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
  /// What happened?
  pub what: What,
  /// What were we doing when it happened?
  pub when: When,
}

impl Error {
  /// Is this error `FromBytes`?
  pub fn message_parse_error(&self) -> Option<&MessageParseError> {
    match self.what {
      | What::FromBytes(ref e) => Some(e),
      | _ => None,
    }
  }

  /// Is this a datagram that did not match any interaction?
  pub fn is_unmatched(&self) -> bool {
    self.what == What::Unmatched
  }
}

/// A contextless error with some additional debug data attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum What {
  /// Parsing a message from bytes failed
  FromBytes(MessageParseError),
  /// Serializing a message to bytes failed
  ToBytes(MessageToBytesError),
  /// A datagram decoded fine but did not match
  /// any registered interaction
  Unmatched,
  /// The message submitted was not a CON or NON request
  NotARequest,
  /// The registry already holds
  /// [`Config.max_interactions`](crate::config::Config::max_interactions) interactions
  RegistryFull,
  /// The request's message ID is in use by another live interaction
  IdInUse(Id),
  /// The request's token is in use by another live interaction
  TokenInUse(Token),
  /// Every message ID is in use
  IdsExhausted,
  /// Could not generate a token that was not in use
  TokensExhausted,
}
