use ribbit_msg::{known, Code, Id, Message, OptNumber, Payload, Token, Type};

use crate::option::common_options;
use crate::ToCoapValue;

/// Errors encounterable while using ReqBuilder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
  /// The token was longer than 8 bytes
  TokenTooLong(usize),
}

/// Build a request
///
/// Requests are confirmable unless [`non`](ReqBuilder::non) is used.
/// The message ID and token are left unset (`Id(0)` and the empty token)
/// so that the [`Engine`](crate::engine::Engine) will generate them.
///
/// ```
/// use ribbit::req::ReqBuilder;
/// use ribbit_msg::known::{self, ContentFormat};
/// use ribbit_msg::{Code, Type};
///
/// let payload = r#"{"name": "Jameson"}"#;
///
/// let request = ReqBuilder::post("people/greet").accept(ContentFormat::Json)
///                                               .content_format(ContentFormat::Json)
///                                               .payload(payload)
///                                               .build()
///                                               .unwrap();
///
/// assert_eq!(request.ty, Type::Con);
/// assert_eq!(request.code, Code::POST);
/// assert_eq!(request.get_all(known::URI_PATH)
///                   .map(|v| v.as_str().unwrap())
///                   .collect::<Vec<_>>(),
///            vec!["people", "greet"]);
/// assert_eq!(request.content_format(), Some(ContentFormat::Json));
/// assert_eq!(request.payload_str(), Some(payload));
/// ```
#[derive(Clone, Debug)]
pub struct ReqBuilder {
  inner: Result<Message, Error>,
}

impl ReqBuilder {
  fn new(code: Code, path: impl AsRef<str>) -> Self {
    let mut msg = Message::new(Type::Con, code, Id(0), Token::default());

    path.as_ref()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .for_each(|segment| msg.add(known::URI_PATH, segment.to_coap_value()));

    Self { inner: Ok(msg) }
  }

  /// Creates a GET request
  pub fn get(path: impl AsRef<str>) -> Self {
    Self::new(Code::GET, path)
  }

  /// Creates a PUT request
  pub fn put(path: impl AsRef<str>) -> Self {
    Self::new(Code::PUT, path)
  }

  /// Creates a POST request
  pub fn post(path: impl AsRef<str>) -> Self {
    Self::new(Code::POST, path)
  }

  /// Creates a DELETE request
  pub fn delete(path: impl AsRef<str>) -> Self {
    Self::new(Code::DELETE, path)
  }

  fn map(mut self, f: impl FnOnce(&mut Message)) -> Self {
    if let Ok(msg) = self.inner.as_mut() {
      f(msg);
    }

    self
  }

  /// Make the request non-confirmable; it will be sent once and never retransmitted
  pub fn non(self) -> Self {
    self.map(|msg| msg.ty = Type::Non)
  }

  /// Make the request confirmable (the default)
  pub fn con(self) -> Self {
    self.map(|msg| msg.ty = Type::Con)
  }

  /// Use a specific message ID instead of a generated one
  pub fn id(self, id: Id) -> Self {
    self.map(|msg| msg.id = id)
  }

  /// Use a specific token instead of a generated one
  ///
  /// # Errors
  /// Causes the builder to error if the token is longer than 8 bytes.
  pub fn token(mut self, token: &[u8]) -> Self {
    match Token::try_from(token) {
      | Ok(token) => self.map(|msg| msg.token = token),
      | Err(len) => {
        self.inner = Err(Error::TokenTooLong(len));
        self
      },
    }
  }

  /// Insert or update an option value - use this for non-Repeatable Options.
  pub fn option<V: ToCoapValue>(self, number: OptNumber, value: V) -> Self {
    self.map(|msg| msg.set(number, value.to_coap_value()))
  }

  /// Insert an option value - use this for Repeatable Options.
  pub fn add_option<V: ToCoapValue>(self, number: OptNumber, value: V) -> Self {
    self.map(|msg| msg.add(number, value.to_coap_value()))
  }

  /// Set the payload of the request
  pub fn payload<V: ToCoapValue>(self, value: V) -> Self {
    self.map(|msg| msg.payload = Payload(value.to_coap_value()))
  }

  /// Unwrap the builder into the built request
  pub fn build(self) -> Result<Message, Error> {
    self.inner
  }

  common_options!();
}
