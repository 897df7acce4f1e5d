use std_alloc::vec::Vec;

/// Message Code
pub mod code;

/// Message parsing errors
pub mod parse_error;

/// Message ID
pub mod id;

/// Message Options
pub mod opt;

/// Message Type
pub mod ty;

/// Message Token
pub mod token;

/// Message Version
pub mod ver;

pub use code::*;
pub use id::*;
pub use opt::*;
pub use parse_error::*;
pub use token::*;
pub use ty::*;
pub use ver::*;

use crate::from_bytes::TryConsumeBytes;
use crate::{Cursor, TryFromBytes};

/// # Message Payload
/// The body of a request or response; empty means "no payload".
///
/// See [RFC7252 - Message Payload](https://datatracker.ietf.org/doc/html/rfc7252#section-5.5) for context
#[derive(Clone, Hash, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Payload(pub Vec<u8>);

/// Struct representing the first byte of a message.
///
/// ```text
/// CoAP version
/// |
/// |  Message type (request, response, empty)
/// |  |
/// |  |  Length of token, in bytes. (4-bit integer)
/// |  |  |
/// vv vv vvvv
/// 01 00 0000
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub(crate) struct Byte1 {
  pub(crate) ver: Version,
  pub(crate) ty: Type,
  pub(crate) tkl: u8,
}

impl TryFrom<u8> for Byte1 {
  type Error = MessageParseError;

  fn try_from(b: u8) -> Result<Self, Self::Error> {
    let ver = b >> 6; // bits 0 & 1
    let ty = b >> 4 & 0b11; // bits 2 & 3
    let tkl = b & 0b1111u8; // last 4 bits

    Ok(Byte1 { ver: Version(ver),
               ty: Type::try_from(ty)?,
               tkl })
  }
}

/// # `Message` struct
/// Low-level representation of a CoAP message.
///
/// Messages support both serializing to bytes and from bytes, by using the provided [`TryFromBytes`] and [`TryIntoBytes`](crate::TryIntoBytes) traits.
///
/// ```
/// use ribbit_msg::TryFromBytes;
/// use ribbit_msg::*;
/// # //                       version  token len  code (2.05 Content)
/// # //                       |        |          /
/// # //                       |  type  |         /  message ID
/// # //                       |  |     |        |   |
/// # //                       vv vv vvvv vvvvvvvv vvvvvvvvvvvvvvvv
/// # let header: [u8; 4] = 0b_01_00_0001_01000101_0000000000000001u32.to_be_bytes();
/// # let token: [u8; 1] = [254u8];
/// # let content_format: &[u8] = b"application/json";
/// # let options: [&[u8]; 2] = [&[0b_1100_1101u8, 0b00000011u8], content_format];
/// # let payload: [&[u8]; 2] = [&[0b_11111111u8], b"hello, world!"];
/// let packet: Vec<u8> = /* bytes! */
/// # [header.as_ref(), token.as_ref(), options.concat().as_ref(), payload.concat().as_ref()].concat();
///
/// let msg = Message::try_from_bytes(packet.clone()).unwrap();
///
/// let expected = Message {
///   id: Id(1),
///   ty: Type::Con,
///   ver: Version(1),
///   token: Token(tinyvec::array_vec!([u8; 8] => 254)),
///   opts: vec![Opt { number: known::CONTENT_FORMAT, value: OptValue(content_format.to_vec()) }],
///   code: Code {class: 2, detail: 5},
///   payload: Payload(b"hello, world!".to_vec()),
/// };
///
/// assert_eq!(msg, expected);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Message {
  /// see [`Id`] for details
  pub id: Id,
  /// see [`Type`] for details
  pub ty: Type,
  /// see [`Version`] for details
  pub ver: Version,
  /// see [`Token`] for details
  pub token: Token,
  /// see [`Code`] for details
  pub code: Code,
  /// see [`opt::Opt`] for details
  pub opts: Vec<Opt>,
  /// see [`Payload`]
  pub payload: Payload,
}

impl Message {
  /// Create a message with no options and no payload
  pub fn new(ty: Type, code: Code, id: Id, token: Token) -> Self {
    Self { id,
           ty,
           ver: Version::default(),
           token,
           code,
           opts: Vec::new(),
           payload: Payload(Vec::new()) }
  }

  /// Create an Empty Acknowledgement for this message,
  /// reusing this message's [`Id`].
  ///
  /// ```
  /// use ribbit_msg::*;
  ///
  /// let rep = Message::new(Type::Con, Code::new(2, 05), Id(7), Token::opaque(b"a"));
  /// let ack = rep.ack();
  ///
  /// assert_eq!(ack.ty, Type::Ack);
  /// assert_eq!(ack.id, Id(7));
  /// assert_eq!(ack.code, Code::EMPTY);
  /// assert!(ack.token.is_empty());
  /// ```
  pub fn ack(&self) -> Self {
    Self::new(Type::Ack, Code::EMPTY, self.id, Token::default())
  }

  /// Create a Reset for this message, reusing this message's [`Id`].
  pub fn reset(&self) -> Self {
    Self::new(Type::Reset, Code::EMPTY, self.id, Token::default())
  }

  /// Whether the code is a request method (0.01 - 0.31)
  pub fn is_request(&self) -> bool {
    self.code.kind() == CodeKind::Request
  }

  /// Whether the code is a response code (2.xx - 5.xx)
  pub fn is_response(&self) -> bool {
    self.code.kind() == CodeKind::Response
  }

  /// Whether this is an Empty message (code 0.00)
  pub fn is_empty(&self) -> bool {
    self.code.kind() == CodeKind::Empty
  }

  /// Get the first value of an option
  pub fn get(&self, n: OptNumber) -> Option<&OptValue> {
    self.get_all(n).next()
  }

  /// Get all values of a (repeatable) option, in the order they were added
  pub fn get_all(&self, n: OptNumber) -> impl Iterator<Item = &OptValue> {
    self.opts
        .iter()
        .filter(move |o| o.number == n)
        .map(|o| &o.value)
  }

  /// Add a value for an option, keeping any values already present
  pub fn add(&mut self, n: OptNumber, value: Vec<u8>) {
    self.opts.push(Opt { number: n,
                         value: OptValue(value) });
  }

  /// Replace all values for an option with `value`
  pub fn set(&mut self, n: OptNumber, value: Vec<u8>) {
    self.remove(n);
    self.add(n, value);
  }

  /// Remove all values for an option, returning how many were removed
  pub fn remove(&mut self, n: OptNumber) -> usize {
    let before = self.opts.len();
    self.opts.retain(|o| o.number != n);
    before - self.opts.len()
  }

  /// The Content-Format option, if present and well-formed
  pub fn content_format(&self) -> Option<known::ContentFormat> {
    self.get(known::CONTENT_FORMAT)
        .and_then(OptValue::as_uint)
        .and_then(|n| u16::try_from(n).ok())
        .map(known::ContentFormat::from)
  }

  /// Interpret the payload as a UTF-8 string
  pub fn payload_str(&self) -> Option<&str> {
    core::str::from_utf8(&self.payload.0).ok()
  }
}

impl<Bytes: AsRef<[u8]>> TryFromBytes<Bytes> for Message {
  type Error = MessageParseError;

  fn try_from_bytes(bytes: Bytes) -> Result<Self, Self::Error> {
    let mut bytes = Cursor::new(bytes);

    let Byte1 { tkl, ty, ver } = bytes.next()
                                      .ok_or_else(MessageParseError::eof)?
                                      .try_into()?;

    if ver != Version(1) {
      return Err(Self::Error::InvalidVersion(ver.0));
    }

    if tkl > 8 {
      return Err(Self::Error::InvalidTokenLength(tkl));
    }

    let code: Code = bytes.next().ok_or_else(MessageParseError::eof)?.into();
    let id: Id = Id::try_consume_bytes(&mut bytes)?;

    if code == Code::EMPTY && (tkl != 0 || !bytes.is_exhausted()) {
      return Err(Self::Error::EmptyMessageNotEmpty);
    }

    let token = bytes.take_exact(tkl as usize)
                     .ok_or_else(MessageParseError::eof)?;
    let token = Token::try_from(token).map_err(|n| Self::Error::InvalidTokenLength(n as u8))?;

    let opts = Vec::<Opt>::try_consume_bytes(&mut bytes)?;

    let payload = match bytes.next() {
      | Some(0b11111111) => match bytes.take_until_end() {
        | [] => return Err(Self::Error::EmptyPayloadAfterMarker),
        | rest => rest.to_vec(),
      },
      | _ => Vec::new(),
    };

    Ok(Message { id,
                 ty,
                 ver,
                 code,
                 token,
                 opts,
                 payload: Payload(payload) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::TryIntoBytes;

  #[test]
  fn parse_msg() {
    let (expect, msg) = crate::test_msg();
    assert_eq!(Message::try_from_bytes(&msg).unwrap(), expect)
  }

  #[test]
  fn parse_byte1() {
    let byte = 0b_01_10_0011u8;
    let byte = Byte1::try_from(byte).unwrap();
    assert_eq!(byte,
               Byte1 { ver: Version(1),
                       ty: Type::Ack,
                       tkl: 3 })
  }

  #[test]
  fn parse_id() {
    let mut id_bytes = Cursor::new(34u16.to_be_bytes());
    let id = Id::try_consume_bytes(&mut id_bytes).unwrap();
    assert_eq!(id, Id(34));
  }

  #[test]
  fn parse_truncated_header() {
    let (_, bytes) = crate::test_msg();
    for len in 0..4 {
      assert_eq!(Message::try_from_bytes(&bytes[..len]),
                 Err(MessageParseError::UnexpectedEndOfStream));
    }
  }

  #[test]
  fn parse_truncated_token() {
    let bytes = [0b_01_00_0100, 0b_000_00001, 0, 1, 0xAA, 0xBB];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::UnexpectedEndOfStream));
  }

  #[test]
  fn parse_bad_version() {
    let bytes = [0b_10_00_0000, 0b_000_00001, 0, 1];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::InvalidVersion(2)));
  }

  #[test]
  fn parse_bad_token_length() {
    let bytes = [0b_01_00_1001, 0b_000_00001, 0, 1];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::InvalidTokenLength(9)));
  }

  #[test]
  fn parse_option_length_past_end() {
    // Uri-Path claiming 4 bytes with only 2 present
    let bytes = [0b_01_00_0000, 0b_000_00010, 0, 1, 0b1011_0100, b'e', b'c'];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::OptParseError(OptParseError::UnexpectedEndOfStream)));
  }

  #[test]
  fn parse_option_number_overflow() {
    // two skipped elective options at 40000 and 80000
    let [a, b] = (40_000u16 - 269).to_be_bytes();
    let header = [0b_01_00_0000, 0b_010_00101, 0, 1];
    let opt = [0b1110_0000, a, b];
    let bytes: Vec<u8> = [&header[..], &opt[..], &opt[..]].concat();
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::OptParseError(OptParseError::OptionNumberTooLarge)));
  }

  #[test]
  fn parse_payload_marker_without_payload() {
    let bytes = [0b_01_00_0000, 0b_010_00101, 0, 1, 0xFF];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::EmptyPayloadAfterMarker));
  }

  #[test]
  fn parse_empty_ack() {
    let bytes = [0b_01_10_0000, 0, 0x12, 0x34];
    let msg = Message::try_from_bytes(bytes).unwrap();
    assert_eq!(msg, Message::new(Type::Ack, Code::EMPTY, Id(0x1234), Token::default()));
    assert!(msg.is_empty());
  }

  #[test]
  fn parse_empty_with_token_rejected() {
    let bytes = [0b_01_10_0001, 0, 0x12, 0x34, 1];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::EmptyMessageNotEmpty));
  }

  #[test]
  fn option_accessors() {
    let mut msg = Message::new(Type::Con, Code::GET, Id(1), Token::default());
    msg.add(known::URI_PATH, b"a".to_vec());
    msg.add(known::URI_PATH, b"b".to_vec());
    msg.set(known::CONTENT_FORMAT, known::ContentFormat::Json.bytes().to_vec());

    assert_eq!(msg.get_all(known::URI_PATH).filter_map(|v| v.as_str()).collect::<Vec<_>>(),
               vec!["a", "b"]);
    assert_eq!(msg.content_format(), Some(known::ContentFormat::Json));

    msg.set(known::URI_PATH, b"c".to_vec());
    assert_eq!(msg.get(known::URI_PATH).and_then(|v| v.as_str()), Some("c"));
    assert_eq!(msg.remove(known::URI_PATH), 1);
    assert_eq!(msg.get(known::URI_PATH), None);
  }

  #[test]
  fn encode_then_parse_sorts_options() {
    let mut msg = Message::new(Type::Con, Code::POST, Id(99), Token::opaque(b"t"));
    msg.add(known::CONTENT_FORMAT, vec![]);
    msg.add(known::URI_PATH, b"echo".to_vec());
    msg.add(known::URI_HOST, b"localhost".to_vec());
    msg.add(known::URI_PATH, b"deeper".to_vec());
    msg.payload = Payload(b"hello from CoAP".to_vec());

    let bytes = msg.clone().try_into_bytes().unwrap();
    let parsed = Message::try_from_bytes(&bytes).unwrap();

    let numbers = parsed.opts.iter().map(|o| o.number.0).collect::<Vec<_>>();
    assert_eq!(numbers, vec![3, 11, 11, 12]);
    assert_eq!(parsed.get_all(known::URI_PATH).filter_map(|v| v.as_str()).collect::<Vec<_>>(),
               vec!["echo", "deeper"]);
    assert_eq!(parsed.payload_str(), Some("hello from CoAP"));
    assert_eq!(parsed.token, msg.token);
    assert_eq!(parsed.id, msg.id);
  }
}
