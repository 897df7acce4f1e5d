use std_alloc::vec::Vec;

use crate::msg::Byte1;
use crate::*;

/// Trait allowing fallible conversion into bytes
pub trait TryIntoBytes {
  /// Error yielded if conversion fails
  type Error;

  /// Try to convert into a collection of bytes
  ///
  /// ```
  /// use ribbit_msg::{Code, Id, Message, Token, TryIntoBytes, Type};
  ///
  /// let msg = Message::new(Type::Con, Code::GET, Id(1), Token::default());
  /// let bytes: Vec<u8> = msg.try_into_bytes().unwrap();
  ///
  /// assert_eq!(bytes, vec![0b_01_00_0000, 0b_000_00001, 0, 1]);
  /// ```
  fn try_into_bytes(self) -> Result<Vec<u8>, Self::Error>;
}

/// Errors encounterable serializing to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageToBytesError {
  /// An option's value was longer than the wire format can express
  OptionValueTooLong {
    /// The option
    number: OptNumber,
    /// Length of the value
    len: usize,
  },
  /// The gap between an option's number and the previous option's
  /// number was larger than the wire format can express
  OptionDeltaTooLarge(OptNumber),
}

impl Message {
  fn size_hint(&self) -> usize {
    let header_size = 4;
    let payload_marker_size = 1;
    let opts_size: usize = self.opts.iter().map(|o| 5 + o.value.0.len()).sum();

    header_size + self.token.len() + opts_size + payload_marker_size + self.payload.0.len()
  }
}

impl TryIntoBytes for Message {
  type Error = MessageToBytesError;

  fn try_into_bytes(mut self) -> Result<Vec<u8>, Self::Error> {
    let mut bytes = Vec::with_capacity(self.size_hint());

    let byte1: u8 = Byte1 { tkl: self.token.len() as u8,
                            ver: Version(1),
                            ty: self.ty }.into();
    let code: u8 = self.code.into();
    let id: [u8; 2] = self.id.into();

    bytes.push(byte1);
    bytes.push(code);
    bytes.extend(id);
    bytes.extend_from_slice(self.token.as_bytes());

    // stable; repeated options keep the order they were added in
    self.opts.sort_by_key(|o| o.number);

    self.opts
        .iter()
        .try_fold(OptNumber(0), |prev, opt| {
          opt.extend_bytes(prev, &mut bytes).map(|_| opt.number)
        })?;

    if !self.payload.0.is_empty() {
      bytes.push(0b11111111);
      bytes.extend(self.payload.0);
    }

    Ok(bytes)
  }
}

impl From<Id> for [u8; 2] {
  fn from(id: Id) -> [u8; 2] {
    id.0.to_be_bytes()
  }
}

impl From<Byte1> for u8 {
  fn from(b: Byte1) -> u8 {
    let ver = b.ver.0 << 6;
    let ty = u8::from(b.ty) << 4;
    let tkl = b.tkl;

    ver | ty | tkl
  }
}
