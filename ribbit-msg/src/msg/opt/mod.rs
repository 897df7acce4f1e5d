use std_alloc::vec::Vec;
use tinyvec::ArrayVec;

use crate::from_bytes::TryConsumeBytes;
use crate::to_bytes::MessageToBytesError;
use crate::Cursor;

/// Option numbers known to this crate
pub mod known;

/// Option parsing errors
pub mod parse_error;
pub use parse_error::*;

/// Read the extended form of an option delta or length.
///
/// `head` is the 4-bit nibble from the option header.
pub(crate) fn parse_opt_len_or_delta<A: AsRef<[u8]>>(head: u8,
                                                     bytes: &mut Cursor<A>,
                                                     reserved_err: OptParseError)
                                                     -> Result<u32, OptParseError> {
  match head {
    | 13 => {
      let n = bytes.next().ok_or_else(OptParseError::eof)?;
      Ok((n as u32) + 13)
    },
    | 14 => match bytes.take_exact(2) {
      | Some(&[a, b]) => Ok(u16::from_be_bytes([a, b]) as u32 + 269),
      | _ => Err(OptParseError::eof()),
    },
    | 15 => Err(reserved_err),
    | _ => Ok(head as u32),
  }
}

/// Largest delta or length expressible with the 2-byte extended form
pub(crate) const MAX_EXTENDED: u32 = u16::MAX as u32 + 269;

/// Split a delta or length into its header nibble and extended bytes.
///
/// Returns `None` if the value is too large to be represented.
pub(crate) fn opt_len_or_delta(val: u32) -> Option<(u8, ArrayVec<[u8; 2]>)> {
  let mut bytes = ArrayVec::new();
  match val {
    | n if n > MAX_EXTENDED => None,
    | n if n >= 269 => {
      bytes.extend(((n - 269) as u16).to_be_bytes());
      Some((14, bytes))
    },
    | n if n >= 13 => {
      bytes.push((n - 13) as u8);
      Some((13, bytes))
    },
    | n => Some((n as u8, bytes)),
  }
}

/// # CoAP Option
/// Options are the CoAP equivalent of HTTP headers;
/// each is an [`OptNumber`] identifying the option
/// and an [`OptValue`] carrying its (possibly empty) value.
///
/// On the wire options are sorted by number and each number
/// is written as the difference ("delta") from the previous option's number.
/// `Opt` stores the absolute number; deltas only exist while
/// serializing / parsing.
///
/// See [RFC7252 - Option Format](https://datatracker.ietf.org/doc/html/rfc7252#section-3.1) for context
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Opt {
  /// See [`OptNumber`]
  pub number: OptNumber,
  /// See [`OptValue`]
  pub value: OptValue,
}

impl Opt {
  /// Given the number of the option written before this one,
  /// append this option's bytes to `bytes`.
  pub fn extend_bytes(&self,
                      prev: OptNumber,
                      bytes: &mut Vec<u8>)
                      -> Result<(), MessageToBytesError> {
    let delta = self.number.0 - prev.0;
    let (del, del_bytes) =
      opt_len_or_delta(delta).ok_or(MessageToBytesError::OptionDeltaTooLarge(self.number))?;
    let (len, len_bytes) =
      opt_len_or_delta(self.value.0.len() as u32).ok_or(MessageToBytesError::OptionValueTooLong { number: self.number,
                                                                                                   len: self.value.0.len() })?;

    bytes.push(del << 4 | len);
    bytes.extend(del_bytes);
    bytes.extend(len_bytes);
    bytes.extend_from_slice(&self.value.0);

    Ok(())
  }
}

/// # Option Number
/// Identifies which option is being set (e.g. Content-Format has a Number of 12).
///
/// Properties of the option are encoded in the bits of its number:
///  - bit 0: critical (1) or elective (0)
///  - bit 1: unsafe (1) or safe (0) to forward by a proxy that doesn't understand it
///  - bits 2-4: all set means "NoCacheKey"
///
/// See [RFC7252 - Option Numbers](https://datatracker.ietf.org/doc/html/rfc7252#section-5.4.6) for context
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct OptNumber(pub u32);

/// Whether an option must be understood by the recipient
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptionMustBeProcessed {
  /// This option must be processed,
  /// and a message that ignores it
  /// will be rejected.
  ///
  /// Corresponds to the option being "critical"
  /// in strict CoAP terms
  Yes,
  /// This option does not _need_ to
  /// be processed,
  /// and a message that ignores it
  /// will be processed anyway.
  ///
  /// Corresponds to the option being "elective"
  /// in strict CoAP terms
  No,
}

/// What a proxy should do with an option it doesn't understand
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum WhenOptionUnsupportedByProxy {
  /// Corresponds to the option being "UnSafe" to forward
  /// in strict CoAP terms
  Error,
  /// Corresponds to the option being "SafeToForward"
  /// in strict CoAP terms
  Forward,
}

/// Whether an option is part of a proxy's cache key
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum WhenOptionChanges {
  /// Different values for this option should yield different cached responses
  ResponseChanges,
  /// Corresponds to the option being "NoCacheKey"
  /// in strict CoAP terms
  ResponseDoesNotChange,
}

impl OptNumber {
  /// Whether or not this option may be ignored by a recipient
  pub fn must_be_processed(&self) -> OptionMustBeProcessed {
    match self.0 & 0b1 {
      | 1 => OptionMustBeProcessed::Yes,
      | _ => OptionMustBeProcessed::No,
    }
  }

  /// Shorthand for `must_be_processed() == Yes`
  pub fn is_critical(&self) -> bool {
    self.must_be_processed() == OptionMustBeProcessed::Yes
  }

  /// Whether or not this option may be forwarded blindly by
  /// a proxy that does not support processing it
  pub fn when_unsupported_by_proxy(&self) -> WhenOptionUnsupportedByProxy {
    match (self.0 & 0b10) >> 1 {
      | 1 => WhenOptionUnsupportedByProxy::Error,
      | _ => WhenOptionUnsupportedByProxy::Forward,
    }
  }

  /// Whether or not different values for this option should
  /// yield proxies' cached response
  pub fn when_option_changes(&self) -> WhenOptionChanges {
    match (self.0 & 0b11100) >> 2 {
      | 0b111 => WhenOptionChanges::ResponseDoesNotChange,
      | _ => WhenOptionChanges::ResponseChanges,
    }
  }
}

/// # Option Value
/// Opaque bytes; CoAP options are either empty, opaque,
/// unsigned integers (big-endian, leading zeroes stripped)
/// or UTF-8 strings.
#[derive(Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct OptValue(pub Vec<u8>);

impl OptValue {
  /// Encode an unsigned integer using the fewest bytes possible
  ///
  /// ```
  /// use ribbit_msg::OptValue;
  ///
  /// assert_eq!(OptValue::uint(0).0, Vec::<u8>::new());
  /// assert_eq!(OptValue::uint(50).0, vec![50]);
  /// assert_eq!(OptValue::uint(5683).0, vec![0x16, 0x33]);
  /// ```
  pub fn uint(n: u32) -> Self {
    let bytes = n.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    OptValue(bytes[skip..].to_vec())
  }

  /// Interpret this value as an unsigned integer,
  /// returning None if it is longer than 4 bytes.
  pub fn as_uint(&self) -> Option<u32> {
    match self.0.len() {
      | 0..=4 => Some(self.0.iter().fold(0u32, |n, b| (n << 8) | *b as u32)),
      | _ => None,
    }
  }

  /// Interpret this value as a UTF-8 string
  pub fn as_str(&self) -> Option<&str> {
    core::str::from_utf8(&self.0).ok()
  }
}

impl<Bytes: AsRef<[u8]>> TryConsumeBytes<Bytes> for Vec<Opt> {
  type Error = OptParseError;

  /// Consume options until the end of the buffer or the payload marker,
  /// leaving the marker unconsumed.
  fn try_consume_bytes(bytes: &mut Cursor<Bytes>) -> Result<Self, Self::Error> {
    let mut opts = Vec::new();
    let mut number = 0u32;

    loop {
      match bytes.peek_exact(1) {
        | None | Some(&[0b11111111]) => break Ok(opts),
        | _ => (),
      }

      let opt = RawOpt::try_consume_bytes(bytes)?;
      number = number.checked_add(opt.delta)
                     .filter(|n| *n <= u16::MAX as u32)
                     .ok_or(OptParseError::OptionNumberTooLarge)?;
      let number = OptNumber(number);

      if known::is_known(number) {
        opts.push(Opt { number,
                        value: OptValue(opt.value) });
      } else if number.is_critical() {
        break Err(OptParseError::UnknownCriticalOption(number));
      }
    }
  }
}

/// An option as it appears on the wire, before its number is known
struct RawOpt {
  delta: u32,
  value: Vec<u8>,
}

impl<Bytes: AsRef<[u8]>> TryConsumeBytes<Bytes> for RawOpt {
  type Error = OptParseError;

  fn try_consume_bytes(bytes: &mut Cursor<Bytes>) -> Result<Self, Self::Error> {
    let byte1 = bytes.next().ok_or_else(OptParseError::eof)?;

    // delta's extended bytes come before length's
    let delta = parse_opt_len_or_delta(byte1 >> 4,
                                       bytes,
                                       OptParseError::OptionDeltaReservedValue(15))?;

    let len = parse_opt_len_or_delta(byte1 & 0b00001111,
                                     bytes,
                                     OptParseError::ValueLengthReservedValue(15))?
              as usize;

    let value = bytes.take_exact(len).ok_or_else(OptParseError::eof)?.to_vec();

    Ok(RawOpt { delta, value })
  }
}
