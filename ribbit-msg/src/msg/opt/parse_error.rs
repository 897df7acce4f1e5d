use super::OptNumber;

/// Errors encounterable while parsing an option from bytes
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Eq, Ord)]
pub enum OptParseError {
  /// Reached end of stream before parsing was finished
  UnexpectedEndOfStream,

  /// Option Delta was set to 15, which is invalid.
  OptionDeltaReservedValue(u8),

  /// Value Length was set to 15, which is invalid.
  ValueLengthReservedValue(u8),

  /// An option this crate does not recognize was marked critical
  /// (see [`OptNumber::must_be_processed`]) and cannot be skipped.
  UnknownCriticalOption(OptNumber),

  /// The sum of option deltas went past the largest
  /// option number (65535).
  OptionNumberTooLarge,
}

impl OptParseError {
  /// Shorthand for [`OptParseError::UnexpectedEndOfStream`]
  pub fn eof() -> Self {
    Self::UnexpectedEndOfStream
  }
}
