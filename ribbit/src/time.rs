use embedded_time::duration::{Microseconds, Milliseconds};
use embedded_time::Instant;

/// A duration, in milliseconds
pub type Millis = Milliseconds<u64>;

/// Supertrait of [`embedded_time::Clock`] pinning the
/// type of "ticks" to u64
pub trait Clock: embedded_time::Clock<T = u64> + core::fmt::Debug {}
impl<C: embedded_time::Clock<T = u64> + core::fmt::Debug> Clock for C {}

/// Timeout configuration allowing for "never time out" as an option
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum Timeout {
  /// Timeout after some number of milliseconds has elapsed
  Millis(u64),
  /// Never time out
  Never,
}

impl Timeout {
  /// The instant this timeout elapses if started at `start`,
  /// or `None` if it never does.
  pub fn deadline<C: Clock>(&self, start: Instant<C>) -> Option<Instant<C>> {
    match *self {
      | Timeout::Millis(ms) => add_millis(start, ms),
      | Timeout::Never => None,
    }
  }
}

/// `t + ms`, or `None` if that overflows the clock
pub(crate) fn add_millis<C: Clock>(t: Instant<C>, ms: u64) -> Option<Instant<C>> {
  t.checked_add(Milliseconds(ms))
}

/// Milliseconds elapsed between `then` and `now` (0 if `then` is in the future)
pub(crate) fn millis_since<C: Clock>(now: Instant<C>, then: Instant<C>) -> u64 {
  now.checked_duration_since(&then)
     .and_then(|dur| Millis::try_from(dur).ok())
     .map(|Milliseconds(ms)| ms)
     .unwrap_or(0)
}

/// Milliseconds since the clock's epoch
pub(crate) fn epoch_millis<C: Clock>(t: Instant<C>) -> u64 {
  Millis::try_from(t.duration_since_epoch()).map(|Milliseconds(ms)| ms)
                                             .unwrap_or(0)
}

/// Microseconds since the clock's epoch
pub(crate) fn epoch_micros<C: Clock>(t: Instant<C>) -> u64 {
  Microseconds::<u64>::try_from(t.duration_since_epoch()).map(|Microseconds(us)| us)
                                                         .unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test::{at, ClockMock};

  #[test]
  fn deadline() {
    assert_eq!(Timeout::Millis(500).deadline(at(1_000)), Some(at(1_500)));
    assert_eq!(Timeout::Never.deadline::<ClockMock>(at(1_000)), None);
  }

  #[test]
  fn elapsed() {
    assert_eq!(millis_since(at(3_000), at(1_000)), 2_000);
    assert_eq!(millis_since(at(1_000), at(3_000)), 0);
    assert_eq!(epoch_millis(at(1_234)), 1_234);
    assert_eq!(epoch_micros(at(2)), 2_000);
  }
}
