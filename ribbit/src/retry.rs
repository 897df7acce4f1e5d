use core::ops::{Add, RangeInclusive, Sub};

use embedded_time::duration::Milliseconds;
use embedded_time::Instant;
use rand::Rng;

use crate::time::{self, Clock, Millis};

/// A non-blocking timer that allows a fixed-delay or exponential-backoff retry,
/// that lives alongside some operation to retry.
///
/// It does not _contain_ the work to be done; the owner asks the timer
/// [`what_should_i_do`](RetryTimer::what_should_i_do) and performs the work itself.
///
/// ```
/// use embedded_time::duration::Milliseconds;
/// use embedded_time::Instant;
/// use rand::SeedableRng;
/// use ribbit::retry::{Attempts, RetryTimer, Strategy, YouShould};
///
/// let at = |ms: u64| Instant::<ribbit::std::Clock>::new(ms * 1_000);
/// let mut rand = rand_chacha::ChaCha8Rng::seed_from_u64(0);
///
/// let strategy = Strategy::Exponential { init_min: Milliseconds(100),
///                                        init_max: Milliseconds(100) };
/// let mut retry = RetryTimer::new(at(0), strategy, Attempts(1), &mut rand);
///
/// assert_eq!(retry.what_should_i_do(at(99)), Err(nb::Error::WouldBlock));
/// assert_eq!(retry.what_should_i_do(at(100)), Ok(YouShould::Retry));
///
/// // the delay doubled; next deadline is 100 + 200
/// assert_eq!(retry.what_should_i_do(at(299)), Err(nb::Error::WouldBlock));
/// assert_eq!(retry.what_should_i_do(at(300)), Ok(YouShould::Cry));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RetryTimer<C: Clock> {
  deadline: Option<Instant<C>>,
  delay: Millis,
  strategy: Strategy,
  attempts: Attempts,
  max_attempts: Attempts,
}

/// A number of attempts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attempts(pub u16);

impl Add for Attempts {
  type Output = Attempts;

  fn add(self, rhs: Attempts) -> Attempts {
    Attempts(self.0.saturating_add(rhs.0))
  }
}

impl Sub for Attempts {
  type Output = Attempts;

  fn sub(self, rhs: Attempts) -> Attempts {
    Attempts(self.0.saturating_sub(rhs.0))
  }
}

/// Result of [`RetryTimer.what_should_i_do`].
///
/// This tells you if a retry should be attempted or not.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum YouShould {
  /// Attempts have been exhausted and the work that is
  /// being retried should be considered poisoned.
  Cry,
  /// A retry should be performed
  Retry,
}

impl<C: Clock> RetryTimer<C> {
  /// Create a new retrier, whose first deadline is `start`
  /// plus a delay drawn from `strategy`'s range.
  pub fn new(start: Instant<C>,
             strategy: Strategy,
             max_attempts: Attempts,
             rand: &mut impl Rng)
             -> Self {
    let init = if strategy.has_jitter() {
      Milliseconds(rand.gen_range(strategy.range()))
    } else {
      Milliseconds(*strategy.range().start())
    };

    Self { deadline: time::add_millis(start, init.0),
           delay: init,
           strategy,
           attempts: Attempts(0),
           max_attempts }
  }

  /// A retrier that is ready right away and retries with no delay;
  /// used for work that failed for reasons unrelated to time (e.g. a send error).
  pub fn immediate(start: Instant<C>, max_attempts: Attempts) -> Self {
    Self { deadline: Some(start),
           delay: Milliseconds(0),
           strategy: Strategy::Delay { min: Milliseconds(0),
                                       max: Milliseconds(0) },
           attempts: Attempts(0),
           max_attempts }
  }

  /// When the thing we keep trying fails, invoke this to
  /// tell the retrytimer "it failed again! what do I do??"
  ///
  /// Returns `nb::Error::WouldBlock` when we have not yet
  /// waited the appropriate amount of time to retry.
  ///
  /// Returning [`YouShould::Retry`] counts as an attempt
  /// and schedules the next deadline.
  pub fn what_should_i_do(&mut self,
                          now: Instant<C>)
                          -> nb::Result<YouShould, core::convert::Infallible> {
    if !self.is_ready(now) {
      Err(nb::Error::WouldBlock)
    } else if self.attempts >= self.max_attempts {
      Ok(YouShould::Cry)
    } else {
      self.attempts.0 += 1;
      self.delay = match self.strategy {
        | Strategy::Delay { .. } => self.delay,
        | Strategy::Exponential { .. } => Milliseconds(self.delay.0.saturating_mul(2)),
      };
      self.deadline = time::add_millis(now, self.delay.0);
      Ok(YouShould::Retry)
    }
  }

  /// Make the timer ready right away, without resetting
  /// the number of attempts or the backoff.
  pub fn expire(&mut self, now: Instant<C>) {
    self.deadline = Some(now);
  }

  /// Check if the deadline has been reached
  pub fn is_ready(&self, now: Instant<C>) -> bool {
    self.deadline.map(|deadline| now >= deadline).unwrap_or(false)
  }

  /// When the timer will next be ready
  pub fn deadline(&self) -> Option<Instant<C>> {
    self.deadline
  }

  /// Number of retries performed so far
  pub fn attempts(&self) -> Attempts {
    self.attempts
  }

  /// The delay that was used to compute the current deadline
  pub fn delay(&self) -> Millis {
    self.delay
  }
}

/// Strategy to employ when retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strategy {
  /// Generate a random delay between `min` and `max`,
  /// and wait until this delay has passed between attempts.
  ///
  /// After each failed attempt, double the delay before retrying again.
  Exponential {
    /// Minimum (inclusive) delay for second attempt
    init_min: Milliseconds<u64>,
    /// Maximum (inclusive) delay for second attempt
    init_max: Milliseconds<u64>,
  },
  /// Generate a random delay between `min` and `max`,
  /// and wait until this delay has passed between attempts.
  Delay {
    /// Minimum (inclusive) delay for attempts
    min: Milliseconds<u64>,
    /// Maximum (inclusive) delay for attempts
    max: Milliseconds<u64>,
  },
}

impl Strategy {
  /// Are min & max delays the same? if so, we should probably skip the random number generation.
  pub fn has_jitter(&self) -> bool {
    let rng = self.range();
    rng.start() != rng.end()
  }

  /// Get the min & max durations as an inclusive range
  pub fn range(&self) -> RangeInclusive<u64> {
    match self {
      | &Self::Delay { min: Milliseconds(min),
                       max: Milliseconds(max), } => (min..=max.max(min)),

      | &Self::Exponential { init_min: Milliseconds(min),
                             init_max: Milliseconds(max), } => (min..=max.max(min)),
    }
  }

  /// Get the longest amount of time this strategy can wait
  /// across `attempts` consecutive delays.
  ///
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use ribbit::retry::{Attempts, Strategy};
  ///
  /// let exp = Strategy::Exponential { init_min: Milliseconds(2_000u64),
  ///                                   init_max: Milliseconds(3_000u64) };
  /// // 3s + 6s + 12s + 24s
  /// assert_eq!(exp.max_time(Attempts(4)), Milliseconds(45_000u64));
  /// ```
  pub fn max_time(&self, attempts: Attempts) -> Milliseconds<u64> {
    Milliseconds(match self {
                   | Self::Exponential { init_max, .. } => {
                     (1..=attempts.0).map(|n| Self::delay_exp(*init_max, n))
                                     .fold(0u64, u64::saturating_add)
                   },
                   | Self::Delay { max: Milliseconds(max),
                                   .. } => max.saturating_mul(attempts.0 as u64),
                 })
  }

  /// Given the initial delay and the number of an attempt,
  /// yields the delay that precedes that attempt.
  const fn delay_exp(Milliseconds(init): Milliseconds<u64>, attempt: u16) -> u64 {
    // | attempt | delay            |
    // | 1       | init             |
    // | 2       | init * 2         |
    // | 3       | init * 4         |
    // | ...     | ...              |
    // | n       | init * 2^(n-1)   |
    init.saturating_mul(2u64.saturating_pow((attempt - 1) as u32))
  }
}

#[cfg(test)]
mod test {
  use rand::SeedableRng;
  use rand_chacha::ChaCha8Rng;

  use super::*;
  use crate::test::at;

  fn rand() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(0)
  }

  #[test]
  fn delay_retrier() {
    let mut retry = RetryTimer::new(at(0),
                                    Strategy::Delay { min: Milliseconds(1000),
                                                      max: Milliseconds(1000) },
                                    Attempts(3),
                                    &mut rand());

    assert_eq!(retry.what_should_i_do(at(999)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(at(1000)).unwrap(), YouShould::Retry);

    assert_eq!(retry.what_should_i_do(at(1999)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(at(2000)).unwrap(), YouShould::Retry);

    // late; delay counts from when we actually retried
    assert_eq!(retry.what_should_i_do(at(10_000)).unwrap(), YouShould::Retry);
    assert_eq!(retry.what_should_i_do(at(10_999)).unwrap_err(),
               nb::Error::WouldBlock);

    assert_eq!(retry.what_should_i_do(at(11_000)).unwrap(), YouShould::Cry);
    assert_eq!(retry.attempts(), Attempts(3));
  }

  #[test]
  fn exponential_retrier() {
    let mut retry = RetryTimer::new(at(0),
                                    Strategy::Exponential { init_min: Milliseconds(1000),
                                                            init_max: Milliseconds(1000) },
                                    Attempts(4),
                                    &mut rand());

    let mut expected_deadlines = [1_000u64, 3_000, 7_000, 15_000, 31_000].into_iter();
    let mut deadline = expected_deadlines.next().unwrap();

    for _ in 0..4 {
      assert_eq!(retry.what_should_i_do(at(deadline - 1)).unwrap_err(),
                 nb::Error::WouldBlock);
      assert_eq!(retry.what_should_i_do(at(deadline)).unwrap(), YouShould::Retry);
      deadline = expected_deadlines.next().unwrap();
    }

    assert_eq!(retry.what_should_i_do(at(deadline - 1)).unwrap_err(),
               nb::Error::WouldBlock);
    assert_eq!(retry.what_should_i_do(at(deadline)).unwrap(), YouShould::Cry);
  }

  #[test]
  fn jitter_within_range() {
    let strategy = Strategy::Exponential { init_min: Milliseconds(2_000),
                                           init_max: Milliseconds(3_000) };
    let mut rand = rand();

    for _ in 0..32 {
      let retry = RetryTimer::new(at(0), strategy, Attempts(4), &mut rand);
      assert!(strategy.range().contains(&retry.delay().0));
    }
  }

  #[test]
  fn backoff_is_monotone_and_bounded() {
    let strategy = Strategy::Exponential { init_min: Milliseconds(2_000),
                                           init_max: Milliseconds(3_000) };
    let mut retry = RetryTimer::new(at(0), strategy, Attempts(4), &mut rand());

    let mut now = 0;
    let mut last = 0;
    while let Some(deadline) = retry.deadline() {
      let deadline = crate::time::epoch_millis(deadline);
      let interval = deadline - now;
      assert!(interval >= last);
      last = interval;
      now = deadline;

      if retry.what_should_i_do(at(now)).unwrap() == YouShould::Cry {
        break;
      }
    }

    assert!(now <= strategy.max_time(Attempts(5)).0);
  }

  #[test]
  fn expire() {
    let mut retry = RetryTimer::new(at(0),
                                    Strategy::Delay { min: Milliseconds(1000),
                                                      max: Milliseconds(1000) },
                                    Attempts(1),
                                    &mut rand());
    retry.expire(at(10));
    assert_eq!(retry.what_should_i_do(at(10)).unwrap(), YouShould::Retry);
    assert_eq!(retry.what_should_i_do(at(10)).unwrap_err(),
               nb::Error::WouldBlock);
  }

  #[test]
  fn immediate() {
    let mut retry = RetryTimer::<crate::test::ClockMock>::immediate(at(5), Attempts(1));
    assert_eq!(retry.what_should_i_do(at(5)).unwrap(), YouShould::Retry);
    assert_eq!(retry.what_should_i_do(at(5)).unwrap(), YouShould::Cry);
  }

  #[test]
  fn exp_calculation() {
    let init = Milliseconds(100);
    assert_eq!(Strategy::delay_exp(init, 1), 100);
    assert_eq!(Strategy::delay_exp(init, 2), 200);
    assert_eq!(Strategy::delay_exp(init, 3), 400);
  }
}
