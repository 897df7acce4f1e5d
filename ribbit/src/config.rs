use embedded_time::duration::Milliseconds;

use crate::retry::{Attempts, Strategy};
use crate::time::Timeout;

/// Configuration options related to outbound CON requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Con {
  /// Retransmission strategy for CON requests that
  /// have not yet been ACKed.
  ///
  /// Defaults to an exponential strategy starting between
  /// 2 and 3 seconds:
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use ribbit::config::Con;
  /// use ribbit::retry::Strategy;
  ///
  /// assert_eq!(Con::default().retry_strategy,
  ///            Strategy::Exponential { init_min: Milliseconds(2_000),
  ///                                    init_max: Milliseconds(3_000) });
  /// ```
  pub retry_strategy: Strategy,
  /// Number of times we are allowed to resend a CON request
  /// before giving up on it.
  ///
  /// Defaults to 4 retransmissions.
  /// ```
  /// use ribbit::config::Con;
  /// use ribbit::retry::Attempts;
  ///
  /// assert_eq!(Con::default().max_retransmits, Attempts(4));
  /// ```
  pub max_retransmits: Attempts,
  /// How long to wait for the separate response
  /// to a CON request once it has been ACKed.
  ///
  /// Defaults to 93 seconds.
  /// ```
  /// use ribbit::config::Con;
  /// use ribbit::time::Timeout;
  ///
  /// assert_eq!(Con::default().acked_timeout, Timeout::Millis(93_000));
  /// ```
  pub acked_timeout: Timeout,
}

/// Configuration options related to outbound NON requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Non {
  /// How long to wait for a response to a NON request.
  ///
  /// NON requests are never retransmitted, so without
  /// a timeout an unanswered request stays pending until
  /// it is canceled.
  ///
  /// Defaults to never timing out.
  /// ```
  /// use ribbit::config::Non;
  /// use ribbit::time::Timeout;
  ///
  /// assert_eq!(Non::default().timeout, Timeout::Never);
  /// ```
  pub timeout: Timeout,
  /// Number of times we are allowed to retry sending a NON
  /// request after the transport failed to send it.
  ///
  /// Defaults to 4 attempts.
  /// ```
  /// use ribbit::config::Non;
  /// use ribbit::retry::Attempts;
  ///
  /// assert_eq!(Non::default().max_send_attempts, Attempts(4));
  /// ```
  pub max_send_attempts: Attempts,
}

/// Configuration options related to messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Msg {
  /// Seed used to generate message [`Token`](ribbit_msg::Token)s
  /// and the first message [`Id`](ribbit_msg::Id),
  /// customizable to allow for your application to generate tokens
  /// less guessably.
  ///
  /// The default value is 0, although it is
  /// best practice to set this to something else.
  /// (random integer, machine identifier)
  ///
  /// ```
  /// use ribbit::config::Msg;
  ///
  /// assert_eq!(Msg::default().token_seed, 0);
  /// ```
  pub token_seed: u16,

  /// See [`Con`]
  pub con: Con,

  /// See [`Non`]
  pub non: Non,
}

impl Default for Con {
  fn default() -> Self {
    Con { retry_strategy: Strategy::Exponential { init_min: Milliseconds(2_000),
                                                  init_max: Milliseconds(3_000) },
          max_retransmits: Attempts(4),
          acked_timeout: Timeout::Millis(93_000) }
  }
}

impl Default for Non {
  fn default() -> Self {
    Non { timeout: Timeout::Never,
          max_send_attempts: Attempts(4) }
  }
}

impl Default for Msg {
  fn default() -> Self {
    Msg { token_seed: 0,
          con: Con::default(),
          non: Non::default() }
  }
}

/// Runtime config
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Config {
  /// See [`Msg`]
  pub msg: Msg,
  /// Maximum number of interactions that
  /// can be tracked at a given moment
  ///
  /// Default value is `16`
  ///
  /// ```
  /// use ribbit::config::Config;
  ///
  /// assert_eq!(Config::default().max_interactions, 16);
  /// ```
  pub max_interactions: usize,
}

impl Default for Config {
  fn default() -> Self {
    Config { msg: Msg::default(),
             max_interactions: 16 }
  }
}

impl Config {
  /// Time from the first transmission of a CON request
  /// to its last retransmission.
  pub fn max_transmit_span_millis(&self) -> u64 {
    self.msg
        .con
        .retry_strategy
        .max_time(self.msg.con.max_retransmits)
        .0
  }

  /// Time from the first transmission of a CON request
  /// to giving up on it.
  pub fn max_transmit_wait_millis(&self) -> u64 {
    self.msg
        .con
        .retry_strategy
        .max_time(self.msg.con.max_retransmits + Attempts(1))
        .0
  }

  // TODO: estimate these from observed round-trip times
  pub(crate) fn max_latency_millis(&self) -> u64 {
    100_000
  }

  pub(crate) fn expected_processing_delay_millis(&self) -> u64 {
    2_000
  }

  /// Time from starting to send a CON request until
  /// any message referring to it can be considered stale.
  ///
  /// Terminal interactions that were never observed are
  /// forgotten after this long.
  ///
  /// ```
  /// use ribbit::config::Config;
  ///
  /// assert_eq!(Config::default().exchange_lifetime_millis(), 247_000);
  /// ```
  pub fn exchange_lifetime_millis(&self) -> u64 {
    self.max_transmit_span_millis()
    + (2 * self.max_latency_millis())
    + self.expected_processing_delay_millis()
  }
}
