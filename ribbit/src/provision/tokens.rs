use ribbit_msg::Token;

/// How many candidates [`TokenGenerator::next`] tries before giving up
const MAX_ATTEMPTS: usize = 8;

/// Generates opaque 8-byte tokens from a seed, a counter and the
/// current time.
///
/// The seed makes tokens less guessable across machines,
/// the counter makes tokens generated within the same millisecond differ.
///
/// ```
/// use ribbit::provision::TokenGenerator;
///
/// let mut tokens = TokenGenerator::new(1234);
/// let a = tokens.next(0, |_| false).unwrap();
/// let b = tokens.next(0, |_| false).unwrap();
///
/// assert_eq!(a.len(), 8);
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenGenerator {
  seed: u16,
  counter: u32,
}

impl TokenGenerator {
  /// Create a token generator
  pub fn new(seed: u16) -> Self {
    Self { seed, counter: 0 }
  }

  /// Reset the counter
  pub fn reset(&mut self) {
    self.counter = 0;
  }

  /// Yield a token for which `is_live` is false, derived from
  /// the seed, the counter and `now_millis`.
  ///
  /// Returns `None` if every candidate collided with a live token.
  pub fn next(&mut self, now_millis: u64, is_live: impl Fn(Token) -> bool) -> Option<Token> {
    (0..MAX_ATTEMPTS).map(|_| self.candidate(now_millis))
                     .find(|t| !is_live(*t))
  }

  fn candidate(&mut self, now_millis: u64) -> Token {
    let counter = self.counter;
    self.counter = self.counter.wrapping_add(1);

    #[allow(clippy::many_single_char_names)]
    let bytes = {
      let ([a, b], [c, d, e, f], [g, h, i, j, k, l, m, n]) =
        (self.seed.to_be_bytes(), counter.to_be_bytes(), now_millis.to_be_bytes());
      [a, b, c, d, e, f, g, h, i, j, k, l, m, n]
    };

    Token::opaque(&bytes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deterministic_per_seed() {
    let mut a = TokenGenerator::new(1);
    let mut b = TokenGenerator::new(1);
    let mut c = TokenGenerator::new(2);

    let ta = a.next(100, |_| false);
    assert_eq!(ta, b.next(100, |_| false));
    assert_ne!(ta, c.next(100, |_| false));
  }

  #[test]
  fn skips_live() {
    let mut tokens = TokenGenerator::new(0);
    let first = TokenGenerator::new(0).next(0, |_| false).unwrap();

    let t = tokens.next(0, |t| t == first).unwrap();
    assert_ne!(t, first);
  }

  #[test]
  fn gives_up() {
    let mut tokens = TokenGenerator::new(0);
    assert_eq!(tokens.next(0, |_| true), None);
  }

  #[test]
  fn reset() {
    let mut tokens = TokenGenerator::new(0);
    let first = tokens.next(0, |_| false);
    tokens.reset();
    assert_eq!(tokens.next(0, |_| false), first);
  }
}
