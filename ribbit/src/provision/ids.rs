use ribbit_msg::Id;

/// Generates message IDs by counting up from a starting point,
/// wrapping around at `u16::MAX`.
///
/// `Id(0)` is never generated; [`Engine::submit`](crate::engine::Engine::submit)
/// treats it as "please provision an ID for me".
///
/// ```
/// use ribbit::provision::IdGenerator;
/// use ribbit_msg::Id;
///
/// let mut ids = IdGenerator::new(u16::MAX - 1);
///
/// assert_eq!(ids.next(|_| false), Some(Id(u16::MAX - 1)));
/// assert_eq!(ids.next(|_| false), Some(Id(u16::MAX)));
/// assert_eq!(ids.next(|_| false), Some(Id(1)));
/// assert_eq!(ids.next(|id| id == Id(2)), Some(Id(3)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdGenerator {
  next: u16,
}

impl IdGenerator {
  /// Create a generator whose first ID is `start` (or 1, if `start` is 0)
  pub fn new(start: u16) -> Self {
    Self { next: start.max(1) }
  }

  /// Start counting over from `start`
  pub fn reset(&mut self, start: u16) {
    *self = Self::new(start);
  }

  /// Yield the next ID for which `is_live` is false.
  ///
  /// Returns `None` when every ID is live.
  pub fn next(&mut self, is_live: impl Fn(Id) -> bool) -> Option<Id> {
    for _ in 0..u16::MAX {
      let id = Id(self.next);
      self.next = match self.next.wrapping_add(1) {
        | 0 => 1,
        | n => n,
      };

      if !is_live(id) {
        return Some(id);
      }
    }

    None
  }
}
