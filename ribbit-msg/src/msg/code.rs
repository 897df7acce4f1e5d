#[cfg(feature = "std")]
use std::string::String;

/// # Message Code
/// 8-bit unsigned integer, split into a 3-bit class (most
/// significant bits) and a 5-bit detail (least significant bits),
/// documented as "c.dd" where "c" is a digit from 0 to 7 for the
/// 3-bit subfield and "dd" are two digits from 00 to 31 for the 5-bit
/// subfield.
///
/// # Examples
/// ```
/// use ribbit_msg::Code;
/// assert_eq!(Code { class: 2, detail: 5 }.to_string(), "2.05".to_string())
/// ```
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Code {
  /// The "class" of message codes identify it as a request or response, and provides the class of response status:
  ///
  /// |class|meaning|
  /// |---|---|
  /// |`0`|Message is a request|
  /// |`2`|Message is a success response|
  /// |`4`|Message is a client error response|
  /// |`5`|Message is a server error response|
  pub class: u8,

  /// 2-digit integer (range `[0, 32)`) that provides granular information about the response status.
  pub detail: u8,
}

/// Whether a code belongs to a request, a response or
/// an Empty message.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum CodeKind {
  /// 0.00
  Empty,
  /// 0.01 - 0.31
  Request,
  /// 2.xx, 4.xx and 5.xx
  Response,
  /// 1.xx, 3.xx, 6.xx and 7.xx
  Reserved,
}

impl Code {
  /// 0.00 Empty message
  pub const EMPTY: Self = Self::new(0, 0);
  /// 0.01 GET
  pub const GET: Self = Self::new(0, 1);
  /// 0.02 POST
  pub const POST: Self = Self::new(0, 2);
  /// 0.03 PUT
  pub const PUT: Self = Self::new(0, 3);
  /// 0.04 DELETE
  pub const DELETE: Self = Self::new(0, 4);

  /// Create a new Code
  ///
  /// ```
  /// use ribbit_msg::Code;
  ///
  /// let content = Code::new(2, 05);
  /// ```
  pub const fn new(class: u8, detail: u8) -> Self {
    Self { class, detail }
  }

  /// Classify this code
  ///
  /// ```
  /// use ribbit_msg::{Code, CodeKind};
  ///
  /// assert_eq!(Code::EMPTY.kind(), CodeKind::Empty);
  /// assert_eq!(Code::POST.kind(), CodeKind::Request);
  /// assert_eq!(Code::new(2, 05).kind(), CodeKind::Response);
  /// assert_eq!(Code::new(7, 01).kind(), CodeKind::Reserved);
  /// ```
  pub fn kind(&self) -> CodeKind {
    match (self.class, self.detail) {
      | (0, 0) => CodeKind::Empty,
      | (0, _) => CodeKind::Request,
      | (2 | 4 | 5, _) => CodeKind::Response,
      | _ => CodeKind::Reserved,
    }
  }

  /// Whether this code is in the 2.xx (success) class
  pub fn is_success(&self) -> bool {
    self.class == 2
  }

  /// Get the human string representation of a message code
  ///
  /// # Returns
  /// A `char` array
  ///
  /// This is to avoid unnecessary heap allocation,
  /// you can create a `String` with `FromIterator::<String>::from_iter`,
  /// or if the `std` feature is enabled there is a `ToString` implementation provided for Code.
  /// ```
  /// use ribbit_msg::Code;
  ///
  /// let code = Code { class: 2, detail: 5 };
  /// let chars = code.to_human();
  /// let string = String::from_iter(chars);
  /// assert_eq!(string, "2.05".to_string());
  /// ```
  pub fn to_human(&self) -> [char; 4] {
    let to_char = |d: u8| char::from_digit(d.into(), 10).unwrap_or('?');
    [to_char(self.class),
     '.',
     to_char(self.detail / 10),
     to_char(self.detail % 10)]
  }
}

#[cfg(feature = "std")]
impl ToString for Code {
  fn to_string(&self) -> String {
    String::from_iter(self.to_human())
  }
}

impl From<u8> for Code {
  fn from(b: u8) -> Self {
    let class = b >> 5;
    let detail = b & 0b0011111;

    Code { class, detail }
  }
}

impl From<Code> for u8 {
  fn from(code: Code) -> u8 {
    let class = code.class << 5;
    let detail = code.detail;

    class | detail
  }
}
