use tinyvec::ArrayVec;

#[allow(unused_imports)]
use crate::Id;

/// # Message Token
/// The Token is used to match a response with a request.  The token
/// value is a sequence of 0 to 8 bytes.
///
/// Every message carries a token, even if it is of zero length.
/// Unlike [`Id`], which matches an Acknowledgement to the Confirmable
/// message it acknowledges, the token matches a response to its request,
/// even when the response arrives separately from the acknowledgement.
///
/// See [RFC7252 - Token](https://datatracker.ietf.org/doc/html/rfc7252#section-5.3.1) for context
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Token(pub ArrayVec<[u8; 8]>);

impl Token {
  /// Take an arbitrary-length sequence of bytes and turn it into an opaque message token
  ///
  /// Currently uses the BLAKE2 hashing algorithm, but this may change in the future.
  ///
  /// ```
  /// use ribbit_msg::Token;
  ///
  /// let my_token = Token::opaque(&[0, 1, 2]);
  /// assert_eq!(my_token.len(), 8);
  /// ```
  pub fn opaque(data: &[u8]) -> Token {
    use blake2::digest::consts::U8;
    use blake2::{Blake2b, Digest};

    let mut digest = Blake2b::<U8>::new();
    digest.update(data);
    Token(Into::<[u8; 8]>::into(digest.finalize()).into())
  }

  /// Number of bytes in the token (0..=8)
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Whether this is the zero-length token
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// The token's bytes
  pub fn as_bytes(&self) -> &[u8] {
    self.0.as_slice()
  }
}

impl TryFrom<&[u8]> for Token {
  type Error = usize;

  /// Fails with the length of the slice if it is longer than 8 bytes
  fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
    ArrayVec::try_from(bytes).map(Token).map_err(|_| bytes.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn opaque_is_deterministic() {
    assert_eq!(Token::opaque(b"abc"), Token::opaque(b"abc"));
    assert_ne!(Token::opaque(b"abc"), Token::opaque(b"abd"));
  }

  #[test]
  fn from_slice() {
    assert_eq!(Token::try_from([1u8, 2].as_ref()).map(|t| t.len()), Ok(2));
    assert_eq!(Token::try_from([0u8; 9].as_ref()), Err(9));
  }
}
