//! Low-level representation of CoAP messages.
//!
//! The most notable item in `ribbit_msg` is [`Message`];
//! a CoAP message very close to the actual byte layout.
//!
//! Messages are converted to bytes with [`TryIntoBytes`]
//! and parsed from bytes with [`TryFromBytes`].
//!
//! ```
//! use ribbit_msg::*;
//!
//! let mut msg = Message::new(Type::Con, Code::POST, Id(1), Token::opaque(b"hello"));
//! msg.add(known::URI_PATH, b"echo".to_vec());
//! msg.payload = Payload(b"hello from CoAP".to_vec());
//!
//! let bytes = msg.clone().try_into_bytes().unwrap();
//! assert_eq!(Message::try_from_bytes(&bytes).unwrap(), msg);
//! ```
//!
//! ## Options
//! Options are stored as a flat list of `(number, value)` pairs in the order they were added.
//! The wire format delta-encodes option numbers, so [`TryIntoBytes`] stable-sorts options
//! by number before writing them; repeated options keep their relative order.
//!
//! When parsing, options that this crate does not recognize are handled according to
//! the critical / elective bit of their number (see [`OptNumber::must_be_processed`]):
//! unknown elective options are skipped, unknown critical options fail the parse.

#![doc(html_root_url = "https://docs.rs/ribbit-msg/0.1.0")]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(not(test), forbid(missing_debug_implementations, unreachable_pub))]
#![cfg_attr(not(test), deny(unsafe_code, missing_copy_implementations))]
#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
#![deny(missing_docs)]

extern crate alloc as std_alloc;

/// Byte cursor used while parsing
pub mod cursor;

#[doc(hidden)]
pub mod from_bytes;

/// Message structs
pub mod msg;

#[doc(hidden)]
pub mod to_bytes;

#[doc(inline)]
pub use cursor::Cursor;
#[doc(inline)]
pub use from_bytes::TryFromBytes;
#[doc(inline)]
pub use msg::*;
#[doc(inline)]
pub use to_bytes::{MessageToBytesError, TryIntoBytes};

#[cfg(test)]
pub(crate) fn test_msg() -> (Message, Vec<u8>) {
  let header: [u8; 4] = 0b0100_0001_0100_0101_0000_0000_0000_0001_u32.to_be_bytes();
  let token: [u8; 1] = [254u8];
  let content_format: &[u8] = b"application/json";
  let options: [&[u8]; 2] = [&[0b_1100_1101u8, 0b00000011u8], content_format];
  let payload: [&[u8]; 2] = [&[0b1111_1111_u8], b"hello, world!"];
  let bytes = [header.as_ref(),
               token.as_ref(),
               options.concat().as_ref(),
               payload.concat().as_ref()].concat();

  let msg = Message { id: Id(1),
                      ty: Type::Con,
                      ver: Version(1),
                      token: Token(tinyvec::array_vec!([u8; 8] => 254)),
                      opts: vec![Opt { number: OptNumber(12),
                                       value: OptValue(content_format.to_vec()) }],
                      code: Code { class: 2,
                                   detail: 5 },
                      payload: Payload(b"hello, world!".to_vec()) };
  (msg, bytes)
}
