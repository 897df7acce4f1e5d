//! Responses arrive as plain [`Message`](ribbit_msg::Message)s (see
//! [`Outcome`](crate::interaction::Outcome)); this module names the
//! codes a server may answer with.
//!
//! ```
//! use ribbit::resp::code;
//! use ribbit_msg::Code;
//!
//! assert_eq!(code::CONTENT, Code::new(2, 5));
//! assert!(code::CONTENT.is_success());
//! assert!(!code::NOT_FOUND.is_success());
//! ```

/// Response codes
pub mod code;
