//! `ribbit` is the client side of a CoAP endpoint: it takes requests,
//! sends them, and turns whatever comes back over the network into
//! exactly one outcome per request.
//!
//! ## CoAP
//! CoAP is an application-level network protocol that copies the semantics of HTTP
//! to an environment conducive to **constrained** devices. (weak hardware, small battery capacity, etc.)
//!
//! It customarily sits on top of UDP, which guarantees nothing about delivery.
//! A CoAP client is expected to make up for that:
//! - **Confirmable** (CON) requests are retransmitted with exponential backoff
//!   until they are acknowledged or the retransmissions run out
//! - **Non-confirmable** (NON) requests are sent once
//! - Responses are matched to requests by message ID (acknowledgements) and
//!   token (responses), and duplicates are recognized and dropped
//!
//! ## Using ribbit
//! The [`Engine`](engine::Engine) does all of the above without owning a clock
//! or blocking: callers hand it the current time and any datagrams they received,
//! and it sends what needs sending and invokes handlers.
//!
//! ```
//! use ribbit::completion;
//! use ribbit::engine::Engine;
//! use ribbit::net::{Addrd, Transport};
//! use ribbit::req::ReqBuilder;
//! use ribbit_msg::{Message, TryFromBytes, TryIntoBytes, Type};
//!
//! # #[derive(Default)]
//! # struct Loopback(std::cell::RefCell<Vec<Addrd<Vec<u8>>>>);
//! # impl Transport for Loopback {
//! #   type Error = ();
//! #   fn send(&self, msg: Addrd<&[u8]>) -> nb::Result<(), ()> {
//! #     self.0.borrow_mut().push(msg.map(|b| b.to_vec()));
//! #     Ok(())
//! #   }
//! #   fn recv(&self, _: &mut [u8]) -> nb::Result<Addrd<usize>, ()> {
//! #     Err(nb::Error::WouldBlock)
//! #   }
//! # }
//! let server = "127.0.0.1:5683".parse().unwrap();
//! let clock = ribbit::std::Clock::new();
//! let now = || embedded_time::Clock::try_now(&clock).unwrap();
//!
//! let mut engine = Engine::new(Loopback::default());
//! let (tx, rx) = completion::channel();
//!
//! let req = ReqBuilder::get("temperature").build().unwrap();
//! let handle = engine.submit(now(), req, server, tx).unwrap();
//!
//! // pretend the server answered with a piggybacked 2.05 Content
//! let sent = engine.transport().0.borrow_mut().remove(0);
//! let req = Message::try_from_bytes(sent.data()).unwrap();
//! let mut rep = req.ack();
//! rep.code = ribbit::resp::code::CONTENT;
//! rep.token = req.token;
//! let rep = rep.try_into_bytes().unwrap();
//!
//! engine.deliver(&rep, server).unwrap();
//!
//! let rep = rx.poll().unwrap().unwrap();
//! assert_eq!(rep.data().ty, Type::Ack);
//! assert!(engine.state_of(handle).unwrap().is_terminal());
//!
//! engine.tick(now());
//! assert_eq!(engine.longest_pending(), None);
//! ```
//!
//! With the `std` feature, [`blocking::Client`] runs that loop over a
//! [`UdpSocket`](::std::net::UdpSocket) for you.

#![doc(html_root_url = "https://docs.rs/ribbit/0.1.0")]
#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(missing_copy_implementations)]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// warnings
#![cfg_attr(not(test), warn(unreachable_pub))]
// -
// features
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc as std_alloc;


pub(crate) mod logging;

/// Blocking CoAP client
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod blocking;

/// customizable retrying of fallible operations
pub mod retry;

/// responses
pub mod resp;

/// requests
pub mod req;

/// configuring runtime behavior
pub mod config;

/// time abstractions
pub mod time;

/// network abstractions
pub mod net;

pub mod provision;

/// A single request/response exchange
pub mod interaction;

pub mod completion;

/// Bookkeeping for in-flight interactions
pub mod registry;

pub mod engine;

/// `std`-only ribbit stuff
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod std;

mod option;

pub use option::ToCoapValue;

macro_rules! code {
  (rfc7252($section:literal) $name:ident = $c:literal * $d:literal) => {
    #[doc = concat!("See [RFC7252 Section ",
                    $section,
                    "](https://datatracker.ietf.org/doc/html/rfc7252#section-",
                    $section,
                    ")")]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: ribbit_msg::Code = ribbit_msg::Code::new($c, $d);
  };
}

pub(crate) use code;
