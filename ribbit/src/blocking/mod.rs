/// A CoAP client that blocks until each request completes
pub mod client;

#[doc(inline)]
pub use client::*;
