//! Generating message [`Id`](ribbit_msg::Id)s and [`Token`](ribbit_msg::Token)s
//! for outbound requests.
//!
//! Generators are plain values owned by whoever sends messages
//! (usually an [`Engine`](crate::engine::Engine)); they never reach
//! for global state. Both ask the caller whether a candidate is
//! already held by a live interaction so that uniqueness is decided
//! by the owner's registry, not by the generator.

mod ids;
mod tokens;

#[doc(inline)]
pub use ids::IdGenerator;
#[doc(inline)]
pub use tokens::TokenGenerator;
