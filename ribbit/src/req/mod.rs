/// Request builder
pub mod builder;

#[doc(inline)]
pub use builder::*;
