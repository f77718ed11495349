//! Control structures.
//!
//! - [`Either`]: the success-or-failure value every fallible step returns.

mod either;

pub use either::Either;
