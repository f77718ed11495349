//! Deferred effects.
//!
//! [`TaskEither`] describes an asynchronous computation that resolves to an
//! [`Either`](crate::control::Either). Effects run only when the task is
//! awaited and run again on every invocation.
//!
//! ```rust
//! use roster::control::Either;
//! use roster::effect::TaskEither;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let task: TaskEither<String, u32> = TaskEither::right(20)
//!     .map(|value| value + 1)
//!     .and_then_either(|value| {
//!         if value % 2 == 1 {
//!             Either::Right(value * 2)
//!         } else {
//!             Either::Left("even".to_string())
//!         }
//!     });
//!
//! assert_eq!(task.run().await, Either::Right(42));
//! # }
//! ```

mod task_either;

pub use task_either::{TaskEither, TaskPanic};
