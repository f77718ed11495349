//! `TaskEither` - a repeatable, deferred asynchronous computation that
//! resolves to an [`Either`].
//!
//! A `TaskEither` only *describes* an effect. Nothing happens until
//! [`TaskEither::run`] is awaited, and every call to `run` performs the
//! effect again: there is no memoization, so re-running a fetch task issues a
//! fresh request. Clones share the description, not a result.
//!
//! Panics raised inside the effect never escape `run`; they are caught and
//! turned into a `Left` through the left type's `From<TaskPanic>`
//! implementation.
//!
//! # Examples
//!
//! ```rust
//! use roster::control::Either;
//! use roster::effect::TaskEither;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let invocations = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&invocations);
//!
//! let task: TaskEither<String, usize> = TaskEither::new(move || {
//!     let counter = Arc::clone(&counter);
//!     async move { Either::Right(counter.fetch_add(1, Ordering::SeqCst) + 1) }
//! });
//!
//! // Not executed yet.
//! assert_eq!(invocations.load(Ordering::SeqCst), 0);
//!
//! assert_eq!(task.run().await, Either::Right(1));
//! assert_eq!(task.run().await, Either::Right(2));
//! # }
//! ```

use std::any::Any;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};

use crate::control::Either;

type Effect<L, R> = Arc<dyn Fn() -> BoxFuture<'static, Either<L, R>> + Send + Sync>;

/// A panic captured while running a [`TaskEither`].
///
/// Left types used with `TaskEither` convert from this so that a panicking
/// effect still resolves to a `Left`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task panicked: {message}")]
pub struct TaskPanic {
    message: String,
}

impl TaskPanic {
    /// Creates a `TaskPanic` with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self { message }
    }

    /// The panic message, or a placeholder when the payload was not a string.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TaskPanic> for String {
    fn from(panic: TaskPanic) -> Self {
        panic.to_string()
    }
}

/// A deferred, re-invokable asynchronous computation producing `Either<L, R>`.
pub struct TaskEither<L, R> {
    effect: Effect<L, R>,
}

impl<L, R> Clone for TaskEither<L, R> {
    fn clone(&self) -> Self {
        Self {
            effect: Arc::clone(&self.effect),
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

impl<L: Send + 'static, R: Send + 'static> TaskEither<L, R> {
    /// Creates a `TaskEither` from a factory of futures.
    ///
    /// The factory is called once per [`run`](Self::run), so each run gets a
    /// fresh future and performs the effect again.
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Either<L, R>> + Send + 'static,
    {
        Self {
            effect: Arc::new(move || action().boxed()),
        }
    }

    /// Creates a `TaskEither` from a factory of `Result` futures.
    ///
    /// `Ok` maps to `Right`, `Err(e)` maps to `Left(e.into())`.
    pub fn try_new<F, Fut, E>(action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: Into<L> + 'static,
    {
        Self::new(move || action().map(|result| Either::from(result.map_err(Into::into))))
    }
}

impl<L, R> TaskEither<L, R>
where
    L: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// A task that always succeeds with `value`, performing no effect.
    pub fn right(value: R) -> Self {
        Self::from_either(Either::Right(value))
    }

    /// A task that always fails with `error`, performing no effect.
    pub fn left(error: L) -> Self {
        Self::from_either(Either::Left(error))
    }

    /// Lifts an already computed `Either`.
    pub fn from_either(either: Either<L, R>) -> Self {
        Self::new(move || futures::future::ready(either.clone()))
    }
}

// =============================================================================
// Execution
// =============================================================================

impl<L, R> TaskEither<L, R>
where
    L: From<TaskPanic> + Send + 'static,
    R: Send + 'static,
{
    /// Performs the effect and resolves to its `Either`.
    ///
    /// Each call starts a new invocation. A panic in the effect resolves to
    /// `Left(L::from(TaskPanic))` instead of unwinding into the caller.
    pub fn run(&self) -> BoxFuture<'static, Either<L, R>> {
        let effect = Arc::clone(&self.effect);
        AssertUnwindSafe(async move { effect().await })
            .catch_unwind()
            .map(|outcome| {
                outcome.unwrap_or_else(|payload| {
                    Either::Left(L::from(TaskPanic::from_payload(payload.as_ref())))
                })
            })
            .boxed()
    }
}

// =============================================================================
// Composition
// =============================================================================

impl<L, R> TaskEither<L, R>
where
    L: From<TaskPanic> + Send + 'static,
    R: Send + 'static,
{
    /// Transforms the success value.
    pub fn map<T, F>(self, function: F) -> TaskEither<L, T>
    where
        T: Send + 'static,
        F: Fn(R) -> T + Send + Sync + 'static,
    {
        let function = Arc::new(function);
        TaskEither::new(move || {
            let pending = self.run();
            let function = Arc::clone(&function);
            async move { pending.await.map_right(|value| function(value)) }
        })
    }

    /// Transforms the failure value.
    pub fn map_left<T, F>(self, function: F) -> TaskEither<T, R>
    where
        T: Send + 'static,
        F: Fn(L) -> T + Send + Sync + 'static,
    {
        let function = Arc::new(function);
        TaskEither::new(move || {
            let pending = self.run();
            let function = Arc::clone(&function);
            async move { pending.await.map_left(|error| function(error)) }
        })
    }

    /// Sequences a dependent task. The first `Left` short-circuits: the
    /// continuation is never built or run.
    pub fn and_then<T, F>(self, function: F) -> TaskEither<L, T>
    where
        T: Send + 'static,
        F: Fn(R) -> TaskEither<L, T> + Send + Sync + 'static,
    {
        let function = Arc::new(function);
        TaskEither::new(move || {
            let pending = self.run();
            let function = Arc::clone(&function);
            async move {
                match pending.await {
                    Either::Left(error) => Either::Left(error),
                    Either::Right(value) => function(value).run().await,
                }
            }
        })
    }

    /// Sequences a pure, synchronous step such as a validator.
    pub fn and_then_either<T, F>(self, function: F) -> TaskEither<L, T>
    where
        T: Send + 'static,
        F: Fn(R) -> Either<L, T> + Send + Sync + 'static,
    {
        let function = Arc::new(function);
        TaskEither::new(move || {
            let pending = self.run();
            let function = Arc::clone(&function);
            async move { pending.await.flat_map(|value| function(value)) }
        })
    }

    /// Observes a failure without changing it.
    pub fn inspect_left<F>(self, function: F) -> Self
    where
        F: Fn(&L) + Send + Sync + 'static,
    {
        let function = Arc::new(function);
        Self::new(move || {
            let pending = self.run();
            let function = Arc::clone(&function);
            async move {
                let outcome = pending.await;
                if let Either::Left(error) = &outcome {
                    function(error);
                }
                outcome
            }
        })
    }

    /// Runs every task concurrently and collects the successes in input order.
    ///
    /// All tasks are awaited before the result is assembled; if any failed,
    /// the first `Left` in input order is returned.
    pub fn sequence(tasks: Vec<Self>) -> TaskEither<L, Vec<R>> {
        TaskEither::new(move || {
            let pending: Vec<_> = tasks.iter().map(Self::run).collect();
            async move { collect_in_order(join_all(pending).await) }
        })
    }

    /// Maps every item to a task, runs them concurrently and collects the
    /// successes in input order. See [`sequence`](Self::sequence).
    pub fn traverse<I, F>(items: Vec<I>, function: F) -> TaskEither<L, Vec<R>>
    where
        I: Clone + Send + Sync + 'static,
        F: Fn(I) -> Self + Send + Sync + 'static,
    {
        TaskEither::new(move || {
            let pending: Vec<_> = items
                .iter()
                .cloned()
                .map(|item| function(item).run())
                .collect();
            async move { collect_in_order(join_all(pending).await) }
        })
    }
}

fn collect_in_order<L, R>(outcomes: Vec<Either<L, R>>) -> Either<L, Vec<R>> {
    let mut values = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Either::Left(error) => return Either::Left(error),
            Either::Right(value) => values.push(value),
        }
    }
    Either::Right(values)
}

// =============================================================================
// Await Support
// =============================================================================

impl<L, R> IntoFuture for TaskEither<L, R>
where
    L: From<TaskPanic> + Send + 'static,
    R: Send + 'static,
{
    type Output = Either<L, R>;
    type IntoFuture = BoxFuture<'static, Either<L, R>>;

    fn into_future(self) -> Self::IntoFuture {
        self.run()
    }
}

impl<L, R> IntoFuture for &TaskEither<L, R>
where
    L: From<TaskPanic> + Send + 'static,
    R: Send + 'static,
{
    type Output = Either<L, R>;
    type IntoFuture = BoxFuture<'static, Either<L, R>>;

    fn into_future(self) -> Self::IntoFuture {
        self.run()
    }
}

impl<L, R> fmt::Debug for TaskEither<L, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("<TaskEither>")
    }
}
