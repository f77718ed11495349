//! Either type - the success-or-failure value of a pure computation.
//!
//! `Either<L, R>` is the return channel of every fallible step in this crate.
//! `Left` carries the failure, `Right` carries the success. Expected failure
//! modes (network error, validation error, missing input) travel through this
//! type instead of panics.
//!
//! # Examples
//!
//! ```rust
//! use roster::control::Either;
//!
//! fn parse_id(raw: &str) -> Either<String, u64> {
//!     raw.parse::<u64>()
//!         .map_err(|error| format!("id - {error}"))
//!         .into()
//! }
//!
//! assert!(parse_id("7").is_right());
//! assert!(parse_id("seven").is_left());
//!
//! let message = parse_id("seven").fold(|error| error, |id| id.to_string());
//! assert!(message.starts_with("id - "));
//! ```

use std::fmt;

/// A value that is either a failure (`Left`) or a success (`Right`).
///
/// Exactly one variant is ever set. Use [`Either::is_left`] and
/// [`Either::is_right`] to discriminate, or pattern match directly.
///
/// # Examples
///
/// ```rust
/// use roster::control::Either;
///
/// let country: Either<String, &str> = Either::Right("Australia");
/// assert_eq!(country.map_right(str::len), Either::Right(9));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    /// The failure variant.
    Left(L),
    /// The success variant.
    Right(R),
}

impl<L, R> Either<L, R> {
    // =========================================================================
    // Type Checking
    // =========================================================================

    /// Returns `true` if this is a `Left` value.
    #[inline]
    pub const fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    /// Returns `true` if this is a `Right` value.
    #[inline]
    pub const fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    // =========================================================================
    // Value Extraction
    // =========================================================================

    /// Converts into `Some(l)` for `Left(l)`, `None` otherwise.
    #[inline]
    pub fn left(self) -> Option<L> {
        match self {
            Self::Left(value) => Some(value),
            Self::Right(_) => None,
        }
    }

    /// Converts into `Some(r)` for `Right(r)`, `None` otherwise.
    #[inline]
    pub fn right(self) -> Option<R> {
        match self {
            Self::Left(_) => None,
            Self::Right(value) => Some(value),
        }
    }

    /// Borrows the left value if present.
    #[inline]
    pub const fn left_ref(&self) -> Option<&L> {
        match self {
            Self::Left(value) => Some(value),
            Self::Right(_) => None,
        }
    }

    /// Borrows the right value if present.
    #[inline]
    pub const fn right_ref(&self) -> Option<&R> {
        match self {
            Self::Left(_) => None,
            Self::Right(value) => Some(value),
        }
    }

    // =========================================================================
    // Mapping Operations
    // =========================================================================

    /// Transforms the failure, leaving a success untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roster::control::Either;
    ///
    /// let failure: Either<&str, u64> = Either::Left("timeout");
    /// assert_eq!(
    ///     failure.map_left(|reason| format!("Request error: {reason}")),
    ///     Either::Left("Request error: timeout".to_string())
    /// );
    /// ```
    #[inline]
    pub fn map_left<T, F>(self, function: F) -> Either<T, R>
    where
        F: FnOnce(L) -> T,
    {
        match self {
            Self::Left(value) => Either::Left(function(value)),
            Self::Right(value) => Either::Right(value),
        }
    }

    /// Transforms the success, leaving a failure untouched.
    #[inline]
    pub fn map_right<T, F>(self, function: F) -> Either<L, T>
    where
        F: FnOnce(R) -> T,
    {
        match self {
            Self::Left(value) => Either::Left(value),
            Self::Right(value) => Either::Right(function(value)),
        }
    }

    /// Applies one of two functions depending on the variant.
    #[inline]
    pub fn bimap<T, U, F, G>(self, left_function: F, right_function: G) -> Either<T, U>
    where
        F: FnOnce(L) -> T,
        G: FnOnce(R) -> U,
    {
        match self {
            Self::Left(value) => Either::Left(left_function(value)),
            Self::Right(value) => Either::Right(right_function(value)),
        }
    }

    /// Chains a fallible step onto a success. A `Left` short-circuits and the
    /// function is never called.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roster::control::Either;
    ///
    /// let require_non_empty = |value: &'static str| {
    ///     if value.is_empty() {
    ///         Either::Left("empty")
    ///     } else {
    ///         Either::Right(value)
    ///     }
    /// };
    ///
    /// let ok: Either<&str, &str> = Either::Right("-37.3159");
    /// assert_eq!(ok.flat_map(require_non_empty), Either::Right("-37.3159"));
    ///
    /// let missing: Either<&str, &str> = Either::Right("");
    /// assert_eq!(missing.flat_map(require_non_empty), Either::Left("empty"));
    /// ```
    #[inline]
    pub fn flat_map<T, F>(self, function: F) -> Either<L, T>
    where
        F: FnOnce(R) -> Either<L, T>,
    {
        match self {
            Self::Left(value) => Either::Left(value),
            Self::Right(value) => function(value),
        }
    }

    // =========================================================================
    // Elimination
    // =========================================================================

    /// Eliminates the `Either` by applying one of two functions.
    #[inline]
    pub fn fold<T, F, G>(self, left_function: F, right_function: G) -> T
    where
        F: FnOnce(L) -> T,
        G: FnOnce(R) -> T,
    {
        match self {
            Self::Left(value) => left_function(value),
            Self::Right(value) => right_function(value),
        }
    }

    /// Swaps the variants.
    #[inline]
    pub fn swap(self) -> Either<R, L> {
        match self {
            Self::Left(value) => Either::Right(value),
            Self::Right(value) => Either::Left(value),
        }
    }

    /// Converts `&Either<L, R>` into `Either<&L, &R>`.
    #[inline]
    pub const fn as_ref(&self) -> Either<&L, &R> {
        match self {
            Self::Left(value) => Either::Left(value),
            Self::Right(value) => Either::Right(value),
        }
    }
}

// =============================================================================
// Debug Implementation
// =============================================================================

impl<L: fmt::Debug, R: fmt::Debug> fmt::Debug for Either<L, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left(value) => formatter.debug_tuple("Left").field(value).finish(),
            Self::Right(value) => formatter.debug_tuple("Right").field(value).finish(),
        }
    }
}

// =============================================================================
// Result Conversions
// =============================================================================

impl<L, R> From<Result<R, L>> for Either<L, R> {
    /// `Ok(r)` becomes `Right(r)`, `Err(e)` becomes `Left(e)`.
    #[inline]
    fn from(result: Result<R, L>) -> Self {
        match result {
            Ok(value) => Self::Right(value),
            Err(error) => Self::Left(error),
        }
    }
}

impl<L, R> From<Either<L, R>> for Result<R, L> {
    /// `Right(r)` becomes `Ok(r)`, `Left(l)` becomes `Err(l)`.
    #[inline]
    fn from(either: Either<L, R>) -> Self {
        match either {
            Either::Left(value) => Err(value),
            Either::Right(value) => Ok(value),
        }
    }
}
