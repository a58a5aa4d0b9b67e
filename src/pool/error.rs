use thiserror::Error;

/// An error returned by [`Pool::call`](super::Pool::call).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError<E> {
    /// The pool has been released and no longer hands out resources
    #[error("the resource pool is closed")]
    Closed,

    /// The factory failed while growing the pool; local state is unchanged
    #[error("resource factory failed: {0}")]
    Factory(E),

    /// The error returned by the caller's own callback
    #[error("{0}")]
    Callback(E),

    /// The callback panicked; the payload is rendered as a message and the
    /// borrowed resource was still returned to the pool
    #[error("resource callback panicked: {0}")]
    Panicked(String),
}

/// A configuration error.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("pool config error: {0}")]
pub struct ConfigError(pub String);
