// src/error.rs

//! Error types for channel operations.
//!
//! The only failure mode is a closed channel; full buffers and empty queues
//! surface through `try_send` / `try_recv` return values. Receives never
//! fail: end-of-stream is an ordinary `None`.

use core::fmt;

/// Error returned by [`Channel::send`](crate::Channel::send) and the
/// [`SendFuture`](crate::channel::SendFuture) when the channel is or became
/// closed. The value that could not be sent is handed back to the caller.
#[derive(PartialEq, Eq, Clone)]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
  /// Consumes the error, returning the value that could not be sent.
  #[inline]
  pub fn into_inner(self) -> T {
    self.0
  }
}

impl<T> fmt::Debug for SendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "SendError(..)")
  }
}

impl<T> fmt::Display for SendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("sending on a closed channel")
  }
}

impl<T: fmt::Debug> std::error::Error for SendError<T> {}

/// Error returned by [`Channel::try_send`](crate::Channel::try_send) when the
/// value could not be transferred immediately. The value is returned in
/// either variant.
#[derive(PartialEq, Eq, Clone)]
pub enum TrySendError<T> {
  /// The buffer is full, or this is a rendezvous channel and no receiver is
  /// currently waiting.
  Full(T),
  /// The channel is closed.
  Closed(T),
}

impl<T> TrySendError<T> {
  /// Consumes the error, returning the value that could not be sent.
  #[inline]
  pub fn into_inner(self) -> T {
    match self {
      TrySendError::Full(v) => v,
      TrySendError::Closed(v) => v,
    }
  }

  /// Returns `true` if the failure was [`TrySendError::Full`].
  #[inline]
  pub fn is_full(&self) -> bool {
    matches!(self, TrySendError::Full(_))
  }

  /// Returns `true` if the failure was [`TrySendError::Closed`].
  #[inline]
  pub fn is_closed(&self) -> bool {
    matches!(self, TrySendError::Closed(_))
  }
}

impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => write!(f, "TrySendError::Full(..)"),
      TrySendError::Closed(_) => write!(f, "TrySendError::Closed(..)"),
    }
  }
}

impl<T> fmt::Display for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => f.write_str("channel full"),
      TrySendError::Closed(_) => f.write_str("channel closed"),
    }
  }
}

impl<T: fmt::Debug> std::error::Error for TrySendError<T> {}
