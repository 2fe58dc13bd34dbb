#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! Typed channels and a multi-channel selector for thread-based concurrency.
//!
//! Weft provides a single-type [`Channel<T>`]: a bounded, unbounded or
//! rendezvous FIFO with blocking, non-blocking and `Future`-based send and
//! receive, plus close semantics. On top of it, [`Selector`] lets one thread
//! react to whichever of several channels, of possibly different element
//! types, first has a value available.
//!
//! The library owns no threads and performs no I/O; it is the coordination
//! substrate other code builds on. The async variants integrate with any
//! executor that polls `Future`s.
//!
//! # Example
//!
//! ```
//! use std::thread;
//! use weft::Channel;
//!
//! let ch = Channel::new(2);
//! let producer = {
//!   let ch = ch.clone();
//!   thread::spawn(move || {
//!     for i in 0..4 {
//!       ch.send(i).unwrap();
//!     }
//!     ch.close();
//!   })
//! };
//!
//! let mut received = Vec::new();
//! while let Some(v) = ch.recv() {
//!   received.push(v);
//! }
//! producer.join().unwrap();
//! assert_eq!(received, vec![0, 1, 2, 3]);
//! ```

pub mod channel;
pub mod error;
pub mod select;
pub mod telemetry;

pub use channel::{Channel, RecvFuture, RecvStream, SendFuture};
pub use error::{SendError, TrySendError};
pub use select::Selector;
