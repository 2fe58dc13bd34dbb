// src/channel/core.rs

//! The core shared state and logic for `Channel<T>`.
//!
//! ### Design Principles:
//!
//! 1.  **Central Mutex**: A `parking_lot::Mutex` guards all state changes.
//!     Every operation, including the read-only observers, takes a point-in-time
//!     snapshot under this lock.
//! 2.  **Separate Waiter Queues**: Parked synchronous threads and parked
//!     asynchronous tasks live in distinct queues so the wake logic can use the
//!     correct primitive (`thread::unpark` vs. `Waker::wake`) without ambiguity.
//! 3.  **Wake Breadth**: A state transition wakes exactly one parked thread of
//!     the relevant class (a parked thread is always still there) but drains
//!     *all* queued wakers of that class. A queued waker may belong to a future
//!     its executor already dropped, and a wake-up spent on a dead waker would
//!     otherwise be lost; live futures re-register on their next poll.
//! 4.  **Selector Notification Ordering**: The channel collects its live
//!     registered selector signals under its own lock, releases the lock, and
//!     only then calls `notify()` on each signal. No channel lock is ever held
//!     while a selector lock is taken.

use crate::error::TrySendError;
use crate::select::signal::SelectSignal;
use crate::telemetry;

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::task::Waker;
use std::thread::Thread;

/// Sentinel capacity for channels that never exert backpressure.
pub(crate) const UNBOUNDED: usize = usize::MAX;

const LOC_CLOSE: &str = "channel::close";
const EVT_CLOSED: &str = "Closed";

/// A parked synchronous thread waiting for an operation to complete.
#[derive(Debug)]
pub(crate) struct SyncWaiter {
  /// The handle to the parked thread, used for `unpark()`.
  thread: Thread,
  /// Set before `unpark()` so the waiter can distinguish a real wake-up from a
  /// spurious return out of `park()`.
  woken: Arc<AtomicBool>,
}

impl SyncWaiter {
  pub(crate) fn new(thread: Thread, woken: Arc<AtomicBool>) -> Self {
    Self { thread, woken }
  }

  fn wake(self) {
    self.woken.store(true, Ordering::Release);
    self.thread.unpark();
  }
}

/// Outcome of a selector's single-lock poll of one channel.
pub(crate) enum PollTake<T> {
  /// A value was dequeued.
  Value(T),
  /// Nothing buffered, channel still open.
  Empty,
  /// Closed and drained: no value will ever appear again.
  Drained,
}

/// The state of a channel, protected by the single mutex in [`Shared`].
#[derive(Debug)]
pub(crate) struct ChannelState<T> {
  /// Buffered values. For rendezvous channels this holds at most one value,
  /// transiently, during the synchronized handoff.
  pub(crate) queue: VecDeque<T>,
  /// Monotonic: once set it never reverts.
  pub(crate) closed: bool,
  /// Number of receivers currently announced in the rendezvous wait path and
  /// not yet exited. Senders on a capacity-zero channel may only deposit while
  /// this is positive.
  pub(crate) waiting_receivers: usize,
  waiting_sync_senders: VecDeque<SyncWaiter>,
  waiting_async_senders: VecDeque<Waker>,
  waiting_sync_receivers: VecDeque<SyncWaiter>,
  waiting_async_receivers: VecDeque<Waker>,
  /// Back-references to observing selectors. Relation only; a dead `Weak` is
  /// pruned on the next traversal.
  selectors: Vec<Weak<SelectSignal>>,
}

impl<T> ChannelState<T> {
  pub(crate) fn park_sync_sender(&mut self, waiter: SyncWaiter) {
    self.waiting_sync_senders.push_back(waiter);
  }

  pub(crate) fn park_sync_receiver(&mut self, waiter: SyncWaiter) {
    self.waiting_sync_receivers.push_back(waiter);
  }

  pub(crate) fn park_async_sender(&mut self, waker: Waker) {
    self.waiting_async_senders.push_back(waker);
  }

  pub(crate) fn park_async_receiver(&mut self, waker: Waker) {
    self.waiting_async_receivers.push_back(waker);
  }

  /// Wakes peers blocked on "space / receiver available".
  pub(crate) fn wake_senders(&mut self) {
    for waker in self.waiting_async_senders.drain(..) {
      waker.wake();
    }
    if let Some(waiter) = self.waiting_sync_senders.pop_front() {
      waiter.wake();
    }
  }

  /// Wakes peers blocked on "value available / closed".
  pub(crate) fn wake_receivers(&mut self) {
    for waker in self.waiting_async_receivers.drain(..) {
      waker.wake();
    }
    if let Some(waiter) = self.waiting_sync_receivers.pop_front() {
      waiter.wake();
    }
  }

  /// Wakes every waiting peer of both classes. Used by `close`.
  fn wake_all(&mut self) {
    for waker in self.waiting_async_senders.drain(..) {
      waker.wake();
    }
    for waker in self.waiting_async_receivers.drain(..) {
      waker.wake();
    }
    for waiter in self.waiting_sync_senders.drain(..) {
      waiter.wake();
    }
    for waiter in self.waiting_sync_receivers.drain(..) {
      waiter.wake();
    }
  }

  /// Upgrades the registered selector signals, pruning dead entries.
  fn observers(&mut self) -> Vec<Arc<SelectSignal>> {
    let mut live = Vec::with_capacity(self.selectors.len());
    self.selectors.retain(|weak| match weak.upgrade() {
      Some(signal) => {
        live.push(signal);
        true
      }
      None => false,
    });
    live
  }
}

/// The shared owner of a channel's state, wrapped in an `Arc` by the public
/// `Channel<T>` handle.
#[derive(Debug)]
pub(crate) struct Shared<T> {
  pub(crate) state: Mutex<ChannelState<T>>,
  pub(crate) capacity: usize,
}

impl<T: Send> Shared<T> {
  pub(crate) fn new(capacity: usize) -> Self {
    let prealloc = match capacity {
      0 => 1,
      UNBOUNDED => 32,
      c => c,
    };
    Shared {
      state: Mutex::new(ChannelState {
        queue: VecDeque::with_capacity(prealloc),
        closed: false,
        waiting_receivers: 0,
        waiting_sync_senders: VecDeque::new(),
        waiting_async_senders: VecDeque::new(),
        waiting_sync_receivers: VecDeque::new(),
        waiting_async_receivers: VecDeque::new(),
        selectors: Vec::new(),
      }),
      capacity,
    }
  }

  /// Whether a deposit may happen right now. For rendezvous channels a sender
  /// needs an announced receiver and a free handoff slot; for buffered
  /// channels it needs buffer space.
  pub(crate) fn can_accept(&self, state: &ChannelState<T>) -> bool {
    if self.capacity == 0 {
      state.waiting_receivers > 0 && state.queue.is_empty()
    } else {
      state.queue.len() < self.capacity
    }
  }

  /// The single deposit path used by `try_send`, blocking `send` and the
  /// async send future. On success the value is enqueued, receivers are woken
  /// and every registered selector is notified (with the channel lock
  /// released).
  pub(crate) fn try_send_core(&self, item: T) -> Result<(), TrySendError<T>> {
    let observers;
    {
      let mut state = self.state.lock();
      if state.closed {
        return Err(TrySendError::Closed(item));
      }
      if !self.can_accept(&state) {
        return Err(TrySendError::Full(item));
      }
      state.queue.push_back(item);
      state.wake_receivers();
      observers = state.observers();
    }
    for signal in observers {
      signal.notify();
    }
    Ok(())
  }

  /// Non-blocking dequeue. Does not distinguish empty-and-open from
  /// empty-and-closed.
  pub(crate) fn try_recv_core(&self) -> Option<T> {
    let mut state = self.state.lock();
    let item = state.queue.pop_front()?;
    state.wake_senders();
    Some(item)
  }

  /// Selector poll: dequeue, or report closed-and-drained, in one lock
  /// acquisition so no value can slip in between the two observations.
  pub(crate) fn poll_take(&self) -> PollTake<T> {
    let mut state = self.state.lock();
    if let Some(item) = state.queue.pop_front() {
      state.wake_senders();
      return PollTake::Value(item);
    }
    if state.closed {
      PollTake::Drained
    } else {
      PollTake::Empty
    }
  }

  /// Closes the channel and wakes every waiting peer and observer. Repeated
  /// close re-wakes; the extra wake-ups are harmless since all waits re-check
  /// their predicate.
  pub(crate) fn close_core(&self) {
    let observers;
    {
      let mut state = self.state.lock();
      state.closed = true;
      state.wake_all();
      observers = state.observers();
    }
    telemetry::log_event(LOC_CLOSE, EVT_CLOSED, None);
    for signal in observers {
      signal.notify();
    }
  }

  pub(crate) fn register_selector(&self, signal: &Arc<SelectSignal>) {
    let mut state = self.state.lock();
    let already = state
      .selectors
      .iter()
      .any(|weak| std::ptr::eq(weak.as_ptr(), Arc::as_ptr(signal)));
    if !already {
      state.selectors.push(Arc::downgrade(signal));
    }
  }

  pub(crate) fn unregister_selector(&self, signal: &Arc<SelectSignal>) {
    let mut state = self.state.lock();
    state
      .selectors
      .retain(|weak| !std::ptr::eq(weak.as_ptr(), Arc::as_ptr(signal)) && weak.strong_count() > 0);
  }
}
