// src/select/mod.rs

//! A one-shot waiter over any number of channels of different element types.
//!
//! A [`Selector`] collects receive intents, each pairing a channel with a
//! typed callback, and [`select`](Selector::select) blocks until one of them
//! can fire. Channels notify the selector through a level-triggered signal on
//! every deposit and on close, so a notification issued while the selector is
//! still polling is never lost.

mod intent;
pub(crate) mod signal;

use self::intent::{IntentPoll, Pollable, ReceiveIntent};
use self::signal::SelectSignal;
use crate::channel::Channel;
use crate::telemetry;

use std::fmt;
use std::sync::Arc;

const LOC_SELECT: &str = "select::select";
const CTR_WAITS: &str = "waits";

/// Waits on multiple channels, firing one ready receive intent per call.
///
/// # Examples
///
/// ```
/// use weft::{Channel, Selector};
///
/// let numbers = Channel::new(4);
/// let words = Channel::new(4);
/// numbers.send(7).unwrap();
/// words.send("seven".to_string()).unwrap();
///
/// let mut selector = Selector::new();
/// selector.add_receive(&numbers, |n: i32| println!("number {n}"));
/// selector.add_receive(&words, |w: String| println!("word {w}"));
///
/// assert!(selector.select()); // fires one of the two intents
/// assert!(selector.select()); // fires the other
///
/// numbers.close();
/// words.close();
/// assert!(!selector.select()); // all intents retired
/// ```
pub struct Selector {
  intents: Vec<Box<dyn Pollable>>,
  signal: Arc<SelectSignal>,
  /// Index of the intent after the one that last fired; the next poll pass
  /// starts here so permanently-ready channels take turns.
  cursor: usize,
}

impl Selector {
  /// Creates a selector with no intents. Until intents are added,
  /// [`select`](Selector::select) returns `false` immediately.
  pub fn new() -> Self {
    Self {
      intents: Vec::new(),
      signal: Arc::new(SelectSignal::new()),
      cursor: 0,
    }
  }

  /// Records a receive intent: when `channel` has a value, deliver it to
  /// `callback`; once `channel` is closed and drained, retire the intent.
  ///
  /// The selector registers itself with the channel for notifications. The
  /// intent holds its own handle to the channel, and stays armed across
  /// successful fires.
  pub fn add_receive<T, F>(&mut self, channel: &Channel<T>, callback: F)
  where
    T: Send + 'static,
    F: FnMut(T) + Send + 'static,
  {
    channel.shared.register_selector(&self.signal);
    self.intents.push(Box::new(ReceiveIntent::new(
      channel.clone(),
      Arc::clone(&self.signal),
      Box::new(callback),
    )));
  }

  /// Blocks until one intent fires, then returns `true`.
  ///
  /// Intents are polled starting after the one that last fired; an intent
  /// whose channel is observed closed and drained is retired on the spot.
  /// Returns `false` without blocking once every intent has retired (or none
  /// was ever added).
  pub fn select(&mut self) -> bool {
    loop {
      if self.intents.is_empty() {
        return false;
      }

      // --- Phase 1: Poll every intent once, in rotated order ---
      let count = self.intents.len();
      let start = self.cursor % count;
      let mut fired = false;
      let mut retired: Vec<usize> = Vec::new();
      for offset in 0..count {
        let index = (start + offset) % count;
        match self.intents[index].poll() {
          IntentPoll::Fired => {
            self.cursor = index + 1;
            fired = true;
            break;
          }
          IntentPoll::NotReady => {}
          IntentPoll::Retired => retired.push(index),
        }
      }

      // --- Phase 2: Drop retired intents (their Drop unregisters) ---
      if !retired.is_empty() {
        retired.sort_unstable();
        for index in retired.into_iter().rev() {
          self.intents.remove(index);
        }
      }

      if fired {
        return true;
      }
      if self.intents.is_empty() {
        return false;
      }

      // --- Phase 3: Wait for a deposit or a close ---
      // The signal is sticky, so anything that happened since the poll pass
      // began makes this return immediately.
      telemetry::increment_counter(LOC_SELECT, CTR_WAITS);
      self.signal.wait();
    }
  }
}

impl Default for Selector {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Selector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Selector")
      .field("intents", &self.intents.len())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn empty_selector_returns_false() {
    let mut selector = Selector::new();
    assert!(!selector.select());
  }

  #[test]
  fn ready_intent_fires_immediately() {
    let ch = Channel::new(2);
    ch.send(5).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut selector = Selector::new();
    selector.add_receive(&ch, move |v: i32| sink.lock().unwrap().push(v));

    assert!(selector.select());
    assert_eq!(*seen.lock().unwrap(), vec![5]);
  }

  #[test]
  fn closed_and_drained_retires() {
    let ch = Channel::new(2);
    ch.send(1).unwrap();
    ch.close();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut selector = Selector::new();
    selector.add_receive(&ch, move |v: i32| sink.lock().unwrap().push(v));

    // The buffered value still fires; only closed-and-drained retires.
    assert!(selector.select());
    assert!(!selector.select());
    assert_eq!(*seen.lock().unwrap(), vec![1]);
  }

  #[test]
  fn intent_stays_armed_across_fires() {
    let ch = Channel::new(4);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut selector = Selector::new();
    selector.add_receive(&ch, move |v: i32| sink.lock().unwrap().push(v));

    for i in 0..3 {
      ch.send(i).unwrap();
      assert!(selector.select());
    }
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
  }
}
