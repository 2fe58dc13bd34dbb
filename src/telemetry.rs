// src/telemetry.rs

//! Feature-gated diagnostics for debugging wake-up behavior.
//!
//! With the `weft_telemetry` feature enabled, call sites in the blocking and
//! select paths record events and counters into a global collector that can be
//! dumped with [`print_telemetry_report`]. Without the feature every hook
//! compiles to a no-op.

#[cfg(feature = "weft_telemetry")]
pub mod enabled {
  //! The collecting implementation, active with the `weft_telemetry` feature.

  use std::collections::HashMap;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;
  use std::thread::{self, ThreadId};
  use std::time::Instant;

  static NEXT_EVENT_SEQUENCE_ID: AtomicUsize = AtomicUsize::new(0);

  /// A single recorded event.
  #[derive(Debug, Clone)]
  pub struct TelemetryEvent {
    /// Global sequence number across all events.
    pub seq_id: usize,
    /// When the event was recorded.
    pub timestamp: Instant,
    /// The recording OS thread.
    pub os_thread_id: ThreadId,
    /// Code location, e.g. `channel::send_sync`.
    pub location: &'static str,
    /// Event kind, e.g. `Parked`.
    pub event_type: &'static str,
    /// Optional free-form detail.
    pub message: Option<String>,
  }

  type CounterKey = (&'static str, &'static str);

  struct CollectorData {
    events: Vec<TelemetryEvent>,
    counters: HashMap<CounterKey, usize>,
    start_time: Instant,
  }

  lazy_static::lazy_static! {
    static ref GLOBAL_COLLECTOR: Mutex<CollectorData> = Mutex::new(CollectorData {
      events: Vec::new(),
      counters: HashMap::new(),
      start_time: Instant::now(),
    });
  }

  /// Records one event into the global collector.
  pub fn log_event_fn(location: &'static str, event_type: &'static str, message: Option<String>) {
    let event = TelemetryEvent {
      seq_id: NEXT_EVENT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed),
      timestamp: Instant::now(),
      os_thread_id: thread::current().id(),
      location,
      event_type,
      message,
    };
    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      collector.events.push(event);
    }
  }

  /// Bumps a named counter for a location.
  pub fn increment_counter_fn(location: &'static str, counter_name: &'static str) {
    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      *collector.counters.entry((location, counter_name)).or_insert(0) += 1;
    }
  }

  /// Prints every recorded event and counter to stdout.
  pub fn print_telemetry_report_fn() {
    if let Ok(collector) = GLOBAL_COLLECTOR.lock() {
      println!("--- Weft Telemetry Report ---");
      println!("[Events] {} recorded:", collector.events.len());
      for event in &collector.events {
        let since_start = event.timestamp.duration_since(collector.start_time);
        println!(
          "  +{:<10.6}s [Seq:{:<5}] TID:{:<18?} Loc:{:<24} Evt:{:<16} Msg: {}",
          since_start.as_secs_f64(),
          event.seq_id,
          event.os_thread_id,
          event.location,
          event.event_type,
          event.message.as_deref().unwrap_or("")
        );
      }
      println!("[Counters] {} recorded:", collector.counters.len());
      let mut sorted: Vec<_> = collector.counters.iter().collect();
      sorted.sort_by_key(|(key, _)| *key);
      for ((location, name), count) in sorted {
        println!("  Loc:{:<24} Counter:{:<16} Value: {}", location, name, count);
      }
      println!("--- End of Telemetry Report ---");
    }
  }

  /// Clears events and counters and resets the report clock.
  pub fn clear_telemetry_fn() {
    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      collector.events.clear();
      collector.counters.clear();
      collector.start_time = Instant::now();
    }
    NEXT_EVENT_SEQUENCE_ID.store(0, Ordering::Relaxed);
  }
}

#[cfg(not(feature = "weft_telemetry"))]
pub mod disabled {
  //! No-op shims used when the `weft_telemetry` feature is off.

  /// Records one event. No-op without `weft_telemetry`.
  #[inline(always)]
  pub fn log_event_fn(_location: &'static str, _event_type: &'static str, _message: Option<String>) {}

  /// Bumps a named counter. No-op without `weft_telemetry`.
  #[inline(always)]
  pub fn increment_counter_fn(_location: &'static str, _counter_name: &'static str) {}

  /// Prints the report. No-op without `weft_telemetry`.
  #[inline(always)]
  pub fn print_telemetry_report_fn() {}

  /// Clears collected data. No-op without `weft_telemetry`.
  #[inline(always)]
  pub fn clear_telemetry_fn() {}
}

#[cfg(feature = "weft_telemetry")]
pub use enabled::{
  clear_telemetry_fn as clear_telemetry, increment_counter_fn as increment_counter,
  log_event_fn as log_event, print_telemetry_report_fn as print_telemetry_report,
};

#[cfg(not(feature = "weft_telemetry"))]
pub use disabled::{
  clear_telemetry_fn as clear_telemetry, increment_counter_fn as increment_counter,
  log_event_fn as log_event, print_telemetry_report_fn as print_telemetry_report,
};
