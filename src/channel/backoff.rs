// src/channel/backoff.rs

use std::thread;

/// Emits a CPU instruction that signals the processor that it is in a spin loop.
#[inline(always)]
fn spin_hint() {
  std::hint::spin_loop();
}

/// An adaptive wait strategy that starts with spinning, then yields, then parks.
///
/// The final phase parks indefinitely; the thread is only woken by an
/// `unpark()` from a peer that first set the condition.
pub(crate) fn adaptive_wait<F>(cond: F)
where
  F: Fn() -> bool,
{
  // 1. Spinning Phase
  for _ in 0..16 {
    if cond() {
      return;
    }
    spin_hint();
  }

  // 2. Yielding Phase
  for _ in 0..8 {
    if cond() {
      return;
    }
    thread::yield_now();
  }

  // 3. Blocking Phase
  while !cond() {
    thread::park();
  }
}
