mod common;
use common::*;

use weft::{Channel, SendError, TrySendError};

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

// --- Helper Function for Sync MPMC Tests ---
fn run_sync_mpmc_test(
  num_producers: usize,
  num_consumers: usize,
  items_per_producer: usize,
  channel_capacity: usize,
) {
  let ch = Channel::new(channel_capacity);
  let total_items_expected = num_producers * items_per_producer;
  let received_items_set = Arc::new(Mutex::new(HashSet::new()));

  let mut consumer_handles = Vec::new();
  for _ in 0..num_consumers {
    let ch_clone = ch.clone();
    let received_set_clone = Arc::clone(&received_items_set);
    consumer_handles.push(thread::spawn(move || {
      let mut local_count = 0usize;
      while let Some(item) = ch_clone.recv() {
        assert!(
          received_set_clone.lock().unwrap().insert(item),
          "Duplicate item received!"
        );
        local_count += 1;
      }
      local_count
    }));
  }

  let mut producer_handles = Vec::new();
  for p_id in 0..num_producers {
    let ch_clone = ch.clone();
    producer_handles.push(thread::spawn(move || {
      for i in 0..items_per_producer {
        ch_clone.send(p_id * items_per_producer + i).unwrap();
      }
    }));
  }

  for handle in producer_handles {
    handle.join().expect("Producer thread panicked");
  }
  // Close only after every producer finished; consumers then drain the
  // remainder and observe end-of-stream.
  ch.close();

  let mut consumed = 0usize;
  for handle in consumer_handles {
    consumed += handle.join().expect("Consumer thread panicked");
  }

  assert_eq!(consumed, total_items_expected);
  assert_eq!(received_items_set.lock().unwrap().len(), total_items_expected);
  assert!(ch.is_empty());
}

// --- FIFO and blocking behavior ---

#[test]
fn fifo_order_single_producer_single_consumer() {
  for capacity in [1, 2, 7, ITEMS_MEDIUM] {
    let ch = Channel::new(capacity);
    let producer = {
      let ch = ch.clone();
      thread::spawn(move || {
        for i in 0..ITEMS_MEDIUM {
          ch.send(i).unwrap();
        }
      })
    };
    for i in 0..ITEMS_MEDIUM {
      assert_eq!(ch.recv(), Some(i));
    }
    producer.join().unwrap();
  }
}

#[test]
fn send_blocks_while_buffer_full() {
  let ch = Channel::new(2);
  ch.send(1).unwrap();
  ch.send(2).unwrap();

  let third_sent = Arc::new(AtomicBool::new(false));
  let blocker = {
    let ch = ch.clone();
    let third_sent = Arc::clone(&third_sent);
    thread::spawn(move || {
      ch.send(3).unwrap();
      third_sent.store(true, AtomicOrdering::SeqCst);
    })
  };

  thread::sleep(SHORT_TIMEOUT);
  assert!(
    !third_sent.load(AtomicOrdering::SeqCst),
    "send into a full buffer must block"
  );

  assert_eq!(ch.recv(), Some(1));
  blocker.join().unwrap();
  assert!(third_sent.load(AtomicOrdering::SeqCst));

  assert_eq!(ch.recv(), Some(2));
  assert_eq!(ch.recv(), Some(3));
}

#[test]
fn buffered_holds_at_most_capacity() {
  let ch = Channel::new(3);
  for i in 0..3 {
    ch.send(i).unwrap();
  }
  assert_eq!(ch.len(), 3);
  assert!(matches!(ch.try_send(99), Err(TrySendError::Full(99))));
}

// --- Rendezvous ---

#[test]
fn rendezvous_send_blocks_until_receiver() {
  let ch = Channel::new(0);

  let sent = Arc::new(AtomicBool::new(false));
  let sender = {
    let ch = ch.clone();
    let sent = Arc::clone(&sent);
    thread::spawn(move || {
      ch.send(1).unwrap();
      sent.store(true, AtomicOrdering::SeqCst);
    })
  };

  thread::sleep(SHORT_TIMEOUT);
  assert!(
    !sent.load(AtomicOrdering::SeqCst),
    "rendezvous send must wait for a receiver"
  );

  assert_eq!(ch.recv(), Some(1));
  sender.join().unwrap();
  assert!(sent.load(AtomicOrdering::SeqCst));
}

#[test]
fn rendezvous_pairs_values_in_order() {
  let ch = Channel::new(0);
  let producer = {
    let ch = ch.clone();
    thread::spawn(move || {
      for i in 0..ITEMS_LOW {
        ch.send(i).unwrap();
      }
    })
  };
  for i in 0..ITEMS_LOW {
    assert_eq!(ch.recv(), Some(i));
  }
  producer.join().unwrap();
  assert!(ch.is_empty());
}

#[test]
fn rendezvous_try_send_requires_waiting_receiver() {
  let ch = Channel::new(0);

  // No receiver: try_send must refuse rather than buffer.
  assert!(matches!(ch.try_send(1), Err(TrySendError::Full(1))));
  assert!(ch.is_empty());

  let receiver = {
    let ch = ch.clone();
    thread::spawn(move || ch.recv())
  };

  // Once the receiver has announced itself the handoff goes through.
  let deadline = Instant::now() + LONG_TIMEOUT;
  let mut value = Some(42);
  loop {
    match ch.try_send(value.take().unwrap()) {
      Ok(()) => break,
      Err(TrySendError::Full(v)) => {
        assert!(Instant::now() < deadline, "receiver never became visible");
        value = Some(v);
        thread::yield_now();
      }
      Err(TrySendError::Closed(_)) => panic!("channel unexpectedly closed"),
    }
  }

  assert_eq!(receiver.join().unwrap(), Some(42));
}

#[test]
fn rendezvous_mpmc() {
  run_sync_mpmc_test(2, 2, ITEMS_MEDIUM, 0);
}

// --- Close semantics ---

#[test]
fn close_drains_then_end_of_stream() {
  let ch = Channel::new(1);
  ch.send(1).unwrap();
  ch.close();

  assert_eq!(ch.send(2), Err(SendError(2)));
  assert_eq!(ch.recv(), Some(1));
  assert_eq!(ch.recv(), None);
  assert_eq!(ch.recv(), None);
}

#[test]
fn close_unblocks_waiting_sender() {
  let ch = Channel::new(1);
  ch.send(1).unwrap();

  let blocker = {
    let ch = ch.clone();
    thread::spawn(move || ch.send(2))
  };

  thread::sleep(SHORT_TIMEOUT);
  ch.close();

  assert_eq!(blocker.join().unwrap(), Err(SendError(2)));
  // The value enqueued before close is still delivered.
  assert_eq!(ch.recv(), Some(1));
  assert_eq!(ch.recv(), None);
}

#[test]
fn close_unblocks_waiting_receiver() {
  let ch = Channel::<i32>::new(2);

  let blocker = {
    let ch = ch.clone();
    thread::spawn(move || ch.recv())
  };

  thread::sleep(SHORT_TIMEOUT);
  ch.close();

  assert_eq!(blocker.join().unwrap(), None);
}

#[test]
fn close_unblocks_rendezvous_sender() {
  let ch = Channel::new(0);

  let blocker = {
    let ch = ch.clone();
    thread::spawn(move || ch.send(9))
  };

  thread::sleep(SHORT_TIMEOUT);
  ch.close();

  assert_eq!(blocker.join().unwrap(), Err(SendError(9)));
}

// --- Multi producer / multi consumer ---

#[test]
fn mpmc_multiset_matches() {
  let ch = Channel::new(10);
  let expected: HashSet<usize> = (0..3).flat_map(|i| (0..5).map(move |j| i * 100 + j)).collect();

  let received = Arc::new(Mutex::new(Vec::new()));
  let mut consumers = Vec::new();
  for _ in 0..2 {
    let ch = ch.clone();
    let received = Arc::clone(&received);
    consumers.push(thread::spawn(move || {
      while let Some(item) = ch.recv() {
        received.lock().unwrap().push(item);
      }
    }));
  }

  let mut producers = Vec::new();
  for i in 0..3usize {
    let ch = ch.clone();
    producers.push(thread::spawn(move || {
      for j in 0..5usize {
        ch.send(i * 100 + j).unwrap();
      }
    }));
  }

  for handle in producers {
    handle.join().unwrap();
  }
  ch.close();
  for handle in consumers {
    handle.join().unwrap();
  }

  let received = received.lock().unwrap();
  assert_eq!(received.len(), 15);
  assert_eq!(received.iter().copied().collect::<HashSet<_>>(), expected);
}

#[test]
fn mpmc_contention() {
  run_sync_mpmc_test(4, 4, ITEMS_HIGH, 4);
}

#[test]
fn mpmc_unbounded() {
  let ch = Channel::unbounded();
  let producer = {
    let ch = ch.clone();
    thread::spawn(move || {
      for i in 0..ITEMS_HIGH {
        ch.send(i).unwrap();
      }
    })
  };
  producer.join().unwrap();
  // Unbounded senders finished without a single receiver in sight.
  assert_eq!(ch.len(), ITEMS_HIGH);
  for i in 0..ITEMS_HIGH {
    assert_eq!(ch.recv(), Some(i));
  }
}
