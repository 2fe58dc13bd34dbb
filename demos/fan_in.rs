// demos/fan_in.rs
//
// Mixed-type fan-in: two producers feed an integer channel, one feeds a
// string channel, and a single consumer drains both through a Selector.

use std::thread;
use std::time::Duration;
use weft::{Channel, Selector};

const MESSAGES_PER_PRODUCER: usize = 20;

fn int_producer(ch: Channel<i32>, id: i32) {
  for i in 0..MESSAGES_PER_PRODUCER as i32 {
    let value = id * 1000 + i;
    // Jitter so the consumer sees interleaved arrivals.
    thread::sleep(Duration::from_millis((value as u64 * 7) % 20));
    match ch.try_send(value) {
      Ok(()) => println!("[int producer {id}] sent {value}"),
      Err(_) => {
        // Buffer full right now; fall back to the blocking path.
        if ch.send(value).is_ok() {
          println!("[int producer {id}] sent {value} (after blocking)");
        }
      }
    }
  }
}

fn string_producer(ch: Channel<String>, id: i32) {
  for i in 0..MESSAGES_PER_PRODUCER {
    let value = format!("message {id}-{i}");
    thread::sleep(Duration::from_millis((i as u64 * 11) % 20));
    if ch.send(value.clone()).is_ok() {
      println!("[string producer {id}] sent {value}");
    }
  }
}

fn main() {
  let ints = Channel::new(5);
  let strings = Channel::new(5);

  let consumer = {
    let ints = ints.clone();
    let strings = strings.clone();
    thread::spawn(move || {
      let mut selector = Selector::new();
      selector.add_receive(&ints, |value: i32| {
        println!("  -> received int: {value}");
      });
      selector.add_receive(&strings, |value: String| {
        println!("  -> received string: {value}");
      });

      let mut delivered = 0usize;
      while selector.select() {
        delivered += 1;
      }
      println!("consumer finished after {delivered} deliveries");
    })
  };

  let producers = vec![
    thread::spawn({
      let ints = ints.clone();
      move || int_producer(ints, 1)
    }),
    thread::spawn({
      let ints = ints.clone();
      move || int_producer(ints, 2)
    }),
    thread::spawn({
      let strings = strings.clone();
      move || string_producer(strings, 3)
    }),
  ];

  for handle in producers {
    handle.join().expect("producer panicked");
  }

  // Closing both channels retires the consumer's intents once drained.
  ints.close();
  strings.close();

  consumer.join().expect("consumer panicked");
}
