use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use stratum_runtime::{JobSlotPool, SlotHandler, SlotJob};

struct Probe {
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    micros: u64,
}

impl SlotJob for Probe {
    fn execute(&mut self) {
        let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_micros(self.micros));
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct Tally {
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    ready: Vec<u32>,
    complete: Vec<u32>,
    slot_busy: Vec<bool>,
}

impl SlotHandler for Tally {
    type Params = u32;
    type Job = Probe;

    fn on_ready(&mut self, slot: usize, params: &u32) -> Probe {
        assert!(!self.slot_busy[slot], "slot {slot} handed out twice");
        self.slot_busy[slot] = true;
        self.ready.push(*params);
        Probe {
            live: Arc::clone(&self.live),
            peak: Arc::clone(&self.peak),
            micros: 200 + u64::from(*params % 7) * 100,
        }
    }

    fn on_complete(&mut self, slot: usize, params: u32, _job: Probe) {
        assert!(self.slot_busy[slot]);
        self.slot_busy[slot] = false;
        self.complete.push(params);
    }
}

#[derive(Clone, Debug)]
enum Op {
    Schedule(u8),
    Drain,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1u8..4).prop_map(Op::Schedule),
        1 => Just(Op::Drain),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn bounded_in_flight_and_one_callback_pair_per_request(
        slots in 1usize..4,
        ops in prop::collection::vec(op(), 1..12),
    ) {
        let handler = Tally { slot_busy: vec![false; slots], ..Tally::default() };
        let peak = Arc::clone(&handler.peak);
        let mut pool = JobSlotPool::new(slots, handler, "prop-pool").unwrap();
        let mut next = 0u32;
        for op in ops {
            match op {
                Op::Schedule(n) => {
                    for _ in 0..n {
                        pool.schedule(next);
                        next += 1;
                        prop_assert!(pool.in_flight() <= slots);
                    }
                }
                Op::Drain => {
                    pool.complete_and_drain();
                }
            }
            prop_assert!(pool.in_flight() <= slots);
            prop_assert_eq!(pool.in_flight() + pool.free_slots(), slots);
        }
        pool.complete_blocking();
        prop_assert!(pool.is_idle());
        prop_assert!(peak.load(Ordering::SeqCst) <= slots);

        let mut ready = pool.handler().ready.clone();
        let mut complete = pool.handler().complete.clone();
        // Requests start in FIFO order.
        prop_assert_eq!(&ready, &(0..next).collect::<Vec<_>>());
        ready.sort();
        complete.sort();
        prop_assert_eq!(ready, complete);
    }
}
