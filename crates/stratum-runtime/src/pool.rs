use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Work item executed on a background worker. It owns everything it touches while running
/// and is handed back to the pool's handler when done.
pub trait SlotJob: Send + 'static {
    fn execute(&mut self);
}

/// Extension points of a [`JobSlotPool`]. Both hooks run on the thread that owns the pool.
pub trait SlotHandler {
    type Params;
    type Job: SlotJob;

    /// Builds the job for a request that was just assigned `slot`.
    fn on_ready(&mut self, slot: usize, params: &Self::Params) -> Self::Job;

    /// Receives a finished job. The slot is freed right after this returns.
    fn on_complete(&mut self, slot: usize, params: Self::Params, job: Self::Job);
}

/// At most `slots` jobs in flight at once; further requests wait in an unbounded FIFO.
///
/// A panic inside a job is not caught: rayon aborts the process when a spawned task panics
/// and no panic handler is installed.
pub struct JobSlotPool<H: SlotHandler> {
    handler: H,
    free: VecDeque<usize>,
    requests: VecDeque<H::Params>,
    running: Vec<Option<H::Params>>,
    workers: ThreadPool,
    done_tx: Sender<(usize, H::Job)>,
    done_rx: Receiver<(usize, H::Job)>,
    started: u64,
    completed: u64,
}

impl<H: SlotHandler> JobSlotPool<H> {
    /// `slots` is both the in-flight limit and the worker thread count.
    pub fn new(slots: usize, handler: H, thread_prefix: &str) -> Result<Self, ThreadPoolBuildError> {
        assert!(slots > 0, "job slot pool needs at least one slot");
        let prefix = thread_prefix.to_string();
        let workers = ThreadPoolBuilder::new()
            .num_threads(slots)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()?;
        let (done_tx, done_rx) = unbounded();
        Ok(Self {
            handler,
            free: (0..slots).collect(),
            requests: VecDeque::new(),
            running: (0..slots).map(|_| None).collect(),
            workers,
            done_tx,
            done_rx,
            started: 0,
            completed: 0,
        })
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.running.len()
    }

    #[inline]
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn in_flight(&self) -> usize {
        self.slot_count() - self.free.len()
    }

    #[inline]
    pub fn queued(&self) -> usize {
        self.requests.len()
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.in_flight() == 0 && self.requests.is_empty()
    }

    /// Total jobs started and completed over the pool's lifetime.
    pub fn counters(&self) -> (u64, u64) {
        (self.started, self.completed)
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Params of the job currently occupying each slot.
    pub fn running(&self) -> impl Iterator<Item = &H::Params> + '_ {
        self.running.iter().flatten()
    }

    /// Enqueues a request and starts as many queued requests as free slots allow.
    pub fn schedule(&mut self, params: H::Params) {
        self.requests.push_back(params);
        self.start_queued();
    }

    /// Hands every finished job to the handler, frees its slot, then refills free slots
    /// from the queue. Never blocks. Returns the number of jobs completed.
    pub fn complete_and_drain(&mut self) -> usize {
        let mut n = 0;
        while let Ok((slot, job)) = self.done_rx.try_recv() {
            self.finish(slot, job);
            n += 1;
        }
        self.start_queued();
        n
    }

    /// Waits until every queued and in-flight job has completed.
    pub fn complete_blocking(&mut self) -> usize {
        let mut n = self.complete_and_drain();
        while self.in_flight() > 0 {
            // `done_tx` is held by the pool, so the channel cannot disconnect here.
            let Ok((slot, job)) = self.done_rx.recv() else {
                break;
            };
            self.finish(slot, job);
            n += 1;
            n += self.complete_and_drain();
        }
        n
    }

    fn finish(&mut self, slot: usize, job: H::Job) {
        let Some(params) = self.running[slot].take() else {
            unreachable!("completion for idle slot {slot}");
        };
        self.handler.on_complete(slot, params, job);
        self.free.push_back(slot);
        self.completed += 1;
    }

    fn start_queued(&mut self) {
        while !self.requests.is_empty() {
            let Some(slot) = self.free.pop_front() else {
                break;
            };
            let Some(params) = self.requests.pop_front() else {
                self.free.push_front(slot);
                break;
            };
            let mut job = self.handler.on_ready(slot, &params);
            self.running[slot] = Some(params);
            self.started += 1;
            let tx = self.done_tx.clone();
            self.workers.spawn(move || {
                job.execute();
                let _ = tx.send((slot, job));
            });
        }
    }
}
