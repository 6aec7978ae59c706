use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

#[cfg(feature = "rtrb")]
use crate::params::ParameterError;
use crate::params::{self, BPM_RANGE, PPQ_RANGE};

const DEFAULT_BPM: u32 = 100;
const DEFAULT_PPQ: u32 = 240;

#[cfg(feature = "rtrb")]
const TRANSPORT_QUEUE_SIZE: usize = 64;

/// State shared between the render thread and waiting control threads.
///
/// The tick counter is read and advanced without a lock. The target list is
/// only locked on a tick boundary, and only while at least one waiter is
/// registered; a render loop with no waiters never contends.
struct TickShared {
    tick: AtomicU64,
    has_waiters: AtomicBool,
    targets: Mutex<Vec<u64>>,
    condvar: Condvar,
}

/// Tick counter advanced in lockstep with the render clock.
///
/// `tick()` is called once per rendered sample by the render thread and never
/// blocks or allocates. Control threads synchronize to the render clock
/// through a [`TickHandle`] (blocking waits) or, with the `rtrb` feature, a
/// [`TransportHandle`] (lock-free commands drained on the render thread).
pub struct TickScheduler {
    shared: Arc<TickShared>,
    sample_rate: f32,
    bpm: u32,
    ppq: u32,
    samples_per_tick: f32,
    sample_time: u32,
    running: bool,
    #[cfg(feature = "rtrb")]
    transport_rx: Option<Consumer<TransportMessage>>,
}

impl TickScheduler {
    /// A stopped scheduler at 100 BPM, 240 PPQ.
    pub fn new(sample_rate: f32) -> Self {
        let mut scheduler = Self {
            shared: Arc::new(TickShared {
                tick: AtomicU64::new(0),
                has_waiters: AtomicBool::new(false),
                targets: Mutex::new(Vec::new()),
                condvar: Condvar::new(),
            }),
            sample_rate,
            bpm: DEFAULT_BPM,
            ppq: DEFAULT_PPQ,
            samples_per_tick: 0.0,
            sample_time: 0,
            running: false,
            #[cfg(feature = "rtrb")]
            transport_rx: None,
        };
        scheduler.update_samples_per_tick();
        scheduler
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Set the tempo in beats per minute, clamped to [`BPM_RANGE`].
    pub fn set_bpm(&mut self, bpm: u32) {
        self.bpm = params::check_parameter_range("TickScheduler: BPM", bpm, BPM_RANGE);
        self.update_samples_per_tick();
    }

    /// Set the resolution in pulses per quarter note, clamped to [`PPQ_RANGE`].
    pub fn set_ppq(&mut self, ppq: u32) {
        self.ppq = params::check_parameter_range("TickScheduler: PPQ", ppq, PPQ_RANGE);
        self.update_samples_per_tick();
    }

    /// Force-position the tick counter, e.g. on a transport reposition.
    /// Pending waiters are not re-scanned; the next tick boundary wakes any
    /// that the new position satisfies.
    pub fn set_tick(&mut self, tick: u64) {
        self.shared.tick.store(tick, Ordering::SeqCst);
    }

    pub fn tick_count(&self) -> u64 {
        self.shared.tick.load(Ordering::SeqCst)
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn ppq(&self) -> u32 {
        self.ppq
    }

    pub fn samples_per_tick(&self) -> f32 {
        self.samples_per_tick
    }

    /// Advance the render clock by one sample. Render thread only.
    ///
    /// Counts samples until the tick period elapses, then commits the tick
    /// increment and wakes every waiter whose target it satisfies. The wait
    /// list is only locked on a tick boundary with registered waiters, so the
    /// steady-state path is a counter increment and one atomic load.
    pub fn tick(&mut self) {
        #[cfg(feature = "rtrb")]
        self.drain_transport();

        if !self.running {
            return;
        }

        self.sample_time += 1;
        if (self.sample_time as f32) <= self.samples_per_tick {
            return;
        }
        self.sample_time = 0;

        let tick = self.shared.tick.fetch_add(1, Ordering::SeqCst) + 1;

        // SeqCst pairs this load with the waiter's flag store, so a waiter
        // that registered before the increment is always seen here or sees
        // the incremented counter itself.
        if self.shared.has_waiters.load(Ordering::SeqCst) {
            self.wake_satisfied(tick);
        }
    }

    /// Handle for control threads to observe the counter and block on it.
    pub fn handle(&self) -> TickHandle {
        TickHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Create the transport command queue and hand back its producer side.
    /// Commands are drained on the render thread at the top of `tick()`.
    #[cfg(feature = "rtrb")]
    pub fn transport(&mut self) -> TransportHandle {
        let (tx, rx) = RingBuffer::new(TRANSPORT_QUEUE_SIZE);
        self.transport_rx = Some(rx);
        TransportHandle { tx }
    }

    #[cfg(feature = "rtrb")]
    fn drain_transport(&mut self) {
        loop {
            let message = match self.transport_rx.as_mut() {
                Some(rx) => match rx.pop() {
                    Ok(message) => message,
                    Err(_) => break,
                },
                None => break,
            };
            match message {
                TransportMessage::Start => self.running = true,
                TransportMessage::Stop => self.running = false,
                TransportMessage::SetBpm(bpm) => self.set_bpm(bpm),
                TransportMessage::SetPpq(ppq) => self.set_ppq(ppq),
                TransportMessage::SetTick(tick) => self.set_tick(tick),
            }
        }
    }

    fn wake_satisfied(&self, tick: u64) {
        let mut targets = self.shared.targets.lock().unwrap();
        let before = targets.len();
        targets.retain(|&target| target > tick);
        if targets.is_empty() {
            self.shared.has_waiters.store(false, Ordering::SeqCst);
        }
        if targets.len() != before {
            self.shared.condvar.notify_all();
        }
    }

    fn update_samples_per_tick(&mut self) {
        self.samples_per_tick = self.sample_rate * 60.0 / (self.bpm * self.ppq) as f32;
    }
}

/// Cloneable observer side of the scheduler.
///
/// Never call [`TickHandle::wait_for_tick`] from the render thread: the
/// render thread is the only thing that advances the counter, so it would
/// wait on itself forever.
#[derive(Clone)]
pub struct TickHandle {
    shared: Arc<TickShared>,
}

impl TickHandle {
    pub fn current_tick(&self) -> u64 {
        self.shared.tick.load(Ordering::SeqCst)
    }

    /// Block the calling thread until the render clock reaches `target`.
    /// Returns immediately if the counter is already at or past it.
    pub fn wait_for_tick(&self, target: u64) {
        let mut targets = self.shared.targets.lock().unwrap();
        if self.shared.tick.load(Ordering::SeqCst) >= target {
            return;
        }
        targets.push(target);
        self.shared.has_waiters.store(true, Ordering::SeqCst);
        // Predicate re-check guards against spurious wakeups.
        while self.shared.tick.load(Ordering::SeqCst) < target {
            targets = self.shared.condvar.wait(targets).unwrap();
        }
    }
}

/// Transport command sent from a control thread to the render thread.
#[cfg(feature = "rtrb")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMessage {
    Start,
    Stop,
    SetBpm(u32),
    SetPpq(u32),
    SetTick(u64),
}

/// Producer side of the transport command queue.
///
/// Tempo setters validate strictly and fail before enqueueing, so the render
/// thread only ever sees in-range values.
#[cfg(feature = "rtrb")]
pub struct TransportHandle {
    tx: Producer<TransportMessage>,
}

#[cfg(feature = "rtrb")]
impl TransportHandle {
    pub fn start(&mut self) {
        let _ = self.tx.push(TransportMessage::Start);
    }

    pub fn stop(&mut self) {
        let _ = self.tx.push(TransportMessage::Stop);
    }

    pub fn set_bpm(&mut self, bpm: u32) -> Result<(), ParameterError> {
        let bpm = BPM_RANGE.validate("TickScheduler: BPM", bpm)?;
        let _ = self.tx.push(TransportMessage::SetBpm(bpm));
        Ok(())
    }

    pub fn set_ppq(&mut self, ppq: u32) -> Result<(), ParameterError> {
        let ppq = PPQ_RANGE.validate("TickScheduler: PPQ", ppq)?;
        let _ = self.tx.push(TransportMessage::SetPpq(ppq));
        Ok(())
    }

    pub fn set_tick(&mut self, tick: u64) {
        let _ = self.tx.push(TransportMessage::SetTick(tick));
    }
}
