//! Gravity timing. This is the only part of the crate that looks at the clock.
//!
//! The scheduler never owns the engine: every poll borrows it, so a timer can
//! only fire into an engine that is still alive. A pending tick is dropped the
//! moment the engine leaves `Running`, and restarted from scratch whenever the
//! drop interval or the engine's epoch changes.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::game::{Game, Phase};

// ============================================================================
// Clocks
// ============================================================================

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

// ============================================================================
// Scheduler
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct PendingTick {
    due: Instant,
    interval: Duration,
    epoch: u64,
}

pub struct Scheduler<C: Clock = SystemClock> {
    clock: C,
    pending: Option<PendingTick>,
}

impl Scheduler<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Scheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            pending: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Interval the pending tick was armed with.
    pub fn interval(&self) -> Option<Duration> {
        self.pending.map(|p| p.interval)
    }

    /// Arms the timer at the engine's current interval while it is running,
    /// cancels it otherwise. A new session or a resume re-arms from now.
    /// Call after every command.
    pub fn sync(&mut self, game: &Game) {
        if game.phase() != Phase::Running {
            self.cancel();
            return;
        }
        let interval = game.drop_interval();
        let epoch = game.epoch();
        match self.pending {
            Some(pending) if pending.interval == interval && pending.epoch == epoch => {}
            _ => self.arm(interval, epoch),
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Time left before the pending tick is due. `None` when nothing is armed.
    pub fn time_until_tick(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.pending.map(|p| p.due.saturating_duration_since(now))
    }

    /// Runs one gravity tick if it is due, then re-arms. Returns whether a
    /// tick ran.
    pub fn poll(&mut self, game: &mut Game) -> bool {
        self.sync(game);
        let Some(pending) = self.pending else {
            return false;
        };
        if self.clock.now() < pending.due {
            return false;
        }

        self.pending = None;
        game.apply_tick();
        self.sync(game);
        true
    }

    fn arm(&mut self, interval: Duration, epoch: u64) {
        self.pending = Some(PendingTick {
            due: self.clock.now() + interval,
            interval,
            epoch,
        });
    }
}
