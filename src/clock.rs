/// Countdown tick interval: one wall-clock second of game time.
pub const COUNTDOWN_INTERVAL_MS: u64 = 1000;
/// Expiry sweep interval: how often stale targets are collected.
pub const SWEEP_INTERVAL_MS: u64 = 100;

/// Ticks that became due since the last poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockTicks {
    pub countdown: u32,
    pub sweeps: u32,
}

/// Dual-cadence game clock: a 1 s countdown tick and a 100 ms expiry sweep.
///
/// Pull-based: the runtime loop calls `tick(now_ms)` and applies whatever
/// became due. While stopped, `tick` yields nothing, so no game mutation can
/// originate from a suspended clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct GameClock {
    running: bool,
    next_countdown_at: u64,
    next_sweep_at: u64,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms both cadences relative to `now_ms`. Restarting an already
    /// running clock re-bases the intervals, matching resume semantics.
    pub fn start(&mut self, now_ms: u64) {
        self.running = true;
        self.next_countdown_at = now_ms + COUNTDOWN_INTERVAL_MS;
        self.next_sweep_at = now_ms + SWEEP_INTERVAL_MS;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns every countdown tick and sweep that came due in
    /// `(last poll, now_ms]`. A long gap between polls yields multiple
    /// ticks so game time never silently drops.
    pub fn tick(&mut self, now_ms: u64) -> ClockTicks {
        let mut ticks = ClockTicks::default();
        if !self.running {
            return ticks;
        }
        while now_ms >= self.next_countdown_at {
            ticks.countdown += 1;
            self.next_countdown_at += COUNTDOWN_INTERVAL_MS;
        }
        while now_ms >= self.next_sweep_at {
            ticks.sweeps += 1;
            self.next_sweep_at += SWEEP_INTERVAL_MS;
        }
        ticks
    }
}
