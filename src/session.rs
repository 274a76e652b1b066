use chrono::prelude::*;
use std::fs::OpenOptions;
use std::io::{self, Write};

use crate::app_dirs::AppDirs;
use crate::clock::GameClock;
use crate::config::Config;
use crate::engine::{EngineEvent, LifecycleEngine, SpawnParams};
use crate::storage::{best_streak_key, high_score_key, ScoreStore};
use crate::target::{ArenaBounds, GameMode, Target};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lives {
    Infinite,
    Finite(i32),
}

impl Lives {
    fn for_config(lives_enabled: bool) -> Self {
        if lives_enabled {
            Lives::Finite(3)
        } else {
            Lives::Infinite
        }
    }

    fn lose(&mut self, n: u32) {
        if let Lives::Finite(left) = self {
            *left -= n as i32;
        }
    }

    pub fn is_depleted(&self) -> bool {
        matches!(self, Lives::Finite(left) if *left <= 0)
    }

    pub fn remaining(&self) -> Option<i32> {
        match self {
            Lives::Infinite => None,
            Lives::Finite(left) => Some((*left).max(0)),
        }
    }
}

/// Orchestrates the clock, generator, and lifecycle engine and owns every
/// aggregate the presentation layer displays. All game mutation funnels
/// through `tick` and the explicit user actions, so nothing can fire while
/// the session is paused or over.
pub struct GameSession {
    pub config: Config,
    pub bounds: ArenaBounds,
    pub phase: Phase,
    pub score: u32,
    pub missed_clicks: u32,
    pub total_clicks: u32,
    pub accuracy: u32,
    pub lives: Lives,
    pub streak: u32,
    pub best_streak: u32,
    pub high_score: u32,
    pub time_left: u32,
    clock: GameClock,
    engine: LifecycleEngine,
    store: Box<dyn ScoreStore>,
    paused_at_ms: Option<u64>,
    started_at: Option<DateTime<Local>>,
}

impl GameSession {
    pub fn new(config: Config, bounds: ArenaBounds, store: Box<dyn ScoreStore>) -> Self {
        let config = config.clamped();
        let engine = LifecycleEngine::new(SpawnParams {
            bounds,
            difficulty: config.difficulty,
            mode: config.mode,
            size_multiplier: config.target_size_multiplier,
        });
        let mut session = Self {
            config,
            bounds,
            phase: Phase::Idle,
            score: 0,
            missed_clicks: 0,
            total_clicks: 0,
            accuracy: 100,
            lives: Lives::for_config(config.lives_enabled),
            streak: 0,
            best_streak: 0,
            high_score: 0,
            time_left: config.game_time_secs,
            clock: GameClock::new(),
            engine,
            store,
            paused_at_ms: None,
            started_at: None,
        };
        session.load_bests();
        session
    }

    fn spawn_params(&self) -> SpawnParams {
        SpawnParams {
            bounds: self.bounds,
            difficulty: self.config.difficulty,
            mode: self.config.mode,
            size_multiplier: self.config.target_size_multiplier,
        }
    }

    fn load_bests(&mut self) {
        let read = |store: &dyn ScoreStore, key: &str| {
            store
                .get(key)
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(0)
        };
        self.high_score = read(
            self.store.as_ref(),
            &high_score_key(self.config.mode, self.config.difficulty),
        );
        self.best_streak = read(
            self.store.as_ref(),
            &best_streak_key(self.config.mode, self.config.difficulty),
        );
    }

    /// Full restart: clears prior state and aggregates, arms the clock, and
    /// schedules `target_count` staggered spawns. Valid from any phase.
    pub fn start(&mut self, now_ms: u64) {
        self.reset();
        self.phase = Phase::Running;
        self.started_at = Some(Local::now());
        self.engine.set_params(self.spawn_params());
        self.clock.start(now_ms);
        self.engine
            .schedule_initial_spawns(self.config.target_count, now_ms);
    }

    /// Suspends the clock and leaves targets and aggregates untouched.
    pub fn pause(&mut self, now_ms: u64) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::Paused;
        self.paused_at_ms = Some(now_ms);
        self.clock.stop();
    }

    /// Continues a paused session. Pending animations and target lifetimes
    /// are shifted by the pause length so nothing elapsed while suspended.
    pub fn resume(&mut self, now_ms: u64) {
        if self.phase != Phase::Paused {
            return;
        }
        if let Some(paused_at) = self.paused_at_ms.take() {
            self.engine.shift_timeline(now_ms.saturating_sub(paused_at));
        }
        self.phase = Phase::Running;
        self.clock.start(now_ms);
    }

    /// Back to Idle: stops the clock, drops all targets and pending
    /// transitions, zeroes aggregates.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.engine.clear();
        self.phase = Phase::Idle;
        self.score = 0;
        self.missed_clicks = 0;
        self.total_clicks = 0;
        self.accuracy = 100;
        self.lives = Lives::for_config(self.config.lives_enabled);
        self.streak = 0;
        self.time_left = self.config.game_time_secs;
        self.paused_at_ms = None;
        self.started_at = None;
        self.load_bests();
    }

    /// A session never carries across modes: switching while a run is live
    /// resets to Idle first, then bests for the new key are loaded.
    pub fn set_mode(&mut self, mode: GameMode) {
        if self.config.mode == mode {
            return;
        }
        if matches!(self.phase, Phase::Running | Phase::Paused) {
            self.reset();
        }
        self.config.mode = mode;
        self.engine.set_params(self.spawn_params());
        self.load_bests();
    }

    /// Applying settings restarts from Idle, like the settings modal did.
    pub fn apply_config(&mut self, config: Config) {
        self.config = config.clamped();
        self.reset();
        self.engine.set_params(self.spawn_params());
    }

    pub fn set_bounds(&mut self, bounds: ArenaBounds) {
        self.bounds = bounds;
        self.engine.set_params(self.spawn_params());
    }

    /// Single driver entry, called from the runtime loop. Applies countdown
    /// seconds, runs the expiry sweep, then resolves due engine transitions.
    /// No-op unless Running, which is the stale-callback guard.
    pub fn tick(&mut self, now_ms: u64) {
        if self.phase != Phase::Running {
            return;
        }
        let ticks = self.clock.tick(now_ms);

        for _ in 0..ticks.countdown {
            self.time_left = self.time_left.saturating_sub(1);
            if self.time_left == 0 {
                self.game_over();
                return;
            }
        }

        if ticks.sweeps > 0 {
            let expired = self.engine.sweep_expired(now_ms);
            if expired > 0 {
                self.streak = 0;
                self.lives.lose(expired);
                if self.lives.is_depleted() {
                    self.game_over();
                    return;
                }
            }
        }

        for event in self.engine.advance(now_ms) {
            if let EngineEvent::HitScored { .. } = event {
                self.score += 1;
                self.total_clicks += 1;
                self.streak += 1;
                self.best_streak = self.best_streak.max(self.streak);
                self.update_accuracy();
            }
        }
    }

    /// Routes a click in arena pixel coordinates: a hit if it lands on a
    /// target, a miss otherwise.
    pub fn on_click(&mut self, px: f64, py: f64, now_ms: u64) {
        if self.phase != Phase::Running {
            return;
        }
        match self.engine.target_at(px, py) {
            Some(id) => self.on_hit(id, now_ms),
            None => self.on_miss(),
        }
    }

    /// Begins the disappear animation for the target; scoring lands when
    /// the removal completes in `tick`. Stale ids are silent no-ops.
    pub fn on_hit(&mut self, id: u64, now_ms: u64) {
        if self.phase != Phase::Running {
            return;
        }
        self.engine.on_hit(id, now_ms);
    }

    pub fn on_miss(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.missed_clicks += 1;
        self.total_clicks += 1;
        self.streak = 0;
        self.update_accuracy();
        self.lives.lose(1);
        if self.lives.is_depleted() {
            self.game_over();
        }
    }

    fn update_accuracy(&mut self) {
        self.accuracy = if self.total_clicks == 0 {
            100
        } else {
            ((self.score as f64 / self.total_clicks as f64) * 100.0).round() as u32
        };
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.clock.stop();

        let hs_key = high_score_key(self.config.mode, self.config.difficulty);
        let stored_high = self
            .store
            .get(&hs_key)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        if self.score > stored_high {
            let _ = self.store.set(&hs_key, &self.score.to_string());
            self.high_score = self.score;
        }

        let bs_key = best_streak_key(self.config.mode, self.config.difficulty);
        let stored_streak = self
            .store
            .get(&bs_key)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        if self.best_streak > stored_streak {
            let _ = self.store.set(&bs_key, &self.best_streak.to_string());
        }

        let _ = self.save_history();
    }

    pub fn targets(&self) -> &[Target] {
        self.engine.targets()
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    fn save_history(&self) -> io::Result<()> {
        let Some(log_path) = AppDirs::history_path() else {
            return Ok(());
        };
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !log_path.exists();

        let mut log_file = OpenOptions::new().append(true).create(true).open(log_path)?;

        if needs_header {
            writeln!(
                log_file,
                "date,mode,difficulty,score,accuracy,best_streak,time_played_secs"
            )?;
        }

        writeln!(
            log_file,
            "{},{},{},{},{},{},{}",
            self.started_at.unwrap_or_else(Local::now).format("%c"),
            self.config.mode.to_string().to_lowercase(),
            self.config.difficulty.to_string().to_lowercase(),
            self.score,
            self.accuracy,
            self.best_streak,
            self.config.game_time_secs - self.time_left,
        )?;

        Ok(())
    }
}
