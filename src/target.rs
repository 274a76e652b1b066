use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Vertical band at the top of the arena reserved for the stats overlay.
/// Targets never spawn inside it.
pub const HEADER_PX: u32 = 80;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// How long a target stays clickable before the sweep reclaims it.
    pub fn lifetime_ms(&self) -> u64 {
        match self {
            Difficulty::Easy => 5000,
            Difficulty::Medium => 4000,
            Difficulty::Hard => 3000,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display, Serialize, Deserialize)]
pub enum GameMode {
    Gridshot,
    /// Routed and scored separately, but targets behave like gridshot;
    /// there is no moving-target behavior.
    Tracking,
    Precision,
}

impl GameMode {
    /// Half-open base diameter range in px, before the size multiplier.
    pub fn size_range(&self, difficulty: Difficulty) -> (u32, u32) {
        match self {
            GameMode::Precision => match difficulty {
                Difficulty::Easy => (30, 45),
                Difficulty::Medium => (20, 30),
                Difficulty::Hard => (12, 20),
            },
            _ => match difficulty {
                Difficulty::Easy => (40, 60),
                Difficulty::Medium => (30, 45),
                Difficulty::Hard => (20, 30),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetState {
    Appearing,
    Active,
    Disappearing,
}

/// A clickable circle inside the arena. `created_at_ms` drives expiry;
/// the id is an opaque monotonic counter.
#[derive(Clone, Copy, Debug)]
pub struct Target {
    pub id: u64,
    pub x: u32,
    pub y: u32,
    pub size: u32,
    pub lifetime_ms: u64,
    pub created_at_ms: u64,
    pub state: TargetState,
}

impl Target {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.state == TargetState::Active && now_ms.saturating_sub(self.created_at_ms) > self.lifetime_ms
    }

    /// Circle hit-test in arena pixel coordinates.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        let r = self.size as f64 / 2.0;
        let cx = self.x as f64 + r;
        let cy = self.y as f64 + r;
        let (dx, dy) = (px - cx, py - cy);
        dx * dx + dy * dy <= r * r
    }
}

/// Pixel dimensions of the game area the presentation layer reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaBounds {
    pub width: u32,
    pub height: u32,
}

impl ArenaBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Produces target placement, size, and lifetime for the lifecycle engine.
#[derive(Debug, Default)]
pub struct TargetGenerator {
    next_id: u64,
}

impl TargetGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        bounds: ArenaBounds,
        difficulty: Difficulty,
        mode: GameMode,
        size_multiplier: f64,
        now_ms: u64,
    ) -> Target {
        let mut rng = rand::thread_rng();

        let multiplier = size_multiplier.clamp(0.5, 2.0);
        let (lo, hi) = mode.size_range(difficulty);
        let base = rng.gen_range(lo..hi);
        let size = ((base as f64) * multiplier).round() as u32;

        // Uniform placement inside the playable band. If the arena is
        // smaller than the target the coordinate clamps to the band origin
        // rather than going negative or off-screen.
        let max_x = bounds.width.saturating_sub(size);
        let x = if max_x > 0 { rng.gen_range(0..max_x) } else { 0 };

        let max_y = bounds.height.saturating_sub(size + HEADER_PX);
        let y = if max_y > 0 {
            rng.gen_range(0..max_y) + HEADER_PX
        } else {
            HEADER_PX
        };

        self.next_id += 1;
        Target {
            id: self.next_id,
            x,
            y,
            size,
            lifetime_ms: difficulty.lifetime_ms(),
            created_at_ms: now_ms,
            state: TargetState::Appearing,
        }
    }
}
