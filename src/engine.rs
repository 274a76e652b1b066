use itertools::Itertools;

use crate::target::{ArenaBounds, Difficulty, GameMode, Target, TargetGenerator, TargetState};

/// Appearing -> Active transition delay, matching the spawn animation.
pub const APPEAR_MS: u64 = 300;
/// Hit -> removed transition delay, matching the disappear animation.
pub const DISAPPEAR_MS: u64 = 300;
/// Gap between a hit target being removed and its replacement spawning.
pub const RESPAWN_DELAY_MS: u64 = 200;
/// Stagger between the initial spawns of a session.
pub const INITIAL_SPAWN_INTERVAL_MS: u64 = 800;

/// Everything the generator needs to place a target.
#[derive(Clone, Copy, Debug)]
pub struct SpawnParams {
    pub bounds: ArenaBounds,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub size_multiplier: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Activate(u64),
    Remove(u64),
    Spawn,
}

/// A scheduled state transition. The arena of these replaces ad-hoc timer
/// callbacks: `clear` cancels every pending transition as a unit, and
/// nothing can fire while the session is not being advanced.
#[derive(Clone, Copy, Debug)]
struct Pending {
    due_at_ms: u64,
    seq: u64,
    action: Action,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// A hit target finished disappearing and was removed; score now.
    HitScored { id: u64 },
    /// A new target entered the arena.
    Spawned { id: u64 },
}

/// Owns the active-target collection and the per-target state machine:
/// Appearing --300ms--> Active --hit--> Disappearing --300ms--> removed,
/// or Active --expiry--> removed immediately.
#[derive(Debug)]
pub struct LifecycleEngine {
    params: SpawnParams,
    targets: Vec<Target>,
    pending: Vec<Pending>,
    generator: TargetGenerator,
    seq: u64,
}

impl LifecycleEngine {
    pub fn new(params: SpawnParams) -> Self {
        Self {
            params,
            targets: Vec::new(),
            pending: Vec::new(),
            generator: TargetGenerator::new(),
            seq: 0,
        }
    }

    pub fn set_params(&mut self, params: SpawnParams) {
        self.params = params;
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Topmost target containing the point, in arena pixel coordinates.
    /// Later spawns render on top, so scan newest-first.
    pub fn target_at(&self, px: f64, py: f64) -> Option<u64> {
        self.targets
            .iter()
            .rev()
            .find(|t| t.contains(px, py))
            .map(|t| t.id)
    }

    fn schedule(&mut self, due_at_ms: u64, action: Action) {
        self.seq += 1;
        self.pending.push(Pending {
            due_at_ms,
            seq: self.seq,
            action,
        });
    }

    fn spawn_at(&mut self, now_ms: u64) -> u64 {
        let target = self.generator.spawn(
            self.params.bounds,
            self.params.difficulty,
            self.params.mode,
            self.params.size_multiplier,
            now_ms,
        );
        let id = target.id;
        self.targets.push(target);
        self.schedule(now_ms + APPEAR_MS, Action::Activate(id));
        id
    }

    /// Immediately inserts an Appearing target and schedules its activation.
    pub fn request_spawn(&mut self, now_ms: u64) -> u64 {
        self.spawn_at(now_ms)
    }

    /// Arms exactly `count` staggered spawns, the first 800 ms out. The cap
    /// is structural: no more spawn actions exist than were scheduled here,
    /// plus one replacement per scored hit.
    pub fn schedule_initial_spawns(&mut self, count: u32, now_ms: u64) {
        for i in 1..=u64::from(count) {
            self.schedule(now_ms + i * INITIAL_SPAWN_INTERVAL_MS, Action::Spawn);
        }
    }

    /// Begins the disappear animation for an Active target. Returns false
    /// for unknown ids or targets already leaving the arena, making
    /// double-clicks and hit-vs-expiry races idempotent no-ops.
    pub fn on_hit(&mut self, id: u64, now_ms: u64) -> bool {
        match self.targets.iter_mut().find(|t| t.id == id) {
            Some(target) if target.state == TargetState::Active => {
                target.state = TargetState::Disappearing;
                self.schedule(now_ms + DISAPPEAR_MS, Action::Remove(id));
                true
            }
            _ => false,
        }
    }

    /// Removes every Active target whose lifetime has elapsed; expired
    /// targets skip the disappear animation. Returns how many were removed.
    pub fn sweep_expired(&mut self, now_ms: u64) -> u32 {
        let before = self.targets.len();
        self.targets.retain(|t| !t.is_expired(now_ms));
        (before - self.targets.len()) as u32
    }

    /// Resolves every pending transition due at or before `now_ms`, in the
    /// order scheduled. Transitions created while draining (a replacement
    /// spawn, an activation) are themselves resolved if already due, so a
    /// coarse poll still replays the logical timeline in order.
    pub fn advance(&mut self, now_ms: u64) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        loop {
            let Some(idx) = self
                .pending
                .iter()
                .position_min_by_key(|p| (p.due_at_ms, p.seq))
            else {
                break;
            };
            if self.pending[idx].due_at_ms > now_ms {
                break;
            }
            let pending = self.pending.swap_remove(idx);
            match pending.action {
                Action::Activate(id) => {
                    if let Some(target) = self.targets.iter_mut().find(|t| t.id == id) {
                        if target.state == TargetState::Appearing {
                            target.state = TargetState::Active;
                        }
                    }
                }
                Action::Remove(id) => {
                    let before = self.targets.len();
                    self.targets
                        .retain(|t| !(t.id == id && t.state == TargetState::Disappearing));
                    if self.targets.len() < before {
                        events.push(EngineEvent::HitScored { id });
                        self.schedule(pending.due_at_ms + RESPAWN_DELAY_MS, Action::Spawn);
                    }
                }
                Action::Spawn => {
                    let id = self.spawn_at(pending.due_at_ms);
                    events.push(EngineEvent::Spawned { id });
                }
            }
        }
        events
    }

    /// Drops all targets and cancels every pending transition, no animation.
    pub fn clear(&mut self) {
        self.targets.clear();
        self.pending.clear();
    }

    /// Moves the whole timeline forward by `delta_ms`, used when resuming
    /// from a pause so lifetimes and in-flight animations pick up where
    /// they stopped instead of elapsing during the pause.
    pub fn shift_timeline(&mut self, delta_ms: u64) {
        for pending in &mut self.pending {
            pending.due_at_ms += delta_ms;
        }
        for target in &mut self.targets {
            target.created_at_ms += delta_ms;
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::HEADER_PX;

    fn params() -> SpawnParams {
        SpawnParams {
            bounds: ArenaBounds::new(800, 600),
            difficulty: Difficulty::Medium,
            mode: GameMode::Gridshot,
            size_multiplier: 1.0,
        }
    }

    fn engine() -> LifecycleEngine {
        LifecycleEngine::new(params())
    }

    #[test]
    fn spawned_target_activates_after_appear_delay() {
        let mut engine = engine();
        let id = engine.request_spawn(0);
        assert_eq!(engine.targets()[0].state, TargetState::Appearing);

        engine.advance(APPEAR_MS - 1);
        assert_eq!(engine.targets()[0].state, TargetState::Appearing);

        engine.advance(APPEAR_MS);
        assert_eq!(engine.targets()[0].state, TargetState::Active);
        assert_eq!(engine.targets()[0].id, id);
    }

    #[test]
    fn hit_scores_only_after_disappear_delay() {
        let mut engine = engine();
        let id = engine.request_spawn(0);
        engine.advance(APPEAR_MS);

        assert!(engine.on_hit(id, 1000));
        assert_eq!(engine.targets()[0].state, TargetState::Disappearing);

        assert_eq!(engine.advance(1000 + DISAPPEAR_MS - 1), vec![]);
        let events = engine.advance(1000 + DISAPPEAR_MS);
        assert_eq!(events, vec![EngineEvent::HitScored { id }]);
    }

    #[test]
    fn hit_is_rejected_while_appearing() {
        let mut engine = engine();
        let id = engine.request_spawn(0);
        assert!(!engine.on_hit(id, 100));
        assert_eq!(engine.targets()[0].state, TargetState::Appearing);
    }

    #[test]
    fn double_hit_is_idempotent() {
        let mut engine = engine();
        let id = engine.request_spawn(0);
        engine.advance(APPEAR_MS);

        assert!(engine.on_hit(id, 1000));
        assert!(!engine.on_hit(id, 1001));

        // Only one removal, only one replacement spawn.
        let events = engine.advance(2000);
        let scored = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::HitScored { .. }))
            .count();
        assert_eq!(scored, 1);
    }

    #[test]
    fn scored_hit_schedules_replacement() {
        let mut engine = engine();
        let id = engine.request_spawn(0);
        engine.advance(APPEAR_MS);
        engine.on_hit(id, 1000);

        // Removal at 1300, replacement due at 1500; a coarse poll resolves
        // both in order.
        let events = engine.advance(1500);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], EngineEvent::HitScored { id });
        assert!(matches!(events[1], EngineEvent::Spawned { .. }));
        assert_eq!(engine.targets().len(), 1);
    }

    #[test]
    fn expiry_removes_without_animation() {
        let mut engine = engine();
        let id = engine.request_spawn(0);
        engine.advance(APPEAR_MS);

        let lifetime = Difficulty::Medium.lifetime_ms();
        assert_eq!(engine.sweep_expired(lifetime), 0);
        assert_eq!(engine.sweep_expired(lifetime + 1), 1);
        assert!(engine.targets().is_empty());

        // The expired target is gone for the hit path too.
        assert!(!engine.on_hit(id, lifetime + 2));
    }

    #[test]
    fn disappearing_target_cannot_expire() {
        let mut engine = engine();
        let id = engine.request_spawn(0);
        engine.advance(APPEAR_MS);
        engine.on_hit(id, 100);

        let lifetime = Difficulty::Medium.lifetime_ms();
        assert_eq!(engine.sweep_expired(lifetime + 1000), 0);
    }

    #[test]
    fn sweep_can_expire_several_at_once() {
        let mut engine = engine();
        engine.request_spawn(0);
        engine.request_spawn(0);
        engine.request_spawn(0);
        engine.advance(APPEAR_MS);

        let lifetime = Difficulty::Medium.lifetime_ms();
        assert_eq!(engine.sweep_expired(lifetime + 1), 3);
    }

    #[test]
    fn initial_spawns_are_staggered_and_capped() {
        let mut engine = engine();
        engine.schedule_initial_spawns(5, 0);

        assert!(engine.targets().is_empty());
        engine.advance(799);
        assert!(engine.targets().is_empty());

        engine.advance(800);
        assert_eq!(engine.targets().len(), 1);
        engine.advance(4000);
        assert_eq!(engine.targets().len(), 5);

        // No more spawns no matter how long the session runs.
        engine.advance(60_000);
        assert_eq!(engine.targets().len(), 5);
    }

    #[test]
    fn clear_cancels_pending_transitions_as_a_unit() {
        let mut engine = engine();
        engine.schedule_initial_spawns(5, 0);
        let id = engine.request_spawn(0);
        engine.advance(APPEAR_MS);
        engine.on_hit(id, 400);

        engine.clear();
        assert!(engine.targets().is_empty());
        assert!(!engine.has_pending());
        assert_eq!(engine.advance(60_000), vec![]);
    }

    #[test]
    fn shift_timeline_defers_expiry_and_animations() {
        let mut engine = engine();
        engine.request_spawn(0);

        // A 10 s pause before the target ever activated.
        engine.shift_timeline(10_000);
        engine.advance(10_000 + APPEAR_MS);
        assert_eq!(engine.targets()[0].state, TargetState::Active);

        let lifetime = Difficulty::Medium.lifetime_ms();
        assert_eq!(engine.sweep_expired(10_000 + lifetime), 0);
        assert_eq!(engine.sweep_expired(10_000 + lifetime + 1), 1);
    }

    #[test]
    fn target_at_finds_topmost_target() {
        let mut engine = engine();
        engine.request_spawn(0);
        engine.advance(APPEAR_MS);

        let target = engine.targets()[0];
        let r = target.size as f64 / 2.0;
        let (cx, cy) = (target.x as f64 + r, target.y as f64 + r);
        assert_eq!(engine.target_at(cx, cy), Some(target.id));
        assert_eq!(engine.target_at(-1.0, f64::from(HEADER_PX)), None);
    }
}
