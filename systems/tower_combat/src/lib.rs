#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fire-rate gate that turns tower targets into projectile launches.
//!
//! A tower fires when it holds a target, is not a support tower, and its
//! effective interval has elapsed since its last shot. The effective interval
//! is the base interval divided by the speed boost multiplier.

use std::time::Duration;

use seedpath_core::{
    Command, SimulationEffects, TowerCooldownSnapshot, TowerCooldownView, TowerTarget,
};

/// Emits `Command::FireProjectile` for targeted towers whose cooldown elapsed.
#[derive(Debug, Default)]
pub struct TowerCombat {
    ready: Vec<Command>,
}

impl TowerCombat {
    /// Creates the system with an empty launch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one launch per ready tower, in target order.
    pub fn handle(
        &mut self,
        now: Duration,
        effects: &SimulationEffects,
        cooldowns: &TowerCooldownView,
        targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        self.ready.clear();
        for target in targets {
            let Some(timing) = cooldowns.get(target.tower) else {
                continue;
            };
            if ready_in(timing, now, effects) == Some(Duration::ZERO) {
                self.ready.push(Command::FireProjectile {
                    tower: target.tower,
                    target: target.enemy,
                });
            }
        }
        out.append(&mut self.ready);
    }
}

/// Time left before the tower may fire again, `None` for towers that never fire.
#[must_use]
pub fn ready_in(
    timing: &TowerCooldownSnapshot,
    now: Duration,
    effects: &SimulationEffects,
) -> Option<Duration> {
    if timing.kind.is_support() {
        return None;
    }
    let Some(last_shot) = timing.last_shot else {
        return Some(Duration::ZERO);
    };
    let interval = effects.fire_interval(timing.fire_interval);
    Some(interval.saturating_sub(now.saturating_sub(last_shot)))
}
