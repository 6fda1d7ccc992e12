#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use glam::Vec2;
use seedpath_core::{EnemyId, EnemyView, TargetingMode, TowerSnapshot, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Towers without an eligible enemy are left out, and so are
    /// support towers, which never fire.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in towers.iter() {
            if tower.kind.is_support() {
                continue;
            }
            if let Some(enemy) = self.select(tower) {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy,
                });
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        for snapshot in enemies.iter() {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                health: snapshot.health,
                progress: snapshot.progress,
                flying: snapshot.flying,
            });
        }
    }

    fn select(&self, tower: &TowerSnapshot) -> Option<EnemyId> {
        let hits_flying = tower.kind.targets_flying();
        let mut best: Option<Scored> = None;

        for candidate in &self.enemy_workspace {
            if candidate.flying && !hits_flying {
                continue;
            }
            let distance = candidate.position.distance(tower.position);
            if distance > tower.effective_range {
                continue;
            }

            let current = Scored {
                enemy: candidate.id,
                score: match tower.targeting_mode {
                    TargetingMode::Closest | TargetingMode::Farthest => distance,
                    TargetingMode::Strongest | TargetingMode::Weakest => candidate.health,
                    TargetingMode::First => candidate.progress,
                },
            };
            match &mut best {
                Some(existing) => {
                    if current.precedes(existing, tower.targeting_mode) {
                        *existing = current;
                    }
                }
                None => best = Some(current),
            }
        }

        best.map(|scored| scored.enemy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
    health: f32,
    progress: f32,
    flying: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Scored {
    enemy: EnemyId,
    score: f32,
}

impl Scored {
    /// Strict comparison so the earlier enemy keeps ties.
    fn precedes(&self, other: &Self, mode: TargetingMode) -> bool {
        match mode {
            TargetingMode::Closest | TargetingMode::Weakest => self.score < other.score,
            TargetingMode::Farthest | TargetingMode::Strongest | TargetingMode::First => {
                self.score > other.score
            }
        }
    }
}
