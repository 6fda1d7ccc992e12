#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.
//!
//! Every wave draws its enemy kinds from a private ChaCha8 stream seeded with
//! the SHA-256 digest of the map seed and the wave number, so the composition
//! of a wave is fixed before the first enemy appears and can be previewed
//! without touching the world.

use std::{collections::BTreeMap, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use seedpath_core::{wave_enemy_count, Command, EnemyKind, Event};
use sha2::{Digest, Sha256};

const RNG_STREAM_LABEL: &str = "seedpath/wave-spawns";

/// Pure system that drips the enemies of the running wave onto the path.
#[derive(Debug, Default)]
pub struct Spawning {
    schedule: Option<Schedule>,
}

#[derive(Debug)]
struct Schedule {
    wave: u32,
    remaining: u32,
    interval: Duration,
    next_spawn: Option<Duration>,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates an idle spawning system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enemies the running wave still has to release.
    #[must_use]
    pub fn pending(&self) -> u32 {
        self.schedule
            .as_ref()
            .map_or(0, |schedule| schedule.remaining)
    }

    /// Consumes world events and emits at most one spawn command.
    ///
    /// The first enemy of a wave spawns on the first time advance observed
    /// after its `WaveStarted` event; later ones wait for the spawn interval.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut now = None;
        for event in events {
            match event {
                Event::WaveStarted {
                    wave,
                    seed,
                    enemy_count,
                    spawn_interval,
                } => {
                    self.schedule = Some(Schedule {
                        wave: *wave,
                        remaining: *enemy_count,
                        interval: *spawn_interval,
                        next_spawn: None,
                        rng: wave_rng(*seed, *wave),
                    });
                }
                Event::GameRestarted { .. } | Event::GameOver { .. } => self.schedule = None,
                Event::TimeAdvanced { now: time } => now = Some(*time),
                _ => {}
            }
        }

        let (Some(now), Some(schedule)) = (now, self.schedule.as_mut()) else {
            return;
        };
        if schedule.next_spawn.is_some_and(|due| now < due) {
            return;
        }

        let kind = roll_kind(schedule.wave, schedule.rng.gen::<f64>());
        out.push(Command::SpawnEnemy { kind });
        schedule.remaining -= 1;
        schedule.next_spawn = Some(now + schedule.interval);
        if schedule.remaining == 0 {
            self.schedule = None;
        }
    }
}

/// Picks the enemy kind for one uniform roll in `[0, 1)`.
///
/// Thresholds are checked from the rarest kind down; the first match wins.
#[must_use]
pub fn roll_kind(wave: u32, roll: f64) -> EnemyKind {
    if wave >= 10 && roll < 0.05 {
        EnemyKind::Boss
    } else if wave >= 7 && roll < 0.08 {
        EnemyKind::Splitting
    } else if wave >= 5 && roll < 0.1 {
        EnemyKind::Regenerating
    } else if wave >= 4 && roll < 0.12 {
        EnemyKind::Shielded
    } else if wave >= 3 && roll < 0.15 {
        EnemyKind::Flying
    } else if wave >= 3 && roll < 0.3 {
        EnemyKind::Tank
    } else if wave >= 2 && roll < 0.5 {
        EnemyKind::Fast
    } else {
        EnemyKind::Basic
    }
}

/// Per-kind enemy counts of one wave.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaveComposition {
    wave: u32,
    counts: BTreeMap<EnemyKind, u32>,
}

impl WaveComposition {
    /// Computes the exact composition the spawner will produce for `wave` on
    /// the map generated from `seed`.
    #[must_use]
    pub fn preview(seed: u32, wave: u32) -> Self {
        let mut rng = wave_rng(seed, wave);
        let mut counts = BTreeMap::new();
        for _ in 0..wave_enemy_count(wave) {
            *counts
                .entry(roll_kind(wave, rng.gen::<f64>()))
                .or_insert(0) += 1;
        }
        Self { wave, counts }
    }

    /// Wave number the composition belongs to.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Number of enemies of the provided kind.
    #[must_use]
    pub fn count(&self, kind: EnemyKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Total number of enemies in the wave.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Kinds present in the wave with their counts, in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = (EnemyKind, u32)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}

fn wave_rng(seed: u32, wave: u32) -> ChaCha8Rng {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    hasher.update(RNG_STREAM_LABEL.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    ChaCha8Rng::seed_from_u64(u64::from_le_bytes(bytes))
}
