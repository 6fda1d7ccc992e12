//! Wave lifecycle, completion rewards and dynamic difficulty.

use std::{collections::VecDeque, time::Duration};

use seedpath_core::{wave_enemy_count, DifficultyMultipliers, WaveError, WaveStatus};

/// Pause enforced between the end of one wave and the start of the next.
pub(crate) const WAVE_COUNTDOWN: Duration = Duration::from_secs(5);

/// Spawn interval before difficulty scaling.
pub(crate) const BASE_SPAWN_INTERVAL: Duration = Duration::from_millis(500);

const HISTORY_LENGTH: usize = 5;
const HISTORY_MINIMUM: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct WaveRecord {
    leaks: u32,
    perfect: bool,
}

/// Summary of a finished wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WaveOutcome {
    pub(crate) wave: u32,
    pub(crate) leaks: u32,
    pub(crate) perfect: bool,
    pub(crate) bonus: u32,
    pub(crate) research_points: u32,
}

#[derive(Clone, Debug)]
pub(crate) struct WaveState {
    wave: u32,
    in_progress: bool,
    remaining_spawns: u32,
    leaks: u32,
    perfect_streak: u32,
    countdown_until: Option<Duration>,
    history: VecDeque<WaveRecord>,
    adjustment: DifficultyMultipliers,
}

impl WaveState {
    pub(crate) fn new() -> Self {
        Self {
            wave: 0,
            in_progress: false,
            remaining_spawns: 0,
            leaks: 0,
            perfect_streak: 0,
            countdown_until: None,
            history: VecDeque::with_capacity(HISTORY_LENGTH),
            adjustment: DifficultyMultipliers::NEUTRAL,
        }
    }

    pub(crate) const fn wave(&self) -> u32 {
        self.wave
    }

    /// Multipliers produced by recent performance.
    pub(crate) const fn adjustment(&self) -> DifficultyMultipliers {
        self.adjustment
    }

    /// Difficulty may only change before anything has been played.
    pub(crate) const fn has_started(&self) -> bool {
        self.wave > 0 || self.in_progress
    }

    pub(crate) fn check_start(&self, now: Duration, game_over: bool) -> Result<(), WaveError> {
        if game_over {
            return Err(WaveError::GameOver);
        }
        if self.in_progress {
            return Err(WaveError::InProgress);
        }
        if self.countdown_until.is_some_and(|until| now < until) {
            return Err(WaveError::CountdownActive);
        }
        Ok(())
    }

    /// Begins the next wave and returns its enemy count.
    pub(crate) fn start(&mut self) -> u32 {
        self.wave += 1;
        self.in_progress = true;
        self.leaks = 0;
        self.countdown_until = None;
        self.remaining_spawns = wave_enemy_count(self.wave);
        self.remaining_spawns
    }

    /// Consumes one scheduled spawn; false when nothing is scheduled.
    pub(crate) fn take_spawn(&mut self) -> bool {
        if !self.in_progress || self.remaining_spawns == 0 {
            return false;
        }
        self.remaining_spawns -= 1;
        true
    }

    pub(crate) fn record_leak(&mut self) {
        self.leaks += 1;
    }

    /// A wave is done once its quota is spawned and nothing is left alive.
    pub(crate) const fn is_complete(&self, enemies_remaining: bool) -> bool {
        self.in_progress && self.remaining_spawns == 0 && !enemies_remaining
    }

    /// Closes the running wave, pays its bonus and updates the adjustment.
    pub(crate) fn complete(&mut self, now: Duration, dynamic_difficulty: bool) -> WaveOutcome {
        self.in_progress = false;
        self.countdown_until = Some(now + WAVE_COUNTDOWN);

        let perfect = self.leaks == 0;
        if dynamic_difficulty {
            if self.history.len() == HISTORY_LENGTH {
                let _ = self.history.pop_front();
            }
            self.history.push_back(WaveRecord {
                leaks: self.leaks,
                perfect,
            });
            self.adjust_difficulty();
        }

        let bonus = if perfect {
            self.perfect_streak += 1;
            let base = 50 + self.wave * 5;
            if self.perfect_streak > 1 {
                let streak = f64::from(base) * f64::from(self.perfect_streak - 1) * 0.2;
                base + streak.floor() as u32
            } else {
                base
            }
        } else {
            self.perfect_streak = 0;
            20_u32.saturating_sub(self.leaks * 5)
        };

        WaveOutcome {
            wave: self.wave,
            leaks: self.leaks,
            perfect,
            bonus,
            research_points: (self.wave / 2).max(1),
        }
    }

    fn adjust_difficulty(&mut self) {
        if self.history.len() < HISTORY_MINIMUM {
            return;
        }
        let perfect = self.history.iter().filter(|record| record.perfect).count();
        let leaks: u32 = self.history.iter().map(|record| record.leaks).sum();
        let perfect_rate = perfect as f64 / self.history.len() as f64;

        self.adjustment = if perfect_rate > 0.8 && leaks == 0 {
            DifficultyMultipliers::new(1.0, 1.1, 1.0, 1.05)
        } else if perfect_rate < 0.3 || leaks > 5 {
            DifficultyMultipliers::new(1.05, 0.95, 1.0, 0.95)
        } else {
            DifficultyMultipliers::NEUTRAL
        };
    }

    pub(crate) fn status(&self, now: Duration, game_over: bool) -> WaveStatus {
        WaveStatus {
            wave: self.wave,
            in_progress: self.in_progress,
            remaining_spawns: self.remaining_spawns,
            countdown: self
                .countdown_until
                .filter(|until| now < *until)
                .map(|until| until - now),
            game_over,
        }
    }
}

/// Spawn interval for the provided spawn rate multiplier.
pub(crate) fn spawn_interval(spawn_rate: f64) -> Duration {
    if spawn_rate > 0.0 && spawn_rate.is_finite() {
        BASE_SPAWN_INTERVAL.div_f64(spawn_rate)
    } else {
        BASE_SPAWN_INTERVAL
    }
}
