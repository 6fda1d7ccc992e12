//! Global ability timers and the simulation effects they drive.

use std::time::Duration;

use seedpath_core::{AbilityError, AbilityKind, SimulationEffects};

const SPEED_BOOST_FIRE_RATE: f32 = 2.0;
const FREEZE_SPEED: f32 = 0.1;

#[derive(Clone, Copy, Debug, Default)]
struct AbilityTimer {
    last_used: Option<Duration>,
    active_until: Option<Duration>,
}

/// Owns the ability timers and is the only writer of [`SimulationEffects`].
#[derive(Clone, Debug, Default)]
pub(crate) struct Abilities {
    timers: [AbilityTimer; 4],
    effects: SimulationEffects,
}

impl Abilities {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) const fn effects(&self) -> SimulationEffects {
        self.effects
    }

    /// Validates an activation at `now` against the available currency.
    pub(crate) fn check(
        &self,
        kind: AbilityKind,
        now: Duration,
        currency: u32,
    ) -> Result<(), AbilityError> {
        let profile = kind.profile();
        let timer = self.timers[slot(kind)];
        if timer.active_until.is_some() {
            return Err(AbilityError::AlreadyActive);
        }
        if let Some(last_used) = timer.last_used {
            if now.saturating_sub(last_used) < profile.cooldown {
                return Err(AbilityError::CoolingDown);
            }
        }
        if currency < profile.cost {
            return Err(AbilityError::InsufficientFunds);
        }
        Ok(())
    }

    /// Starts the ability and applies its effect; returns the deadline.
    pub(crate) fn activate(&mut self, kind: AbilityKind, now: Duration) -> Duration {
        let until = now + kind.profile().duration;
        self.timers[slot(kind)] = AbilityTimer {
            last_used: Some(now),
            active_until: Some(until),
        };
        match kind {
            AbilityKind::SpeedBoost => self.effects.fire_rate_multiplier = SPEED_BOOST_FIRE_RATE,
            AbilityKind::FreezeWave => self.effects.enemy_speed_multiplier = FREEZE_SPEED,
            AbilityKind::Airstrike => self.effects.airstrike_armed = true,
            AbilityKind::Shield => self.effects.incoming_damage_blocked = true,
        }
        until
    }

    /// Ends every ability whose deadline has been reached and reverts its effect.
    ///
    /// An armed airstrike stays armed until it is executed.
    pub(crate) fn expire(&mut self, now: Duration) -> Vec<AbilityKind> {
        let mut expired = Vec::new();
        for kind in AbilityKind::ALL {
            let timer = &mut self.timers[slot(kind)];
            let Some(until) = timer.active_until else {
                continue;
            };
            if now < until {
                continue;
            }
            timer.active_until = None;
            match kind {
                AbilityKind::SpeedBoost => self.effects.fire_rate_multiplier = 1.0,
                AbilityKind::FreezeWave => self.effects.enemy_speed_multiplier = 1.0,
                AbilityKind::Airstrike => {}
                AbilityKind::Shield => self.effects.incoming_damage_blocked = false,
            }
            expired.push(kind);
        }
        expired
    }

    /// Consumes an armed airstrike.
    pub(crate) fn disarm_airstrike(&mut self) -> bool {
        std::mem::replace(&mut self.effects.airstrike_armed, false)
    }

    pub(crate) fn is_active(&self, kind: AbilityKind) -> bool {
        self.timers[slot(kind)].active_until.is_some()
    }
}

const fn slot(kind: AbilityKind) -> usize {
    match kind {
        AbilityKind::SpeedBoost => 0,
        AbilityKind::FreezeWave => 1,
        AbilityKind::Airstrike => 2,
        AbilityKind::Shield => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_abilities_are_ready() {
        let abilities = Abilities::new();
        for kind in AbilityKind::ALL {
            assert_eq!(abilities.check(kind, Duration::ZERO, 1_000), Ok(()));
        }
    }

    #[test]
    fn activation_respects_cost_activity_and_cooldown() {
        let mut abilities = Abilities::new();
        assert_eq!(
            abilities.check(AbilityKind::Shield, Duration::ZERO, 249),
            Err(AbilityError::InsufficientFunds)
        );

        let until = abilities.activate(AbilityKind::SpeedBoost, Duration::from_secs(1));
        assert_eq!(until, Duration::from_secs(11));
        assert_eq!(abilities.effects().fire_rate_multiplier, 2.0);
        assert_eq!(
            abilities.check(AbilityKind::SpeedBoost, Duration::from_secs(5), 1_000),
            Err(AbilityError::AlreadyActive)
        );

        assert!(abilities.expire(Duration::from_secs(10)).is_empty());
        assert_eq!(
            abilities.expire(Duration::from_secs(11)),
            vec![AbilityKind::SpeedBoost]
        );
        assert_eq!(abilities.effects(), SimulationEffects::NEUTRAL);
        assert_eq!(
            abilities.check(AbilityKind::SpeedBoost, Duration::from_secs(20), 1_000),
            Err(AbilityError::CoolingDown)
        );
        assert_eq!(
            abilities.check(AbilityKind::SpeedBoost, Duration::from_secs(31), 1_000),
            Ok(())
        );
    }

    #[test]
    fn airstrike_arms_until_consumed() {
        let mut abilities = Abilities::new();
        let _ = abilities.activate(AbilityKind::Airstrike, Duration::from_secs(2));
        assert!(abilities.effects().airstrike_armed);
        assert_eq!(
            abilities.expire(Duration::from_secs(2)),
            vec![AbilityKind::Airstrike]
        );
        assert!(!abilities.is_active(AbilityKind::Airstrike));
        assert!(abilities.effects().airstrike_armed);
        assert!(abilities.disarm_airstrike());
        assert!(!abilities.disarm_airstrike());
    }

    #[test]
    fn freeze_and_shield_toggle_their_flags() {
        let mut abilities = Abilities::new();
        let _ = abilities.activate(AbilityKind::FreezeWave, Duration::ZERO);
        let _ = abilities.activate(AbilityKind::Shield, Duration::ZERO);
        let effects = abilities.effects();
        assert_eq!(effects.enemy_speed_multiplier, 0.1);
        assert!(effects.incoming_damage_blocked);

        assert_eq!(
            abilities.expire(Duration::from_secs(5)),
            vec![AbilityKind::FreezeWave]
        );
        assert!(abilities.effects().incoming_damage_blocked);
        assert_eq!(
            abilities.expire(Duration::from_secs(8)),
            vec![AbilityKind::Shield]
        );
        assert!(!abilities.effects().incoming_damage_blocked);
    }
}
