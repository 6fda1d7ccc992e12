//! Damage resolution for projectile hits and airstrikes.

use std::time::Duration;

use glam::Vec2;
use seedpath_core::{EnemyId, Event, TowerBehavior, TowerId};

use crate::enemies::EnemyArena;

/// Radius of an airstrike detonation.
pub(crate) const AIRSTRIKE_RADIUS: f32 = 150.0;

/// Damage dealt to every enemy caught by an airstrike.
pub(crate) const AIRSTRIKE_DAMAGE: f32 = 200.0;

/// Damage and kills credited to a tower by one resolved hit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct HitSummary {
    pub(crate) damage: f32,
    pub(crate) kills: u32,
}

impl HitSummary {
    fn record(&mut self, damage: f32, killed: bool) {
        self.damage += damage;
        if killed {
            self.kills += 1;
        }
    }
}

/// Applies damage to one enemy, crediting `tower` if it dies from it.
///
/// Returns whether this call moved the enemy from alive to dead.
fn strike(
    enemies: &mut EnemyArena,
    enemy_id: EnemyId,
    amount: f32,
    tower: Option<TowerId>,
    out_events: &mut Vec<Event>,
) -> bool {
    let Some(enemy) = enemies.get_mut(enemy_id) else {
        return false;
    };
    if !enemy.is_active() {
        return false;
    }

    let outcome = enemy.apply_damage(amount);
    if outcome.killed {
        enemy.killed_by = tower;
    }
    tracing::trace!(
        enemy = enemy_id.index(),
        amount,
        absorbed = outcome.absorbed,
        killed = outcome.killed,
        "enemy struck"
    );
    out_events.push(Event::EnemyDamaged {
        enemy: enemy_id,
        amount,
        tower,
    });
    outcome.killed
}

/// A projectile connecting with its bound target.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Hit {
    pub(crate) tower: TowerId,
    pub(crate) behavior: TowerBehavior,
    pub(crate) impact: Vec2,
    pub(crate) target: EnemyId,
    pub(crate) damage: f32,
}

/// Resolves a hit according to the firing tower's behaviour.
pub(crate) fn resolve_hit(
    hit: Hit,
    now: Duration,
    enemies: &mut EnemyArena,
    out_events: &mut Vec<Event>,
) -> HitSummary {
    let Hit {
        tower,
        behavior,
        impact,
        target,
        damage,
    } = hit;
    let mut summary = HitSummary::default();
    match behavior {
        TowerBehavior::SingleTarget | TowerBehavior::Support { .. } => {
            let killed = strike(enemies, target, damage, Some(tower), out_events);
            summary.record(damage, killed);
        }
        TowerBehavior::Area { radius } => {
            let caught: Vec<EnemyId> = enemies
                .iter()
                .filter(|(_, enemy)| {
                    enemy.is_active()
                        && !enemy.is_flying()
                        && enemy.position.distance(impact) < radius
                })
                .map(|(id, _)| id)
                .collect();
            for enemy_id in caught {
                let killed = strike(enemies, enemy_id, damage, Some(tower), out_events);
                summary.record(damage, killed);
            }
        }
        TowerBehavior::Chain {
            hops,
            hop_range,
            falloff,
        } => {
            let Some(mut link) = enemies.get(target).map(|enemy| enemy.position) else {
                return summary;
            };
            let killed = strike(enemies, target, damage, Some(tower), out_events);
            summary.record(damage, killed);

            let hop_damage = damage * falloff;
            let mut chained = vec![target];
            for _ in 0..hops {
                let mut closest = hop_range;
                let mut next: Option<(EnemyId, Vec2)> = None;
                for (id, enemy) in enemies.iter() {
                    if !enemy.is_active() || chained.contains(&id) {
                        continue;
                    }
                    let distance = enemy.position.distance(link);
                    if distance < closest {
                        closest = distance;
                        next = Some((id, enemy.position));
                    }
                }

                let Some((id, position)) = next else {
                    break;
                };
                chained.push(id);
                link = position;
                let killed = strike(enemies, id, hop_damage, Some(tower), out_events);
                summary.record(hop_damage, killed);
            }
        }
        TowerBehavior::Debuff { slow, duration } => {
            let killed = strike(enemies, target, damage, Some(tower), out_events);
            summary.record(damage, killed);
            if let Some(enemy) = enemies.get_mut(target) {
                enemy.apply_slow(slow, now + duration);
            }
        }
    }
    summary
}

/// Damages every live enemy, flying ones included, around `position`.
pub(crate) fn airstrike(
    enemies: &mut EnemyArena,
    position: Vec2,
    out_events: &mut Vec<Event>,
) -> u32 {
    let caught: Vec<EnemyId> = enemies
        .iter()
        .filter(|(_, enemy)| {
            enemy.is_active() && enemy.position.distance(position) < AIRSTRIKE_RADIUS
        })
        .map(|(id, _)| id)
        .collect();
    let hits = u32::try_from(caught.len()).unwrap_or(u32::MAX);
    for enemy_id in caught {
        let _ = strike(enemies, enemy_id, AIRSTRIKE_DAMAGE, None, out_events);
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::Enemy;
    use seedpath_core::{EnemyKind, TowerKind};
    use seedpath_system_path_generation::Path;

    fn arena_at(positions: &[(EnemyKind, Vec2)]) -> (EnemyArena, Vec<EnemyId>) {
        let path = Path::new(1, 800.0, 600.0);
        let mut arena = EnemyArena::new();
        let ids = positions
            .iter()
            .map(|(kind, position)| {
                let mut enemy = Enemy::spawn(*kind, 1.0, &path);
                enemy.position = *position;
                arena.insert(enemy)
            })
            .collect();
        (arena, ids)
    }

    fn damage_by_enemy(events: &[Event]) -> Vec<(EnemyId, f32)> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::EnemyDamaged { enemy, amount, .. } => Some((*enemy, *amount)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn area_hit_damages_every_ground_enemy_in_radius() {
        let (mut arena, ids) = arena_at(&[
            (EnemyKind::Tank, Vec2::new(100.0, 100.0)),
            (EnemyKind::Tank, Vec2::new(130.0, 100.0)),
            (EnemyKind::Tank, Vec2::new(100.0, 140.0)),
            (EnemyKind::Flying, Vec2::new(110.0, 110.0)),
            (EnemyKind::Tank, Vec2::new(400.0, 400.0)),
        ]);
        let mut events = Vec::new();
        let summary = resolve_hit(
            Hit {
                tower: TowerId::new(0),
                behavior: TowerKind::Cannon.profile().behavior,
                impact: Vec2::new(100.0, 100.0),
                target: ids[0],
                damage: 40.0,
            },
            Duration::ZERO,
            &mut arena,
            &mut events,
        );

        let damaged = damage_by_enemy(&events);
        assert_eq!(damaged.len(), 3);
        for (index, (enemy, amount)) in damaged.into_iter().enumerate() {
            assert_eq!(enemy, ids[index]);
            assert_eq!(amount, 40.0);
        }
        assert_eq!(summary.damage, 120.0);
        assert_eq!(summary.kills, 0);
        assert_eq!(
            arena.get(ids[3]).map(|enemy| enemy.health),
            Some(EnemyKind::Flying.profile().max_health),
            "splash spares flying enemies inside the radius"
        );
    }

    #[test]
    fn chain_hops_three_times_at_reduced_damage() {
        let (mut arena, ids) = arena_at(&[
            (EnemyKind::Boss, Vec2::new(100.0, 100.0)),
            (EnemyKind::Boss, Vec2::new(180.0, 100.0)),
            (EnemyKind::Boss, Vec2::new(260.0, 100.0)),
            (EnemyKind::Boss, Vec2::new(340.0, 100.0)),
            (EnemyKind::Boss, Vec2::new(420.0, 100.0)),
        ]);
        let mut events = Vec::new();
        let _ = resolve_hit(
            Hit {
                tower: TowerId::new(0),
                behavior: TowerKind::Chain.profile().behavior,
                impact: Vec2::new(100.0, 100.0),
                target: ids[0],
                damage: 25.0,
            },
            Duration::ZERO,
            &mut arena,
            &mut events,
        );

        let damaged = damage_by_enemy(&events);
        assert_eq!(
            damaged,
            vec![
                (ids[0], 25.0),
                (ids[1], 25.0 * 0.7),
                (ids[2], 25.0 * 0.7),
                (ids[3], 25.0 * 0.7),
            ]
        );
    }

    #[test]
    fn chain_stops_when_nothing_is_in_hop_range() {
        let (mut arena, ids) = arena_at(&[
            (EnemyKind::Boss, Vec2::new(100.0, 100.0)),
            (EnemyKind::Boss, Vec2::new(150.0, 100.0)),
            (EnemyKind::Boss, Vec2::new(400.0, 100.0)),
        ]);
        let mut events = Vec::new();
        let _ = resolve_hit(
            Hit {
                tower: TowerId::new(0),
                behavior: TowerKind::Chain.profile().behavior,
                impact: Vec2::new(100.0, 100.0),
                target: ids[0],
                damage: 25.0,
            },
            Duration::ZERO,
            &mut arena,
            &mut events,
        );
        assert_eq!(damage_by_enemy(&events).len(), 2);
    }

    #[test]
    fn debuff_hit_slows_the_target() {
        let (mut arena, ids) = arena_at(&[(EnemyKind::Tank, Vec2::ZERO)]);
        let mut events = Vec::new();
        let _ = resolve_hit(
            Hit {
                tower: TowerId::new(4),
                behavior: TowerKind::Debuff.profile().behavior,
                impact: Vec2::ZERO,
                target: ids[0],
                damage: 5.0,
            },
            Duration::from_secs(10),
            &mut arena,
            &mut events,
        );
        let enemy = arena.get(ids[0]).expect("enemy");
        let slow = enemy.slow.expect("slowed");
        assert_eq!(slow.until, Duration::from_secs(13));
        assert_eq!(enemy.speed(), EnemyKind::Tank.profile().speed * 0.5);
        assert_eq!(enemy.health, 145.0);
    }

    #[test]
    fn kills_are_counted_once_per_enemy() {
        let (mut arena, ids) = arena_at(&[(EnemyKind::Fast, Vec2::ZERO)]);
        let mut events = Vec::new();
        let first = resolve_hit(
            Hit {
                tower: TowerId::new(1),
                behavior: TowerBehavior::SingleTarget,
                impact: Vec2::ZERO,
                target: ids[0],
                damage: 50.0,
            },
            Duration::ZERO,
            &mut arena,
            &mut events,
        );
        let second = resolve_hit(
            Hit {
                tower: TowerId::new(1),
                behavior: TowerBehavior::SingleTarget,
                impact: Vec2::ZERO,
                target: ids[0],
                damage: 50.0,
            },
            Duration::ZERO,
            &mut arena,
            &mut events,
        );
        assert_eq!(first.kills, 1);
        assert_eq!(second.kills, 0);
        assert_eq!(
            arena.get(ids[0]).and_then(|enemy| enemy.killed_by),
            Some(TowerId::new(1))
        );
    }

    #[test]
    fn airstrike_reaches_flying_enemies() {
        let (mut arena, _) = arena_at(&[
            (EnemyKind::Flying, Vec2::new(10.0, 0.0)),
            (EnemyKind::Boss, Vec2::new(100.0, 0.0)),
            (EnemyKind::Basic, Vec2::new(300.0, 0.0)),
        ]);
        let mut events = Vec::new();
        assert_eq!(airstrike(&mut arena, Vec2::ZERO, &mut events), 2);
        assert_eq!(damage_by_enemy(&events).len(), 2);
    }
}
