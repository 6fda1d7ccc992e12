use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use glam::Vec2;
use seedpath_core::{
    Command, EnemyId, EnemyKind, Event, TargetingMode, TowerId, TowerKind, TowerTarget,
};
use seedpath_system_tower_targeting::TowerTargeting;
use seedpath_world::{self as world, query, World};

#[test]
fn deterministic_replay_tracks_enemies_along_the_path() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first.assignments.iter().any(|targets| !targets.is_empty()),
        "tower next to the path must acquire a target"
    );
    assert_eq!(first.spawned, 17, "wave one releases seventeen enemies");
}

fn replay() -> ReplayOutcome {
    let mut world = World::new(2_024);
    let mut targeting = TowerTargeting::new();
    let mut targets = Vec::new();
    let mut assignments = Vec::new();
    let mut events = Vec::new();

    let spot = tower_spot(&world);
    let second_spot = spot + offset_away(&world, spot);
    world::apply(&mut world, Command::StartWave, &mut events);
    place(&mut world, TowerKind::Basic, spot, &mut events);
    place(&mut world, TowerKind::Sniper, second_spot, &mut events);
    world::apply(
        &mut world,
        Command::SetTargetingMode {
            tower: TowerId::new(1),
            mode: TargetingMode::First,
        },
        &mut events,
    );

    for step in 0..900_u64 {
        world::apply(
            &mut world,
            Command::Tick {
                now: Duration::from_millis(step * 16),
            },
            &mut events,
        );
        if step % 30 == 0 {
            world::apply(
                &mut world,
                Command::SpawnEnemy {
                    kind: EnemyKind::Basic,
                },
                &mut events,
            );
        }
        world::apply(&mut world, Command::AdvanceEnemies, &mut events);

        targeting.handle(
            &query::tower_view(&world),
            &query::enemy_view(&world),
            &mut targets,
        );
        assignments.push(TargetSnapshot::from(&targets));
        world::apply(
            &mut world,
            Command::AssignTargets {
                targets: targets.clone(),
            },
            &mut events,
        );
    }

    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count();
    ReplayOutcome {
        spawned,
        assignments,
    }
}

fn place(world: &mut World, kind: TowerKind, position: Vec2, events: &mut Vec<Event>) {
    let mut generated = Vec::new();
    world::apply(world, Command::PlaceTower { kind, position }, &mut generated);
    assert!(
        matches!(generated.as_slice(), [Event::TowerPlaced { .. }]),
        "placement failed: {generated:?}"
    );
    events.extend(generated);
}

/// A buildable point roughly eighty units beside the early path.
fn tower_spot(world: &World) -> Vec2 {
    let path = query::path(world);
    let anchor = path.position_at(0.08);
    [
        Vec2::new(0.0, 80.0),
        Vec2::new(0.0, -80.0),
        Vec2::new(80.0, 0.0),
        Vec2::new(-80.0, 0.0),
    ]
    .into_iter()
    .map(|offset| anchor + offset)
    .find(|point| path.distance_to(*point) > 55.0)
    .expect("buildable spot beside the path")
}

/// Offset that keeps a second tower off the path and away from the first.
fn offset_away(world: &World, spot: Vec2) -> Vec2 {
    let path = query::path(world);
    [
        Vec2::new(70.0, 0.0),
        Vec2::new(-70.0, 0.0),
        Vec2::new(0.0, 70.0),
        Vec2::new(0.0, -70.0),
    ]
    .into_iter()
    .find(|offset| path.distance_to(spot + *offset) > 55.0)
    .expect("second buildable spot")
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TargetSnapshot(Vec<(TowerId, EnemyId)>);

impl TargetSnapshot {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&Vec<TowerTarget>> for TargetSnapshot {
    fn from(targets: &Vec<TowerTarget>) -> Self {
        Self(
            targets
                .iter()
                .map(|target| (target.tower, target.enemy))
                .collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    spawned: usize,
    assignments: Vec<TargetSnapshot>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
