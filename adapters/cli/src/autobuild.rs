//! Deterministic tower placement used by the headless runner.

use std::collections::VecDeque;

use glam::Vec2;
use seedpath_core::{PlacementError, TowerKind};
use seedpath_simulation::Simulation;
use seedpath_world::query;

/// Order in which towers are bought; repeats once exhausted.
const BUILD_PLAN: [TowerKind; 8] = [
    TowerKind::Basic,
    TowerKind::Rapid,
    TowerKind::Basic,
    TowerKind::Sniper,
    TowerKind::Cannon,
    TowerKind::Debuff,
    TowerKind::Chain,
    TowerKind::Support,
];
const SPOT_SAMPLES: u16 = 32;
const SPOT_OFFSET: f32 = 75.0;

/// Builds towers on candidate spots alongside the path, front to back.
#[derive(Debug)]
pub(crate) struct AutoBuilder {
    spots: VecDeque<Vec2>,
    next_kind: usize,
}

impl AutoBuilder {
    /// Samples candidate spots on both sides of the current path.
    pub(crate) fn new(simulation: &Simulation) -> Self {
        let path = query::path(simulation.world());
        let (width, height) = (path.width(), path.height());
        let mut spots = VecDeque::new();
        for sample in 1..SPOT_SAMPLES {
            let progress = f32::from(sample) / f32::from(SPOT_SAMPLES);
            let anchor = path.position_at(progress);
            let heading = path.heading_at(progress).unwrap_or(0.0);
            let normal = Vec2::new(-heading.sin(), heading.cos());
            for side in [1.0, -1.0] {
                let spot = anchor + normal * side * SPOT_OFFSET;
                if (0.0..=width).contains(&spot.x) && (0.0..=height).contains(&spot.y) {
                    spots.push_back(spot);
                }
            }
        }
        Self {
            spots,
            next_kind: 0,
        }
    }

    /// Spends the available currency and returns the number of towers built.
    ///
    /// Towers are bought in plan order while affordable; the cheapest pending
    /// upgrade is bought with whatever remains.
    pub(crate) fn spend(&mut self, simulation: &mut Simulation) -> u32 {
        let mut built = 0;
        loop {
            let kind = BUILD_PLAN[self.next_kind % BUILD_PLAN.len()];
            if simulation.currency() < kind.profile().cost || !self.place(simulation, kind) {
                break;
            }
            self.next_kind += 1;
            built += 1;
        }

        let cheapest = simulation
            .towers()
            .iter()
            .filter_map(|tower| simulation.tower_stats(tower.id).map(|stats| (tower.id, stats)))
            .filter(|(_, stats)| stats.upgrade_cost <= simulation.currency())
            .min_by_key(|(_, stats)| stats.upgrade_cost);
        if let Some((tower, _)) = cheapest {
            if let Ok(level) = simulation.upgrade_tower(tower) {
                tracing::debug!(?tower, level, "auto-builder upgraded tower");
            }
        }
        built
    }

    fn place(&mut self, simulation: &mut Simulation, kind: TowerKind) -> bool {
        while let Some(spot) = self.spots.front().copied() {
            match simulation.place_tower(kind, spot) {
                Ok(_) => {
                    let _ = self.spots.pop_front();
                    return true;
                }
                Err(PlacementError::InsufficientFunds) => return false,
                Err(PlacementError::OnPath | PlacementError::TooCloseToTower) => {
                    let _ = self.spots.pop_front();
                }
            }
        }
        false
    }
}
