#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick pipeline that drives the world with the pure systems.
//!
//! [`Simulation`] owns the authoritative [`World`] together with every system
//! and runs them in a fixed order each tick. Player actions are routed through
//! the same command surface and their rejections are turned back into
//! `Result`s.

mod config;

use std::time::Duration;

use glam::Vec2;
use seedpath_core::{
    clock_seed, AbilityError, AbilityKind, AirstrikeError, Command, Difficulty, DifficultyError,
    EnemyView, Event, PlacementError, ResearchModifiers, SellError, SimulationEffects,
    TargetingError, TargetingMode, TowerId, TowerKind, TowerStats, TowerTarget, TowerView,
    UpgradeError, WaveError, WaveStatus,
};
use seedpath_system_spawning::Spawning;
use seedpath_system_support_aura::SupportAura;
use seedpath_system_tower_combat::TowerCombat;
use seedpath_system_tower_targeting::TowerTargeting;
use seedpath_world::{self as world, query, World};

pub use config::{ConfigError, SimulationConfig};

/// Slowest fast-forward setting.
pub const MIN_GAME_SPEED: u32 = 1;
/// Fastest fast-forward setting.
pub const MAX_GAME_SPEED: u32 = 5;
/// Fast-forward setting of a new simulation.
pub const DEFAULT_GAME_SPEED: u32 = 3;

/// World plus systems, advanced together one tick batch at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    spawning: Spawning,
    support_aura: SupportAura,
    targeting: TowerTargeting,
    combat: TowerCombat,
    game_speed: u32,
    pending: Vec<Event>,
    journal: Vec<Event>,
    commands: Vec<Command>,
    targets: Vec<TowerTarget>,
}

impl Simulation {
    /// Creates a simulation on the default canvas for the provided seed.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self {
            world: World::new(seed),
            spawning: Spawning::new(),
            support_aura: SupportAura::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            game_speed: DEFAULT_GAME_SPEED,
            pending: Vec::new(),
            journal: Vec::new(),
            commands: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Creates a simulation configured from `config`.
    ///
    /// A missing seed falls back to [`clock_seed`], the only source of
    /// non-determinism in the pipeline.
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        let seed = config.seed.unwrap_or_else(clock_seed);
        let mut simulation = Self::new(seed);
        simulation.configure_canvas(config.canvas_width, config.canvas_height);
        simulation.configure_research(config.research);
        simulation.set_dynamic_difficulty(config.dynamic_difficulty);
        if config.difficulty != query::difficulty(&simulation.world) {
            // A fresh world has not started a wave, so the change is accepted.
            let _ = simulation.set_difficulty(config.difficulty);
        }
        let _ = simulation.set_game_speed(config.game_speed);
        tracing::debug!(seed, ?config, "simulation configured");
        simulation
    }

    /// Read-only access to the world for [`seedpath_world::query`] calls.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Runs `game_speed` tick bodies against the caller supplied time.
    pub fn tick(&mut self, now: Duration) {
        let span = tracing::trace_span!(
            "tick",
            now_ms = u64::try_from(now.as_millis()).unwrap_or(u64::MAX),
            speed = self.game_speed
        );
        let _entered = span.enter();

        for _ in 0..self.game_speed {
            self.step(now);
        }
    }

    fn step(&mut self, now: Duration) {
        self.execute(Command::Tick { now });

        self.spawning.handle(&self.pending, &mut self.commands);
        self.pending.clear();
        self.flush_commands();

        self.execute(Command::AdvanceEnemies);

        let towers = query::tower_view(&self.world);
        self.support_aura.handle(&towers, &mut self.commands);
        self.flush_commands();

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting.handle(&towers, &enemies, &mut self.targets);
        self.execute(Command::AssignTargets {
            targets: self.targets.clone(),
        });

        self.combat.handle(
            query::now(&self.world),
            &query::effects(&self.world),
            &query::tower_cooldowns(&self.world),
            &self.targets,
            &mut self.commands,
        );
        self.flush_commands();

        self.execute(Command::ResolveProjectiles);
        self.execute(Command::ResolveCasualties);
    }

    fn flush_commands(&mut self) {
        let commands = std::mem::take(&mut self.commands);
        for command in commands {
            self.execute(command);
        }
    }

    /// Applies a command, journals the answer and queues it for the spawner.
    fn execute(&mut self, command: Command) {
        let start = self.journal.len();
        world::apply(&mut self.world, command, &mut self.journal);
        for event in &self.journal[start..] {
            log_event(event);
        }
        self.pending.extend_from_slice(&self.journal[start..]);
    }

    /// Applies a player command and converts the world's answer into a result.
    fn request<T, E>(
        &mut self,
        command: Command,
        unanswered: E,
        answer: impl Fn(&Event) -> Option<Result<T, E>>,
    ) -> Result<T, E> {
        let start = self.journal.len();
        self.execute(command);
        self.journal[start..]
            .iter()
            .find_map(answer)
            .unwrap_or(Err(unanswered))
    }

    /// Removes and returns every event produced since the previous drain.
    ///
    /// Events accumulate until drained, so long running callers should drain
    /// once per tick.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.journal)
    }

    /// Current fast-forward setting.
    #[must_use]
    pub fn game_speed(&self) -> u32 {
        self.game_speed
    }

    /// Sets the fast-forward multiplier, clamped to the supported range.
    pub fn set_game_speed(&mut self, speed: u32) -> u32 {
        self.game_speed = speed.clamp(MIN_GAME_SPEED, MAX_GAME_SPEED);
        self.game_speed
    }

    /// Steps through the fast-forward settings 3, 4 and 5.
    pub fn cycle_game_speed(&mut self) -> u32 {
        self.game_speed = match self.game_speed {
            speed @ DEFAULT_GAME_SPEED..=4 => speed + 1,
            _ => DEFAULT_GAME_SPEED,
        };
        self.game_speed
    }

    /// Builds a tower centred on `position`.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
    ) -> Result<TowerId, PlacementError> {
        let placed = self.request(
            Command::PlaceTower { kind, position },
            PlacementError::OnPath,
            |event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
        );
        if let Ok(tower) = placed {
            tracing::debug!(?tower, ?kind, x = position.x, y = position.y, "tower placed");
        }
        placed
    }

    /// Upgrades a tower and returns its new level.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<u32, UpgradeError> {
        self.request(
            Command::UpgradeTower { tower },
            UpgradeError::MissingTower,
            |event| match event {
                Event::TowerUpgraded { level, .. } => Some(Ok(*level)),
                Event::TowerUpgradeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
        )
    }

    /// Sells a tower and returns the refund.
    pub fn sell_tower(&mut self, tower: TowerId) -> Result<u32, SellError> {
        self.request(
            Command::SellTower { tower },
            SellError::MissingTower,
            |event| match event {
                Event::TowerSold { refund, .. } => Some(Ok(*refund)),
                Event::TowerSaleRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
        )
    }

    /// Changes the targeting rule of a tower.
    pub fn set_targeting_mode(
        &mut self,
        tower: TowerId,
        mode: TargetingMode,
    ) -> Result<(), TargetingError> {
        self.request(
            Command::SetTargetingMode { tower, mode },
            TargetingError::MissingTower,
            |event| match event {
                Event::TargetingModeChanged { .. } => Some(Ok(())),
                Event::TargetingModeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
        )
    }

    /// Advances a tower to the next targeting rule and returns it.
    pub fn cycle_targeting_mode(&mut self, tower: TowerId) -> Result<TargetingMode, TargetingError> {
        let current = query::tower_stats(&self.world, tower)
            .ok_or(TargetingError::MissingTower)?
            .targeting_mode;
        let next = current.next();
        self.set_targeting_mode(tower, next)?;
        Ok(next)
    }

    /// Starts the next wave and returns its number.
    pub fn start_wave(&mut self) -> Result<u32, WaveError> {
        self.request(Command::StartWave, WaveError::InProgress, |event| match event {
            Event::WaveStarted { wave, .. } => Some(Ok(*wave)),
            Event::WaveStartRejected { reason } => Some(Err(*reason)),
            _ => None,
        })
    }

    /// Activates an ability and returns the time its effect ends.
    pub fn activate_ability(&mut self, kind: AbilityKind) -> Result<Duration, AbilityError> {
        let activated = self.request(
            Command::ActivateAbility { kind },
            AbilityError::AlreadyActive,
            |event| match event {
                Event::AbilityActivated { until, .. } => Some(Ok(*until)),
                Event::AbilityRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
        );
        if let Ok(until) = activated {
            tracing::info!(?kind, ?until, "ability activated");
        }
        activated
    }

    /// Detonates an armed airstrike and returns the number of enemies hit.
    pub fn execute_airstrike(&mut self, position: Vec2) -> Result<u32, AirstrikeError> {
        self.request(
            Command::ExecuteAirstrike { position },
            AirstrikeError::NotArmed,
            |event| match event {
                Event::AirstrikeExecuted { hits, .. } => Some(Ok(*hits)),
                Event::AirstrikeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
        )
    }

    /// Selects a difficulty and returns the reset currency.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<u32, DifficultyError> {
        self.request(
            Command::SetDifficulty { difficulty },
            DifficultyError::Locked,
            |event| match event {
                Event::DifficultyChanged { currency, .. } => Some(Ok(*currency)),
                Event::DifficultyChangeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
        )
    }

    /// Enables or disables performance based difficulty adjustment.
    pub fn set_dynamic_difficulty(&mut self, enabled: bool) {
        self.execute(Command::SetDynamicDifficulty { enabled });
    }

    /// Installs research multipliers for subsequently built towers.
    pub fn configure_research(&mut self, modifiers: ResearchModifiers) {
        self.execute(Command::ConfigureResearch { modifiers });
    }

    /// Resizes the canvas, regenerating the path with the current seed.
    pub fn configure_canvas(&mut self, width: f32, height: f32) {
        self.execute(Command::ConfigureCanvas { width, height });
    }

    /// Replaces the map with one generated from `seed`.
    pub fn regenerate_map(&mut self, seed: u32) {
        self.execute(Command::RegenerateMap { seed });
    }

    /// Resets the game on the current map.
    pub fn restart(&mut self) {
        self.execute(Command::Restart);
    }

    /// Seed of the current map.
    #[must_use]
    pub fn seed(&self) -> u32 {
        query::seed(&self.world)
    }

    /// Snapshot of every live enemy.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Snapshot of every tower.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Statistics of a single tower.
    #[must_use]
    pub fn tower_stats(&self, tower: TowerId) -> Option<TowerStats> {
        query::tower_stats(&self.world, tower)
    }

    /// Currency available to the player.
    #[must_use]
    pub fn currency(&self) -> u32 {
        query::currency(&self.world)
    }

    /// Remaining base health.
    #[must_use]
    pub fn base_health(&self) -> u32 {
        query::base_health(&self.world)
    }

    /// Enemies killed since the last restart.
    #[must_use]
    pub fn kills(&self) -> u32 {
        query::kills(&self.world)
    }

    /// Progress of the current wave.
    #[must_use]
    pub fn wave_status(&self) -> WaveStatus {
        query::wave_status(&self.world)
    }

    /// Global multipliers installed by active abilities.
    #[must_use]
    pub fn effects(&self) -> SimulationEffects {
        query::effects(&self.world)
    }

    /// Whether the base has fallen.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        query::is_game_over(&self.world)
    }
}

fn log_event(event: &Event) {
    match event {
        Event::WaveCompleted {
            wave,
            leaks,
            bonus,
            ..
        } => tracing::debug!(wave, leaks, bonus, "wave bonus paid"),
        Event::EnemyLeaked {
            kind,
            base_health,
            blocked,
            ..
        } => tracing::debug!(?kind, base_health, blocked, "enemy leaked"),
        Event::MapGenerated {
            seed,
            width,
            height,
            waypoints,
        } => tracing::info!(seed, width, height, waypoints, "map generated"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_spot(simulation: &Simulation) -> Vec2 {
        let path = query::path(simulation.world());
        (0..40)
            .flat_map(|column| (0..20).map(move |row| (column, row)))
            .map(|(column, row)| Vec2::new(20.0 + column as f32 * 30.0, 20.0 + row as f32 * 30.0))
            .find(|point| path.distance_to(*point) > 150.0)
            .expect("open spot away from the path")
    }

    #[test]
    fn game_speed_is_clamped() {
        let mut simulation = Simulation::new(1);
        assert_eq!(simulation.game_speed(), 3);
        assert_eq!(simulation.set_game_speed(0), 1);
        assert_eq!(simulation.set_game_speed(9), 5);
        assert_eq!(simulation.set_game_speed(2), 2);
    }

    #[test]
    fn fast_forward_cycles_three_four_five() {
        let mut simulation = Simulation::new(1);
        assert_eq!(simulation.cycle_game_speed(), 4);
        assert_eq!(simulation.cycle_game_speed(), 5);
        assert_eq!(simulation.cycle_game_speed(), 3);

        let _ = simulation.set_game_speed(1);
        assert_eq!(simulation.cycle_game_speed(), 3);
    }

    #[test]
    fn placement_results_carry_the_rejection_reason() {
        let mut simulation = Simulation::new(12_345);
        let on_path = query::path(simulation.world()).position_at(0.5);
        assert_eq!(
            simulation.place_tower(TowerKind::Basic, on_path),
            Err(PlacementError::OnPath)
        );

        let spot = open_spot(&simulation);
        let tower = simulation
            .place_tower(TowerKind::Basic, spot)
            .expect("open spot accepts a tower");
        assert_eq!(simulation.currency(), 450);
        assert_eq!(
            simulation.place_tower(TowerKind::Basic, spot + Vec2::new(10.0, 0.0)),
            Err(PlacementError::TooCloseToTower)
        );

        assert_eq!(simulation.upgrade_tower(tower), Ok(2));
        assert_eq!(simulation.sell_tower(tower), Ok(56));
        assert_eq!(simulation.sell_tower(tower), Err(SellError::MissingTower));
        assert_eq!(
            simulation.upgrade_tower(tower),
            Err(UpgradeError::MissingTower)
        );
    }

    #[test]
    fn targeting_mode_cycles_through_every_rule() {
        let mut simulation = Simulation::new(12_345);
        let spot = open_spot(&simulation);
        let tower = simulation
            .place_tower(TowerKind::Sniper, spot)
            .expect("tower placed");

        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(simulation.cycle_targeting_mode(tower).expect("tower exists"));
        }
        assert_eq!(
            seen,
            vec![
                TargetingMode::Farthest,
                TargetingMode::Strongest,
                TargetingMode::Weakest,
                TargetingMode::First,
                TargetingMode::Closest,
            ]
        );
        assert_eq!(
            simulation.cycle_targeting_mode(TowerId::new(99)),
            Err(TargetingError::MissingTower)
        );
    }

    #[test]
    fn waves_cannot_overlap() {
        let mut simulation = Simulation::new(7);
        assert_eq!(simulation.start_wave(), Ok(1));
        assert_eq!(simulation.start_wave(), Err(WaveError::InProgress));
        assert_eq!(
            simulation.set_difficulty(Difficulty::Hard),
            Err(DifficultyError::Locked)
        );
    }

    #[test]
    fn first_tick_after_wave_start_spawns_one_enemy() {
        let mut simulation = Simulation::new(7);
        let _ = simulation.set_game_speed(1);
        let _ = simulation.start_wave().expect("first wave starts");
        simulation.tick(Duration::from_millis(16));
        assert_eq!(simulation.enemies().len(), 1);

        simulation.tick(Duration::from_millis(32));
        assert_eq!(simulation.enemies().len(), 1, "spawn interval not elapsed");

        simulation.tick(Duration::from_millis(516));
        assert_eq!(simulation.enemies().len(), 2);
    }

    #[test]
    fn fast_forward_moves_enemies_further_per_call() {
        let progress_after = |speed: u32| {
            let mut simulation = Simulation::new(7);
            let _ = simulation.set_game_speed(speed);
            let _ = simulation.start_wave().expect("first wave starts");
            for frame in 1..=10_u64 {
                simulation.tick(Duration::from_millis(frame * 16));
            }
            simulation
                .enemies()
                .iter()
                .next()
                .map(|enemy| enemy.progress)
                .expect("an enemy spawned")
        };

        assert!(progress_after(5) > progress_after(1));
    }

    #[test]
    fn abilities_report_their_end_time() {
        let mut simulation = Simulation::new(7);
        simulation.tick(Duration::from_secs(1));
        assert_eq!(
            simulation.activate_ability(AbilityKind::SpeedBoost),
            Ok(Duration::from_secs(11))
        );
        assert_eq!(simulation.effects().fire_rate_multiplier, 2.0);
        assert_eq!(
            simulation.activate_ability(AbilityKind::SpeedBoost),
            Err(AbilityError::AlreadyActive)
        );
        assert_eq!(
            simulation.execute_airstrike(Vec2::new(100.0, 100.0)),
            Err(AirstrikeError::NotArmed)
        );
    }

    #[test]
    fn configuration_is_applied_on_construction() {
        let config = SimulationConfig {
            seed: Some(99),
            canvas_width: 900.0,
            difficulty: Difficulty::Hard,
            dynamic_difficulty: false,
            game_speed: 8,
            ..SimulationConfig::default()
        };
        let simulation = Simulation::from_config(&config);

        assert_eq!(simulation.seed(), 99);
        assert_eq!(simulation.currency(), 350);
        assert_eq!(simulation.game_speed(), 5);
        assert_eq!(query::path(simulation.world()).width(), 900.0);
        assert!(!query::dynamic_difficulty(simulation.world()));
    }

    #[test]
    fn drained_events_start_over() {
        let mut simulation = Simulation::new(3);
        let _ = simulation.start_wave().expect("first wave starts");
        let events = simulation.drain_events();
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::WaveStarted { wave: 1, .. })));
        assert!(simulation.drain_events().is_empty());
    }
}
