//! IRONSIGHT Simulation Core
//!
//! Fire-control на Bevy 0.16 ECS:
//! - combat: профили, WeaponInstance state machine, recoil, hit resolution
//! - net: упаковка и отправка net events (wire format — ironsight_protocol)
//! - config: FireControlConfig
//!
//! Physics (Rapier) и transport — внешние collaborators.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod collision_layers;
pub mod combat;
pub mod config;
pub mod logger;
pub mod net;

// Re-export для удобства
pub use combat::{
    BodyPart, Damageable, FireControlPlugin, FireState, HitboxPart, MaxAmmoPickup, ProfileTier,
    ReloadIntent, ResetWeaponStats, ShootIntent, SwitchProfileIntent, TriggerLatch, TriggerReleased, WeaponDefinition,
    WeaponFired, WeaponInstance, WeaponProfiles, WeaponRegistry, WeaponReloaded, WeaponStatProfile,
    WielderStats,
};
pub use config::{ConfigError, FireControlConfig};
pub use logger::init_logger;
pub use net::{NetAddress, NetEventDispatcher, NetEventSink, OutboundNetEvents};

/// Главный plugin симуляции
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_plugins(FireControlPlugin);
    }
}

/// Детерминистичный RNG resource (seeded) — spread выстрелов
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}
