//! Fire-control module
//!
//! ECS ответственность:
//! - WeaponInstance: ammo, state machine, recoil (component на носителе)
//! - Hit resolution: overlap box → damageable owners → Hit events в сеть
//! - Events: intents на вход, WeaponFired / WeaponReloaded на выход
//!
//! Внешние collaborators: physics (Rapier overlap query), сеть (NetEventSink),
//! authored профили (WeaponRegistry).

use bevy::prelude::*;

pub mod events;
pub mod hit;
pub mod recoil;
pub mod registry;
pub mod systems;
pub mod weapon;
pub mod weapon_stats;
pub mod wielder;

#[cfg(test)]
mod weapon_tests;

// Re-export основных типов
pub use events::{
    MaxAmmoPickup, ReloadIntent, ResetWeaponStats, ShootIntent, SwitchProfileIntent,
    TriggerReleased, WeaponFired, WeaponReloaded,
};
pub use hit::{Damageable, HitboxPart, OverlapQuery, ResolvedHit};
pub use registry::{RegistryError, WeaponDefinition, WeaponRegistry};
pub use weapon::{FireState, ShotResolver, TickOutcome, WeaponInstance};
pub use weapon_stats::{
    BodyPart, HitMode, ProfileError, ProfileTier, ReloadStyle, WeaponMobility, WeaponProfiles,
    WeaponStatProfile, INSTANT_KILL_DAMAGE,
};
pub use wielder::{TriggerLatch, WielderStats};

use crate::config::FireControlConfig;
use crate::net::{NetEventDispatcher, OutboundNetEvents};
use crate::DeterministicRng;

/// Fire-control Plugin
///
/// Регистрирует события и системы в FixedUpdate.
///
/// Порядок выполнения:
/// 1. tick_weapons — таймеры перезарядки + recoil spring
/// 2. process_profile_switches — Base ↔ Upgraded
/// 3. process_max_ammo_pickups — refill magazine
/// 4. process_weapon_resets — ammo/reload/recoil к стартовым значениям
/// 5. process_trigger_releases — конец очереди, снятие latch
/// 6. process_reload_intents — ручная перезарядка
/// 7. process_shoot_intents — выстрел + hit resolve + Hit dispatch
/// 8. auto_reload_empty — пустой clip → перезарядка
///
/// Если dispatcher не вставлен заранее — подключается in-process
/// `OutboundNetEvents` (он же доступен как Resource для drain).
pub struct FireControlPlugin;

impl Plugin for FireControlPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FireControlConfig>()
            .init_resource::<WeaponRegistry>();

        if !app.world().contains_resource::<NetEventDispatcher>() {
            let outbound = OutboundNetEvents::new();
            app.insert_resource(NetEventDispatcher::new(outbound.clone()))
                .insert_resource(outbound);
        }

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        // Регистрация событий
        app.add_event::<ShootIntent>()
            .add_event::<ReloadIntent>()
            .add_event::<TriggerReleased>()
            .add_event::<SwitchProfileIntent>()
            .add_event::<MaxAmmoPickup>()
            .add_event::<ResetWeaponStats>()
            .add_event::<WeaponFired>()
            .add_event::<WeaponReloaded>();

        app.register_type::<Damageable>()
            .register_type::<HitboxPart>()
            .register_type::<TriggerLatch>()
            .register_type::<WielderStats>();

        app.add_systems(
            FixedUpdate,
            (
                systems::tick_weapons,
                systems::process_profile_switches,
                systems::process_max_ammo_pickups,
                systems::process_weapon_resets,
                systems::process_trigger_releases,
                systems::process_reload_intents,
                systems::process_shoot_intents,
                systems::auto_reload_empty,
            )
                .chain(), // Последовательное выполнение
        );
    }
}
