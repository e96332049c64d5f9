//! Fire-control events
//!
//! Intents (вход от input/AI) → systems → outcome events (для UI, audio, VFX).

use bevy::prelude::*;

use crate::combat::hit::ResolvedHit;
use crate::combat::weapon_stats::ProfileTier;

/// Нажатие/удержание trigger
#[derive(Event, Debug, Clone, Copy)]
pub struct ShootIntent {
    pub shooter: Entity,
    pub is_aiming: bool,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ReloadIntent {
    pub shooter: Entity,
}

/// Trigger отпущен (конец очереди, снятие semi-auto latch)
#[derive(Event, Debug, Clone, Copy)]
pub struct TriggerReleased {
    pub shooter: Entity,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SwitchProfileIntent {
    pub shooter: Entity,
    pub tier: ProfileTier,
}

/// Max Ammo power-up: `None` — всем носителям оружия
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct MaxAmmoPickup {
    pub wielder: Option<Entity>,
}

/// Сброс оружия к стартовому состоянию (новая игра, respawn): `None` — всем
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ResetWeaponStats {
    pub wielder: Option<Entity>,
}

/// Выстрел состоялся
#[derive(Event, Debug, Clone)]
pub struct WeaponFired {
    pub shooter: Entity,
    pub tier: ProfileTier,
    pub clip_ammo: u32,
    pub hits: Vec<ResolvedHit>,
}

/// Перезарядка завершена
#[derive(Event, Debug, Clone, Copy)]
pub struct WeaponReloaded {
    pub shooter: Entity,
    pub clip_ammo: u32,
    pub magazine_ammo: u32,
}
