//! Fire-control systems (FixedUpdate, chained).

use bevy::prelude::*;
use bevy_rapier3d::prelude::ReadRapierContext;
use rand::Rng;

use ironsight_protocol::{NetEventKind, TargetAddress};

use crate::combat::hit::{
    resolve_hits, spread_direction, Damageable, HitCandidate, HitboxPart, NoOverlap, OverlapQuery,
    RapierOverlap, ResolvedHit, ShotRequest,
};
use crate::combat::weapon_stats::{BodyPart, WeaponStatProfile};
use crate::combat::{
    MaxAmmoPickup, ReloadIntent, ResetWeaponStats, ShootIntent, SwitchProfileIntent, TriggerLatch, TriggerReleased,
    WeaponFired, WeaponInstance, WeaponReloaded, WielderStats,
};
use crate::config::FireControlConfig;
use crate::net::{address_of, hit_args, NetAddress, NetEventDispatcher};
use crate::DeterministicRng;

/// Всё, что выстрелу нужно знать о мире
pub struct ShotWorld<'a, C, A> {
    pub overlap: &'a dyn OverlapQuery,
    pub mask: u32,
    pub credit_shooter: bool,
    /// collider → damageable owner
    pub classify: C,
    /// entity → сетевой адрес
    pub address: A,
}

/// Один выстрел: state machine + hit resolution + Hit events
///
/// Hit events уходят в dispatcher синхронно, до списания патрона.
/// Для дробовика (`pellets_per_shot > 1`) — по попаданию на каждую дробину,
/// патрон списывается один.
/// `None` — выстрел отклонён (clip пуст / интервал), без side effects кроме
/// отмены перезарядки.
pub fn fire_weapon<C, A>(
    weapon: &mut WeaponInstance,
    request: ShotRequest,
    is_aiming: bool,
    world: &ShotWorld<'_, C, A>,
    rng: &mut impl Rng,
    dispatcher: &mut NetEventDispatcher,
) -> Option<Vec<ResolvedHit>>
where
    C: Fn(Entity) -> Option<HitCandidate>,
    A: Fn(Entity) -> TargetAddress,
{
    let mut hits = Vec::new();

    let fired = weapon.shoot(is_aiming, &mut |profile: &WeaponStatProfile, is_aiming: bool| {
        // Каждая дробина: свой разброс, свой query, свои Hit events
        for _ in 0..profile.pellets_per_shot {
            let direction = spread_direction(request.direction, profile.spread_degrees(is_aiming), &mut *rng);
            let pellet = ShotRequest { direction, ..request };

            let pellet_hits = resolve_hits(world.overlap, world.mask, &pellet, profile, &world.classify);
            for hit in &pellet_hits {
                dispatcher.dispatch(
                    NetEventKind::Hit,
                    (world.address)(hit.target),
                    &hit_args(hit.damage, hit.part, world.credit_shooter),
                );
            }
            hits.extend(pellet_hits);
        }
    });

    fired.then_some(hits)
}

/// System: таймеры перезарядки + recoil spring
pub fn tick_weapons(
    mut weapons: Query<(Entity, &mut WeaponInstance)>,
    time: Res<Time>,
    mut reloaded: EventWriter<WeaponReloaded>,
) {
    let delta = time.delta_secs();

    for (entity, mut weapon) in weapons.iter_mut() {
        let outcome = weapon.tick(delta);
        if outcome.reload_finished {
            reloaded.write(WeaponReloaded {
                shooter: entity,
                clip_ammo: weapon.clip_ammo(),
                magazine_ammo: weapon.magazine_ammo(),
            });
        }
    }
}

/// System: Base ↔ Upgraded
pub fn process_profile_switches(
    mut intents: EventReader<SwitchProfileIntent>,
    mut weapons: Query<&mut WeaponInstance>,
) {
    for intent in intents.read() {
        let Ok(mut weapon) = weapons.get_mut(intent.shooter) else {
            crate::logger::log_warning(
                "Weapon",
                &format!("SwitchProfileIntent: entity {:?} has no weapon", intent.shooter),
            );
            continue;
        };
        weapon.switch_profile(intent.tier);
    }
}

/// System: Max Ammo power-up
pub fn process_max_ammo_pickups(
    mut pickups: EventReader<MaxAmmoPickup>,
    mut weapons: Query<(Entity, &mut WeaponInstance)>,
) {
    for pickup in pickups.read() {
        for (entity, mut weapon) in weapons.iter_mut() {
            if pickup.wielder.is_none_or(|wielder| wielder == entity) {
                weapon.refill_magazine();
            }
        }
    }
}

/// System: сброс ammo/reload/recoil к maxima активного профиля
pub fn process_weapon_resets(
    mut resets: EventReader<ResetWeaponStats>,
    mut weapons: Query<(Entity, &mut WeaponInstance, Option<&mut TriggerLatch>)>,
) {
    for reset in resets.read() {
        for (entity, mut weapon, latch) in weapons.iter_mut() {
            if reset.wielder.is_some_and(|wielder| wielder != entity) {
                continue;
            }
            weapon.reset_ammo();
            if let Some(mut latch) = latch {
                latch.engaged = false;
            }
        }
    }
}

/// System: отпускание trigger (recoil release + снятие latch)
pub fn process_trigger_releases(
    mut releases: EventReader<TriggerReleased>,
    mut weapons: Query<(&mut WeaponInstance, Option<&mut TriggerLatch>)>,
) {
    for release in releases.read() {
        let Ok((mut weapon, latch)) = weapons.get_mut(release.shooter) else {
            continue;
        };
        weapon.release_trigger();
        if let Some(mut latch) = latch {
            latch.engaged = false;
        }
    }
}

/// System: ручная перезарядка
pub fn process_reload_intents(
    mut intents: EventReader<ReloadIntent>,
    mut weapons: Query<&mut WeaponInstance>,
) {
    for intent in intents.read() {
        let Ok(mut weapon) = weapons.get_mut(intent.shooter) else {
            continue;
        };
        if weapon.reload() {
            crate::logger::log(
                "Weapon",
                &format!("{:?} started reload ({:?})", intent.shooter, weapon.state()),
            );
        }
    }
}

/// System: выстрелы
///
/// Origin/direction — `Transform` стрелка (translation + forward).
/// Overlap query через Rapier; без physics context выстрел ни во что не попадает.
#[allow(clippy::too_many_arguments)]
pub fn process_shoot_intents(
    mut intents: EventReader<ShootIntent>,
    mut shooters: Query<(
        &mut WeaponInstance,
        &Transform,
        Option<&mut TriggerLatch>,
        Option<&WielderStats>,
    )>,
    hitboxes: Query<(&HitboxPart, &GlobalTransform)>,
    damageables: Query<&GlobalTransform, With<Damageable>>,
    addresses: Query<&NetAddress>,
    rapier: ReadRapierContext,
    config: Res<FireControlConfig>,
    mut rng: ResMut<DeterministicRng>,
    mut dispatcher: ResMut<NetEventDispatcher>,
    mut fired: EventWriter<WeaponFired>,
) {
    if intents.is_empty() {
        return;
    }

    let context = rapier.single().ok();
    let rapier_overlap = context.as_ref().map(RapierOverlap::new);
    let overlap: &dyn OverlapQuery = match &rapier_overlap {
        Some(overlap) => overlap,
        None => &NoOverlap,
    };

    let world = ShotWorld {
        overlap,
        mask: config.hittable_mask,
        credit_shooter: config.credit_shooter,
        classify: |collider: Entity| classify_collider(collider, &hitboxes, &damageables),
        address: |entity: Entity| address_of(entity, addresses.get(entity).ok()),
    };

    for intent in intents.read() {
        let Ok((mut weapon, transform, latch, stats)) = shooters.get_mut(intent.shooter) else {
            crate::logger::log_warning(
                "Weapon",
                &format!("ShootIntent: shooter {:?} has no weapon/transform", intent.shooter),
            );
            continue;
        };

        if latch
            .as_deref()
            .is_some_and(|latch| !latch.allows(weapon.is_automatic()))
        {
            continue;
        }

        let request = ShotRequest {
            shooter: intent.shooter,
            origin: transform.translation,
            direction: transform.forward().as_vec3(),
            damage_modifier: stats.map_or(1.0, |stats| stats.damage_modifier),
        };

        let Some(hits) = fire_weapon(
            &mut weapon,
            request,
            intent.is_aiming,
            &world,
            &mut rng.rng,
            &mut dispatcher,
        ) else {
            continue;
        };

        if let Some(mut latch) = latch {
            latch.engaged = true;
        }

        fired.write(WeaponFired {
            shooter: intent.shooter,
            tier: weapon.tier(),
            clip_ammo: weapon.clip_ammo(),
            hits,
        });
    }
}

/// System: пустой clip → перезарядка сама (если включено в config)
pub fn auto_reload_empty(
    mut weapons: Query<(Entity, &mut WeaponInstance)>,
    config: Res<FireControlConfig>,
) {
    if !config.auto_reload_on_empty {
        return;
    }

    for (entity, mut weapon) in weapons.iter_mut() {
        if weapon.clip_ammo() == 0 && weapon.magazine_ammo() > 0 && !weapon.is_reloading() {
            weapon.reload();
            crate::logger::log("Weapon", &format!("{:?} auto reload (clip empty)", entity));
        }
    }
}

/// Collider → (owner, часть тела, позиция)
///
/// `HitboxPart` → owner + part; иначе `Damageable` на самом collider → Other.
pub fn classify_collider(
    collider: Entity,
    hitboxes: &Query<(&HitboxPart, &GlobalTransform)>,
    damageables: &Query<&GlobalTransform, With<Damageable>>,
) -> Option<HitCandidate> {
    if let Ok((hitbox, transform)) = hitboxes.get(collider) {
        return Some(HitCandidate {
            owner: hitbox.owner,
            part: hitbox.part,
            position: transform.translation(),
        });
    }

    damageables.get(collider).ok().map(|transform| HitCandidate {
        owner: collider,
        part: BodyPart::Other,
        position: transform.translation(),
    })
}
