//! Hit resolution для hit-scan оружия
//!
//! Вместо ray cast — overlap box:
//! - half-extent `range / 2` по всем осям
//! - центр в `origin + direction * range / 2`
//! - повёрнут вдоль forward
//!
//! Box может задеть несколько entity за выстрел (area-effect) — это сохраняется,
//! если профиль не `HitMode::SingleTarget`.
//! Порядок overlaps от physics engine не гарантирован → результат от него не зависит:
//! каждая цель получает урон ровно один раз, список отсортирован по Entity.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;
use std::collections::BTreeMap;

use crate::collision_layers::query_groups;
use crate::combat::weapon_stats::{BodyPart, HitMode, WeaponStatProfile, INSTANT_KILL_DAMAGE};

/// Entity, которая может получать урон (тело без отдельных hitbox'ов → `BodyPart::Other`)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Damageable;

/// Collider части тела, принадлежащий `owner`
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HitboxPart {
    pub owner: Entity,
    pub part: BodyPart,
}

/// Query box одного выстрела
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

/// Геометрия overlap box для выстрела из `origin` вдоль `direction`
pub fn shot_box(origin: Vec3, direction: Vec3, range: f32) -> ShotBox {
    let direction = direction.normalize_or_zero();
    let half = range * 0.5;

    let rotation = if direction == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_arc(Vec3::NEG_Z, direction)
    };

    ShotBox {
        center: origin + direction * half,
        half_extents: Vec3::splat(half),
        rotation,
    }
}

/// Случайное направление внутри конуса `spread_degrees` вокруг `forward`
///
/// Равномерно по телесному углу. `spread_degrees <= 0` → `forward` без изменений.
pub fn spread_direction(forward: Vec3, spread_degrees: f32, rng: &mut impl Rng) -> Vec3 {
    let forward = forward.normalize_or_zero();
    if spread_degrees <= 0.0 || forward == Vec3::ZERO {
        return forward;
    }

    let cos_max = spread_degrees.min(180.0).to_radians().cos();
    let cos_theta: f32 = rng.gen_range(cos_max..=1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi: f32 = rng.gen_range(0.0..std::f32::consts::TAU);

    let (u, v) = forward.any_orthonormal_pair();
    (forward * cos_theta + (u * phi.cos() + v * phi.sin()) * sin_theta).normalize_or_zero()
}

/// Overlap query collaborator (physics engine)
///
/// Возвращает entity всех colliders на слоях `mask`, пересекающих box.
/// Порядок — на усмотрение реализации.
pub trait OverlapQuery {
    fn overlap_box(&self, shot: &ShotBox, mask: u32) -> Vec<Entity>;
}

/// Backend поверх Rapier spatial queries
pub struct RapierOverlap<'a> {
    context: &'a RapierContext<'a>,
}

impl<'a> RapierOverlap<'a> {
    pub fn new(context: &'a RapierContext<'a>) -> Self {
        Self { context }
    }
}

impl OverlapQuery for RapierOverlap<'_> {
    fn overlap_box(&self, shot: &ShotBox, mask: u32) -> Vec<Entity> {
        let shape = Collider::cuboid(shot.half_extents.x, shot.half_extents.y, shot.half_extents.z);
        let filter = QueryFilter::new().groups(query_groups(mask));

        let mut entities = Vec::new();
        self.context
            .intersect_shape(shot.center, shot.rotation, &*shape.raw, filter, |entity| {
                entities.push(entity);
                true // продолжаем: нужны все пересечения
            });
        entities
    }
}

/// Пустой мир (нет physics context) — никто не задет
pub struct NoOverlap;

impl OverlapQuery for NoOverlap {
    fn overlap_box(&self, _shot: &ShotBox, _mask: u32) -> Vec<Entity> {
        Vec::new()
    }
}

/// Collider → damageable entity (+ часть тела и позиция для выбора ближайшей цели)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCandidate {
    pub owner: Entity,
    pub part: BodyPart,
    pub position: Vec3,
}

/// Итог попадания по одной цели
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedHit {
    pub target: Entity,
    pub part: BodyPart,
    pub damage: f32,
    pub distance: f32,
}

/// Параметры одного выстрела
#[derive(Debug, Clone, Copy)]
pub struct ShotRequest {
    pub shooter: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
    /// Множитель урона носителя (power-ups и т.п.), 1.0 = без изменений
    pub damage_modifier: f32,
}

/// Полный цикл: box → overlap query → свёртка в попадания
pub fn resolve_hits(
    query: &(impl OverlapQuery + ?Sized),
    mask: u32,
    request: &ShotRequest,
    profile: &WeaponStatProfile,
    classify: impl Fn(Entity) -> Option<HitCandidate>,
) -> Vec<ResolvedHit> {
    let shot = shot_box(request.origin, request.direction, profile.range);
    let overlaps = query.overlap_box(&shot, mask);
    collapse_overlaps(&overlaps, request, profile, classify)
}

/// Свести сырые overlaps к попаданиям
///
/// - collider без `classify` (стены, мусор) игнорируется
/// - стрелок не попадает сам в себя
/// - несколько частей одного owner → одна запись с максимальным multiplier
/// - `SingleTarget` оставляет только ближайшую к `origin` цель
pub fn collapse_overlaps(
    overlaps: &[Entity],
    request: &ShotRequest,
    profile: &WeaponStatProfile,
    classify: impl Fn(Entity) -> Option<HitCandidate>,
) -> Vec<ResolvedHit> {
    // BTreeMap → итоговый порядок по Entity, не по порядку engine
    let mut per_owner: BTreeMap<Entity, (BodyPart, f32)> = BTreeMap::new();

    for &collider in overlaps {
        let Some(candidate) = classify(collider) else {
            continue;
        };
        if candidate.owner == request.shooter {
            continue;
        }

        let distance = candidate.position.distance(request.origin);
        per_owner
            .entry(candidate.owner)
            .and_modify(|(part, best_distance)| {
                if better_part(profile, candidate.part, *part) {
                    *part = candidate.part;
                }
                *best_distance = best_distance.min(distance);
            })
            .or_insert((candidate.part, distance));
    }

    let mut hits: Vec<ResolvedHit> = per_owner
        .into_iter()
        .map(|(target, (part, distance))| ResolvedHit {
            target,
            part,
            damage: final_damage(profile, part, request.damage_modifier),
            distance,
        })
        .collect();

    if profile.hit_mode == HitMode::SingleTarget {
        // min_by стабилен: при равной дистанции побеждает меньший Entity
        let nearest = hits
            .iter()
            .copied()
            .min_by(|a, b| a.distance.total_cmp(&b.distance));
        hits = nearest.into_iter().collect();
    }

    hits
}

fn better_part(profile: &WeaponStatProfile, candidate: BodyPart, current: BodyPart) -> bool {
    let (a, b) = (profile.multiplier(candidate), profile.multiplier(current));
    a > b || (a == b && candidate.as_u8() < current.as_u8())
}

fn final_damage(profile: &WeaponStatProfile, part: BodyPart, damage_modifier: f32) -> f32 {
    if profile.is_instant_kill() {
        return INSTANT_KILL_DAMAGE;
    }
    profile.damage_for(part) * damage_modifier.max(0.0)
}
