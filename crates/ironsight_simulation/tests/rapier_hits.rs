//! Hit resolution через настоящий Rapier context
//!
//! Проверяем:
//! - overlap box задевает всех на hittable слоях перед стрелком
//! - стены (Environment) и цели позади не задеты, стрелок не бьёт себя
//! - HitboxPart → owner + часть тела, NetAddress → адрес события

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::*;
use std::time::Duration;

use ironsight_protocol::{unpack, NetEventKind, TargetAddress};
use ironsight_simulation::collision_layers::{
    COLLISION_LAYER_ACTORS, COLLISION_LAYER_ENVIRONMENT, COLLISION_LAYER_HITBOXES,
};
use ironsight_simulation::*;

fn create_physics_app() -> App {
    let mut app = create_headless_app(7);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .add_plugins((
            TransformPlugin,
            RapierPhysicsPlugin::<NoUserData>::default(),
            SimulationPlugin,
        ));
    app.update();
    app
}

fn groups(layer: u32) -> CollisionGroups {
    CollisionGroups::new(Group::from_bits_truncate(layer), Group::ALL)
}

fn shotgun() -> WeaponInstance {
    let profile = WeaponStatProfile::new("Spas-12", 160.0, 80.0)
        .with_range(60.0)
        .with_ammo(8, 32)
        .with_multipliers(2.0, 1.0, 1.0);
    let profiles = WeaponProfiles::new(profile.clone(), profile).unwrap();
    WeaponInstance::new(std::sync::Arc::new(WeaponDefinition::new("spas12", false, profiles)))
}

#[test]
fn test_box_overlap_hits_through_rapier() {
    let mut app = create_physics_app();

    let shooter = app
        .world_mut()
        .spawn((
            shotgun(),
            Transform::default(),
            Collider::ball(0.5),
            groups(COLLISION_LAYER_ACTORS),
            Damageable,
        ))
        .id();

    // Простая цель: collider прямо на entity
    let walker = app
        .world_mut()
        .spawn((
            Transform::from_xyz(1.0, 0.0, -10.0),
            Collider::ball(0.5),
            groups(COLLISION_LAYER_ACTORS),
            Damageable,
        ))
        .id();

    // Replicated цель с отдельным head hitbox
    let brute = app
        .world_mut()
        .spawn((
            Transform::from_xyz(-2.0, 0.0, -20.0),
            NetAddress(TargetAddress::NetId(77)),
        ))
        .id();
    app.world_mut().spawn((
        Transform::from_xyz(-2.0, 1.7, -20.0),
        Collider::ball(0.25),
        groups(COLLISION_LAYER_HITBOXES),
        HitboxPart {
            owner: brute,
            part: BodyPart::Head,
        },
    ));

    // Стена на Environment слое и цель за спиной — мимо
    app.world_mut().spawn((
        Transform::from_xyz(0.0, 0.0, -5.0),
        Collider::cuboid(3.0, 3.0, 0.2),
        groups(COLLISION_LAYER_ENVIRONMENT),
        Damageable,
    ));
    let behind = app
        .world_mut()
        .spawn((
            Transform::from_xyz(0.0, 0.0, 10.0),
            Collider::ball(0.5),
            groups(COLLISION_LAYER_ACTORS),
            Damageable,
        ))
        .id();

    // Colliders попадают в query pipeline после physics step
    for _ in 0..3 {
        app.update();
    }

    app.world_mut().send_event(ShootIntent {
        shooter,
        is_aiming: false,
    });
    for _ in 0..3 {
        app.update();
    }

    assert_eq!(app.world().get::<WeaponInstance>(shooter).unwrap().clip_ammo(), 7);

    let events = app.world().resource::<OutboundNetEvents>().drain();
    assert_eq!(events.len(), 2, "{:?}", events);
    assert!(events.iter().all(|e| e.kind == NetEventKind::Hit));

    let to_walker = events
        .iter()
        .find(|e| e.target == TargetAddress::LocalId(walker.index()))
        .expect("walker hit");
    let args = unpack(to_walker.payload.as_bytes()).unwrap();
    assert_eq!(args.f32(0), Some(160.0));
    assert_eq!(args.u8(1), Some(BodyPart::Other.as_u8()));

    let to_brute = events
        .iter()
        .find(|e| e.target == TargetAddress::NetId(77))
        .expect("brute hit");
    let args = unpack(to_brute.payload.as_bytes()).unwrap();
    assert_eq!(args.f32(0), Some(320.0));
    assert_eq!(args.u8(1), Some(BodyPart::Head.as_u8()));

    assert!(!events
        .iter()
        .any(|e| e.target == TargetAddress::LocalId(behind.index())
            || e.target == TargetAddress::LocalId(shooter.index())));
}
