//! Headless симуляция IRONSIGHT
//!
//! Запускает fire-control без рендера и physics: автомат стреляет очередями,
//! перезаряжается, в конце печатаем статистику тиков и исходящих net events.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use ironsight_simulation::{
    create_headless_app, OutboundNetEvents, ReloadIntent, ShootIntent, SimulationPlugin,
    TriggerLatch, TriggerReleased, WeaponInstance, WeaponRegistry,
};

const DEMO_WEAPONS: &str = r#"[{
    "id": "carbine",
    "is_automatic": true,
    "base": {
        "name": "Carbine", "damage": 45.0, "range": 70.0,
        "max_clip_ammo": 30, "max_magazine_ammo": 120,
        "fire_rate": 600.0, "reload_time": 2.0, "empty_reload_time_addon": 0.5,
        "recoil": [-1.5, 0.5, 0.0], "aim_recoil": [-0.8, 0.25, 0.0],
        "snappiness": 6.0, "return_speed": 2.0,
        "hip_spread_degrees": 1.5, "aim_spread_degrees": 0.025
    },
    "upgraded": {
        "name": "Carbine Mk2", "damage": 110.0, "range": 70.0,
        "max_clip_ammo": 40, "max_magazine_ammo": 200,
        "fire_rate": 700.0, "reload_time": 1.6
    }
}]"#;

fn main() {
    let seed = 42;
    println!("Starting IRONSIGHT headless simulation (seed: {})", seed);

    let registry = match WeaponRegistry::from_json(DEMO_WEAPONS) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("Failed to load weapons: {}", err);
            return;
        }
    };
    let Some(carbine) = registry.create_instance("carbine") else {
        eprintln!("Weapon 'carbine' not registered");
        return;
    };

    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .add_plugins(SimulationPlugin)
        .insert_resource(registry);

    let shooter = app
        .world_mut()
        .spawn((carbine, Transform::default(), TriggerLatch::default()))
        .id();

    // Очередь 0.5s → отпускаем → reload → снова очередь
    for tick in 0..600 {
        match tick % 200 {
            0..30 => {
                app.world_mut().send_event(ShootIntent {
                    shooter,
                    is_aiming: tick >= 400,
                });
            }
            30 => {
                app.world_mut().send_event(TriggerReleased { shooter });
            }
            60 => {
                app.world_mut().send_event(ReloadIntent { shooter });
            }
            _ => {}
        }

        app.update();

        if tick % 100 == 0 {
            if let Some(weapon) = app.world().get::<WeaponInstance>(shooter) {
                println!(
                    "Tick {}: {:?} clip {} / magazine {}, recoil {:.3}",
                    tick,
                    weapon.state(),
                    weapon.clip_ammo(),
                    weapon.magazine_ammo(),
                    weapon.current_recoil_offset().length()
                );
            }
        }
    }

    let outbound = app.world().resource::<OutboundNetEvents>().drain();
    println!("Outbound net events: {}", outbound.len());
    for envelope in outbound.iter().take(10) {
        println!("  {:?} → {:?} ({} bytes)", envelope.kind, envelope.target, envelope.payload.as_bytes().len());
    }

    println!("Simulation complete!");
}
