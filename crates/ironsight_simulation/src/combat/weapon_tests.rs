//! Tests for WeaponInstance state machine.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use std::sync::Arc;

    use crate::combat::registry::WeaponDefinition;
    use crate::combat::weapon::*;
    use crate::combat::weapon_stats::*;

    fn no_hits() -> impl FnMut(&WeaponStatProfile, bool) {
        |_, _| {}
    }

    fn rifle_profiles(upgraded_clip: u32) -> WeaponProfiles {
        let base = WeaponStatProfile::new("Rifle", 40.0, 750.0)
            .with_ammo(35, 140)
            .with_reload(2.0, 0.5)
            .with_recoil(Vec3::new(-2.0, 0.5, 0.0), Vec3::new(-1.0, 0.2, 0.0), 6.0, 2.0);
        let upgraded = WeaponStatProfile::new("Rifle+", 90.0, 750.0)
            .with_ammo(upgraded_clip, 140)
            .with_reload(1.5, 0.5)
            .with_recoil(Vec3::new(-1.0, 0.2, 0.0), Vec3::new(-0.5, 0.1, 0.0), 6.0, 2.0);
        WeaponProfiles::new(base, upgraded).unwrap()
    }

    fn rifle() -> WeaponInstance {
        WeaponInstance::new(Arc::new(WeaponDefinition::new("rifle", true, rifle_profiles(35))))
    }

    #[test]
    fn test_initial_state() {
        let weapon = rifle();
        assert_eq!(weapon.state(), FireState::Ready);
        assert_eq!(weapon.tier(), ProfileTier::Base);
        assert_eq!(weapon.clip_ammo(), 35);
        assert_eq!(weapon.magazine_ammo(), 140);
        assert_eq!(weapon.current_recoil_offset(), Vec3::ZERO);
        assert!(weapon.last_shot_time().is_none());
    }

    #[test]
    fn test_shoot_twice_within_interval() {
        let mut weapon = rifle();
        let mut resolver = no_hits();

        assert!(weapon.shoot(false, &mut resolver));
        weapon.tick(0.05); // < 0.08s
        assert!(!weapon.shoot(false, &mut resolver));
        assert_eq!(weapon.clip_ammo(), 34);

        weapon.tick(0.03);
        assert!(weapon.shoot(false, &mut resolver));
        assert_eq!(weapon.clip_ammo(), 33);
    }

    #[test]
    fn test_rejected_shot_has_no_side_effects() {
        let mut weapon = rifle();
        let mut calls = 0;

        assert!(weapon.shoot(false, &mut |_: &WeaponStatProfile, _: bool| calls += 1));
        let recoil = weapon.current_recoil_offset();
        let last_shot = weapon.last_shot_time();

        assert!(!weapon.shoot(false, &mut |_: &WeaponStatProfile, _: bool| calls += 1));
        assert_eq!(calls, 1);
        assert_eq!(weapon.current_recoil_offset(), recoil);
        assert_eq!(weapon.last_shot_time(), last_shot);
        assert_eq!(weapon.state(), FireState::Ready);
    }

    #[test]
    fn test_shoot_with_empty_clip() {
        let mut weapon = rifle().with_ammo(0, 10);
        assert!(!weapon.shoot(false, &mut no_hits()));
        assert_eq!(weapon.clip_ammo(), 0);
    }

    #[test]
    fn test_resolver_sees_active_profile() {
        let mut weapon = rifle();
        weapon.switch_profile(ProfileTier::Upgraded);

        let mut seen = Vec::new();
        weapon.shoot(true, &mut |p: &WeaponStatProfile, aiming: bool| {
            seen.push((p.name.clone(), aiming))
        });
        assert_eq!(seen, vec![("Rifle+".to_string(), true)]);
    }

    #[test]
    fn test_reload_transfers_missing_rounds() {
        let mut weapon = rifle().with_ammo(20, 140);

        assert!(weapon.reload());
        assert_eq!(weapon.state(), FireState::Reloading);
        assert_eq!(weapon.reload_start_time(), Some(0.0));

        let outcome = weapon.tick(1.0);
        assert!(!outcome.reload_finished);
        assert_eq!(weapon.clip_ammo(), 20);

        let outcome = weapon.tick(1.0);
        assert!(outcome.reload_finished);
        assert_eq!(outcome.rounds_loaded, 15);
        assert_eq!(weapon.clip_ammo(), 35);
        assert_eq!(weapon.magazine_ammo(), 125);
        assert_eq!(weapon.state(), FireState::Ready);
    }

    #[test]
    fn test_reload_limited_by_magazine() {
        let mut weapon = rifle().with_ammo(30, 3);

        assert!(weapon.reload());
        weapon.tick(2.0);
        assert_eq!(weapon.clip_ammo(), 33);
        assert_eq!(weapon.magazine_ammo(), 0);
    }

    #[test]
    fn test_reload_rejections() {
        // Полный clip
        let mut weapon = rifle();
        assert!(!weapon.reload());

        // Пустой magazine
        let mut weapon = rifle().with_ammo(10, 0);
        assert!(!weapon.reload());

        // Уже перезаряжаемся
        let mut weapon = rifle().with_ammo(10, 10);
        assert!(weapon.reload());
        assert!(!weapon.reload());
    }

    #[test]
    fn test_empty_reload_takes_longer() {
        let mut weapon = rifle().with_ammo(0, 140);

        assert!(weapon.reload());
        assert_eq!(weapon.state(), FireState::EmptyReloading);

        weapon.tick(2.0);
        assert_eq!(weapon.clip_ammo(), 0);
        assert!(weapon.is_reloading());

        weapon.tick(0.5);
        assert_eq!(weapon.clip_ammo(), 35);
        assert_eq!(weapon.state(), FireState::Ready);
    }

    #[test]
    fn test_shoot_cancels_reload() {
        let mut weapon = rifle().with_ammo(10, 140);

        assert!(weapon.reload());
        weapon.tick(1.0);

        assert!(weapon.shoot(false, &mut no_hits()));
        assert_eq!(weapon.state(), FireState::Ready);
        assert_eq!(weapon.clip_ammo(), 9);
        assert_eq!(weapon.magazine_ammo(), 140);

        // Отмена видна сразу: таймер не докрутит старую перезарядку
        weapon.tick(5.0);
        assert_eq!(weapon.clip_ammo(), 9);
    }

    #[test]
    fn test_cancel_even_if_interval_not_elapsed() {
        let mut weapon = rifle().with_ammo(10, 140);

        assert!(weapon.shoot(false, &mut no_hits()));
        assert!(weapon.reload());
        weapon.tick(0.01);

        assert!(!weapon.shoot(false, &mut no_hits()));
        assert!(!weapon.is_reloading());
        assert_eq!(weapon.clip_ammo(), 9);
        assert_eq!(weapon.magazine_ammo(), 140);
    }

    #[test]
    fn test_empty_reload_not_cancelled_by_dry_trigger() {
        let mut weapon = rifle().with_ammo(0, 140);

        assert!(weapon.reload());
        assert!(!weapon.shoot(false, &mut no_hits()));
        assert_eq!(weapon.state(), FireState::EmptyReloading);
    }

    #[test]
    fn test_per_round_reload() {
        let base = WeaponStatProfile::new("Shotgun", 160.0, 80.0)
            .with_ammo(8, 32)
            .with_reload(4.0, 0.0)
            .with_reload_style(ReloadStyle::PerRound);
        let upgraded = base.clone();
        let definition = WeaponDefinition::new("shotgun", false, WeaponProfiles::new(base, upgraded).unwrap());
        let mut weapon = WeaponInstance::new(Arc::new(definition)).with_ammo(5, 32);

        assert!(weapon.reload());

        // 0.5s на патрон
        let outcome = weapon.tick(0.5);
        assert_eq!(outcome.rounds_loaded, 1);
        assert!(!outcome.reload_finished);
        assert_eq!(weapon.clip_ammo(), 6);

        let outcome = weapon.tick(0.75);
        assert_eq!(outcome.rounds_loaded, 1);
        assert_eq!(weapon.clip_ammo(), 7);

        // Выстрел между патронами — уже заряженные остаются
        assert!(weapon.shoot(false, &mut no_hits()));
        assert_eq!(weapon.clip_ammo(), 6);
        assert_eq!(weapon.magazine_ammo(), 30);
        assert!(!weapon.is_reloading());
    }

    #[test]
    fn test_per_round_reload_finishes_when_full() {
        let base = WeaponStatProfile::new("Shotgun", 160.0, 80.0)
            .with_ammo(4, 32)
            .with_reload(2.0, 0.0)
            .with_reload_style(ReloadStyle::PerRound);
        let definition = WeaponDefinition::new("shotgun", false, WeaponProfiles::new(base.clone(), base).unwrap());
        let mut weapon = WeaponInstance::new(Arc::new(definition)).with_ammo(1, 32);

        assert!(weapon.reload());
        let outcome = weapon.tick(10.0);
        assert_eq!(outcome.rounds_loaded, 3);
        assert!(outcome.reload_finished);
        assert_eq!(weapon.clip_ammo(), 4);
        assert_eq!(weapon.magazine_ammo(), 29);
    }

    #[test]
    fn test_recoil_accumulates_and_decays() {
        let mut weapon = rifle();
        let mut last = 0.0;

        for _ in 0..8 {
            assert!(weapon.shoot(false, &mut no_hits()));
            let magnitude = weapon.current_recoil_offset().length();
            assert!(magnitude >= last);
            last = magnitude;
            weapon.tick(0.1);
        }
        assert!(last > 0.0);

        weapon.release_trigger();
        let mut last = weapon.current_recoil_offset().length();
        for _ in 0..300 {
            weapon.tick(0.05);
            let magnitude = weapon.current_recoil_offset().length();
            if last > 0.0 {
                assert!(magnitude < last, "{} !< {}", magnitude, last);
            }
            last = magnitude;
        }
        assert!(last < 0.01);
    }

    #[test]
    fn test_aim_recoil_is_smaller() {
        let mut hip = rifle();
        let mut aimed = rifle();
        hip.shoot(false, &mut no_hits());
        aimed.shoot(true, &mut no_hits());

        assert!(aimed.recoil().target().length() < hip.recoil().target().length());
    }

    #[test]
    fn test_snappiness_drives_burst_recoil() {
        let profiles = |snappiness: f32| {
            let profile = WeaponStatProfile::new("Rifle", 40.0, 750.0)
                .with_ammo(35, 140)
                .with_recoil(Vec3::new(-2.0, 0.5, 0.0), Vec3::new(-1.0, 0.2, 0.0), snappiness, 2.0);
            WeaponProfiles::new(profile.clone(), profile).unwrap()
        };
        let mut slow = WeaponInstance::new(Arc::new(WeaponDefinition::new("slow", true, profiles(0.5))));
        let mut fast = WeaponInstance::new(Arc::new(WeaponDefinition::new("fast", true, profiles(50.0))));

        let mut last_slow = 0.0;
        let mut last_fast = 0.0;
        for _ in 0..5 {
            assert!(slow.shoot(false, &mut no_hits()));
            assert!(fast.shoot(false, &mut no_hits()));
            slow.tick(0.1);
            fast.tick(0.1);

            let (s, f) = (
                slow.current_recoil_offset().length(),
                fast.current_recoil_offset().length(),
            );
            assert!(s >= last_slow && f >= last_fast);
            assert!(f > s, "fast {} <= slow {}", f, s);
            last_slow = s;
            last_fast = f;
        }
    }

    #[test]
    fn test_switch_profile_keeps_ammo() {
        let mut weapon = rifle();
        assert!(weapon.switch_profile(ProfileTier::Upgraded));
        assert_eq!(weapon.clip_ammo(), 35);
        assert_eq!(weapon.profile().damage, 90.0);
        assert!(!weapon.switch_profile(ProfileTier::Upgraded));
    }

    #[test]
    fn test_switch_profile_clamps_ammo() {
        let definition = WeaponDefinition::new("rifle", true, rifle_profiles(20));
        let mut weapon = WeaponInstance::new(Arc::new(definition));
        assert_eq!(weapon.clip_ammo(), 35);

        weapon.switch_profile(ProfileTier::Upgraded);
        assert_eq!(weapon.clip_ammo(), 20);

        // Обратно — raw count не "восстанавливается"
        weapon.switch_profile(ProfileTier::Base);
        assert_eq!(weapon.clip_ammo(), 20);
    }

    #[test]
    fn test_refill_and_reset() {
        let mut weapon = rifle().with_ammo(5, 10);

        weapon.refill_magazine();
        assert_eq!(weapon.magazine_ammo(), 140);
        assert_eq!(weapon.clip_ammo(), 5);

        weapon.shoot(false, &mut no_hits());
        weapon.reload();
        weapon.reset_ammo();
        assert_eq!(weapon.clip_ammo(), 35);
        assert_eq!(weapon.state(), FireState::Ready);
        assert_eq!(weapon.current_recoil_offset(), Vec3::ZERO);
    }

    #[test]
    fn test_with_ammo_clamps() {
        let weapon = rifle().with_ammo(99, 999);
        assert_eq!(weapon.clip_ammo(), 35);
        assert_eq!(weapon.magazine_ammo(), 140);
    }
}
