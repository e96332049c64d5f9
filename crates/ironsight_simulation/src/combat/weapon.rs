//! Weapon fire-control state machine
//!
//! States: Ready → Firing → Ready (мгновенно, в пределах одного `shoot`),
//! Ready → Reloading / EmptyReloading → Ready.
//! Shoot во время перезарядки отменяет её синхронно (без переноса патронов).
//!
//! Architecture:
//! - `WeaponInstance` — Component на носителе (эксклюзивное владение)
//! - Профили разделяются через `Arc<WeaponDefinition>` (immutable)
//! - Время: внутренний clock, двигается только через `tick(delta)`
//! - Hit resolution — collaborator через `ShotResolver`, вызывается синхронно

use bevy::prelude::*;
use std::sync::Arc;

use crate::combat::recoil::RecoilState;
use crate::combat::registry::WeaponDefinition;
use crate::combat::weapon_stats::{ProfileTier, ReloadStyle, WeaponStatProfile};

/// Допуск на накопленную ошибку float при сравнении интервалов
const TIME_EPSILON: f64 = 1e-5;

/// Сколько fire-интервалов после выстрела очередь считается "продолжающейся"
pub const SUSTAINED_FIRE_WINDOW: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum FireState {
    #[default]
    Ready,
    /// Только внутри `shoot` — защищает от re-entrancy в том же tick
    Firing,
    Reloading,
    /// Перезарядка с пустого clip (reload_time + empty_reload_time_addon)
    EmptyReloading,
}

/// Collaborator: hit resolution одного выстрела
///
/// Вызывается синхронно внутри `shoot`, до списания патрона.
pub trait ShotResolver {
    fn resolve_shot(&mut self, profile: &WeaponStatProfile, is_aiming: bool);
}

impl<F: FnMut(&WeaponStatProfile, bool)> ShotResolver for F {
    fn resolve_shot(&mut self, profile: &WeaponStatProfile, is_aiming: bool) {
        self(profile, is_aiming)
    }
}

/// Итог одного `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Сколько патронов перенесено magazine → clip за этот tick
    pub rounds_loaded: u32,
    /// Перезарядка завершилась (state вернулся в Ready)
    pub reload_finished: bool,
}

/// Runtime state оружия в руках
#[derive(Component, Debug, Clone)]
pub struct WeaponInstance {
    definition: Arc<WeaponDefinition>,
    tier: ProfileTier,

    clip_ammo: u32,
    magazine_ammo: u32,

    state: FireState,

    /// Внутренние часы (секунды с момента экипировки)
    clock: f64,
    last_shot_time: Option<f64>,
    reload_start_time: f64,
    reload_duration: f64,

    /// Trigger зажат с последнего выстрела (для recoil spring)
    trigger_held: bool,

    recoil: RecoilState,
}

impl WeaponInstance {
    /// Новый instance: Base tier, полный clip + magazine
    pub fn new(definition: Arc<WeaponDefinition>) -> Self {
        let base = definition.profiles().base();
        let clip_ammo = base.max_clip_ammo;
        let magazine_ammo = base.max_magazine_ammo;

        Self {
            definition,
            tier: ProfileTier::Base,
            clip_ammo,
            magazine_ammo,
            state: FireState::Ready,
            clock: 0.0,
            last_shot_time: None,
            reload_start_time: 0.0,
            reload_duration: 0.0,
            trigger_held: false,
            recoil: RecoilState::default(),
        }
    }

    /// Установить ammo (clamp в `[0, max]` активного профиля)
    pub fn with_ammo(mut self, clip_ammo: u32, magazine_ammo: u32) -> Self {
        self.clip_ammo = clip_ammo;
        self.magazine_ammo = magazine_ammo;
        self.clamp_ammo();
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn definition(&self) -> &Arc<WeaponDefinition> {
        &self.definition
    }

    pub fn profile(&self) -> &WeaponStatProfile {
        self.definition.profiles().get(self.tier)
    }

    pub fn tier(&self) -> ProfileTier {
        self.tier
    }

    pub fn state(&self) -> FireState {
        self.state
    }

    pub fn clip_ammo(&self) -> u32 {
        self.clip_ammo
    }

    pub fn magazine_ammo(&self) -> u32 {
        self.magazine_ammo
    }

    pub fn is_automatic(&self) -> bool {
        self.definition.is_automatic()
    }

    pub fn is_reloading(&self) -> bool {
        matches!(self.state, FireState::Reloading | FireState::EmptyReloading)
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn last_shot_time(&self) -> Option<f64> {
        self.last_shot_time
    }

    /// Момент старта текущей перезарядки (None если не перезаряжаемся)
    pub fn reload_start_time(&self) -> Option<f64> {
        self.is_reloading().then_some(self.reload_start_time)
    }

    pub fn current_recoil_offset(&self) -> Vec3 {
        self.recoil.current()
    }

    pub fn recoil(&self) -> &RecoilState {
        &self.recoil
    }

    pub fn elapsed_since_last_shot(&self) -> Option<f64> {
        self.last_shot_time.map(|t| self.clock - t)
    }

    /// Прошёл ли fire-rate интервал с последнего выстрела
    pub fn fire_interval_elapsed(&self) -> bool {
        match self.elapsed_since_last_shot() {
            None => true,
            Some(elapsed) => elapsed + TIME_EPSILON >= self.profile().min_shot_interval() as f64,
        }
    }

    /// Идёт ли непрерывная очередь (trigger зажат, следующий выстрел "на подходе")
    pub fn is_sustaining_fire(&self) -> bool {
        if !self.trigger_held {
            return false;
        }
        let window = (self.profile().min_shot_interval() * SUSTAINED_FIRE_WINDOW) as f64;
        self.elapsed_since_last_shot()
            .is_some_and(|elapsed| elapsed <= window + TIME_EPSILON)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Выстрел
    ///
    /// `false` без side effects, если clip пуст или не прошёл fire-rate интервал.
    /// Если идёт перезарядка (а патроны в clip есть) — она отменяется сразу,
    /// даже если сам выстрел потом упрётся в интервал.
    pub fn shoot(&mut self, is_aiming: bool, resolver: &mut impl ShotResolver) -> bool {
        if self.state == FireState::Firing || self.clip_ammo == 0 {
            return false;
        }

        if self.is_reloading() {
            self.cancel_reload();
        }

        if !self.fire_interval_elapsed() {
            return false;
        }

        self.state = FireState::Firing;

        let definition = Arc::clone(&self.definition);
        let profile = definition.profiles().get(self.tier);

        resolver.resolve_shot(profile, is_aiming);

        self.clip_ammo -= 1;
        self.recoil.kick(profile.recoil_kick(is_aiming));
        self.last_shot_time = Some(self.clock);
        self.trigger_held = true;

        self.state = FireState::Ready;
        true
    }

    /// Начать перезарядку
    ///
    /// Разрешено если clip не полон, magazine не пуст и перезарядка ещё не идёт.
    pub fn reload(&mut self) -> bool {
        if self.is_reloading() || self.state == FireState::Firing {
            return false;
        }

        let profile = self.profile();
        if self.clip_ammo >= profile.max_clip_ammo || self.magazine_ammo == 0 {
            return false;
        }

        let from_empty = self.clip_ammo == 0;
        self.reload_duration = profile.reload_duration(from_empty) as f64;
        self.reload_start_time = self.clock;
        self.state = if from_empty {
            FireState::EmptyReloading
        } else {
            FireState::Reloading
        };

        true
    }

    /// Отменить перезарядку; патроны текущего шага не переносятся
    pub fn cancel_reload(&mut self) -> bool {
        if !self.is_reloading() {
            return false;
        }

        self.state = FireState::Ready;
        crate::logger::log(
            "Weapon",
            &format!("{} reload cancelled (clip: {})", self.profile().name, self.clip_ammo),
        );
        true
    }

    /// Продвинуть время: таймеры перезарядки + recoil spring
    pub fn tick(&mut self, delta: f32) -> TickOutcome {
        let delta = delta.max(0.0);
        self.clock += delta as f64;

        let outcome = self.advance_reload();

        let firing = self.is_sustaining_fire();
        let (snappiness, return_speed) = {
            let profile = self.profile();
            (profile.snappiness, profile.return_speed)
        };
        self.recoil.update(delta, firing, snappiness, return_speed);

        outcome
    }

    /// Отпустить trigger (recoil сразу переходит в release)
    pub fn release_trigger(&mut self) {
        self.trigger_held = false;
    }

    /// Переключить tier профиля
    ///
    /// Ammo не сбрасывается и не масштабируется — только clamp к новым max.
    pub fn switch_profile(&mut self, tier: ProfileTier) -> bool {
        if self.tier == tier {
            return false;
        }

        self.tier = tier;
        self.clamp_ammo();

        crate::logger::log_info(
            "Weapon",
            &format!(
                "Switched to {:?} profile '{}' (clip: {}, magazine: {})",
                tier,
                self.profile().name,
                self.clip_ammo,
                self.magazine_ammo
            ),
        );
        true
    }

    /// Max Ammo power-up: magazine до максимума активного профиля
    pub fn refill_magazine(&mut self) {
        self.magazine_ammo = self.profile().max_magazine_ammo;
        crate::logger::log_info("Weapon", &format!("{} Max Ammo!", self.profile().name));
    }

    /// Вернуть ammo к максимуму активного профиля, сбросить reload и recoil
    pub fn reset_ammo(&mut self) {
        let (clip, magazine) = {
            let profile = self.profile();
            (profile.max_clip_ammo, profile.max_magazine_ammo)
        };
        self.clip_ammo = clip;
        self.magazine_ammo = magazine;
        self.state = FireState::Ready;
        self.trigger_held = false;
        self.recoil.reset();
        crate::logger::log_info(
            "Weapon",
            &format!("{} reset (clip: {}, magazine: {})", self.profile().name, clip, magazine),
        );
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn clamp_ammo(&mut self) {
        let (max_clip, max_magazine) = {
            let profile = self.profile();
            (profile.max_clip_ammo, profile.max_magazine_ammo)
        };
        self.clip_ammo = self.clip_ammo.min(max_clip);
        self.magazine_ammo = self.magazine_ammo.min(max_magazine);
    }

    fn advance_reload(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        while self.is_reloading() {
            let elapsed = self.clock - self.reload_start_time;
            if elapsed + TIME_EPSILON < self.reload_duration {
                break;
            }

            let profile = self.definition.profiles().get(self.tier);
            let missing = profile.max_clip_ammo.saturating_sub(self.clip_ammo);

            let rounds = match profile.reload_style {
                ReloadStyle::Magazine => missing.min(self.magazine_ammo),
                ReloadStyle::PerRound => missing.min(self.magazine_ammo).min(1),
            };
            self.clip_ammo += rounds;
            self.magazine_ammo -= rounds;
            outcome.rounds_loaded += rounds;

            let more_rounds = self.clip_ammo < profile.max_clip_ammo && self.magazine_ammo > 0;
            if profile.reload_style == ReloadStyle::PerRound && more_rounds && rounds > 0 {
                // Следующий патрон стартует ровно с конца предыдущего шага
                self.reload_start_time += self.reload_duration;
                self.reload_duration = profile.reload_duration(false) as f64;
                self.state = FireState::Reloading;
                continue;
            }

            self.state = FireState::Ready;
            outcome.reload_finished = true;
            crate::logger::log_info(
                "Weapon",
                &format!(
                    "{} Reloaded! (clip: {}, magazine: {})",
                    profile.name, self.clip_ammo, self.magazine_ammo
                ),
            );
        }

        outcome
    }
}
