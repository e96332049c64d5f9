//! Weapon stat profiles (Base / Upgraded tier)
//!
//! Architecture Decision:
//! - `WeaponStatProfile` — чистые данные одного tier, не мутируются после загрузки
//! - `WeaponProfiles` — фиксированная пара {Base, Upgraded}, валидируется целиком
//! - Runtime state (ammo, timers, recoil) живёт только в `WeaponInstance`
//!
//! Профиль с `fire_rate <= 0` отклоняется на загрузке: иначе interval = 60/0.

use bevy::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel для instant-kill оружия
pub const INSTANT_KILL_DAMAGE: f32 = f32::INFINITY;

/// Mobility tier (влияет на скорость носителя — потребитель вне этого модуля)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponMobility {
    Low,
    #[default]
    Medium,
    High,
}

/// Часть тела, в которую попал выстрел (байт уходит в Hit payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
#[repr(u8)]
pub enum BodyPart {
    Head = 0,
    Chest = 1,
    Abdomen = 2,
    #[default]
    Other = 3,
}

impl BodyPart {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Активный tier профиля
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum ProfileTier {
    #[default]
    Base,
    /// Pack-a-Punch — строго более сильный профиль
    Upgraded,
}

/// Сколько целей может задеть один выстрел
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitMode {
    /// Все entity в query box (area-effect hit-scan)
    #[default]
    Area,
    /// Только ближайшая к стрелку цель
    SingleTarget,
}

/// Как идёт перезарядка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReloadStyle {
    /// Вся обойма разом по истечении reload duration
    #[default]
    Magazine,
    /// По одному патрону за `reload_time / max_clip_ammo` (дробовик)
    PerRound,
}

/// Stat profile одного tier оружия
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStatProfile {
    pub name: String,

    /// Урон за попадание (INSTANT_KILL_DAMAGE = убивает сразу)
    #[serde(serialize_with = "ser_damage", deserialize_with = "de_damage")]
    pub damage: f32,

    /// Дальность (метры)
    pub range: f32,

    pub max_clip_ammo: u32,
    pub max_magazine_ammo: u32,

    /// Rounds per minute
    pub fire_rate: f32,

    /// Секунды
    pub reload_time: f32,

    /// Добавка к reload_time, если перезаряжаемся с пустого clip
    #[serde(default)]
    pub empty_reload_time_addon: f32,

    #[serde(default = "one")]
    pub head_multiplier: f32,
    #[serde(default = "one")]
    pub chest_multiplier: f32,
    #[serde(default = "one")]
    pub abdomen_multiplier: f32,

    #[serde(default)]
    pub recoil: Vec3,
    #[serde(default)]
    pub aim_recoil: Vec3,

    /// Скорость "набора" отдачи (1/сек)
    #[serde(default)]
    pub snappiness: f32,

    /// Скорость возврата к нулю (1/сек)
    #[serde(default)]
    pub return_speed: f32,

    #[serde(default)]
    pub mobility: WeaponMobility,

    #[serde(default)]
    pub hit_mode: HitMode,

    #[serde(default)]
    pub reload_style: ReloadStyle,

    /// Конус разброса (градусы)
    #[serde(default)]
    pub hip_spread_degrees: f32,
    #[serde(default)]
    pub aim_spread_degrees: f32,

    /// Weapon-specific множитель отдачи
    #[serde(default = "one")]
    pub recoil_multiplier: f32,

    /// Дробь: столько независимых hit query на один патрон
    #[serde(default = "one_pellet")]
    pub pellets_per_shot: u32,
}

fn one() -> f32 {
    1.0
}

fn one_pellet() -> u32 {
    1
}

const INSTANT_KILL_KEYWORD: &str = "instant_kill";

fn ser_damage<S: Serializer>(damage: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    if damage.is_infinite() {
        serializer.serialize_str(INSTANT_KILL_KEYWORD)
    } else {
        serializer.serialize_f32(*damage)
    }
}

fn de_damage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DamageRepr {
        Amount(f32),
        Keyword(String),
    }

    match DamageRepr::deserialize(deserializer)? {
        DamageRepr::Amount(v) => Ok(v),
        DamageRepr::Keyword(k) if k == INSTANT_KILL_KEYWORD => Ok(INSTANT_KILL_DAMAGE),
        DamageRepr::Keyword(k) => Err(serde::de::Error::custom(format!(
            "unknown damage keyword '{}', expected a number or '{}'",
            k, INSTANT_KILL_KEYWORD
        ))),
    }
}

/// Ошибка валидации профиля (configuration error → fatal на загрузке)
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    NonPositiveFireRate { profile: String, fire_rate: f32 },
    NegativeDamage { profile: String, damage: f32 },
    InvalidRange { profile: String, range: f32 },
    NegativeReloadTime { profile: String },
    NonPositiveMultiplier { profile: String, part: BodyPart },
    ZeroClipCapacity { profile: String },
    NegativeSpread { profile: String },
    InvalidRecoil { profile: String },
    ZeroPellets { profile: String },
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::NonPositiveFireRate { profile, fire_rate } => {
                write!(f, "profile '{}': fire_rate must be > 0 (got {})", profile, fire_rate)
            }
            ProfileError::NegativeDamage { profile, damage } => {
                write!(f, "profile '{}': damage must be >= 0 (got {})", profile, damage)
            }
            ProfileError::InvalidRange { profile, range } => {
                write!(f, "profile '{}': range must be >= 0 (got {})", profile, range)
            }
            ProfileError::NegativeReloadTime { profile } => {
                write!(f, "profile '{}': reload times must be >= 0", profile)
            }
            ProfileError::NonPositiveMultiplier { profile, part } => {
                write!(f, "profile '{}': {:?} multiplier must be > 0", profile, part)
            }
            ProfileError::ZeroClipCapacity { profile } => {
                write!(f, "profile '{}': max_clip_ammo must be > 0", profile)
            }
            ProfileError::NegativeSpread { profile } => {
                write!(f, "profile '{}': spread must be >= 0", profile)
            }
            ProfileError::InvalidRecoil { profile } => {
                write!(
                    f,
                    "profile '{}': snappiness/return_speed must be >= 0 and recoil_multiplier > 0",
                    profile
                )
            }
            ProfileError::ZeroPellets { profile } => {
                write!(f, "profile '{}': pellets_per_shot must be >= 1", profile)
            }
        }
    }
}

impl std::error::Error for ProfileError {}

impl WeaponStatProfile {
    /// Профиль с нейтральными значениями; остальное через `with_*`
    pub fn new(name: impl Into<String>, damage: f32, fire_rate: f32) -> Self {
        Self {
            name: name.into(),
            damage,
            range: 100.0,
            max_clip_ammo: 1,
            max_magazine_ammo: 0,
            fire_rate,
            reload_time: 0.0,
            empty_reload_time_addon: 0.0,
            head_multiplier: 1.0,
            chest_multiplier: 1.0,
            abdomen_multiplier: 1.0,
            recoil: Vec3::ZERO,
            aim_recoil: Vec3::ZERO,
            snappiness: 0.0,
            return_speed: 0.0,
            mobility: WeaponMobility::Medium,
            hit_mode: HitMode::Area,
            reload_style: ReloadStyle::Magazine,
            hip_spread_degrees: 0.0,
            aim_spread_degrees: 0.0,
            recoil_multiplier: 1.0,
            pellets_per_shot: 1,
        }
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn with_ammo(mut self, max_clip_ammo: u32, max_magazine_ammo: u32) -> Self {
        self.max_clip_ammo = max_clip_ammo;
        self.max_magazine_ammo = max_magazine_ammo;
        self
    }

    pub fn with_reload(mut self, reload_time: f32, empty_reload_time_addon: f32) -> Self {
        self.reload_time = reload_time;
        self.empty_reload_time_addon = empty_reload_time_addon;
        self
    }

    pub fn with_multipliers(mut self, head: f32, chest: f32, abdomen: f32) -> Self {
        self.head_multiplier = head;
        self.chest_multiplier = chest;
        self.abdomen_multiplier = abdomen;
        self
    }

    pub fn with_recoil(mut self, recoil: Vec3, aim_recoil: Vec3, snappiness: f32, return_speed: f32) -> Self {
        self.recoil = recoil;
        self.aim_recoil = aim_recoil;
        self.snappiness = snappiness;
        self.return_speed = return_speed;
        self
    }

    pub fn with_recoil_multiplier(mut self, multiplier: f32) -> Self {
        self.recoil_multiplier = multiplier;
        self
    }

    pub fn with_spread(mut self, hip_degrees: f32, aim_degrees: f32) -> Self {
        self.hip_spread_degrees = hip_degrees;
        self.aim_spread_degrees = aim_degrees;
        self
    }

    pub fn with_pellets(mut self, pellets_per_shot: u32) -> Self {
        self.pellets_per_shot = pellets_per_shot;
        self
    }

    pub fn with_hit_mode(mut self, hit_mode: HitMode) -> Self {
        self.hit_mode = hit_mode;
        self
    }

    pub fn with_reload_style(mut self, reload_style: ReloadStyle) -> Self {
        self.reload_style = reload_style;
        self
    }

    pub fn with_mobility(mut self, mobility: WeaponMobility) -> Self {
        self.mobility = mobility;
        self
    }

    /// Минимальный интервал между выстрелами (секунды)
    pub fn min_shot_interval(&self) -> f32 {
        60.0 / self.fire_rate
    }

    pub fn multiplier(&self, part: BodyPart) -> f32 {
        match part {
            BodyPart::Head => self.head_multiplier,
            BodyPart::Chest => self.chest_multiplier,
            BodyPart::Abdomen => self.abdomen_multiplier,
            BodyPart::Other => 1.0,
        }
    }

    /// Урон с учётом body-part multiplier
    pub fn damage_for(&self, part: BodyPart) -> f32 {
        self.damage * self.multiplier(part)
    }

    pub fn is_instant_kill(&self) -> bool {
        self.damage.is_infinite()
    }

    pub fn spread_degrees(&self, is_aiming: bool) -> f32 {
        if is_aiming {
            self.aim_spread_degrees
        } else {
            self.hip_spread_degrees
        }
    }

    /// Отдача одного выстрела (уже с weapon-specific множителем)
    pub fn recoil_kick(&self, is_aiming: bool) -> Vec3 {
        let base = if is_aiming { self.aim_recoil } else { self.recoil };
        base * self.recoil_multiplier
    }

    /// Длительность перезарядки (для PerRound — длительность одного шага)
    pub fn reload_duration(&self, from_empty: bool) -> f32 {
        let addon = if from_empty { self.empty_reload_time_addon } else { 0.0 };
        match self.reload_style {
            ReloadStyle::Magazine => self.reload_time + addon,
            ReloadStyle::PerRound => self.reload_time / self.max_clip_ammo.max(1) as f32 + addon,
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let profile = || self.name.clone();

        if !(self.fire_rate.is_finite() && self.fire_rate > 0.0) {
            return Err(ProfileError::NonPositiveFireRate {
                profile: profile(),
                fire_rate: self.fire_rate,
            });
        }
        // NaN тоже не проходит (сравнение false)
        if !(self.damage >= 0.0) {
            return Err(ProfileError::NegativeDamage {
                profile: profile(),
                damage: self.damage,
            });
        }
        if !(self.range.is_finite() && self.range >= 0.0) {
            return Err(ProfileError::InvalidRange {
                profile: profile(),
                range: self.range,
            });
        }
        if !(self.reload_time >= 0.0 && self.empty_reload_time_addon >= 0.0) {
            return Err(ProfileError::NegativeReloadTime { profile: profile() });
        }
        for part in [BodyPart::Head, BodyPart::Chest, BodyPart::Abdomen] {
            if !(self.multiplier(part) > 0.0) {
                return Err(ProfileError::NonPositiveMultiplier {
                    profile: profile(),
                    part,
                });
            }
        }
        if self.max_clip_ammo == 0 {
            return Err(ProfileError::ZeroClipCapacity { profile: profile() });
        }
        if !(self.hip_spread_degrees >= 0.0 && self.aim_spread_degrees >= 0.0) {
            return Err(ProfileError::NegativeSpread { profile: profile() });
        }
        if !(self.snappiness >= 0.0 && self.return_speed >= 0.0 && self.recoil_multiplier > 0.0) {
            return Err(ProfileError::InvalidRecoil { profile: profile() });
        }
        if self.pellets_per_shot == 0 {
            return Err(ProfileError::ZeroPellets { profile: profile() });
        }

        Ok(())
    }
}

/// Фиксированная пара профилей {Base, Upgraded}
///
/// Создаётся только через `new` → оба профиля гарантированно валидны.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponProfiles {
    base: WeaponStatProfile,
    upgraded: WeaponStatProfile,
}

impl WeaponProfiles {
    pub fn new(base: WeaponStatProfile, upgraded: WeaponStatProfile) -> Result<Self, ProfileError> {
        base.validate()?;
        upgraded.validate()?;
        Ok(Self { base, upgraded })
    }

    pub fn get(&self, tier: ProfileTier) -> &WeaponStatProfile {
        match tier {
            ProfileTier::Base => &self.base,
            ProfileTier::Upgraded => &self.upgraded,
        }
    }

    pub fn base(&self) -> &WeaponStatProfile {
        &self.base
    }

    pub fn upgraded(&self) -> &WeaponStatProfile {
        &self.upgraded
    }
}
