//! Компоненты носителя оружия (вне `WeaponInstance`)

use bevy::prelude::*;

/// Semi-auto дисциплина: одно нажатие — один выстрел
///
/// `engaged` ставится после выстрела, снимается `TriggerReleased`.
/// Для automatic оружия игнорируется. Нет компонента → ограничения нет.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct TriggerLatch {
    pub engaged: bool,
}

impl TriggerLatch {
    /// Можно ли стрелять при текущем состоянии trigger
    pub fn allows(&self, is_automatic: bool) -> bool {
        is_automatic || !self.engaged
    }
}

/// Модификаторы носителя
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct WielderStats {
    /// Множитель урона (power-up "double tap" и т.п.)
    pub damage_modifier: f32,
}

impl Default for WielderStats {
    fn default() -> Self {
        Self { damage_modifier: 1.0 }
    }
}
