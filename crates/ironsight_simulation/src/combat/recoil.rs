//! Recoil spring (два rate: attack через snappiness, release через return_speed)
//!
//! - `target` — куда "толкает" отдача; каждый выстрел добавляет kick
//! - `current` — смещение прицела, которое видит камера
//!
//! Пока идёт стрельба, target держится, current тянется к нему со скоростью
//! snappiness → непрерывная очередь накапливает отдачу, и тем быстрее,
//! чем выше snappiness.
//! В простое и current, и target затухают к нулю с return_speed; kick, который
//! current ещё не догнал, не теряется, а подхватывается следующей очередью.

use bevy::prelude::*;

/// Ниже этой величины считаем, что отдача погасла
pub const RECOIL_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct RecoilState {
    target: Vec3,
    current: Vec3,
}

impl RecoilState {
    pub fn current(&self) -> Vec3 {
        self.current
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Kick одного выстрела; current догоняет его в `update`
    pub fn kick(&mut self, amount: Vec3) {
        self.target += amount;
    }

    pub fn update(&mut self, delta: f32, firing: bool, snappiness: f32, return_speed: f32) {
        if delta <= 0.0 {
            return;
        }

        if firing {
            let attack = (snappiness * delta).clamp(0.0, 1.0);
            self.current = self.current.lerp(self.target, attack);
        } else {
            let release = (return_speed * delta).clamp(0.0, 1.0);
            self.current = self.current.lerp(Vec3::ZERO, release);
            self.target = self.target.lerp(Vec3::ZERO, release);
        }

        if self.current.length() < RECOIL_EPSILON && self.target.length() < RECOIL_EPSILON {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.target = Vec3::ZERO;
        self.current = Vec3::ZERO;
    }
}
