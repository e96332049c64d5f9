//! Collision Layers Constants
//!
//! Rapier collision groups — centralised constants для hit resolution.
//!
//! ## Layers (битовая маска `Group`):
//! - bit 2 (0b100 = 4): Environment (walls, obstacles)
//! - bit 3 (0b1000 = 8): Actors (players, NPC bodies)
//! - bit 4 (0b1_0000 = 16): Hitboxes (body-part sensors: head/chest/abdomen)
//! - bit 7 (0b1000_0000 = 128): Enemies
//!
//! Hit resolver query'ит фиксированную "hittable" маску (actors + hitboxes + enemies).

use bevy_rapier3d::prelude::{CollisionGroups, Group};

/// Layer: Environment (StaticBody — walls, obstacles, terrain)
pub const COLLISION_LAYER_ENVIRONMENT: u32 = 1 << 2;

/// Layer: Actors (player/NPC bodies)
pub const COLLISION_LAYER_ACTORS: u32 = 1 << 3;

/// Layer: Hitboxes (ColliderAttachment-style body-part sensors)
pub const COLLISION_LAYER_HITBOXES: u32 = 1 << 4;

/// Layer: Enemies
pub const COLLISION_LAYER_ENEMIES: u32 = 1 << 7;

/// Mask: всё, что может получить урон от выстрела
pub const COLLISION_MASK_HITTABLE: u32 =
    COLLISION_LAYER_ACTORS | COLLISION_LAYER_HITBOXES | COLLISION_LAYER_ENEMIES;

/// Collision groups для overlap query с заданной маской
pub fn query_groups(mask: u32) -> CollisionGroups {
    CollisionGroups::new(Group::ALL, Group::from_bits_truncate(mask))
}

/// Получить название слоя для debug логов
pub fn get_layer_name(layer_bits: u32) -> &'static str {
    match layer_bits {
        COLLISION_LAYER_ENVIRONMENT => "Environment",
        COLLISION_LAYER_ACTORS => "Actors",
        COLLISION_LAYER_HITBOXES => "Hitboxes",
        COLLISION_LAYER_ENEMIES => "Enemies",
        _ => "Unknown",
    }
}

/// "Actors|Hitboxes|Enemies" — список слоёв маски для логов
pub fn describe_mask(mask: u32) -> String {
    (0..u32::BITS)
        .map(|bit| 1u32 << bit)
        .filter(|layer| mask & layer != 0)
        .map(get_layer_name)
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hittable_mask_excludes_environment() {
        assert_eq!(COLLISION_MASK_HITTABLE & COLLISION_LAYER_ENVIRONMENT, 0);
        assert_ne!(COLLISION_MASK_HITTABLE & COLLISION_LAYER_HITBOXES, 0);
        assert_eq!(get_layer_name(COLLISION_LAYER_ENEMIES), "Enemies");
    }

    #[test]
    fn test_describe_mask() {
        assert_eq!(describe_mask(COLLISION_MASK_HITTABLE), "Actors|Hitboxes|Enemies");
        assert_eq!(describe_mask(1 << 9), "Unknown");
        assert_eq!(describe_mask(0), "");
    }
}
