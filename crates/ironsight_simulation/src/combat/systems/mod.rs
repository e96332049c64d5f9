//! Fire-control systems

pub mod weapon;


pub use weapon::*;
