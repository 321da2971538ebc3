//! Combat systems (projectile pass)

pub mod projectiles;


pub use projectiles::*;
