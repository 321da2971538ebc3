//! ECS Components, общие для всех акторов
//!
//! - actor: Actor (tribe), Health, Facing, FrameFlags, ActorColliders
//!
//! Variant-specific компоненты живут рядом со своими системами:
//! игрок - в `player`, враг - в `ai`, снаряды - в `combat`.

pub mod actor;

pub use actor::*;
