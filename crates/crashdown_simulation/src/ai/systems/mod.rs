//! AI systems (aggro + enemy FSM)

pub mod aggro;
pub mod enemy;

pub use aggro::*;
pub use enemy::*;
