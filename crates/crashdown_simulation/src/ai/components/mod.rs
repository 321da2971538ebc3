//! AI components

pub mod enemy;

#[cfg(test)]
mod enemy_tests;

pub use enemy::*;
