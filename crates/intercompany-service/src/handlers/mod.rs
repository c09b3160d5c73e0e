//! API handlers.

pub mod health;
pub mod invoke;
pub mod world_state;
