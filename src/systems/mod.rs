//! Systems module - ECS glue between Bevy and the weapons simulation.

pub mod firing;
pub mod messages;
