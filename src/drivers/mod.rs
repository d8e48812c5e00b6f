//! Low-level drivers: peripheral bring-up and task spawning.

pub mod hw_init;
pub mod task_pin;
