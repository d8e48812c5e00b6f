//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below exercises one subsystem against the scripted serial
//! port and manual clock in [`mock_hw`].  Everything runs on the host
//! with no hardware and no real sleeping.

mod mock_hw;
mod mutual_exclusion_tests;
mod pipeline_tests;
mod publisher_tests;
