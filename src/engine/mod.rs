//! Planning engine for converge
//!
//! The engine orchestrates:
//! 1. Building - one provider per declared package
//! 2. Planning - observe and diff every provider (in parallel)
//! 3. Display - show what an executor would have to do

pub mod differ;
pub mod planner;

pub use differ::{display_plan, print_summary};
pub use planner::{DefaultManager, build_providers};
