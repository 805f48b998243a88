//! Task lifecycle management for Taskwright.
//!
//! Tasks move through a small state machine (`todo`, `in_progress`,
//! `on_hold`, then `completed` or `cancelled`). Completing a task spawns
//! the next instance of a recurring series and may complete the parent
//! once all its subtasks are done. A periodic sweep fires due-date
//! reminders at most once per due date. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
