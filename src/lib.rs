//! Taskwright: task lifecycle engine.
//!
//! This crate manages tasks for business workflows: checklist-driven
//! progress, advisory dependencies, subtasks with parent cascade
//! completion, recurring tasks and due-date reminders.
//!
//! # Architecture
//!
//! Taskwright follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence, notification
//!   and templates
//! - **Adapters**: Concrete implementations of ports (in-memory, JSON file)
//!
//! # Modules
//!
//! - [`task`]: Task model, lifecycle orchestration and reminder sweep

pub mod task;
