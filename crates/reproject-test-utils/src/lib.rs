//! Shared test utilities for the reproject workspace.
//!
//! This crate provides fixtures for tests that need a real git checkout or a
//! template on disk. It is a dev-dependency only — never published.
//!
//! # Modules
//!
//! - [`git`] — git repositories with a known number of commits
//! - [`project`] — [`TestProject`] builder: a checkout plus a template
//! - [`logs`] — [`CapturedLogs`]: `tracing` output for level assertions

pub mod git;
pub mod logs;
pub mod project;

pub use logs::CapturedLogs;
pub use project::TestProject;
