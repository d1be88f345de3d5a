//! release-bot - ChatOps release automation over an external release tool

pub mod classify;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod github;
pub mod intent;
pub mod subprocess;
pub mod telemetry;
pub mod template;
#[cfg(test)]
mod testing;
