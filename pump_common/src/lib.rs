//! Pump Common Library
//!
//! This crate provides the shared data model, constants, configuration
//! loading and outbound event definitions for the pump fleet workspace.
//!
//! # Module Structure
//!
//! - [`pump`] - Pump entity, status, metrics and thresholds
//! - [`alert`] - Alert types produced by threshold evaluation
//! - [`health`] - Fleet health snapshot types
//! - [`activity`] - Operator activity log entries
//! - [`control`] - Operator commands and control errors
//! - [`auth`] - Authentication provider seam and operator identity
//! - [`event`] - Outbound fleet events and the event sink contract
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Numeric limits and defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! pump = { package = "pump_common", path = "../pump_common" }
//! ```
//!
//! ```rust
//! use pump_common::prelude::*;
//! ```

pub mod activity;
pub mod alert;
pub mod auth;
pub mod config;
pub mod consts;
pub mod control;
pub mod event;
pub mod health;
pub mod prelude;
pub mod pump;
