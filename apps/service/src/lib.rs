//! upwatch service library: the check-monitoring worker, its keyed record
//! store, and the token authorization gate.
//!
//! The HTTP request layer consumes [`store::FileStore`],
//! [`auth::TokenAuthorizer`], and [`registry::CheckRegistry`]; the worker
//! side is [`monitoring::Scheduler`] driving [`monitoring::Worker`].

pub mod alert;
pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod monitoring;
pub mod registry;
pub mod store;
