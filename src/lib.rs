//! Interactive client for a remote pit-stop strategy prediction service.
//!
//! The interesting part is the request lifecycle: a guarded submit, one
//! round-trip to `POST /predict`, then either a history entry plus a redraw
//! or a transient notice.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod history;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod notice;
pub mod orchestrator;
pub mod reference;
pub mod render;
pub mod service;
pub mod status;
pub mod ui;
