//! Core library surface for the regatta admin TUI: a terminal client that
//! manages athletes (with their vessels) and events through a REST API.
pub mod api;
pub mod config;
pub mod logging;
pub mod models;
pub mod ui;

/// HTTP client for the two collections.
pub use api::{ApiClient, ApiError};

/// Settings merged from flags, environment and the config file.
pub use config::{Config, Overrides};

/// The records the app manages.
pub use models::{Athlete, Event, Resource, Vessel};

/// The interactive application entry point and state container.
pub use ui::{run_app, App, Route};
