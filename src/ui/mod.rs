//! Ratatui front-end: a navigation header over one list view at a time, with
//! add/edit forms and delete confirmations opened as popups.

mod app;
mod forms;
mod helpers;
mod screens;
mod tasks;
mod terminal;

pub use app::App;
pub use screens::Route;
pub use terminal::run_app;
