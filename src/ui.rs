//! Ratatui front-end. `App` owns the recorder session and maps key presses
//! onto it; `run_app` owns the terminal.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
