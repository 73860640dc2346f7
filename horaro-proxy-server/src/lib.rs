mod run;
mod settings;
pub mod services;

pub use run::{init_logs, run, AppState};
pub use settings::{HoraroSettings, ServerSettings, Settings};
