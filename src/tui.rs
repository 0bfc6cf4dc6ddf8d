//! Interactive form for filling in a run, previewing the numbering and
//! executing it.

mod app;
mod events;
mod models;
mod rendering;

pub use app::App;
pub use events::run_tui;
pub use models::{ConfigInputMode, FileItem, ProcessingStatus};
