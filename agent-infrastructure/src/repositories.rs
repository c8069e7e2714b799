pub mod config_files;
pub mod state_files;

pub use config_files::*;
pub use state_files::*;
