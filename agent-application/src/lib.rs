// Agent Application Layer

pub mod commands;
pub mod error;
pub mod metrics;
pub mod queries;
pub mod state;

pub use error::*;
pub use metrics::*;
pub use state::*;

#[cfg(test)]
mod testing;
