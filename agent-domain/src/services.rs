// Pure domain services

pub mod differ;
pub mod secret;

pub use differ::*;
pub use secret::*;
