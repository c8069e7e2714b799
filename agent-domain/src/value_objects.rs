// Domain value objects
pub mod currency;
pub mod identifiers;

pub use currency::*;
pub use identifiers::*;
