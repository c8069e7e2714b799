// Domain entities

pub mod block;
pub mod event;
pub mod model;
pub mod pending;
pub mod player;
pub mod rules;
pub mod snapshot;
pub mod social;

pub use block::*;
pub use event::*;
pub use model::*;
pub use pending::*;
pub use player::*;
pub use rules::*;
pub use snapshot::*;
pub use social::*;
