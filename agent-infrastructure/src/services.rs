pub mod backend_client;
pub mod sim_host;
pub mod xuid_resolver;

pub use backend_client::*;
pub use sim_host::*;
pub use xuid_resolver::*;
