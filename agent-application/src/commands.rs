// Command handlers: one module per inbound event source

pub mod auth_commands;
pub mod block_commands;
pub mod chat_commands;
pub mod group_commands;
pub mod pickup_commands;
pub mod score_commands;
pub mod tpa_commands;
