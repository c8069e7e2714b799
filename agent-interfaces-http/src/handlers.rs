pub mod ops_handlers;
