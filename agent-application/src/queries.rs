pub mod ops_queries;
