pub mod aggregator;
pub mod config;
pub mod report;
pub mod statistics;
