pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod resolve;
pub mod stats;
pub mod sync;
