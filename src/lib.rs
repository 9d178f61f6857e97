// Core modules
pub mod cli;
pub mod config;
pub mod github;
pub mod infrastructure;
pub mod report;
