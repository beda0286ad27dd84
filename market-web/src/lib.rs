// ABOUTME: Library exports for the farmers market web service
// ABOUTME: Makes the server, resolver and CLI modules available to integration tests and benchmarks

pub mod checks;
pub mod cli;
pub mod config;
pub mod constants;
pub mod output;
pub mod resolver;
pub mod server;
