pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod global;
pub mod logging;
pub mod schema;

#[cfg(test)]
mod tests;
