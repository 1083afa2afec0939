// Library exports for the binary and integration tests

pub mod config;
pub mod db;
pub mod import;
pub mod locale;
pub mod sheets;
pub mod sink;

pub use config::{Config, ImportSettings};

// Test support (unit tests only)
#[cfg(test)]
mod test_support;
