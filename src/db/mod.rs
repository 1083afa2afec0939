mod batch;
mod client;
mod models;

pub use batch::ImportBatch;
pub use client::Database;
pub use models::*;
