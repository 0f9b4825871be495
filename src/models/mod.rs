pub mod config;
pub mod criteria;
pub mod stats;
pub mod transaction;
