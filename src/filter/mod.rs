pub mod engine;
pub mod scope;
