pub mod engine;
pub mod reactor;
pub mod solar;
pub mod spectrum;
pub mod sweep;
