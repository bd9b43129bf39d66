pub mod export;
pub mod handlers;
pub mod position;
pub mod stats;
pub mod store;
