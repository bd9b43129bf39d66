pub mod batch;
pub mod handlers;
pub mod models;
pub mod scorer;
pub mod single;
pub mod validation;
