pub mod profile;
pub mod screening;
pub mod settings;
