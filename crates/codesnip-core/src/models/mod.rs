pub mod settings;
pub mod snippet;
