pub mod analytics;
pub mod profile;
pub mod version;
