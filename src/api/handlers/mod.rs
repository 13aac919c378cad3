pub mod download;
pub mod images;
pub mod system;
pub mod types;
