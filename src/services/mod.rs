pub mod codec;
pub mod identifier;
pub mod image_service;
pub mod storage;
