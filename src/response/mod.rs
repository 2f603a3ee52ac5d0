//! Response handling module - Base64 payloads and saving generated images

pub mod base64;
pub mod file;

pub use file::FileHandler;
