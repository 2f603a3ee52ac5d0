//! Backend module - Generation API trait, wire types and the Gemini client

pub mod gemini;
pub mod traits;

pub use gemini::GeminiBackend;
pub use traits::GenerationApi;
