//! Core types used throughout toolsmith

pub mod anthropic;
pub mod bedrock;
pub mod gemini;
pub mod native;
pub mod openai;
pub mod param;
pub mod schema;
