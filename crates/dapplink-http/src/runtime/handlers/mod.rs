//! HTTP request handlers

pub mod chat;
pub mod health;

pub use chat::*;
pub use health::*;
