pub mod client;
pub mod models;

pub use client::{ChatApi, LarkClient};
pub use models::{BearerToken, MessageContent};
