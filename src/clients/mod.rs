//! 客户端层
//!
//! 封装与外部服务的网络交互

pub mod ai_client;

pub use ai_client::{AiClient, ApiFunction, ResponseCache, TIMEOUT_FALLBACK_MESSAGE};
