//! 流程层
//!
//! 定义一次测验的完整流程编排：
//! - `SessionContext` - 会话上下文，唯一的可变状态持有者
//! - `QuizFlow` - 生成 → 解析 → 会话 / 评估 / 优化 的流程编排

pub mod quiz_flow;
pub mod session_ctx;

pub use quiz_flow::QuizFlow;
pub use session_ctx::{GenerationParams, GenerationTicket, SessionContext};
