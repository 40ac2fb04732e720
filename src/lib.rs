//! # AI Quiz
//!
//! 调用聊天补全代理生成选择题、解析模型输出、驱动答题会话并请求
//! 叙述性评估的测验引擎
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 题目记录、答题会话、评估分区等纯数据结构
//! - `QuizSession` - 唯一的状态来源，渲染只是模型到视图的投影
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `content_extractor` - 归一化各种形状的 API 响应
//! - `question_parser` - 按策略顺序把松散文本解析为题目记录
//! - `evaluation` - 评估内容分区与段落格式化
//!
//! ### ③ 客户端层（Clients）
//! - `clients/ai_client` - 代理调用、超时策略、响应缓存
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/session_ctx` - 会话上下文，集中全部可变状态
//! - `workflow/quiz_flow` - 出题 → 解析 → 会话 / 评估 / 优化 的编排
//!
//! ### ⑤ 编排层（App）
//! - `app` - 终端交互控制器

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{AiClient, ApiFunction};
pub use config::Config;
pub use error::{AppError, AppResult, SessionError};
pub use models::{Choice, EvaluationSection, QuestionRecord, QuizSession, ScoreSummary};
pub use services::{EvaluationSectionizer, QuestionParser};
pub use workflow::{GenerationParams, QuizFlow, SessionContext};
