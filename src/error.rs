//! 应用程序错误类型
//!
//! 错误分类：
//! - `Config` - 配置缺失或非法（对应代理端的 500 响应）
//! - `Api` - 上游聊天 API 返回非 2xx，状态码原样透传
//! - `Network` - 网络层请求失败
//! - `Parse` - 优化题目的响应无法解析（普通题目解析不会失败，见 QuestionParser）
//! - `Session` - 会话状态操作非法
//!
//! 超时不是错误：AiClient 会把超时转换为兜底提示文本返回。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {message}")]
    Config { message: String },

    /// API 返回错误响应
    #[error("API请求失败 (状态码: {status}): {body}")]
    Api { status: u16, body: String },

    /// 网络请求失败
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),

    /// 响应内容解析失败
    #[error("无法解析响应内容: {message}")]
    Parse { message: String },

    /// 会话状态错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
}

/// 会话状态错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// 题目列表为空
    #[error("题目列表不能为空")]
    EmptyQuestions,

    /// 当前题目已提交过答案
    #[error("第 {index} 题已提交过答案，不能重复提交")]
    AlreadyAnswered { index: usize },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
