//! 响应内容提取 - 业务能力层
//!
//! 上游聊天 API 的响应形状并不统一（OpenAI 格式、Deepseek 格式、裸字符串等）。
//! 本模块把任意 JSON 响应归一化为一个文本字符串。
//!
//! 实现方式：按优先级对一组封闭的已知形状做判别，全部不命中时退化为
//! 整体序列化透传。提取永远不会失败。

use serde_json::Value;
use tracing::{debug, warn};

/// 已识别出的响应形状
///
/// 判别顺序即枚举声明顺序，先命中者生效
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// `choices[0].message.content`（OpenAI 格式）
    OpenAiChat(String),
    /// `choices[0].content`（Deepseek 格式）
    DeepseekChat(String),
    /// 顶层 `response` 字段
    Simple(String),
    /// 顶层 `content` 字段
    Direct(String),
    /// `message.content`
    NestedMessage(String),
    /// 顶层 `text` 字段
    PlainText(String),
    /// 响应本身就是字符串
    BareString(String),
    /// 兜底字段扫描命中（text / answer / result / output / generated_text）
    FallbackField(String),
    /// 未知形状，整体透传
    Unknown,
}

/// 兜底扫描的候选字段名
const FALLBACK_FIELDS: [&str; 5] = ["text", "answer", "result", "output", "generated_text"];

/// 判别响应形状
pub fn classify(value: &Value) -> ResponseShape {
    if let Some(content) = string_at(value, "/choices/0/message/content") {
        return ResponseShape::OpenAiChat(content);
    }
    if let Some(content) = string_at(value, "/choices/0/content") {
        return ResponseShape::DeepseekChat(content);
    }
    if let Some(content) = string_at(value, "/response") {
        return ResponseShape::Simple(content);
    }
    if let Some(content) = string_at(value, "/content") {
        return ResponseShape::Direct(content);
    }
    if let Some(content) = string_at(value, "/message/content") {
        return ResponseShape::NestedMessage(content);
    }
    if let Some(content) = string_at(value, "/text") {
        return ResponseShape::PlainText(content);
    }
    if let Some(content) = value.as_str() {
        return ResponseShape::BareString(content.to_string());
    }
    for field in FALLBACK_FIELDS {
        if let Some(content) = value.get(field).and_then(Value::as_str) {
            return ResponseShape::FallbackField(content.to_string());
        }
    }
    ResponseShape::Unknown
}

/// 从任意 API 响应中提取文本内容
///
/// 永远返回字符串，不抛出错误；未知形状时返回整体序列化结果
pub fn extract_content(value: &Value) -> String {
    match classify(value) {
        ResponseShape::OpenAiChat(content)
        | ResponseShape::DeepseekChat(content)
        | ResponseShape::Simple(content)
        | ResponseShape::Direct(content)
        | ResponseShape::NestedMessage(content)
        | ResponseShape::PlainText(content)
        | ResponseShape::BareString(content)
        | ResponseShape::FallbackField(content) => {
            debug!("响应内容提取成功，长度 {} 字符", content.len());
            content
        }
        ResponseShape::Unknown => {
            warn!("无法识别响应形状，整体序列化透传");
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}
