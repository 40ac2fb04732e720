use serde::{Deserialize, Serialize};

/// 评估分区的样式类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionStyle {
    /// 总体评价
    Overall,
    /// 优势与亮点
    Strengths,
    /// 需要改进的地方
    Weaknesses,
    /// 学习建议
    Suggestions,
    /// 下一步计划
    NextSteps,
    /// 未命中任何关键词组的通用分区
    General,
}

/// 评估内容的一个分区
///
/// 由 EvaluationSectionizer 按关键词切分产生，每次评估请求重新生成，不持久化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSection {
    pub title: String,
    /// 已格式化的正文，可能累积多个来源段落
    pub body: String,
    pub style: SectionStyle,
}

impl EvaluationSection {
    pub fn new(title: impl Into<String>, body: impl Into<String>, style: SectionStyle) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            style,
        }
    }
}
