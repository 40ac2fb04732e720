//! 业务能力层
//!
//! 描述"我能做什么"，每个模块一种能力，不关心流程顺序：
//! - `content_extractor` - 归一化各种形状的 API 响应
//! - `question_parser` - 文本到题目记录的解析
//! - `evaluation` - 评估内容分区与段落格式化

pub mod content_extractor;
pub mod evaluation;
pub mod question_parser;

pub use content_extractor::{classify, extract_content, ResponseShape};
pub use evaluation::{format_paragraph, EvaluationSectionizer};
pub use question_parser::QuestionParser;
