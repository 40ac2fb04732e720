//! 评估内容分区 - 业务能力层
//!
//! 把模型返回的自由文本评估切分为带标题的分区，并对段落做轻量
//! markdown 格式化。分区依据是五组固定关键词，按优先级先命中者生效。
//!
//! 一个段落只有在 "像标题" 时才开启新分区：包含关键词，且段落较短
//! （< 100 字）或关键词出现得很靠前（首次出现位置 < 50 字）。正文里
//! 顺带提到关键词的长段落会被并入当前分区而不是另起一段。

use regex::Regex;
use tracing::debug;

use crate::models::evaluation::{EvaluationSection, SectionStyle};

/// 一组分区关键词
struct SectionPattern {
    keywords: &'static [&'static str],
    title: &'static str,
    style: SectionStyle,
}

/// 关键词组，列表顺序即匹配优先级
const SECTION_PATTERNS: [SectionPattern; 5] = [
    SectionPattern {
        keywords: &["总体评价", "总评", "整体表现", "overall", "总结"],
        title: "总体评价",
        style: SectionStyle::Overall,
    },
    SectionPattern {
        keywords: &["优势", "强项", "做得好", "strengths", "正确"],
        title: "优势与亮点",
        style: SectionStyle::Strengths,
    },
    SectionPattern {
        keywords: &["不足", "弱项", "问题", "weaknesses", "错误", "需要改进"],
        title: "需要改进的地方",
        style: SectionStyle::Weaknesses,
    },
    SectionPattern {
        keywords: &["建议", "提高", "改进", "提升", "suggestions", "学习方法"],
        title: "学习建议",
        style: SectionStyle::Suggestions,
    },
    SectionPattern {
        keywords: &["下一步", "计划", "未来", "接下来", "next steps", "后续"],
        title: "下一步计划",
        style: SectionStyle::NextSteps,
    },
];

/// 未命中任何关键词组时的通用分区标题
const GENERAL_TITLE: &str = "评估结果";

/// 评估内容分区器
pub struct EvaluationSectionizer;

impl EvaluationSectionizer {
    pub fn new() -> Self {
        Self
    }

    /// 把评估全文切分为分区列表，保证非空
    pub fn sectionize(&self, content: &str) -> Vec<EvaluationSection> {
        let paragraphs: Vec<&str> = content
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .collect();

        let mut sections: Vec<EvaluationSection> = Vec::new();
        let mut current: Option<EvaluationSection> = None;

        for paragraph in paragraphs {
            if let Some(pattern) = match_section_pattern(paragraph) {
                // 命中新分区：先关闭当前分区
                if let Some(open) = current.take() {
                    if !open.body.is_empty() {
                        sections.push(open);
                    }
                }
                current = Some(EvaluationSection::new(
                    pattern.title,
                    format_paragraph(paragraph),
                    pattern.style,
                ));
            } else if let Some(open) = current.as_mut() {
                open.body.push_str(&format_paragraph(paragraph));
            } else {
                // 第一个段落就没有命中：开启通用分区
                current = Some(EvaluationSection::new(
                    GENERAL_TITLE,
                    format_paragraph(paragraph),
                    SectionStyle::General,
                ));
            }
        }

        if let Some(open) = current {
            if !open.body.is_empty() {
                sections.push(open);
            }
        }

        // 理论上不会发生（通用分区兜底），仍然防护一下
        if sections.is_empty() {
            sections.push(EvaluationSection::new(
                GENERAL_TITLE,
                format_paragraph(content),
                SectionStyle::General,
            ));
        }

        debug!("评估内容切分为 {} 个分区", sections.len());
        sections
    }
}

impl Default for EvaluationSectionizer {
    fn default() -> Self {
        Self::new()
    }
}

/// 判断段落是否开启一个新分区，返回命中的关键词组
fn match_section_pattern(paragraph: &str) -> Option<&'static SectionPattern> {
    let lowered = paragraph.to_lowercase();
    let char_count = paragraph.chars().count();

    SECTION_PATTERNS.iter().find(|pattern| {
        pattern.keywords.iter().any(|keyword| {
            match lowered.find(&keyword.to_lowercase()) {
                Some(byte_index) => {
                    let char_index = lowered[..byte_index].chars().count();
                    char_count < 100 || char_index < 50
                }
                None => false,
            }
        })
    })
}

/// 段落的轻量 markdown 格式化
///
/// 标题、列表、粗体/斜体、换行依次转换，最后对四组关键词做高亮标记
pub fn format_paragraph(paragraph: &str) -> String {
    // 标题：从最具体的标记开始替换，避免 "###" 被 "#" 规则抢先命中
    let mut formatted = replace_all(paragraph, r"(?m)^### (.*?)(\n|$)", "<h5>$1</h5>");
    formatted = replace_all(&formatted, r"(?m)^## (.*?)(\n|$)", "<h4>$1</h4>");
    formatted = replace_all(&formatted, r"(?m)^# (.*?)(\n|$)", "<h3>$1</h3>");

    formatted = convert_lists(&formatted);

    // 粗体先于斜体，否则 "**" 会被当作两个斜体标记
    formatted = replace_all(&formatted, r"\*\*(.*?)\*\*", "<strong>$1</strong>");
    formatted = replace_all(&formatted, r"\*(.*?)\*", "<em>$1</em>");

    formatted = formatted.replace('\n', "<br>");

    // 关键词高亮，与分区归属无关
    formatted = replace_all(
        &formatted,
        r"(?i)(优势|strengths|强项)",
        r#"<span class="hl-strengths">$1</span>"#,
    );
    formatted = replace_all(
        &formatted,
        r"(?i)(不足|weaknesses|弱项|问题)",
        r#"<span class="hl-weaknesses">$1</span>"#,
    );
    formatted = replace_all(
        &formatted,
        r"(?i)(建议|suggestions|提高|改进|提升)",
        r#"<span class="hl-suggestions">$1</span>"#,
    );
    formatted = replace_all(
        &formatted,
        r"(?i)(总体评价|overall|表现)",
        r#"<span class="hl-overall">$1</span>"#,
    );

    formatted
}

/// 编号行和破折号行转为列表项，连续的列表项包进一个 <ul>
fn convert_lists(text: &str) -> String {
    let numbered = match Regex::new(r"^\d+\. ") {
        Ok(re) => re,
        Err(_) => return text.to_string(),
    };

    let mut out = String::new();
    let mut in_list = false;
    let mut first_line = true;

    for line in text.split('\n') {
        let item = if numbered.is_match(line) {
            // 编号项保留编号
            Some(line.to_string())
        } else {
            line.strip_prefix("- ").map(|rest| rest.to_string())
        };

        match item {
            Some(item) => {
                if !in_list {
                    out.push_str("<ul>");
                    in_list = true;
                }
                out.push_str("<li>");
                out.push_str(&item);
                out.push_str("</li>");
            }
            None => {
                if in_list {
                    out.push_str("</ul>");
                    in_list = false;
                }
                if !first_line {
                    out.push('\n');
                }
                out.push_str(line);
            }
        }
        first_line = false;
    }
    if in_list {
        out.push_str("</ul>");
    }
    out
}

fn replace_all(text: &str, pattern: &str, replacement: &str) -> String {
    match Regex::new(pattern) {
        Ok(re) => re.replace_all(text, replacement).into_owned(),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sectionizer() -> EvaluationSectionizer {
        EvaluationSectionizer::new()
    }

    #[test]
    fn test_sections_in_order() {
        let content = "总体评价：整体表现不错。\n\n建议：多做练习。";
        let sections = sectionizer().sectionize(content);

        assert!(sections.len() >= 2);
        assert_eq!(sections[0].title, "总体评价");
        assert_eq!(sections[0].style, SectionStyle::Overall);
        assert_eq!(sections[1].title, "学习建议");
        assert_eq!(sections[1].style, SectionStyle::Suggestions);
    }

    #[test]
    fn test_body_paragraph_appends_to_open_section() {
        let content = "优势：基础扎实。\n\n这一段没有关键词，应该并入上一分区。";
        let sections = sectionizer().sectionize(content);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "优势与亮点");
        assert!(sections[0].body.contains("并入上一分区"));
    }

    #[test]
    fn test_unmatched_first_paragraph_opens_general_section() {
        let sections = sectionizer().sectionize("这段话没有任何分区词。");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "评估结果");
        assert_eq!(sections[0].style, SectionStyle::General);
    }

    #[test]
    fn test_long_paragraph_with_late_keyword_does_not_open_section() {
        // 超过 100 字且关键词出现在 50 字之后：按正文处理
        let filler = "字".repeat(120);
        let content = format!("开头的段落。\n\n{}然后才提到建议两个字。", filler);
        let sections = sectionizer().sectionize(&content);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "评估结果");
    }

    #[test]
    fn test_short_paragraph_with_keyword_opens_section() {
        let sections = sectionizer().sectionize("下一步：继续复习。");
        assert_eq!(sections[0].title, "下一步计划");
        assert_eq!(sections[0].style, SectionStyle::NextSteps);
    }

    #[test]
    fn test_priority_first_group_wins() {
        // 同时包含 "总结"（总体评价组）和 "建议"（学习建议组），前者优先
        let sections = sectionizer().sectionize("总结与建议");
        assert_eq!(sections[0].title, "总体评价");
    }

    #[test]
    fn test_bold_has_no_residual_asterisks() {
        let formatted = format_paragraph("这里有**重点内容**需要注意");
        assert!(formatted.contains("<strong>重点内容</strong>"));
        assert!(!formatted.contains('*'));
    }

    #[test]
    fn test_italic_after_bold() {
        let formatted = format_paragraph("**粗体**和*斜体*");
        assert!(formatted.contains("<strong>粗体</strong>"));
        assert!(formatted.contains("<em>斜体</em>"));
    }

    #[test]
    fn test_heading_levels() {
        assert!(format_paragraph("# 一级").contains("<h3>一级</h3>"));
        assert!(format_paragraph("## 二级").contains("<h4>二级</h4>"));
        assert!(format_paragraph("### 三级").contains("<h5>三级</h5>"));
    }

    #[test]
    fn test_list_items_wrapped() {
        let formatted = format_paragraph("要点：\n1. 第一点\n2. 第二点");
        assert!(formatted.contains("<ul><li>1. 第一点</li><li>2. 第二点</li></ul>"));
    }

    #[test]
    fn test_dash_list_strips_marker() {
        let formatted = format_paragraph("清单：\n- 甲\n- 乙");
        assert!(formatted.contains("<li>甲</li><li>乙</li>"));
    }

    #[test]
    fn test_newlines_become_breaks() {
        let formatted = format_paragraph("第一行\n第二行");
        assert!(formatted.contains("第一行<br>第二行"));
    }

    #[test]
    fn test_keyword_highlighting() {
        let formatted = format_paragraph("你的优势明显，但也有不足。");
        assert!(formatted.contains(r#"<span class="hl-strengths">优势</span>"#));
        assert!(formatted.contains(r#"<span class="hl-weaknesses">不足</span>"#));
    }
}
