//! 题目解析 - 业务能力层
//!
//! 把模型返回的松散文本解析为结构化的题目记录。模型输出格式没有保证，
//! 解析是尽力而为：按优先级依次尝试一组命名的提取策略，全部失败时
//! 返回兜底题目。因此 `parse` 永远返回非空列表，调用方无需判空。
//!
//! 策略顺序：
//! 1. 标记策略 - 按 "题目：" 分割，块内按 A./B./C./D./答案：/解析： 切片
//! 2. 编号列表策略 - 仅在标记分割产出零个块时启用，按 "1." 式编号分割
//! 3. 兜底 - 单个占位题目

use regex::Regex;
use tracing::{debug, warn};

use crate::models::question::{Choice, ChoiceSet, QuestionRecord};

/// 缺失选项的占位文本
fn missing_choice(letter: char) -> String {
    format!("选项{}未提供", letter)
}

/// 提取策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// 标准 "题目：" 标记格式
    Marker,
    /// "1." / "2:" 式编号列表格式
    NumberedList,
}

/// 单个策略的提取结果
enum Outcome {
    /// 找到了候选块，records 可能为空（块全部无效）
    Parsed(Vec<QuestionRecord>),
    /// 连候选块都没有，轮到下一个策略
    NoBlocks,
}

/// 题目解析器
pub struct QuestionParser;

impl QuestionParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析模型输出为题目记录列表
    ///
    /// 保证返回至少一条记录（解析失败时为占位题目）
    pub fn parse(&self, content: &str) -> Vec<QuestionRecord> {
        for strategy in [Strategy::Marker, Strategy::NumberedList] {
            match self.run_strategy(strategy, content) {
                Outcome::Parsed(records) if !records.is_empty() => {
                    debug!("{:?} 策略解析出 {} 道题目", strategy, records.len());
                    return records;
                }
                // 有候选块但全部无效：不再尝试后备策略，直接兜底
                Outcome::Parsed(_) => break,
                Outcome::NoBlocks => continue,
            }
        }

        warn!("所有策略均未解析出题目，使用默认题目");
        vec![QuestionRecord::placeholder()]
    }

    fn run_strategy(&self, strategy: Strategy, content: &str) -> Outcome {
        match strategy {
            Strategy::Marker => self.parse_marker_format(content),
            Strategy::NumberedList => self.parse_numbered_format(content),
        }
    }

    // ========== 策略 1: 标记格式 ==========

    fn parse_marker_format(&self, content: &str) -> Outcome {
        // 统一格式：没有标记时补上，保证分割行为一致
        let normalized = if !content.contains("题目：") && !content.starts_with("题目") {
            format!("题目：{}", content)
        } else {
            content.to_string()
        };

        let blocks: Vec<&str> = normalized
            .split("题目：")
            .filter(|block| !block.trim().is_empty())
            .collect();

        if blocks.is_empty() {
            return Outcome::NoBlocks;
        }
        debug!("标记分割得到 {} 个候选块", blocks.len());

        let records = blocks
            .iter()
            .filter_map(|block| self.parse_marker_block(block))
            .collect();
        Outcome::Parsed(records)
    }

    /// 解析一个 "题目：" 块
    fn parse_marker_block(&self, block: &str) -> Option<QuestionRecord> {
        let question_text = self.question_text_of(block);

        let choice_a = slice_between(block, "A.", &["B."]);
        let choice_b = slice_between(block, "B.", &["C."]);
        let choice_c = slice_between(block, "C.", &["D."]);
        let choice_d = slice_between(block, "D.", &["答案："]);

        let answer = self.answer_of(block);
        let explanation = slice_between(block, "解析：", &["题目："]);

        // 题干或答案缺失的块直接丢弃，不报错
        let (question_text, answer) = match (question_text, answer) {
            (Some(q), Some(a)) if !q.is_empty() => (q, a),
            _ => {
                warn!("跳过缺少题干或答案的块");
                return None;
            }
        };

        Some(QuestionRecord {
            question_text: format!("题目：{}", question_text),
            choices: ChoiceSet::new(
                non_empty_or(choice_a, || missing_choice('A')),
                non_empty_or(choice_b, || missing_choice('B')),
                non_empty_or(choice_c, || missing_choice('C')),
                non_empty_or(choice_d, || missing_choice('D')),
            ),
            answer,
            explanation: non_empty_or(explanation, || "无解析".to_string()),
        })
    }

    /// 题干：块内第一个选项/答案/解析标记之前的部分
    fn question_text_of(&self, block: &str) -> Option<String> {
        let re = Regex::new(r"[A-D]\.|\n答案：|\n解析：").ok()?;
        let text = re.split(block).next()?.trim();
        Some(text.to_string())
    }

    /// 答案："答案：" 后面的单个字母
    fn answer_of(&self, block: &str) -> Option<Choice> {
        let re = Regex::new(r"答案：\s*([A-D])").ok()?;
        let letter = re.captures(block)?.get(1)?.as_str();
        Choice::find(letter)
    }

    // ========== 策略 2: 编号列表格式 ==========

    fn parse_numbered_format(&self, content: &str) -> Outcome {
        let re = match Regex::new(r"\d+[.:]\s+") {
            Ok(re) => re,
            Err(_) => return Outcome::NoBlocks,
        };

        let blocks: Vec<&str> = re
            .split(content)
            .filter(|block| !block.trim().is_empty())
            .collect();

        if blocks.is_empty() {
            return Outcome::NoBlocks;
        }
        debug!("编号分割得到 {} 个候选块", blocks.len());

        let records = blocks
            .iter()
            .filter_map(|block| self.parse_numbered_block(block))
            .collect();
        Outcome::Parsed(records)
    }

    /// 解析一个编号块：逐行扫描选项、答案和解析
    fn parse_numbered_block(&self, block: &str) -> Option<QuestionRecord> {
        let lines: Vec<&str> = block
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        // 至少需要题干 + 4 个候选行
        if lines.len() < 5 {
            return None;
        }

        let question_text = lines[0];
        let mut choices = [None, None, None, None];
        let mut answer = None;
        let mut explanation = None;

        for (i, line) in lines.iter().enumerate().skip(1) {
            if let Some(slot) = "ABCD"
                .chars()
                .position(|letter| strip_option_prefix(line, letter).is_some())
            {
                let letter = ['A', 'B', 'C', 'D'][slot];
                choices[slot] = strip_option_prefix(line, letter);
            } else if line.contains("答案") || line.to_lowercase().contains("answer") {
                answer = Choice::find(line);
            } else if line.contains("解析") || line.to_lowercase().contains("explanation") {
                explanation = Some(lines[i..].join("\n"));
                break;
            }
        }

        // 题干缺失、或四个选项一个都没有：跳过
        if question_text.is_empty() || choices.iter().all(Option::is_none) {
            return None;
        }

        let [a, b, c, d] = choices;
        Some(QuestionRecord {
            question_text: format!("题目：{}", question_text),
            choices: ChoiceSet::new(
                non_empty_or(a, || missing_choice('A')),
                non_empty_or(b, || missing_choice('B')),
                non_empty_or(c, || missing_choice('C')),
                non_empty_or(d, || missing_choice('D')),
            ),
            answer: answer.unwrap_or(Choice::A),
            explanation: non_empty_or(explanation, || "无解析".to_string()),
        })
    }

    // ========== 优化题目的响应格式 ==========

    /// 解析 "优化题目" 响应（问题：/选项：/答案：/解析： 格式）
    ///
    /// 与 `parse` 不同，优化响应解析失败时返回 None，由调用方决定是否保留原题
    pub fn parse_optimized(&self, content: &str) -> Option<QuestionRecord> {
        let question = slice_between(content, "问题：", &["选项：", "A."])
            .filter(|q| !q.is_empty())?;
        let answer = self.answer_of(content)?;

        let choice_a = slice_between(content, "A.", &["B."]);
        let choice_b = slice_between(content, "B.", &["C."]);
        let choice_c = slice_between(content, "C.", &["D."]);
        let choice_d = slice_between(content, "D.", &["答案："]);
        let explanation = slice_between(content, "解析：", &[]);

        Some(QuestionRecord {
            question_text: format!("题目：{}", question),
            choices: ChoiceSet::new(
                non_empty_or(choice_a, || missing_choice('A')),
                non_empty_or(choice_b, || missing_choice('B')),
                non_empty_or(choice_c, || missing_choice('C')),
                non_empty_or(choice_d, || missing_choice('D')),
            ),
            answer,
            explanation: non_empty_or(explanation, || "无解析".to_string()),
        })
    }
}

impl Default for QuestionParser {
    fn default() -> Self {
        Self::new()
    }
}

// ========== 切片辅助 ==========

/// 取 `start` 标记之后、第一个结束标记（或文本末尾）之前的内容，并去掉首尾空白
fn slice_between(text: &str, start: &str, ends: &[&str]) -> Option<String> {
    let from = text.find(start)? + start.len();
    let rest = &text[from..];
    let to = ends
        .iter()
        .filter_map(|end| rest.find(end))
        .min()
        .unwrap_or(rest.len());
    Some(rest[..to].trim().to_string())
}

/// 去掉选项行的前缀（支持 "A"、"A."、"(A)" 三种写法）
fn strip_option_prefix(line: &str, letter: char) -> Option<String> {
    let paren = format!("({})", letter);
    if let Some(rest) = line.strip_prefix(&paren) {
        return Some(rest.trim_start().to_string());
    }
    let rest = line.strip_prefix(letter)?;
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    Some(rest.trim_start().to_string())
}

/// Some 且非空时取值，否则用默认值
fn non_empty_or(value: Option<String>, default: impl FnOnce() -> String) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> QuestionParser {
        QuestionParser::new()
    }

    #[test]
    fn test_single_block_scenario() {
        let content = "题目：1+1等于几？A. 1 B. 2 C. 3 D. 4 答案：B 解析：基础加法。";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.question_text, "题目：1+1等于几？");
        assert_eq!(record.choices.get(Choice::A), "1");
        assert_eq!(record.choices.get(Choice::B), "2");
        assert_eq!(record.choices.get(Choice::C), "3");
        assert_eq!(record.choices.get(Choice::D), "4");
        assert_eq!(record.answer, Choice::B);
        assert_eq!(record.explanation, "基础加法。");
    }

    #[test]
    fn test_multiple_blocks() {
        let content = "题目：第一题\nA. 甲\nB. 乙\nC. 丙\nD. 丁\n答案：A\n解析：略。\n\
                       题目：第二题\nA. 一\nB. 二\nC. 三\nD. 四\n答案：D\n解析：略。";
        let records = parser().parse(content);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].question_text, "题目：第一题");
        assert_eq!(records[0].answer, Choice::A);
        assert_eq!(records[1].question_text, "题目：第二题");
        assert_eq!(records[1].answer, Choice::D);
        assert_eq!(records[1].choices.get(Choice::B), "二");
        // 解析在下一个 "题目：" 处截断
        assert_eq!(records[0].explanation, "略。");
    }

    #[test]
    fn test_prefix_added_when_marker_absent() {
        let content = "中国的首都是哪里？\nA. 上海\nB. 北京\nC. 广州\nD. 深圳\n答案：B\n解析：常识。";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question_text, "题目：中国的首都是哪里？");
        assert_eq!(records[0].answer, Choice::B);
    }

    #[test]
    fn test_missing_choices_use_placeholders() {
        let content = "题目：只有两个选项的题\nA. 甲\nB. 乙\n答案：A";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.choices.get(Choice::C), "选项C未提供");
        assert_eq!(record.choices.get(Choice::D), "选项D未提供");
        assert_eq!(record.explanation, "无解析");
    }

    #[test]
    fn test_block_without_answer_is_skipped() {
        let content = "题目：没有答案的题\nA. 甲\nB. 乙\nC. 丙\nD. 丁\n\
                       题目：正常的题\nA. 一\nB. 二\nC. 三\nD. 四\n答案：C\n解析：略。";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question_text, "题目：正常的题");
    }

    #[test]
    fn test_never_empty_even_for_empty_input() {
        let records = parser().parse("");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], QuestionRecord::placeholder());
    }

    #[test]
    fn test_garbage_input_yields_placeholder() {
        let records = parser().parse("题目：");
        assert_eq!(records, vec![QuestionRecord::placeholder()]);
    }

    #[test]
    fn test_marker_blocks_all_invalid_degrades_to_placeholder() {
        // 标记策略会补前缀并得到一个块，但块内没有 "答案：" 标记，
        // 块被丢弃后不再尝试编号策略，直接兜底
        let content = "1. What is 1+1?\nA. 1\nB. 2\nC. 3\nD. 4\nAnswer: B";
        let records = parser().parse(content);
        assert_eq!(records, vec![QuestionRecord::placeholder()]);
    }

    #[test]
    fn test_numbered_block_parsing() {
        let p = parser();
        let block = "What is 2+2?\nA. 3\nB. 4\n(C) 5\nD 6\n答案: B\n解析：简单加法";
        let record = p.parse_numbered_block(block).unwrap();

        assert_eq!(record.question_text, "题目：What is 2+2?");
        assert_eq!(record.choices.get(Choice::A), "3");
        assert_eq!(record.choices.get(Choice::B), "4");
        assert_eq!(record.choices.get(Choice::C), "5");
        assert_eq!(record.choices.get(Choice::D), "6");
        assert_eq!(record.answer, Choice::B);
        assert_eq!(record.explanation, "解析：简单加法");
    }

    #[test]
    fn test_numbered_block_requires_five_lines() {
        let p = parser();
        assert!(p.parse_numbered_block("太短\nA. 1\nB. 2").is_none());
    }

    #[test]
    fn test_numbered_block_explanation_consumes_rest() {
        let p = parser();
        let block = "题干\nA. 1\nB. 2\nC. 3\nD. 4\n解析：第一行\n第二行不再扫描";
        let record = p.parse_numbered_block(block).unwrap();
        assert_eq!(record.explanation, "解析：第一行\n第二行不再扫描");
        // 答案行缺失时默认 A
        assert_eq!(record.answer, Choice::A);
    }

    #[test]
    fn test_parse_optimized_roundtrip() {
        let content = "问题：优化后的题干\n选项：\nA. 一\nB. 二\nC. 三\nD. 四\n答案：C\n解析：优化后的解析";
        let record = parser().parse_optimized(content).unwrap();

        assert_eq!(record.question_text, "题目：优化后的题干");
        assert_eq!(record.choices.get(Choice::C), "三");
        assert_eq!(record.answer, Choice::C);
        assert_eq!(record.explanation, "优化后的解析");
    }

    #[test]
    fn test_parse_optimized_rejects_missing_answer() {
        assert!(parser()
            .parse_optimized("问题：只有题干\n选项：\nA. 一")
            .is_none());
    }

    #[test]
    fn test_strip_option_prefix_variants() {
        assert_eq!(strip_option_prefix("A. 文本", 'A').unwrap(), "文本");
        assert_eq!(strip_option_prefix("A 文本", 'A').unwrap(), "文本");
        assert_eq!(strip_option_prefix("(A) 文本", 'A').unwrap(), "文本");
        assert!(strip_option_prefix("B. 文本", 'A').is_none());
    }
}
