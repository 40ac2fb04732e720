use serde::{Deserialize, Serialize};

/// 选项字母枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    /// 固定的选项顺序 A、B、C、D
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    pub fn as_str(self) -> &'static str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
            Choice::C => "C",
            Choice::D => "D",
        }
    }

    /// 从字符串中找到第一个 A-D 字母
    pub fn find(s: &str) -> Option<Self> {
        s.chars().find_map(|c| match c {
            'A' => Some(Choice::A),
            'B' => Some(Choice::B),
            'C' => Some(Choice::C),
            'D' => Some(Choice::D),
            _ => None,
        })
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 四个选项的内容，顺序固定为 A、B、C、D
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSet {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl ChoiceSet {
    pub fn new(
        a: impl Into<String>,
        b: impl Into<String>,
        c: impl Into<String>,
        d: impl Into<String>,
    ) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            c: c.into(),
            d: d.into(),
        }
    }

    pub fn get(&self, choice: Choice) -> &str {
        match choice {
            Choice::A => &self.a,
            Choice::B => &self.b,
            Choice::C => &self.c,
            Choice::D => &self.d,
        }
    }

    /// 按 A、B、C、D 顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (Choice, &str)> {
        Choice::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// 一道解析出来的选择题
///
/// 不变量：
/// - `question_text` 非空，始终以 "题目：" 开头
/// - `answer` 必然是 A-D 之一（由类型保证）
///
/// 记录创建后不再修改，"优化题目" 操作会整体替换记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question_text: String,
    pub choices: ChoiceSet,
    pub answer: Choice,
    pub explanation: String,
}

impl QuestionRecord {
    /// 解析完全失败时的兜底题目
    pub fn placeholder() -> Self {
        Self {
            question_text: "题目：无法解析API返回的题目，这是一个默认题目".to_string(),
            choices: ChoiceSet::new("选项A", "选项B", "选项C", "选项D"),
            answer: Choice::A,
            explanation: "由于API返回格式问题，无法解析题目。这是一个默认解析。".to_string(),
        }
    }

    /// 去掉 "题目：" 前缀的题干，用于构建评估提示词
    pub fn stem(&self) -> &str {
        self.question_text
            .strip_prefix("题目：")
            .unwrap_or(&self.question_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_find_first_letter() {
        assert_eq!(Choice::find("答案是 B"), Some(Choice::B));
        assert_eq!(Choice::find("正确答案：C。"), Some(Choice::C));
        assert_eq!(Choice::find("没有字母"), None);
    }

    #[test]
    fn test_choice_set_order() {
        let set = ChoiceSet::new("一", "二", "三", "四");
        let collected: Vec<_> = set.iter().collect();
        assert_eq!(
            collected,
            vec![
                (Choice::A, "一"),
                (Choice::B, "二"),
                (Choice::C, "三"),
                (Choice::D, "四"),
            ]
        );
    }

    #[test]
    fn test_placeholder_record() {
        let record = QuestionRecord::placeholder();
        assert!(record.question_text.starts_with("题目："));
        assert_eq!(record.answer, Choice::A);
        assert_eq!(record.choices.get(Choice::C), "选项C");
    }

    #[test]
    fn test_stem_strips_prefix() {
        let mut record = QuestionRecord::placeholder();
        record.question_text = "题目：1+1等于几？".to_string();
        assert_eq!(record.stem(), "1+1等于几？");
    }
}
