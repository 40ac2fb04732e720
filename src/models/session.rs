use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SessionError;
use crate::models::question::{Choice, QuestionRecord};

/// 测验会话状态
///
/// 会话是唯一的状态来源，渲染层只读取、不回写。
///
/// 不变量：
/// - `questions` 长度 ≥ 1
/// - `current_index` ∈ [0, len)
/// - `user_answers.len() == questions.len()`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    questions: Vec<QuestionRecord>,
    current_index: usize,
    user_answers: Vec<Option<Choice>>,
}

/// 得分统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub correct: usize,
    pub total: usize,
    /// 正确率（百分比，保留一位小数）
    pub percentage: f64,
}

impl QuizSession {
    /// 用一组题目开启新会话
    pub fn start(questions: Vec<QuestionRecord>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestions);
        }
        let count = questions.len();
        debug!("开启新会话，共 {} 道题目", count);
        Ok(Self {
            questions,
            current_index: 0,
            user_answers: vec![None; count],
        })
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &QuestionRecord {
        &self.questions[self.current_index]
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// 当前题目是否已作答
    pub fn current_answered(&self) -> bool {
        self.user_answers[self.current_index].is_some()
    }

    pub fn answer_at(&self, index: usize) -> Option<Choice> {
        self.user_answers.get(index).copied().flatten()
    }

    /// 前后移动题目指针，越界时收拢到边界（边界处的移动是空操作）
    pub fn go_to(&mut self, delta: i64) {
        let last = (self.questions.len() - 1) as i64;
        let target = (self.current_index as i64 + delta).clamp(0, last);
        self.current_index = target as usize;
    }

    /// 记录当前题目的答案
    ///
    /// 同一题目重复提交会被拒绝，而不是静默覆盖
    pub fn submit(&mut self, choice: Choice) -> Result<(), SessionError> {
        let index = self.current_index;
        if self.user_answers[index].is_some() {
            return Err(SessionError::AlreadyAnswered { index });
        }
        self.user_answers[index] = Some(choice);
        debug!("第 {} 题提交答案: {}", index + 1, choice);
        Ok(())
    }

    /// 是否所有题目都已作答
    pub fn is_complete(&self) -> bool {
        self.user_answers.iter().all(|a| a.is_some())
    }

    /// 统计得分
    pub fn score(&self) -> ScoreSummary {
        let correct = self
            .user_answers
            .iter()
            .zip(&self.questions)
            .filter(|(answer, question)| **answer == Some(question.answer))
            .count();
        let total = self.questions.len();
        let percentage = (correct as f64 / total as f64 * 1000.0).round() / 10.0;
        ScoreSummary {
            correct,
            total,
            percentage,
        }
    }

    /// 整体替换当前题目（"优化题目" 操作）
    pub fn replace_current(&mut self, record: QuestionRecord) {
        self.questions[self.current_index] = record;
    }
}
