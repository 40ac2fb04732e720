//! 会话上下文 - 流程层
//!
//! 全部可变会话状态（当前题目参数、测验会话、生成序号）集中在这里，
//! 由顶层控制器持有并显式传递，随会话创建、随重置丢弃。
//!
//! 生成请求按序号串行化：每次发起生成会领取一张新票据，响应返回时
//! 只有票据仍是最新的那个才会被安装，被超越的响应直接忽略。

use tracing::{info, warn};

use crate::error::SessionError;
use crate::models::question::QuestionRecord;
use crate::models::session::QuizSession;

/// 出题参数（学段、年级、学期、科目、难度、数量）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    pub school: String,
    pub grade: String,
    pub semester: String,
    pub subject: String,
    pub difficulty: String,
    pub count: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            school: "初中".to_string(),
            grade: "初一".to_string(),
            semester: "上学期".to_string(),
            subject: "数学".to_string(),
            difficulty: "中等".to_string(),
            count: 5,
        }
    }
}

/// 一次生成请求的票据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket(u64);

/// 会话上下文
#[derive(Debug, Default)]
pub struct SessionContext {
    pub params: GenerationParams,
    session: Option<QuizSession>,
    generation_seq: u64,
}

impl SessionContext {
    pub fn new(params: GenerationParams) -> Self {
        Self {
            params,
            session: None,
            generation_seq: 0,
        }
    }

    /// 领取一张生成票据，同时使所有在途的旧请求失效
    pub fn begin_generation(&mut self) -> GenerationTicket {
        self.generation_seq += 1;
        GenerationTicket(self.generation_seq)
    }

    /// 安装生成结果
    ///
    /// 票据已过期（期间有更新的生成请求发出）时忽略本次结果并返回 false
    pub fn install_questions(
        &mut self,
        ticket: GenerationTicket,
        questions: Vec<QuestionRecord>,
    ) -> Result<bool, SessionError> {
        if ticket.0 != self.generation_seq {
            warn!("忽略已被超越的生成结果 (票据 {} / 当前 {})", ticket.0, self.generation_seq);
            return Ok(false);
        }
        info!("安装 {} 道题目，开启新会话", questions.len());
        self.session = Some(QuizSession::start(questions)?);
        Ok(true)
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut QuizSession> {
        self.session.as_mut()
    }

    /// 丢弃当前会话，参数保留
    pub fn reset(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionRecord;

    fn questions(n: usize) -> Vec<QuestionRecord> {
        (0..n).map(|_| QuestionRecord::placeholder()).collect()
    }

    #[test]
    fn test_install_with_current_ticket() {
        let mut ctx = SessionContext::new(GenerationParams::default());
        let ticket = ctx.begin_generation();
        assert!(ctx.install_questions(ticket, questions(3)).unwrap());
        assert_eq!(ctx.session().unwrap().total(), 3);
    }

    #[test]
    fn test_superseded_ticket_is_ignored() {
        let mut ctx = SessionContext::new(GenerationParams::default());
        let stale = ctx.begin_generation();
        let fresh = ctx.begin_generation();

        // 旧请求先返回：被忽略，会话不变
        assert!(!ctx.install_questions(stale, questions(2)).unwrap());
        assert!(ctx.session().is_none());

        // 新请求返回：正常安装
        assert!(ctx.install_questions(fresh, questions(4)).unwrap());
        assert_eq!(ctx.session().unwrap().total(), 4);
    }

    #[test]
    fn test_install_rejects_empty_questions() {
        let mut ctx = SessionContext::new(GenerationParams::default());
        let ticket = ctx.begin_generation();
        assert!(ctx.install_questions(ticket, Vec::new()).is_err());
    }

    #[test]
    fn test_reset_drops_session_keeps_params() {
        let params = GenerationParams {
            subject: "历史".to_string(),
            ..GenerationParams::default()
        };
        let mut ctx = SessionContext::new(params.clone());
        let ticket = ctx.begin_generation();
        ctx.install_questions(ticket, questions(1)).unwrap();

        ctx.reset();
        assert!(ctx.session().is_none());
        assert_eq!(ctx.params, params);
    }
}
