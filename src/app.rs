//! 应用主结构 - 编排层
//!
//! 终端交互式测验：生成题目后进入答题循环，渲染只读取会话模型，
//! 所有状态变更都经由 SessionContext。

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::evaluation::EvaluationSection;
use crate::models::question::Choice;
use crate::models::session::QuizSession;
use crate::utils::logging;
use crate::workflow::{GenerationParams, QuizFlow, SessionContext};

/// 应用主结构
pub struct App {
    config: Config,
    flow: QuizFlow,
    ctx: SessionContext,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_session_log(&config.session_log_file)?;
        logging::log_startup(&config.model_name, &config.api_function);

        let flow = QuizFlow::new(&config);
        let ctx = SessionContext::new(GenerationParams::default());

        Ok(Self { config, flow, ctx })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        self.ctx.params = read_params(&mut lines)?;
        self.generate(&mut lines).await?;

        loop {
            let Some(session) = self.ctx.session() else {
                warn!("当前没有会话，重新生成题目");
                self.generate(&mut lines).await?;
                continue;
            };
            render_question(session);

            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else { break };
            let command = line?.trim().to_string();

            match command.to_uppercase().as_str() {
                "A" | "B" | "C" | "D" => self.submit(&command),
                "N" => self.navigate(1),
                "P" => self.navigate(-1),
                "S" => self.show_score(),
                "E" => self.evaluate().await,
                "O" => self.optimize().await,
                "R" => {
                    self.ctx.reset();
                    self.generate(&mut lines).await?;
                }
                "Q" => break,
                "" => {}
                other => println!("未知命令: {}（可用: A-D 作答, n/p 翻题, s 得分, e 评估, o 优化, r 重新生成, q 退出）", other),
            }
        }

        info!("会话结束");
        Ok(())
    }

    /// 生成题目并安装新会话；失败时提示重试，不中断程序
    async fn generate(
        &mut self,
        lines: &mut impl Iterator<Item = io::Result<String>>,
    ) -> Result<()> {
        loop {
            let ticket = self.ctx.begin_generation();
            match self.flow.generate(&self.ctx.params).await {
                Ok(questions) => {
                    let installed = self.ctx.install_questions(ticket, questions)?;
                    if installed {
                        if let Some(session) = self.ctx.session() {
                            println!("✅ 成功生成了 {} 道题目\n", session.total());
                            if self.config.verbose_logging {
                                for question in session.questions() {
                                    info!("题目: {}", logging::truncate_text(question.stem(), 80));
                                }
                            }
                        }
                    }
                    return Ok(());
                }
                Err(e) => {
                    report_error(&e);
                    println!("按回车重试，输入 q 退出");
                    match lines.next() {
                        Some(line) => {
                            if line?.trim().eq_ignore_ascii_case("q") {
                                anyhow::bail!("生成题目失败，用户选择退出");
                            }
                        }
                        None => anyhow::bail!("输入结束"),
                    }
                }
            }
        }
    }

    fn submit(&mut self, input: &str) {
        let Some(choice) = Choice::find(&input.to_uppercase()) else {
            return;
        };
        let Some(session) = self.ctx.session_mut() else {
            return;
        };
        match session.submit(choice) {
            Ok(()) => {
                let question = session.current_question();
                if question.answer == choice {
                    println!("✅ 回答正确！");
                } else {
                    println!("❌ 回答错误，正确答案是 {}", question.answer);
                }
                println!("解析：{}\n", question.explanation);
            }
            Err(e) => println!("⚠️ {}\n", e),
        }
    }

    fn navigate(&mut self, delta: i64) {
        if let Some(session) = self.ctx.session_mut() {
            session.go_to(delta);
        }
    }

    fn show_score(&self) {
        let Some(session) = self.ctx.session() else {
            return;
        };
        let summary = session.score();
        let answered = (0..session.total())
            .filter(|&i| session.answer_at(i).is_some())
            .count();

        println!("{}", "─".repeat(40));
        println!("已作答: {}/{}", answered, summary.total);
        println!(
            "成绩: {}/{} 正确，正确率 {:.1}%",
            summary.correct, summary.total, summary.percentage
        );
        println!("{}\n", "─".repeat(40));
    }

    async fn evaluate(&mut self) {
        let Some(session) = self.ctx.session() else {
            return;
        };
        if !session.is_complete() {
            println!("⚠️ 还有题目未作答，完成全部题目后再请求评估\n");
            return;
        }

        println!("⏳ 正在获取评估...");
        match self.flow.evaluate(session).await {
            Ok(sections) => render_evaluation(&sections),
            Err(e) => report_error(&e),
        }
    }

    async fn optimize(&mut self) {
        let Some(session) = self.ctx.session() else {
            return;
        };
        let current = session.current_question().clone();

        println!("⏳ 正在优化当前题目...");
        match self.flow.optimize(&current, &self.ctx.params).await {
            Ok(optimized) => {
                if let Some(session) = self.ctx.session_mut() {
                    session.replace_current(optimized);
                    println!(
                        "✅ 问题已根据{}{}{}教学要求成功优化！\n",
                        self.ctx.params.school, self.ctx.params.grade, self.ctx.params.subject
                    );
                }
            }
            Err(e) => report_error(&e),
        }
    }
}

// ========== 渲染（模型到终端的纯投影） ==========

fn render_question(session: &QuizSession) {
    let question = session.current_question();
    println!(
        "第 {}/{} 题  {}",
        session.current_index() + 1,
        session.total(),
        question.question_text
    );
    for (choice, text) in question.choices.iter() {
        println!("  {}. {}", choice, text);
    }
    if let Some(answer) = session.answer_at(session.current_index()) {
        println!("  （已作答: {}）", answer);
    }
}

fn render_evaluation(sections: &[EvaluationSection]) {
    for section in sections {
        println!("\n## {}", section.title);
        println!("{}", section.body);
    }
    println!();
}

fn report_error(error: &AppError) {
    match error {
        AppError::Api { status, body } => {
            error!("API 调用失败，状态码 {}: {}", status, body)
        }
        _ => error!("{}", error),
    }
    println!("❌ {}，请重试\n", error);
}

// ========== 参数输入 ==========

/// 交互式读取出题参数，空输入使用默认值
fn read_params(lines: &mut impl Iterator<Item = io::Result<String>>) -> Result<GenerationParams> {
    let defaults = GenerationParams::default();

    let mut read_one = |label: &str, default: &str| -> Result<String> {
        print!("{} [{}]: ", label, default);
        io::stdout().flush()?;
        match lines.next() {
            Some(line) => {
                let line = line?;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    Ok(default.to_string())
                } else {
                    Ok(trimmed.to_string())
                }
            }
            None => Ok(default.to_string()),
        }
    };

    let school = read_one("学段", &defaults.school)?;
    let grade = read_one("年级", &defaults.grade)?;
    let semester = read_one("学期", &defaults.semester)?;
    let subject = read_one("科目", &defaults.subject)?;
    let difficulty = read_one("难度", &defaults.difficulty)?;
    let count = read_one("题目数量", &defaults.count.to_string())?
        .parse()
        .unwrap_or(defaults.count);

    Ok(GenerationParams {
        school,
        grade,
        semester,
        subject,
        difficulty,
        count,
    })
}
