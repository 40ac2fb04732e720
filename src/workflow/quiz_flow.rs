//! 测验流程 - 流程层
//!
//! 编排完整的测验流程，不持有任何会话状态：
//! 1. 出题：构建生成提示词 → 调用代理 → 解析为题目记录
//! 2. 评估：汇总作答情况 → 调用代理 → 分区化评估内容
//! 3. 优化：构建优化提示词 → 调用代理 → 解析并整体替换记录

use tracing::{info, warn};

use crate::clients::{AiClient, ApiFunction};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::evaluation::EvaluationSection;
use crate::models::question::QuestionRecord;
use crate::models::session::QuizSession;
use crate::services::{EvaluationSectionizer, QuestionParser};
use crate::utils::logging::truncate_text;
use crate::workflow::session_ctx::GenerationParams;

/// 测验流程编排
pub struct QuizFlow {
    client: AiClient,
    parser: QuestionParser,
    sectionizer: EvaluationSectionizer,
    function: ApiFunction,
}

impl QuizFlow {
    /// 创建新的测验流程
    pub fn new(config: &Config) -> Self {
        let function = ApiFunction::parse(&config.api_function).unwrap_or_else(|| {
            warn!("未知的 API 函数 '{}'，回退到 chat", config.api_function);
            ApiFunction::Chat
        });
        Self {
            client: AiClient::new(config),
            parser: QuestionParser::new(),
            sectionizer: EvaluationSectionizer::new(),
            function,
        }
    }

    /// 生成一组题目
    ///
    /// 解析永远成功（至少返回占位题目），因此错误只来自网络层
    pub async fn generate(&self, params: &GenerationParams) -> AppResult<Vec<QuestionRecord>> {
        info!(
            "生成题目: {}{}{}{}，难度 {}，共 {} 道",
            params.school, params.grade, params.semester, params.subject,
            params.difficulty, params.count
        );

        let prompt = build_generation_prompt(params);
        let content = self.client.send(&prompt, self.function).await?;
        let records = self.parser.parse(&content);

        info!("成功解析出 {} 道题目", records.len());
        Ok(records)
    }

    /// 请求对本次测验表现的叙述性评估，并切分为分区
    pub async fn evaluate(&self, session: &QuizSession) -> AppResult<Vec<EvaluationSection>> {
        let prompt = build_evaluation_prompt(session);
        let content = self.client.send(&prompt, self.function).await?;
        Ok(self.sectionizer.sectionize(&content))
    }

    /// 优化一道题目，返回整体替换用的新记录
    pub async fn optimize(
        &self,
        record: &QuestionRecord,
        params: &GenerationParams,
    ) -> AppResult<QuestionRecord> {
        let prompt = build_optimize_prompt(record, params);
        let content = self.client.send(&prompt, self.function).await?;

        self.parser.parse_optimized(&content).ok_or_else(|| {
            warn!("优化响应无法解析，保留原题");
            AppError::Parse {
                message: "无法解析优化后的题目".to_string(),
            }
        })
    }

    /// 清空响应缓存
    pub fn clear_cache(&self) {
        self.client.clear_cache();
    }
}

// ========== 提示词构建 ==========

/// 出题提示词：格式要求、示例格式和质量要求缺一不可，
/// 解析器依赖这里约定的 "题目：/答案：/解析：" 标记
pub fn build_generation_prompt(params: &GenerationParams) -> String {
    format!(
        r#"请为{school}{grade}{semester}{subject}生成{count}道{difficulty}难度的选择题，每道题有4个选项(A,B,C,D)，并且只有一个正确答案。

题目格式要求：
1. 每道题必须包含题目、4个选项、答案和详细解析
2. 题目必须按顺序编号
3. 选项必须使用A、B、C、D标记
4. 每道题的答案必须是A、B、C、D中的一个
5. 每道题必须有详细解析
6. "答案："后接正确选项（必须是A、B、C、D其中之一）
7. "解析："后必须包含完整的解析（至少50字）

解析部分必须包含以下内容（缺一不可）：
1. 解题思路和方法，不能超纲
2. 关键知识点解释
3. 正确答案的推导过程
4. 为什么其他选项是错误的
5. 相关知识点的总结
6. 易错点提醒

示例格式：
题目：[题目内容]
A. [选项A内容]
B. [选项B内容]
C. [选项C内容]
D. [选项D内容]
答案：[A或B或C或D]
解析：本题主要考察[知识点]。解题思路是[详细说明]。首先，[推导过程]。选项分析：A选项[分析]，B选项[分析]，C选项[分析]，D选项[分析]。需要注意的是[易错点]。总的来说，[知识点总结]。同学们在解题时要特别注意[关键提醒]。

题目质量要求：
1. 题目表述必须清晰、准确，无歧义
2. 选项内容必须完整，符合逻辑
3. 所有选项必须有实际意义，不能有无意义的干扰项
4. 难度必须符合年级水平
5. 解析必须详尽，有教育意义
6. 不出带图形的题目
"#,
        school = params.school,
        grade = params.grade,
        semester = params.semester,
        subject = params.subject,
        count = params.count,
        difficulty = params.difficulty,
    )
}

/// 评估提示词：测试统计 + 逐题作答详情
pub fn build_evaluation_prompt(session: &QuizSession) -> String {
    let summary = session.score();

    let question_lines: Vec<String> = session
        .questions()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let user_answer = session
                .answer_at(index)
                .map(|c| c.to_string())
                .unwrap_or_else(|| "未作答".to_string());
            let is_correct = session.answer_at(index) == Some(question.answer);
            format!(
                "{}. {} - {} (我的答案: {}, 正确答案: {})",
                index + 1,
                truncate_text(question.stem(), 50),
                if is_correct { "正确" } else { "错误" },
                user_answer,
                question.answer,
            )
        })
        .collect();

    format!(
        r#"
我刚完成了一个测试，请根据我的表现给出评估和建议。

测试信息：
- 总题数: {}
- 正确数: {}
- 正确率: {:.1}%

题目详情：
{}

请提供以下内容：
1. 对我的表现的总体评价
2. 我的优势和不足
3. 针对性的学习建议
4. 如何提高我的弱项
5. 下一步学习计划建议

请用鼓励的语气，并给出具体、实用的建议。
"#,
        summary.total,
        summary.correct,
        summary.percentage,
        question_lines.join("\n"),
    )
}

/// 优化提示词：按学段附加不同的教学指导
pub fn build_optimize_prompt(record: &QuestionRecord, params: &GenerationParams) -> String {
    let mut prompt = format!(
        r#"请优化以下{school}{grade}{subject}的题目，使其更清晰、更有教育价值，并确保答案和解析准确：

问题：{question}
选项：
A. {a}
B. {b}
C. {c}
D. {d}
答案：{answer}
解析：{explanation}"#,
        school = params.school,
        grade = params.grade,
        subject = params.subject,
        question = record.stem(),
        a = record.choices.a,
        b = record.choices.b,
        c = record.choices.c,
        d = record.choices.d,
        answer = record.answer,
        explanation = record.explanation,
    );

    let guidance = match params.school.as_str() {
        "小学" => Some(format!(
            r#"请特别注意：
1. 使用简单、直观的语言，适合{grade}学生的理解水平
2. 确保题目内容符合{grade}{subject}教学大纲
3. 解析应该循序渐进，使用具体例子帮助理解
4. 避免使用过于抽象的概念
5. 增加趣味性和生活化的元素"#,
            grade = params.grade,
            subject = params.subject,
        )),
        "初中" => Some(format!(
            r#"请特别注意：
1. 使用清晰但稍有挑战性的语言，适合{grade}学生
2. 确保题目内容符合{grade}{subject}教学大纲
3. 解析应该既有基础知识点讲解，也有思维方法指导
4. 可以适当引入抽象概念，但需要配合具体例子
5. 增加与实际应用相关的内容"#,
            grade = params.grade,
            subject = params.subject,
        )),
        "高中" => Some(format!(
            r#"请特别注意：
1. 使用准确、规范的学科语言，适合{grade}学生
2. 确保题目内容符合{grade}{subject}教学大纲和考试要求
3. 解析应该深入分析解题思路和方法，强调知识点间的联系
4. 可以使用较为抽象的概念和复杂的推理
5. 增加与升学考试相关的解题技巧和方法"#,
            grade = params.grade,
            subject = params.subject,
        )),
        _ => None,
    };

    if let Some(guidance) = guidance {
        prompt.push_str("\n\n");
        prompt.push_str(&guidance);
    }

    prompt.push_str(
        r#"

请返回优化后的问题、选项、答案和解析，格式如下：
问题：[优化后的问题]
选项：
A. [选项A]
B. [选项B]
C. [选项C]
D. [选项D]
答案：[答案]
解析：[解析]"#,
    );

    prompt
}
