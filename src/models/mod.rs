//! 数据模型层
//!
//! 只定义数据结构和围绕自身状态的操作，不发起任何网络请求

pub mod evaluation;
pub mod question;
pub mod session;

pub use evaluation::{EvaluationSection, SectionStyle};
pub use question::{Choice, ChoiceSet, QuestionRecord};
pub use session::{QuizSession, ScoreSummary};
