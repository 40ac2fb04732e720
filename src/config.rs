/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// AI 代理服务的基础 URL（不含 /api 前缀）
    pub api_base_url: String,
    /// 默认使用的 API 函数（chat / simple-ai / streaming-ai）
    pub api_function: String,
    /// 默认模型名称
    pub model_name: String,
    /// 单次请求的超时时间（秒）
    pub request_timeout_secs: u64,
    /// 生成时的温度参数
    pub temperature: f32,
    /// 单次请求的最大 token 数
    pub max_tokens: u32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 会话日志文件
    pub session_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8888".to_string(),
            api_function: "chat".to_string(),
            model_name: "deepseek-r1".to_string(),
            request_timeout_secs: 90,
            temperature: 0.7,
            max_tokens: 2000,
            verbose_logging: false,
            session_log_file: "session.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            api_function: std::env::var("API_FUNCTION").unwrap_or(default.api_function),
            model_name: std::env::var("API_MODEL").unwrap_or(default.model_name),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            temperature: std::env::var("TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.temperature),
            max_tokens: std::env::var("MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_tokens),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            session_log_file: std::env::var("SESSION_LOG_FILE").unwrap_or(default.session_log_file),
        }
    }
}
