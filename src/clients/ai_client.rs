//! AI 代理客户端
//!
//! 封装所有对聊天补全代理的调用：构建请求体、超时策略、响应缓存。
//! 代理本身是外部协作方（需要 API_KEY / API_BASE_URL 两个服务端密钥，
//! 自带 30 秒的上游超时），这里只依赖它的单一请求/响应契约。
//!
//! 超时不作为错误返回：请求被放弃后返回固定的兜底提示文本。

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::content_extractor::extract_content;

/// 请求超时后的兜底提示
pub const TIMEOUT_FALLBACK_MESSAGE: &str = "请求超时，请稍后重试。";

/// 代理暴露的 API 函数，对应 `/api/{path}` 路径段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiFunction {
    Chat,
    SimpleAi,
    StreamingAi,
}

impl ApiFunction {
    pub fn path(self) -> &'static str {
        match self {
            ApiFunction::Chat => "chat",
            ApiFunction::SimpleAi => "simple-ai",
            ApiFunction::StreamingAi => "streaming-ai",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chat" => Some(ApiFunction::Chat),
            "simple-ai" => Some(ApiFunction::SimpleAi),
            "streaming-ai" => Some(ApiFunction::StreamingAi),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApiFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// 响应缓存：(API 函数, 提示词) -> 已提取的文本
///
/// 进程级、无上限，只能整体清空
#[derive(Debug, Default)]
pub struct ResponseCache {
    inner: Mutex<HashMap<(ApiFunction, String), String>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, function: ApiFunction, prompt: &str) -> Option<String> {
        self.inner
            .lock()
            .ok()?
            .get(&(function, prompt.to_string()))
            .cloned()
    }

    pub fn insert(&self, function: ApiFunction, prompt: &str, content: String) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert((function, prompt.to_string()), content);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut map) = self.inner.lock() {
            map.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// AI 代理客户端
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    cache: ResponseCache,
}

impl AiClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model_name.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.request_timeout_secs),
            cache: ResponseCache::new(),
        }
    }

    /// 发送提示词并返回提取后的文本内容
    ///
    /// - 缓存命中时不发起网络请求
    /// - 超时返回兜底提示文本（Ok），不作为错误
    /// - 非 2xx 响应返回 `AppError::Api`，状态码原样透传
    pub async fn send(&self, prompt: &str, function: ApiFunction) -> AppResult<String> {
        if let Some(cached) = self.cache.get(function, prompt) {
            debug!("缓存命中 ({}), 跳过网络请求", function);
            return Ok(cached);
        }

        let url = format!("{}/api/{}", self.base_url, function.path());
        let body = json!({
            "messages": [{ "role": "user", "content": prompt }],
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        debug!("调用 AI 代理: {}，提示词长度 {} 字符", url, prompt.len());

        let request = self.http.post(&url).json(&body).send();
        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("请求超时（{} 秒），放弃本次请求", self.timeout.as_secs());
                return Ok(TIMEOUT_FALLBACK_MESSAGE.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("AI 代理返回错误状态 {}: {}", status, error_body);
            return Err(AppError::Api {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let data: Value = response.json().await?;
        let content = extract_content(&data);
        debug!("AI 代理调用成功，内容长度 {} 字符", content.len());

        self.cache.insert(function, prompt, content.clone());
        Ok(content)
    }

    /// 清空响应缓存
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_function_paths() {
        assert_eq!(ApiFunction::Chat.path(), "chat");
        assert_eq!(ApiFunction::SimpleAi.path(), "simple-ai");
        assert_eq!(ApiFunction::StreamingAi.path(), "streaming-ai");
    }

    #[test]
    fn test_api_function_parse_roundtrip() {
        for function in [
            ApiFunction::Chat,
            ApiFunction::SimpleAi,
            ApiFunction::StreamingAi,
        ] {
            assert_eq!(ApiFunction::parse(function.path()), Some(function));
        }
        assert_eq!(ApiFunction::parse("unknown"), None);
    }

    #[test]
    fn test_cache_keyed_by_function_and_prompt() {
        let cache = ResponseCache::new();
        cache.insert(ApiFunction::Chat, "你好", "回答一".to_string());
        cache.insert(ApiFunction::SimpleAi, "你好", "回答二".to_string());

        assert_eq!(
            cache.get(ApiFunction::Chat, "你好"),
            Some("回答一".to_string())
        );
        assert_eq!(
            cache.get(ApiFunction::SimpleAi, "你好"),
            Some("回答二".to_string())
        );
        assert_eq!(cache.get(ApiFunction::Chat, "别的提示词"), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_clear() {
        let cache = ResponseCache::new();
        cache.insert(ApiFunction::Chat, "p", "c".to_string());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_cached_send_skips_network() {
        // 缓存命中时不应发起网络请求：指向一个不存在的地址仍能成功返回
        let config = Config {
            api_base_url: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let client = AiClient::new(&config);
        client
            .cache()
            .insert(ApiFunction::Chat, "提示词", "缓存内容".to_string());

        let result = client.send("提示词", ApiFunction::Chat).await.unwrap();
        assert_eq!(result, "缓存内容");
    }

    /// 需要本地运行代理服务，默认忽略：cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_send_against_local_proxy() {
        let config = Config::from_env();
        let client = AiClient::new(&config);

        let content = client
            .send("你好，请介绍一下你自己", ApiFunction::Chat)
            .await
            .expect("代理调用失败");
        assert!(!content.is_empty());
    }
}
