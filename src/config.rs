use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "extractor.toml";

/// 显示正确答案的方式
///
/// 页面约定：选中任意一个选项后，页面会标出正确选项。
/// 这是页面行为而不是我们的算法，页面改版时可以关掉。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealStrategy {
    /// 点击第一个可用选项
    ClickFirstOption,
    /// 不做任何操作
    Disabled,
}

impl std::str::FromStr for RevealStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "click_first_option" => Ok(RevealStrategy::ClickFirstOption),
            "disabled" | "off" | "none" => Ok(RevealStrategy::Disabled),
            other => Err(ConfigError::EnvVarParseFailed {
                var_name: "REVEAL_STRATEGY".to_string(),
                value: other.to_string(),
                expected_type: "click_first_option | disabled".to_string(),
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器调试端口，设置后连接已打开的浏览器，否则启动新浏览器
    pub browser_debug_port: Option<u16>,
    /// 启动新浏览器时是否无头
    pub headless: bool,
    /// 练习页面 URL
    pub target_url: String,
    /// 站点根地址，用于补全相对图片路径
    pub site_base_url: String,
    /// 题目 JSON 存放目录
    pub questions_dir: PathBuf,
    /// 图片缓存目录
    pub images_dir: PathBuf,
    /// 记录中引用图片时使用的路径前缀
    pub image_ref_prefix: String,
    /// 图片文件名前缀
    pub image_file_prefix: String,
    /// 题目图片的路径特征
    pub image_namespace: String,
    /// 语言代码（未设置时交互输入）
    pub language: Option<String>,
    /// 题目范围，如 "7" 或 "1-100"（未设置时交互输入）
    pub id_range: Option<String>,
    /// 切换题目的超时时间
    pub select_timeout_ms: u64,
    /// 等待页面稳定的最长时间
    pub settle_timeout_ms: u64,
    /// 等待页面稳定时的轮询间隔
    pub settle_poll_ms: u64,
    /// 点击选项/解析按钮后的等待时间
    pub action_pause_ms: u64,
    /// 两道题之间的间隔
    pub inter_id_pause_ms: u64,
    /// 图片下载超时（秒）
    pub fetch_timeout_secs: u64,
    pub reveal_strategy: RevealStrategy,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行日志文件
    pub output_log_file: String,
    /// 失败题目记录文件
    pub failure_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: None,
            headless: false,
            target_url: "https://avtoimtihon.uz/practice?ticket=all".to_string(),
            site_base_url: "https://avtoimtihon.uz".to_string(),
            questions_dir: PathBuf::from("parsing").join("questions"),
            images_dir: PathBuf::from("parsing").join("images"),
            image_ref_prefix: "data/images".to_string(),
            image_file_prefix: "ticket_1_q".to_string(),
            image_namespace: "/quiz-images/".to_string(),
            language: None,
            id_range: None,
            select_timeout_ms: 15_000,
            settle_timeout_ms: 5_000,
            settle_poll_ms: 250,
            action_pause_ms: 1_000,
            inter_id_pause_ms: 1_000,
            fetch_timeout_secs: 15,
            reveal_strategy: RevealStrategy::ClickFirstOption,
            verbose_logging: false,
            output_log_file: "parse_log.txt".to_string(),
            failure_log_file: "failed.txt".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 → 配置文件（若存在）→ 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("EXTRACTOR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let base = self;
        // 环境变量优先于文件
        Ok(Self {
            browser_debug_port: match env_parsed::<u16>("BROWSER_DEBUG_PORT", "u16")? {
                Some(port) => Some(port),
                None => base.browser_debug_port,
            },
            headless: env_parsed("HEADLESS", "bool")?.unwrap_or(base.headless),
            target_url: std::env::var("TARGET_URL").unwrap_or(base.target_url),
            site_base_url: std::env::var("SITE_BASE_URL").unwrap_or(base.site_base_url),
            questions_dir: std::env::var("QUESTIONS_DIR").map(PathBuf::from).unwrap_or(base.questions_dir),
            images_dir: std::env::var("IMAGES_DIR").map(PathBuf::from).unwrap_or(base.images_dir),
            image_ref_prefix: base.image_ref_prefix,
            image_file_prefix: base.image_file_prefix,
            image_namespace: base.image_namespace,
            language: std::env::var("EXTRACT_LANGUAGE").ok().or(base.language),
            id_range: std::env::var("EXTRACT_ID_RANGE").ok().or(base.id_range),
            select_timeout_ms: env_parsed("SELECT_TIMEOUT_MS", "u64")?.unwrap_or(base.select_timeout_ms),
            settle_timeout_ms: env_parsed("SETTLE_TIMEOUT_MS", "u64")?.unwrap_or(base.settle_timeout_ms),
            settle_poll_ms: env_parsed("SETTLE_POLL_MS", "u64")?.unwrap_or(base.settle_poll_ms),
            action_pause_ms: env_parsed("ACTION_PAUSE_MS", "u64")?.unwrap_or(base.action_pause_ms),
            inter_id_pause_ms: env_parsed("INTER_ID_PAUSE_MS", "u64")?.unwrap_or(base.inter_id_pause_ms),
            fetch_timeout_secs: env_parsed("FETCH_TIMEOUT_SECS", "u64")?.unwrap_or(base.fetch_timeout_secs),
            reveal_strategy: match std::env::var("REVEAL_STRATEGY") {
                Ok(v) => v.parse()?,
                Err(_) => base.reveal_strategy,
            },
            verbose_logging: env_parsed("VERBOSE_LOGGING", "bool")?.unwrap_or(base.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(base.output_log_file),
            failure_log_file: std::env::var("FAILURE_LOG_FILE").unwrap_or(base.failure_log_file),
        })
    }

    pub fn select_timeout(&self) -> Duration {
        Duration::from_millis(self.select_timeout_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn settle_poll(&self) -> Duration {
        Duration::from_millis(self.settle_poll_ms)
    }

    pub fn action_pause(&self) -> Duration {
        Duration::from_millis(self.action_pause_ms)
    }

    pub fn inter_id_pause(&self) -> Duration {
        Duration::from_millis(self.inter_id_pause_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// 读取并解析环境变量；变量不存在时返回 None，格式错误时报错
fn env_parsed<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
