use thiserror::Error;

/// 单个题目抽取过程中的错误分类
///
/// 除 `SurfaceUnavailable` 外，所有错误都只影响当前题目，
/// 不会中断整轮抽取。
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 字段的策略链全部失败（非致命，字段取默认值）
    #[error("字段未找到: {field}")]
    NotFound { field: &'static str },

    /// 在限定时间内未能切换到目标题目
    #[error("无法定位题目 {id}: {reason}")]
    NavigationFailed { id: u32, reason: String },

    /// 等待页面稳定超时
    #[error("等待页面渲染超时 (题目 {id}, {waited_ms}ms)")]
    TransientRenderTimeout { id: u32, waited_ms: u64 },

    /// 记录或图片写入失败
    #[error("文件写入失败 ({path}): {source}")]
    IoFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 图片下载失败（调用方回退到默认图片）
    #[error("图片下载失败 ({url}): {reason}")]
    ResourceFetchFailure { url: String, reason: String },

    /// 页面完全不可达，唯一的致命错误
    #[error("页面不可用: {0}")]
    SurfaceUnavailable(String),
}

impl ExtractError {
    /// 是否需要终止整轮抽取
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExtractError::SurfaceUnavailable(_))
    }

    pub fn io_failure(path: impl Into<String>, source: std::io::Error) -> Self {
        ExtractError::IoFailure {
            path: path.into(),
            source,
        }
    }
}

/// 渲染页面（外部协作方）返回的错误
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// 脚本执行失败
    #[error("执行脚本失败: {0}")]
    Script(String),

    /// 返回值无法解析
    #[error("页面返回值解析失败: {0}")]
    Decode(#[from] serde_json::Error),

    /// 浏览器连接已断开
    #[error("浏览器连接不可用: {0}")]
    Disconnected(String),
}

impl From<chromiumoxide::error::CdpError> for SurfaceError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        SurfaceError::Script(err.to_string())
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 语言代码不在支持范围内
    #[error("不支持的语言代码: '{0}' (可选: uz, ru, uzk)")]
    UnknownLanguage(String),

    /// 题目范围格式错误
    #[error("题目范围格式错误: '{0}' (示例: 7 或 17-75)")]
    InvalidIdRange(String),

    /// 题目范围过大
    #[error("题目范围过大: '{input}' 共 {count} 个，单轮最多 {max} 个")]
    IdRangeTooLarge { input: String, count: u64, max: u32 },

    /// 配置文件读取失败
    #[error("无法读取配置文件 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 抽取流程结果类型
pub type ExtractResult<T> = Result<T, ExtractError>;

/// 页面操作结果类型
pub type SurfaceResult<T> = Result<T, SurfaceError>;
