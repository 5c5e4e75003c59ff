//! 图片缓存服务 - 业务能力层
//!
//! 先查本地缓存，缺失时才下载；下载失败回退到默认占位图，
//! 本地写入失败则如实上报。

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ExtractError, ExtractResult};
use crate::models::ImageRef;
use crate::utils::write_atomically;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_EXTENSION: &str = ".webp";

/// 图片缓存
pub struct ImageCache {
    client: reqwest::Client,
    images_dir: PathBuf,
    /// 记录中引用图片时使用的前缀，如 `data/images`
    ref_prefix: String,
    /// 文件名前缀，如 `ticket_1_q`
    file_prefix: String,
}

impl ImageCache {
    pub fn new(
        images_dir: impl Into<PathBuf>,
        ref_prefix: impl Into<String>,
        file_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            images_dir: images_dir.into(),
            ref_prefix: ref_prefix.into(),
            file_prefix: file_prefix.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.images_dir,
            &config.image_ref_prefix,
            &config.image_file_prefix,
            config.fetch_timeout(),
        )
    }

    /// 取得题目图片的引用
    ///
    /// 没有图片地址或下载失败时返回 [`ImageRef::Default`]；
    /// 下载成功但写不进缓存目录时返回 `IoFailure`，由调用方决定本题失败。
    pub async fn resolve(&self, id: u32, url: Option<&str>) -> ExtractResult<ImageRef> {
        let Some(url) = url else {
            return Ok(ImageRef::Default);
        };

        match self.fetch_cached(id, url).await {
            Ok(image) => Ok(image),
            Err(e @ ExtractError::ResourceFetchFailure { .. }) => {
                warn!("⚠️  题目 {} 图片不可用，使用默认图片: {}", id, e);
                Ok(ImageRef::Default)
            }
            Err(e) => Err(e),
        }
    }

    /// 缓存文件名，如 `ticket_1_q7.webp`
    pub fn file_name(&self, id: u32, url: &str) -> String {
        format!("{}{}{}", self.file_prefix, id, extension_of(url))
    }

    async fn fetch_cached(&self, id: u32, url: &str) -> ExtractResult<ImageRef> {
        let file_name = self.file_name(id, url);
        let path = self.images_dir.join(&file_name);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("🖼️  命中缓存: {}", path.display());
            return Ok(self.reference(&file_name));
        }

        let bytes = self.download(url).await?;
        let mut tmp_name = path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        write_atomically(&path, &PathBuf::from(tmp_name), &bytes).await?;
        info!("🖼️  已下载图片: {} ({} 字节)", file_name, bytes.len());

        Ok(self.reference(&file_name))
    }

    async fn download(&self, url: &str) -> ExtractResult<Vec<u8>> {
        let fetch_failure = |reason: String| ExtractError::ResourceFetchFailure {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_failure(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(fetch_failure(format!("HTTP {}", resp.status())));
        }

        let bytes = resp.bytes().await.map_err(|e| fetch_failure(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn reference(&self, file_name: &str) -> ImageRef {
        ImageRef::Path(format!("{}/{}", self.ref_prefix.trim_end_matches('/'), file_name))
    }
}

/// 从 URL 路径中取扩展名（含点号），取不到时为 `.webp`
pub fn extension_of(url: &str) -> String {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let ext = Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!(".{}", ext.to_ascii_lowercase()),
        None => DEFAULT_EXTENSION.to_string(),
    }
}
