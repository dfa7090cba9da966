//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `EncoderConfig`：可选的读取体积上限、换行展示、默认复制模式、
//! 剪贴板写入重试。配置以 `Arc<RwLock<_>>` 共享，单次请求使用同一份快照，
//! 并通过 `serde` 以 JSON 形式持久化（见 `settings` 模块）。
//!
//! ## 实现思路
//!
//! - `Default` 提供与原网页版一致的行为：不限体积、不换行、复制纯 Base64、76 列宽。
//! - `validate` 在写入共享配置前统一校验，拒绝无意义的组合。
//! - 反序列化时缺失字段回退到默认值，旧版本设置文件可直接加载。

use serde::{Deserialize, Serialize};

use super::selector::CopyMode;
use super::wrap::DEFAULT_WRAP_WIDTH;
use super::EncodeError;

/// 图片编码配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncoderConfig {
    /// 允许读取的最大文件体积（字节），`None` 表示不限制。
    pub max_file_size: Option<u64>,
    /// 展示/复制时是否按固定列宽换行。
    pub wrap_enabled: bool,
    /// 换行列宽（字符数）。
    pub wrap_width: usize,
    /// 默认复制模式。
    pub copy_mode: CopyMode,
    /// 是否对读取到的内容做文件签名（magic bytes）校验。
    ///
    /// 关闭时仅信任声明的 MIME 类型，与浏览器行为一致。
    pub verify_signature: bool,
    /// 写入剪贴板失败时最大尝试次数。
    pub clipboard_retries: u32,
    /// 重试基础间隔（毫秒）。
    pub clipboard_retry_delay_ms: u64,
    /// 单次退避延迟上限（毫秒）。
    pub clipboard_retry_max_delay_ms: u64,
    /// 单次写入流程允许的总重试预算（毫秒）。
    pub clipboard_retry_max_total_ms: u64,
    /// “已复制”提示的展示时长（毫秒），随复制回执返回给前端。
    pub copy_ack_ms: u64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_file_size: None,
            wrap_enabled: false,
            wrap_width: DEFAULT_WRAP_WIDTH,
            copy_mode: CopyMode::Raw,
            verify_signature: false,
            clipboard_retries: 3,
            clipboard_retry_delay_ms: 100,
            clipboard_retry_max_delay_ms: 900,
            clipboard_retry_max_total_ms: 1_800,
            copy_ack_ms: 2_000,
        }
    }
}

impl EncoderConfig {
    /// 校验配置组合是否合法。
    ///
    /// # 示例
    /// ```rust
    /// use image_base64_encoder::encoder::EncoderConfig;
    ///
    /// let mut config = EncoderConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.wrap_enabled = true;
    /// config.wrap_width = 0;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.max_file_size == Some(0) {
            return Err(EncodeError::InvalidConfig("maxFileSize 必须大于 0".to_string()));
        }
        if self.wrap_enabled && self.wrap_width == 0 {
            return Err(EncodeError::InvalidConfig(
                "启用换行时 wrapWidth 必须大于 0".to_string(),
            ));
        }
        if self.clipboard_retries == 0 {
            return Err(EncodeError::InvalidConfig(
                "clipboardRetries 至少为 1".to_string(),
            ));
        }
        if !(10..=5_000).contains(&self.clipboard_retry_max_delay_ms) {
            return Err(EncodeError::InvalidConfig(
                "clipboardRetryMaxDelayMs 必须在 10~5000 毫秒之间".to_string(),
            ));
        }
        if !(200..=30_000).contains(&self.clipboard_retry_max_total_ms) {
            return Err(EncodeError::InvalidConfig(
                "clipboardRetryMaxTotalMs 必须在 200~30000 毫秒之间".to_string(),
            ));
        }
        if self.clipboard_retry_max_delay_ms > self.clipboard_retry_max_total_ms {
            return Err(EncodeError::InvalidConfig(
                "clipboardRetryMaxDelayMs 不能大于 clipboardRetryMaxTotalMs".to_string(),
            ));
        }
        Ok(())
    }

    /// 当前生效的换行列宽；未启用换行时为 `None`。
    pub fn effective_wrap_width(&self) -> Option<usize> {
        if self.wrap_enabled && self.wrap_width > 0 {
            Some(self.wrap_width)
        } else {
            None
        }
    }
}
