//! # 复制内容选择
//!
//! 用户可以复制纯 Base64（`raw`）或完整 Data URL（`dataUrl`）。
//! 选择结果就是展示区渲染和写入剪贴板的字符串；启用换行时再经过 `wrap`。

use serde::{Deserialize, Serialize};

use super::source::ImageInfo;
use super::wrap::wrap;
use super::EncodeError;

/// 复制模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CopyMode {
    /// 仅 Base64 负载，不含 `data:...;base64,` 头。
    #[default]
    Raw,
    /// 完整 Data URL，可直接用于 `<img src>`。
    DataUrl,
}

impl CopyMode {
    /// 从前端字符串解析复制模式。
    ///
    /// # 示例
    /// ```rust
    /// use image_base64_encoder::encoder::CopyMode;
    ///
    /// assert_eq!(CopyMode::from_str("dataUrl")?, CopyMode::DataUrl);
    /// assert_eq!(CopyMode::from_str(" RAW ")?, CopyMode::Raw);
    /// # Ok::<(), image_base64_encoder::encoder::EncodeError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(mode: &str) -> Result<Self, EncodeError> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "raw" | "base64" => Ok(Self::Raw),
            "dataurl" | "data-url" | "data_url" => Ok(Self::DataUrl),
            other => Err(EncodeError::InvalidConfig(format!(
                "未知复制模式：{}（可选：raw / dataUrl）",
                other
            ))),
        }
    }

    /// 稳定字符串，供前端展示与持久化。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::DataUrl => "dataUrl",
        }
    }
}

/// 按模式选出要展示/复制的字符串。无副作用。
pub fn select_payload(info: &ImageInfo, mode: CopyMode) -> &str {
    match mode {
        CopyMode::Raw => info.base64_string(),
        CopyMode::DataUrl => info.data_url(),
    }
}

/// 选出负载并按需换行。`wrap_width` 为 `None` 时不换行。
pub fn format_payload(info: &ImageInfo, mode: CopyMode, wrap_width: Option<usize>) -> String {
    let payload = select_payload(info, mode);
    match wrap_width {
        Some(width) => wrap(payload, width),
        None => payload.to_string(),
    }
}
