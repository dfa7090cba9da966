//! # 数据源与领域模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“编码结果”解耦：
//! - `ImageFile` 表示用户拖入或选择的文件句柄（声明类型 + 体积 + 可读内容）
//! - `FileMeta` 是结果展示需要的原文件属性
//! - `ImageInfo` 是唯一的领域实体，保证 `base64_string` 恰为 `data_url` 首个逗号之后的部分

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncReadExt;

use super::EncodeError;

/// 签名探测读取的最大字节数。
const SIGNATURE_PROBE_BYTES: usize = 8192;

/// 文件内容来源。
#[derive(Debug, Clone)]
pub enum FileContent {
    /// 已在内存中的字节（例如 webview 传来的 `File` 内容）。
    Bytes(Vec<u8>),
    /// 本地文件路径，读取阶段才真正打开。
    Path(PathBuf),
}

/// 待编码的文件句柄。
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    /// 声明的 MIME 类型，未知时为空字符串。
    pub mime_type: String,
    pub size: u64,
    pub content: FileContent,
}

impl ImageFile {
    /// 由内存字节构造文件句柄。
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            content: FileContent::Bytes(bytes),
        }
    }

    /// 由本地路径构造文件句柄。
    ///
    /// 声明类型优先按扩展名推断（与浏览器 `File.type` 一致），
    /// 扩展名未知时再读取文件头做签名探测。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use image_base64_encoder::encoder::ImageFile;
    ///
    /// # async fn demo() -> Result<(), image_base64_encoder::encoder::EncodeError> {
    /// let file = ImageFile::open("/tmp/test.png").await?;
    /// assert_eq!(file.mime_type, "image/png");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, EncodeError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| EncodeError::ReadFailure(format!("无法读取文件信息：{}", e)))?;

        if !metadata.is_file() {
            return Err(EncodeError::ReadFailure(format!(
                "不是普通文件：{}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mime_type = match mime_from_extension(path) {
            Some(mime) => mime.to_string(),
            None => sniff_mime_from_file(path).await.unwrap_or_default(),
        };

        Ok(Self {
            name,
            mime_type,
            size: metadata.len(),
            content: FileContent::Path(path.to_path_buf()),
        })
    }

    pub fn meta(&self) -> FileMeta {
        FileMeta {
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            size: self.size,
        }
    }

    /// 声明类型是否为图片。
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// 原文件属性。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

/// 编码结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    file: FileMeta,
    data_url: String,
    base64_string: String,
}

impl ImageInfo {
    /// 从 Data URL 构造结果：首个 `,` 之前为头部（丢弃），之后为 Base64 负载。
    pub fn from_data_url(file: FileMeta, data_url: String) -> Result<Self, EncodeError> {
        let (_, payload) = data_url
            .split_once(',')
            .ok_or_else(|| EncodeError::ReadFailure("Data URL 缺少 ',' 分隔符".to_string()))?;
        let base64_string = payload.to_string();

        Ok(Self {
            file,
            data_url,
            base64_string,
        })
    }

    pub fn file(&self) -> &FileMeta {
        &self.file
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn base64_string(&self) -> &str {
        &self.base64_string
    }
}

/// 按扩展名推断声明类型。
fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" | "apng" => "image/png",
        "jpg" | "jpeg" | "jfif" | "pjpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}

async fn sniff_mime_from_file(path: &Path) -> Option<String> {
    let file = tokio::fs::File::open(path).await.ok()?;
    let mut head = Vec::with_capacity(SIGNATURE_PROBE_BYTES);
    file.take(SIGNATURE_PROBE_BYTES as u64)
        .read_to_end(&mut head)
        .await
        .ok()?;

    let kind = infer::get(&head)?;
    log::debug!("🔍 扩展名未知，按文件签名识别为 {}", kind.mime_type());
    Some(kind.mime_type().to_string())
}
