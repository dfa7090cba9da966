//! # 文件读取适配层
//!
//! ## 设计思路
//!
//! 把“读取整个文件并编码为 Data URL”抽象为可注入的 `DataUrlReader` 能力，
//! 控制器与换行逻辑因此可以脱离真实文件系统独立测试。
//! 适配层本身不持有状态，只做直通：读字节 → 标准 Base64（RFC 4648 字母表、`=` 填充、无换行）。

use std::future::Future;

use base64::{Engine as _, engine::general_purpose};

use super::source::{FileContent, ImageFile};
use super::EncodeError;

/// 声明类型为空时 Data URL 使用的媒体类型。
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// 将文件读取为 Data URL 的能力。
pub trait DataUrlReader: Send + Sync {
    /// 读取完整内容并返回 `data:<mime>;base64,<payload>`。
    ///
    /// 任何底层 I/O 错误都以 `EncodeError::ReadFailure` 返回。
    fn read_as_data_url(
        &self,
        file: &ImageFile,
    ) -> impl Future<Output = Result<String, EncodeError>> + Send;
}

/// 默认实现：内存字节直接编码，路径经 `tokio::fs` 读取。
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformReader;

impl DataUrlReader for PlatformReader {
    async fn read_as_data_url(&self, file: &ImageFile) -> Result<String, EncodeError> {
        match &file.content {
            FileContent::Bytes(bytes) => Ok(encode_data_url(&file.mime_type, bytes)),
            FileContent::Path(path) => {
                log::debug!("📁 读取本地文件 - 路径: {}", path.display());
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| EncodeError::ReadFailure(format!("无法读取图片文件：{}", e)))?;
                Ok(encode_data_url(&file.mime_type, &bytes))
            }
        }
    }
}

/// 将字节编码为 Data URL。
///
/// # 示例
/// ```rust
/// use image_base64_encoder::encoder::encode_data_url;
///
/// assert_eq!(encode_data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
/// assert_eq!(encode_data_url("", b""), "data:application/octet-stream;base64,");
/// ```
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let media_type = if mime_type.trim().is_empty() {
        FALLBACK_MEDIA_TYPE
    } else {
        mime_type
    };
    format!(
        "data:{};base64,{}",
        media_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_bytes_are_encoded_with_padding() {
        let file = ImageFile::from_bytes("test.png", "image/png", vec![0x89, 0x50, 0x4E]);
        let data_url = PlatformReader
            .read_as_data_url(&file)
            .await
            .expect("read should succeed");

        assert_eq!(data_url, "data:image/png;base64,iVBO");

        let one_byte = ImageFile::from_bytes("one.gif", "image/gif", vec![0xFF]);
        let data_url = PlatformReader
            .read_as_data_url(&one_byte)
            .await
            .expect("read should succeed");
        assert!(data_url.ends_with(",/w=="));
    }

    #[tokio::test]
    async fn missing_path_maps_to_read_failure() {
        let file = ImageFile {
            name: "gone.png".to_string(),
            mime_type: "image/png".to_string(),
            size: 10,
            content: FileContent::Path("/definitely/not/here.png".into()),
        };

        let result = PlatformReader.read_as_data_url(&file).await;
        assert!(matches!(result, Err(EncodeError::ReadFailure(_))));
    }

    #[test]
    fn encoded_payload_has_no_line_breaks() {
        let bytes = vec![0xAB_u8; 300];
        let data_url = encode_data_url("image/jpeg", &bytes);
        assert!(!data_url.contains('\n'));
        assert_eq!(data_url.split_once(',').map(|(_, p)| p.len()), Some(400));
    }
}
