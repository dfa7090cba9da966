//! 结果摘要：结果页展示的文件信息与编码统计。

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use serde::Serialize;

use super::source::ImageInfo;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// 人类可读的文件体积，例如 `1.5 KB`。
///
/// 以 1024 为进制，保留两位小数并去掉末尾的 0。
///
/// # 示例
/// ```rust
/// use image_base64_encoder::encoder::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(1024 * 1024), "1 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{:.2}", scaled);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// 结果页摘要。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub size_label: String,
    /// 像素尺寸；格式无法识别（如 SVG）时为 `None`。
    pub dimensions: Option<(u32, u32)>,
    pub base64_length: usize,
    pub data_url_length: usize,
}

impl ImageSummary {
    pub fn from_info(info: &ImageInfo) -> Self {
        let file = info.file();
        Self {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
            size_label: format_file_size(file.size),
            dimensions: probe_dimensions(info.base64_string()),
            base64_length: info.base64_string().len(),
            data_url_length: info.data_url().len(),
        }
    }
}

fn probe_dimensions(base64_string: &str) -> Option<(u32, u32)> {
    let bytes = general_purpose::STANDARD.decode(base64_string).ok()?;
    let dimensions = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions();

    match dimensions {
        Ok(dims) => Some(dims),
        Err(e) => {
            log::debug!("📐 无法读取图片尺寸：{}", e);
            None
        }
    }
}
