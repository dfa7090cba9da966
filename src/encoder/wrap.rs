//! Base64 按固定列宽换行。
//!
//! 纯函数，只影响展示与复制格式，不修改 `ImageInfo` 中保存的字符串。
//! 按“字符数”切分，已有的换行符同样计入字符数，因此对已换行的文本再次换行
//! 会在原有行内插入新的换行（不是幂等的）。

/// MIME（RFC 2045）规定的 Base64 行宽。
pub const DEFAULT_WRAP_WIDTH: usize = 76;

/// 将 `s` 切成每段 `width` 个字符，用单个 `\n` 连接。
///
/// 最后一段可以更短，但不会产生空的尾段。`width == 0` 视为不换行，原样返回。
///
/// # 示例
/// ```rust
/// use image_base64_encoder::encoder::wrap;
///
/// assert_eq!(wrap("abcdefg", 3), "abc\ndef\ng");
/// assert_eq!(wrap("abcdef", 3), "abc\ndef");
/// ```
pub fn wrap(s: &str, width: usize) -> String {
    if width == 0 || s.is_empty() {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + s.len() / width);
    for (idx, ch) in s.chars().enumerate() {
        if idx > 0 && idx % width == 0 {
            out.push('\n');
        }
        out.push(ch);
    }
    out
}
