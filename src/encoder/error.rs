//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载“校验 → 读取 → 复制”链路中的所有错误来源。
//! 变体携带的都是字符串载荷，因此错误可以 `Clone` 后存入状态槽
//! （`IntakeState::Failed`），前端随时查询都能拿到同一份错误。

/// 图片编码链路统一错误类型。
///
/// 该类型会在命令层被上转为 `AppError` 或 `EncodeCommandError`，最终透传给前端。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// 声明的 MIME 类型不以 `image/` 开头。
    #[error("文件类型无效，请上传图片（当前类型：{0}）")]
    InvalidFileType(String),

    /// 底层读取失败（I/O、权限、流损坏）。
    #[error("读取文件失败，请重试：{0}")]
    ReadFailure(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    /// 剪贴板写入被平台拒绝。
    #[error("剪贴板写入失败：{0}")]
    ClipboardWriteFailure(String),

    /// 剪贴板被其他进程占用，重试预算耗尽。
    #[error("剪贴板繁忙：{0}")]
    ClipboardBusy(String),

    #[error("当前没有可复制的图片")]
    NothingToCopy,

    #[error("配置错误：{0}")]
    InvalidConfig(String),

    /// 读取完成时已有更新的提交（或已清空），结果被丢弃。
    #[error("读取结果已过期（第 {0} 次提交）")]
    Superseded(u64),

    #[error("内部错误：{0}")]
    Internal(String),
}

impl EncodeError {
    /// 稳定错误码，供前端按分支处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFileType(_) => "INVALID_FILE_TYPE",
            Self::ReadFailure(_) => "READ_FAILURE",
            Self::ResourceLimit(_) => "RESOURCE_LIMIT",
            Self::ClipboardWriteFailure(_) => "CLIPBOARD_WRITE_FAILURE",
            Self::ClipboardBusy(_) => "CLIPBOARD_BUSY",
            Self::NothingToCopy => "NOTHING_TO_COPY",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Superseded(_) => "SUPERSEDED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// 出错阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidFileType(_) | Self::ResourceLimit(_) => "validate",
            Self::ReadFailure(_) | Self::Superseded(_) => "read",
            Self::ClipboardWriteFailure(_) | Self::ClipboardBusy(_) | Self::NothingToCopy => "copy",
            Self::InvalidConfig(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// 是否应当写入状态槽展示给用户。
    ///
    /// 过期结果与剪贴板错误不会改变当前展示的图片或错误。
    pub(crate) fn is_intake_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidFileType(_) | Self::ReadFailure(_) | Self::ResourceLimit(_)
        )
    }
}
