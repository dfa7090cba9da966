//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `EncoderService` 作为 Tauri 注入状态，替代全局单例函数。
//! 好处：
//! 1. 生命周期清晰（由 `main.rs` 统一管理）
//! 2. 测试可注入假的读取器与剪贴板，减少共享状态副作用
//! 3. 控制器与服务共享同一份 `Arc<RwLock<EncoderConfig>>`，切换设置即时生效
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `submit` / `submit_path` / `submit_first`：接收文件
//! - `clear`：对应“Encode Another”
//! - `render_payload` / `copy_to_clipboard`：按模式与换行设置输出
//! - `config_snapshot` / `update_config`：读取与更新设置

use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::task::JoinHandle;

use super::clipboard_writer::{ClipboardSink, SystemClipboard, copy_text_with_retry};
use super::reader::{DataUrlReader, PlatformReader};
use super::selector::{CopyMode, format_payload};
use super::source::{ImageFile, ImageInfo};
use super::state::IntakeState;
use super::summary::ImageSummary;
use super::{EncodeError, EncoderConfig, IntakeController};

/// 复制回执，前端据此展示“已复制”提示。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyReceipt {
    pub mode: CopyMode,
    pub wrapped: bool,
    pub chars: usize,
    /// 提示展示时长（毫秒）。
    pub ack_ms: u64,
}

/// 图片编码服务。
pub struct EncoderService<R = PlatformReader, C = SystemClipboard> {
    controller: IntakeController<R>,
    clipboard: Arc<C>,
    config: Arc<RwLock<EncoderConfig>>,
}

impl EncoderService {
    /// 使用默认配置、真实文件系统与系统剪贴板创建服务。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use image_base64_encoder::encoder::EncoderService;
    ///
    /// # async fn demo() -> Result<(), image_base64_encoder::encoder::EncodeError> {
    /// let service = EncoderService::new();
    /// service.submit_path("/tmp/test.png").await?;
    /// service.copy_to_clipboard(None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    /// 使用自定义配置创建服务（例如从设置文件加载）。
    pub fn with_config(config: EncoderConfig) -> Self {
        Self::with_parts(PlatformReader, SystemClipboard, config)
    }
}

impl Default for EncoderService {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, C> EncoderService<R, C>
where
    R: DataUrlReader + 'static,
    C: ClipboardSink,
{
    /// 注入读取器与剪贴板实现。
    pub fn with_parts(reader: R, clipboard: C, config: EncoderConfig) -> Self {
        let config = Arc::new(RwLock::new(config));
        Self {
            controller: IntakeController::with_shared_config(reader, Arc::clone(&config)),
            clipboard: Arc::new(clipboard),
            config,
        }
    }

    pub fn controller(&self) -> &IntakeController<R> {
        &self.controller
    }

    pub async fn submit(&self, file: ImageFile) -> Result<ImageInfo, EncodeError> {
        self.controller.submit(file).await
    }

    /// 提交本地文件。打开失败同样记为读取失败并写入状态槽。
    pub async fn submit_path(&self, path: impl AsRef<Path>) -> Result<ImageInfo, EncodeError> {
        self.controller.submit_path(path).await
    }

    /// 拖放多个路径时只处理第一个；空列表不做任何事。
    pub async fn submit_first_path<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Option<Result<ImageInfo, EncodeError>> {
        if paths.len() > 1 {
            log::debug!("📚 收到 {} 个路径，仅处理第一个", paths.len());
        }
        let first = paths.first()?;
        Some(self.submit_path(first).await)
    }

    pub async fn submit_first(
        &self,
        files: Vec<ImageFile>,
    ) -> Option<Result<ImageInfo, EncodeError>> {
        self.controller.submit_first(files).await
    }

    pub fn spawn_submit(
        &self,
        file: ImageFile,
    ) -> Result<JoinHandle<Result<ImageInfo, EncodeError>>, EncodeError> {
        self.controller.spawn_submit(file)
    }

    pub fn clear(&self) -> Result<(), EncodeError> {
        self.controller.clear()
    }

    pub fn state(&self) -> Result<IntakeState, EncodeError> {
        self.controller.state()
    }

    pub fn summary(&self) -> Result<Option<ImageSummary>, EncodeError> {
        Ok(self.controller.current()?.as_ref().map(ImageSummary::from_info))
    }

    /// 按模式（缺省用配置中的模式）与换行设置生成展示字符串。
    pub fn render_payload(&self, mode: Option<CopyMode>) -> Result<Option<String>, EncodeError> {
        let config = self.config_snapshot()?;
        let mode = mode.unwrap_or(config.copy_mode);
        Ok(self
            .controller
            .current()?
            .map(|info| format_payload(&info, mode, config.effective_wrap_width())))
    }

    /// 将当前结果写入系统剪贴板。
    ///
    /// 失败只记录日志并返回错误，不改动当前结果。
    pub async fn copy_to_clipboard(&self, mode: Option<CopyMode>) -> Result<CopyReceipt, EncodeError> {
        let config = self.config_snapshot()?;
        let mode = mode.unwrap_or(config.copy_mode);
        let info = self.controller.current()?.ok_or(EncodeError::NothingToCopy)?;
        let wrap_width = config.effective_wrap_width();
        let text = format_payload(&info, mode, wrap_width);
        let chars = text.chars().count();

        if let Err(err) = copy_text_with_retry(Arc::clone(&self.clipboard), text, &config).await {
            log::warn!("📋 复制到剪贴板失败：{}", err);
            return Err(err);
        }

        Ok(CopyReceipt {
            mode,
            wrapped: wrap_width.is_some(),
            chars,
            ack_ms: config.copy_ack_ms,
        })
    }

    pub fn config_snapshot(&self) -> Result<EncoderConfig, EncodeError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| EncodeError::Internal("配置读取锁已中毒".to_string()))
    }

    /// 校验后整体替换配置。
    pub fn update_config(&self, next: EncoderConfig) -> Result<(), EncodeError> {
        next.validate()?;
        let mut config = self
            .config
            .write()
            .map_err(|_| EncodeError::Internal("配置写入锁已中毒".to_string()))?;

        log::info!(
            "⚙️ 已更新编码设置（wrap={}@{}, mode={}, max_file_size={:?}）",
            next.wrap_enabled,
            next.wrap_width,
            next.copy_mode.as_str(),
            next.max_file_size
        );
        *config = next;
        Ok(())
    }

    pub fn set_copy_mode(&self, mode: CopyMode) -> Result<(), EncodeError> {
        let mut next = self.config_snapshot()?;
        next.copy_mode = mode;
        self.update_config(next)
    }

    pub fn set_wrap(&self, enabled: bool, width: usize) -> Result<(), EncodeError> {
        let mut next = self.config_snapshot()?;
        next.wrap_enabled = enabled;
        next.wrap_width = width;
        self.update_config(next)
    }
}
