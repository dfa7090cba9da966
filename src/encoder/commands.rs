//! # Tauri 命令层
//!
//! ## 设计思路
//!
//! 命令层仅做 IPC 参数接收与结果返回，不承载业务逻辑。
//! 所有实际处理交由 `EncoderService`，保持命令函数薄、稳定、易测试。
//! 接收类命令统一返回提交后的 `IntakeState`：校验/读取错误已经体现在状态里，
//! 只有内部错误才以 `EncodeCommandError` 返回。

use tauri::{AppHandle, State};

use super::{
    CopyMode, CopyReceipt, EncodeError, EncoderConfig, EncoderService, ImageFile, ImageInfo,
    ImageSummary, IntakeState,
};
use crate::error::AppError;
use crate::settings;

#[derive(Debug, Clone, serde::Serialize)]
pub struct EncodeCommandError {
    pub code: &'static str,
    pub stage: &'static str,
    pub message: String,
}

impl From<EncodeError> for EncodeCommandError {
    fn from(error: EncodeError) -> Self {
        Self {
            code: error.code(),
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

/// 将提交结果折算为前端状态。
fn settle(
    state: &EncoderService,
    result: Result<ImageInfo, EncodeError>,
) -> Result<IntakeState, EncodeCommandError> {
    match result {
        Ok(_) | Err(EncodeError::Superseded(_)) => {}
        Err(err) if err.is_intake_failure() => {}
        Err(err) => return Err(err.into()),
    }
    Ok(state.state()?)
}

fn parse_mode(mode: Option<String>) -> Result<Option<CopyMode>, EncodeError> {
    mode.as_deref().map(CopyMode::from_str).transpose()
}

/// 编码文件选择器选中的本地图片。
#[tauri::command]
pub async fn submit_image_path(
    state: State<'_, EncoderService>,
    path: String,
) -> Result<IntakeState, EncodeCommandError> {
    let result = state.submit_path(&path).await;
    settle(&state, result)
}

/// 编码拖放的文件；多个文件时只处理第一个。
#[tauri::command]
pub async fn submit_dropped_paths(
    state: State<'_, EncoderService>,
    paths: Vec<String>,
) -> Result<IntakeState, EncodeCommandError> {
    match state.submit_first_path(&paths).await {
        Some(result) => settle(&state, result),
        None => Ok(state.state()?),
    }
}

/// 编码 webview 直接传来的文件内容。
#[tauri::command]
pub async fn submit_image_bytes(
    state: State<'_, EncoderService>,
    name: String,
    mime_type: String,
    data: Vec<u8>,
) -> Result<IntakeState, EncodeCommandError> {
    let result = state
        .submit(ImageFile::from_bytes(name, mime_type, data))
        .await;
    settle(&state, result)
}

/// “Encode Another”：清空当前结果。
#[tauri::command]
pub fn clear_image(state: State<'_, EncoderService>) -> Result<IntakeState, EncodeCommandError> {
    state.clear()?;
    Ok(state.state()?)
}

#[tauri::command]
pub fn get_intake_state(
    state: State<'_, EncoderService>,
) -> Result<IntakeState, EncodeCommandError> {
    Ok(state.state()?)
}

#[tauri::command]
pub fn get_image_summary(
    state: State<'_, EncoderService>,
) -> Result<Option<ImageSummary>, EncodeCommandError> {
    Ok(state.summary()?)
}

/// 展示区文本（按模式与换行设置）。
#[tauri::command]
pub fn get_encoded_payload(
    state: State<'_, EncoderService>,
    mode: Option<String>,
) -> Result<Option<String>, EncodeCommandError> {
    Ok(state.render_payload(parse_mode(mode)?)?)
}

/// 复制到系统剪贴板。
#[tauri::command]
pub async fn copy_encoded_payload(
    state: State<'_, EncoderService>,
    mode: Option<String>,
) -> Result<CopyReceipt, EncodeCommandError> {
    Ok(state.copy_to_clipboard(parse_mode(mode)?).await?)
}

#[tauri::command]
pub fn get_encoder_config(state: State<'_, EncoderService>) -> Result<EncoderConfig, AppError> {
    Ok(state.config_snapshot()?)
}

/// 更新设置并持久化到 `settings.json`。
#[tauri::command]
pub fn set_encoder_config(
    app: AppHandle,
    state: State<'_, EncoderService>,
    config: EncoderConfig,
) -> Result<(), AppError> {
    state.update_config(config.clone())?;
    settings::save_config(&settings::settings_file_path(&app)?, &config)
}
