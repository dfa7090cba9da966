//! 编码设置持久化（`settings.json`）。
//!
//! 设置文件缺失时返回 `None`，由调用方回退到默认配置；
//! 内容无法解析或校验失败时返回错误，不静默覆盖用户文件。

use std::fs;
use std::path::Path;
#[cfg(feature = "desktop")]
use std::path::PathBuf;

use crate::encoder::EncoderConfig;
use crate::error::AppError;

#[cfg(feature = "desktop")]
pub fn settings_file_path(app: &tauri::AppHandle) -> Result<PathBuf, AppError> {
    use tauri::Manager;

    let app_data_dir = app
        .path()
        .app_data_dir()
        .map_err(|e| AppError::Storage(format!("获取应用数据目录失败: {}", e)))?;

    fs::create_dir_all(&app_data_dir)
        .map_err(|e| AppError::Storage(format!("创建应用数据目录失败: {}", e)))?;

    Ok(app_data_dir.join("settings.json"))
}

pub fn load_config(path: &Path) -> Result<Option<EncoderConfig>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str::<EncoderConfig>(&content)
        .map_err(|e| AppError::Storage(format!("解析设置文件失败: {}", e)))?;
    config.validate()?;

    Ok(Some(config))
}

pub fn save_config(path: &Path, config: &EncoderConfig) -> Result<(), AppError> {
    config.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Storage(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::CopyMode;

    fn temp_settings(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("ib64-settings-{}-{}", tag, std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn missing_file_yields_none() {
        let path = temp_settings("missing");
        assert!(load_config(&path).expect("load should not fail").is_none());
    }

    #[test]
    fn saved_config_loads_back() {
        let path = temp_settings("saved");
        let config = EncoderConfig {
            wrap_enabled: true,
            wrap_width: 64,
            copy_mode: CopyMode::DataUrl,
            ..EncoderConfig::default()
        };

        save_config(&path, &config).expect("save should succeed");
        let loaded = load_config(&path).expect("load should succeed");
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }

        assert_eq!(loaded, Some(config));
    }

    #[test]
    fn invalid_content_is_reported() {
        let path = temp_settings("invalid");
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).expect("create temp dir");
        }
        fs::write(&path, r#"{"wrapEnabled":true,"wrapWidth":0}"#).expect("write settings");

        let result = load_config(&path);
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }

        assert!(matches!(result, Err(AppError::Encoder(_))));
    }
}
