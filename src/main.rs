// 防止在 Windows 发布版本中显示额外的控制台窗口，不要删除！
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! # Base64 图片编码器：应用入口
//!
//! 本文件仅负责应用初始化与命令注册。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use image_base64_encoder::encoder::{self, EncoderConfig, EncoderService};
use image_base64_encoder::settings;
use tauri::Manager;

/// 读取持久化设置；任何失败都回退到默认配置，不阻塞启动。
fn load_startup_config(app: &tauri::AppHandle) -> EncoderConfig {
    let path = match settings::settings_file_path(app) {
        Ok(path) => path,
        Err(err) => {
            log::error!("setup: 无法定位设置文件，使用默认配置: {err}");
            return EncoderConfig::default();
        }
    };

    match settings::load_config(&path) {
        Ok(Some(config)) => {
            log::info!("setup: 已加载设置 {}", path.display());
            config
        }
        Ok(None) => {
            log::info!("setup: 未找到设置文件，使用默认配置");
            EncoderConfig::default()
        }
        Err(err) => {
            log::warn!("setup: 设置文件无效，使用默认配置: {err}");
            EncoderConfig::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .setup(|app| {
            log::info!("setup: begin");
            let config = load_startup_config(app.handle());
            app.manage(EncoderService::with_config(config));
            log::info!("setup: encoder service managed");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            encoder::commands::submit_image_path,
            encoder::commands::submit_dropped_paths,
            encoder::commands::submit_image_bytes,
            encoder::commands::clear_image,
            encoder::commands::get_intake_state,
            encoder::commands::get_image_summary,
            encoder::commands::get_encoded_payload,
            encoder::commands::copy_encoded_payload,
            encoder::commands::get_encoder_config,
            encoder::commands::set_encoder_config,
        ])
        .run(tauri::generate_context!())
        .expect("运行 Tauri 应用时出错");
}
