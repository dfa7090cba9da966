//! # Base64 图片编码器：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  前端 (React + TypeScript)                │
//! │                                                          │
//! │  ImageUploader ── ResultDisplay ── Header / Footer       │
//! │       │  (拖放 / 选择文件 / 复制 / Encode Another)        │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Tauri IPC（desktop 特性）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ encoder ──── 接收校验·读取编码·状态槽·复制            │
//! │  │   ├─ controller     MIME 校验 + 提交代号               │
//! │  │   ├─ reader         Data URL 读取（可注入）            │
//! │  │   ├─ wrap/selector  换行 + raw/dataUrl 选择            │
//! │  │   └─ clipboard_writer 剪贴板写入 + 重试               │
//! │  │                                                       │
//! │  └─ settings           settings.json 读写                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，设置读写与 Tauri command 的返回类型 |
//! | [`encoder`] | 图片文件转 Base64 / Data URL、结果状态、换行、复制到剪贴板 |
//! | [`settings`] | 编码设置的 JSON 持久化 |

pub mod error;
pub mod encoder;
pub mod settings;
