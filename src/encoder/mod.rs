//! # 图片编码模块（encoder）
//!
//! ## 设计思路
//!
//! 该模块将“文件接收校验 → 读取编码 → 结果状态 → 展示/复制格式化 → 写入剪贴板 → Tauri 命令暴露”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `commands`：仅做 IPC 入参/出参适配（薄封装，`desktop` 特性）
//! - `service`：承载可注入状态（`EncoderService`）
//! - `controller`：编排接收流程，维护唯一状态槽与提交代号
//! - `reader`：读取文件并编码为 Data URL（可注入能力）
//! - `wrap` / `selector`：换行与复制内容选择（纯函数）
//! - `clipboard_writer`：写入剪贴板与重试
//! - `summary`：结果页摘要（体积文案、尺寸）
//! - `config/error/source/state`：配置、错误、数据模型、状态
//!
//! ## 新同事快速上手
//!
//! ```text
//! 前端 invoke（拖放 / 选择文件 / 复制 / 清空）
//!    ↓
//! commands.rs（参数适配）
//!    ↓
//! service.rs（State 注入、服务入口）
//!    ├─ controller.rs（MIME 校验 + 代号 + 状态提交）
//!    │    └─ reader.rs（读取 + Base64 Data URL）
//!    ├─ selector.rs + wrap.rs（raw / dataUrl，可选 76 列换行）
//!    └─ clipboard_writer.rs（写剪贴板 + 重试）
//!    ↓
//! 返回 IntakeState / EncodeCommandError 给前端
//! ```

mod clipboard_writer;
#[cfg(feature = "desktop")]
pub mod commands;
mod config;
mod controller;
mod error;
mod reader;
mod selector;
mod service;
mod source;
mod state;
mod summary;
mod wrap;

pub use clipboard_writer::{ClipboardFailureKind, ClipboardSink, ClipboardWriteFailure, SystemClipboard};
pub use config::EncoderConfig;
pub use controller::IntakeController;
pub use error::EncodeError;
pub use reader::{DataUrlReader, PlatformReader, encode_data_url};
pub use selector::{CopyMode, format_payload, select_payload};
pub use service::{CopyReceipt, EncoderService};
pub use source::{FileContent, FileMeta, ImageFile, ImageInfo};
pub use state::IntakeState;
pub use summary::{ImageSummary, format_file_size};
pub use wrap::{DEFAULT_WRAP_WIDTH, wrap};
