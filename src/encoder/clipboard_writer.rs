//! # 剪贴板写入模块
//!
//! ## 设计思路
//!
//! 将与操作系统剪贴板交互的逻辑独立出来，便于隔离平台不稳定因素。
//! 写入通过 `ClipboardSink` 注入（默认 `arboard`），测试可替换为内存实现。
//! 使用阻塞线程执行写入，避免阻塞 async 运行时。
//!
//! ## 实现思路
//!
//! - 失败按 Busy / Transient / Fatal 分类，只有前两类会重试。
//! - 重试采用指数退避 + 抖动，同时受“最大次数”和“总耗时预算”双重约束。
//! - 写入失败只影响本次复制，不会改动当前图片或错误状态。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use super::{EncodeError, EncoderConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardFailureKind {
    /// 剪贴板被其他进程占用。
    Busy,
    /// 偶发失败，可以重试。
    Transient,
    /// 平台不支持或无权限，重试无意义。
    Fatal,
}

/// 单次写入失败。
#[derive(Debug, Clone)]
pub struct ClipboardWriteFailure {
    pub kind: ClipboardFailureKind,
    pub message: String,
}

impl ClipboardWriteFailure {
    pub fn busy(message: impl Into<String>) -> Self {
        Self {
            kind: ClipboardFailureKind::Busy,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ClipboardFailureKind::Transient,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: ClipboardFailureKind::Fatal,
            message: message.into(),
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self.kind, ClipboardFailureKind::Busy | ClipboardFailureKind::Transient)
    }
}

/// 文本剪贴板写入能力。
///
/// 实现方在阻塞线程中被调用，可以执行同步的系统调用。
pub trait ClipboardSink: Send + Sync + 'static {
    fn write_text(&self, text: &str) -> Result<(), ClipboardWriteFailure>;
}

/// 系统剪贴板（`arboard`）。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardWriteFailure> {
        let mut clipboard = arboard::Clipboard::new().map_err(classify_arboard_error)?;
        clipboard.set_text(text).map_err(classify_arboard_error)
    }
}

/// 打开剪贴板与写入文本共用同一套失败分类。
fn classify_arboard_error(error: arboard::Error) -> ClipboardWriteFailure {
    match error {
        arboard::Error::ClipboardNotSupported => {
            ClipboardWriteFailure::fatal("当前环境不支持剪贴板")
        }
        arboard::Error::ClipboardOccupied => ClipboardWriteFailure::busy("剪贴板被占用"),
        other => ClipboardWriteFailure::transient(format!("复制失败：{}", other)),
    }
}

static JITTER_STATE: AtomicU64 = AtomicU64::new(0);

fn xorshift(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

/// 返回 `[0, bound)` 内的抖动值；`bound` 为 0 时返回 0。
fn jitter_below(bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
        | 1;
    let step = |x: u64| xorshift(if x == 0 { seed } else { x });
    let previous = JITTER_STATE
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| Some(step(x)))
        .unwrap_or_else(|x| x);
    step(previous) % bound
}

/// 重试参数快照。
#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    retries: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    max_total_ms: u64,
}

impl From<&EncoderConfig> for RetryPolicy {
    fn from(config: &EncoderConfig) -> Self {
        Self {
            retries: config.clipboard_retries,
            base_delay_ms: config.clipboard_retry_delay_ms,
            max_delay_ms: config.clipboard_retry_max_delay_ms,
            max_total_ms: config.clipboard_retry_max_total_ms,
        }
    }
}

impl RetryPolicy {
    fn attempts(&self) -> u32 {
        self.retries.max(1)
    }

    /// 第 `retry` 次重试（从 1 开始）前的等待：按 2 的幂增长，封顶后再叠加至多三分之一的抖动。
    fn delay_before(&self, retry: u32) -> Duration {
        let base = self.base_delay_ms.max(1);
        let ceiling = self.max_delay_ms.max(base);
        let shift = retry.saturating_sub(1).min(8);
        let delay = base.saturating_mul(1_u64 << shift).min(ceiling);
        Duration::from_millis(delay + jitter_below(delay / 3 + 1))
    }

    fn fits_budget(&self, elapsed: Duration, wait: Duration) -> bool {
        elapsed.saturating_add(wait) <= Duration::from_millis(self.max_total_ms)
    }
}

/// 将文本写入剪贴板（含重试），在阻塞线程中执行。
pub(crate) async fn copy_text_with_retry<S: ClipboardSink>(
    sink: Arc<S>,
    text: String,
    config: &EncoderConfig,
) -> Result<(), EncodeError> {
    log::debug!("📋 准备复制到剪贴板 - {} 字符", text.len());
    let policy = RetryPolicy::from(config);

    tokio::task::spawn_blocking(move || write_text_with_retry(sink.as_ref(), &text, policy))
        .await
        .map_err(|e| EncodeError::ClipboardWriteFailure(format!("线程执行失败：{}", e)))?
}

fn write_text_with_retry<S: ClipboardSink + ?Sized>(
    sink: &S,
    text: &str,
    policy: RetryPolicy,
) -> Result<(), EncodeError> {
    let attempts = policy.attempts();
    let started = Instant::now();
    let mut last_error = None;
    let mut last_kind = ClipboardFailureKind::Transient;

    for attempt in 1..=attempts {
        if attempt > 1 {
            let wait = policy.delay_before(attempt - 1);
            if !policy.fits_budget(started.elapsed(), wait) {
                log::warn!(
                    "⏱️ 跳过第 {} 次尝试：等待 {}ms 会超过预算 {}ms",
                    attempt,
                    wait.as_millis(),
                    policy.max_total_ms
                );
                break;
            }

            log::debug!("🔄 重试 {}/{}，等待 {}ms", attempt, attempts, wait.as_millis());
            std::thread::sleep(wait);
        }

        match sink.write_text(text) {
            Ok(()) => {
                log::info!("✅ 复制成功 (尝试 {})", attempt);
                return Ok(());
            }
            Err(failure) => {
                let retryable = failure.is_retryable();
                log::warn!(
                    "❌ 尝试 {} 失败: {}（kind={:?}, retryable={}）",
                    attempt,
                    failure.message,
                    failure.kind,
                    retryable
                );
                last_error = Some(failure.message);
                last_kind = failure.kind;

                if !retryable {
                    log::warn!("🛑 非可重试错误，提前终止重试");
                    break;
                }
            }
        }
    }

    let final_message = last_error.unwrap_or_else(|| "未知错误".to_string());
    if last_kind == ClipboardFailureKind::Busy {
        Err(EncodeError::ClipboardBusy(final_message))
    } else {
        Err(EncodeError::ClipboardWriteFailure(final_message))
    }
}
