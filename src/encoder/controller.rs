//! # 图片接收控制器
//!
//! ## 设计思路
//!
//! `IntakeController` 只负责“校验 → 读取 → 派生负载 → 提交状态”的编排，
//! 不直接与 Tauri 绑定。处理链路固定为：
//! 1. 读取配置快照，递增提交代号（generation）
//! 2. 校验声明类型（`image/` 前缀）与体积上限
//! 3. 委托 `DataUrlReader` 读取为 Data URL
//! 4. 在首个逗号处切分得到 Base64 负载，提交到状态槽
//!
//! ## 实现思路
//!
//! - 状态槽是单个 `Mutex<IntakeState>`，代号在同一把锁内递增。
//! - 读取完成后只有“代号仍是最新”才会提交，旧读取的结果被丢弃（`Superseded`）。
//! - `spawn_submit` 以 tokio 任务运行，新提交会 abort 上一个未完成的任务。
//! - 锁从不跨越 `.await` 持有。

use std::sync::atomic::{AtomicU64, Ordering};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use base64::{Engine as _, engine::general_purpose};
use tokio::task::{AbortHandle, JoinHandle};

use super::reader::DataUrlReader;
use super::source::{ImageFile, ImageInfo};
use super::state::IntakeState;
use super::{EncodeError, EncoderConfig};

/// 签名校验时解码的 Base64 前缀长度（字符数，4 的倍数）。
const SIGNATURE_PROBE_CHARS: usize = 256;

/// 状态槽与提交代号。
struct StateSlot {
    state: Mutex<IntakeState>,
    generation: AtomicU64,
}

impl StateSlot {
    fn new() -> Self {
        Self {
            state: Mutex::new(IntakeState::Empty),
            generation: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, IntakeState>, EncodeError> {
        self.state
            .lock()
            .map_err(|_| EncodeError::Internal("状态锁已中毒".to_string()))
    }

    /// 开始一次新提交，返回其代号。
    fn begin(&self) -> Result<u64, EncodeError> {
        let _state = self.lock()?;
        Ok(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// 仅当代号仍为最新时写入状态，返回是否已写入。
    fn commit(&self, generation: u64, next: IntakeState) -> Result<bool, EncodeError> {
        let mut state = self.lock()?;
        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(false);
        }
        *state = next;
        Ok(true)
    }

    /// 新文件通过校验后清除旧错误；已有图片保留到新读取完成。
    fn clear_error(&self, generation: u64) -> Result<(), EncodeError> {
        let mut state = self.lock()?;
        if self.generation.load(Ordering::SeqCst) == generation
            && matches!(*state, IntakeState::Failed(_))
        {
            *state = IntakeState::Empty;
        }
        Ok(())
    }

    /// 清空并使所有进行中的读取失效。
    fn reset(&self) -> Result<(), EncodeError> {
        let mut state = self.lock()?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = IntakeState::Empty;
        Ok(())
    }
}

/// 图片接收控制器。
pub struct IntakeController<R> {
    reader: Arc<R>,
    config: Arc<RwLock<EncoderConfig>>,
    slot: Arc<StateSlot>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl<R: DataUrlReader + 'static> IntakeController<R> {
    /// 使用独立配置创建控制器。
    ///
    /// # 示例
    /// ```rust
    /// use image_base64_encoder::encoder::{EncoderConfig, ImageFile, IntakeController, PlatformReader};
    ///
    /// # async fn demo() -> Result<(), image_base64_encoder::encoder::EncodeError> {
    /// let controller = IntakeController::new(PlatformReader, EncoderConfig::default());
    /// let info = controller
    ///     .submit(ImageFile::from_bytes("test.png", "image/png", vec![1, 2, 3]))
    ///     .await?;
    /// assert!(info.data_url().starts_with("data:image/png;base64,"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(reader: R, config: EncoderConfig) -> Self {
        Self::with_shared_config(reader, Arc::new(RwLock::new(config)))
    }

    /// 与服务层共享同一份可变配置。
    pub fn with_shared_config(reader: R, config: Arc<RwLock<EncoderConfig>>) -> Self {
        Self {
            reader: Arc::new(reader),
            config,
            slot: Arc::new(StateSlot::new()),
            in_flight: Mutex::new(None),
        }
    }

    fn config_snapshot(&self) -> Result<EncoderConfig, EncodeError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| EncodeError::Internal("配置读取锁已中毒".to_string()))
    }

    /// 提交文件并等待读取完成。
    ///
    /// 读取期间若有更新的提交或 `clear`，返回 `EncodeError::Superseded` 且不改变状态。
    pub async fn submit(&self, file: ImageFile) -> Result<ImageInfo, EncodeError> {
        let config = self.config_snapshot()?;
        let generation = self.slot.begin()?;
        run_submission(self.reader.as_ref(), &self.slot, &config, generation, file).await
    }

    /// 拖放或多选时只处理第一个文件；空列表不做任何事。
    pub async fn submit_first(
        &self,
        files: Vec<ImageFile>,
    ) -> Option<Result<ImageInfo, EncodeError>> {
        let total = files.len();
        let Some(first) = files.into_iter().next() else {
            log::debug!("📭 未选择文件，忽略");
            return None;
        };

        if total > 1 {
            log::debug!("📚 收到 {} 个文件，仅处理第一个：{}", total, first.name);
        }

        Some(self.submit(first).await)
    }

    /// 以后台任务提交文件，取消上一个尚未完成的读取任务。
    ///
    /// 代号分配、任务创建与句柄登记都在 `in_flight` 锁内完成，
    /// 因此被 abort 的总是代号更旧的任务。
    pub fn spawn_submit(
        &self,
        file: ImageFile,
    ) -> Result<JoinHandle<Result<ImageInfo, EncodeError>>, EncodeError> {
        let config = self.config_snapshot()?;
        let mut in_flight = self.lock_in_flight()?;
        let generation = self.slot.begin()?;
        let reader = Arc::clone(&self.reader);
        let slot = Arc::clone(&self.slot);

        let handle = tokio::spawn(async move {
            run_submission(reader.as_ref(), &slot, &config, generation, file).await
        });

        abort_previous(&mut in_flight, Some(handle.abort_handle()));
        Ok(handle)
    }

    /// 按路径提交。代号在打开文件之前分配，
    /// 较慢的打开不会让更早的操作覆盖后来的提交。
    pub async fn submit_path(&self, path: impl AsRef<Path>) -> Result<ImageInfo, EncodeError> {
        let path = path.as_ref();
        let config = self.config_snapshot()?;
        let generation = self.slot.begin()?;

        match ImageFile::open(path).await {
            Ok(file) => {
                run_submission(self.reader.as_ref(), &self.slot, &config, generation, file).await
            }
            Err(err) => {
                log::warn!("❌ 打开文件失败 #{} - 路径: {}：{}", generation, path.display(), err);
                fail(&self.slot, generation, err)
            }
        }
    }

    /// 清空当前结果与错误，并使进行中的读取失效。
    pub fn clear(&self) -> Result<(), EncodeError> {
        let mut in_flight = self.lock_in_flight()?;
        abort_previous(&mut in_flight, None);
        self.slot.reset()?;
        log::info!("🧹 已清空当前结果");
        Ok(())
    }

    pub fn state(&self) -> Result<IntakeState, EncodeError> {
        Ok(self.slot.lock()?.clone())
    }

    pub fn current(&self) -> Result<Option<ImageInfo>, EncodeError> {
        Ok(self.slot.lock()?.image_info().cloned())
    }

    /// 最近一次提交的代号。
    pub fn generation(&self) -> u64 {
        self.slot.generation.load(Ordering::SeqCst)
    }

    fn lock_in_flight(&self) -> Result<MutexGuard<'_, Option<AbortHandle>>, EncodeError> {
        self.in_flight
            .lock()
            .map_err(|_| EncodeError::Internal("任务句柄锁已中毒".to_string()))
    }
}

fn abort_previous(slot: &mut Option<AbortHandle>, next: Option<AbortHandle>) {
    if let Some(previous) = std::mem::replace(slot, next) {
        if !previous.is_finished() {
            log::debug!("✂️ 取消上一个未完成的读取任务");
            previous.abort();
        }
    }
}

async fn run_submission<R: DataUrlReader>(
    reader: &R,
    slot: &StateSlot,
    config: &EncoderConfig,
    generation: u64,
    file: ImageFile,
) -> Result<ImageInfo, EncodeError> {
    log::info!(
        "🖼️ 收到文件 #{} - {}（类型: {}，{} 字节）",
        generation,
        file.name,
        if file.mime_type.is_empty() { "<未知>" } else { file.mime_type.as_str() },
        file.size
    );

    if let Err(err) = validate(&file, config) {
        log::warn!("🚫 文件 #{} 未通过校验：{}", generation, err);
        return fail(slot, generation, err);
    }

    slot.clear_error(generation)?;

    let read_start = Instant::now();
    let outcome = match reader.read_as_data_url(&file).await {
        Ok(data_url) => ImageInfo::from_data_url(file.meta(), data_url).and_then(|info| {
            if config.verify_signature {
                verify_payload_signature(info.base64_string())?;
            }
            Ok(info)
        }),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(info) => {
            if !slot.commit(generation, IntakeState::Ready(info.clone()))? {
                log::debug!("⏭️ 文件 #{} 读取完成但已过期，丢弃结果", generation);
                return Err(EncodeError::Superseded(generation));
            }
            log::info!(
                "✅ 文件 #{} 编码完成 - base64={} 字符 read={}ms",
                generation,
                info.base64_string().len(),
                read_start.elapsed().as_millis()
            );
            Ok(info)
        }
        Err(err) => {
            let err = if err.is_intake_failure() {
                err
            } else {
                EncodeError::ReadFailure(err.to_string())
            };
            log::warn!("❌ 文件 #{} 读取失败：{}", generation, err);
            fail(slot, generation, err)
        }
    }
}

fn validate(file: &ImageFile, config: &EncoderConfig) -> Result<(), EncodeError> {
    if !file.is_image() {
        let declared = if file.mime_type.is_empty() {
            "未知".to_string()
        } else {
            file.mime_type.clone()
        };
        return Err(EncodeError::InvalidFileType(declared));
    }

    if let Some(limit) = config.max_file_size {
        if file.size > limit {
            return Err(EncodeError::ResourceLimit(format!(
                "文件过大：{} 字节（限制：{} 字节）",
                file.size, limit
            )));
        }
    }

    Ok(())
}

fn fail(slot: &StateSlot, generation: u64, err: EncodeError) -> Result<ImageInfo, EncodeError> {
    if slot.commit(generation, IntakeState::Failed(err.clone()))? {
        Err(err)
    } else {
        Err(EncodeError::Superseded(generation))
    }
}

/// 解码负载前缀并按文件签名判断：识别为非图片时拒绝，无法识别时放行（如 SVG）。
fn verify_payload_signature(base64_string: &str) -> Result<(), EncodeError> {
    let probe_len = base64_string.len().min(SIGNATURE_PROBE_CHARS) / 4 * 4;
    let Some(head) = base64_string.get(..probe_len) else {
        return Ok(());
    };
    let Ok(bytes) = general_purpose::STANDARD.decode(head) else {
        return Ok(());
    };

    match infer::get(&bytes) {
        Some(kind) if kind.matcher_type() != infer::MatcherType::Image => {
            Err(EncodeError::InvalidFileType(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::PlatformReader;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// 总是读取失败的读取器。
    struct FailingReader;

    impl DataUrlReader for FailingReader {
        async fn read_as_data_url(&self, _file: &ImageFile) -> Result<String, EncodeError> {
            Err(EncodeError::ReadFailure("permission denied".to_string()))
        }
    }

    /// 名为 `slow.png` 的文件会阻塞，直到 `gate` 被通知。
    struct GatedReader {
        gate: Arc<Notify>,
        reads: AtomicUsize,
    }

    impl GatedReader {
        fn new(gate: Arc<Notify>) -> Self {
            Self {
                gate,
                reads: AtomicUsize::new(0),
            }
        }
    }

    impl DataUrlReader for GatedReader {
        async fn read_as_data_url(&self, file: &ImageFile) -> Result<String, EncodeError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if file.name == "slow.png" {
                self.gate.notified().await;
            }
            PlatformReader.read_as_data_url(file).await
        }
    }

    fn png(name: &str) -> ImageFile {
        ImageFile::from_bytes(name, "image/png", vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }

    #[tokio::test]
    async fn invalid_type_sets_failed_state() {
        let controller = IntakeController::new(PlatformReader, EncoderConfig::default());
        let result = controller
            .submit(ImageFile::from_bytes("notes.txt", "text/plain", b"hello".to_vec()))
            .await;

        assert!(matches!(result, Err(EncodeError::InvalidFileType(_))));
        let state = controller.state().expect("state");
        assert!(matches!(state, IntakeState::Failed(EncodeError::InvalidFileType(_))));
        assert!(state.image_info().is_none());
    }

    #[tokio::test]
    async fn read_failure_clears_previous_image() {
        let controller = IntakeController::new(FailingReader, EncoderConfig::default());
        controller
            .slot
            .commit(0, IntakeState::Ready(
                ImageInfo::from_data_url(png("old.png").meta(), "data:image/png;base64,AA==".into())
                    .expect("valid data url"),
            ))
            .expect("seed state");

        let result = controller.submit(png("new.png")).await;

        assert!(matches!(result, Err(EncodeError::ReadFailure(_))));
        assert!(controller.current().expect("current").is_none());
        assert!(controller.state().expect("state").error().is_some());
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_before_read() {
        let gate = Arc::new(Notify::new());
        let config = EncoderConfig {
            max_file_size: Some(4),
            ..EncoderConfig::default()
        };
        let controller = IntakeController::new(GatedReader::new(gate), config);

        let result = controller.submit(png("big.png")).await;

        match result {
            Err(EncodeError::ResourceLimit(message)) => {
                assert!(message.contains("8 字节"), "{message}");
                assert!(message.contains("限制：4 字节"), "{message}");
            }
            other => panic!("expected ResourceLimit, got {other:?}"),
        }
        assert_eq!(controller.reader.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn default_config_has_no_size_limit() {
        let controller = IntakeController::new(PlatformReader, EncoderConfig::default());
        let mut large = png("large.png");
        large.size = 50 * 1024 * 1024 + 1;

        let info = controller.submit(large).await.expect("large image accepted");

        assert_eq!(info.file().size, 50 * 1024 * 1024 + 1);
        assert!(controller.state().expect("state").image_info().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_spawn_submit_keeps_latest_submission() {
        for round in 0..200 {
            let controller = Arc::new(IntakeController::new(PlatformReader, EncoderConfig::default()));
            let barrier = Arc::new(tokio::sync::Barrier::new(2));

            let callers: Vec<_> = ["left.png", "right.png"]
                .into_iter()
                .map(|name| {
                    let controller = Arc::clone(&controller);
                    let barrier = Arc::clone(&barrier);
                    tokio::spawn(async move {
                        barrier.wait().await;
                        controller.spawn_submit(png(name)).expect("spawn")
                    })
                })
                .collect();

            let mut accepted = Vec::new();
            for caller in callers {
                let task = caller.await.expect("caller task");
                if let Ok(Ok(info)) = task.await {
                    accepted.push(info);
                }
            }

            let current = controller.current().expect("current");
            assert!(current.is_some(), "round {round}: every submission was lost");
            assert!(
                accepted.iter().any(|info| Some(info) == current.as_ref()),
                "round {round}: committed image has no successful task"
            );
            assert_eq!(controller.generation(), 2);
        }
    }

    #[tokio::test]
    async fn path_submission_reserves_generation_before_opening() {
        let dir = std::env::temp_dir().join(format!("ib64-controller-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("dropped-first.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).expect("write temp file");

        let controller = IntakeController::new(PlatformReader, EncoderConfig::default());
        let (first, second) = tokio::join!(
            controller.submit_path(&path),
            controller.submit(png("dropped-second.png"))
        );
        let _ = std::fs::remove_file(&path);

        assert!(matches!(first, Ok(_) | Err(EncodeError::Superseded(1))));
        assert_eq!(second.expect("second accepted").file().name, "dropped-second.png");
        assert_eq!(
            controller.current().expect("current").map(|i| i.file().name.clone()),
            Some("dropped-second.png".to_string())
        );
        assert_eq!(controller.generation(), 2);
    }

    #[tokio::test]
    async fn unopenable_path_is_recorded_as_read_failure() {
        let controller = IntakeController::new(PlatformReader, EncoderConfig::default());

        let result = controller
            .submit_path("/definitely/not/here/missing.png")
            .await;

        assert!(matches!(result, Err(EncodeError::ReadFailure(_))));
        assert!(matches!(
            controller.state().expect("state").error(),
            Some(EncodeError::ReadFailure(_))
        ));
        assert_eq!(controller.generation(), 1);
    }

    #[tokio::test]
    async fn stale_read_never_overwrites_newer_result() {
        let gate = Arc::new(Notify::new());
        let controller = IntakeController::new(GatedReader::new(Arc::clone(&gate)), EncoderConfig::default());

        let (slow, fast) = tokio::join!(controller.submit(png("slow.png")), async {
            let fast = controller.submit(png("fast.png")).await;
            gate.notify_one();
            fast
        });

        assert!(matches!(slow, Err(EncodeError::Superseded(1))));
        assert_eq!(fast.expect("fast read").file().name, "fast.png");
        assert_eq!(
            controller.current().expect("current").map(|i| i.file().name.clone()),
            Some("fast.png".to_string())
        );
        assert_eq!(controller.generation(), 2);
    }

    #[tokio::test]
    async fn clear_invalidates_in_flight_read() {
        let gate = Arc::new(Notify::new());
        let controller = IntakeController::new(GatedReader::new(Arc::clone(&gate)), EncoderConfig::default());

        let (slow, ()) = tokio::join!(controller.submit(png("slow.png")), async {
            controller.clear().expect("clear");
            gate.notify_one();
        });

        assert!(matches!(slow, Err(EncodeError::Superseded(_))));
        assert!(controller.state().expect("state").is_empty());
    }

    #[tokio::test]
    async fn spawn_submit_aborts_previous_task() {
        let gate = Arc::new(Notify::new());
        let controller = IntakeController::new(GatedReader::new(gate), EncoderConfig::default());

        let slow = controller.spawn_submit(png("slow.png")).expect("spawn slow");
        let fast = controller.spawn_submit(png("fast.png")).expect("spawn fast");

        let fast = fast.await.expect("fast task should finish");
        assert_eq!(fast.expect("fast read").file().name, "fast.png");

        let slow = slow.await;
        assert!(slow.is_err_and(|e| e.is_cancelled()));
        assert_eq!(
            controller.current().expect("current").map(|i| i.file().name.clone()),
            Some("fast.png".to_string())
        );
    }

    #[tokio::test]
    async fn accepting_new_file_clears_previous_error() {
        let gate = Arc::new(Notify::new());
        let controller = IntakeController::new(GatedReader::new(Arc::clone(&gate)), EncoderConfig::default());

        let _ = controller
            .submit(ImageFile::from_bytes("a.txt", "text/plain", vec![1]))
            .await;
        assert!(controller.state().expect("state").error().is_some());

        let (slow, ()) = tokio::join!(controller.submit(png("slow.png")), async {
            // 读取尚未完成时错误已被清除
            assert!(controller.state().expect("state").is_empty());
            gate.notify_one();
        });

        assert!(slow.is_ok());
    }

    #[tokio::test]
    async fn submit_first_ignores_extra_files_and_empty_lists() {
        let controller = IntakeController::new(PlatformReader, EncoderConfig::default());

        assert!(controller.submit_first(Vec::new()).await.is_none());
        assert!(controller.state().expect("state").is_empty());
        assert_eq!(controller.generation(), 0);

        let result = controller
            .submit_first(vec![
                png("first.png"),
                ImageFile::from_bytes("second.txt", "text/plain", vec![1]),
            ])
            .await
            .expect("one file submitted");

        assert_eq!(result.expect("first file is an image").file().name, "first.png");
        assert_eq!(controller.generation(), 1);
    }

    #[tokio::test]
    async fn signature_check_rejects_mislabelled_content() {
        let config = EncoderConfig {
            verify_signature: true,
            ..EncoderConfig::default()
        };
        let controller = IntakeController::new(PlatformReader, config);

        let pdf = ImageFile::from_bytes("fake.png", "image/png", b"%PDF-1.7\n%\xE2\xE3".to_vec());
        let result = controller.submit(pdf).await;
        assert!(matches!(result, Err(EncodeError::InvalidFileType(_))));

        let svg = ImageFile::from_bytes("icon.svg", "image/svg+xml", b"<svg/>".to_vec());
        assert!(controller.submit(svg).await.is_ok());
    }
}
