//! 测试用的端口替身

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::ports::{
    ChannelSenderPort, ImageArtifact, ImageError, ImageProcessorPort, MessageContext,
    MidjourneyApiPort, PendingStorePort, PromptError, PromptOptimizerPort, Reply, SendError,
    ShortenerError, SubmitReceipt, UrlShortenerPort, VendorError,
};
use crate::domain::generation::{
    BlendDimensions, ChangeRequest, EncodedImage, GenerationTask, TaskStatus,
};
use crate::domain::{ImageOutcome, PendingCommand};

/// 记录下来的提交调用
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitCall {
    Imagine {
        prompt: String,
        seed: Option<EncodedImage>,
    },
    Change(String),
    Blend {
        images: Vec<EncodedImage>,
        dimensions: BlendDimensions,
    },
}

/// 可编排响应的绘图服务
pub struct FakeMidjourneyApi {
    fetch_queue: Mutex<VecDeque<Result<GenerationTask, VendorError>>>,
    default_fetch: Mutex<GenerationTask>,
    reject_with: Mutex<Option<String>>,
    calls: Mutex<Vec<SubmitCall>>,
    fetches: AtomicUsize,
    next_id: AtomicUsize,
    /// 提交合图时检查该会话是否仍有待完成状态
    pending_watch: Mutex<Option<(Arc<dyn PendingStorePort>, String)>>,
    pending_seen_at_blend: Mutex<Option<bool>>,
}

impl FakeMidjourneyApi {
    pub fn new() -> Self {
        Self {
            fetch_queue: Mutex::new(VecDeque::new()),
            default_fetch: Mutex::new(GenerationTask {
                status: TaskStatus::Success,
                image_url: Some("https://cdn.example.com/attachments/1/2/out.png".to_string()),
                ..Default::default()
            }),
            reject_with: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            next_id: AtomicUsize::new(1000),
            pending_watch: Mutex::new(None),
            pending_seen_at_blend: Mutex::new(None),
        }
    }

    pub fn push_fetch(&self, result: Result<GenerationTask, VendorError>) {
        self.fetch_queue.lock().unwrap().push_back(result);
    }

    pub fn set_default_fetch(&self, task: GenerationTask) {
        *self.default_fetch.lock().unwrap() = task;
    }

    pub fn reject_submissions(&self, description: &str) {
        *self.reject_with.lock().unwrap() = Some(description.to_string());
    }

    pub fn watch_pending(&self, store: Arc<dyn PendingStorePort>, session_id: &str) {
        *self.pending_watch.lock().unwrap() = Some((store, session_id.to_string()));
    }

    pub fn pending_seen_at_blend(&self) -> Option<bool> {
        *self.pending_seen_at_blend.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<SubmitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn record(&self, call: SubmitCall) -> Result<SubmitReceipt, VendorError> {
        self.calls.lock().unwrap().push(call);
        if let Some(description) = self.reject_with.lock().unwrap().clone() {
            return Err(VendorError::Rejected(description));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(SubmitReceipt {
            task_id: id.to_string(),
            description: "提交成功".to_string(),
        })
    }
}

#[async_trait]
impl MidjourneyApiPort for FakeMidjourneyApi {
    async fn submit_imagine(
        &self,
        prompt: &str,
        seed: Option<&EncodedImage>,
    ) -> Result<SubmitReceipt, VendorError> {
        self.record(SubmitCall::Imagine {
            prompt: prompt.to_string(),
            seed: seed.cloned(),
        })
    }

    async fn fetch_task(&self, task_id: &str) -> Result<GenerationTask, VendorError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let queued = self.fetch_queue.lock().unwrap().pop_front();
        match queued {
            Some(result) => result,
            None => {
                let mut task = self.default_fetch.lock().unwrap().clone();
                task.id = task_id.to_string();
                Ok(task)
            }
        }
    }

    async fn submit_change(&self, request: &ChangeRequest) -> Result<SubmitReceipt, VendorError> {
        self.record(SubmitCall::Change(request.content()))
    }

    async fn submit_blend(
        &self,
        images: &[EncodedImage],
        dimensions: BlendDimensions,
    ) -> Result<SubmitReceipt, VendorError> {
        if let Some((store, session_id)) = self.pending_watch.lock().unwrap().as_ref() {
            *self.pending_seen_at_blend.lock().unwrap() = Some(store.contains(session_id));
        }
        self.record(SubmitCall::Blend {
            images: images.to_vec(),
            dimensions,
        })
    }
}

/// 记录发送内容的通道，可预置失败
pub struct RecordingSender {
    sent: Mutex<Vec<Reply>>,
    failures: Mutex<VecDeque<SendError>>,
    attempts: AtomicUsize,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, error: SendError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn sent(&self) -> Vec<Reply> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelSenderPort for RecordingSender {
    async fn send(&self, reply: &Reply, _context: &MessageContext) -> Result<(), SendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.sent.lock().unwrap().push(reply.clone());
        Ok(())
    }
}

/// 不访问网络的图片处理器
///
/// 编码时把文件路径当作图片内容，便于断言顺序
pub struct FakeImageProcessor {
    dir: PathBuf,
    yield_on_encode: bool,
    released: Mutex<Vec<PathBuf>>,
}

impl FakeImageProcessor {
    pub fn new() -> Self {
        Self {
            dir: PathBuf::from("tmp"),
            yield_on_encode: false,
            released: Mutex::new(Vec::new()),
        }
    }

    /// 编码时先让出执行权，让同一会话的多张图片交错处理
    pub fn yielding() -> Self {
        Self {
            yield_on_encode: true,
            ..Self::new()
        }
    }

    pub fn released(&self) -> Vec<PathBuf> {
        self.released.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProcessorPort for FakeImageProcessor {
    async fn download_and_compress(
        &self,
        _url: &str,
        name: &str,
    ) -> Result<ImageArtifact, ImageError> {
        Ok(ImageArtifact {
            path: self.dir.join(format!("{}.jpg", name)),
            bytes: vec![0xFF, 0xD8, 0xFF],
        })
    }

    async fn encode_file(&self, path: &Path) -> Result<EncodedImage, ImageError> {
        if self.yield_on_encode {
            tokio::task::yield_now().await;
        }
        if path.as_os_str().is_empty() {
            return Err(ImageError::Io("empty path".to_string()));
        }
        Ok(EncodedImage::from_bytes(path.to_string_lossy().as_bytes()))
    }

    async fn release(&self, artifact: &ImageArtifact) {
        self.released.lock().unwrap().push(artifact.path.clone());
    }
}

/// 在 url 前加 `short:` 前缀
pub struct FakeShortener;

#[async_trait]
impl UrlShortenerPort for FakeShortener {
    async fn shorten(&self, url: &str) -> Result<String, ShortenerError> {
        Ok(format!("short:{}", url))
    }
}

/// 可配置成功或失败的关键词扩写
pub struct FakeOptimizer {
    pub fail: bool,
}

#[async_trait]
impl PromptOptimizerPort for FakeOptimizer {
    async fn optimize(&self, prompt: &str) -> Result<String, PromptError> {
        if self.fail {
            return Err(PromptError::EmptyCompletion);
        }
        Ok(format!("optimized {}", prompt))
    }
}

/// 不过期的待完成指令存储
#[derive(Default)]
pub struct MapPendingStore {
    entries: Mutex<HashMap<String, PendingCommand>>,
}

impl PendingStorePort for MapPendingStore {
    fn set(&self, session_id: &str, command: PendingCommand) {
        self.entries
            .lock()
            .unwrap()
            .insert(session_id.to_string(), command);
    }

    fn get(&self, session_id: &str) -> Option<PendingCommand> {
        self.entries.lock().unwrap().get(session_id).cloned()
    }

    fn delete(&self, session_id: &str) -> Option<PendingCommand> {
        self.entries.lock().unwrap().remove(session_id)
    }

    fn contains(&self, session_id: &str) -> bool {
        self.entries.lock().unwrap().contains_key(session_id)
    }

    fn accept_image(&self, session_id: &str, image: EncodedImage) -> Option<ImageOutcome> {
        let mut entries = self.entries.lock().unwrap();
        let outcome = entries.get_mut(session_id)?.accept_image(image);
        if outcome.is_final() {
            entries.remove(session_id);
        }
        Some(outcome)
    }

    fn purge_expired(&self) -> usize {
        0
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
