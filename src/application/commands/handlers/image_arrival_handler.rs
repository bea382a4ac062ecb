//! Image Arrival Handler - 处理多轮指令中用户补发的图片

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::error::ApplicationError;
use crate::application::ports::{ImageProcessorPort, MessageContext, PendingStorePort, Reply};
use crate::application::services::{GenerationFlow, Submission};
use crate::domain::generation::BlendDimensions;
use crate::domain::{BlendProgress, ImageOutcome};

/// ImageArrival Handler
///
/// 同一会话的图片可能并发到达，累加交给 `PendingStorePort::accept_image` 原子完成
pub struct ImageArrivalHandler {
    pending_store: Arc<dyn PendingStorePort>,
    images: Arc<dyn ImageProcessorPort>,
    flow: Arc<GenerationFlow>,
    blend_dimensions: BlendDimensions,
}

impl ImageArrivalHandler {
    pub fn new(
        pending_store: Arc<dyn PendingStorePort>,
        images: Arc<dyn ImageProcessorPort>,
        flow: Arc<GenerationFlow>,
        blend_dimensions: BlendDimensions,
    ) -> Self {
        Self {
            pending_store,
            images,
            flow,
            blend_dimensions,
        }
    }

    /// 会话没有待完成指令时返回 None
    pub async fn handle(
        &self,
        image_path: &str,
        context: &MessageContext,
        cancel: &CancellationToken,
    ) -> Result<Option<Reply>, ApplicationError> {
        let session_id = context.session_id.as_str();
        if !self.pending_store.contains(session_id) {
            return Ok(None);
        }

        // 编码在加锁之外完成，读取失败时状态保持不变
        let image = self.images.encode_file(Path::new(image_path)).await?;
        let Some(outcome) = self.pending_store.accept_image(session_id, image) else {
            tracing::debug!(session_id = %session_id, "Pending command gone before image was accepted");
            return Ok(None);
        };

        match outcome {
            ImageOutcome::SeedReady { prompt, image } => {
                tracing::info!(session_id = %session_id, "Seed image received, submitting");
                let reply = self
                    .flow
                    .run(
                        Submission::Imagine {
                            prompt,
                            seed: Some(image),
                        },
                        context,
                        cancel,
                    )
                    .await?;
                Ok(Some(reply))
            }
            ImageOutcome::Blend(BlendProgress::Waiting {
                received,
                remaining,
            }) => {
                tracing::debug!(
                    session_id = %session_id,
                    received = received,
                    remaining = remaining,
                    "Blend image collected"
                );
                Ok(Some(Reply::info(format!(
                    "已收到第{}张图片，还需发送{}张",
                    received, remaining
                ))))
            }
            ImageOutcome::Blend(BlendProgress::Complete(images)) => {
                tracing::info!(
                    session_id = %session_id,
                    count = images.len(),
                    "Blend images complete, submitting"
                );
                let reply = self
                    .flow
                    .run(
                        Submission::Blend {
                            images,
                            dimensions: self.blend_dimensions,
                        },
                        context,
                        cancel,
                    )
                    .await?;
                Ok(Some(reply))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ReplyKind;
    use crate::application::services::{PollConfig, RelayConfig, ResultRelay, TaskPoller};
    use crate::application::test_support::{
        FakeImageProcessor, FakeMidjourneyApi, FakeShortener, RecordingSender, SubmitCall,
    };
    use crate::domain::generation::EncodedImage;
    use crate::domain::PendingCommand;
    use crate::infrastructure::memory::InMemoryPendingStore;

    struct Fixture {
        api: Arc<FakeMidjourneyApi>,
        store: Arc<InMemoryPendingStore>,
        handler: ImageArrivalHandler,
    }

    fn fixture() -> Fixture {
        let api = Arc::new(FakeMidjourneyApi::new());
        let store = InMemoryPendingStore::default().arc();
        let images = Arc::new(FakeImageProcessor::yielding());
        let flow = Arc::new(GenerationFlow::new(
            api.clone(),
            TaskPoller::new(api.clone(), PollConfig::default()),
            ResultRelay::new(
                Arc::new(RecordingSender::new()),
                Arc::new(FakeShortener),
                images.clone(),
                RelayConfig::default(),
            ),
        ));
        let handler = ImageArrivalHandler::new(store.clone(), images, flow, BlendDimensions::Square);

        Fixture {
            api,
            store,
            handler,
        }
    }

    fn encoded(path: &str) -> EncodedImage {
        EncodedImage::from_bytes(path.as_bytes())
    }

    #[tokio::test]
    async fn test_concurrent_blend_images_are_all_collected() {
        let f = fixture();
        f.store.set("s1", PendingCommand::blend_seed("", 2));
        let context = MessageContext::new("s1");
        let cancel = CancellationToken::new();

        let (first, second) = tokio::join!(
            f.handler.handle("tmp/a.png", &context, &cancel),
            f.handler.handle("tmp/b.png", &context, &cancel),
        );
        let replies = [first.unwrap().unwrap(), second.unwrap().unwrap()];

        let infos: Vec<_> = replies
            .iter()
            .filter(|r| r.kind == ReplyKind::Info)
            .collect();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].as_text(), Some("已收到第1张图片，还需发送1张"));

        let calls = f.api.calls();
        assert_eq!(calls.len(), 1);
        let SubmitCall::Blend { images, .. } = &calls[0] else {
            panic!("expected a blend submission, got {:?}", calls[0]);
        };
        assert_eq!(images.len(), 2);
        assert!(images.contains(&encoded("tmp/a.png")));
        assert!(images.contains(&encoded("tmp/b.png")));
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_seed_images_submit_once() {
        let f = fixture();
        f.store.set("s1", PendingCommand::image_seed("a cat"));
        let context = MessageContext::new("s1");
        let cancel = CancellationToken::new();

        let (first, second) = tokio::join!(
            f.handler.handle("tmp/a.png", &context, &cancel),
            f.handler.handle("tmp/b.png", &context, &cancel),
        );
        let handled = [first.unwrap(), second.unwrap()]
            .iter()
            .filter(|r| r.is_some())
            .count();

        assert_eq!(handled, 1);
        assert_eq!(f.api.calls().len(), 1);
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn test_image_without_pending_state_is_declined() {
        let f = fixture();
        let reply = f
            .handler
            .handle("tmp/a.png", &MessageContext::new("s1"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(reply.is_none());
        assert!(f.api.calls().is_empty());
    }
}
