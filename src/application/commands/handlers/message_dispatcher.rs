//! Message Dispatcher - 消息事件入口
//!
//! 根据消息类型分发到画图请求或图片补发处理，并把错误折叠为回复

use tokio_util::sync::CancellationToken;

use super::image_arrival_handler::ImageArrivalHandler;
use super::imagine_handler::ImagineCommandHandler;
use crate::application::commands::{HandleOutcome, InboundMessage, MessageKind};
use crate::application::error::ApplicationError;
use crate::application::ports::Reply;
use crate::domain::command::CommandMarkers;

pub struct MessageDispatcher {
    imagine: ImagineCommandHandler,
    arrival: ImageArrivalHandler,
    markers: CommandMarkers,
}

impl MessageDispatcher {
    pub fn new(
        imagine: ImagineCommandHandler,
        arrival: ImageArrivalHandler,
        markers: CommandMarkers,
    ) -> Self {
        Self {
            imagine,
            arrival,
            markers,
        }
    }

    pub async fn handle(
        &self,
        message: InboundMessage,
        cancel: &CancellationToken,
    ) -> HandleOutcome {
        let InboundMessage {
            kind,
            content,
            context,
        } = message;

        let result = match kind {
            MessageKind::ImageCreate => {
                tracing::info!(
                    session_id = %context.session_id,
                    content = %content,
                    "Handling image create request"
                );
                self.imagine
                    .handle(&content, &context, cancel)
                    .await
                    .map(Some)
            }
            MessageKind::Image => self.arrival.handle(&content, &context, cancel).await,
            MessageKind::Other => Ok(None),
        };

        match result {
            Ok(Some(reply)) => HandleOutcome::handled(reply),
            Ok(None) => HandleOutcome::ignored(),
            Err(ApplicationError::Command(e)) => {
                tracing::warn!(session_id = %context.session_id, error = %e, "Invalid command");
                HandleOutcome::handled(Reply::error(e.to_string()))
            }
            Err(e) => {
                tracing::error!(
                    session_id = %context.session_id,
                    error = ?e,
                    "Message handling failed"
                );
                HandleOutcome::failed(Reply::error(format!("[RP] {}", e)))
            }
        }
    }

    /// 帮助文本
    pub fn help_text(&self, verbose: bool) -> String {
        let markers = &self.markers;
        if markers.trigger.is_empty() {
            return "画图功能未启用".to_string();
        }

        let mut text = "使用Midjourney来画图，支持垫图、合图、变换操作\n".to_string();
        if verbose {
            text.push_str(&format!(
                "使用方法:\n\
                 使用\"{t}[内容描述]\"的格式作画，如\"{t}一个中国漂亮女孩\"\n\
                 垫图指令：{t} {p} [内容描述]，随后发送一张图片\n\
                 合图指令：{t} {b} 2，随后发送2张图片，数量仅限2-5张\n\
                 变换指令：{t} {c} 任务ID U1，U/V 后接1-4",
                t = markers.trigger,
                p = markers.image_ins,
                b = markers.blend_ins,
                c = markers.change_ins,
            ));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::commands::{EventAction, ImagineSettings};
    use crate::application::ports::{MessageContext, PendingStorePort, ReplyKind};
    use crate::application::services::{
        GenerationFlow, PollConfig, RelayConfig, ResultRelay, TaskPoller,
    };
    use crate::application::test_support::{
        FakeImageProcessor, FakeMidjourneyApi, FakeOptimizer, FakeShortener, MapPendingStore,
        RecordingSender, SubmitCall,
    };
    use crate::domain::generation::{
        BlendDimensions, ChangeAction, DefaultParams, EncodedImage, GenerationTask, TaskStatus,
    };
    use crate::domain::PendingCommand;

    struct Harness {
        api: Arc<FakeMidjourneyApi>,
        sender: Arc<RecordingSender>,
        store: Arc<MapPendingStore>,
        dispatcher: MessageDispatcher,
    }

    fn harness(settings: ImagineSettings, optimizer_fails: bool) -> Harness {
        let api = Arc::new(FakeMidjourneyApi::new());
        let sender = Arc::new(RecordingSender::new());
        let store = Arc::new(MapPendingStore::default());
        let images = Arc::new(FakeImageProcessor::new());

        let flow = Arc::new(GenerationFlow::new(
            api.clone(),
            TaskPoller::new(api.clone(), PollConfig::default()),
            ResultRelay::new(
                sender.clone(),
                Arc::new(FakeShortener),
                images.clone(),
                RelayConfig::default(),
            ),
        ));

        let markers = settings.markers.clone();
        let dispatcher = MessageDispatcher::new(
            ImagineCommandHandler::new(
                settings,
                store.clone(),
                Arc::new(FakeOptimizer {
                    fail: optimizer_fails,
                }),
                flow.clone(),
            ),
            ImageArrivalHandler::new(store.clone(), images, flow, BlendDimensions::Square),
            markers,
        );

        Harness {
            api,
            sender,
            store,
            dispatcher,
        }
    }

    fn message(kind: MessageKind, content: &str) -> InboundMessage {
        InboundMessage {
            kind,
            content: content.to_string(),
            context: MessageContext::new("s1"),
        }
    }

    fn encoded(path: &str) -> EncodedImage {
        EncodedImage::from_bytes(path.as_bytes())
    }

    #[tokio::test]
    async fn test_plain_prompt_runs_full_flow() {
        let h = harness(ImagineSettings::default(), false);

        let outcome = h
            .dispatcher
            .handle(
                message(MessageKind::ImageCreate, "a cat --ar 16:9"),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome.action, EventAction::BreakPass);
        assert_eq!(outcome.reply, Some(Reply::text("任务完成！")));
        assert_eq!(
            h.api.calls(),
            vec![SubmitCall::Imagine {
                prompt: "a cat --ar 16:9".to_string(),
                seed: None,
            }]
        );

        let sent = h.sender.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].as_text().unwrap_or_default().contains("1000"));
        assert_eq!(sent[1].kind, ReplyKind::Image);
    }

    #[tokio::test]
    async fn test_vendor_failure_is_relayed_as_text() {
        let h = harness(ImagineSettings::default(), false);
        h.api.set_default_fetch(GenerationTask {
            status: TaskStatus::Failed,
            fail_reason: Some("banned prompt".to_string()),
            ..Default::default()
        });

        let outcome = h
            .dispatcher
            .handle(message(MessageKind::ImageCreate, "a cat"), &CancellationToken::new())
            .await;

        assert_eq!(outcome.reply, Some(Reply::text("banned prompt")));
        // 只有提交成功提示
        assert_eq!(h.sender.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_seed_flow_submits_with_image() {
        let settings = ImagineSettings {
            default_params: DefaultParams {
                prompt: "masterpiece".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let h = harness(settings, false);

        let outcome = h
            .dispatcher
            .handle(message(MessageKind::ImageCreate, "/p a dog"), &CancellationToken::new())
            .await;
        assert_eq!(outcome.reply, Some(Reply::info("请发送一张图片给我")));
        assert_eq!(
            h.store.get("s1"),
            Some(PendingCommand::image_seed("masterpiece, a dog"))
        );
        assert!(h.api.calls().is_empty());

        let outcome = h
            .dispatcher
            .handle(message(MessageKind::Image, "tmp/seed.png"), &CancellationToken::new())
            .await;
        assert_eq!(outcome.action, EventAction::BreakPass);
        assert!(!h.store.contains("s1"));
        assert_eq!(
            h.api.calls(),
            vec![SubmitCall::Imagine {
                prompt: "masterpiece, a dog".to_string(),
                seed: Some(encoded("tmp/seed.png")),
            }]
        );
    }

    #[tokio::test]
    async fn test_blend_collects_in_order_and_clears_before_submit() {
        let h = harness(ImagineSettings::default(), false);
        h.api.watch_pending(h.store.clone(), "s1");
        let cancel = CancellationToken::new();

        let outcome = h
            .dispatcher
            .handle(message(MessageKind::ImageCreate, "/b 3"), &cancel)
            .await;
        assert_eq!(outcome.reply, Some(Reply::info("请直接发送3张图片给我")));

        let outcome = h
            .dispatcher
            .handle(message(MessageKind::Image, "tmp/a.png"), &cancel)
            .await;
        assert_eq!(outcome.reply.map(|r| r.kind), Some(ReplyKind::Info));
        h.dispatcher
            .handle(message(MessageKind::Image, "tmp/b.png"), &cancel)
            .await;
        assert!(h.api.calls().is_empty());

        h.dispatcher
            .handle(message(MessageKind::Image, "tmp/c.png"), &cancel)
            .await;

        assert_eq!(
            h.api.calls(),
            vec![SubmitCall::Blend {
                images: vec![encoded("tmp/a.png"), encoded("tmp/b.png"), encoded("tmp/c.png")],
                dimensions: BlendDimensions::Square,
            }]
        );
        assert_eq!(h.api.pending_seen_at_blend(), Some(false));
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_blend_count_out_of_range_is_usage_error() {
        let h = harness(ImagineSettings::default(), false);

        for content in ["/b 0", "/b 1", "/b 6", "/b", "/b two"] {
            let outcome = h
                .dispatcher
                .handle(message(MessageKind::ImageCreate, content), &CancellationToken::new())
                .await;
            assert_eq!(outcome.action, EventAction::BreakPass, "{}", content);
            let reply = outcome.reply.unwrap();
            assert_eq!(reply.kind, ReplyKind::Error);
            assert!(reply.as_text().unwrap_or_default().contains("合图数量仅限2-5张"));
        }
        assert!(h.store.is_empty());
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_change_command() {
        let h = harness(ImagineSettings::default(), false);

        let outcome = h
            .dispatcher
            .handle(
                message(MessageKind::ImageCreate, "/c 8528881058085979  V1"),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(outcome.action, EventAction::BreakPass);
        assert_eq!(
            h.api.calls(),
            vec![SubmitCall::Change("8528881058085979 V1".to_string())]
        );

        let outcome = h
            .dispatcher
            .handle(
                message(MessageKind::ImageCreate, "/c 8528881058085979 V5"),
                &CancellationToken::new(),
            )
            .await;
        let reply = outcome.reply.unwrap();
        assert_eq!(reply.kind, ReplyKind::Error);
        assert!(reply.as_text().unwrap_or_default().contains("格式不正确"));
        assert_eq!(h.api.calls().len(), 1);
        assert_eq!(ChangeAction::from_letter('V'), Some(ChangeAction::Variation));
    }

    #[tokio::test]
    async fn test_prompt_optimization_toggle() {
        let settings = ImagineSettings {
            gpt_optimized: true,
            ..Default::default()
        };
        let h = harness(settings.clone(), false);
        h.dispatcher
            .handle(message(MessageKind::ImageCreate, "a cat --v 5"), &CancellationToken::new())
            .await;
        assert_eq!(
            h.api.calls(),
            vec![SubmitCall::Imagine {
                prompt: "optimized a cat --v 5".to_string(),
                seed: None,
            }]
        );

        let h = harness(settings, true);
        h.dispatcher
            .handle(message(MessageKind::ImageCreate, "a cat"), &CancellationToken::new())
            .await;
        assert_eq!(
            h.api.calls(),
            vec![SubmitCall::Imagine {
                prompt: "a cat".to_string(),
                seed: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_unrelated_messages_pass_through() {
        let h = harness(ImagineSettings::default(), false);

        let outcome = h
            .dispatcher
            .handle(message(MessageKind::Image, "tmp/a.png"), &CancellationToken::new())
            .await;
        assert_eq!(outcome, HandleOutcome::ignored());

        let outcome = h
            .dispatcher
            .handle(message(MessageKind::Other, "hello"), &CancellationToken::new())
            .await;
        assert_eq!(outcome, HandleOutcome::ignored());
    }

    #[tokio::test]
    async fn test_image_read_failure_is_wrapped() {
        let h = harness(ImagineSettings::default(), false);
        h.store.set("s1", PendingCommand::image_seed("a dog"));

        let outcome = h
            .dispatcher
            .handle(message(MessageKind::Image, ""), &CancellationToken::new())
            .await;

        assert_eq!(outcome.action, EventAction::Continue);
        let reply = outcome.reply.unwrap();
        assert!(reply.as_text().unwrap_or_default().starts_with("[RP] "));
        // 读图失败时保留状态，用户可以重发
        assert!(h.store.contains("s1"));
    }

    #[test]
    fn test_help_text() {
        let h = harness(ImagineSettings::default(), false);
        let short = h.dispatcher.help_text(false);
        let verbose = h.dispatcher.help_text(true);
        assert!(!short.contains("使用方法"));
        assert!(verbose.contains("画 /b 2"));
        assert!(verbose.contains("画 /c 任务ID U1"));
    }
}
