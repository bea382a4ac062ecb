//! Application State

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::{MessageDispatcher, PendingStorePort};

/// 应用状态
pub struct AppState {
    pub dispatcher: Arc<MessageDispatcher>,
    pub pending_store: Arc<dyn PendingStorePort>,
    /// 服务关闭时取消，正在等待出图的请求随之结束
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        dispatcher: Arc<MessageDispatcher>,
        pending_store: Arc<dyn PendingStorePort>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            dispatcher,
            pending_store,
            shutdown,
        }
    }
}
