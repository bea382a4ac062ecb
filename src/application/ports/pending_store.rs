//! Pending Store Port - 多轮指令状态缓存
//!
//! 以会话 ID 为键保存未完成的垫图/合图状态，条目在无活动一段时间后自动失效，
//! 具体实现在 infrastructure/memory 层

use crate::domain::generation::EncodedImage;
use crate::domain::{ImageOutcome, PendingCommand};

/// Pending Store Port
///
/// 所有操作都是按会话键的原子操作，可被并发调用。
/// `set`、`get`、`contains`、`accept_image` 命中时都算一次活动，顺延过期时间
pub trait PendingStorePort: Send + Sync {
    /// 写入状态，覆盖该会话已有的状态
    fn set(&self, session_id: &str, command: PendingCommand);

    /// 读取状态，过期条目视为不存在
    fn get(&self, session_id: &str) -> Option<PendingCommand>;

    /// 删除并返回状态
    fn delete(&self, session_id: &str) -> Option<PendingCommand>;

    /// 是否存在未过期状态
    fn contains(&self, session_id: &str) -> bool;

    /// 把一张图片交给该会话的待完成指令
    ///
    /// 读取、累加、写回在同一把锁内完成；指令就绪时一并移除状态。
    /// 没有未过期状态时返回 None
    fn accept_image(&self, session_id: &str, image: EncodedImage) -> Option<ImageOutcome>;

    /// 清理所有过期条目，返回清理数量
    fn purge_expired(&self) -> usize;

    /// 当前条目数（包括尚未清理的过期条目）
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
