//! Worker Layer - Background Task Processing
//!
//! 实现 PendingSweeper，定期清理过期的会话状态

mod pending_sweeper;

pub use pending_sweeper::PendingSweeper;
