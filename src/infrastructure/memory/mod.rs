//! Memory Layer - In-Memory State Management
//!
//! 实现 PendingStore，按会话缓存垫图/合图的中间状态

mod pending_store;

pub use pending_store::InMemoryPendingStore;
