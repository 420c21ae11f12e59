//! Conversation sessions

pub mod pool;

pub use pool::SessionPool;
