// src/services/mod.rs

pub mod admin;
pub mod content;
pub mod http;
pub mod kv;
pub mod publish;

pub use admin::{AdminGate, AdminSession};
pub use content::{ContentBackend, ContentStore, DeviceCache};
pub use kv::{KvOperationError, KvOperations};
pub use publish::{GitPublishBackend, Publisher};
