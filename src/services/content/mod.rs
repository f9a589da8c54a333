pub mod backend;
pub mod cache;
pub mod defaults;
pub mod merge;
pub mod store;

pub use backend::{
    serialize_document, BlobContentBackend, BrokeredPublishBackend, ContentBackend, NoBackend,
};
#[cfg(target_arch = "wasm32")]
pub use cache::LocalStorageCache;
pub use cache::{DeviceCache, MemoryDeviceCache};
pub use defaults::{default_content, TOP_LEVEL_KEYS};
pub use merge::{deep_merge, get_path, set_path, with_path};
pub use store::{ContentStore, LoadReport, SourceOutcome};
