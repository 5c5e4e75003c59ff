pub mod failure_log;
pub mod image_cache;
pub mod record_store;

pub use failure_log::FailureLog;
pub use image_cache::ImageCache;
pub use record_store::RecordStore;
