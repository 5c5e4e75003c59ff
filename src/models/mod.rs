pub mod content;
pub mod extraction;
pub mod language;
pub mod record;

pub use content::{ContentNode, NodeMatcher};
pub use extraction::ExtractionResult;
pub use language::{parse_id_range, Language};
pub use record::{ImageRef, Record, Translation, DEFAULT_IMAGE};
