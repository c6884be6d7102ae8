mod metadata;
mod mode;

pub use metadata::{FileMetadata, MetadataIndex};
pub use mode::{RunMode, decide_mode};
