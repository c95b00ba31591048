pub mod buckets;
pub mod error;
pub mod writer;

pub use buckets::{BucketProvider, GcsBuckets, LocalBuckets, MemoryBuckets};
pub use error::StorageError;
pub use writer::write_json;
