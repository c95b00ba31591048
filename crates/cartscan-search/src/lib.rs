pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::SearchClient;
pub use error::{FetchError, FetchErrorKind};
pub use retry::RetryPolicy;
pub use types::SearchQuery;
