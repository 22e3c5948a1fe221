pub mod error;
pub mod filter;
pub mod selector;

pub use error::{AllocationError, AllocationErrorKind};
pub use filter::{PoolCandidateFilter, V1_CONTENT_LIMIT};
pub use selector::AutobindSelector;
