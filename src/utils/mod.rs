pub mod errors;
pub mod retry;
pub mod table;

pub use errors::SessionError;
pub use retry::{with_retry, RetryPolicy};
pub use table::Table;
