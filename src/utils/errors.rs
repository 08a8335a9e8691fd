use thiserror::Error;

use crate::api::ApiError;

/// Failures surfaced to the user. None of them ends the session; each is
/// recoverable by a later action.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Could not load the product catalog: {0}")]
    CatalogLoadFailed(ApiError),
    #[error("Could not load price history for {product}: {source}")]
    HistoryFetchFailed { product: String, source: ApiError },
    #[error("Could not compare store prices: {0}")]
    CheapestQueryFailed(ApiError),
    #[error("Device location unavailable: {0}")]
    GeolocationUnavailable(ApiError),
}
