//! Query string extractor with the API error envelope.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Like [`axum::extract::Query`], but unparsable query strings are reported
/// as a 400 `validation_error`.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| QueryParams(value))
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Paging {
        limit: Option<i64>,
    }

    fn parts(uri: &str) -> Parts {
        let (parts, _) = axum::http::Request::builder()
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[tokio::test]
    async fn test_valid_query() {
        let QueryParams(paging) = QueryParams::<Paging>::from_request_parts(&mut parts("/?limit=5"), &())
            .await
            .unwrap();
        assert_eq!(paging.limit, Some(5));
    }

    #[tokio::test]
    async fn test_bad_number_is_validation_error() {
        let result = QueryParams::<Paging>::from_request_parts(&mut parts("/?limit=abc"), &()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
