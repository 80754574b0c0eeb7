//! Request extractors that report malformed input as 422 validation errors.

use std::collections::HashMap;

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use bytes::Bytes;
use petstore_core::{Choice, FieldViolation, Loc, Validate, ValidationErrors};
use serde_json::Value;

use super::error::ApiError;

/// Largest `limit` accepted on list endpoints.
pub const MAX_PAGE_SIZE: usize = 100;

/// JSON body validated field by field into `T`.
///
/// Undecodable JSON and an empty body are reported as violations at
/// `["body"]`; everything else is delegated to [`Validate`].
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await?;
        if body.is_empty() {
            return Err(ApiError::invalid(
                vec![Loc::from("body")],
                "Field required",
                "missing",
            ));
        }
        let payload: Value = serde_json::from_slice(&body).map_err(|err| {
            ApiError::invalid(
                vec![Loc::from("body"), Loc::from(err.column())],
                format!("JSON decode error: {err}"),
                "json_invalid",
            )
        })?;
        Ok(Self(T::validate(&payload)?))
    }
}

/// Record identifier taken from the `{id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub u64);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // A segment that does not even decode to UTF-8 is still a bad id.
        Path::<String>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Path(raw)| raw.parse::<u64>().ok())
            .map(Self)
            .ok_or_else(|| {
                ApiError::invalid(
                    vec![Loc::from("path"), Loc::from("id")],
                    "Input should be a valid integer, unable to parse string as an integer",
                    "int_parsing",
                )
            })
    }
}

/// Offset/limit window over a list snapshot. No limit means "to the end".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Page {
    /// Applies the window to `records`.
    #[must_use]
    pub fn apply<R>(self, records: Vec<R>) -> Vec<R> {
        records
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

/// Raw query-string parameters of a list request.
#[derive(Debug, Default)]
pub struct ListQuery(HashMap<String, String>);

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) =
            Query::<HashMap<String, String>>::from_request_parts(parts, state).await?;
        Ok(Self(params))
    }
}

impl ListQuery {
    /// Starts reading parameters, accumulating violations.
    #[must_use]
    pub fn reader(&self) -> QueryReader<'_> {
        QueryReader {
            params: &self.0,
            violations: Vec::new(),
        }
    }
}

impl From<HashMap<String, String>> for ListQuery {
    fn from(params: HashMap<String, String>) -> Self {
        Self(params)
    }
}

/// Accumulating reader over query parameters, the query-string counterpart
/// of [`petstore_core::FieldReader`]. Empty values count as absent.
pub struct QueryReader<'a> {
    params: &'a HashMap<String, String>,
    violations: Vec<FieldViolation>,
}

impl<'a> QueryReader<'a> {
    fn get(&self, name: &str) -> Option<&'a str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    fn reject(&mut self, name: &str, msg: impl Into<String>, kind: &'static str) {
        self.violations.push(FieldViolation::new(
            vec![Loc::from("query"), Loc::from(name)],
            msg,
            kind,
        ));
    }

    /// A free-text equality filter.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(ToString::to_string)
    }

    /// A filter restricted to a closed set of values.
    pub fn choice<E: Choice>(&mut self, name: &str) -> Option<E> {
        let raw = self.get(name)?;
        let parsed = E::parse(raw);
        if parsed.is_none() {
            self.reject(name, E::expected_message(), "enum");
        }
        parsed
    }

    fn integer(&mut self, name: &str) -> Option<i64> {
        let raw = self.get(name)?;
        let parsed = raw.parse::<i64>().ok();
        if parsed.is_none() {
            self.reject(
                name,
                "Input should be a valid integer, unable to parse string as an integer",
                "int_parsing",
            );
        }
        parsed
    }

    /// `offset` (>= 0, default 0) and `limit` (1..=100, default unbounded).
    pub fn page(&mut self) -> Page {
        let offset = match self.integer("offset") {
            Some(offset) if offset < 0 => {
                self.reject(
                    "offset",
                    "Input should be greater than or equal to 0",
                    "greater_than_equal",
                );
                0
            }
            Some(offset) => usize::try_from(offset).unwrap_or(usize::MAX),
            None => 0,
        };
        let limit = match self.integer("limit") {
            Some(limit) if limit < 1 => {
                self.reject(
                    "limit",
                    "Input should be greater than or equal to 1",
                    "greater_than_equal",
                );
                None
            }
            Some(limit) if !usize::try_from(limit).is_ok_and(|l| l <= MAX_PAGE_SIZE) => {
                self.reject(
                    "limit",
                    format!("Input should be less than or equal to {MAX_PAGE_SIZE}"),
                    "less_than_equal",
                );
                None
            }
            Some(limit) => usize::try_from(limit).ok(),
            None => None,
        };
        Page { offset, limit }
    }

    /// Returns `value` if no violation was recorded.
    ///
    /// # Errors
    ///
    /// Returns all recorded violations as [`ApiError::Validation`].
    pub fn finish<T>(self, value: T) -> Result<T, ApiError> {
        match ValidationErrors::from_violations(self.violations) {
            Some(errors) => Err(ApiError::Validation(errors)),
            None => Ok(value),
        }
    }
}
