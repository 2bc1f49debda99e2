// Generic REST endpoint helper
//
// CRUD over one resource path (`P`, `P/{id}`), plus filtered reads. No shape
// validation and no pagination; callers pick the resource type.

use std::fmt::Display;

use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;

use crate::error::Error;
use crate::http::{ApiResponse, HttpClient};

/// CRUD helper bound to a single collection path.
#[derive(Debug, Clone)]
pub struct Endpoint {
    http: HttpClient,
    path: String,
}

impl Endpoint {
    pub fn new(http: HttpClient, path: impl Into<String>) -> Self {
        Self {
            http,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// `P/{id}`, tolerating a trailing slash on the collection path.
    pub fn item_path(&self, id: impl Display) -> String {
        format!("{}/{id}", self.path.trim_end_matches('/'))
    }

    /// `GET P`
    pub async fn get_all<R: DeserializeOwned>(&self) -> Result<ApiResponse<Vec<R>>, Error> {
        self.http.get(&self.path).await
    }

    /// `GET P/{id}`
    pub async fn get_by_id<R: DeserializeOwned>(&self, id: u64) -> Result<ApiResponse<R>, Error> {
        self.http.get(&self.item_path(id)).await
    }

    /// `GET P?key=value&...`, then keep only the rows whose fields match
    /// every filter.
    ///
    /// The query lets a json-server style backend filter for us; the local
    /// pass makes the result identical when the backend ignores it. Row
    /// order is preserved.
    pub async fn get_where<R: DeserializeOwned>(
        &self,
        filters: &[(&str, String)],
    ) -> Result<ApiResponse<Vec<R>>, Error> {
        let resp: ApiResponse<Vec<Value>> = self.http.get_with_query(&self.path, filters).await?;
        let status = resp.status;

        let Some(rows) = resp.data else {
            return Ok(ApiResponse::new(status, None));
        };

        let matched = rows
            .into_iter()
            .filter(|row| row_matches(row, filters))
            .map(serde_json::from_value)
            .collect::<Result<Vec<R>, _>>()
            .map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: String::new(),
            })?;

        Ok(ApiResponse::new(status, Some(matched)))
    }

    /// `POST P`
    pub async fn create<R, B>(&self, resource: &B) -> Result<ApiResponse<R>, Error>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.http.post(&self.path, resource).await
    }

    /// `PUT P/{id}`
    pub async fn update<R, B>(&self, id: u64, resource: &B) -> Result<ApiResponse<R>, Error>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.http.put(&self.item_path(id), resource).await
    }

    /// `PATCH P/{id}` with a partial body.
    pub async fn patch<R, B>(&self, id: u64, partial: &B) -> Result<ApiResponse<R>, Error>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.http.patch(&self.item_path(id), partial).await
    }

    /// `DELETE P/{id}`. Any response body is discarded.
    pub async fn delete(&self, id: u64) -> Result<u16, Error> {
        let resp: ApiResponse<IgnoredAny> = self.http.delete(&self.item_path(id)).await?;
        Ok(resp.status)
    }
}

/// True when every filter names a field whose scalar value renders to the
/// filter's string. Missing fields and non-scalar values never match.
pub(crate) fn row_matches(row: &Value, filters: &[(&str, String)]) -> bool {
    filters.iter().all(|(key, expected)| match row.get(*key) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == *expected,
        Some(Value::Bool(b)) => b.to_string() == *expected,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_filter_matches_number_field() {
        let row = json!({"id": 3, "builderId": 1});
        assert!(row_matches(&row, &[("builderId", "1".into())]));
        assert!(!row_matches(&row, &[("builderId", "2".into())]));
    }

    #[test]
    fn string_and_bool_filters() {
        let row = json!({"status": "active", "hasAPI": true});
        assert!(row_matches(
            &row,
            &[("status", "active".into()), ("hasAPI", "true".into())]
        ));
    }

    #[test]
    fn missing_field_never_matches() {
        let row = json!({"id": 3});
        assert!(!row_matches(&row, &[("builderId", "1".into())]));
    }

    #[test]
    fn no_filters_matches_everything() {
        assert!(row_matches(&json!({"id": 1}), &[]));
    }
}
