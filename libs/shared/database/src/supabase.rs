use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::StoreError;
use crate::query::{Condition, Query, SortOrder};
use crate::store::{Record, RecordStore};

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.anon_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}

fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

/// `RecordStore` backed by a PostgREST (Supabase) table named `R::TABLE`.
pub struct SupabaseStore<R> {
    supabase: Arc<SupabaseClient>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> SupabaseStore<R> {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            supabase,
            _record: PhantomData,
        }
    }

    fn table_path(&self) -> String {
        format!("/rest/v1/{}", R::TABLE)
    }

    fn row_path(&self, id: i64) -> String {
        format!("/rest/v1/{}?id=eq.{}", R::TABLE, id)
    }

    /// The database owns the id column, so it is never sent on writes.
    fn body_without_id(record: &R) -> Result<Value, StoreError> {
        let mut body = serde_json::to_value(record)?;
        if let Value::Object(map) = &mut body {
            map.remove("id");
        }
        Ok(body)
    }

    fn parse_rows(rows: Vec<Value>) -> Result<Vec<R>, StoreError> {
        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<R>, _>>()
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for SupabaseStore<R> {
    async fn insert(&self, record: R) -> Result<R, StoreError> {
        let body = Self::body_without_id(&record)?;

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, &self.table_path(), Some(body), Some(return_representation()))
            .await?;

        Self::parse_rows(result)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend(format!("Insert into {} returned no rows", R::TABLE)))
    }

    async fn get(&self, id: i64) -> Result<Option<R>, StoreError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &self.row_path(id), None)
            .await?;

        Ok(Self::parse_rows(result)?.into_iter().next())
    }

    async fn update(&self, record: R) -> Result<R, StoreError> {
        let id = record.id();
        let body = Self::body_without_id(&record)?;

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &self.row_path(id), Some(body), Some(return_representation()))
            .await?;

        Self::parse_rows(result)?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { table: R::TABLE, id })
    }

    async fn remove(&self, id: i64) -> Result<bool, StoreError> {
        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &self.row_path(id), None, Some(return_representation()))
            .await?;

        Ok(!result.is_empty())
    }

    async fn query(&self, query: &Query) -> Result<Vec<R>, StoreError> {
        let params = render_query(query);
        let path = if params.is_empty() {
            self.table_path()
        } else {
            format!("{}?{}", self.table_path(), params)
        };

        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        Self::parse_rows(result)
    }
}

/// Renders a `Query` as a PostgREST query string (without the leading `?`).
pub fn render_query(query: &Query) -> String {
    let mut parts: Vec<String> = query.conditions.iter().map(render_condition).collect();

    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|(field, order)| match order {
                SortOrder::Asc => format!("{}.asc", field),
                SortOrder::Desc => format!("{}.desc", field),
            })
            .collect::<Vec<_>>()
            .join(",");
        parts.push(format!("order={}", order));
    }

    parts.join("&")
}

fn render_condition(condition: &Condition) -> String {
    match condition {
        Condition::AnyOf(options) => {
            let inner = options
                .iter()
                .map(render_grouped)
                .collect::<Vec<_>>()
                .join(",");
            format!("or=({})", inner)
        }
        other => {
            let (field, operator, value) = split(other);
            format!("{}={}.{}", field, operator, urlencoding::encode(&value))
        }
    }
}

/// Inside `or=(...)` groups values are double-quoted so commas and
/// parentheses in search terms cannot break the group syntax.
fn render_grouped(condition: &Condition) -> String {
    match condition {
        Condition::AnyOf(options) => {
            let inner = options
                .iter()
                .map(render_grouped)
                .collect::<Vec<_>>()
                .join(",");
            format!("or({})", inner)
        }
        other => {
            let (field, operator, value) = split(other);
            let quoted = format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""));
            format!("{}.{}.{}", field, operator, urlencoding::encode(&quoted))
        }
    }
}

fn split(condition: &Condition) -> (&'static str, &'static str, String) {
    match condition {
        Condition::Eq(field, Value::Null) => (field, "is", "null".to_string()),
        Condition::Eq(field, value) => (field, "eq", scalar(value)),
        Condition::NotEq(field, value) => (field, "neq", scalar(value)),
        Condition::AtLeast(field, value) => (field, "gte", scalar(value)),
        Condition::AtMost(field, value) => (field, "lte", scalar(value)),
        Condition::Contains(field, needle) => (field, "ilike", format!("*{}*", escape_like(needle))),
        Condition::AnyOf(_) => ("or", "", String::new()),
    }
}

/// `ilike` treats `%` and `_` as wildcards; search terms match literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
