use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    Response,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION, CONTENT_RANGE},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::query::{Changeset, RestQuery};

/// Persistence gateway over PostgREST. Built once at startup and shared by the
/// services; the service-role key is sent on every call, so row scoping is the
/// caller's job (e.g. always filtering appointments by `patient_id`).
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            api_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        Ok(headers)
    }

    async fn send(&self, method: Method, path: &str,
                  body: Option<Value>, extra_headers: Option<HeaderMap>)
                  -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        Ok(response)
    }

    async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, body, None).await
    }

    async fn request_with_headers<T>(&self, method: Method, path: &str,
                                  body: Option<Value>, headers: Option<HeaderMap>)
                                  -> Result<T>
    where T: DeserializeOwned {
        let response = self.send(method, path, body, headers).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Typed rows matching `query`.
    pub async fn select<T>(&self, query: &RestQuery) -> Result<Vec<T>>
    where T: DeserializeOwned {
        self.request(Method::GET, &query.to_path(), None).await
    }

    /// Exact number of rows matching `query`'s filters.
    pub async fn count(&self, query: &RestQuery) -> Result<u64> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));

        let response = self.send(Method::HEAD, &query.to_path(), None, Some(headers)).await?;

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| anyhow!("Count response for {} has no Content-Range header", query.table_name()))?;

        parse_content_range_total(range)
            .ok_or_else(|| anyhow!("Unexpected Content-Range '{}' for {}", range, query.table_name()))
    }

    pub async fn insert(&self, table: &str, row: Value) -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        let path = RestQuery::table(table).to_path();
        self.send(Method::POST, &path, Some(row), Some(headers)).await?;
        Ok(())
    }

    /// Applies `changes` to every row matching `query` and returns how many
    /// rows were affected. An empty changeset is refused before any request.
    pub async fn update(&self, query: &RestQuery, changes: Changeset) -> Result<usize> {
        if changes.is_empty() {
            return Err(anyhow!("Refusing empty update on {}", query.table_name()));
        }

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let rows: Vec<Value> = self.request_with_headers(
            Method::PATCH,
            &query.to_path(),
            Some(changes.into_body()),
            Some(headers),
        ).await?;

        Ok(rows.len())
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

/// Total from a PostgREST `Content-Range` value such as `0-19/45` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{MockServer, Mock, ResponseTemplate};
    use wiremock::matchers::{body_json, header, method, path, query_param};

    fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&AppConfig {
            supabase_url: format!("{}/", server.uri()),
            supabase_service_key: "service-key".to_string(),
            supabase_jwt_secret: String::new(),
            auth_test_mode: false,
            server_port: 8080,
        })
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-19/45"), Some(45));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-19/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[tokio::test]
    async fn test_select_sends_service_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/doctors"))
            .and(query_param("id", "eq.abc"))
            .and(header("apikey", "service-key"))
            .and(header("Authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "abc" }])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let rows: Vec<Value> = client.select(&RestQuery::table("doctors").eq("id", "abc")).await.unwrap();
        assert_eq!(rows, vec![json!({ "id": "abc" })]);
    }

    #[tokio::test]
    async fn test_count_reads_content_range() {
        let mock_server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/rest/v1/appointments"))
            .and(header("Prefer", "count=exact"))
            .respond_with(ResponseTemplate::new(200).insert_header("Content-Range", "0-19/45"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let total = client.count(&RestQuery::table("appointments").eq("patient_id", "p-1")).await.unwrap();
        assert_eq!(total, 45);
    }

    #[tokio::test]
    async fn test_update_counts_returned_rows() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/appointments"))
            .and(body_json(json!({ "status": "cancelled" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let affected = client
            .update(
                &RestQuery::table("appointments").eq("id", "a-1"),
                Changeset::new().set("status", "cancelled"),
            )
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_update_refuses_empty_changeset() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "a-1" }])))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let error = client
            .update(&RestQuery::table("appointments").eq("id", "a-1"), Changeset::new())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("empty update"));
    }

    #[tokio::test]
    async fn test_error_status_surfaces() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/appointments"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let error = client.insert("appointments", json!({ "id": "a-1" })).await.unwrap_err();
        assert!(error.to_string().contains("500"));
    }
}
