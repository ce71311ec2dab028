use crate::api::error::{ApiError, Result};
use crate::api::types::{ConversionRequest, Job, UploadResult};
use crate::config::ApiConfig;
use reqwest::multipart;
use std::time::Duration;

/// Connect timeout for API requests. Requests themselves carry no
/// overall deadline; a slow conversion backend may legitimately take
/// its time answering.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Typed wrapper over the conversion service's HTTP API.
///
/// One request/response exchange per operation, no retries. Cheap to
/// clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with connect timeout: {}", e);
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolve a job's relative `output_url` against the API origin.
    /// Absolute URLs pass through untouched.
    pub fn media_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        self.url(path)
    }

    /// Upload a manifest file, returning the server-assigned filename
    /// token for a subsequent convert call.
    pub async fn upload(&self, file_name: &str, data: Vec<u8>) -> Result<UploadResult> {
        let part = multipart::Part::bytes(data).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(server_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Start a conversion. The returned job is `pending`, or already
    /// `converting` if a worker picked it up immediately.
    pub async fn convert(&self, request: &ConversionRequest) -> Result<Job> {
        let response = self
            .http
            .post(self.url("/convert"))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(server_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Fetch a single job snapshot.
    pub async fn fetch_job(&self, id: &str) -> Result<Job> {
        let response = self
            .http
            .get(self.url(&format!("/jobs/{}", id)))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::not_found(id));
        }
        if !response.status().is_success() {
            return Err(server_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// List all jobs known to the server, in server order.
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let response = self.http.get(self.url("/jobs")).send().await?;
        if !response.status().is_success() {
            return Err(server_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Delete a job and its artifact server-side. Surfaces `NotFound`
    /// for an unknown id; whether that counts as success is the
    /// caller's policy (see [`crate::convert::remove_job`]).
    pub async fn delete_job(&self, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/jobs/{}", id)))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::not_found(id));
        }
        if !response.status().is_success() {
            return Err(server_error(response).await);
        }
        Ok(())
    }

    /// Liveness probe against the service.
    pub async fn health(&self) -> Result<()> {
        let response = self.http.get(self.url("/health")).send().await?;
        if !response.status().is_success() {
            return Err(server_error(response).await);
        }
        Ok(())
    }
}

/// Turn a non-success response into a `Server` error, keeping the raw
/// body as diagnostic text.
async fn server_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ApiError::Server { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: "http://localhost:8000/".to_string(),
        })
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client().base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_media_url_resolves_relative_paths() {
        assert_eq!(
            client().media_url("/converted/j1.mp4"),
            "http://localhost:8000/converted/j1.mp4"
        );
    }

    #[test]
    fn test_media_url_passes_absolute_urls_through() {
        assert_eq!(
            client().media_url("https://cdn.example.com/j1.mp4"),
            "https://cdn.example.com/j1.mp4"
        );
    }
}
