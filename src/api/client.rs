use std::time::Duration;

use reqwest::{Client, Response, Url};
use tracing::debug;

use crate::models::Resource;

use super::error::ApiError;

/// Longest slice of an error response body we keep for the status line.
const MAX_ERROR_BODY: usize = 200;

/// Thin wrapper around a shared [`reqwest::Client`] that knows the API base
/// address. Cloning is cheap; every spawned request task carries its own copy.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client for `base_url` (for example `http://localhost:5000`).
    /// `timeout` is applied to every request when set; without it requests
    /// wait for as long as the server takes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http, base_url })
    }

    /// Base address every collection path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/{collection}`, returning the whole collection.
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
        let url = self.collection_url::<R>()?;
        debug!(%url, "loading collection");
        let response = self.http.get(url).send().await?;
        let records = check_status(response).await?.json::<Vec<R>>().await?;
        Ok(records)
    }

    /// `POST /api/{collection}`. The created document is not consumed; callers
    /// reload the collection instead.
    pub async fn create<R: Resource>(&self, payload: &R::Payload) -> Result<(), ApiError> {
        let url = self.collection_url::<R>()?;
        debug!(%url, "creating record");
        let response = self.http.post(url).json(payload).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// `PUT /api/{collection}/{id}`.
    pub async fn update<R: Resource>(
        &self,
        id: &str,
        payload: &R::Payload,
    ) -> Result<(), ApiError> {
        let url = self.record_url::<R>(id)?;
        debug!(%url, "updating record");
        let response = self.http.put(url).json(payload).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// `DELETE /api/{collection}/{id}`.
    pub async fn delete<R: Resource>(&self, id: &str) -> Result<(), ApiError> {
        let url = self.record_url::<R>(id)?;
        debug!(%url, "deleting record");
        let response = self.http.delete(url).send().await?;
        check_status(response).await?;
        Ok(())
    }

    fn collection_url<R: Resource>(&self) -> Result<Url, ApiError> {
        self.base_url
            .join(&format!("api/{}", R::PATH))
            .map_err(|err| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: err.to_string(),
            })
    }

    fn record_url<R: Resource>(&self, id: &str) -> Result<Url, ApiError> {
        let mut url = self.collection_url::<R>()?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .push(id);
        Ok(url)
    }
}

/// Parse the configured address and make sure it ends with a slash so that
/// joining `api/...` keeps any path prefix (`https://host/regatta/`).
fn normalize_base_url(raw: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Turn non-2xx responses into [`ApiError::Status`], keeping the start of the
/// body because the service puts its validation messages there.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let mut message = body.trim().to_string();
    if message.is_empty() {
        message = status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    } else if message.chars().count() > MAX_ERROR_BODY {
        message = message.chars().take(MAX_ERROR_BODY).collect();
        message.push_str("...");
    }
    Err(ApiError::Status { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Athlete, Event};

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000", None).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/");
        assert_eq!(
            client.collection_url::<Athlete>().unwrap().as_str(),
            "http://localhost:5000/api/atletas"
        );
    }

    #[test]
    fn path_prefix_is_preserved() {
        let client = ApiClient::new("https://example.com/regatta", None).unwrap();
        assert_eq!(
            client.record_url::<Event>("e1").unwrap().as_str(),
            "https://example.com/regatta/api/eventos/e1"
        );
    }

    #[test]
    fn record_ids_are_escaped() {
        let client = ApiClient::new("http://localhost:5000/", None).unwrap();
        assert_eq!(
            client.record_url::<Athlete>("a b/c").unwrap().as_str(),
            "http://localhost:5000/api/atletas/a%20b%2Fc"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            ApiClient::new("ftp://example.com", None),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ApiClient::new("localhost", None),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }
}
