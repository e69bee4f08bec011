//! Inspection service client: detection tasks, UAV route planning and cleaning strategy.
//!
//! JSON responses decode to `serde_json::Value`; binary responses are returned as raw bytes.
//! Transport errors, non-success status and decode errors all come back as [`ApiError`].

use bytes::Bytes;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

/// Client for the inspection service HTTP API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("inspection service request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("inspection service api error: {0}")]
    Api(String),
}

/// How `task_result` should deliver the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFormat {
    /// Server answers with JSON (e.g. links to the result files). Sent as `is_url=true`.
    Url,
    /// Server answers with the result file itself. Sent as `is_url=false`.
    File,
}

impl ResultFormat {
    fn is_url_param(self) -> &'static str {
        match self {
            ResultFormat::Url => "true",
            ResultFormat::File => "false",
        }
    }
}

/// Body of a task result, shaped by the requested [`ResultFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    Json(Value),
    Binary(Bytes),
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Use a preconfigured reqwest client (proxy, TLS roots, default headers).
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("api: {} {}", method, url);
        self.client.request(method, url)
    }

    /// POST /detect/add_task — create a detection task from a multipart form.
    pub async fn add_task(&self, form: Form) -> Result<Value, ApiError> {
        let req = self.request(Method::POST, "/detect/add_task").multipart(form);
        json(send(req).await?).await
    }

    /// GET /detect/task_status?task_id=...
    pub async fn task_status(&self, task_id: &str) -> Result<Value, ApiError> {
        let req = self
            .request(Method::GET, "/detect/task_status")
            .query(&[("task_id", task_id)]);
        json(send(req).await?).await
    }

    /// GET /detect/task_list
    pub async fn task_list(&self) -> Result<Value, ApiError> {
        let req = self.request(Method::GET, "/detect/task_list");
        json(send(req).await?).await
    }

    /// GET /detect/task_result?task_id=...&is_url=... — JSON for [`ResultFormat::Url`], raw bytes for [`ResultFormat::File`].
    pub async fn task_result(
        &self,
        task_id: &str,
        format: ResultFormat,
    ) -> Result<TaskResult, ApiError> {
        let req = self
            .request(Method::GET, "/detect/task_result")
            .query(&[("task_id", task_id), ("is_url", format.is_url_param())]);
        let res = send(req).await?;
        match format {
            ResultFormat::Url => Ok(TaskResult::Json(json(res).await?)),
            ResultFormat::File => Ok(TaskResult::Binary(res.bytes().await?)),
        }
    }

    /// GET /detect/delete_task?task_id=...
    pub async fn delete_task(&self, task_id: &str) -> Result<Value, ApiError> {
        let req = self
            .request(Method::GET, "/detect/delete_task")
            .query(&[("task_id", task_id)]);
        json(send(req).await?).await
    }

    /// POST /UAV/route/new — submit a route plan (multipart); the response is a file.
    pub async fn submit_route(&self, form: Form) -> Result<Bytes, ApiError> {
        let req = self.request(Method::POST, "/UAV/route/new").multipart(form);
        Ok(send(req).await?.bytes().await?)
    }

    /// POST /wash/calculate_best_cleaning with a JSON body.
    pub async fn calculate_best_cleaning<T: Serialize + ?Sized>(
        &self,
        data: &T,
    ) -> Result<Value, ApiError> {
        let req = self
            .request(Method::POST, "/wash/calculate_best_cleaning")
            .json(data);
        json(send(req).await?).await
    }

    /// POST /UAV/get_all_waypoints (multipart).
    pub async fn get_all_waypoints(&self, form: Form) -> Result<Value, ApiError> {
        let req = self
            .request(Method::POST, "/UAV/get_all_waypoints")
            .multipart(form);
        json(send(req).await?).await
    }
}

/// Send once; a non-success status becomes [`ApiError::Api`] with the status and body.
async fn send(req: RequestBuilder) -> Result<Response, ApiError> {
    let res = req.send().await?;
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        return Err(ApiError::Api(format!("{} {}", status, body)));
    }
    Ok(res)
}

async fn json(res: Response) -> Result<Value, ApiError> {
    Ok(res.json().await?)
}
