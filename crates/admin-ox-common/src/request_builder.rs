use crate::{
    error::{self, AdminRequestError},
    id_safe,
};
use reqwest::{Method, RequestBuilder as ReqwestRequestBuilder, StatusCode, header};
use serde_json::Value;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use url::Url;

/// HTTP method for API endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Put => Method::PUT,
        }
    }
}

/// A backend path plus its query parameters.
///
/// Path segments are stored unencoded and percent-encoded when the URL is
/// built, so ids and invite codes can be passed in verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub segments: Vec<String>,
    pub query_params: Vec<(String, String)>,
}

impl Endpoint {
    /// Endpoint for a literal path such as `/role` or `bot-ping`.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self::from_segments(path.as_ref().split('/').filter(|s| !s.is_empty()))
    }

    /// Endpoint from individual segments; each one is encoded as a whole.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query_params: Vec::new(),
        }
    }

    pub fn with_query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((key.into(), value.to_string()));
        self
    }

    /// Attach `page` and `size` paging parameters.
    pub fn paged(self, page: u32, size: u32) -> Self {
        self.with_query_param("page", page).with_query_param("size", size)
    }
}

/// Configuration for request building
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub base_url: String,
    pub default_headers: HashMap<String, String>,
    pub user_agent: Option<String>,
}

impl RequestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: HashMap::new(),
            user_agent: None,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Issues JSON requests against one base URL.
///
/// Every request asks for `application/json`, decodes 2xx bodies with the
/// identifier-safe decoder and turns everything else into
/// [`AdminRequestError::Status`]. A 204 or an empty body is `Ok(None)`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    client: reqwest::Client,
    config: RequestConfig,
}

impl RequestBuilder {
    pub fn new(client: reqwest::Client, config: RequestConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Join the base URL and the endpoint.
    ///
    /// A trailing `/` on the base and a leading `/` on the path collapse into
    /// one separator; a base with a path prefix (`http://host/api`) keeps it.
    pub fn build_url(&self, endpoint: &Endpoint) -> Result<Url, AdminRequestError> {
        let base = self.config.base_url.trim();
        let mut url =
            Url::parse(base).map_err(|e| AdminRequestError::InvalidUrl(format!("{base}: {e}")))?;

        url.path_segments_mut()
            .map_err(|()| AdminRequestError::InvalidUrl(format!("{base}: cannot be a base URL")))?
            .pop_if_empty()
            .extend(&endpoint.segments);

        if !endpoint.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&endpoint.query_params);
        }

        Ok(url)
    }

    /// Build a reqwest RequestBuilder for the given endpoint
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &Endpoint,
    ) -> Result<ReqwestRequestBuilder, AdminRequestError> {
        let url = self.build_url(endpoint)?;

        let mut req = self
            .client
            .request(method.into(), url)
            .header(header::ACCEPT, "application/json");

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        if let Some(ref user_agent) = self.config.user_agent {
            req = req.header(header::USER_AGENT, user_agent);
        }

        Ok(req)
    }

    /// GET the endpoint and decode the body.
    pub async fn fetch_json(
        &self,
        endpoint: &Endpoint,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        self.execute(HttpMethod::Get, endpoint, cancel).await
    }

    /// PUT the endpoint (no body) and decode whatever comes back.
    pub async fn put_json(
        &self,
        endpoint: &Endpoint,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        self.execute(HttpMethod::Put, endpoint, cancel).await
    }

    async fn execute(
        &self,
        method: HttpMethod,
        endpoint: &Endpoint,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        if cancel.is_cancelled() {
            return Err(AdminRequestError::Cancelled);
        }

        let req = self.build_request(method, endpoint)?;
        log::debug!("{method:?} /{}", endpoint.segments.join("/"));

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AdminRequestError::Cancelled),
            res = Self::send_and_decode(req) => res,
        }
    }

    async fn send_and_decode(
        req: ReqwestRequestBuilder,
    ) -> Result<Option<Value>, AdminRequestError> {
        let res = req.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;

        if !status.is_success() {
            return Err(error::parse_error_response(status, &bytes));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        Ok(id_safe::decode(&bytes)?)
    }
}
