//! Network collaborator
//!
//! The connector only produces [`HttpRequest`] values and consumes
//! [`HttpResponse`] values; moving bytes is the job of a [`NetworkClient`].

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::core::errors::BoxError;

/// HTTP verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded`, parameters in insertion order
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

impl RequestBody {
    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Form(_) => "application/x-www-form-urlencoded",
            RequestBody::Json(_) => "application/json",
        }
    }

    /// Serialized body
    pub fn encode(&self) -> String {
        match self {
            RequestBody::Form(params) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter())
                .finish(),
            RequestBody::Json(value) => value.to_string(),
        }
    }
}

/// A fully built provider request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Header value, name compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decoded query parameter
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Form body parameter
    pub fn form_param(&self, name: &str) -> Option<&str> {
        match &self.body {
            Some(RequestBody::Form(params)) => params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// JSON body, when the body is JSON
    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }
}

/// Raw provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failures
#[derive(Debug, Error)]
pub enum NetworkError {
    /// DNS, refused, reset, timeout, TLS
    #[error("connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Request could not be put on the wire
    #[error("request encoding failed: {message}")]
    Encoding {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

/// Sends one request and returns the raw response, including non-2xx statuses
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError>;
}

/// reqwest-backed network client
#[derive(Debug, Clone)]
pub struct ReqwestNetwork {
    client: reqwest::Client,
}

impl ReqwestNetwork {
    /// Client with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn classify(err: reqwest::Error) -> NetworkError {
    if err.is_builder() {
        NetworkError::Encoding {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    } else {
        NetworkError::Connection {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[async_trait]
impl NetworkClient for ReqwestNetwork {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        debug!("Sending {} {}", method, request.url.path());

        let mut builder = self.client.request(method, request.url);

        for (name, value) in &request.headers {
            HeaderValue::from_str(value).map_err(|e| NetworkError::Encoding {
                message: format!("invalid value for header {}", name),
                source: Some(Box::new(e)),
            })?;
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, body.content_type())
                .body(body.encode());
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        debug!("Received status {} ({} bytes)", status, body.len());

        Ok(HttpResponse { status, body })
    }
}
