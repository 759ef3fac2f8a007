use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

use crate::error::TransportError;

pub const USER_AGENT: &str = "WineAPIProcessor/1.0";

/// A completed HTTP exchange, whatever its status code.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET against `url` with `params` as the query string.
    async fn get(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError> {
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}
