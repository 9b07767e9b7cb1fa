//! Transport facade: the one seam between the probes and the network.
//!
//! Probes only ever call [`Transport::send`] with a complete GraphQL
//! document and read back the decoded response surface (`data` plus the
//! error messages). [`HttpTransport`] is the production implementation;
//! tests substitute a scripted one.

use std::time::Duration;

use serde_json::Value;

use crate::error::TransportError;

/// HTTP command used for every probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpCommand {
    Get,
    #[default]
    Post,
}

/// Everything the transport needs to reach the target server.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Target GraphQL endpoint.
    pub url: String,
    /// Request command; POST carries `{"query": ...}` as a JSON body, GET
    /// sends the document as the `query` URL parameter.
    pub command: HttpCommand,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Extra URL parameters, merged in for both commands.
    pub params: Vec<(String, String)>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Verify the server certificate.
    pub verify_tls: bool,
    /// Negotiate HTTP/2 instead of forcing HTTP/1.1.
    pub http2: bool,
    /// Optional proxy, `[protocol://]host[:port]`.
    pub proxy: Option<String>,
}

impl TransportConfig {
    pub fn new(url: impl Into<String>) -> TransportConfig {
        TransportConfig {
            url: url.into(),
            command: HttpCommand::Post,
            headers: Vec::new(),
            params: Vec::new(),
            timeout: Duration::from_secs(5),
            verify_tls: true,
            http2: false,
            proxy: None,
        }
    }
}

/// The decoded response surface a probe interprets.
#[derive(Debug, Clone, Default)]
pub struct OracleResponse {
    /// The `data` member, absent when null or missing.
    pub data: Option<Value>,
    /// Every `errors[*].message` string, in response order.
    pub errors: Vec<String>,
    /// Negotiated HTTP version, when the transport knows it.
    pub version: Option<String>,
}

impl OracleResponse {
    /// Decode the response surface from a JSON body.
    pub fn from_body(body: Value, version: Option<String>) -> OracleResponse {
        let errors = body
            .get("errors")
            .and_then(|e| e.as_array())
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("message"))
                    .filter_map(|m| m.as_str())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let data = body.get("data").filter(|d| !d.is_null()).cloned();

        OracleResponse {
            data,
            errors,
            version,
        }
    }
}

/// Minimal contract consumed by every probe.
pub trait Transport {
    /// Issue one request carrying `document` and decode the response.
    fn send(&self, document: &str) -> Result<OracleResponse, TransportError>;
}

/// Production transport over a blocking HTTP client.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    config: TransportConfig,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<HttpTransport, TransportError> {
        let mut builder = reqwest::blocking::Client::builder().timeout(config.timeout);

        if !config.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if !config.http2 {
            builder = builder.http1_only();
        }
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| TransportError::Client(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(HttpTransport { client, config })
    }
}

impl Transport for HttpTransport {
    fn send(&self, document: &str) -> Result<OracleResponse, TransportError> {
        let mut request = match self.config.command {
            HttpCommand::Post => self
                .client
                .post(&self.config.url)
                .query(&self.config.params)
                .json(&serde_json::json!({ "query": document })),
            HttpCommand::Get => {
                let mut params = self.config.params.clone();
                params.push(("query".to_string(), document.to_string()));
                self.client.get(&self.config.url).query(&params)
            }
        };

        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().map_err(classify_error)?;
        let version = format!("{:?}", response.version());
        let body: Value = response.json().map_err(classify_error)?;

        Ok(OracleResponse::from_body(body, Some(version)))
    }
}

fn classify_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_decode() {
        TransportError::InvalidJson(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_decoding() {
        let body = json!({
            "data": { "__typename": "Query" },
            "errors": [
                { "message": "first", "locations": [] },
                { "message": "second" },
                { "no_message": true },
            ],
        });
        let response = OracleResponse::from_body(body, None);
        assert_eq!(response.errors, vec!["first", "second"]);
        assert_eq!(response.data.unwrap()["__typename"], "Query");
    }

    #[test]
    fn test_null_data_is_absent() {
        let body = json!({ "data": null, "errors": [] });
        let response = OracleResponse::from_body(body, None);
        assert!(response.data.is_none());
        assert!(response.errors.is_empty());
    }
}
