use oraql_schema::SchemaError;

/// Failures surfaced by the transport for a single request.
///
/// Timeouts and undecodable bodies are recoverable: probes log them and
/// return their identity-for-union. Construction failures are not.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The response body was not decodable JSON.
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),

    /// The request failed below the response layer (DNS, connect, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// The HTTP client could not be constructed from the configuration.
    #[error("could not build HTTP client: {0}")]
    Client(String),
}

/// Failures surfaced by the discovery loop.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// No error message revealed the typename of the current context.
    #[error("could not resolve the typename for context: {document}")]
    TypenameUnresolved { document: String },

    /// No root operation type answered a `__typename` probe, so no type
    /// is reachable.
    #[error("no root operation type is reachable; nothing to discover")]
    UnreachableSchema,

    /// A schema-model invariant was violated.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
