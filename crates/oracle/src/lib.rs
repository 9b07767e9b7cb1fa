//! oraql-oracle: feedback-driven GraphQL schema discovery.
//!
//! Treats a GraphQL server with introspection disabled as an oracle:
//! deliberately malformed queries go out, and the engine's own
//! validation messages ("Did you mean ...?", "Cannot query field ...")
//! come back carrying field names, argument names, and type
//! references. The discovery loop folds those facts into an
//! `oraql-schema` model until every reachable type is characterized.
//!
//! # Public API
//!
//! - [`discover()`] -- run the full discovery loop
//! - [`Prober`] -- the individual probe primitives
//! - [`Transport`] / [`HttpTransport`] -- the network seam
//! - [`diagnostics`] -- the error-message interpretation grammar
//! - [`OracleError`] / [`TransportError`] -- failure taxonomy

pub mod diagnostics;
pub mod discover;
pub mod error;
pub mod probe;
pub mod transport;

pub use discover::{discover, DiscoverOptions, DEFAULT_BUCKET_SIZE, DEFAULT_DOCUMENT};
pub use error::{OracleError, TransportError};
pub use probe::Prober;
pub use transport::{HttpCommand, HttpTransport, OracleResponse, Transport, TransportConfig};
