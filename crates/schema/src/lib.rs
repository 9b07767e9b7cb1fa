//! oraql-schema: GraphQL schema model and introspection JSON codec.
//!
//! Holds the in-memory representation of a schema being reconstructed
//! field by field: named types, their fields and arguments, and type
//! references with list/non-null modifiers. The model round-trips with
//! the standard introspection JSON shape
//! (`data.__schema.{queryType,mutationType,subscriptionType,types,directives}`)
//! and knows how to derive a query document that reaches any type from
//! a root operation.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Schema`] -- the name-keyed type map plus root pointers
//! - [`Type`], [`Field`], [`InputValue`] -- schema entities
//! - [`TypeRef`], [`TypeShape`], [`TypeKind`] -- use-site type references
//! - [`SchemaError`] -- model error type

pub mod error;
pub mod schema;
pub mod typeref;

/// Placeholder token marking the insertion point in a context document.
pub const FUZZ_TOKEN: &str = "FUZZ";

pub use error::SchemaError;
pub use schema::{Field, InputValue, RootTypes, Schema, Type};
pub use typeref::{is_builtin_scalar, TypeKind, TypeRef, TypeShape, BUILTIN_SCALARS};
