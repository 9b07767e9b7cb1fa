/// All errors that can be returned by the schema model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A type reference nests list/non-null wrappers in a combination
    /// outside the five encodable shapes (T, T!, [T], [T!], [T!]!).
    #[error("unsupported type shape for '{name}'")]
    UnsupportedTypeShape { name: String },

    /// A path was requested for a type the schema does not contain.
    #[error("unknown type: '{name}'")]
    UnknownType { name: String },

    /// No chain of output fields connects a root operation type to the
    /// target type.
    #[error("no path from a root operation type to '{name}'")]
    NoPathFromRoot { name: String },

    /// A field already carries an argument with this name.
    #[error("duplicate argument '{argument}' on field '{field}'")]
    DuplicateArgument { field: String, argument: String },

    /// The introspection document is structurally invalid.
    #[error("invalid introspection document: {0}")]
    InvalidDocument(String),
}
