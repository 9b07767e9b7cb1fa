//! Schema entities and the introspection JSON codec.
//!
//! The schema graph is generally cyclic, so [`Schema`] stores its types
//! in insertion order and fields refer to other types by name only.
//! Serialization and deserialization go through `serde_json::Value`
//! because the introspection shape is irregular: root pointers are
//! nullable objects, and each `types` entry carries either `fields` or
//! `inputFields` depending on its kind.

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use crate::error::SchemaError;
use crate::typeref::{TypeKind, TypeRef};
use crate::FUZZ_TOKEN;

/// Name of the placeholder field written for types with no discovered
/// fields, and filtered back out on input.
const DUMMY_FIELD: &str = "dummy";

// ── InputValue ──────────────────────────────────────────────────────

/// A named argument or input-object member.
///
/// Default values and descriptions are not discoverable through error
/// messages and always serialize as null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValue {
    pub name: String,
    pub ty: TypeRef,
}

impl InputValue {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> InputValue {
        InputValue {
            name: name.into(),
            ty,
        }
    }

    fn to_wire(&self) -> Result<Value, SchemaError> {
        Ok(json!({
            "defaultValue": null,
            "description": null,
            "name": self.name,
            "type": self.ty.to_wire()?,
        }))
    }

    fn from_wire(value: &Value) -> Result<InputValue, SchemaError> {
        let name = required_str(value, "name")?;
        let ty = TypeRef::from_wire(
            value
                .get("type")
                .ok_or_else(|| SchemaError::InvalidDocument(format!("argument '{name}' missing 'type'")))?,
        )?;
        Ok(InputValue { name, ty })
    }
}

// ── Field ───────────────────────────────────────────────────────────

/// A named selection within an object, interface, or input object.
///
/// Input-object members carry an empty argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub args: Vec<InputValue>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Field {
        Field {
            name: name.into(),
            ty,
            args: Vec::new(),
        }
    }

    /// Append an argument. Arguments are compared by name; a duplicate
    /// is rejected.
    pub fn add_arg(&mut self, arg: InputValue) -> Result<(), SchemaError> {
        if self.args.iter().any(|a| a.name == arg.name) {
            return Err(SchemaError::DuplicateArgument {
                field: self.name.clone(),
                argument: arg.name,
            });
        }
        self.args.push(arg);
        Ok(())
    }

    fn to_wire(&self) -> Result<Value, SchemaError> {
        let args = self
            .args
            .iter()
            .map(InputValue::to_wire)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(json!({
            "args": args,
            "deprecationReason": null,
            "description": null,
            "isDeprecated": false,
            "name": self.name,
            "type": self.ty.to_wire()?,
        }))
    }

    fn from_wire(value: &Value) -> Result<Field, SchemaError> {
        let name = required_str(value, "name")?;
        let ty = TypeRef::from_wire(
            value
                .get("type")
                .ok_or_else(|| SchemaError::InvalidDocument(format!("field '{name}' missing 'type'")))?,
        )?;

        // Input-object members have no args on the wire.
        let mut args = Vec::new();
        if let Some(arr) = value.get("args").and_then(|a| a.as_array()) {
            for a in arr {
                args.push(InputValue::from_wire(a)?);
            }
        }

        Ok(Field { name, ty, args })
    }
}

// ── Type ────────────────────────────────────────────────────────────

/// A named schema entity.
///
/// Fields of OBJECT/INTERFACE types are output fields and may carry
/// arguments; fields of INPUT_OBJECT types are input members. Scalars
/// carry no fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub name: String,
    pub kind: TypeKind,
    pub fields: Vec<Field>,
}

impl Type {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Type {
        Type {
            name: name.into(),
            kind,
            fields: Vec::new(),
        }
    }

    fn to_wire(&self) -> Result<Value, SchemaError> {
        let mut out = Map::new();
        out.insert("description".into(), Value::Null);
        out.insert("enumValues".into(), Value::Null);
        out.insert("interfaces".into(), json!([]));
        out.insert("kind".into(), json!(self.kind.as_str()));
        out.insert("name".into(), json!(self.name));
        out.insert("possibleTypes".into(), Value::Null);

        // The introspection shape requires a non-empty field list, so a
        // type probed before any field was discovered gets a String
        // placeholder.
        let field_list = || -> Result<Value, SchemaError> {
            if self.fields.is_empty() {
                let dummy = Field::new(DUMMY_FIELD, TypeRef::named("String", TypeKind::Scalar));
                Ok(json!([dummy.to_wire()?]))
            } else {
                Ok(Value::Array(
                    self.fields
                        .iter()
                        .map(Field::to_wire)
                        .collect::<Result<Vec<_>, _>>()?,
                ))
            }
        };

        match self.kind {
            TypeKind::Object | TypeKind::Interface => {
                out.insert("fields".into(), field_list()?);
                out.insert("inputFields".into(), Value::Null);
            }
            TypeKind::InputObject => {
                out.insert("fields".into(), Value::Null);
                out.insert("inputFields".into(), field_list()?);
            }
            TypeKind::Scalar | TypeKind::Enum | TypeKind::Union => {
                out.insert("fields".into(), Value::Null);
                out.insert("inputFields".into(), Value::Null);
            }
        }

        Ok(Value::Object(out))
    }

    fn from_wire(value: &Value) -> Result<Type, SchemaError> {
        let name = required_str(value, "name")?;
        let kind_str = required_str(value, "kind")?;
        let kind = TypeKind::parse(&kind_str)
            .ok_or_else(|| SchemaError::InvalidDocument(format!("unknown kind '{kind_str}'")))?;

        let field_key = match kind {
            TypeKind::Object | TypeKind::Interface => Some("fields"),
            TypeKind::InputObject => Some("inputFields"),
            _ => None,
        };

        let mut fields = Vec::new();
        if let Some(key) = field_key {
            if let Some(arr) = value.get(key).and_then(|f| f.as_array()) {
                for f in arr {
                    let field = Field::from_wire(f)?;
                    if field.name == DUMMY_FIELD {
                        continue;
                    }
                    fields.push(field);
                }
            }
        }

        Ok(Type { name, kind, fields })
    }
}

// ── Schema ──────────────────────────────────────────────────────────

/// Root operation type names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootTypes {
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
}

impl RootTypes {
    /// Whether no root operation resolved at all.
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.mutation.is_none() && self.subscription.is_none()
    }
}

/// The schema being reconstructed: a name-keyed set of types in
/// insertion order plus the root operation pointers.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    roots: RootTypes,
    types: Vec<Type>,
    directives: Vec<Value>,
}

impl Schema {
    /// An empty schema seeded with the built-in `String` and `ID`
    /// scalars and an empty object type per resolved root.
    pub fn new(roots: RootTypes) -> Schema {
        let mut schema = Schema {
            roots: roots.clone(),
            types: Vec::new(),
            directives: Vec::new(),
        };
        schema.add_type("String", TypeKind::Scalar);
        schema.add_type("ID", TypeKind::Scalar);
        for root in [&roots.query, &roots.mutation, &roots.subscription]
            .into_iter()
            .flatten()
        {
            schema.add_type(root, TypeKind::Object);
        }
        schema
    }

    pub fn roots(&self) -> &RootTypes {
        &self.roots
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.iter().any(|t| t.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Type> {
        self.types.iter_mut().find(|t| t.name == name)
    }

    /// Insert an empty type if absent. A second call with the same name
    /// is a no-op regardless of kind, so a kind is never downgraded.
    pub fn add_type(&mut self, name: &str, kind: TypeKind) {
        if !self.contains(name) {
            self.types.push(Type::new(name, kind));
        }
    }

    /// The first type in insertion order whose kind is not INPUT_OBJECT,
    /// whose field list is empty, and whose name is not in `ignore`.
    ///
    /// `None` is the discovery loop's termination signal.
    pub fn get_type_without_fields(&self, ignore: &BTreeSet<String>) -> Option<&str> {
        self.types
            .iter()
            .find(|t| {
                t.fields.is_empty()
                    && t.kind != TypeKind::InputObject
                    && !ignore.contains(&t.name)
            })
            .map(|t| t.name.as_str())
    }

    fn root_names(&self) -> Vec<&str> {
        [&self.roots.query, &self.roots.mutation, &self.roots.subscription]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// A path of field names that reaches the type named `name` from a
    /// root operation type, starting with the root type's name.
    ///
    /// Scans all known types for a field returning the current target,
    /// prepends that field, and switches the target to the containing
    /// type until the target is a root. A sweep that finds no edge
    /// means the target is unreachable through output fields.
    pub fn get_path_from_root(&self, name: &str) -> Result<Vec<String>, SchemaError> {
        if !self.contains(name) {
            return Err(SchemaError::UnknownType {
                name: name.to_string(),
            });
        }

        let roots = self.root_names();
        let mut target = name.to_string();
        let mut path: Vec<String> = Vec::new();

        // Each hop moves to a different containing type, so any path is
        // at most one hop per known type.
        for _ in 0..=self.types.len() {
            if roots.contains(&target.as_str()) {
                path.insert(0, target);
                return Ok(path);
            }

            let edge = self.types.iter().find_map(|t| {
                t.fields
                    .iter()
                    .find(|f| f.ty.name == target)
                    .map(|f| (t.name.clone(), f.name.clone()))
            });

            match edge {
                Some((container, field_name)) => {
                    path.insert(0, field_name);
                    target = container;
                }
                None => break,
            }
        }

        Err(SchemaError::NoPathFromRoot {
            name: name.to_string(),
        })
    }

    /// Fold a root path into nested selection braces with the `FUZZ`
    /// token at the deepest position, wrapped in the operation keyword
    /// matching the path's head.
    pub fn convert_path_to_document(&self, path: &[String]) -> String {
        let mut doc = FUZZ_TOKEN.to_string();
        for segment in path.iter().skip(1).rev() {
            doc = format!("{segment} {{ {doc} }}");
        }

        let head = path.first().map(String::as_str).unwrap_or_default();
        let operation = if self.roots.mutation.as_deref() == Some(head) {
            "mutation"
        } else if self.roots.subscription.as_deref() == Some(head) {
            "subscription"
        } else {
            "query"
        };
        format!("{operation} {{ {doc} }}")
    }

    /// Serialize to the standard introspection JSON shape.
    pub fn to_json(&self) -> Result<Value, SchemaError> {
        let types = self
            .types
            .iter()
            .map(Type::to_wire)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(json!({
            "data": {
                "__schema": {
                    "directives": self.directives,
                    "mutationType": root_to_wire(&self.roots.mutation),
                    "queryType": root_to_wire(&self.roots.query),
                    "subscriptionType": root_to_wire(&self.roots.subscription),
                    "types": types,
                }
            }
        }))
    }

    /// Reconstruct from an introspection JSON document, filtering the
    /// placeholder fields written by [`Schema::to_json`].
    pub fn from_json(doc: &Value) -> Result<Schema, SchemaError> {
        let inner = doc
            .get("data")
            .and_then(|d| d.get("__schema"))
            .ok_or_else(|| SchemaError::InvalidDocument("missing 'data.__schema'".into()))?;

        let roots = RootTypes {
            query: root_from_wire(inner.get("queryType")),
            mutation: root_from_wire(inner.get("mutationType")),
            subscription: root_from_wire(inner.get("subscriptionType")),
        };

        let types_arr = inner
            .get("types")
            .and_then(|t| t.as_array())
            .ok_or_else(|| SchemaError::InvalidDocument("missing 'types' array".into()))?;

        let mut types = Vec::with_capacity(types_arr.len());
        for t in types_arr {
            types.push(Type::from_wire(t)?);
        }

        let directives = inner
            .get("directives")
            .and_then(|d| d.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(Schema {
            roots,
            types,
            directives,
        })
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn root_to_wire(root: &Option<String>) -> Value {
    match root {
        Some(name) => json!({ "name": name }),
        None => Value::Null,
    }
}

fn root_from_wire(value: Option<&Value>) -> Option<String> {
    value?
        .get("name")?
        .as_str()
        .map(str::to_owned)
}

fn required_str(value: &Value, field: &str) -> Result<String, SchemaError> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .ok_or_else(|| SchemaError::InvalidDocument(format!("missing '{field}' field")))
}
