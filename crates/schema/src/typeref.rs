//! Use-site type references with list and nullability modifiers.
//!
//! A [`TypeRef`] is a value: a named type plus the wrapping applied at
//! one use site. The wire form is the canonical introspection nesting
//! of `NON_NULL` around `LIST` around `NON_NULL` around the named type.
//! Only five shapes are encodable -- `T`, `T!`, `[T]`, `[T!]`, `[T!]!`;
//! anything else fails with [`SchemaError::UnsupportedTypeShape`].

use std::fmt;

use serde_json::{json, Value};

use crate::error::SchemaError;

/// Names of the built-in scalar types.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Whether `name` is one of the five built-in scalars.
pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

/// Kind tag of a named schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    /// The introspection-JSON spelling of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Scalar => "SCALAR",
            TypeKind::Object => "OBJECT",
            TypeKind::Interface => "INTERFACE",
            TypeKind::Union => "UNION",
            TypeKind::Enum => "ENUM",
            TypeKind::InputObject => "INPUT_OBJECT",
        }
    }

    /// Parse an introspection-JSON kind tag. `LIST` and `NON_NULL` are
    /// wrappers, not named kinds, and are rejected here.
    pub fn parse(s: &str) -> Option<TypeKind> {
        match s {
            "SCALAR" => Some(TypeKind::Scalar),
            "OBJECT" => Some(TypeKind::Object),
            "INTERFACE" => Some(TypeKind::Interface),
            "UNION" => Some(TypeKind::Union),
            "ENUM" => Some(TypeKind::Enum),
            "INPUT_OBJECT" => Some(TypeKind::InputObject),
            _ => None,
        }
    }

    /// The kind inferred for a bare type name harvested from an error
    /// message: built-in scalars keep SCALAR, names ending in `Input`
    /// are input objects, everything else is assumed OBJECT.
    pub fn infer(name: &str) -> TypeKind {
        if name.ends_with("Input") {
            TypeKind::InputObject
        } else if is_builtin_scalar(name) {
            TypeKind::Scalar
        } else {
            TypeKind::Object
        }
    }
}

/// List/non-null wrapping applied to a named type at a use site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Named,
    NonNull(Box<TypeShape>),
    List(Box<TypeShape>),
}

/// One wrapper layer, outermost first, used when matching a shape
/// against the encodable combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wrap {
    NonNull,
    List,
}

fn wrapper_chain(shape: &TypeShape) -> Vec<Wrap> {
    let mut out = Vec::new();
    let mut cur = shape;
    loop {
        match cur {
            TypeShape::Named => break,
            TypeShape::NonNull(inner) => {
                out.push(Wrap::NonNull);
                cur = inner;
            }
            TypeShape::List(inner) => {
                out.push(Wrap::List);
                cur = inner;
            }
        }
    }
    out
}

/// A reference to a type at a use site.
///
/// Equality is structural; a `TypeRef` is copied freely between the
/// fields that share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub kind: TypeKind,
    pub shape: TypeShape,
}

impl TypeRef {
    /// A bare reference to a named type.
    pub fn named(name: impl Into<String>, kind: TypeKind) -> TypeRef {
        TypeRef {
            name: name.into(),
            kind,
            shape: TypeShape::Named,
        }
    }

    /// Decode a type token harvested from an error message, e.g.
    /// `Node`, `String!`, `[Episode!]!`.
    ///
    /// The token grammar is `[_A-Za-z\[\]!][_0-9a-zA-Z\[\]!]*`: the
    /// name is the token with all `!`, `[`, `]` removed, the list flag
    /// requires both brackets, `!]` marks non-null items, and a
    /// trailing `!` marks the whole reference non-null. The kind is
    /// inferred from the name via [`TypeKind::infer`].
    pub fn from_token(token: &str) -> TypeRef {
        let is_list = token.contains('[') && token.contains(']');
        let non_null_item = is_list && token.contains("!]");
        let non_null = token.ends_with('!');
        let name: String = token
            .chars()
            .filter(|c| *c != '!' && *c != '[' && *c != ']')
            .collect();

        let mut shape = TypeShape::Named;
        if is_list {
            if non_null_item {
                shape = TypeShape::NonNull(Box::new(shape));
            }
            shape = TypeShape::List(Box::new(shape));
        }
        if non_null {
            shape = TypeShape::NonNull(Box::new(shape));
        }

        let kind = TypeKind::infer(&name);
        TypeRef { name, kind, shape }
    }

    /// Whether any wrapper layer is a list.
    pub fn is_list(&self) -> bool {
        wrapper_chain(&self.shape).contains(&Wrap::List)
    }

    /// Whether the reference as a whole may be null.
    pub fn is_nullable(&self) -> bool {
        !matches!(self.shape, TypeShape::NonNull(_))
    }

    /// Encode to the canonical nested introspection form.
    ///
    /// Fails with [`SchemaError::UnsupportedTypeShape`] for any wrapper
    /// combination outside the five supported shapes.
    pub fn to_wire(&self) -> Result<Value, SchemaError> {
        let named = json!({
            "kind": self.kind.as_str(),
            "name": self.name,
            "ofType": null,
        });

        use Wrap::{List, NonNull};
        match wrapper_chain(&self.shape).as_slice() {
            [] => Ok(named),
            [NonNull] => Ok(wrap("NON_NULL", named)),
            [List] => Ok(wrap("LIST", named)),
            [List, NonNull] => Ok(wrap("LIST", wrap("NON_NULL", named))),
            [NonNull, List, NonNull] => {
                Ok(wrap("NON_NULL", wrap("LIST", wrap("NON_NULL", named))))
            }
            _ => Err(SchemaError::UnsupportedTypeShape {
                name: self.name.clone(),
            }),
        }
    }

    /// Decode from the canonical nested introspection form.
    pub fn from_wire(value: &Value) -> Result<TypeRef, SchemaError> {
        let mut wrappers = Vec::new();
        let mut cur = value;

        loop {
            let kind = cur
                .get("kind")
                .and_then(|k| k.as_str())
                .ok_or_else(|| SchemaError::InvalidDocument("type missing 'kind'".into()))?;

            match kind {
                "NON_NULL" | "LIST" => {
                    if wrappers.len() >= 3 {
                        return Err(SchemaError::InvalidDocument(
                            "too many 'ofType' levels".into(),
                        ));
                    }
                    wrappers.push(if kind == "NON_NULL" {
                        Wrap::NonNull
                    } else {
                        Wrap::List
                    });
                    cur = cur.get("ofType").and_then(|v| {
                        if v.is_null() {
                            None
                        } else {
                            Some(v)
                        }
                    }).ok_or_else(|| {
                        SchemaError::InvalidDocument("wrapper type missing 'ofType'".into())
                    })?;
                }
                _ => break,
            }
        }

        let name = cur
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| SchemaError::InvalidDocument("named type missing 'name'".into()))?
            .to_string();
        let kind_str = cur.get("kind").and_then(|k| k.as_str()).unwrap_or("");
        let kind = TypeKind::parse(kind_str)
            .ok_or_else(|| SchemaError::InvalidDocument(format!("unknown kind '{kind_str}'")))?;

        use Wrap::{List, NonNull};
        let shape = match wrappers.as_slice() {
            [] => TypeShape::Named,
            [NonNull] => TypeShape::NonNull(Box::new(TypeShape::Named)),
            [List] => TypeShape::List(Box::new(TypeShape::Named)),
            [List, NonNull] => {
                TypeShape::List(Box::new(TypeShape::NonNull(Box::new(TypeShape::Named))))
            }
            [NonNull, List, NonNull] => TypeShape::NonNull(Box::new(TypeShape::List(Box::new(
                TypeShape::NonNull(Box::new(TypeShape::Named)),
            )))),
            _ => return Err(SchemaError::UnsupportedTypeShape { name }),
        };

        Ok(TypeRef { name, kind, shape })
    }
}

impl fmt::Display for TypeRef {
    /// The GraphQL token spelling, e.g. `[Episode!]!`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn render(shape: &TypeShape, name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match shape {
                TypeShape::Named => write!(f, "{name}"),
                TypeShape::NonNull(inner) => {
                    render(inner, name, f)?;
                    write!(f, "!")
                }
                TypeShape::List(inner) => {
                    write!(f, "[")?;
                    render(inner, name, f)?;
                    write!(f, "]")
                }
            }
        }
        render(&self.shape, &self.name, f)
    }
}

fn wrap(kind: &str, inner: Value) -> Value {
    json!({
        "kind": kind,
        "name": null,
        "ofType": inner,
    })
}
