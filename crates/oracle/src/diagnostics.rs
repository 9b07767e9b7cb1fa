//! The diagnostic grammar: pattern matchers over GraphQL error strings.
//!
//! Reference GraphQL engines phrase their validation errors in a small,
//! stable vocabulary ("Cannot query field ... Did you mean ...?", "Unknown
//! argument ...", "... has no subfields."). Every recognized phrasing lives
//! in one table, tagged with the extraction rule it feeds; the table is
//! walked in priority order and the first full-string match wins.
//!
//! Unrecognized phrasings are logged at WARN and contribute nothing --
//! they are never fatal.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;

use oraql_schema::TypeRef;

/// Name of a field or argument: `[_A-Za-z][_0-9A-Za-z]*`.
const NAME: &str = "[_A-Za-z][_0-9A-Za-z]*";
/// Field reference in argument diagnostics; some engines spell it
/// `Type.field`.
const DOTTED: &str = "[_A-Za-z][_0-9A-Za-z.]*";
/// Type reference token with list/non-null decorations, e.g. `[Node!]!`.
const TOKEN: &str = r"[_A-Za-z\[\]!][_0-9a-zA-Z\[\]!]*";

/// One recognized diagnostic phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiagnosticClass {
    /// `Field "X" must not have a selection since type "T" has no subfields.`
    NoSubfields,
    /// `Cannot query field "X" on type "T". Did you mean "a", "b", or "c"?`
    FieldSuggestionList,
    /// `Cannot query field "X" on type "T". Did you mean "a" or "b"?`
    FieldSuggestionPair,
    /// `Cannot query field "X" on type "T". Did you mean "a"?`
    FieldSuggestionSingle,
    /// `Cannot query field "X" on type "T".`
    UnknownField,
    /// `Field "f" of type "TR" must have a selection of subfields. Did you mean "f { ... }"?`
    SelectionRequired,
    /// `Field "F" argument "A" of type "TR" is required, but it was not provided.`
    RequiredArgumentMissing,
    /// `Expected type TR, found ....`
    ExpectedType,
    /// `Unknown argument "X" on field "F" of type "T". Did you mean "a" or "b"?`
    ArgSuggestionPair,
    /// `Unknown argument "X" on field "F" of type "T". Did you mean "a"?`
    ArgSuggestionSingle,
    /// `Unknown argument "X" on field "F" of type "T".`
    UnknownArgumentOnTypedField,
    /// `Unknown argument "X" on field "F".`
    UnknownArgument,
    /// `Field T.f of required type TR was not provided.`
    InputFieldMissing,
    /// `Field "f" is not defined by type T.`
    InputFieldUndefined,
}

/// The pattern table, priority order. Every pattern is anchored; the
/// first class whose pattern matches the whole message wins.
static DIAGNOSTICS: Lazy<Vec<(DiagnosticClass, Regex)>> = Lazy::new(|| {
    use DiagnosticClass::*;

    let table = [
        (
            NoSubfields,
            format!(
                r#"^Field "(?:{NAME})" must not have a selection since type "(?P<typeref>{TOKEN})" has no subfields\.$"#
            ),
        ),
        (
            FieldSuggestionList,
            format!(
                r#"^Cannot query field "(?:{NAME})" on type "(?:{NAME})"\. Did you mean (?P<list>(?:"(?:{NAME})", )+)(?:or "(?P<last>{NAME})")?\?$"#
            ),
        ),
        (
            FieldSuggestionPair,
            format!(
                r#"^Cannot query field "(?:{NAME})" on type "(?:{NAME})"\. Did you mean "(?P<first>{NAME})" or "(?P<second>{NAME})"\?$"#
            ),
        ),
        (
            FieldSuggestionSingle,
            format!(
                r#"^Cannot query field "(?:{NAME})" on type "(?:{NAME})"\. Did you mean "(?P<field>{NAME})"\?$"#
            ),
        ),
        (
            UnknownField,
            format!(r#"^Cannot query field "(?P<field>{NAME})" on type "(?P<typename>{TOKEN})"\.$"#),
        ),
        (
            SelectionRequired,
            format!(
                r#"^Field "(?P<field>{NAME})" of type "(?P<typeref>{TOKEN})" must have a selection of subfields\. Did you mean "(?:{NAME}) \{{ \.\.\. \}}"\?$"#
            ),
        ),
        (
            RequiredArgumentMissing,
            format!(
                r#"^Field "(?:{NAME})" argument "(?P<arg>{NAME})" of type "(?P<typeref>{TOKEN})" is required, but it was not provided\.$"#
            ),
        ),
        (
            ExpectedType,
            format!(r#"^Expected type (?P<typeref>{TOKEN}), found .+\.$"#),
        ),
        (
            ArgSuggestionPair,
            format!(
                r#"^Unknown argument "(?:{NAME})" on field "(?:{DOTTED})" of type "(?:{NAME})"\. Did you mean "(?P<first>{NAME})" or "(?P<second>{NAME})"\?$"#
            ),
        ),
        (
            ArgSuggestionSingle,
            format!(
                r#"^Unknown argument "(?:{NAME})" on field "(?:{DOTTED})" of type "(?:{NAME})"\. Did you mean "(?P<arg>{NAME})"\?$"#
            ),
        ),
        (
            UnknownArgumentOnTypedField,
            format!(
                r#"^Unknown argument "(?:{NAME})" on field "(?:{DOTTED})" of type "(?:{NAME})"\.$"#
            ),
        ),
        (
            UnknownArgument,
            format!(r#"^Unknown argument "(?:{NAME})" on field "(?:{DOTTED})"\.$"#),
        ),
        (
            InputFieldMissing,
            format!(
                r#"^Field (?P<input_type>{TOKEN})\.(?P<member>{NAME}) of required type (?P<typeref>{TOKEN}) was not provided\.$"#
            ),
        ),
        (
            InputFieldUndefined,
            format!(r#"^Field "(?P<member>{NAME})" is not defined by type (?:{TOKEN})\.$"#),
        ),
    ];

    table
        .into_iter()
        .map(|(class, pattern)| {
            let re = Regex::new(&pattern).expect("diagnostic pattern compiles");
            (class, re)
        })
        .collect()
});

// Unanchored removal patterns: these are searched, not classified,
// because engines append suggestions in the same sentence.
static INVALID_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"Cannot query field "(?P<field>{NAME})""#))
        .expect("invalid-field pattern compiles")
});
static INVALID_ARGUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"Unknown argument "(?P<arg>{NAME})" on field "(?:{DOTTED})""#
    ))
    .expect("invalid-argument pattern compiles")
});
static UNDEFINED_INPUT_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"Field "(?P<member>{NAME})" is not defined by type"#
    ))
    .expect("undefined-input-field pattern compiles")
});

fn classify(message: &str) -> Option<(DiagnosticClass, Captures<'_>)> {
    DIAGNOSTICS
        .iter()
        .find_map(|(class, re)| re.captures(message).map(|caps| (*class, caps)))
}

/// Whether the message says the current selection context is a scalar.
/// Probing for subfields should stop immediately.
pub fn is_no_subfields(message: &str) -> bool {
    matches!(classify(message), Some((DiagnosticClass::NoSubfields, _)))
}

/// The field name rejected by a `Cannot query field` diagnostic, if any.
pub fn invalid_field(message: &str) -> Option<&str> {
    INVALID_FIELD
        .captures(message)
        .and_then(|caps| caps.name("field"))
        .map(|m| m.as_str())
}

/// The argument name rejected by an `Unknown argument` diagnostic, if any.
pub fn invalid_argument(message: &str) -> Option<&str> {
    INVALID_ARGUMENT
        .captures(message)
        .and_then(|caps| caps.name("arg"))
        .map(|m| m.as_str())
}

/// Field names the server volunteered as valid: "Did you mean ...?"
/// suggestions, plus the field itself when the server demanded a
/// subfield selection for it.
pub fn field_suggestions(message: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();

    match classify(message) {
        Some((DiagnosticClass::FieldSuggestionList, caps)) => {
            for part in caps["list"].split(", ") {
                let name = part.trim().trim_matches('"');
                if !name.is_empty() {
                    names.insert(name.to_string());
                }
            }
            if let Some(last) = caps.name("last") {
                names.insert(last.as_str().to_string());
            }
        }
        Some((DiagnosticClass::FieldSuggestionPair, caps)) => {
            names.insert(caps["first"].to_string());
            names.insert(caps["second"].to_string());
        }
        Some((DiagnosticClass::FieldSuggestionSingle, caps))
        | Some((DiagnosticClass::SelectionRequired, caps)) => {
            names.insert(caps["field"].to_string());
        }
        Some(_) => {}
        None => warn!("unknown error message: '{message}'"),
    }

    names
}

/// Argument names the server volunteered as valid.
pub fn argument_suggestions(message: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();

    match classify(message) {
        Some((DiagnosticClass::ArgSuggestionSingle, caps)) => {
            names.insert(caps["arg"].to_string());
        }
        Some((DiagnosticClass::ArgSuggestionPair, caps)) => {
            names.insert(caps["first"].to_string());
            names.insert(caps["second"].to_string());
        }
        Some(_) => {}
        None => warn!("unknown error message: '{message}'"),
    }

    names
}

/// The input-object member confirmed valid by a
/// `Field T.f of required type TR was not provided.` diagnostic.
pub fn provided_input_field(message: &str) -> Option<String> {
    match classify(message) {
        Some((DiagnosticClass::InputFieldMissing, caps)) => Some(caps["member"].to_string()),
        _ => None,
    }
}

/// The input-object member rejected by a
/// `Field "f" is not defined by type T.` diagnostic.
pub fn undefined_input_field(message: &str) -> Option<&str> {
    UNDEFINED_INPUT_FIELD
        .captures(message)
        .and_then(|caps| caps.name("member"))
        .map(|m| m.as_str())
}

/// Which grammatical position the probed name occupied, deciding which
/// diagnostics carry its type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRefContext {
    Field,
    InputValue,
}

/// The type reference revealed by the message for the given context,
/// decoded from its token form.
pub fn extract_typeref(message: &str, context: TypeRefContext) -> Option<TypeRef> {
    use DiagnosticClass::*;

    let Some((class, caps)) = classify(message) else {
        warn!("unknown error message: '{message}'");
        return None;
    };

    let token = match (context, class) {
        (TypeRefContext::Field, SelectionRequired) => caps.name("typeref"),
        (TypeRefContext::Field, NoSubfields) => caps.name("typeref"),
        (TypeRefContext::Field, UnknownField) => caps.name("typename"),
        // A selection-of-subfields complaint is about the field, not
        // the argument under probe.
        (TypeRefContext::InputValue, SelectionRequired) => None,
        (TypeRefContext::InputValue, RequiredArgumentMissing) => caps.name("typeref"),
        (TypeRefContext::InputValue, ExpectedType) => caps.name("typeref"),
        _ => None,
    }?;

    Some(TypeRef::from_token(token.as_str()))
}

/// The typename of the current selection context, from either the
/// unknown-field or the no-subfields phrasing. `probe_field` is the
/// deliberately wrong name that was inserted at the `FUZZ` position.
pub fn context_typename(message: &str, probe_field: &str) -> Option<String> {
    let (class, caps) = classify(message)?;

    let token = match class {
        DiagnosticClass::UnknownField if &caps["field"] == probe_field => &caps["typename"],
        DiagnosticClass::NoSubfields => &caps["typeref"],
        _ => return None,
    };

    Some(
        token
            .chars()
            .filter(|c| *c != '!' && *c != '[' && *c != ']')
            .collect(),
    )
}
