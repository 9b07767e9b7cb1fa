//! The discovery loop: fully characterize one type per iteration, then
//! follow the schema graph to the next unresolved type.
//!
//! State propagates between iterations through the schema's serialized
//! form: each iteration emits the current introspection JSON and the
//! next iteration starts from a re-parse of it, so an interrupted run
//! leaves a loadable snapshot behind and a `--input` seed resumes
//! exactly where a previous run stopped.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, error, warn};

use oraql_schema::{
    is_builtin_scalar, Field, InputValue, Schema, TypeKind, BUILTIN_SCALARS,
};

use crate::error::OracleError;
use crate::probe::Prober;
use crate::transport::Transport;

/// Context document used when the caller supplies none.
pub const DEFAULT_DOCUMENT: &str = "query { FUZZ }";

/// Max number of candidate names sent per request.
pub const DEFAULT_BUCKET_SIZE: usize = 4096;

/// Inputs to a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// Candidate names for every brute-force pass.
    pub wordlist: Vec<String>,
    /// Max candidates per request.
    pub bucket_size: usize,
    /// Introspection JSON to resume from; when absent the roots are
    /// probed with `__typename` queries.
    pub seed: Option<Value>,
    /// Starting context document; defaults to [`DEFAULT_DOCUMENT`].
    pub document: Option<String>,
}

impl Default for DiscoverOptions {
    fn default() -> DiscoverOptions {
        DiscoverOptions {
            wordlist: Vec::new(),
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: None,
            document: None,
        }
    }
}

/// Run discovery to completion.
///
/// `emit` receives the current introspection JSON after every
/// iteration; the last emitted document is also returned. Fails up
/// front with [`OracleError::UnreachableSchema`] when no root
/// operation answers, before anything is emitted.
pub fn discover<F>(
    transport: &dyn Transport,
    options: &DiscoverOptions,
    mut emit: F,
) -> Result<Value, OracleError>
where
    F: FnMut(&Value),
{
    let prober = Prober::new(transport, options.bucket_size);

    let mut schema = match &options.seed {
        Some(seed) => Schema::from_json(seed)?,
        None => {
            let roots = prober.root_typenames();
            if roots.is_empty() {
                return Err(OracleError::UnreachableSchema);
            }
            Schema::new(roots)
        }
    };

    let mut document = options
        .document
        .clone()
        .unwrap_or_else(|| DEFAULT_DOCUMENT.to_string());

    let mut ignore: BTreeSet<String> =
        BUILTIN_SCALARS.iter().map(|s| s.to_string()).collect();

    loop {
        expand_context(&prober, &mut schema, &options.wordlist, &document);

        let snapshot = schema.to_json()?;
        emit(&snapshot);

        // The re-parse is the loop's state hand-off, not an assertion:
        // the next iteration must observe exactly what was emitted.
        schema = Schema::from_json(&snapshot)?;

        match next_context(&schema, &mut ignore) {
            Some(next) => document = next,
            None => return Ok(snapshot),
        }
    }
}

/// One characterization pass: resolve the context's typename, then fill
/// in its fields, their types, and their arguments.
fn expand_context(prober: &Prober<'_>, schema: &mut Schema, wordlist: &[String], document: &str) {
    let typename = match prober.typename(document) {
        Ok(Some(name)) => name,
        Ok(None) => {
            warn!("context typename unresolved, skipping this pass: {document}");
            return;
        }
        Err(err) => {
            error!("{err}");
            return;
        }
    };
    debug!("current context resolves to type '{typename}'");
    schema.add_type(&typename, TypeKind::Object);

    let field_names = prober.valid_fields(wordlist, document);
    debug!("{typename} fields: {field_names:?}");

    for field_name in field_names {
        let already_known = schema
            .get(&typename)
            .is_some_and(|t| t.fields.iter().any(|f| f.name == field_name));
        if already_known {
            continue;
        }

        let Some(typeref) = prober.field_type(&field_name, document) else {
            continue;
        };
        let mut field = Field::new(&field_name, typeref);

        if is_builtin_scalar(&field.ty.name) {
            debug!("skipping argument probe for scalar field '{field_name}'");
        } else {
            for arg_name in prober.args(&field_name, wordlist, document) {
                let Some(arg_type) = prober.arg_type(&field_name, &arg_name, document) else {
                    continue;
                };
                schema.add_type(&arg_type.name, arg_type.kind);
                if let Err(err) = field.add_arg(InputValue::new(&arg_name, arg_type)) {
                    warn!("{err}");
                }
            }
        }

        schema.add_type(&field.ty.name, field.ty.kind);
        if let Some(current) = schema.get_mut(&typename) {
            current.fields.push(field);
        }
    }
}

/// Select the next discovery target and build the context document that
/// reaches it. Unreachable targets are logged and dropped; every
/// candidate enters the ignore set exactly once, so selection always
/// terminates.
fn next_context(schema: &Schema, ignore: &mut BTreeSet<String>) -> Option<String> {
    while let Some(target) = schema.get_type_without_fields(ignore).map(str::to_owned) {
        ignore.insert(target.clone());
        match schema.get_path_from_root(&target) {
            Ok(path) => {
                let document = schema.convert_path_to_document(&path);
                debug!("next target '{target}' via {document}");
                return Some(document);
            }
            Err(err) => error!("cannot build a context for '{target}': {err}"),
        }
    }
    None
}
