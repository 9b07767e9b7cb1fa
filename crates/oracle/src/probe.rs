//! Probe primitives: one stateless operation per discovery task.
//!
//! Every probe builds a deliberately malformed document from a context
//! document (a GraphQL document with the literal `FUZZ` token at the
//! insertion point), issues requests through the transport, and folds
//! the returned error messages through the diagnostic grammar.
//!
//! Recoverable failures -- timeouts, undecodable bodies, unknown
//! phrasings -- never escape a probe: the probe logs them and returns
//! its identity-for-union (an empty set, or `None` for type probes).

use std::collections::BTreeSet;

use tracing::{debug, error, warn};

use oraql_schema::{RootTypes, TypeRef, FUZZ_TOKEN};

use crate::diagnostics::{self, TypeRefContext};
use crate::error::OracleError;
use crate::transport::{OracleResponse, Transport};

/// Field name unlikely to exist anywhere, used to provoke an
/// unknown-field diagnostic that names the current context type.
const WRONG_FIELD: &str = "imwrongfield";

/// Wrong-type sentinel forcing argument-level errors without ever
/// running the field.
const SENTINEL: &str = "7";

/// Probe primitives bound to a transport and a bucket size.
pub struct Prober<'a> {
    transport: &'a dyn Transport,
    bucket_size: usize,
}

impl<'a> Prober<'a> {
    pub fn new(transport: &'a dyn Transport, bucket_size: usize) -> Prober<'a> {
        Prober {
            transport,
            bucket_size: bucket_size.max(1),
        }
    }

    /// Issue one request, converting every transport failure into "no
    /// new information".
    fn try_request(&self, probe: &str, document: &str) -> Option<OracleResponse> {
        match self.transport.send(document) {
            Ok(response) => Some(response),
            Err(err) => {
                warn!("{probe} probe skipped a request ({err}); raise the timeout if this repeats");
                None
            }
        }
    }

    /// Resolve the typename of the current selection context by
    /// substituting a wrong field name at the insertion point.
    pub fn typename(&self, context: &str) -> Result<Option<String>, OracleError> {
        let document = context.replace(FUZZ_TOKEN, WRONG_FIELD);
        let Some(response) = self.try_request("typename", &document) else {
            return Ok(None);
        };

        for message in &response.errors {
            if let Some(name) = diagnostics::context_typename(message, WRONG_FIELD) {
                return Ok(Some(name));
            }
        }

        Err(OracleError::TypenameUnresolved { document })
    }

    /// Enumerate field names valid on the current context.
    ///
    /// Each bucket of candidates starts out presumed valid; names the
    /// server rejects are removed and names it suggests are added. A
    /// no-subfields diagnostic means the context is a scalar, and the
    /// whole probe returns empty immediately.
    pub fn valid_fields(&self, wordlist: &[String], context: &str) -> BTreeSet<String> {
        let mut valid = BTreeSet::new();

        for bucket in wordlist.chunks(self.bucket_size) {
            let document = context.replace(FUZZ_TOKEN, &bucket.join(" "));
            let Some(response) = self.try_request("field", &document) else {
                continue;
            };
            debug!(
                "sent {} candidate fields, received {} errors",
                bucket.len(),
                response.errors.len()
            );

            let mut bucket_valid: BTreeSet<String> = bucket.iter().cloned().collect();
            for message in &response.errors {
                if diagnostics::is_no_subfields(message) {
                    return BTreeSet::new();
                }
                if let Some(invalid) = diagnostics::invalid_field(message) {
                    bucket_valid.remove(invalid);
                }
                bucket_valid.extend(diagnostics::field_suggestions(message));
            }
            valid.extend(bucket_valid);
        }

        valid
    }

    /// Enumerate argument names valid on `field` in the current context.
    pub fn args(&self, field: &str, wordlist: &[String], context: &str) -> BTreeSet<String> {
        let mut valid = BTreeSet::new();
        for bucket in wordlist.chunks(self.bucket_size) {
            valid.extend(self.args_bucket(field, bucket, context));
        }
        valid
    }

    fn args_bucket(&self, field: &str, bucket: &[String], context: &str) -> BTreeSet<String> {
        let call = format!("{field}({})", sentinel_list(bucket));
        let document = context.replace(FUZZ_TOKEN, &call);
        let Some(response) = self.try_request("argument", &document) else {
            return BTreeSet::new();
        };

        let mut valid: BTreeSet<String> = bucket.iter().cloned().collect();
        for message in &response.errors {
            if diagnostics::is_no_subfields(message) {
                return BTreeSet::new();
            }
            if let Some(invalid) = diagnostics::invalid_argument(message) {
                valid.remove(invalid);
            }
            valid.extend(diagnostics::argument_suggestions(message));
        }
        valid
    }

    /// Enumerate the members of the input object accepted by
    /// `field(argument: ...)`, using a fresh mutation document.
    pub fn input_fields(
        &self,
        field: &str,
        argument: &str,
        wordlist: &[String],
    ) -> BTreeSet<String> {
        let document = format!(
            "mutation {{ {field}({argument}: {{ {} }}) }}",
            sentinel_list(wordlist)
        );
        let Some(response) = self.try_request("input field", &document) else {
            return BTreeSet::new();
        };

        let mut valid: BTreeSet<String> = wordlist.iter().cloned().collect();
        for message in &response.errors {
            if let Some(invalid) = diagnostics::undefined_input_field(message) {
                valid.remove(invalid);
            }
            if let Some(member) = diagnostics::provided_input_field(message) {
                valid.insert(member);
            }
        }
        valid
    }

    /// Resolve the return type of `field`.
    ///
    /// The bare selection triggers a selection-required error for
    /// object-typed fields; the `{ lol }` fallback triggers a
    /// no-subfields error for scalars. The first document whose errors
    /// yield a type reference wins.
    pub fn field_type(&self, field: &str, context: &str) -> Option<TypeRef> {
        let documents = [
            context.replace(FUZZ_TOKEN, field),
            context.replace(FUZZ_TOKEN, &format!("{field} {{ lol }}")),
        ];
        self.typeref_from(&documents, TypeRefContext::Field)
    }

    /// Resolve the type of `argument` on `field`.
    ///
    /// The trailing fallback misspells the argument by dropping its
    /// last character, reliably provoking an unknown-argument
    /// suggestion even when the name itself was correct.
    pub fn arg_type(&self, field: &str, argument: &str, context: &str) -> Option<TypeRef> {
        let trimmed = &argument[..argument.len().saturating_sub(1)];
        let documents = [
            context.replace(FUZZ_TOKEN, &format!("{field}({argument}: {SENTINEL})")),
            context.replace(FUZZ_TOKEN, &format!("{field}({argument}: {{}})")),
            context.replace(FUZZ_TOKEN, &format!("{field}({trimmed}: {SENTINEL})")),
        ];
        self.typeref_from(&documents, TypeRefContext::InputValue)
    }

    fn typeref_from(&self, documents: &[String], context: TypeRefContext) -> Option<TypeRef> {
        for document in documents {
            let response = self.try_request("type", document)?;
            for message in &response.errors {
                if let Some(typeref) = diagnostics::extract_typeref(message, context) {
                    return Some(typeref);
                }
            }
        }

        error!("unable to resolve a type reference from {documents:?}");
        None
    }

    /// Resolve the root operation typenames with three trivial queries.
    pub fn root_typenames(&self) -> RootTypes {
        let roots = RootTypes {
            query: self.root_typename("query"),
            mutation: self.root_typename("mutation"),
            subscription: self.root_typename("subscription"),
        };
        debug!("root typenames: {roots:?}");
        roots
    }

    fn root_typename(&self, operation: &str) -> Option<String> {
        let document = format!("{operation} {{ __typename }}");
        let response = self.try_request("root typename", &document)?;
        Some(
            response
                .data?
                .get("__typename")?
                .as_str()?
                .to_string(),
        )
    }
}

fn sentinel_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("{name}: {SENTINEL}"))
        .collect::<Vec<_>>()
        .join(", ")
}
