use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    // Characters that are meaningful to the regex substitution mechanism,
    // plus any whitespace that survives collapsing.
    static ref META_CHARS: Regex = Regex::new(r"[-\[\]{}()*+?.>,<\\^$|#\s]").unwrap();
}

/// The two accepted request body shapes: a bare array, or an object carrying
/// a single `sentence` field which is wrapped into a one-element sequence.
///
/// Array elements stay as raw JSON values so that non-string entries reach
/// the validator and produce a 400 rather than a deserialization error.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    Documents(Vec<Value>),
    Sentence { sentence: String },
}

impl RequestBody {
    pub fn into_documents(self) -> Vec<Value> {
        match self {
            RequestBody::Documents(documents) => documents,
            RequestBody::Sentence { sentence } => vec![Value::String(sentence)],
        }
    }
}

/// Normalizes every string element of the payload: trim, collapse whitespace
/// runs to single spaces, then replace regex metacharacters with spaces.
///
/// Trimming and collapsing must run before the metacharacter pass, which
/// itself maps whitespace to a space. A final tidy keeps the result free of
/// space runs introduced by adjacent metacharacters, which also makes the
/// whole transformation idempotent.
///
/// Non-string elements pass through untouched; [`validate`] rejects them.
pub fn normalize(raw: RequestBody) -> Vec<Value> {
    raw.into_documents()
        .into_iter()
        .map(|document| match document {
            Value::String(s) => Value::String(normalize_str(&s)),
            other => other,
        })
        .collect()
}

fn normalize_str(s: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(s.trim(), " ");
    let escaped = META_CHARS.replace_all(&collapsed, " ");
    WHITESPACE_RUN.replace_all(escaped.trim(), " ").into_owned()
}

/// The single gate before any provider call: the payload must be a non-empty
/// sequence whose every element is a string.
pub fn validate(documents: &[Value]) -> bool {
    !documents.is_empty() && documents.iter().all(Value::is_string)
}
