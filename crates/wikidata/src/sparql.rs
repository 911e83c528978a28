//! Query text and result shapes for the Wikidata SPARQL endpoint.

use std::collections::HashMap;

use serde::Deserialize;

// ── Result JSON ─────────────────────────────────────────────────────

/// `application/sparql-results+json` body.
#[derive(Debug, Deserialize)]
pub struct SparqlResponse {
    pub results: SparqlResults,
}

#[derive(Debug, Deserialize)]
pub struct SparqlResults {
    pub bindings: Vec<Binding>,
}

pub type Binding = HashMap<String, BindingValue>;

#[derive(Debug, Clone, Deserialize)]
pub struct BindingValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Value of `var` in the first binding that has one.
pub fn first_value<'a>(bindings: &'a [Binding], var: &str) -> Option<&'a str> {
    bindings
        .iter()
        .filter_map(|b| b.get(var))
        .map(|v| v.value.trim())
        .find(|v| !v.is_empty())
}

// ── Identifiers and literals ────────────────────────────────────────

/// `Q` followed by one or more ASCII digits.
pub fn is_entity_id(id: &str) -> bool {
    id.len() > 1 && id.starts_with('Q') && id[1..].bytes().all(|b| b.is_ascii_digit())
}

/// `http://www.wikidata.org/entity/Q42` → `Q42`.
pub fn entity_id_from_uri(uri: &str) -> Option<&str> {
    let id = uri.rsplit('/').next()?;
    is_entity_id(id).then_some(id)
}

/// Escape a string for use inside a double-quoted SPARQL literal.
pub fn escape_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// A BCP 47-ish language tag safe to splice after `@`; `None` if not.
pub fn language_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_ascii_lowercase().replace('_', "-");
    let valid = !tag.is_empty()
        && !tag.starts_with('-')
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    valid.then_some(tag)
}

/// Leading year of an `xsd:dateTime`, sign kept, zero padding dropped.
///
/// `1881-09-25T00:00:00Z` → `1881`, `-0551-01-01T00:00:00Z` → `-551`.
pub fn year_of(date_time: &str) -> Option<String> {
    let (negative, rest) = match date_time.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, date_time.strip_prefix('+').unwrap_or(date_time)),
    };
    let digits: &str = rest.split('-').next()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i64 = digits.parse().ok()?;
    Some(if negative { format!("-{year}") } else { year.to_string() })
}

// ── Queries ─────────────────────────────────────────────────────────

/// Gender, birth, death and birthplace of one entity.
///
/// `schema:version` is mandatory so a nonexistent QID yields zero rows
/// rather than one row of unbound optionals.
pub fn person_query(qid: &str, label_language: &str) -> String {
    let languages = if label_language == "en" {
        "en".to_string()
    } else {
        format!("{label_language},en")
    };
    format!(
        r#"SELECT ?genderLabel ?birth ?death ?birthplaceLabel WHERE {{
  wd:{qid} schema:version ?version .
  OPTIONAL {{ wd:{qid} wdt:P21 ?gender . }}
  OPTIONAL {{ wd:{qid} wdt:P569 ?birth . }}
  OPTIONAL {{ wd:{qid} wdt:P570 ?death . }}
  OPTIONAL {{ wd:{qid} wdt:P19 ?birthplace . }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "{languages}". }}
}}"#
    )
}

/// Humans whose label (rank 1) or alias (rank 0) equals `label` in `lang`.
pub fn name_query(label: &str, lang: &str, limit: usize) -> String {
    let literal = format!("\"{}\"@{lang}", escape_literal(label));
    format!(
        r#"SELECT DISTINCT ?person ?rank WHERE {{
  {{ ?person rdfs:label {literal} . BIND(1 AS ?rank) }}
  UNION
  {{ ?person skos:altLabel {literal} . BIND(0 AS ?rank) }}
  ?person wdt:P31 wd:Q5 .
}}
ORDER BY DESC(?rank) ?person
LIMIT {limit}"#
    )
}
