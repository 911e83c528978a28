//! Wikidata SPARQL HTTP client.

use std::thread;
use std::time::Duration;

use readactor_recon::{ExternalIdentitySnapshot, IdentityLookup, LookupError, NameCandidate, NameTuple};
use tracing::{debug, warn};

use crate::sparql::{self, Binding, SparqlResponse};

// ── Constants ───────────────────────────────────────────────────────

pub const MAX_RETRIES: u32 = 3;
pub const USER_AGENT: &str = concat!(
    "readactor/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/readchina/ReadActor)"
);
const ACCEPT: &str = "application/sparql-results+json";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Language for gender and birthplace labels.
    pub label_language: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            label_language: "en".into(),
            timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.into(),
        }
    }
}

// ── WikidataClient ──────────────────────────────────────────────────

/// Wikidata query client (blocking).
#[derive(Clone)]
pub struct WikidataClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    label_language: String,
    initial_backoff: Duration,
}

impl WikidataClient {
    /// Client for any SPARQL endpoint (mirrors, test servers).
    pub fn with_base_url(endpoint: &str, options: ClientOptions) -> Result<Self, LookupError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()
            .map_err(|e| LookupError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            label_language: options.label_language,
            initial_backoff: Duration::from_secs(1),
        })
    }

    /// First retry delay; doubles on every further attempt.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a SELECT query with retry + exponential backoff.
    ///
    /// 429, 5xx and transport failures are retried up to [`MAX_RETRIES`]
    /// times (`Retry-After` honoured for 429). Other statuses fail at once.
    pub fn select(&self, query: &str) -> Result<Vec<Binding>, LookupError> {
        let mut backoff = self.initial_backoff;

        for attempt in 0..=MAX_RETRIES {
            let result = self
                .http
                .get(&self.endpoint)
                .query(&[("query", query), ("format", "json")])
                .header(reqwest::header::ACCEPT, ACCEPT)
                .send();

            let resp = match result {
                Ok(resp) => resp,
                Err(e) => {
                    // Network/timeout errors: retry
                    if attempt == MAX_RETRIES {
                        return Err(LookupError::Transport(format!(
                            "{e} (after {MAX_RETRIES} retries)"
                        )));
                    }
                    warn!("Wikidata retry {}/{MAX_RETRIES} in {backoff:?} ({e})", attempt + 1);
                    thread::sleep(backoff);
                    backoff *= 2;
                    continue;
                }
            };

            let status = resp.status().as_u16();

            if status == 429 || status >= 500 {
                if attempt == MAX_RETRIES {
                    let reason = if status == 429 { "rate limited" } else { "upstream error" };
                    return Err(LookupError::Http {
                        status,
                        message: format!("{reason} after {MAX_RETRIES} retries"),
                    });
                }

                // Respect Retry-After header for 429
                let wait = if status == 429 {
                    resp.headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .map(Duration::from_secs)
                        .unwrap_or(backoff)
                } else {
                    backoff
                };

                warn!("Wikidata retry {}/{MAX_RETRIES} in {wait:?} (HTTP {status})", attempt + 1);
                thread::sleep(wait);
                backoff *= 2;
                continue;
            }

            if !(200..300).contains(&status) {
                let body = resp.text().unwrap_or_default();
                return Err(LookupError::Http {
                    status,
                    message: body.chars().take(200).collect(),
                });
            }

            let text = resp
                .text()
                .map_err(|e| LookupError::Transport(format!("failed to read response body: {e}")))?;
            let trimmed = text.trim_start_matches('\u{feff}');
            let parsed: SparqlResponse = serde_json::from_str(trimmed).map_err(|e| {
                LookupError::Parse(format!("{e} (body: {})", &trimmed[..floor_char_boundary(trimmed, 200)]))
            })?;
            return Ok(parsed.results.bindings);
        }

        Err(LookupError::Transport("retry loop exhausted".into()))
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

// ── IdentityLookup ──────────────────────────────────────────────────

impl IdentityLookup for WikidataClient {
    fn resolve_by_external_id(&self, id: &str) -> Result<ExternalIdentitySnapshot, LookupError> {
        let id = id.trim();
        if !sparql::is_entity_id(id) {
            return Err(LookupError::NotFound(id.to_string()));
        }

        let bindings = self.select(&sparql::person_query(id, &self.label_language))?;
        if bindings.is_empty() {
            return Err(LookupError::NotFound(id.to_string()));
        }

        let snapshot = ExternalIdentitySnapshot {
            gender: sparql::first_value(&bindings, "genderLabel").map(String::from),
            birth_year: sparql::first_value(&bindings, "birth").and_then(sparql::year_of),
            death_year: sparql::first_value(&bindings, "death").and_then(sparql::year_of),
            birth_place: sparql::first_value(&bindings, "birthplaceLabel").map(String::from),
        };
        debug!(wikidata_id = id, ?snapshot, "resolved");
        Ok(snapshot)
    }

    fn resolve_by_name(
        &self,
        names: &NameTuple,
        name_lang: &str,
        max_results: usize,
    ) -> Result<Vec<NameCandidate>, LookupError> {
        let label = names.label();
        if label.is_empty() || max_results == 0 {
            return Ok(Vec::new());
        }
        let lang = sparql::language_tag(name_lang).unwrap_or_else(|| self.label_language.clone());

        // A person matching by label and alias comes back twice
        let bindings = self.select(&sparql::name_query(&label, &lang, max_results * 2))?;

        let mut candidates: Vec<NameCandidate> = Vec::new();
        for binding in &bindings {
            let Some(id) = binding
                .get("person")
                .and_then(|v| sparql::entity_id_from_uri(&v.value))
            else {
                continue;
            };
            if candidates.iter().any(|c| c.external_id == id) {
                continue;
            }
            let by_label = binding.get("rank").is_some_and(|v| v.value == "1");
            candidates.push(NameCandidate {
                external_id: id.to_string(),
                confidence: if by_label { 1.0 } else { 0.5 },
            });
        }
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        candidates.truncate(max_results);

        debug!(%label, %lang, found = candidates.len(), "name search");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use readactor_recon::order_name_by_language;

    fn client(server: &MockServer) -> WikidataClient {
        WikidataClient::with_base_url(&server.url("/sparql"), ClientOptions::default())
            .unwrap()
            .with_initial_backoff(Duration::ZERO)
    }

    fn literal(value: &str) -> serde_json::Value {
        serde_json::json!({ "type": "literal", "value": value })
    }

    fn uri(value: &str) -> serde_json::Value {
        serde_json::json!({ "type": "uri", "value": value })
    }

    #[test]
    fn resolves_snapshot_by_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/sparql")
                .query_param("format", "json")
                .header("accept", "application/sparql-results+json");
            then.status(200)
                .header("content-type", "application/sparql-results+json")
                .json_body(serde_json::json!({
                    "head": { "vars": ["genderLabel", "birth", "death", "birthplaceLabel"] },
                    "results": { "bindings": [{
                        "genderLabel": literal("male"),
                        "birth": literal("1881-09-25T00:00:00Z"),
                        "death": literal("1936-10-19T00:00:00Z"),
                        "birthplaceLabel": literal("Shaoxing"),
                    }] }
                }));
        });

        let snap = client(&server).resolve_by_external_id("Q23114").unwrap();

        mock.assert();
        assert_eq!(snap.gender.as_deref(), Some("male"));
        assert_eq!(snap.birth_year.as_deref(), Some("1881"));
        assert_eq!(snap.death_year.as_deref(), Some("1936"));
        assert_eq!(snap.birth_place.as_deref(), Some("Shaoxing"));
    }

    #[test]
    fn living_person_has_no_death_year() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/sparql");
            then.status(200).json_body(serde_json::json!({
                "results": { "bindings": [{ "genderLabel": literal("female") }] }
            }));
        });

        let snap = client(&server).resolve_by_external_id("Q1").unwrap();
        assert_eq!(snap.gender.as_deref(), Some("female"));
        assert_eq!(snap.death_year, None);
    }

    #[test]
    fn zero_bindings_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/sparql");
            then.status(200).json_body(serde_json::json!({ "results": { "bindings": [] } }));
        });

        let err = client(&server).resolve_by_external_id("Q999999999").unwrap_err();
        assert!(matches!(err, LookupError::NotFound(id) if id == "Q999999999"));
    }

    #[test]
    fn malformed_id_never_hits_the_network() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/sparql");
            then.status(200);
        });

        let err = client(&server).resolve_by_external_id("Lu Xun").unwrap_err();
        assert!(matches!(err, LookupError::NotFound(_)));
        mock.assert_hits(0);
    }

    #[test]
    fn name_search_dedups_and_ranks() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/sparql");
            then.status(200).json_body(serde_json::json!({
                "results": { "bindings": [
                    { "person": uri("http://www.wikidata.org/entity/Q23114"), "rank": literal("1") },
                    { "person": uri("http://www.wikidata.org/entity/Q5"), "rank": literal("0") },
                    { "person": uri("http://www.wikidata.org/entity/Q23114"), "rank": literal("0") },
                    { "person": uri("http://www.wikidata.org/entity/Q7"), "rank": literal("0") },
                ] }
            }));
        });

        let names = order_name_by_language("鲁", "迅", "zh");
        let found = client(&server).resolve_by_name(&names, "zh", 2).unwrap();

        assert_eq!(
            found,
            vec![
                NameCandidate { external_id: "Q23114".into(), confidence: 1.0 },
                NameCandidate { external_id: "Q5".into(), confidence: 0.5 },
            ]
        );
    }

    #[test]
    fn empty_name_skips_the_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/sparql");
            then.status(200);
        });

        let names = order_name_by_language("", "", "en");
        assert!(client(&server).resolve_by_name(&names, "en", 2).unwrap().is_empty());
        mock.assert_hits(0);
    }

    #[test]
    fn server_errors_are_retried_then_reported() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/sparql");
            then.status(503);
        });

        let err = client(&server).resolve_by_external_id("Q1").unwrap_err();

        mock.assert_hits(MAX_RETRIES as usize + 1);
        assert!(matches!(err, LookupError::Http { status: 503, .. }));
    }

    #[test]
    fn bad_request_fails_immediately() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/sparql");
            then.status(400).body("MalformedQueryException");
        });

        let err = client(&server).resolve_by_external_id("Q1").unwrap_err();

        mock.assert_hits(1);
        match err {
            LookupError::Http { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("MalformedQuery"));
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_body_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/sparql");
            then.status(200).body("<html>maintenance</html>");
        });

        let err = client(&server).resolve_by_external_id("Q1").unwrap_err();
        assert!(matches!(err, LookupError::Parse(_)));
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        let client = WikidataClient::with_base_url("http://127.0.0.1:9/sparql", ClientOptions::default())
            .unwrap()
            .with_initial_backoff(Duration::ZERO);
        let err = client.resolve_by_external_id("Q1").unwrap_err();
        assert!(matches!(err, LookupError::Transport(_)));
    }
}
