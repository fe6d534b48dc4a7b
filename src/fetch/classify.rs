// src/fetch/classify.rs
// =============================================================================
// Turning a response into an outcome.
//
// The service has answered with two body shapes over time:
//
//   ["name1", "name2"]
//   {"version": "v1", "count": 2, "results": ["name1", "name2"]}
//
// Both are accepted. Anything else (HTML error pages, objects without
// `results`, numbers in the list) is "malformed": logged and treated as an
// empty answer, never as a crash.
// =============================================================================

use serde::Deserialize;
use std::fmt;

use crate::error::FetchError;

// What one logical fetch produced
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Names returned by the server (possibly none)
    Names(Vec<String>),
    /// 2xx response whose body could not be read as a name list
    Malformed { reason: String },
    /// The query gave up: transport error, non-429 error status, or 429
    /// retries ran out
    Failed(FailureReason),
}

#[cfg(test)]
impl FetchOutcome {
    pub fn names(&self) -> &[String] {
        match self {
            FetchOutcome::Names(names) => names,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    RateLimited { attempts: u32 },
    Status(u16),
    Transport(FetchError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::RateLimited { attempts } => {
                write!(f, "rate limited after {} attempts", attempts)
            }
            FailureReason::Status(code) => write!(f, "HTTP {}", code),
            FailureReason::Transport(err) => write!(f, "{}", err),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamesBody {
    List(Vec<String>),
    Wrapped { results: Vec<String> },
}

// Reads the name list out of a success body
pub fn parse_names(body: &str) -> Result<Vec<String>, String> {
    match serde_json::from_str::<NamesBody>(body) {
        Ok(NamesBody::List(names)) => Ok(names),
        Ok(NamesBody::Wrapped { results }) => Ok(results),
        Err(_) => Err(describe_body(body)),
    }
}

// Short description of a body we could not use, for the log line
fn describe_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty body".to_string();
    }
    let preview: String = trimmed.chars().take(60).collect();
    if preview.len() < trimmed.len() {
        format!("unexpected body: {}...", preview)
    } else {
        format!("unexpected body: {}", preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_list() {
        assert_eq!(
            parse_names(r#"["aaron", "abby"]"#).unwrap(),
            vec!["aaron".to_string(), "abby".to_string()]
        );
        assert!(parse_names("[]").unwrap().is_empty());
    }

    #[test]
    fn test_wrapped_results() {
        let body = r#"{"version":"v1","count":2,"results":["aaron","abby"]}"#;
        assert_eq!(parse_names(body).unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_bodies() {
        assert_eq!(parse_names("").unwrap_err(), "empty body");
        assert!(parse_names("<html>oops</html>").is_err());
        assert!(parse_names(r#"{"count": 3}"#).is_err());
        assert!(parse_names("[1, 2, 3]").is_err());
        assert!(parse_names("null").is_err());
    }

    #[test]
    fn test_long_body_is_shortened() {
        let body = "x".repeat(500);
        let reason = parse_names(&body).unwrap_err();
        assert!(reason.ends_with("..."));
        assert!(reason.len() < 100);
    }

    #[test]
    fn test_failure_reason_display() {
        assert_eq!(
            FailureReason::RateLimited { attempts: 6 }.to_string(),
            "rate limited after 6 attempts"
        );
        assert_eq!(FailureReason::Status(503).to_string(), "HTTP 503");
        assert_eq!(
            FailureReason::Transport(FetchError::Timeout).to_string(),
            "request timed out"
        );
    }

    #[test]
    fn test_outcome_names() {
        let outcome = FetchOutcome::Names(vec!["a".to_string()]);
        assert_eq!(outcome.names(), &["a".to_string()]);
        assert!(FetchOutcome::Failed(FailureReason::Status(500)).names().is_empty());
    }
}
