//! Picks which candidate struct a test case body should be read as.
//!
//! Both rules are name heuristics over the configured candidate lists; they
//! never look at struct fields.

use crate::model::TestCase;

/// Response body keys that suggest an error payload (compared case-insensitively).
const ERROR_INDICATORS: [&str; 3] = ["error", "code", "message"];

/// Request type for `case`: unresolved without a body or candidates,
/// otherwise the first configured candidate.
pub fn infer_request_type<'a>(case: &TestCase, candidates: &'a [String]) -> Option<&'a str> {
    if !case.request.has_body() {
        return None;
    }
    candidates.first().map(String::as_str)
}

/// Response type for `case`.
///
/// With several candidates, an error-looking body prefers the first
/// candidate whose name mentions "error"; anything else prefers the first
/// candidate that does not, falling back to the first candidate.
pub fn infer_response_type<'a>(case: &TestCase, candidates: &'a [String]) -> Option<&'a str> {
    let body = case.response.body.as_ref().filter(|b| !b.is_empty())?;
    match candidates {
        [] => None,
        [only] => Some(only.as_str()),
        _ => {
            let looks_like_error = body
                .keys()
                .any(|k| ERROR_INDICATORS.iter().any(|ind| k.eq_ignore_ascii_case(ind)));
            if looks_like_error {
                if let Some(t) = candidates.iter().find(|c| mentions_error(c)) {
                    return Some(t.as_str());
                }
            }
            candidates
                .iter()
                .find(|c| !mentions_error(c))
                .or(candidates.first())
                .map(String::as_str)
        }
    }
}

fn mentions_error(type_name: &str) -> bool {
    type_name.to_lowercase().contains("error")
}
