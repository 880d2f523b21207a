//! Cookie-string parsing.
//!
//! The control surface hands us an opaque string captured from an
//! authenticated browser, typically `NID_AUT=...; NID_SES=...`. Both `;` and
//! newline separators occur in the wild depending on how the user copied it.
//! The parser is agnostic to cookie names; the remote service decides which
//! ones it actually needs.
use serde::{Deserialize, Serialize};

/// One parsed cookie, ready for injection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    /// Registrable domain the cookie is scoped to.
    pub domain: String,
    pub path: String,
}

/// Parse a raw cookie string into injectable cookies scoped to `domain`
/// with root path.
///
/// Pairs missing `=`, or with an empty name or value, are dropped. An input
/// that yields zero cookies means authentication must fail closed.
pub fn parse_cookie_string(raw: &str, domain: &str) -> Vec<SessionCookie> {
    let normalized = raw.replace('\n', "; ").replace('\r', "");

    normalized
        .split(';')
        .filter_map(|item| {
            let item = item.trim();
            let (name, value) = item.split_once('=')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some(SessionCookie {
                name: name.to_string(),
                value: value.to_string(),
                domain: domain.to_string(),
                path: "/".to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = ".naver.com";

    #[test]
    fn parses_semicolon_separated_pairs() {
        let cookies = parse_cookie_string("NID_AUT=abc; NID_SES=def", DOMAIN);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "NID_AUT");
        assert_eq!(cookies[0].value, "abc");
        assert_eq!(cookies[1].name, "NID_SES");
        assert_eq!(cookies[1].value, "def");
        for c in &cookies {
            assert_eq!(c.domain, DOMAIN);
            assert_eq!(c.path, "/");
        }
    }

    #[test]
    fn parses_newline_separated_pairs() {
        let cookies = parse_cookie_string("NID_AUT=abc\nNID_SES=def\r\nNID_JKL=ghi", DOMAIN);
        let names: Vec<_> = cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["NID_AUT", "NID_SES", "NID_JKL"]);
    }

    #[test]
    fn drops_malformed_pairs() {
        let cookies = parse_cookie_string("good=1; missingeq; =novalue-name; empty=; two=2", DOMAIN);
        let names: Vec<_> = cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["good", "two"]);
    }

    #[test]
    fn trims_whitespace_around_names_and_values() {
        let cookies = parse_cookie_string("  NID_AUT =  abc  ;", DOMAIN);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "NID_AUT");
        assert_eq!(cookies[0].value, "abc");
    }

    #[test]
    fn value_may_contain_equals() {
        let cookies = parse_cookie_string("tok=a=b=c", DOMAIN);
        assert_eq!(cookies[0].value, "a=b=c");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_cookie_string("", DOMAIN).is_empty());
        assert!(parse_cookie_string("  ;; \n ", DOMAIN).is_empty());
    }
}
