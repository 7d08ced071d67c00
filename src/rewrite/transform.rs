//! Header-to-query request transformation.
//!
//! # Steps
//! ```text
//! decoded path == match_path ?
//!     no  → pass-through, request untouched
//!     yes → read first value of header
//!         → strip prefix once (byte-literal), trim whitespace
//!         → append param=token to the parsed query, re-encode
//!         → remove header (all values)
//!         → rebuild the request URI with the new query
//! ```
//!
//! Nothing here can fail. A missing header degrades to an empty token.

use std::borrow::Cow;

use axum::http::{uri::PathAndQuery, HeaderValue, Request, Uri};
use percent_encoding::percent_decode_str;

use crate::rewrite::config::RewriteConfig;
use crate::rewrite::query;

/// What happened to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Path did not match; request left as it was.
    PassThrough,
    /// Credential moved into the query.
    Rewritten {
        /// Whether the source header was present on the inbound request.
        header_present: bool,
    },
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::PassThrough => "pass_through",
            Outcome::Rewritten { .. } => "rewritten",
        }
    }
}

/// Move the configured header's credential into the query string, in place.
pub fn rewrite_request<B>(config: &RewriteConfig, req: &mut Request<B>) -> Outcome {
    if !path_matches(req.uri().path(), config.match_path()) {
        return Outcome::PassThrough;
    }

    let header = req.headers().get(config.header_name());
    let header_present = header.is_some();
    let raw = header.map(HeaderValue::as_bytes).unwrap_or_default();
    let token = extract_token(raw, config.header_prefix());

    let query = query::append_pair(req.uri().query(), config.param_name(), token);

    req.headers_mut().remove(config.header_name());

    match with_query(req.uri(), &query) {
        Ok(uri) => *req.uri_mut() = uri,
        Err(e) => {
            tracing::warn!(
                path = %req.uri().path(),
                error = %e,
                "Rebuilt request URI rejected, keeping original query"
            );
        }
    }

    Outcome::Rewritten { header_present }
}

/// Compare the percent-decoded request path with the configured one.
fn path_matches(path: &str, expected: &str) -> bool {
    let decoded: Cow<'_, [u8]> = percent_decode_str(path).into();
    decoded.as_ref() == expected.as_bytes()
}

/// Strip `prefix` once from the raw header value and trim surrounding whitespace.
///
/// The result stays raw bytes; nothing is re-decoded.
pub fn extract_token<'a>(value: &'a [u8], prefix: &str) -> &'a [u8] {
    let stripped = value.strip_prefix(prefix.as_bytes()).unwrap_or(value);
    trim_space(stripped)
}

/// Trim leading and trailing Unicode whitespace. Bytes that are not valid
/// UTF-8 are never whitespace and stop the trim.
fn trim_space(mut bytes: &[u8]) -> &[u8] {
    while let Some(c) = first_char(bytes).filter(|c| c.is_whitespace()) {
        bytes = &bytes[c.len_utf8()..];
    }
    while let Some(c) = last_char(bytes).filter(|c| c.is_whitespace()) {
        bytes = &bytes[..bytes.len() - c.len_utf8()];
    }
    bytes
}

fn first_char(bytes: &[u8]) -> Option<char> {
    let head = &bytes[..bytes.len().min(4)];
    let valid = match std::str::from_utf8(head) {
        Ok(s) => s,
        Err(e) => std::str::from_utf8(&head[..e.valid_up_to()]).ok()?,
    };
    valid.chars().next()
}

fn last_char(bytes: &[u8]) -> Option<char> {
    (1..=bytes.len().min(4)).find_map(|len| {
        let s = std::str::from_utf8(&bytes[bytes.len() - len..]).ok()?;
        s.chars().next().filter(|c| c.len_utf8() == len)
    })
}

/// Replace the query of `uri`, keeping scheme, authority and path.
fn with_query(uri: &Uri, query: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query = PathAndQuery::try_from(format!("{}?{}", uri.path(), query))?;
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Ok(Uri::from_parts(parts)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::config::RawRewriteConfig;
    use axum::http::header::AUTHORIZATION;

    fn bearer_config() -> RewriteConfig {
        RewriteConfig::resolve(RawRewriteConfig {
            path: Some("/".into()),
            header_name: Some("Authorization".into()),
            header_prefix: Some("Bearer ".into()),
            param_name: Some("jwt".into()),
        })
        .unwrap()
    }

    fn query_pairs(req: &Request<()>) -> Vec<query::Pair> {
        query::parse(req.uri().query().unwrap_or_default())
    }

    fn pair(key: &str, value: &[u8]) -> query::Pair {
        (key.as_bytes().to_vec(), value.to_vec())
    }

    #[test]
    fn test_bearer_token_moves_to_query() {
        let config = bearer_config();
        let mut req = Request::builder()
            .uri("/")
            .header("Authorization", "Bearer abc.def.ghi")
            .body(())
            .unwrap();

        let outcome = rewrite_request(&config, &mut req);

        assert_eq!(outcome, Outcome::Rewritten { header_present: true });
        assert!(req.headers().get(AUTHORIZATION).is_none());
        assert_eq!(req.uri().query(), Some("jwt=abc.def.ghi"));
        assert_eq!(req.uri().to_string(), "/?jwt=abc.def.ghi");
    }

    #[test]
    fn test_other_path_passes_through_untouched() {
        let config = bearer_config();
        let mut req = Request::builder()
            .uri("/other?b=2&a=1")
            .header("Authorization", "Bearer abc.def.ghi")
            .header("X-Extra", "1")
            .body(())
            .unwrap();
        let uri_before = req.uri().clone();
        let headers_before = req.headers().clone();

        let outcome = rewrite_request(&config, &mut req);

        assert_eq!(outcome, Outcome::PassThrough);
        assert_eq!(req.uri(), &uri_before);
        assert_eq!(req.uri().query(), Some("b=2&a=1"));
        assert_eq!(req.headers(), &headers_before);
    }

    #[test]
    fn test_path_gate_is_exact() {
        let config = bearer_config();
        for uri in ["/index.html", "/x/", "http://example.com/a"] {
            let mut req = Request::builder().uri(uri).body(()).unwrap();
            let before = req.uri().clone();
            assert_eq!(rewrite_request(&config, &mut req), Outcome::PassThrough, "{uri}");
            assert_eq!(req.uri(), &before);
        }

        let trailing = RewriteConfig::resolve(RawRewriteConfig {
            path: Some("/api/".into()),
            ..Default::default()
        })
        .unwrap();
        let mut req = Request::builder().uri("/api").body(()).unwrap();
        assert_eq!(rewrite_request(&trailing, &mut req), Outcome::PassThrough);
    }

    #[test]
    fn test_missing_header_yields_empty_param() {
        let config = bearer_config();
        let mut req = Request::builder().uri("/").body(()).unwrap();

        let outcome = rewrite_request(&config, &mut req);

        assert_eq!(outcome, Outcome::Rewritten { header_present: false });
        assert!(req.headers().get(AUTHORIZATION).is_none());
        assert_eq!(req.uri().query(), Some("jwt="));
    }

    #[test]
    fn test_whitespace_trimmed_without_prefix() {
        let config = RewriteConfig::default();
        let mut req = Request::builder()
            .uri("/")
            .header("Authorization", "  raw-token  ")
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);

        assert_eq!(req.uri().query(), Some("jwt=raw-token"));
    }

    #[test]
    fn test_existing_query_is_kept() {
        let config = bearer_config();
        let mut req = Request::builder()
            .uri("/?foo=bar")
            .header("Authorization", "Bearer tok")
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);

        let pairs = query_pairs(&req);
        assert!(pairs.contains(&pair("foo", b"bar")));
        assert!(pairs.contains(&pair("jwt", b"tok")));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_existing_param_is_appended_not_replaced() {
        let config = bearer_config();
        let mut req = Request::builder()
            .uri("/?jwt=old&a=1")
            .header("Authorization", "Bearer new")
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);

        assert_eq!(req.uri().query(), Some("a=1&jwt=old&jwt=new"));
    }

    #[test]
    fn test_second_pass_sees_no_header() {
        let config = bearer_config();
        let mut req = Request::builder()
            .uri("/")
            .header("Authorization", "Bearer abc")
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);
        assert_eq!(req.uri().query(), Some("jwt=abc"));

        // The path is still "/", so the gate matches again, but the header is gone.
        let outcome = rewrite_request(&config, &mut req);
        assert_eq!(outcome, Outcome::Rewritten { header_present: false });
        assert_eq!(req.uri().query(), Some("jwt=abc&jwt="));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let config = RewriteConfig::resolve(RawRewriteConfig {
            header_name: Some("X-Auth-Token".into()),
            ..Default::default()
        })
        .unwrap();
        let mut req = Request::builder()
            .uri("/")
            .header("x-auth-token", "secret")
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);

        assert!(req.headers().get("X-AUTH-TOKEN").is_none());
        assert_eq!(req.uri().query(), Some("jwt=secret"));
    }

    #[test]
    fn test_only_first_value_read_and_all_removed() {
        let config = bearer_config();
        let mut req = Request::builder()
            .uri("/")
            .header("Authorization", "Bearer first")
            .header("Authorization", "Bearer second")
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);

        assert_eq!(req.headers().get_all(AUTHORIZATION).iter().count(), 0);
        assert_eq!(req.uri().query(), Some("jwt=first"));
    }

    #[test]
    fn test_prefix_stripped_once() {
        assert_eq!(extract_token(b"Bearer Bearer x", "Bearer "), b"Bearer x");
        assert_eq!(extract_token(b"Basic abc", "Bearer "), b"Basic abc");
        assert_eq!(extract_token(b"bearer abc", "Bearer "), b"bearer abc");
        assert_eq!(extract_token(b"Bearer ", "Bearer "), b"");
        assert_eq!(extract_token(b"", "Bearer "), b"");
    }

    #[test]
    fn test_reserved_characters_are_encoded() {
        let config = RewriteConfig::default();
        let mut req = Request::builder()
            .uri("/")
            .header("Authorization", "a b&c=d/e+f")
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);

        assert_eq!(req.uri().query(), Some("jwt=a+b%26c%3Dd%2Fe%2Bf"));
        assert_eq!(query_pairs(&req), vec![pair("jwt", b"a b&c=d/e+f")]);
    }

    #[test]
    fn test_absolute_uri_keeps_scheme_and_authority() {
        let config = bearer_config();
        let mut req = Request::builder()
            .uri("http://api.internal:8080/?x=1")
            .header("Authorization", "Bearer t")
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);

        assert_eq!(req.uri().to_string(), "http://api.internal:8080/?jwt=t&x=1");
    }

    #[test]
    fn test_other_headers_untouched() {
        let config = bearer_config();
        let mut req = Request::builder()
            .uri("/")
            .header("Authorization", "Bearer t")
            .header("Accept", "text/plain")
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);

        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.headers()["accept"], "text/plain");
    }

    #[test]
    fn test_non_utf8_token_kept_as_bytes() {
        let config = RewriteConfig::default();
        let mut req = Request::builder()
            .uri("/")
            .header("Authorization", HeaderValue::from_bytes(b"ab\xffcd").unwrap())
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);

        assert_eq!(req.uri().query(), Some("jwt=ab%FFcd"));
        assert_eq!(query_pairs(&req), vec![pair("jwt", b"ab\xffcd")]);
    }

    #[test]
    fn test_trim_handles_raw_and_unicode_bytes() {
        assert_eq!(extract_token(b"Bearer \xfe\xff ", "Bearer "), b"\xfe\xff");
        assert_eq!(extract_token("\u{a0}tok\u{3000}".as_bytes(), ""), b"tok");
        assert_eq!(extract_token(b"\t x \xe3", ""), b"x \xe3");
        assert_eq!(extract_token(b"   ", ""), b"");
    }

    #[test]
    fn test_percent_encoded_path_matches_decoded_config() {
        let config = RewriteConfig::resolve(RawRewriteConfig {
            path: Some("/café".into()),
            ..Default::default()
        })
        .unwrap();
        let mut req = Request::builder()
            .uri("/caf%C3%A9")
            .header("Authorization", "tok")
            .body(())
            .unwrap();

        assert_eq!(
            rewrite_request(&config, &mut req),
            Outcome::Rewritten { header_present: true }
        );
        assert_eq!(req.uri().to_string(), "/caf%C3%A9?jwt=tok");

        let spaced = RewriteConfig::resolve(RawRewriteConfig {
            path: Some("/a b".into()),
            ..Default::default()
        })
        .unwrap();
        let mut req = Request::builder().uri("/a%20b").body(()).unwrap();
        assert!(matches!(rewrite_request(&spaced, &mut req), Outcome::Rewritten { .. }));

        let mut req = Request::builder().uri("/caf%C3%A8").body(()).unwrap();
        assert_eq!(rewrite_request(&config, &mut req), Outcome::PassThrough);
    }

    #[test]
    fn test_unreserved_and_malformed_query_handling() {
        let config = RewriteConfig::default();
        let mut req = Request::builder()
            .uri("/?ok=1&bad=%zz&a;b=2")
            .header("Authorization", "a~b*c")
            .body(())
            .unwrap();

        rewrite_request(&config, &mut req);

        assert_eq!(req.uri().query(), Some("jwt=a~b%2Ac&ok=1"));
    }
}
