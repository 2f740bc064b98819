//! Identity token processing.
//!
//! Tokens are decoded locally without signature verification. The backend
//! verifies them during the exchange and the prover verifies them again;
//! this side only needs the claims to derive the address.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::ZkLoginError;

/// Claims the protocol consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub iss: String,
    pub sub: String,
    /// The first audience when the token carries several.
    pub aud: String,
    pub exp: Option<u64>,
    pub nonce: Option<String>,
}

impl IdentityClaims {
    /// True once `now` (unix seconds) has reached `exp`.
    pub fn is_expired(&self, now: u64) -> bool {
        self.exp.is_some_and(|exp| now >= exp)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct RawClaims {
    iss: Option<String>,
    sub: Option<String>,
    aud: Option<Audience>,
    exp: Option<u64>,
    nonce: Option<String>,
}

/// Pulls `id_token` out of a redirect.
///
/// Accepts the full redirect URL or just its fragment. The provider returns
/// the token after `#`, so query parameters are never consulted.
pub fn extract_id_token(redirect: &str) -> Option<String> {
    let fragment = match redirect.split_once('#') {
        Some((_, fragment)) => fragment,
        None if redirect.contains("://") => return None,
        None => redirect,
    };
    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == "id_token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}

/// Decodes the payload claims of a compact JWT.
///
/// # Errors
///
/// Returns [`ZkLoginError::MalformedToken`] if the token is not three
/// dot-separated segments, the payload is not base64url JSON, or `iss`,
/// `sub` or `aud` is missing.
pub fn decode_claims(token: &str) -> Result<IdentityClaims, ZkLoginError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ZkLoginError::MalformedToken("expected three segments"));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| ZkLoginError::MalformedToken("payload is not base64url"))?;
    let raw: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|_| ZkLoginError::MalformedToken("payload is not a JSON object"))?;

    let aud = match raw.aud {
        Some(Audience::One(aud)) => Some(aud),
        Some(Audience::Many(auds)) => auds.into_iter().next(),
        None => None,
    };

    Ok(IdentityClaims {
        iss: raw.iss.ok_or(ZkLoginError::MalformedToken("missing iss"))?,
        sub: raw.sub.ok_or(ZkLoginError::MalformedToken("missing sub"))?,
        aud: aud.ok_or(ZkLoginError::MalformedToken("missing aud"))?,
        exp: raw.exp,
        nonce: raw.nonce,
    })
}

/// Current unix time in seconds. A clock before 1970 reads as zero.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn token(payload: &str) -> String {
        format!(
            "{}.{}.c2ln",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","kid":"k1"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn extracts_from_fragment_not_query() {
        let url = "https://app.example.com/callback?id_token=wrong#state=x&id_token=eyJ.a.b";
        assert_eq!(extract_id_token(url).as_deref(), Some("eyJ.a.b"));
        assert_eq!(extract_id_token("#id_token=eyJ.a.b").as_deref(), Some("eyJ.a.b"));
        assert_eq!(extract_id_token("id_token=eyJ.a.b").as_deref(), Some("eyJ.a.b"));
    }

    #[test]
    fn absent_token_is_none() {
        assert_eq!(extract_id_token("https://app.example.com/callback?id_token=x"), None);
        assert_eq!(extract_id_token("https://app.example.com/callback#error=denied"), None);
        assert_eq!(extract_id_token("#id_token="), None);
    }

    #[test]
    fn decodes_string_and_array_audience() {
        let claims = decode_claims(&token(
            r#"{"iss":"https://accounts.google.com","sub":"user123","aud":"client-abc","exp":1700000000,"nonce":"n"}"#,
        ))
        .unwrap();
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.aud, "client-abc");
        assert_eq!(claims.exp, Some(1_700_000_000));
        assert_eq!(claims.nonce.as_deref(), Some("n"));

        let claims = decode_claims(&token(
            r#"{"iss":"https://accounts.google.com","sub":"user123","aud":["client-abc","other"]}"#,
        ))
        .unwrap();
        assert_eq!(claims.aud, "client-abc");
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn malformed_tokens() {
        for bad in ["", "a.b", "a.b.c.d", "a.!!!.c"] {
            assert!(
                matches!(decode_claims(bad), Err(ZkLoginError::MalformedToken(_))),
                "{bad}"
            );
        }
        let no_sub = token(r#"{"iss":"i","aud":"a"}"#);
        assert!(matches!(
            decode_claims(&no_sub),
            Err(ZkLoginError::MalformedToken("missing sub"))
        ));
    }

    #[test]
    fn expiry() {
        let claims = IdentityClaims {
            iss: "i".into(),
            sub: "s".into(),
            aud: "a".into(),
            exp: Some(100),
            nonce: None,
        };
        assert!(!claims.is_expired(99));
        assert!(claims.is_expired(100));
        assert!(unix_now() > 1_600_000_000);
    }
}
