//! Advisory identity decoding for display purposes.
//!
//! The backend issues JWT-shaped bearer tokens whose payload carries an
//! `email` claim. Decoding is strictly advisory: the token stays opaque to
//! every correctness path, and any decode failure falls back to the
//! subject id.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use super::store::Session;

/// Returns a human-readable identity for a session.
///
/// Attempts to decode the `email` claim embedded in the credential; falls
/// back to the subject id when the token is not a decodable JWT or carries
/// no email.
pub fn display_identity(session: &Session) -> String {
    decode_email_claim(&session.token).unwrap_or_else(|| session.user_id.clone())
}

fn decode_email_claim(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;

    claims
        .get("email")?
        .as_str()
        .filter(|email| !email.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::Role;

    fn session_with_token(token: &str) -> Session {
        Session {
            user_id: "u-42".to_string(),
            role: Role::User,
            token: token.to_string(),
        }
    }

    fn jwt_with_payload(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"HS256\"}");
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn decodes_email_claim() {
        let token = jwt_with_payload(&serde_json::json!({
            "sub": "u-42",
            "email": "fieldworker@example.org",
        }));
        let session = session_with_token(&token);

        assert_eq!(display_identity(&session), "fieldworker@example.org");
    }

    #[test]
    fn falls_back_on_opaque_token() {
        let session = session_with_token("not-a-jwt");
        assert_eq!(display_identity(&session), "u-42");
    }

    #[test]
    fn falls_back_on_invalid_base64_payload() {
        let session = session_with_token("aaa.!!!not-base64!!!.bbb");
        assert_eq!(display_identity(&session), "u-42");
    }

    #[test]
    fn falls_back_when_email_claim_missing() {
        let token = jwt_with_payload(&serde_json::json!({ "sub": "u-42" }));
        let session = session_with_token(&token);

        assert_eq!(display_identity(&session), "u-42");
    }

    #[test]
    fn falls_back_on_empty_email() {
        let token = jwt_with_payload(&serde_json::json!({ "email": "" }));
        let session = session_with_token(&token);

        assert_eq!(display_identity(&session), "u-42");
    }
}
