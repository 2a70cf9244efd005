// ============================================================================
// JWT - Lectura del claim de expiración del token de acceso
// ============================================================================

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Decodifica el payload (segundo segmento, base64url) de un JWT.
/// Tolera relleno `=` presente o ausente.
pub fn decode_payload(token: &str) -> Option<serde_json::Value> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return None,
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Instante de expiración del token en milisegundos Unix, si el claim existe
pub fn expiry_ms(token: &str) -> Option<i64> {
    let payload = decode_payload(token)?;
    let exp = payload.get("exp")?.as_f64()?;
    Some((exp * 1000.0) as i64)
}

/// ¿El token está vencido en el instante `now_ms`?
/// Un token presente pero indescifrable se trata como vigente.
pub fn is_expired(token: &str, now_ms: i64) -> bool {
    match expiry_ms(token) {
        Some(exp) => now_ms >= exp,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE;

    fn build_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{}.{}.firma", header, body)
    }

    #[test]
    fn test_expiry_claim_is_read_in_ms() {
        let token = build_token(&serde_json::json!({ "sub": "7", "exp": 1_700_000_000 }));
        assert_eq!(expiry_ms(&token), Some(1_700_000_000_000));
    }

    #[test]
    fn test_expired_and_still_valid() {
        let token = build_token(&serde_json::json!({ "exp": 1_000 }));
        assert!(is_expired(&token, 1_000_000)); // justo en el límite
        assert!(is_expired(&token, 1_000_001));
        assert!(!is_expired(&token, 999_999));
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let body = URL_SAFE.encode(br#"{"exp":55}"#);
        assert!(body.ends_with('=')); // con relleno
        let token = format!("{}.{}.firma", header, body);
        assert_eq!(expiry_ms(&token), Some(55_000));
    }

    #[test]
    fn test_malformed_token_counts_as_valid() {
        assert!(!is_expired("", 0));
        assert!(!is_expired("no-es-un-jwt", i64::MAX));
        assert!(!is_expired("a.b", i64::MAX));
        assert!(!is_expired("a.%%%.c", i64::MAX));
        // payload sin claim exp
        let token = build_token(&serde_json::json!({ "sub": "7" }));
        assert!(!is_expired(&token, i64::MAX));
    }
}
