//! Read-only views of upstream payloads.
//!
//! These are parsed only to decide a TTL. The bytes that get cached and
//! served are always the originals.

use serde::{Deserialize, Deserializer};

/// Plain success.
pub const STATUS_OK: i64 = 1;

/// Success, but some results are subscriber-only.
pub const STATUS_RESTRICTED_CONTENT: i64 = 105;

/// Status code of the envelope served by disabled routes.
pub const STATUS_PROXY_DISABLED: i64 = -1;

// == Catalog Envelope ==
/// The common header of every media-catalog response.
///
/// Missing fields and explicit `null`s both read as the field's default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GiantBombEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    pub status_code: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub error: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub offset: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub number_of_page_results: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub number_of_total_results: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl GiantBombEnvelope {
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status_code, STATUS_OK | STATUS_RESTRICTED_CONTENT)
    }
}

// == Disabled Envelope ==
/// Fixed body served in place of an upstream response when proxying is
/// switched off for a route. Shaped like a catalog envelope so clients can
/// read it the same way.
pub const DISABLED_ENVELOPE: &str = concat!(
    r#"{"status_code":-1,"error":"Proxy disabled","#,
    r#""message":"Requests to this endpoint are temporarily disabled","#,
    r#""limit":0,"offset":0,"number_of_page_results":0,"number_of_total_results":0,"#,
    r#""results":[]}"#
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let body = br#"{"error":"OK","limit":100,"offset":0,"number_of_page_results":1,
            "number_of_total_results":1,"status_code":1,"results":[{"id":1}]}"#;

        let envelope = GiantBombEnvelope::parse(body).unwrap();
        assert_eq!(envelope.status_code, STATUS_OK);
        assert_eq!(envelope.limit, 100);
        assert!(envelope.is_success());
    }

    #[test]
    fn test_restricted_content_is_success() {
        let envelope = GiantBombEnvelope::parse(br#"{"status_code":105}"#).unwrap();
        assert!(envelope.is_success());
    }

    #[test]
    fn test_error_status() {
        let body = br#"{"status_code":101,"error":"Object Not Found","results":[]}"#;

        let envelope = GiantBombEnvelope::parse(body).unwrap();
        assert_eq!(envelope.error, "Object Not Found");
        assert!(!envelope.is_success());
    }

    #[test]
    fn test_missing_status_is_not_success() {
        let envelope = GiantBombEnvelope::parse(b"{}").unwrap();
        assert_eq!(envelope.status_code, 0);
        assert!(!envelope.is_success());
    }

    #[test]
    fn test_rejects_non_envelopes() {
        assert!(GiantBombEnvelope::parse(b"<html>busy</html>").is_err());
        assert!(GiantBombEnvelope::parse(b"[1,2,3]").is_err());
        assert!(GiantBombEnvelope::parse(br#"{"status_code":"1"}"#).is_err());
        assert!(GiantBombEnvelope::parse(b"").is_err());
    }

    #[test]
    fn test_nulls_read_as_defaults() {
        let body = br#"{"status_code":1,"error":"OK","message":null,"limit":null,
            "offset":null,"number_of_page_results":null,"results":[]}"#;

        let envelope = GiantBombEnvelope::parse(body).unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.message, "");
        assert_eq!(envelope.limit, 0);
    }

    #[test]
    fn test_null_status_is_not_success() {
        let envelope = GiantBombEnvelope::parse(br#"{"status_code":null}"#).unwrap();
        assert!(!envelope.is_success());
    }

    #[test]
    fn test_disabled_envelope_shape() {
        let value: serde_json::Value = serde_json::from_str(DISABLED_ENVELOPE).unwrap();

        assert_eq!(value["status_code"], STATUS_PROXY_DISABLED);
        assert_eq!(value["results"], serde_json::json!([]));
        assert!(value["message"].as_str().unwrap().contains("disabled"));

        let envelope = GiantBombEnvelope::parse(DISABLED_ENVELOPE.as_bytes()).unwrap();
        assert_eq!(envelope.status_code, STATUS_PROXY_DISABLED);
        assert!(!envelope.is_success());
    }
}
