//! Message decoding: raw broker message → typed change event.

use serde::Deserialize;

use super::transport::RawMessage;
use crate::domain::ChangeEvent;
use crate::error::RelayError;

/// Wire shape of the value payload: `{content?, path?}`.
///
/// Unknown fields are ignored; producers are free to carry extra
/// metadata the relay does not care about.
#[derive(Debug, Deserialize)]
struct ChangePayload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

/// Validates a raw message and extracts a [`ChangeEvent`].
///
/// A message must carry a non-empty UTF-8 key and a JSON value payload.
/// Both `content` and `path` are optional within the payload; a missing
/// `content` always marks the event as a delete for `key`, whether or
/// not `path` is present.
///
/// # Errors
///
/// Returns [`RelayError::Decode`] for messages missing the key or
/// payload, for non-UTF-8 keys, and for payloads that are not valid
/// JSON. Rejected messages never reach the persistence layer.
pub fn decode(raw: &RawMessage) -> Result<ChangeEvent, RelayError> {
    let key_bytes = raw
        .key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| RelayError::Decode("message has no key".to_string()))?;

    let key = std::str::from_utf8(key_bytes)
        .map_err(|e| RelayError::Decode(format!("message key is not valid UTF-8: {e}")))?
        .to_string();

    let payload_bytes = raw
        .payload
        .as_deref()
        .ok_or_else(|| RelayError::Decode("message has no value payload".to_string()))?;

    let payload: ChangePayload = serde_json::from_slice(payload_bytes)
        .map_err(|e| RelayError::Decode(format!("value payload is not valid JSON: {e}")))?;

    Ok(ChangeEvent {
        key,
        content: payload.content,
        path: payload.path,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn raw(key: Option<&[u8]>, payload: Option<&[u8]>) -> RawMessage {
        RawMessage {
            key: key.map(<[u8]>::to_vec),
            payload: payload.map(<[u8]>::to_vec),
        }
    }

    #[test]
    fn decodes_an_upsert() {
        let message = raw(
            Some(b"page-1"),
            Some(br#"{"content":"<p>hi</p>","path":"/a/"}"#),
        );

        let event = decode(&message).unwrap();
        assert_eq!(event.key, "page-1");
        assert_eq!(event.content.as_deref(), Some("<p>hi</p>"));
        assert_eq!(event.path.as_deref(), Some("/a/"));
        assert!(!event.is_delete());
    }

    #[test]
    fn empty_payload_object_is_a_delete() {
        let event = decode(&raw(Some(b"page-1"), Some(b"{}"))).unwrap();
        assert!(event.is_delete());
        assert!(event.path.is_none());
    }

    #[test]
    fn missing_content_is_a_delete_even_with_a_path() {
        let event = decode(&raw(Some(b"page-1"), Some(br#"{"path":"/a/"}"#))).unwrap();
        assert!(event.is_delete());
        assert_eq!(event.path.as_deref(), Some("/a/"));
    }

    #[test]
    fn rejects_missing_or_empty_key() {
        assert!(matches!(
            decode(&raw(None, Some(b"{}"))),
            Err(RelayError::Decode(_))
        ));
        assert!(matches!(
            decode(&raw(Some(b""), Some(b"{}"))),
            Err(RelayError::Decode(_))
        ));
    }

    #[test]
    fn rejects_non_utf8_key() {
        assert!(matches!(
            decode(&raw(Some(&[0xff, 0xfe]), Some(b"{}"))),
            Err(RelayError::Decode(_))
        ));
    }

    #[test]
    fn rejects_missing_or_invalid_payload() {
        assert!(matches!(
            decode(&raw(Some(b"k"), None)),
            Err(RelayError::Decode(_))
        ));
        assert!(matches!(
            decode(&raw(Some(b"k"), Some(b"not json"))),
            Err(RelayError::Decode(_))
        ));
    }

    #[test]
    fn ignores_unknown_payload_fields() {
        let event = decode(&raw(
            Some(b"k"),
            Some(br#"{"content":"c","path":"/p/","producer":"cms"}"#),
        ))
        .unwrap();
        assert_eq!(event.content.as_deref(), Some("c"));
    }
}
