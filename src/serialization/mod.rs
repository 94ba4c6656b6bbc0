//! Persisted layout of the studio aggregate, and portable snapshots.
//!
//! # Stored layout
//!
//! The aggregate is one JSON object keyed by collection name:
//!
//! ```text
//! {
//!   "customers": [...], "events": [...], "payments": [...],
//!   "creditTransactions": [...], "messages": [...], "aiProcessingJobs": [...],
//!   "whatsappCredits": 500,
//!   "settings": { "studioName": ..., "studioPhone": ..., "studioEmail": ... }
//! }
//! ```
//!
//! Loading merges the stored object **shallowly** over the default
//! aggregate: a missing top-level key takes its default, a present one
//! replaces the default entirely. `settings` is not merged field by field,
//! so a stored `settings` object that lacks a required field fails to load.
//!
//! # Snapshots
//!
//! Snapshots wrap the same JSON layout in a versioned postcard envelope:
//!
//! ```text
//! ┌─────────────────┬─────────────────┬────────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (varint) │ JSON LAYOUT (length-prefixed)│
//! └─────────────────┴─────────────────┴────────────────────────────┘
//!   "STDL"              u32                 encode_studio_data(..)
//! ```
//!
//! The envelope catches bytes that are not a snapshot at all and snapshots
//! written by an incompatible build before any record is parsed.

use crate::error::{Error, Result};
use crate::studio::StudioData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Magic header of a studio snapshot: b"STDL"
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"STDL";

/// Snapshot format version.
///
/// Increment when the stored layout changes incompatibly. Snapshots with a
/// different version are rejected with `Error::VersionMismatch`.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Versioned envelope around an encoded aggregate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SnapshotEnvelope {
    pub magic: [u8; 4],
    pub version: u32,
    /// The aggregate in its stored JSON layout
    pub payload: Vec<u8>,
}

impl SnapshotEnvelope {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            payload,
        }
    }
}

/// Encode the aggregate in its stored JSON layout.
///
/// # Errors
/// Returns `Error::SerializationError` if JSON encoding fails.
pub fn encode_studio_data(data: &StudioData) -> Result<Vec<u8>> {
    serde_json::to_vec(data).map_err(|e| {
        error!("Studio data serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Decode a stored aggregate, shallow-merging it over `defaults`.
///
/// Top-level keys that are not part of the layout are dropped with a
/// warning.
///
/// # Errors
/// - `Error::DeserializationError`: not JSON, not a JSON object, or a
///   record that does not match its type
pub fn decode_studio_data(bytes: &[u8], defaults: &StudioData) -> Result<StudioData> {
    let stored: Value = serde_json::from_slice(bytes).map_err(|e| {
        error!("Studio data is not valid JSON: {}", e);
        Error::DeserializationError(e.to_string())
    })?;

    let Value::Object(stored) = stored else {
        return Err(Error::DeserializationError(format!(
            "expected a JSON object, found {}",
            json_kind(&stored)
        )));
    };

    let merged = merge_over_defaults(stored, defaults)?;
    serde_json::from_value(Value::Object(merged)).map_err(|e| {
        error!("Studio data does not match the expected layout: {}", e);
        Error::DeserializationError(e.to_string())
    })
}

/// Shallow merge: every known key present in `stored` replaces the default.
fn merge_over_defaults(stored: Map<String, Value>, defaults: &StudioData) -> Result<Map<String, Value>> {
    let Value::Object(mut merged) = serde_json::to_value(defaults)
        .map_err(|e| Error::SerializationError(e.to_string()))?
    else {
        return Err(Error::SerializationError(
            "default aggregate did not encode as an object".to_string(),
        ));
    };

    for (key, value) in stored {
        if StudioData::TOP_LEVEL_KEYS.contains(&key.as_str()) {
            merged.insert(key, value);
        } else {
            warn!("Ignoring unknown top-level key in studio data: {}", key);
        }
    }

    Ok(merged)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Export the aggregate as a snapshot.
///
/// # Errors
/// Returns `Error::SerializationError` if encoding fails.
pub fn export_snapshot(data: &StudioData) -> Result<Vec<u8>> {
    let envelope = SnapshotEnvelope::new(encode_studio_data(data)?);
    postcard::to_allocvec(&envelope).map_err(|e| {
        error!("Snapshot serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Read a snapshot back into an aggregate.
///
/// The embedded layout is decoded over `StudioData::default()`, so a
/// snapshot taken by an older build with fewer top-level keys still loads.
///
/// # Errors
///
/// - `Error::InvalidSnapshot`: bad magic header
/// - `Error::VersionMismatch`: snapshot version differs from `SNAPSHOT_VERSION`
/// - `Error::DeserializationError`: truncated envelope or corrupt payload
pub fn import_snapshot(bytes: &[u8]) -> Result<StudioData> {
    let envelope: SnapshotEnvelope = postcard::from_bytes(bytes).map_err(|e| {
        error!("Snapshot deserialization failed: {}", e);
        Error::DeserializationError(e.to_string())
    })?;

    if envelope.magic != SNAPSHOT_MAGIC {
        warn!(
            "Invalid snapshot: expected magic {:?}, got {:?}",
            SNAPSHOT_MAGIC, envelope.magic
        );
        return Err(Error::InvalidSnapshot(format!(
            "Invalid magic: expected {:?}, got {:?}",
            SNAPSHOT_MAGIC, envelope.magic
        )));
    }

    if envelope.version != SNAPSHOT_VERSION {
        warn!(
            "Snapshot version mismatch: expected {}, got {}",
            SNAPSHOT_VERSION, envelope.version
        );
        return Err(Error::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: envelope.version,
        });
    }

    decode_studio_data(&envelope.payload, &StudioData::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::StudioSettings;

    #[test]
    fn test_missing_keys_take_defaults() {
        let data = decode_studio_data(br#"{"customers":[]}"#, &StudioData::default()).unwrap();
        assert_eq!(data, StudioData::default());
    }

    #[test]
    fn test_present_key_replaces_default() {
        let data =
            decode_studio_data(br#"{"whatsappCredits":12}"#, &StudioData::default()).unwrap();
        assert_eq!(data.whatsapp_credits, 12);
        assert_eq!(data.settings, StudioSettings::default());
    }

    #[test]
    fn test_settings_are_not_deep_merged() {
        // gstNumber is optional, so a partial object without it still loads,
        // and the default GST number is not carried over.
        let stored = br#"{"settings":{"studioName":"Frame Works","studioPhone":"1","studioEmail":"a@b"}}"#;
        let data = decode_studio_data(stored, &StudioData::default()).unwrap();
        assert_eq!(data.settings.studio_name, "Frame Works");
        assert_eq!(data.settings.gst_number, None);

        // A required field missing from stored settings is not defaulted.
        let partial = br#"{"settings":{"studioName":"Frame Works"}}"#;
        let result = decode_studio_data(partial, &StudioData::default());
        assert!(matches!(result, Err(Error::DeserializationError(_))));
    }

    #[test]
    fn test_unknown_keys_dropped() {
        let data =
            decode_studio_data(br#"{"theme":"dark","whatsappCredits":7}"#, &StudioData::default())
                .unwrap();
        assert_eq!(data.whatsapp_credits, 7);
    }

    #[test]
    fn test_non_object_rejected() {
        let result = decode_studio_data(b"[1,2,3]", &StudioData::default());
        assert!(matches!(result, Err(Error::DeserializationError(_))));

        let result = decode_studio_data(b"not json", &StudioData::default());
        assert!(matches!(result, Err(Error::DeserializationError(_))));
    }

    #[test]
    fn test_encode_decode_default() {
        let bytes = encode_studio_data(&StudioData::default()).unwrap();
        let decoded = decode_studio_data(&bytes, &StudioData::default()).unwrap();
        assert_eq!(decoded, StudioData::default());
    }

    #[test]
    fn test_snapshot_envelope_structure() {
        let bytes = export_snapshot(&StudioData::default()).unwrap();
        let envelope: SnapshotEnvelope = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(envelope.magic, SNAPSHOT_MAGIC);
        assert_eq!(envelope.version, SNAPSHOT_VERSION);
        assert_eq!(
            envelope.payload,
            encode_studio_data(&StudioData::default()).unwrap()
        );
    }

    #[test]
    fn test_snapshot_invalid_magic_rejected() {
        let mut envelope = SnapshotEnvelope::new(b"{}".to_vec());
        envelope.magic = *b"XXXX";
        let bytes = postcard::to_allocvec(&envelope).unwrap();

        match import_snapshot(&bytes) {
            Err(Error::InvalidSnapshot(_)) => {}
            other => panic!("Expected InvalidSnapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_version_mismatch_rejected() {
        let mut envelope = SnapshotEnvelope::new(b"{}".to_vec());
        envelope.version = 999;
        let bytes = postcard::to_allocvec(&envelope).unwrap();

        match import_snapshot(&bytes) {
            Err(Error::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SNAPSHOT_VERSION);
                assert_eq!(found, 999);
            }
            other => panic!("Expected VersionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_truncated_rejected() {
        let mut bytes = export_snapshot(&StudioData::default()).unwrap();
        let len = bytes.len();
        bytes.truncate(len / 2);

        assert!(matches!(
            import_snapshot(&bytes),
            Err(Error::DeserializationError(_))
        ));
    }
}
