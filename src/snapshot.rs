//! Checksummed envelope around a session snapshot.
//!
//! The presentation layer stores the encoded string verbatim (localStorage).
//! Decoding refuses anything whose payload checksum, game kind or version
//! does not match, so a truncated or hand-edited value never reaches the
//! engines' restore paths.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

const VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    game: String,
    version: u32,
    crc32: u32,
    payload: String,
}

/// Serializes `value` and wraps it with the game kind and a CRC32 of the payload.
pub fn encode<T: Serialize>(game: &str, value: &T) -> Result<String, SnapshotError> {
    let payload = serde_json::to_string(value)?;
    let envelope = Envelope {
        game: game.to_string(),
        version: VERSION,
        crc32: crc32fast::hash(payload.as_bytes()),
        payload,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Opens an envelope produced by [`encode`] for `game`.
pub fn decode<T: DeserializeOwned>(game: &str, data: &str) -> Result<T, SnapshotError> {
    let envelope: Envelope = serde_json::from_str(data)?;

    if envelope.game != game {
        return Err(SnapshotError::WrongGame {
            expected: game.to_string(),
            found: envelope.game,
        });
    }
    if envelope.version != VERSION {
        return Err(SnapshotError::Version {
            expected: VERSION,
            found: envelope.version,
        });
    }

    let actual = crc32fast::hash(envelope.payload.as_bytes());
    if actual != envelope.crc32 {
        return Err(SnapshotError::Checksum {
            expected: envelope.crc32,
            actual,
        });
    }

    Ok(serde_json::from_str(&envelope.payload)?)
}
