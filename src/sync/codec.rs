use crate::model::ZoneDefinition;

/// Default chunk window in bytes. Chosen to fit comfortably inside
/// transport frames with headroom for message framing.
pub const DEFAULT_CHUNK_BYTES: usize = 900;

/// One replication message. `Chunk` is the current protocol; `Full` is
/// the legacy single-message form, still accepted by receivers.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneSyncMessage {
    Chunk {
        index: u32,
        total: u32,
        payload: Vec<u8>,
    },
    Full {
        payload: Vec<u8>,
    },
}

/// Serialize the full zone list to its canonical JSON wire form.
pub fn encode_zones(zones: &[ZoneDefinition]) -> serde_json::Result<String> {
    serde_json::to_string(zones)
}

/// Parse the wire form back into a zone list.
pub fn parse_zones(payload: &[u8]) -> serde_json::Result<Vec<ZoneDefinition>> {
    serde_json::from_slice(payload)
}

/// Split a payload into `Chunk` messages of at most `chunk_bytes` each,
/// `total = ceil(len / chunk_bytes)`. An empty payload yields a single
/// empty chunk so receivers still observe a complete session.
pub fn chunk_payload(payload: &[u8], chunk_bytes: usize) -> Vec<ZoneSyncMessage> {
    let chunk_bytes = chunk_bytes.max(1);
    if payload.is_empty() {
        return vec![ZoneSyncMessage::Chunk {
            index: 0,
            total: 1,
            payload: Vec::new(),
        }];
    }

    let total = payload.len().div_ceil(chunk_bytes) as u32;
    payload
        .chunks(chunk_bytes)
        .enumerate()
        .map(|(index, window)| ZoneSyncMessage::Chunk {
            index: index as u32,
            total,
            payload: window.to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HazardType, Vec3};

    fn sample_zones() -> Vec<ZoneDefinition> {
        vec![
            ZoneDefinition {
                id: "TGZ-1-000001".to_string(),
                position: Vec3::new(100.0, 0.0, 200.0),
                tier: 3,
                hazard: HazardType::Nerve,
                ..ZoneDefinition::default()
            },
            ZoneDefinition {
                id: "TGZ-1-000002".to_string(),
                ..ZoneDefinition::default()
            },
        ]
    }

    #[test]
    fn encode_parse_round_trip() {
        let zones = sample_zones();
        let text = encode_zones(&zones).unwrap();
        assert_eq!(parse_zones(text.as_bytes()).unwrap(), zones);
    }

    #[test]
    fn chunk_count_is_ceil() {
        let payload = vec![b'x'; 2000];
        let chunks = chunk_payload(&payload, 900);
        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            let ZoneSyncMessage::Chunk { index, total, payload } = chunk else {
                panic!("expected chunk");
            };
            assert_eq!(*index, i as u32);
            assert_eq!(*total, 3);
            assert!(payload.len() <= 900);
        }
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let payload = vec![b'x'; 1800];
        let chunks = chunk_payload(&payload, 900);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn empty_payload_single_empty_chunk() {
        let chunks = chunk_payload(&[], 900);
        assert_eq!(
            chunks,
            vec![ZoneSyncMessage::Chunk {
                index: 0,
                total: 1,
                payload: Vec::new(),
            }]
        );
    }

    #[test]
    fn chunk_size_zero_clamped_to_one() {
        let chunks = chunk_payload(b"abc", 0);
        assert_eq!(chunks.len(), 3);
    }
}
