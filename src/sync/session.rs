/// Chunk reassembly state machine for one observer.
///
/// Chunks may repeat but arrive in order over a lossless transport. A
/// chunk whose `total` differs from the in-progress session invalidates
/// the session: everything buffered is discarded and the new chunk starts
/// a fresh session. Duplicate slots never double-count.
#[derive(Debug, Default)]
pub enum Reassembly {
    #[default]
    Idle,
    Receiving {
        total: u32,
        slots: Vec<Option<Vec<u8>>>,
        received: u32,
    },
}

impl Reassembly {
    pub fn new() -> Self {
        Reassembly::Idle
    }

    /// Accept one chunk. Returns the reassembled payload when the session
    /// completes, leaving the machine `Idle` again.
    pub fn accept(&mut self, index: u32, total: u32, payload: Vec<u8>) -> Option<Vec<u8>> {
        if total == 0 {
            tracing::warn!("zone sync chunk with zero total, ignoring");
            return None;
        }

        // A different total means a new broadcast started mid-session.
        if let Reassembly::Receiving { total: current, .. } = self {
            if *current != total {
                tracing::warn!(
                    old_total = *current,
                    new_total = total,
                    "zone sync total changed, restarting session"
                );
                *self = Reassembly::Idle;
            }
        }

        if matches!(self, Reassembly::Idle) {
            *self = Reassembly::Receiving {
                total,
                slots: vec![None; total as usize],
                received: 0,
            };
        }

        let Reassembly::Receiving {
            total,
            slots,
            received,
        } = self
        else {
            return None;
        };

        if index >= *total {
            tracing::warn!(index, total = *total, "zone sync chunk index out of range");
            return None;
        }

        let slot = &mut slots[index as usize];
        if slot.is_none() {
            *slot = Some(payload);
            *received += 1;
        }

        if *received < *total {
            return None;
        }

        let assembled = slots
            .iter_mut()
            .map(|s| s.take().unwrap_or_default())
            .collect::<Vec<_>>()
            .concat();
        *self = Reassembly::Idle;
        Some(assembled)
    }
}
