//! Values written to the key-value store.
//!
//! The store resolves concurrent writes with lattice merges, so every value
//! is either a last-writer-wins pair or a cross-causal value carrying a vector clock.

use ::std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

use ::serde::{Deserialize, Serialize};
use ::time::OffsetDateTime;

pub type Timestamp = u64;
pub type Payload = Vec<u8>;
/// Replica id to the number of writes seen from that replica.
pub type VectorClock = BTreeMap<String, u64>;

/// Replica id used for the first write of a cross-causal value.
pub const BASE_REPLICA: &str = "base";

/// Consistency mode requested when a function is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consistency {
    /// Last writer wins.
    Normal,
    /// Vector-clock causal consistency.
    Cross,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LwwValue {
    pub timestamp: Timestamp,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossCausalValue {
    pub vector_clock: VectorClock,
    /// Concurrent versions of the value.
    pub values: BTreeSet<Payload>,
}

impl CrossCausalValue {
    /// `Some(_)` when one clock dominates or equals the other, `None` when they are concurrent.
    fn compare_clocks(left: &VectorClock, right: &VectorClock) -> Option<Ordering> {
        let replicas: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
        replicas
            .into_iter()
            .map(|replica| {
                let l = left.get(replica).copied().unwrap_or(0);
                let r = right.get(replica).copied().unwrap_or(0);
                l.cmp(&r)
            })
            .try_fold(Ordering::Equal, |acc, ord| match (acc, ord) {
                (acc, Ordering::Equal) => Some(acc),
                (Ordering::Equal, ord) => Some(ord),
                (acc, ord) if acc == ord => Some(acc),
                _ => None,
            })
    }

    /// A dominating clock replaces the other value.
    /// Concurrent (or identical) clocks take the pointwise maximum and keep every version.
    pub fn merge(mut self, other: Self) -> Self {
        match Self::compare_clocks(&self.vector_clock, &other.vector_clock) {
            Some(Ordering::Greater) => self,
            Some(Ordering::Less) => other,
            Some(Ordering::Equal) | None => {
                for (replica, count) in other.vector_clock {
                    let entry = self.vector_clock.entry(replica).or_insert(0);
                    *entry = (*entry).max(count);
                }
                self.values.extend(other.values);
                self
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum LatticeValue {
    Lww(LwwValue),
    CrossCausal(CrossCausalValue),
}

impl LatticeValue {
    /// Wrap a payload in the lattice matching the consistency mode.
    pub fn from_payload(consistency: Consistency, payload: Payload) -> Self {
        match consistency {
            Consistency::Normal => Self::lww(payload),
            Consistency::Cross => Self::CrossCausal(CrossCausalValue {
                vector_clock: BTreeMap::from([(BASE_REPLICA.to_owned(), 1)]),
                values: BTreeSet::from([payload]),
            }),
        }
    }

    /// Last-writer-wins value stamped with the current time.
    pub fn lww(payload: Payload) -> Self {
        Self::Lww(LwwValue {
            timestamp: generate_timestamp(0),
            payload,
        })
    }

    /// Merge a newer write into the current value.
    /// Values of different lattice kinds cannot be merged, the newer write replaces the old one.
    pub fn merge(self, newer: Self) -> Self {
        match (self, newer) {
            (Self::Lww(current), Self::Lww(newer)) => {
                if newer.timestamp >= current.timestamp {
                    Self::Lww(newer)
                } else {
                    Self::Lww(current)
                }
            }
            (Self::CrossCausal(current), Self::CrossCausal(newer)) => {
                Self::CrossCausal(current.merge(newer))
            }
            (_, newer) => newer,
        }
    }

    /// Payload of a last-writer-wins value.
    pub fn lww_payload(&self) -> Option<&[u8]> {
        match self {
            Self::Lww(LwwValue { payload, .. }) => Some(payload),
            Self::CrossCausal(_) => None,
        }
    }
}

/// Wall-clock microseconds with `writer_id` appended as the lowest decimal digits,
/// so writes from different writers within the same microsecond still get distinct timestamps.
pub fn generate_timestamp(writer_id: u32) -> Timestamp {
    let micros = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000;
    let micros = u64::try_from(micros).unwrap_or_default();
    let writer_id = u64::from(writer_id);
    let mut scale = 10;
    while writer_id >= scale {
        scale *= 10;
    }
    micros.saturating_mul(scale).saturating_add(writer_id)
}
