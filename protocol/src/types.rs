//! Identifiers and sequencing.

use serde::{Deserialize, Serialize};

/// A room's total-order sequence number.
///
/// The first accepted change in a room is sequence 1; zero means "nothing
/// applied yet".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Seq(u64);

impl Seq {
    #[must_use]
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns the sequence number that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for Seq {
    fn from(seq: u64) -> Self {
        Self(seq)
    }
}

/// A connected peer, assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PeerId(u64);

impl PeerId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for PeerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A value tagged with the sequence number the room assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequenced<T> {
    pub seq: Seq,
    pub event: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_next() {
        assert_eq!(Seq::default().next(), Seq::new(1));
        assert!(Seq::new(1) < Seq::new(2));
    }

    #[test]
    fn seq_is_transparent_json() {
        assert_eq!(serde_json::to_string(&Seq::new(7)).unwrap(), "7");
        assert_eq!(serde_json::from_str::<Seq>("9").unwrap(), Seq::new(9));
    }

    #[test]
    fn peer_id_roundtrip() {
        assert_eq!(PeerId::from(3).raw(), 3);
    }
}
