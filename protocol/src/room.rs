//! The authoritative coordinator of one map.
//!
//! A room applies edits in arrival order, stamps every edit that changed the
//! map with the next [`Seq`], and fans the stamped event out to all of its
//! peers, the originator included. Edits that change nothing are dropped and
//! rejected edits are refused to their originator only.

use std::collections::BTreeSet;

use container::{decode_table, Limits};
use model::{Map, MapError};

use crate::apply::ApplyEngine;
use crate::envelope::Event;
use crate::error::LobbyResult;
use crate::message::MapSnapshot;
use crate::store::MapStore;
use crate::types::{PeerId, Seq, Sequenced};

/// What a room asks the transport to deliver after handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Send the sequenced event to every listed peer.
    Broadcast {
        peers: Vec<PeerId>,
        event: Sequenced<Event>,
    },
    /// Send a `refused` event to the originator only.
    Refused { peer: PeerId, reason: String },
    /// The edit changed nothing; send nothing.
    Dropped,
    /// The map was persisted.
    Saved,
}

impl Outcome {
    pub(crate) fn refused(peer: PeerId, reason: impl ToString) -> Self {
        let reason = reason.to_string();
        log::warn!("refused event from peer {}: {reason}", peer.raw());
        Self::Refused { peer, reason }
    }

    /// Returns the `(peer, event)` deliveries this outcome requires.
    #[must_use]
    pub fn deliveries(&self) -> Vec<(PeerId, Event)> {
        match self {
            Self::Broadcast { peers, event } => peers
                .iter()
                .map(|peer| (*peer, event.event.clone()))
                .collect(),
            Self::Refused { peer, reason } => vec![(*peer, Event::Refused(reason.clone()))],
            Self::Dropped | Self::Saved => Vec::new(),
        }
    }
}

/// One loaded map and the peers editing it.
#[derive(Debug)]
pub struct Room {
    name: String,
    map: Map,
    peers: BTreeSet<PeerId>,
    seq: Seq,
    engine: ApplyEngine,
    limits: Limits,
}

impl Room {
    #[must_use]
    pub fn new(name: impl Into<String>, map: Map, engine: ApplyEngine) -> Self {
        Self {
            name: name.into(),
            map,
            peers: BTreeSet::new(),
            seq: Seq::default(),
            engine,
            limits: Limits::default(),
        }
    }

    /// Sets the bundle limits the room's map must stay loadable under.
    #[must_use]
    pub fn with_bundle_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn map(&self) -> &Map {
        &self.map
    }

    /// Sequence number of the last broadcast; zero before the first.
    #[must_use]
    pub const fn seq(&self) -> Seq {
        self.seq
    }

    pub fn peers(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.peers.iter().copied()
    }

    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    #[must_use]
    pub fn contains(&self, peer: PeerId) -> bool {
        self.peers.contains(&peer)
    }

    /// Adds a peer. Returns `false` if it was already present.
    pub fn add_peer(&mut self, peer: PeerId) -> bool {
        self.peers.insert(peer)
    }

    /// Removes a peer. Returns `false` if it was not present.
    pub fn remove_peer(&mut self, peer: PeerId) -> bool {
        self.peers.remove(&peer)
    }

    /// Encodes the current map as a bundle that decodes under the room's
    /// bundle limits.
    pub fn bundle(&self) -> LobbyResult<Vec<u8>> {
        checked_bundle(&self.map, &self.limits)
    }

    /// Returns the current map together with the last broadcast's `seq`.
    pub fn snapshot(&self) -> LobbyResult<MapSnapshot> {
        Ok(MapSnapshot {
            seq: self.seq,
            bundle: self.bundle()?,
        })
    }

    /// Persists the current map under the room name.
    ///
    /// A map that would not load again is refused and the store is left as is.
    pub fn save(&self, store: &mut dyn MapStore) -> LobbyResult<()> {
        let bundle = self.bundle()?;
        store.save(&self.name, &bundle)?;
        log::info!("saved map {} at seq {}", self.name, self.seq.raw());
        Ok(())
    }

    /// Handles an event from `peer`.
    pub fn handle_event(
        &mut self,
        peer: PeerId,
        event: Event,
        store: &mut dyn MapStore,
    ) -> Outcome {
        if !self.contains(peer) {
            return Outcome::refused(peer, format!("not in room {}", self.name));
        }
        match event {
            Event::Save => match self.save(store) {
                Ok(()) => Outcome::Saved,
                Err(err) => Outcome::refused(peer, err),
            },
            event if event.is_edit() => self.apply(peer, event),
            other => Outcome::refused(peer, format!("{} is not a room event", other.name())),
        }
    }

    fn apply(&mut self, peer: PeerId, event: Event) -> Outcome {
        match self.engine.apply(&mut self.map, &event) {
            Ok(true) => {
                self.seq = self.seq.next();
                log::debug!(
                    "room {} seq {}: {} from peer {}",
                    self.name,
                    self.seq.raw(),
                    event.name(),
                    peer.raw()
                );
                Outcome::Broadcast {
                    peers: self.peers().collect(),
                    event: Sequenced {
                        seq: self.seq,
                        event,
                    },
                }
            }
            Ok(false) => Outcome::Dropped,
            Err(err) => Outcome::refused(peer, err),
        }
    }
}

/// Encodes `map` and checks the bundle's framing against `limits`.
pub(crate) fn checked_bundle(map: &Map, limits: &Limits) -> LobbyResult<Vec<u8>> {
    let bundle = map.to_bundle()?;
    decode_table(&bundle, limits).map_err(MapError::from)?;
    Ok(bundle)
}
