//! An editor's copy of a room's map.

use container::Limits;
use model::{Map, MapResult};

use crate::apply::ApplyEngine;
use crate::envelope::Event;
use crate::error::{ApplyResult, ReplicaError};
use crate::message::{MapSnapshot, TileChange};
use crate::types::{Seq, Sequenced};

/// Follows a room's broadcasts and applies local tile edits optimistically.
///
/// Structural edits are sent to the room without being applied locally and
/// take effect when their broadcast arrives.
///
/// Local tile edits stay pending until a broadcast carries the same change.
/// A refusal, or a broadcast that moves, deletes or resizes layers while
/// edits are pending, can leave optimistic writes the room never made. The
/// replica is then [stale](Self::is_stale) until [`Replica::resync`] replaces
/// its map with a fresh `map` response.
#[derive(Debug, Clone)]
pub struct Replica {
    map: Map,
    seq: Seq,
    engine: ApplyEngine,
    pending: Vec<TileChange>,
    stale: bool,
}

impl Replica {
    /// Creates a replica of `map` as of broadcast `seq`.
    #[must_use]
    pub fn new(map: Map, seq: Seq) -> Self {
        Self::with_engine(map, seq, ApplyEngine::default())
    }

    #[must_use]
    pub const fn with_engine(map: Map, seq: Seq, engine: ApplyEngine) -> Self {
        Self {
            map,
            seq,
            engine,
            pending: Vec::new(),
            stale: false,
        }
    }

    /// Creates a replica from a `map` response.
    pub fn from_snapshot(name: &str, snapshot: &MapSnapshot, limits: &Limits) -> MapResult<Self> {
        let map = Map::from_bundle(name, &snapshot.bundle, limits)?;
        Ok(Self::new(map, snapshot.seq))
    }

    #[must_use]
    pub const fn map(&self) -> &Map {
        &self.map
    }

    /// Sequence number of the last applied broadcast.
    #[must_use]
    pub const fn seq(&self) -> Seq {
        self.seq
    }

    /// Local tile edits not yet seen in a broadcast.
    #[must_use]
    pub fn pending(&self) -> &[TileChange] {
        &self.pending
    }

    /// Returns `true` when the local map may hold writes the room refused or
    /// placed elsewhere. Request a `map` snapshot and [`Replica::resync`].
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Applies a tile edit locally.
    ///
    /// Returns the event to send, or `None` when the edit changed nothing.
    pub fn local_tile_change(&mut self, change: TileChange) -> ApplyResult<Option<Event>> {
        if self.engine.tile_change(&mut self.map, &change)? {
            self.pending.push(change.clone());
            Ok(Some(Event::TileChange(change)))
        } else {
            Ok(None)
        }
    }

    /// Applies the next broadcast. Returns whether it changed the local map;
    /// the echo of an optimistic local edit returns `false`.
    pub fn receive(&mut self, broadcast: &Sequenced<Event>) -> Result<bool, ReplicaError> {
        let expected = self.seq.next();
        if broadcast.seq != expected {
            return Err(ReplicaError::OutOfOrder {
                expected,
                found: broadcast.seq,
            });
        }
        match &broadcast.event {
            Event::TileChange(change) => {
                if let Some(index) = self.pending.iter().position(|p| p == change) {
                    self.pending.remove(index);
                }
            }
            event if reshapes_layers(event) && !self.pending.is_empty() => {
                self.mark_stale("layers moved under pending tile edits");
            }
            _ => {}
        }
        let changed = match self.engine.apply(&mut self.map, &broadcast.event) {
            Ok(changed) => changed,
            Err(error) => {
                self.mark_stale("broadcast failed to apply");
                return Err(ReplicaError::Apply {
                    seq: broadcast.seq,
                    error,
                });
            }
        };
        self.seq = expected;
        Ok(changed)
    }

    /// Handles a `refused` event addressed to this editor.
    ///
    /// Refusals of structural edits leave nothing to undo; a refused tile
    /// edit leaves its optimistic write behind.
    pub fn refused(&mut self, reason: &str) {
        if !self.pending.is_empty() {
            self.mark_stale(reason);
        }
    }

    /// Replaces the local map with a `map` response and drops pending edits.
    ///
    /// Edits sent after the snapshot was requested come back as broadcasts.
    pub fn resync(&mut self, snapshot: &MapSnapshot, limits: &Limits) -> MapResult<()> {
        self.map = Map::from_bundle(&self.map.name, &snapshot.bundle, limits)?;
        self.seq = snapshot.seq;
        self.pending.clear();
        self.stale = false;
        log::debug!("replica resynced at seq {}", self.seq.raw());
        Ok(())
    }

    fn mark_stale(&mut self, reason: &str) {
        if !self.stale {
            log::debug!(
                "replica stale at seq {} ({} pending): {reason}",
                self.seq.raw(),
                self.pending.len()
            );
        }
        self.stale = true;
    }
}

/// Whether `event` can change which layer a `(group, layer, x, y)` address hits.
fn reshapes_layers(event: &Event) -> bool {
    match event {
        Event::GroupChange(change) => change.delete || change.order.is_some(),
        Event::LayerChange(change) => {
            change.delete
                || change.order.is_some()
                || change.width.is_some()
                || change.height.is_some()
        }
        _ => false,
    }
}
