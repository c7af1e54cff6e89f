//! The map registry: rooms, peers and the lobby queries.
//!
//! Rooms are loaded lazily on the first join and unloaded when their last
//! peer leaves. Edits that were not saved are discarded on unload.

use std::collections::BTreeMap;

use codec::TileKind;
use container::Limits;
use model::Map;

use crate::apply::ApplyEngine;
use crate::envelope::{Event, QueryRequest, QueryResponse};
use crate::error::{LobbyError, LobbyResult};
use crate::message::{CreateMap, MapInfo, MapSnapshot, MapSource, Users};
use crate::room::{checked_bundle, Outcome, Room};
use crate::store::{checked_name, validate_map_name, MapStore};
use crate::types::PeerId;

/// Routes peers to rooms backed by a [`MapStore`].
#[derive(Debug)]
pub struct Lobby<S> {
    store: S,
    rooms: BTreeMap<String, Room>,
    peers: BTreeMap<PeerId, String>,
    uploads: BTreeMap<String, PeerId>,
    limits: Limits,
    engine: ApplyEngine,
}

impl<S: MapStore> Lobby<S> {
    /// Creates a lobby with default bundle limits and edit limits.
    pub fn new(store: S) -> Self {
        Self::with_limits(store, Limits::default(), ApplyEngine::default())
    }

    /// Creates a lobby whose edit limits are tightened to fit `limits`.
    pub fn with_limits(store: S, limits: Limits, engine: ApplyEngine) -> Self {
        let engine = ApplyEngine::new(engine.limits().clone().fitting(&limits));
        Self {
            store,
            rooms: BTreeMap::new(),
            peers: BTreeMap::new(),
            uploads: BTreeMap::new(),
            limits,
            engine,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns a loaded room.
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// Returns the room `peer` has joined.
    pub fn room_of(&self, peer: PeerId) -> Option<&Room> {
        self.rooms.get(self.peers.get(&peer)?)
    }

    fn joined(&self, peer: PeerId) -> LobbyResult<&Room> {
        self.room_of(peer).ok_or(LobbyError::NotJoined)
    }

    /// Lists stored maps with their connected user counts.
    pub fn maps(&self) -> LobbyResult<Vec<MapInfo>> {
        let names = self.store.list()?;
        Ok(names
            .into_iter()
            .map(|name| {
                let users = self.rooms.get(&name).map_or(0, Room::peer_count);
                MapInfo {
                    name,
                    users: u32::try_from(users).unwrap_or(u32::MAX),
                }
            })
            .collect())
    }

    /// Moves `peer` into the room of map `name`, loading it if needed.
    ///
    /// Returns `false`, leaving the peer where it was, when no such map is stored.
    pub fn join(&mut self, peer: PeerId, name: &str) -> LobbyResult<bool> {
        if self.peers.get(&peer).is_some_and(|current| current == name) {
            return Ok(true);
        }
        if !self.rooms.contains_key(name) {
            if validate_map_name(name).is_err() || !self.store.exists(name)? {
                return Ok(false);
            }
            let bundle = self.store.load(name)?;
            let map = Map::from_bundle(name, &bundle, &self.limits)?;
            log::info!("loaded map {name}");
            let room =
                Room::new(name, map, self.engine.clone()).with_bundle_limits(self.limits.clone());
            self.rooms.insert(name.to_string(), room);
        }

        self.leave(peer);
        if let Some(room) = self.rooms.get_mut(name) {
            room.add_peer(peer);
        }
        self.peers.insert(peer, name.to_string());
        log::debug!("peer {} joined {name}", peer.raw());
        Ok(true)
    }

    /// Removes `peer` from its room. Returns `false` if it was in none.
    pub fn leave(&mut self, peer: PeerId) -> bool {
        let Some(name) = self.peers.remove(&peer) else {
            return false;
        };
        if let Some(room) = self.rooms.get_mut(&name) {
            room.remove_peer(peer);
            if room.is_empty() {
                self.rooms.remove(&name);
                log::info!("unloaded map {name}");
            }
        }
        true
    }

    /// Forgets `peer` entirely, including its pending uploads.
    pub fn disconnect(&mut self, peer: PeerId) {
        self.leave(peer);
        self.uploads.retain(|_, owner| *owner != peer);
    }

    /// Returns the joined room's current map and sequence number.
    pub fn map_snapshot(&self, peer: PeerId) -> LobbyResult<MapSnapshot> {
        self.joined(peer)?.snapshot()
    }

    /// Returns the peer count of the joined room.
    pub fn users(&self, peer: PeerId) -> LobbyResult<Users> {
        let count = self.joined(peer)?.peer_count();
        Ok(Users {
            count: u32::try_from(count).unwrap_or(u32::MAX),
        })
    }

    /// Registers a new map and returns its name.
    pub fn create_map(&mut self, peer: PeerId, create: &CreateMap) -> LobbyResult<String> {
        let name = create.name.as_str();
        checked_name(name)?;
        if self.store.exists(name)? || self.uploads.contains_key(name) {
            return Err(LobbyError::Duplicate {
                name: name.to_string(),
            });
        }

        match &create.source {
            MapSource::Blank(blank) => {
                let limits = self.engine.limits();
                let max = limits.max_layer_dimension;
                for value in [blank.width, blank.height] {
                    if value == 0 || value > max {
                        return Err(LobbyError::InvalidDimension { value, max });
                    }
                }
                let (width, height) = (blank.width as usize, blank.height as usize);
                let max_bytes = limits.max_layer_bytes;
                let fits = width
                    .checked_mul(height)
                    .and_then(|cells| cells.checked_mul(TileKind::Game.cell_size()))
                    .is_some_and(|bytes| bytes <= max_bytes);
                if !fits {
                    return Err(LobbyError::MapTooLarge {
                        width: blank.width,
                        height: blank.height,
                        max_bytes,
                    });
                }
                let map = if blank.default_layers {
                    Map::blank_with_defaults(name, width, height)
                } else {
                    Map::blank(name, width, height)
                };
                self.store.save(name, &checked_bundle(&map, &self.limits)?)?;
            }
            MapSource::Clone(source) => {
                let bundle = match self.rooms.get(&source.clone) {
                    Some(room) => room.bundle()?,
                    None => self.store.load(&source.clone)?,
                };
                Map::from_bundle(name, &bundle, &self.limits)?;
                self.store.save(name, &bundle)?;
            }
            MapSource::Upload(_) => {
                self.uploads.insert(name.to_string(), peer);
                log::info!("upload of {name} reserved by peer {}", peer.raw());
                return Ok(name.to_string());
            }
        }
        log::info!("created map {name}");
        Ok(name.to_string())
    }

    /// Completes an upload reserved by `peer`.
    ///
    /// An invalid bundle is rejected and the reservation kept.
    pub fn upload(&mut self, peer: PeerId, name: &str, bundle: &[u8]) -> LobbyResult<Event> {
        if self.uploads.get(name) != Some(&peer) {
            return Err(LobbyError::NoPendingUpload {
                name: name.to_string(),
            });
        }
        Map::from_bundle(name, bundle, &self.limits)?;
        self.store.save(name, bundle)?;
        self.uploads.remove(name);
        log::info!("upload of {name} complete ({} bytes)", bundle.len());
        Ok(Event::UploadComplete)
    }

    /// Deletes a map with no connected users and returns its name.
    pub fn delete_map(&mut self, name: &str) -> LobbyResult<String> {
        checked_name(name)?;
        if let Some(room) = self.rooms.get(name) {
            return Err(LobbyError::InUse {
                name: name.to_string(),
                users: room.peer_count(),
            });
        }
        if self.uploads.remove(name).is_some() {
            log::info!("upload of {name} cancelled");
            return Ok(name.to_string());
        }
        self.store.delete(name)?;
        log::info!("deleted map {name}");
        Ok(name.to_string())
    }

    /// Answers a query from `peer`.
    pub fn handle_query(
        &mut self,
        peer: PeerId,
        request: &QueryRequest,
    ) -> LobbyResult<QueryResponse> {
        let response = match request {
            QueryRequest::Maps => QueryResponse::Maps(self.maps()?),
            QueryRequest::Join(name) => QueryResponse::Join(self.join(peer, name)?),
            QueryRequest::Map => QueryResponse::Map(self.map_snapshot(peer)?),
            QueryRequest::Users => QueryResponse::Users(self.users(peer)?),
            QueryRequest::CreateMap(create) => {
                QueryResponse::CreateMap(self.create_map(peer, create)?)
            }
            QueryRequest::DeleteMap(name) => QueryResponse::DeleteMap(self.delete_map(name)?),
        };
        Ok(response)
    }

    /// Handles an event from `peer`.
    ///
    /// `join` moves the peer without a response; everything else goes to
    /// the peer's room.
    pub fn handle_event(&mut self, peer: PeerId, event: Event) -> Outcome {
        if let Event::Join(name) = &event {
            return match self.join(peer, name) {
                Ok(true) => Outcome::Dropped,
                Ok(false) => Outcome::refused(peer, format!("no such map: {name}")),
                Err(err) => Outcome::refused(peer, err),
            };
        }
        let Some(name) = self.peers.get(&peer) else {
            return Outcome::refused(peer, LobbyError::NotJoined);
        };
        match self.rooms.get_mut(name) {
            Some(room) => room.handle_event(peer, event, &mut self.store),
            None => Outcome::refused(peer, LobbyError::NotJoined),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::message::{BlankMap, CloneMap, CreateLayer, UploadMap};
    use crate::store::MemoryStore;
    use container::LayerKind;

    fn blank(name: &str) -> CreateMap {
        CreateMap {
            name: name.to_string(),
            source: MapSource::Blank(BlankMap {
                width: 10,
                height: 5,
                default_layers: false,
            }),
        }
    }

    const ALICE: PeerId = PeerId::new(1);
    const BOB: PeerId = PeerId::new(2);

    #[test]
    fn create_join_leave() {
        let mut lobby = Lobby::new(MemoryStore::new());
        assert_eq!(lobby.create_map(ALICE, &blank("alpha")).unwrap(), "alpha");
        assert!(lobby.room("alpha").is_none());

        assert!(lobby.join(ALICE, "alpha").unwrap());
        assert!(lobby.join(BOB, "alpha").unwrap());
        assert_eq!(lobby.users(ALICE).unwrap(), Users { count: 2 });
        assert_eq!(
            lobby.maps().unwrap(),
            vec![MapInfo {
                name: "alpha".to_string(),
                users: 2
            }]
        );

        assert!(lobby.leave(ALICE));
        assert!(lobby.room("alpha").is_some());
        assert!(lobby.leave(BOB));
        assert!(lobby.room("alpha").is_none());
        assert!(!lobby.leave(BOB));
    }

    #[test]
    fn join_unknown_map_is_false() {
        let mut lobby = Lobby::new(MemoryStore::new());
        assert!(!lobby.join(ALICE, "nowhere").unwrap());
        assert!(!lobby.join(ALICE, "../etc").unwrap());
        assert!(matches!(lobby.users(ALICE), Err(LobbyError::NotJoined)));
    }

    #[test]
    fn join_moves_between_rooms() {
        let mut lobby = Lobby::new(MemoryStore::new());
        lobby.create_map(ALICE, &blank("a")).unwrap();
        lobby.create_map(ALICE, &blank("b")).unwrap();
        lobby.join(ALICE, "a").unwrap();
        lobby.join(ALICE, "b").unwrap();
        assert!(lobby.room("a").is_none());
        assert_eq!(lobby.room_of(ALICE).map(Room::name), Some("b"));
    }

    #[test]
    fn duplicate_and_invalid_names_refused() {
        let mut lobby = Lobby::new(MemoryStore::new());
        lobby.create_map(ALICE, &blank("taken")).unwrap();
        assert!(matches!(
            lobby.create_map(ALICE, &blank("taken")),
            Err(LobbyError::Duplicate { .. })
        ));
        assert!(matches!(
            lobby.create_map(ALICE, &blank(".dot")),
            Err(LobbyError::Store(StoreError::InvalidName { .. }))
        ));
        let mut zero = blank("zero");
        zero.source = MapSource::Blank(BlankMap {
            width: 0,
            height: 5,
            default_layers: true,
        });
        assert!(matches!(
            lobby.create_map(ALICE, &zero),
            Err(LobbyError::InvalidDimension { value: 0, .. })
        ));
    }

    #[test]
    fn clone_copies_live_state() {
        let mut lobby = Lobby::new(MemoryStore::new());
        lobby.create_map(ALICE, &blank("orig")).unwrap();
        lobby.join(ALICE, "orig").unwrap();
        let copy = CreateMap {
            name: "copy".to_string(),
            source: MapSource::Clone(CloneMap {
                clone: "orig".to_string(),
            }),
        };
        lobby.create_map(ALICE, &copy).unwrap();
        assert!(lobby.join(BOB, "copy").unwrap());
        assert_eq!(
            lobby.room("copy").unwrap().map().groups,
            lobby.room("orig").unwrap().map().groups
        );
    }

    #[test]
    fn upload_flow() {
        let mut lobby = Lobby::new(MemoryStore::new());
        let create = CreateMap {
            name: "up".to_string(),
            source: MapSource::Upload(UploadMap {}),
        };
        lobby.create_map(ALICE, &create).unwrap();
        assert!(matches!(
            lobby.create_map(BOB, &create),
            Err(LobbyError::Duplicate { .. })
        ));
        assert!(matches!(
            lobby.upload(BOB, "up", &[]),
            Err(LobbyError::NoPendingUpload { .. })
        ));
        assert!(matches!(
            lobby.upload(ALICE, "up", b"garbage"),
            Err(LobbyError::Map(_))
        ));

        let bundle = Map::blank("up", 3, 3).to_bundle().unwrap();
        assert_eq!(
            lobby.upload(ALICE, "up", &bundle).unwrap(),
            Event::UploadComplete
        );
        assert!(lobby.store().exists("up").unwrap());
        assert!(lobby.join(BOB, "up").unwrap());
    }

    #[test]
    fn delete_requires_no_users() {
        let mut lobby = Lobby::new(MemoryStore::new());
        lobby.create_map(ALICE, &blank("busy")).unwrap();
        lobby.join(ALICE, "busy").unwrap();
        assert!(matches!(
            lobby.delete_map("busy"),
            Err(LobbyError::InUse { users: 1, .. })
        ));
        lobby.disconnect(ALICE);
        assert_eq!(lobby.delete_map("busy").unwrap(), "busy");
        assert!(lobby.maps().unwrap().is_empty());
        assert!(matches!(
            lobby.delete_map("busy"),
            Err(LobbyError::Store(StoreError::NotFound { .. }))
        ));
    }

    #[test]
    fn queries_dispatch() {
        let mut lobby = Lobby::new(MemoryStore::new());
        let created = lobby
            .handle_query(ALICE, &QueryRequest::CreateMap(blank("q")))
            .unwrap();
        assert_eq!(created, QueryResponse::CreateMap("q".to_string()));
        assert_eq!(
            lobby
                .handle_query(ALICE, &QueryRequest::Join("q".to_string()))
                .unwrap(),
            QueryResponse::Join(true)
        );
        let QueryResponse::Map(snapshot) = lobby.handle_query(ALICE, &QueryRequest::Map).unwrap()
        else {
            panic!("expected map response");
        };
        assert_eq!(snapshot.seq, crate::types::Seq::default());
        let map = Map::from_bundle("q", &snapshot.bundle, &Limits::default()).unwrap();
        assert_eq!(map.game_dimensions(), Some((10, 5)));
    }

    #[test]
    fn oversized_blank_map_refused() {
        let mut lobby = Lobby::new(MemoryStore::new());
        let big = CreateMap {
            name: "big".to_string(),
            source: MapSource::Blank(BlankMap {
                width: 4200,
                height: 4200,
                default_layers: false,
            }),
        };
        assert!(matches!(
            lobby.create_map(ALICE, &big),
            Err(LobbyError::MapTooLarge {
                width: 4200,
                height: 4200,
                ..
            })
        ));
        assert!(!lobby.store().exists("big").unwrap());
        assert!(!lobby.join(ALICE, "big").unwrap());
    }

    fn small_lobby() -> Lobby<MemoryStore> {
        Lobby::with_limits(
            MemoryStore::new(),
            Limits::for_testing(),
            ApplyEngine::default(),
        )
    }

    fn square(size: u32) -> CreateMap {
        CreateMap {
            name: "sq".to_string(),
            source: MapSource::Blank(BlankMap {
                width: size,
                height: size,
                default_layers: false,
            }),
        }
    }

    #[test]
    fn edits_limited_to_loadable_maps() {
        let mut lobby = small_lobby();
        assert!(matches!(
            lobby.create_map(ALICE, &square(100)),
            Err(LobbyError::MapTooLarge {
                max_bytes: 16384,
                ..
            })
        ));
        lobby.create_map(ALICE, &square(40)).unwrap();
        assert!(lobby.join(ALICE, "sq").unwrap());

        let grow = Event::LayerChange(crate::message::LayerChange {
            group: 0,
            layer: 0,
            width: Some(120),
            ..crate::message::LayerChange::default()
        });
        assert!(matches!(
            lobby.handle_event(ALICE, grow),
            Outcome::Refused { .. }
        ));
        assert_eq!(lobby.handle_event(ALICE, Event::Save), Outcome::Saved);

        lobby.leave(ALICE);
        assert!(lobby.join(ALICE, "sq").unwrap());
        assert_eq!(
            lobby.room("sq").unwrap().map().game_dimensions(),
            Some((40, 40))
        );
    }

    #[test]
    fn unloadable_save_keeps_stored_map() {
        let mut lobby = small_lobby();
        lobby.create_map(ALICE, &square(40)).unwrap();
        assert!(lobby.join(ALICE, "sq").unwrap());

        // Each 40x40 tiles layer fits, but eleven of them overflow the bundle.
        for _ in 0..10 {
            let create = Event::CreateLayer(CreateLayer {
                kind: LayerKind::Tiles,
                group: 0,
                name: None,
            });
            assert!(matches!(
                lobby.handle_event(ALICE, create),
                Outcome::Broadcast { .. }
            ));
        }
        assert!(matches!(
            lobby.handle_event(ALICE, Event::Save),
            Outcome::Refused { .. }
        ));
        assert!(lobby.map_snapshot(ALICE).is_err());

        lobby.leave(ALICE);
        assert!(lobby.join(ALICE, "sq").unwrap());
        assert_eq!(lobby.room("sq").unwrap().map().layer_count(), 1);
    }

    #[test]
    fn events_need_a_room() {
        let mut lobby = Lobby::new(MemoryStore::new());
        assert!(matches!(
            lobby.handle_event(ALICE, Event::Save),
            Outcome::Refused { .. }
        ));
        lobby.create_map(ALICE, &blank("ev")).unwrap();
        assert_eq!(
            lobby.handle_event(ALICE, Event::Join("ev".to_string())),
            Outcome::Dropped
        );
        assert_eq!(lobby.handle_event(ALICE, Event::Save), Outcome::Saved);
    }
}
