//! Collaborative editing protocol for mapsync.
//!
//! Peers exchange JSON envelopes with a server. Edits are applied by the
//! [`ApplyEngine`] against a room's authoritative [`model::Map`]; every edit
//! that changed the map is stamped with the next [`Seq`] and broadcast to
//! every peer of the room. Editors keep a [`Replica`] that applies tile edits
//! optimistically and follows the broadcasts in sequence order.
//!
//! # Example
//!
//! ```
//! use codec::{Tile, TileValue};
//! use model::Map;
//! use protocol::{apply_tile_change, TileChange};
//!
//! let mut map = Map::blank("demo", 4, 4);
//! let change = TileChange::new(0, 0, 1, 2, TileValue::Game(Tile { id: 1, flags: 0 }));
//! assert!(apply_tile_change(&mut map, &change).unwrap());
//! assert!(!apply_tile_change(&mut map, &change).unwrap());
//! ```

mod apply;
mod envelope;
mod error;
mod limits;
mod lobby;
mod message;
mod replica;
mod room;
mod store;
mod types;

pub use apply::{
    apply_create_group, apply_create_layer, apply_event, apply_group_change, apply_layer_change,
    apply_tile_change, ApplyEngine,
};
pub use envelope::{
    decode_client_message, decode_event, decode_request, decode_response, decode_sequenced,
    decode_server_message, encode_client_message, encode_event, encode_request, encode_response,
    encode_sequenced, encode_server_message, ClientMessage, Event, ProtocolResult, QueryRequest,
    QueryResponse, ServerMessage, EVENT_NAMES, QUERY_NAMES,
};
pub use error::{
    ApplyError, ApplyResult, LobbyError, LobbyResult, NameError, ProtocolError, ReplicaError,
    StoreError, StoreResult,
};
pub use limits::EditLimits;
pub use lobby::Lobby;
pub use message::{
    BlankMap, CloneMap, CreateGroup, CreateLayer, CreateMap, GroupChange, LayerChange, LayerOrder,
    MapInfo, MapSnapshot, MapSource, TileChange, UploadMap, Users,
};
pub use replica::Replica;
pub use room::{Outcome, Room};
pub use store::{validate_map_name, DirStore, MapStore, MemoryStore, MAP_EXTENSION, MAX_MAP_NAME_LEN};
pub use types::{PeerId, Seq, Sequenced};
