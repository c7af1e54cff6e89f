//! JSON envelopes: `{"type": <name>, "content": <payload>}`.
//!
//! Events and queries share one envelope shape. Broadcast events also carry
//! the room's `seq`. Names are matched exactly; an unknown name is
//! [`ProtocolError::UnknownMessage`], and a known name with content of the
//! wrong shape is [`ProtocolError::Malformed`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::message::{
    CreateGroup, CreateLayer, CreateMap, GroupChange, LayerChange, MapInfo, MapSnapshot,
    TileChange, Users,
};
use crate::types::{Seq, Sequenced};

/// Result type for envelope encoding and decoding.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Event names.
pub const EVENT_NAMES: [&str; 9] = [
    "tilechange",
    "groupchange",
    "layerchange",
    "creategroup",
    "createlayer",
    "join",
    "save",
    "refused",
    "uploadcomplete",
];

/// Query names, shared by requests and responses.
pub const QUERY_NAMES: [&str; 6] = ["maps", "join", "map", "users", "createmap", "deletemap"];

/// A one-way message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TileChange(TileChange),
    GroupChange(GroupChange),
    LayerChange(LayerChange),
    CreateGroup(CreateGroup),
    CreateLayer(CreateLayer),
    /// Join the named map without waiting for a response.
    Join(String),
    /// Persist the room's map.
    Save,
    /// A change was rejected; sent to its originator only.
    Refused(String),
    /// An uploaded bundle was accepted.
    UploadComplete,
}

impl Event {
    /// Returns the wire name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TileChange(_) => "tilechange",
            Self::GroupChange(_) => "groupchange",
            Self::LayerChange(_) => "layerchange",
            Self::CreateGroup(_) => "creategroup",
            Self::CreateLayer(_) => "createlayer",
            Self::Join(_) => "join",
            Self::Save => "save",
            Self::Refused(_) => "refused",
            Self::UploadComplete => "uploadcomplete",
        }
    }

    /// Returns `true` for events that edit the map.
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::TileChange(_)
                | Self::GroupChange(_)
                | Self::LayerChange(_)
                | Self::CreateGroup(_)
                | Self::CreateLayer(_)
        )
    }
}

/// A request expecting a response of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRequest {
    Maps,
    Join(String),
    Map,
    Users,
    CreateMap(CreateMap),
    DeleteMap(String),
}

impl QueryRequest {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Maps => "maps",
            Self::Join(_) => "join",
            Self::Map => "map",
            Self::Users => "users",
            Self::CreateMap(_) => "createmap",
            Self::DeleteMap(_) => "deletemap",
        }
    }
}

/// The answer to a [`QueryRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResponse {
    Maps(Vec<MapInfo>),
    /// Whether the join succeeded.
    Join(bool),
    /// The joined map and the room sequence number it reflects.
    Map(MapSnapshot),
    Users(Users),
    /// Name of the created map.
    CreateMap(String),
    /// Name of the deleted map.
    DeleteMap(String),
}

impl QueryResponse {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Maps(_) => "maps",
            Self::Join(_) => "join",
            Self::Map(_) => "map",
            Self::Users(_) => "users",
            Self::CreateMap(_) => "createmap",
            Self::DeleteMap(_) => "deletemap",
        }
    }
}

/// Anything a client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Event(Event),
    Query(QueryRequest),
}

/// Anything a server sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// A sequenced broadcast.
    Broadcast(Sequenced<Event>),
    /// An event addressed to this client only, such as a refusal.
    Event(Event),
    Response(QueryResponse),
}

#[derive(Serialize)]
struct OutEnvelope<'a, T> {
    #[serde(rename = "type")]
    name: &'a str,
    content: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    seq: Option<Seq>,
}

#[derive(Deserialize)]
struct InEnvelope {
    #[serde(rename = "type")]
    name: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    seq: Option<Seq>,
}

/// Wire content of a `map` response: `{"seq": <n>, "data": <base64 bundle>}`.
#[derive(Serialize, Deserialize)]
struct SnapshotContent {
    seq: Seq,
    data: String,
}

fn envelope<T: Serialize>(name: &str, content: &T, seq: Option<Seq>) -> ProtocolResult<String> {
    serde_json::to_string(&OutEnvelope { name, content, seq }).map_err(ProtocolError::Json)
}

fn parse_envelope(text: &str) -> ProtocolResult<InEnvelope> {
    serde_json::from_str(text).map_err(ProtocolError::Json)
}

fn content<T: DeserializeOwned>(name: &'static str, value: Value) -> ProtocolResult<T> {
    serde_json::from_value(value).map_err(|source| ProtocolError::Malformed { name, source })
}

fn unknown(name: &str) -> ProtocolError {
    ProtocolError::UnknownMessage {
        name: name.to_string(),
    }
}

fn encode_event_with(event: &Event, seq: Option<Seq>) -> ProtocolResult<String> {
    let name = event.name();
    match event {
        Event::TileChange(change) => envelope(name, change, seq),
        Event::GroupChange(change) => envelope(name, change, seq),
        Event::LayerChange(change) => envelope(name, change, seq),
        Event::CreateGroup(create) => envelope(name, create, seq),
        Event::CreateLayer(create) => envelope(name, create, seq),
        Event::Join(text) | Event::Refused(text) => envelope(name, text, seq),
        Event::Save | Event::UploadComplete => envelope(name, &(), seq),
    }
}

fn event_from(name: &str, value: Value) -> ProtocolResult<Event> {
    let event = match name {
        "tilechange" => Event::TileChange(content("tilechange", value)?),
        "groupchange" => Event::GroupChange(content("groupchange", value)?),
        "layerchange" => Event::LayerChange(content("layerchange", value)?),
        "creategroup" if value.is_null() => Event::CreateGroup(CreateGroup::default()),
        "creategroup" => Event::CreateGroup(content("creategroup", value)?),
        "createlayer" => Event::CreateLayer(content("createlayer", value)?),
        "join" => Event::Join(content("join", value)?),
        "save" => Event::Save,
        "refused" => Event::Refused(content("refused", value)?),
        "uploadcomplete" => Event::UploadComplete,
        other => return Err(unknown(other)),
    };
    Ok(event)
}

fn request_from(name: &str, value: Value) -> ProtocolResult<QueryRequest> {
    let request = match name {
        "maps" => QueryRequest::Maps,
        "join" => QueryRequest::Join(content("join", value)?),
        "map" => QueryRequest::Map,
        "users" => QueryRequest::Users,
        "createmap" => QueryRequest::CreateMap(content("createmap", value)?),
        "deletemap" => QueryRequest::DeleteMap(content("deletemap", value)?),
        other => return Err(unknown(other)),
    };
    Ok(request)
}

fn response_from(name: &str, value: Value) -> ProtocolResult<QueryResponse> {
    let response = match name {
        "maps" => QueryResponse::Maps(content("maps", value)?),
        "join" => QueryResponse::Join(content("join", value)?),
        "map" => {
            let snapshot: SnapshotContent = content("map", value)?;
            QueryResponse::Map(MapSnapshot {
                seq: snapshot.seq,
                bundle: STANDARD
                    .decode(snapshot.data)
                    .map_err(ProtocolError::Base64)?,
            })
        }
        "users" => QueryResponse::Users(content("users", value)?),
        "createmap" => QueryResponse::CreateMap(content("createmap", value)?),
        "deletemap" => QueryResponse::DeleteMap(content("deletemap", value)?),
        other => return Err(unknown(other)),
    };
    Ok(response)
}

/// Encodes an event without a sequence number.
pub fn encode_event(event: &Event) -> ProtocolResult<String> {
    encode_event_with(event, None)
}

/// Decodes an event envelope, ignoring any sequence number.
pub fn decode_event(text: &str) -> ProtocolResult<Event> {
    let envelope = parse_envelope(text)?;
    event_from(&envelope.name, envelope.content)
}

/// Encodes a broadcast with its sequence number.
pub fn encode_sequenced(broadcast: &Sequenced<Event>) -> ProtocolResult<String> {
    encode_event_with(&broadcast.event, Some(broadcast.seq))
}

/// Decodes a broadcast. A missing `seq` field is malformed.
pub fn decode_sequenced(text: &str) -> ProtocolResult<Sequenced<Event>> {
    let envelope = parse_envelope(text)?;
    let event = event_from(&envelope.name, envelope.content)?;
    let seq = envelope.seq.ok_or_else(|| ProtocolError::Malformed {
        name: event.name(),
        source: serde::de::Error::missing_field("seq"),
    })?;
    Ok(Sequenced { seq, event })
}

pub fn encode_request(request: &QueryRequest) -> ProtocolResult<String> {
    let name = request.name();
    match request {
        QueryRequest::Maps | QueryRequest::Map | QueryRequest::Users => envelope(name, &(), None),
        QueryRequest::Join(map) | QueryRequest::DeleteMap(map) => envelope(name, map, None),
        QueryRequest::CreateMap(create) => envelope(name, create, None),
    }
}

pub fn decode_request(text: &str) -> ProtocolResult<QueryRequest> {
    let envelope = parse_envelope(text)?;
    request_from(&envelope.name, envelope.content)
}

pub fn encode_response(response: &QueryResponse) -> ProtocolResult<String> {
    let name = response.name();
    match response {
        QueryResponse::Maps(maps) => envelope(name, maps, None),
        QueryResponse::Join(joined) => envelope(name, joined, None),
        QueryResponse::Map(snapshot) => {
            let content = SnapshotContent {
                seq: snapshot.seq,
                data: STANDARD.encode(&snapshot.bundle),
            };
            envelope(name, &content, None)
        }
        QueryResponse::Users(users) => envelope(name, users, None),
        QueryResponse::CreateMap(map) | QueryResponse::DeleteMap(map) => {
            envelope(name, map, None)
        }
    }
}

pub fn decode_response(text: &str) -> ProtocolResult<QueryResponse> {
    let envelope = parse_envelope(text)?;
    response_from(&envelope.name, envelope.content)
}

/// Encodes anything a client sends.
pub fn encode_client_message(message: &ClientMessage) -> ProtocolResult<String> {
    match message {
        ClientMessage::Event(event) => encode_event(event),
        ClientMessage::Query(request) => encode_request(request),
    }
}

/// Decodes anything a client sends.
///
/// Names shared by a query and an event (`join`) decode as the query.
pub fn decode_client_message(text: &str) -> ProtocolResult<ClientMessage> {
    let envelope = parse_envelope(text)?;
    if QUERY_NAMES.contains(&envelope.name.as_str()) {
        return request_from(&envelope.name, envelope.content).map(ClientMessage::Query);
    }
    event_from(&envelope.name, envelope.content).map(ClientMessage::Event)
}

/// Encodes anything a server sends.
pub fn encode_server_message(message: &ServerMessage) -> ProtocolResult<String> {
    match message {
        ServerMessage::Broadcast(broadcast) => encode_sequenced(broadcast),
        ServerMessage::Event(event) => encode_event(event),
        ServerMessage::Response(response) => encode_response(response),
    }
}

/// Decodes anything a server sends.
///
/// Envelopes with a `seq` are broadcasts. Otherwise query names decode as
/// responses first and fall back to events when the name is shared and the
/// content does not fit the response.
pub fn decode_server_message(text: &str) -> ProtocolResult<ServerMessage> {
    let envelope = parse_envelope(text)?;
    if let Some(seq) = envelope.seq {
        let event = event_from(&envelope.name, envelope.content)?;
        return Ok(ServerMessage::Broadcast(Sequenced { seq, event }));
    }
    let name = envelope.name.as_str();
    if QUERY_NAMES.contains(&name) {
        match response_from(name, envelope.content.clone()) {
            Ok(response) => return Ok(ServerMessage::Response(response)),
            Err(err) if !EVENT_NAMES.contains(&name) => return Err(err),
            Err(_) => {}
        }
    }
    event_from(name, envelope.content).map(ServerMessage::Event)
}
