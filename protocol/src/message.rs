//! Change and registry messages, with their JSON field names.

use codec::{decode_value, encode_value, CodecResult, TileKind, TileValue};
use container::{Color, LayerKind};
use serde::{Deserialize, Serialize};

use crate::types::Seq;

/// Sets one cell of a tile-bearing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileChange {
    pub group: u32,
    pub layer: u32,
    pub x: u32,
    pub y: u32,
    pub kind: TileKind,
    /// Base64 transport of exactly one cell of `kind`.
    pub data: String,
}

impl TileChange {
    /// Creates a change writing `value` at `(x, y)`.
    #[must_use]
    pub fn new(group: u32, layer: u32, x: u32, y: u32, value: TileValue) -> Self {
        Self {
            group,
            layer,
            x,
            y,
            kind: value.kind(),
            data: encode_value(value),
        }
    }

    /// Decodes the carried cell.
    pub fn value(&self) -> CodecResult<TileValue> {
        decode_value(self.kind, &self.data)
    }
}

/// Edits group attributes. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupChange {
    pub group: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub para_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub para_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub delete: bool,
}

/// Target of a layer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerOrder {
    /// Move to the end of another group.
    Group(u32),
    /// Move to another position in the same group.
    Layer(u32),
}

/// Edits layer attributes. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerChange {
    pub group: u32,
    pub layer: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<LayerOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub delete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Appends a new layer to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLayer {
    pub kind: LayerKind,
    pub group: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Registers a new map in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMap {
    pub name: String,
    #[serde(flatten)]
    pub source: MapSource,
}

/// Where the content of a new map comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapSource {
    Blank(BlankMap),
    Clone(CloneMap),
    Upload(UploadMap),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankMap {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub default_layers: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneMap {
    pub clone: String,
}

/// The bundle arrives later through an upload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UploadMap {}

/// A map listed by the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    pub name: String,
    pub users: u32,
}

/// A room's map as of broadcast `seq`.
///
/// A replica built from a snapshot expects broadcast `seq + 1` next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSnapshot {
    pub seq: Seq,
    pub bundle: Vec<u8>,
}

/// Peer count of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Users {
    pub count: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::TeleTile;
    use serde_json::json;

    #[test]
    fn tile_change_carries_base64_cell() {
        let change = TileChange::new(0, 2, 3, 4, TileValue::Tele(TeleTile { number: 3, id: 7 }));
        assert_eq!(
            serde_json::to_value(&change).unwrap(),
            json!({"group": 0, "layer": 2, "x": 3, "y": 4, "kind": "tele", "data": "Awc="})
        );
        assert_eq!(
            change.value().unwrap(),
            TileValue::Tele(TeleTile { number: 3, id: 7 })
        );
    }

    #[test]
    fn group_change_uses_camel_case() {
        let change: GroupChange =
            serde_json::from_value(json!({"group": 1, "offX": -32, "paraY": 50})).unwrap();
        assert_eq!(change.off_x, Some(-32));
        assert_eq!(change.para_y, Some(50));
        assert_eq!(change.name, None);
        assert!(!change.delete);
    }

    #[test]
    fn group_change_serializes_only_present_fields() {
        let change = GroupChange {
            group: 1,
            name: Some("Foo".to_string()),
            ..GroupChange::default()
        };
        assert_eq!(
            serde_json::to_value(&change).unwrap(),
            json!({"group": 1, "name": "Foo"})
        );
    }

    #[test]
    fn layer_order_shapes() {
        let change: LayerChange =
            serde_json::from_value(json!({"group": 0, "layer": 1, "order": {"group": 2}}))
                .unwrap();
        assert_eq!(change.order, Some(LayerOrder::Group(2)));
        let change: LayerChange =
            serde_json::from_value(json!({"group": 0, "layer": 1, "order": {"layer": 0}}))
                .unwrap();
        assert_eq!(change.order, Some(LayerOrder::Layer(0)));
    }

    #[test]
    fn layer_change_color() {
        let change: LayerChange = serde_json::from_value(
            json!({"group": 0, "layer": 0, "color": {"r": 1, "g": 2, "b": 3, "a": 4}}),
        )
        .unwrap();
        assert_eq!(change.color, Some(Color::new(1, 2, 3, 4)));
    }

    #[test]
    fn create_map_sources() {
        let blank: CreateMap = serde_json::from_value(json!({
            "name": "new",
            "blank": {"width": 100, "height": 50, "defaultLayers": true}
        }))
        .unwrap();
        assert_eq!(
            blank.source,
            MapSource::Blank(BlankMap {
                width: 100,
                height: 50,
                default_layers: true
            })
        );

        let clone: CreateMap =
            serde_json::from_value(json!({"name": "copy", "clone": {"clone": "new"}})).unwrap();
        assert_eq!(
            clone.source,
            MapSource::Clone(CloneMap {
                clone: "new".to_string()
            })
        );

        let upload: CreateMap =
            serde_json::from_value(json!({"name": "up", "upload": {}})).unwrap();
        assert_eq!(upload.source, MapSource::Upload(UploadMap {}));
    }

    #[test]
    fn create_layer_kind_names() {
        let create: CreateLayer =
            serde_json::from_value(json!({"kind": "tiles", "group": 1})).unwrap();
        assert_eq!(create.kind, LayerKind::Tiles);
        assert!(serde_json::from_value::<CreateLayer>(json!({"kind": "sounds", "group": 1}))
            .is_err());
    }
}
