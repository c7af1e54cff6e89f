//! Inspection and debugging tools for mapsync bundles and messages.
//!
//! - Summarize a bundle: record counts, groups, layers and their sizes
//! - Decode base64 tile payloads into typed cells
//! - Replay a script of change events against a map

use anyhow::{Context, Result};
use codec::{decode_transport, TileKind, TileValue};
use container::{decode_table, Limits};
use model::{Layer, Map};
use protocol::{decode_event, ApplyEngine, MemoryStore, Outcome, PeerId, Room};
use serde::Serialize;

/// Summary of one bundle.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub bundle_bytes: usize,
    pub records: RecordCounts,
    pub groups: Vec<GroupSummary>,
    pub images: Vec<ImageSummary>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RecordCounts {
    pub groups: usize,
    pub layers: usize,
    pub images: usize,
    pub data: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub physics: bool,
    pub offset: (i32, i32),
    pub parallax: (i32, i32),
    pub layers: Vec<LayerSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerSummary {
    pub kind: container::LayerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<(usize, usize)>,
    /// Non-empty cells, or quads for quads layers.
    pub used: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub external: bool,
}

/// Validates a bundle and summarizes its contents.
pub fn inspect_bundle(name: &str, bytes: &[u8], limits: &Limits) -> Result<InspectReport> {
    let table = decode_table(bytes, limits).context("decode record table")?;
    let records = RecordCounts {
        groups: table.group_count(),
        layers: table.layer_count(),
        images: table.image_count(),
        data: table.data_count(),
    };
    let map = Map::from_bundle(name, bytes, limits).context("load map")?;
    Ok(InspectReport {
        bundle_bytes: bytes.len(),
        records,
        groups: map
            .groups
            .iter()
            .map(|group| GroupSummary {
                name: group.name.clone(),
                physics: group.is_physics_group(),
                offset: (group.offset_x, group.offset_y),
                parallax: (group.parallax_x, group.parallax_y),
                layers: group.layers.iter().map(summarize_layer).collect(),
            })
            .collect(),
        images: map
            .images
            .iter()
            .map(|image| ImageSummary {
                name: image.name.clone(),
                width: image.width,
                height: image.height,
                external: image.is_external(),
            })
            .collect(),
    })
}

fn summarize_layer(layer: &Layer) -> LayerSummary {
    let used = match layer {
        Layer::Quads(quads) => quads.quads.len(),
        _ => used_cells(layer),
    };
    LayerSummary {
        kind: layer.kind(),
        name: layer.name().map(str::to_string),
        size: layer.dimensions(),
        used,
    }
}

fn used_cells(layer: &Layer) -> usize {
    let Some((width, height)) = layer.dimensions() else {
        return 0;
    };
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .filter(|&(x, y)| layer.cell(x, y).is_some_and(|cell| cell.id() != 0))
        .count()
}

/// Renders a report for terminals.
pub fn format_inspect_pretty(report: &InspectReport) -> String {
    let mut out = String::new();
    let records = report.records;
    out.push_str(&format!(
        "bundle: {} bytes, {} groups, {} layers, {} images, {} data blobs\n",
        report.bundle_bytes, records.groups, records.layers, records.images, records.data
    ));
    for (g, group) in report.groups.iter().enumerate() {
        let physics = if group.physics { " [physics]" } else { "" };
        out.push_str(&format!(
            "group {g} {:?}{physics}: offset {:?} parallax {:?}\n",
            group.name, group.offset, group.parallax
        ));
        for (l, layer) in group.layers.iter().enumerate() {
            let name = layer.name.as_deref().unwrap_or("-");
            let size = layer
                .size
                .map_or_else(String::new, |(w, h)| format!(" {w}x{h}"));
            out.push_str(&format!(
                "  layer {l} {} {name:?}{size}: {} used\n",
                layer.kind, layer.used
            ));
        }
    }
    for (i, image) in report.images.iter().enumerate() {
        let source = if image.external { "external" } else { "embedded" };
        out.push_str(&format!(
            "image {i} {:?} {}x{} ({source})\n",
            image.name, image.width, image.height
        ));
    }
    out
}

/// Decodes a base64 tile payload of `kind`.
pub fn decode_tiles(kind: &str, data: &str) -> Result<Vec<TileValue>> {
    let kind: TileKind = kind.parse().context("parse tile kind")?;
    let cells = decode_transport(kind, data.trim()).context("decode tile payload")?;
    Ok(cells.iter().collect())
}

/// Counts of what a replayed script did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub dropped: usize,
    pub refused: usize,
    pub saved: usize,
}

/// Replays newline-separated event envelopes against `map`.
///
/// Blank lines and lines starting with `#` are skipped. Refused events are
/// counted; malformed lines are errors.
pub fn replay_script(map: Map, script: &str) -> Result<(Map, ReplayReport)> {
    let peer = PeerId::new(1);
    let mut room = Room::new(map.name.clone(), map, ApplyEngine::default());
    room.add_peer(peer);
    let mut store = MemoryStore::new();
    let mut report = ReplayReport::default();

    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = decode_event(line).with_context(|| format!("line {}", number + 1))?;
        match room.handle_event(peer, event, &mut store) {
            Outcome::Broadcast { .. } => report.applied += 1,
            Outcome::Dropped => report.dropped += 1,
            Outcome::Refused { reason, .. } => {
                log::warn!("line {}: {reason}", number + 1);
                report.refused += 1;
            }
            Outcome::Saved => report.saved += 1,
        }
    }
    Ok((room.map().clone(), report))
}
