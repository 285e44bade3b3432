//! Per-floor visibility and style instructions for displaying a floor,
//! optionally with a route drawn on it.
//!
//! Floors above the display floor are hidden. Floors below it are dimmed,
//! more transparent the further down they are. The display floor is shown in
//! full. Walkable lines are hidden unless a route runs over them, in which
//! case route lines are highlighted and the floor's other lines are muted.
//! Intersection markers are never shown.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::extract::{find_element, parse_document, OFFICES_GROUP};
use crate::graph::{Graph, RoomKind};
use crate::ids::map_label;
use crate::routing::Route;
use crate::svg_edit::{escape_attribute, escape_text, SvgEdits};

/// Id of the `<style>` element added by [`apply_to_svg`].
pub const STYLE_ELEMENT_ID: &str = "wayfinder-route";

/// Suffix of the per-floor group holding room labels.
pub const LABELS_GROUP: &str = "Labels";

/// Attribute tying a label to the room it names.
pub const LABEL_ROOM_ATTRIBUTE: &str = "data-room-id";

/// Presentation knobs. The dimming constants are empirical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Opacity of the lowest floor when dimmed.
    pub dim_base: f64,
    /// Opacity added as a dimmed floor gets closer to the display floor.
    pub dim_span: f64,
    pub accent_stroke: String,
    pub accent_width: f64,
    pub muted_stroke: String,
    pub label_font_size: f64,
    pub label_fill: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dim_base: 0.6,
            dim_span: 0.3,
            accent_stroke: "#70B62C".to_string(),
            accent_width: 3.0,
            muted_stroke: "#C9E6FA".to_string(),
            label_font_size: 14.0,
            label_fill: "#000000".to_string(),
        }
    }
}

impl RenderOptions {
    /// Opacity for a floor at `index` below a display floor at `display_index`.
    pub fn dimmed_opacity(&self, index: usize, display_index: usize) -> f64 {
        if display_index == 0 {
            return 1.0;
        }
        self.dim_base + (index as f64 / display_index as f64) * self.dim_span
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorVisibility {
    Visible,
    Dimmed,
    Hidden,
}

/// Style instructions for one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorStyle {
    pub floor_id: String,
    pub visibility: FloorVisibility,
    pub opacity: f64,
    /// Groups the floor-level visibility and opacity apply to.
    pub group_ids: Vec<String>,
    pub hidden_group_ids: Vec<String>,
    /// Lines group to show when route lines are drawn on this floor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_group: Option<String>,
    pub hidden_line_ids: Vec<String>,
    pub highlighted_line_ids: Vec<String>,
    pub muted_line_ids: Vec<String>,
}

/// Style instructions for every floor, bottom to top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorStyles {
    pub display_floor: String,
    pub floors: Vec<FloorStyle>,
}

impl FloorStyles {
    pub fn floor(&self, id: &str) -> Option<&FloorStyle> {
        self.floors.iter().find(|style| style.floor_id == id)
    }
}

/// Compute the style instructions for `display_floor`, with or without a route.
pub fn render(
    graph: &Graph,
    route: Option<&Route>,
    display_floor: &str,
    options: &RenderOptions,
) -> Result<FloorStyles> {
    let display = graph.floor(display_floor).ok_or_else(|| Error::UnknownFloor {
        floor: display_floor.to_string(),
    })?;
    let display_index = display.index;

    // floor index -> route line ids in route order, without repeats
    let mut route_lines: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    if let Some(route) = route {
        let mut seen = HashSet::new();
        for line_id in &route.line_ids {
            if !seen.insert(line_id.as_str()) {
                continue;
            }
            match graph.floor_of_line(line_id) {
                Some(floor) => route_lines
                    .entry(floor.index)
                    .or_default()
                    .push(line_id.clone()),
                None => debug!(line_id = %line_id, "route line not drawn on any floor"),
            }
        }
    }

    let floors = graph
        .floors()
        .iter()
        .map(|floor| {
            let (visibility, opacity) = if floor.index > display_index {
                (FloorVisibility::Hidden, 0.0)
            } else if floor.index < display_index {
                (
                    FloorVisibility::Dimmed,
                    options.dimmed_opacity(floor.index, display_index),
                )
            } else {
                (FloorVisibility::Visible, 1.0)
            };

            let mut hidden_group_ids: Vec<String> =
                floor.intersections_group.iter().cloned().collect();
            let highlighted = match route_lines.get(&floor.index) {
                Some(lines) if visibility != FloorVisibility::Hidden => lines.clone(),
                _ => Vec::new(),
            };

            let (hidden_line_ids, muted_line_ids) = if highlighted.is_empty() {
                hidden_group_ids.extend(floor.lines_group.iter().cloned());
                (floor.line_ids.clone(), Vec::new())
            } else {
                let muted = floor
                    .line_ids
                    .iter()
                    .filter(|line| !highlighted.contains(line))
                    .cloned()
                    .collect();
                (Vec::new(), muted)
            };

            FloorStyle {
                floor_id: floor.id.clone(),
                visibility,
                opacity,
                group_ids: floor.group_ids.clone(),
                hidden_group_ids,
                lines_group: floor.lines_group.clone(),
                hidden_line_ids,
                highlighted_line_ids: highlighted,
                muted_line_ids,
            }
        })
        .collect();

    Ok(FloorStyles {
        display_floor: display_floor.to_string(),
        floors,
    })
}

/// Produce the display document: `svg` with a generated `<style>` element
/// carrying `styles`. The source geometry is left untouched.
pub fn apply_to_svg(svg: &str, styles: &FloorStyles, options: &RenderOptions) -> Result<String> {
    let doc = parse_document(svg)?;
    let css = stylesheet(styles, options);

    let mut edits = SvgEdits::new();
    edits.append_child(
        svg,
        doc.root_element(),
        &format!("<style id=\"{STYLE_ELEMENT_ID}\" type=\"text/css\"><![CDATA[\n{css}]]></style>"),
    );
    Ok(edits.apply(svg))
}

/// Add a centred text label to every office, collected per floor in a
/// `<floor>_Labels` group inside the floor's offices group.
///
/// Offices that already have a label (a `<text>` carrying
/// `data-room-id`) in that group are skipped, so applying this twice adds
/// nothing the second time.
pub fn add_room_labels(svg: &str, graph: &Graph, options: &RenderOptions) -> Result<String> {
    let doc = parse_document(svg)?;
    let mut edits = SvgEdits::new();
    let mut added = 0usize;

    for floor in graph.floors() {
        let Some(offices) = find_element(&doc, &format!("{}_{OFFICES_GROUP}", floor.id)) else {
            debug!(floor = %floor.id, "no offices group, floor left unlabelled");
            continue;
        };
        let labels_id = format!("{}_{LABELS_GROUP}", floor.id);
        let existing = find_element(&doc, &labels_id);
        let labelled: HashSet<&str> = existing
            .map(|group| {
                group
                    .descendants()
                    .filter(|n| n.has_tag_name("text"))
                    .filter_map(|n| n.attribute(LABEL_ROOM_ATTRIBUTE))
                    .collect()
            })
            .unwrap_or_default();

        let mut texts = String::new();
        for room in graph
            .rooms()
            .iter()
            .filter(|room| room.floor == floor.id && matches!(room.kind, RoomKind::Office))
        {
            if labelled.contains(room.id.as_str()) {
                continue;
            }
            let center = room.bounds.center();
            let _ = write!(
                texts,
                "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\" \
                 font-size=\"{}\" fill=\"{}\" {LABEL_ROOM_ATTRIBUTE}=\"{}\">{}</text>",
                center.x,
                center.y,
                options.label_font_size,
                escape_attribute(&options.label_fill),
                escape_attribute(&room.id),
                escape_text(&map_label(&room.floor, &room.id)),
            );
            added += 1;
        }
        if texts.is_empty() {
            continue;
        }

        match existing {
            Some(group) => edits.append_child(svg, group, &texts),
            None => edits.append_child(
                svg,
                offices,
                &format!("<g id=\"{}\">{texts}</g>", escape_attribute(&labels_id)),
            ),
        }
    }

    debug!(labels = added, "added room labels");
    Ok(edits.apply(svg))
}

fn stylesheet(styles: &FloorStyles, options: &RenderOptions) -> String {
    let mut css = String::new();
    for floor in &styles.floors {
        let floor_rule = match floor.visibility {
            FloorVisibility::Hidden => "display:none !important".to_string(),
            FloorVisibility::Dimmed => format!("opacity:{:.2} !important", floor.opacity),
            FloorVisibility::Visible => "display:inline !important;opacity:1 !important".to_string(),
        };
        push_rule(&mut css, &floor.group_ids, &floor_rule);
        push_rule(&mut css, &floor.hidden_group_ids, "display:none !important");
        push_rule(&mut css, &floor.hidden_line_ids, "display:none !important");

        if !floor.highlighted_line_ids.is_empty() {
            push_rule(
                &mut css,
                floor.lines_group.as_slice(),
                "display:inline !important",
            );
            push_rule(
                &mut css,
                &floor.highlighted_line_ids,
                &format!(
                    "stroke:{} !important;stroke-width:{} !important;display:inline !important",
                    options.accent_stroke, options.accent_width
                ),
            );
            push_rule(
                &mut css,
                &floor.muted_line_ids,
                &format!(
                    "stroke:{} !important;display:inline !important",
                    options.muted_stroke
                ),
            );
        }
    }
    css
}

fn push_rule(css: &mut String, ids: &[String], declarations: &str) {
    if ids.is_empty() {
        return;
    }
    let selectors: Vec<String> = ids
        .iter()
        .map(|id| format!("[id=\"{}\"]", escape_selector(id)))
        .collect();
    let _ = writeln!(css, "{} {{ {declarations} }}", selectors.join(", "));
}

fn escape_selector(id: &str) -> String {
    let mut escaped = String::with_capacity(id.len());
    for ch in id.chars() {
        match ch {
            '\\' | '"' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            // keeps `]]>` out of the CDATA section
            '>' => escaped.push_str("\\3e "),
            _ => escaped.push(ch),
        }
    }
    escaped
}
