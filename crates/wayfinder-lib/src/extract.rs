//! Geometry extraction from SVG floor plans.
//!
//! Each floor `F` is described by a handful of groups, looked up anywhere in
//! the document by id:
//!
//! - `F_Offices`: `<rect>` rooms
//! - `F_Stairs`: one `<g>` (or bare `<rect>`) per stairwell
//! - `F_Doors`: `<rect>` doors with structured ids
//! - `F_Intersections`: `<circle>`/`<ellipse>` or `<rect>` junction markers
//! - `F_AllowedLines`: `<line>` walkable segments
//!
//! `F_Doors` and `F_AllowedLines` are required; the others may be absent.

use std::collections::{HashMap, HashSet};

use roxmltree::{Document, Node as XmlNode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::BuildOptions;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::graph::{Node, NodeKind, Room, RoomKind};
use crate::ids::{self, DoorTarget, ObjectId};
use crate::svg_edit::SvgEdits;

pub const OFFICES_GROUP: &str = "Offices";
pub const STAIRS_GROUP: &str = "Stairs";
pub const DOORS_GROUP: &str = "Doors";
pub const INTERSECTIONS_GROUP: &str = "Intersections";
pub const LINES_GROUP: &str = "AllowedLines";

/// Layer name attribute written by drawing editors, dropped on rewrite.
const DATA_NAME_ATTRIBUTE: &str = "data-name";

/// A walkable line as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

/// Typed primitives of a single floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorExtraction {
    pub floor: String,
    pub rooms: Vec<Room>,
    pub stairwells: Vec<Room>,
    pub doors: Vec<Node>,
    pub intersections: Vec<Node>,
    pub segments: Vec<Segment>,
    /// Ids of the groups that carry the floor's visible drawing.
    pub group_ids: Vec<String>,
    pub lines_group: Option<String>,
    pub intersections_group: Option<String>,
}

/// Parse `svg` and extract every requested floor, lowest first.
///
/// When `options.floors` is `None` floors are discovered from the document
/// (see [`discover_floors`]). A requested floor missing a required group
/// fails the whole plan; a discovered one is skipped with a warning.
pub fn extract_plan(svg: &str, options: &BuildOptions) -> Result<Vec<FloorExtraction>> {
    let doc = parse_document(svg)?;

    if let Some(floors) = &options.floors {
        return floors
            .iter()
            .map(|floor| extract_floor(&doc, floor))
            .collect();
    }

    let found = discover_floors(&doc);
    debug!(floors = ?found, "discovered floors");
    let mut extracted = Vec::with_capacity(found.len());
    for floor in &found {
        match extract_floor(&doc, floor) {
            Ok(extraction) => extracted.push(extraction),
            Err(Error::MalformedGeometry { reason, .. }) => {
                warn!(floor = %floor, %reason, "discovered floor is incomplete, skipped");
            }
            Err(e) => return Err(e),
        }
    }

    if extracted.is_empty() {
        return Err(Error::FloorPlanParse {
            message: format!("no complete floor found (looked for `<floor>_{LINES_GROUP}` groups)"),
        });
    }
    Ok(extracted)
}

pub(crate) fn parse_document(svg: &str) -> Result<Document<'_>> {
    Document::parse(svg).map_err(|e| Error::FloorPlanParse {
        message: e.to_string(),
    })
}

/// Floor keys of every element whose id ends with `_AllowedLines`, in
/// document order.
pub fn discover_floors(doc: &Document<'_>) -> Vec<String> {
    let suffix = format!("_{LINES_GROUP}");
    let mut floors = Vec::new();
    for node in doc.descendants().filter(XmlNode::is_element) {
        if let Some(floor) = node.attribute("id").and_then(|id| id.strip_suffix(&suffix)) {
            if !floor.is_empty() && !floors.iter().any(|f| f == floor) {
                floors.push(floor.to_string());
            }
        }
    }
    floors
}

/// Extract the primitives of one floor.
pub fn extract_floor(doc: &Document<'_>, floor: &str) -> Result<FloorExtraction> {
    let doors_group = find_group(doc, floor, DOORS_GROUP)
        .ok_or_else(|| Error::malformed(floor, format!("missing group {floor}_{DOORS_GROUP}")))?;
    let lines_group = find_group(doc, floor, LINES_GROUP)
        .ok_or_else(|| Error::malformed(floor, format!("missing group {floor}_{LINES_GROUP}")))?;
    let offices_group = find_group(doc, floor, OFFICES_GROUP);
    let stairs_group = find_group(doc, floor, STAIRS_GROUP);
    let intersections_group = find_group(doc, floor, INTERSECTIONS_GROUP);

    let mut rooms = match offices_group {
        Some(group) => extract_offices(group, floor),
        None => {
            debug!(floor, "no offices group");
            Vec::new()
        }
    };
    let mut stairwells = match stairs_group {
        Some(group) => extract_stairwells(group, floor),
        None => {
            debug!(floor, "no stairs group");
            Vec::new()
        }
    };

    let mut seen = HashSet::new();
    let doors = extract_doors(doors_group, floor, &mut rooms, &mut stairwells, &mut seen);
    let intersections = intersections_group
        .map(|group| extract_intersections(group, floor, &mut seen))
        .unwrap_or_default();
    let segments = extract_segments(lines_group, floor);

    let group_ids = if find_element(doc, floor).is_some() {
        vec![floor.to_string()]
    } else {
        [offices_group, stairs_group, Some(doors_group)]
            .into_iter()
            .flatten()
            .filter_map(|group| group.attribute("id").map(str::to_string))
            .collect()
    };

    debug!(
        floor,
        rooms = rooms.len(),
        stairwells = stairwells.len(),
        doors = doors.len(),
        intersections = intersections.len(),
        segments = segments.len(),
        "extracted floor"
    );

    Ok(FloorExtraction {
        floor: floor.to_string(),
        rooms,
        stairwells,
        doors,
        intersections,
        segments,
        group_ids,
        lines_group: lines_group.attribute("id").map(str::to_string),
        intersections_group: intersections_group
            .and_then(|group| group.attribute("id"))
            .map(str::to_string),
    })
}

fn extract_offices(group: XmlNode<'_, '_>, floor: &str) -> Vec<Room> {
    let mut rooms = Vec::new();
    for rect in group.descendants().filter(|n| n.has_tag_name("rect")) {
        let Some(id) = rect.attribute("id") else {
            continue;
        };
        let Some(bounds) = read_rect(rect, floor) else {
            continue;
        };
        rooms.push(Room {
            id: id.to_string(),
            floor: floor.to_string(),
            kind: RoomKind::Office,
            bounds,
            doors: Vec::new(),
        });
    }
    rooms
}

fn extract_stairwells(group: XmlNode<'_, '_>, floor: &str) -> Vec<Room> {
    let mut stairwells = Vec::new();
    for child in group.children().filter(XmlNode::is_element) {
        let Some(raw_id) = child.attribute("id") else {
            warn!(floor, "stairwell without id skipped");
            continue;
        };
        let key = ObjectId::parse(floor, raw_id)
            .filter(|id| id.kind == ids::STAIRS)
            .and_then(|id| id.number().map(str::to_string));
        let Some(key) = key else {
            warn!(floor, id = raw_id, "stairwell id is not structured, skipped");
            continue;
        };

        let bounds = if child.has_tag_name("rect") {
            read_rect(child, floor)
        } else {
            child
                .descendants()
                .filter(|n| n.has_tag_name("rect"))
                .filter_map(|rect| read_rect(rect, floor))
                .reduce(|acc, rect| acc.union(&rect))
        };
        let Some(bounds) = bounds else {
            warn!(floor, id = raw_id, "stairwell has no valid rectangles, skipped");
            continue;
        };

        stairwells.push(Room {
            id: DoorTarget::Stairs(key.clone()).room_id(floor),
            floor: floor.to_string(),
            kind: RoomKind::Stairwell { key },
            bounds,
            doors: Vec::new(),
        });
    }
    stairwells
}

fn extract_doors(
    group: XmlNode<'_, '_>,
    floor: &str,
    rooms: &mut [Room],
    stairwells: &mut [Room],
    seen: &mut HashSet<String>,
) -> Vec<Node> {
    let mut owners: HashMap<String, (bool, usize)> = HashMap::new();
    for (index, room) in rooms.iter().enumerate() {
        owners.insert(room.id.clone(), (false, index));
    }
    for (index, stairwell) in stairwells.iter().enumerate() {
        owners.insert(stairwell.id.clone(), (true, index));
    }

    let mut doors = Vec::new();
    for rect in group.descendants().filter(|n| n.has_tag_name("rect")) {
        let Some(id) = rect.attribute("id") else {
            warn!(floor, "door without id skipped");
            continue;
        };
        let room_id = ObjectId::parse(floor, id)
            .filter(|parsed| parsed.kind == ids::DOOR)
            .and_then(|parsed| DoorTarget::parse(&parsed.detail))
            .map(|target| target.room_id(floor));
        let Some((is_stairwell, owner)) = room_id.as_ref().and_then(|r| owners.get(r)).copied()
        else {
            warn!(floor, door = id, room = ?room_id, "door does not reference a known room, excluded");
            continue;
        };
        let Some(bounds) = read_rect(rect, floor) else {
            continue;
        };
        if !seen.insert(id.to_string()) {
            warn!(floor, door = id, "duplicate node id on floor, skipped");
            continue;
        }

        let room = if is_stairwell {
            &mut stairwells[owner]
        } else {
            &mut rooms[owner]
        };
        room.doors.push(id.to_string());
        doors.push(Node {
            id: id.to_string(),
            floor: floor.to_string(),
            kind: NodeKind::Door,
            position: bounds.center(),
            room: Some(room.id.clone()),
        });
    }
    doors
}

fn extract_intersections(
    group: XmlNode<'_, '_>,
    floor: &str,
    seen: &mut HashSet<String>,
) -> Vec<Node> {
    let mut intersections = Vec::new();
    for (index, marker) in group.descendants().filter(is_marker).enumerate() {
        let position = if marker.has_tag_name("rect") {
            read_rect(marker, floor).map(|rect| rect.center())
        } else {
            read_point(marker, floor, "cx", "cy")
        };
        let Some(position) = position else {
            continue;
        };
        let id = marker
            .attribute("id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("{floor}_{INTERSECTIONS_GROUP}_{index}"));
        if !seen.insert(id.clone()) {
            warn!(floor, node = %id, "duplicate node id on floor, skipped");
            continue;
        }
        intersections.push(Node {
            id,
            floor: floor.to_string(),
            kind: NodeKind::Intersection,
            position,
            room: None,
        });
    }
    intersections
}

fn is_marker(node: &XmlNode<'_, '_>) -> bool {
    node.has_tag_name("circle") || node.has_tag_name("ellipse") || node.has_tag_name("rect")
}

fn extract_segments(group: XmlNode<'_, '_>, floor: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (index, line) in group
        .descendants()
        .filter(|n| n.has_tag_name("line"))
        .enumerate()
    {
        let Some(start) = read_point(line, floor, "x1", "y1") else {
            continue;
        };
        let Some(end) = read_point(line, floor, "x2", "y2") else {
            continue;
        };
        let id = line
            .attribute("id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("{floor}_{LINES_GROUP}_{index}"));
        segments.push(Segment { id, start, end });
    }
    segments
}

/// Outcome of assigning a structured id to one drawn door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorAssignment {
    /// Id the door carried in the drawing, if any.
    pub previous_id: Option<String>,
    pub new_id: String,
    /// Room or stairwell the door was attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

/// Derive structured ids for the raw doors of `floor` by rectangle overlap.
///
/// A door is attached to the first office, then the first stairwell, whose
/// rectangle expanded by `threshold` overlaps the door's rectangle. Doors are
/// numbered per room in drawing order; doors touching nothing are numbered
/// as unassigned. Doors without any id keep their drawing position as number.
pub fn assign_door_ids(svg: &str, floor: &str, threshold: f64) -> Result<Vec<DoorAssignment>> {
    let doc = parse_document(svg)?;
    Ok(door_assignments(&doc, floor, threshold)?
        .into_iter()
        .map(|(_, assignment)| assignment)
        .collect())
}

fn door_assignments<'a, 'input>(
    doc: &'a Document<'input>,
    floor: &str,
    threshold: f64,
) -> Result<Vec<(XmlNode<'a, 'input>, DoorAssignment)>> {
    let doors_group = find_group(doc, floor, DOORS_GROUP)
        .ok_or_else(|| Error::malformed(floor, format!("missing group {floor}_{DOORS_GROUP}")))?;

    let offices: Vec<(String, Rect)> = find_group(doc, floor, OFFICES_GROUP)
        .map(|group| {
            group
                .descendants()
                .filter(|n| n.has_tag_name("rect"))
                .filter_map(|rect| Some((rect.attribute("id")?.to_string(), read_rect(rect, floor)?)))
                .collect()
        })
        .unwrap_or_default();
    let stairs: Vec<(String, Rect)> = find_group(doc, floor, STAIRS_GROUP)
        .map(|group| {
            group
                .children()
                .filter(|n| n.has_tag_name("g"))
                .filter_map(|stair| {
                    let bounds = stair
                        .children()
                        .filter(|n| n.has_tag_name("rect"))
                        .filter_map(|rect| read_rect(rect, floor))
                        .reduce(|acc, rect| acc.union(&rect))?;
                    Some((stair.attribute("id")?.to_string(), bounds))
                })
                .collect()
        })
        .unwrap_or_default();

    let mut office_counters: HashMap<&str, usize> = HashMap::new();
    let mut stair_counters: HashMap<&str, usize> = HashMap::new();
    let mut unassigned = 0usize;
    let mut assignments = Vec::new();

    for (index, door) in doors_group
        .children()
        .filter(|n| n.has_tag_name("rect"))
        .enumerate()
    {
        let Some(previous_id) = door.attribute("id") else {
            warn!(floor, position = index + 1, "door without id gets a temporary id");
            assignments.push((
                door,
                DoorAssignment {
                    previous_id: None,
                    new_id: format!("{floor}_{}_Unassigned_{}", ids::DOOR, index + 1),
                    room: None,
                },
            ));
            continue;
        };
        let Some(rect) = read_rect(door, floor) else {
            continue;
        };

        let attach = |candidates: &[(String, Rect)]| {
            candidates
                .iter()
                .position(|(_, bounds)| rect.intersects(&bounds.expanded(threshold)))
        };

        let assignment = if let Some(found) = attach(&offices) {
            let office = offices[found].0.as_str();
            let counter = office_counters.entry(office).or_insert(0);
            *counter += 1;
            DoorAssignment {
                previous_id: Some(previous_id.to_string()),
                new_id: format!(
                    "{floor}_{}_{}_{}_{counter}",
                    ids::DOOR,
                    ids::OFFICE,
                    last_segment(office)
                ),
                room: Some(office.to_string()),
            }
        } else if let Some(found) = attach(&stairs) {
            let stair = stairs[found].0.as_str();
            let counter = stair_counters.entry(stair).or_insert(0);
            *counter += 1;
            DoorAssignment {
                previous_id: Some(previous_id.to_string()),
                new_id: format!(
                    "{floor}_{}_{}_{}_{counter}",
                    ids::DOOR,
                    ids::STAIRS,
                    last_segment(stair)
                ),
                room: Some(stair.to_string()),
            }
        } else {
            unassigned += 1;
            DoorAssignment {
                previous_id: Some(previous_id.to_string()),
                new_id: format!("{floor}_{}_Unassigned_{unassigned}", ids::DOOR),
                room: None,
            }
        };
        debug!(floor, from = previous_id, to = %assignment.new_id, "assigned door id");
        assignments.push((door, assignment));
    }

    Ok(assignments)
}

/// A floor plan with derived ids written into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRewrite {
    /// The rewritten document. Markup that needed no change is kept as is.
    pub svg: String,
    pub assignments: Vec<DoorAssignment>,
    /// Ids given to walkable lines and intersection markers that had none.
    pub generated_ids: Vec<String>,
    /// Number of `data-name` attributes removed.
    pub removed_data_names: usize,
}

/// Write structured door ids into `svg` for every floor in `floors`
/// (discovered floors when empty, skipping those without a doors group).
///
/// Lines and intersection markers without an id get the same positional id
/// extraction would give them, so the rewritten plan builds the same graph
/// with every id spelled out. Editor `data-name` attributes are dropped
/// throughout the document.
pub fn rewrite_plan_ids(svg: &str, floors: &[String], threshold: f64) -> Result<PlanRewrite> {
    let doc = parse_document(svg)?;
    let discovered = floors.is_empty();
    let floors = if discovered {
        discover_floors(&doc)
    } else {
        floors.to_vec()
    };

    let mut edits = SvgEdits::new();
    let mut assignments = Vec::new();
    let mut generated_ids = Vec::new();

    for floor in &floors {
        let doors = match door_assignments(&doc, floor, threshold) {
            Ok(doors) => doors,
            Err(Error::MalformedGeometry { reason, .. }) if discovered => {
                warn!(floor = %floor, %reason, "discovered floor is incomplete, skipped");
                continue;
            }
            Err(e) => return Err(e),
        };
        for (door, assignment) in doors {
            if assignment.previous_id.as_deref() != Some(assignment.new_id.as_str()) {
                edits.set_attribute(svg, door, "id", &assignment.new_id);
            }
            assignments.push(assignment);
        }

        if let Some(group) = find_group(&doc, floor, LINES_GROUP) {
            let lines = group.descendants().filter(|n| n.has_tag_name("line"));
            for (index, line) in lines.enumerate() {
                if line.attribute("id").is_none() {
                    let id = format!("{floor}_{LINES_GROUP}_{index}");
                    edits.set_attribute(svg, line, "id", &id);
                    generated_ids.push(id);
                }
            }
        }
        if let Some(group) = find_group(&doc, floor, INTERSECTIONS_GROUP) {
            for (index, marker) in group.descendants().filter(is_marker).enumerate() {
                if marker.attribute("id").is_none() {
                    let id = format!("{floor}_{INTERSECTIONS_GROUP}_{index}");
                    edits.set_attribute(svg, marker, "id", &id);
                    generated_ids.push(id);
                }
            }
        }
    }

    let mut removed_data_names = 0;
    for node in doc.descendants().filter(XmlNode::is_element) {
        if edits.remove_attribute(svg, node, DATA_NAME_ATTRIBUTE) {
            removed_data_names += 1;
        }
    }

    info!(
        floors = floors.len(),
        doors = assignments.len(),
        generated = generated_ids.len(),
        removed_data_names,
        "rewrote floor plan ids"
    );

    Ok(PlanRewrite {
        svg: edits.apply(svg),
        assignments,
        generated_ids,
        removed_data_names,
    })
}

fn last_segment(id: &str) -> &str {
    id.rsplit('_').next().unwrap_or(id)
}

fn find_group<'a, 'input>(
    doc: &'a Document<'input>,
    floor: &str,
    suffix: &str,
) -> Option<XmlNode<'a, 'input>> {
    find_element(doc, &format!("{floor}_{suffix}"))
}

pub(crate) fn find_element<'a, 'input>(
    doc: &'a Document<'input>,
    id: &str,
) -> Option<XmlNode<'a, 'input>> {
    doc.descendants()
        .find(|node| node.is_element() && node.attribute("id") == Some(id))
}

fn read_rect(node: XmlNode<'_, '_>, floor: &str) -> Option<Rect> {
    let values = ["x", "y", "width", "height"].map(|name| read_number(node, name));
    match values {
        [Ok(x), Ok(y), Ok(width), Ok(height)] => Some(Rect::new(x, y, width, height)),
        _ => {
            warn_unparseable(node, floor);
            None
        }
    }
}

fn read_point(node: XmlNode<'_, '_>, floor: &str, x: &str, y: &str) -> Option<Point> {
    match (read_number(node, x), read_number(node, y)) {
        (Ok(x), Ok(y)) => Some(Point::new(x, y)),
        _ => {
            warn_unparseable(node, floor);
            None
        }
    }
}

/// Missing attributes read as zero; present but unparseable ones are errors.
fn read_number(node: XmlNode<'_, '_>, name: &str) -> std::result::Result<f64, ()> {
    match node.attribute(name) {
        None => Ok(0.0),
        Some(raw) => {
            let trimmed = raw.trim();
            let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed);
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or(())
        }
    }
}

fn warn_unparseable(node: XmlNode<'_, '_>, floor: &str) {
    warn!(
        floor,
        element = node.tag_name().name(),
        id = node.attribute("id").unwrap_or("<none>"),
        "unparseable geometry attributes, shape skipped"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: &str = "Floor_First";

    fn plan(body: &str) -> String {
        format!(r#"<svg xmlns="http://www.w3.org/2000/svg">{body}</svg>"#)
    }

    #[test]
    fn missing_required_group_is_malformed() {
        let svg = plan(r#"<g id="Floor_First_Doors"/>"#);
        let doc = parse_document(&svg).unwrap();
        let error = extract_floor(&doc, FLOOR).expect_err("lines group missing");
        assert!(matches!(error, Error::MalformedGeometry { .. }));
    }

    #[test]
    fn optional_groups_yield_empty_lists() {
        let svg = plan(r#"<g id="Floor_First_Doors"/><g id="Floor_First_AllowedLines"/>"#);
        let doc = parse_document(&svg).unwrap();
        let floor = extract_floor(&doc, FLOOR).unwrap();
        assert!(floor.rooms.is_empty());
        assert!(floor.stairwells.is_empty());
        assert!(floor.intersections.is_empty());
        assert_eq!(floor.group_ids, vec!["Floor_First_Doors".to_string()]);
    }

    #[test]
    fn stairwell_bounds_are_the_union_of_parts() {
        let svg = plan(
            r#"<g id="Floor_First_Stairs">
                 <g id="Floor_First_Stairs_1">
                   <rect x="0" y="0" width="10" height="10"/>
                   <rect x="5" y="20" width="10" height="5"/>
                 </g>
               </g>
               <g id="Floor_First_Doors">
                 <rect id="Floor_First_Door_Stairs_1_1" x="0" y="25" width="4" height="2"/>
               </g>
               <g id="Floor_First_AllowedLines"/>"#,
        );
        let doc = parse_document(&svg).unwrap();
        let floor = extract_floor(&doc, FLOOR).unwrap();
        let stairwell = &floor.stairwells[0];
        assert_eq!(stairwell.id, "Floor_First_Stairs_1");
        assert_eq!(stairwell.bounds, Rect::new(0.0, 0.0, 15.0, 25.0));
        assert_eq!(stairwell.stair_key(), Some("1"));
        assert_eq!(stairwell.doors, vec!["Floor_First_Door_Stairs_1_1".to_string()]);
        assert_eq!(floor.doors[0].position, Point::new(2.0, 26.0));
    }

    #[test]
    fn orphan_and_unparseable_doors_are_excluded() {
        let svg = plan(
            r#"<g id="Floor_First_Offices">
                 <rect id="Floor_First_Office_101" x="0" y="0" width="20" height="20"/>
               </g>
               <g id="Floor_First_Doors">
                 <rect id="Floor_First_Door_Office_101_1" x="20" y="5" width="2" height="4"/>
                 <rect id="Floor_First_Door_Office_999_1" x="40" y="5" width="2" height="4"/>
                 <rect id="Floor_First_Door_Office_101_2" x="abc" y="5" width="2" height="4"/>
                 <rect id="Floor_First_Door_Unassigned_1" x="60" y="5" width="2" height="4"/>
               </g>
               <g id="Floor_First_AllowedLines"/>"#,
        );
        let doc = parse_document(&svg).unwrap();
        let floor = extract_floor(&doc, FLOOR).unwrap();
        let ids: Vec<&str> = floor.doors.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["Floor_First_Door_Office_101_1"]);
        assert_eq!(floor.rooms[0].doors, vec!["Floor_First_Door_Office_101_1".to_string()]);
        assert_eq!(floor.doors[0].room.as_deref(), Some("Floor_First_Office_101"));
    }

    #[test]
    fn lines_and_markers_without_ids_get_positional_ids() {
        let svg = plan(
            r#"<g id="Floor_First_Doors"/>
               <g id="Floor_First_Intersections"><circle cx="5" cy="6" r="1"/></g>
               <g id="Floor_First_AllowedLines">
                 <line id="L1" x1="0" y1="0" x2="3" y2="4"/>
                 <line x2="1"/>
               </g>"#,
        );
        let doc = parse_document(&svg).unwrap();
        let floor = extract_floor(&doc, FLOOR).unwrap();
        assert_eq!(floor.intersections[0].id, "Floor_First_Intersections_0");
        assert_eq!(floor.intersections[0].position, Point::new(5.0, 6.0));
        assert_eq!(floor.segments[0].length(), 5.0);
        assert_eq!(floor.segments[1].id, "Floor_First_AllowedLines_1");
        assert_eq!(floor.segments[1].end, Point::new(1.0, 0.0));
    }

    #[test]
    fn floors_are_discovered_in_document_order() {
        let svg = plan(
            r#"<g id="Floor_Second_AllowedLines"/><g id="Floor_First_AllowedLines"/>
               <g id="Floor_Second_AllowedLines_copy"/>"#,
        );
        let doc = parse_document(&svg).unwrap();
        assert_eq!(discover_floors(&doc), vec!["Floor_Second", "Floor_First"]);
    }

    #[test]
    fn incomplete_discovered_floor_is_skipped() {
        let svg = plan(
            r#"<g id="Floor_First_Doors"/><g id="Floor_First_AllowedLines"/>
               <g id="Floor_Roof_AllowedLines"/>"#,
        );
        let floors = extract_plan(&svg, &BuildOptions::default()).unwrap();
        assert_eq!(floors.len(), 1);
        assert_eq!(floors[0].floor, "Floor_First");
    }

    #[test]
    fn incomplete_requested_floor_is_malformed() {
        let svg = plan(
            r#"<g id="Floor_First_Doors"/><g id="Floor_First_AllowedLines"/>
               <g id="Floor_Roof_AllowedLines"/>"#,
        );
        let options = BuildOptions::default()
            .with_floors(vec!["Floor_First".to_string(), "Floor_Roof".to_string()]);
        let error = extract_plan(&svg, &options).unwrap_err();
        assert!(matches!(error, Error::MalformedGeometry { ref floor, .. } if floor == "Floor_Roof"));
    }

    #[test]
    fn plan_without_complete_floors_is_rejected() {
        let svg = plan(r#"<g id="Floor_Roof_AllowedLines"/>"#);
        let error = extract_plan(&svg, &BuildOptions::default()).unwrap_err();
        assert!(matches!(error, Error::FloorPlanParse { .. }));
    }

    #[test]
    fn broken_xml_is_a_parse_error() {
        let error = extract_plan("<svg><g></svg>", &BuildOptions::default()).unwrap_err();
        assert!(matches!(error, Error::FloorPlanParse { .. }));
    }

    #[test]
    fn door_ids_are_assigned_by_overlap_with_local_counters() {
        let svg = plan(
            r#"<g id="Floor_First_Offices">
                 <rect id="Floor_First_Office_101" x="0" y="0" width="20" height="20"/>
               </g>
               <g id="Floor_First_Stairs">
                 <g id="Floor_First_Stairs_1"><rect x="100" y="0" width="10" height="10"/></g>
               </g>
               <g id="Floor_First_Doors">
                 <rect id="a" x="25" y="5" width="2" height="2"/>
                 <rect id="b" x="-8" y="5" width="2" height="2"/>
                 <rect id="c" x="112" y="0" width="2" height="2"/>
                 <rect id="d" x="500" y="500" width="2" height="2"/>
                 <rect x="600" y="600" width="2" height="2"/>
               </g>"#,
        );
        let first = assign_door_ids(&svg, FLOOR, 10.0).unwrap();
        let ids: Vec<&str> = first.iter().map(|a| a.new_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "Floor_First_Door_Office_101_1",
                "Floor_First_Door_Office_101_2",
                "Floor_First_Door_Stairs_1_1",
                "Floor_First_Door_Unassigned_1",
                "Floor_First_Door_Unassigned_5",
            ]
        );
        assert_eq!(first[2].room.as_deref(), Some("Floor_First_Stairs_1"));

        let second = assign_door_ids(&svg, FLOOR, 10.0).unwrap();
        assert_eq!(first, second);
    }

    const RAW_PLAN: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <g id="Floor_First_Offices" data-name="Offices">
    <rect id="Floor_First_Office_101" x="0" y="0" width="100" height="80"/>
    <rect id="Floor_First_Office_102" x="200" y="0" width="100" height="80"/>
  </g>
  <g id="Floor_First_Doors">
    <rect id="door-a" data-name="door" x="45" y="80" width="10" height="4"/>
    <rect id="Floor_First_Door_Office_102_1" x="245" y="80" width="10" height="4"/>
  </g>
  <g id="Floor_First_Intersections">
    <circle data-name="junction" cx="50" cy="150" r="3"/>
    <circle id="Floor_First_Intersection_B" cx="250" cy="150" r="3"/>
  </g>
  <g id="Floor_First_AllowedLines">
    <line x1="50" y1="84" x2="50" y2="150"/>
    <line id="Floor_First_AllowedLine_mid" x1="50" y1="150" x2="250" y2="150"/>
    <line x1="250" y1="150" x2="250" y2="84"/>
  </g>
</svg>"#;

    #[test]
    fn rewrite_writes_door_ids_and_fills_missing_ids() {
        let rewrite = rewrite_plan_ids(RAW_PLAN, &[], 10.0).unwrap();

        assert_eq!(rewrite.assignments.len(), 2);
        assert_eq!(rewrite.assignments[0].new_id, "Floor_First_Door_Office_101_1");
        assert_eq!(
            rewrite.generated_ids,
            vec![
                "Floor_First_AllowedLines_0",
                "Floor_First_AllowedLines_2",
                "Floor_First_Intersections_0",
            ]
        );
        assert_eq!(rewrite.removed_data_names, 3);
        assert!(!rewrite.svg.contains("data-name"));
        assert!(rewrite.svg.contains(r#"<rect id="Floor_First_Door_Office_101_1" x="45""#));
        assert!(rewrite
            .svg
            .contains(r#"<rect id="Floor_First_Door_Office_102_1" x="245""#));

        let floors = extract_plan(&rewrite.svg, &BuildOptions::default()).unwrap();
        let floor = &floors[0];
        assert_eq!(floor.doors.len(), 2);
        assert_eq!(floor.rooms[0].doors, vec!["Floor_First_Door_Office_101_1".to_string()]);
        let before = extract_plan(RAW_PLAN, &BuildOptions::default()).unwrap();
        assert_eq!(floor.segments, before[0].segments);
        assert_eq!(floor.intersections, before[0].intersections);
    }

    #[test]
    fn rewrite_of_a_requested_floor_without_doors_fails() {
        let floors = vec!["Floor_Roof".to_string()];
        let error = rewrite_plan_ids(RAW_PLAN, &floors, 10.0).unwrap_err();
        assert!(matches!(error, Error::MalformedGeometry { .. }));
    }
}
