//! Structured shape identifiers.
//!
//! Every shape in a floor plan carries an id of the form
//! `<floor>_<Kind>_<detail>`, where `<floor>` is the floor key used to name
//! the floor's groups (for example `Floor_First`). Doors encode the object they
//! open into: `Floor_First_Door_Office_201_1` belongs to office
//! `Floor_First_Office_201`, `Floor_First_Door_Stairs_1_2` to stairwell
//! `Floor_First_Stairs_1`.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const OFFICE: &str = "Office";
pub const STAIRS: &str = "Stairs";
pub const DOOR: &str = "Door";

/// Rooms whose detail names a facility rather than a number.
const SPECIAL_ROOMS: &[&str] = &["Toilet", "Gym", "Kitchen", "Wardrobe", "Dining", "Server"];

const FLOOR_ORDINALS: &[(&str, &str)] = &[
    ("First", "1"),
    ("Second", "2"),
    ("Third", "3"),
    ("Fourth", "4"),
    ("Fifth", "5"),
    ("Sixth", "6"),
    ("Seventh", "7"),
    ("Eighth", "8"),
    ("Ninth", "9"),
    ("Tenth", "10"),
];

/// A parsed `<floor>_<Kind>_<detail>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectId {
    pub floor: String,
    pub kind: String,
    pub detail: String,
}

impl ObjectId {
    /// Parse `raw` as an id on `floor`. Returns `None` when the id does not
    /// start with the floor key or has no kind segment.
    pub fn parse(floor: &str, raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(floor)?.strip_prefix('_')?;
        let (kind, detail) = match rest.split_once('_') {
            Some((kind, detail)) => (kind, detail),
            None => (rest, ""),
        };
        if kind.is_empty() {
            return None;
        }
        Some(Self {
            floor: floor.to_string(),
            kind: kind.to_string(),
            detail: detail.to_string(),
        })
    }

    /// First `_`-separated segment of the detail (the object number).
    pub fn number(&self) -> Option<&str> {
        self.detail.split('_').next().filter(|n| !n.is_empty())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}_{}", self.floor, self.kind)
        } else {
            write!(f, "{}_{}_{}", self.floor, self.kind, self.detail)
        }
    }
}

/// The object a door opens into, decoded from the door's detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoorTarget {
    Office(String),
    Stairs(String),
}

impl DoorTarget {
    /// Decode a door detail such as `Office_201_1` or `Stairs_1_2`.
    pub fn parse(detail: &str) -> Option<Self> {
        let mut parts = detail.split('_');
        let kind = parts.next()?;
        let number = parts.next().filter(|n| !n.is_empty())?.to_string();
        match kind {
            OFFICE => Some(DoorTarget::Office(number)),
            STAIRS => Some(DoorTarget::Stairs(number)),
            _ => None,
        }
    }

    /// Room id the door belongs to on `floor`.
    pub fn room_id(&self, floor: &str) -> String {
        match self {
            DoorTarget::Office(number) => format!("{floor}_{OFFICE}_{number}"),
            DoorTarget::Stairs(number) => format!("{floor}_{STAIRS}_{number}"),
        }
    }
}

/// Short floor name for display: `Floor_Second` becomes `2`.
pub fn floor_display(floor: &str) -> String {
    let short = floor.strip_prefix("Floor_").unwrap_or(floor);
    FLOOR_ORDINALS
        .iter()
        .find(|(word, _)| *word == short)
        .map(|(_, number)| (*number).to_string())
        .unwrap_or_else(|| short.to_string())
}

/// Human-readable label for a room id, e.g. `Office 201 (floor 1)`.
///
/// Ids that do not follow the structured format fall back to the raw id.
pub fn room_label(floor: &str, room_id: &str) -> String {
    let Some(parsed) = ObjectId::parse(floor, room_id) else {
        return room_id.to_string();
    };
    let floor_name = floor_display(floor);
    let name = match parsed.kind.as_str() {
        OFFICE => match SPECIAL_ROOMS
            .iter()
            .find(|special| parsed.detail.starts_with(*special))
        {
            Some(special) => (*special).to_string(),
            None => format!("{OFFICE} {}", parsed.number().unwrap_or(&parsed.detail)),
        },
        kind => match parsed.number() {
            Some(number) => format!("{kind} {number}"),
            None => kind.to_string(),
        },
    };
    format!("{name} (floor {floor_name})")
}

/// Short label drawn on the plan itself: the facility name of a special
/// room, otherwise the object number.
pub fn map_label(floor: &str, room_id: &str) -> String {
    let Some(parsed) = ObjectId::parse(floor, room_id) else {
        return room_id.to_string();
    };
    SPECIAL_ROOMS
        .iter()
        .find(|special| parsed.detail.starts_with(*special))
        .map(|special| (*special).to_string())
        .unwrap_or_else(|| parsed.number().unwrap_or(&parsed.detail).to_string())
}
