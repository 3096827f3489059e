// src/extract/fields.rs
//! Tolerant readers for the handful of item fields we care about.
//!
//! Publishers encode the same thing in several shapes (`"Yoga"`,
//! `{"prefLabel": "Yoga"}`, a list of either...). Each field gets a small
//! untagged enum so the accepted shapes are listed in one place, and
//! anything else lands in an `Other` arm instead of failing.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Longitude/latitude pair; `(longitude, latitude)` order like GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn as_pair(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }
}

// --- activity: "x" | {prefLabel} | [ "x" | {prefLabel} ] ---

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActivityField {
    // Listed first: a bare entry would otherwise swallow one-element lists.
    Many(Vec<ActivityEntry>),
    One(ActivityEntry),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActivityEntry {
    Label(String),
    Concept(Map<String, Value>),
    Other(IgnoredAny),
}

impl ActivityEntry {
    fn into_label(self) -> Option<String> {
        match self {
            ActivityEntry::Label(s) => Some(s),
            ActivityEntry::Concept(concept) => concept
                .get("prefLabel")
                .and_then(Value::as_str)
                .map(str::to_owned),
            ActivityEntry::Other(_) => None,
        }
    }
}

impl ActivityField {
    fn into_labels(self) -> Vec<String> {
        match self {
            ActivityField::Many(entries) => entries
                .into_iter()
                .filter_map(ActivityEntry::into_label)
                .collect(),
            ActivityField::One(entry) => entry.into_label().into_iter().collect(),
        }
    }
}

// --- geo latitude/longitude: 51.0 | "51.0" ---

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Degrees {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Degrees {
    fn to_f64(&self) -> Option<f64> {
        let v = match self {
            Degrees::Number(n) => *n,
            Degrees::Text(s) => s.trim().parse::<f64>().ok()?,
            Degrees::Other(_) => return None,
        };
        v.is_finite().then_some(v)
    }
}

#[derive(Debug, Deserialize)]
struct GeoCoordinates {
    latitude: Option<Degrees>,
    longitude: Option<Degrees>,
}

/// Activity labels of an item, in feed order. Missing → empty.
pub fn extract_activities(item: &Value) -> Vec<String> {
    let Some(raw) = item.pointer("/data/activity") else {
        return Vec::new();
    };
    ActivityField::deserialize(raw)
        .map(ActivityField::into_labels)
        .unwrap_or_default()
}

/// Coordinates from `data.location.geo`, falling back to
/// `data.location.containedInPlace.geo`.
///
/// Both-zero lat/long is a placeholder some publishers emit, not a real
/// point, so it is reported as absent.
pub fn extract_coordinates(item: &Value) -> Option<Coordinates> {
    let geo = non_null(item.pointer("/data/location/geo"))
        .or_else(|| non_null(item.pointer("/data/location/containedInPlace/geo")))?;

    if !geo.is_object() {
        return None;
    }
    let geo = GeoCoordinates::deserialize(geo).ok()?;
    let latitude = geo.latitude.as_ref()?.to_f64()?;
    let longitude = geo.longitude.as_ref()?.to_f64()?;

    if latitude == 0.0 && longitude == 0.0 {
        return None;
    }
    Some(Coordinates {
        longitude,
        latitude,
    })
}

/// Raw value of a date-ish field, looked up in order under `data`,
/// `data.subEvent` (first element if it is a list) and `data.eventSchedule`.
/// First hit wins; the value is not parsed.
pub fn extract_timestamp(item: &Value, field_name: &str) -> Option<String> {
    let data = item.get("data")?;

    let direct = data.get(field_name);
    let sub_event = data.get("subEvent").and_then(|sub| match sub {
        Value::Array(events) => events.first()?.get(field_name),
        other => other.get(field_name),
    });
    let schedule = data
        .get("eventSchedule")
        .and_then(|schedule| schedule.get(field_name));

    [direct, sub_event, schedule]
        .into_iter()
        .flatten()
        .find_map(scalar_text)
}

fn non_null(v: Option<&Value>) -> Option<&Value> {
    v.filter(|v| !v.is_null())
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
