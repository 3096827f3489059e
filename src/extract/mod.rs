// src/extract/mod.rs
//! Item-level normalization: field readers + timestamp parsing.

pub mod fields;
pub mod temporal;

pub use fields::{extract_activities, extract_coordinates, extract_timestamp, Coordinates};
pub use temporal::{
    parse_iso8601, parse_modified, parse_modified_value, RawTimestamp, TimestampError,
};
