//! Keyframe Animations
//!
//! `@keyframes` blocks are collected into named sequences while parsing and
//! normalized once the whole stylesheet has been read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::properties::PropertyDictionary;

/// Declarations anchored at one point of animation progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeBlock {
    /// Offset in [0, 1]
    pub normalized_time: f32,
    pub properties: PropertyDictionary,
}

/// A named keyframes sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyframesSequence {
    pub name: String,
    /// Sorted by `normalized_time` after [`postprocess`]
    pub blocks: Vec<KeyframeBlock>,
    /// Every property touched by any block, sorted and unique
    pub property_names: Vec<String>,
}

/// Sequences by name
pub type KeyframesMap = BTreeMap<String, KeyframesSequence>;

impl KeyframesSequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add `properties` at `time`. A block already within `epsilon` of
    /// `time` is emptied and refilled, so the latest declarations win.
    pub fn insert_block(&mut self, time: f32, properties: &PropertyDictionary, epsilon: f32) {
        let index = match self
            .blocks
            .iter()
            .position(|block| (block.normalized_time - time).abs() < epsilon)
        {
            Some(index) => {
                self.blocks[index].properties.clear();
                index
            }
            None => {
                self.blocks.push(KeyframeBlock {
                    normalized_time: time,
                    properties: PropertyDictionary::new(),
                });
                self.blocks.len() - 1
            }
        };
        self.blocks[index].properties.import(properties);
    }

    /// Sort blocks by time and rebuild `property_names`
    pub fn finalize(&mut self) {
        self.blocks
            .sort_by(|a, b| a.normalized_time.total_cmp(&b.normalized_time));

        let mut names: Vec<String> = self
            .blocks
            .iter()
            .flat_map(|block| block.properties.names().map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        self.property_names = names;
    }

    /// Block sitting exactly at `time`, within `epsilon`
    pub fn block_at(&self, time: f32, epsilon: f32) -> Option<&KeyframeBlock> {
        self.blocks
            .iter()
            .find(|block| (block.normalized_time - time).abs() < epsilon)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Finalize every sequence in the map
pub fn postprocess(map: &mut KeyframesMap) {
    for sequence in map.values_mut() {
        sequence.finalize();
    }
}

/// Keyframes names are restricted to ASCII letters, digits, `-` and `_`
pub fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Convert a time selector list (`from`, `to`, `25%`, separated by commas
/// or whitespace) into normalized offsets. Entries that are not understood
/// are dropped.
pub fn parse_time_selectors(text: &str) -> Vec<f32> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|selector| {
            let selector = selector.to_ascii_lowercase();
            match selector.as_str() {
                "from" => Some(0.0),
                "to" => Some(1.0),
                other => {
                    let percent: f32 = other.strip_suffix('%')?.parse().ok()?;
                    (0.0..=100.0).contains(&percent).then_some(percent / 100.0)
                }
            }
        })
        .collect()
}
