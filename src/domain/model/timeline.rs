// Timeline - ordered playback sequence of video nodes

use serde::{Deserialize, Serialize};

use super::{normalize_name, SplitMode, VideoNode};
use crate::domain::errors::TimelineError;
use crate::domain::rules::SplitPlanner;

/// Ordered sequence of nodes; insertion order is playback order.
///
/// Every mutating operation validates first and leaves the sequence
/// untouched when it fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(rename = "video_nodes", default)]
    nodes: Vec<VideoNode>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap nodes loaded from persisted state
    pub fn from_nodes(nodes: Vec<VideoNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[VideoNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<VideoNode> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&VideoNode> {
        self.nodes.get(position)
    }

    /// Nodes flagged for container-copy export
    pub fn lossless_nodes(&self) -> impl Iterator<Item = &VideoNode> {
        self.nodes.iter().filter(|node| node.lossless_export)
    }

    /// Sum of every node's planned length
    pub fn total_duration(&self) -> f64 {
        self.nodes.iter().map(VideoNode::duration).sum()
    }

    /// Drop every node
    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    /// Insert a new node at `position` (`0..=len`) and return it
    pub fn insert(
        &mut self,
        rid: impl Into<String>,
        name: impl Into<String>,
        start: f64,
        end: f64,
        position: usize,
    ) -> Result<VideoNode, TimelineError> {
        if position > self.nodes.len() {
            return Err(TimelineError::OutOfRange {
                position,
                len: self.nodes.len(),
            });
        }

        let node = VideoNode::new(rid, name, start, end);
        self.nodes.insert(position, node.clone());
        Ok(node)
    }

    /// Remove and return the node at `position`
    pub fn delete(&mut self, position: usize) -> Result<VideoNode, TimelineError> {
        self.check_position(position)?;
        Ok(self.nodes.remove(position))
    }

    /// Overwrite a node's label; empty labels fall back to the placeholder
    pub fn rename(&mut self, position: usize, name: impl Into<String>) -> Result<(), TimelineError> {
        self.check_position(position)?;
        self.nodes[position].name = normalize_name(name.into());
        Ok(())
    }

    /// Flip the lossless flag of one node and return its new value
    pub fn toggle_lossless(&mut self, position: usize) -> Result<bool, TimelineError> {
        self.check_position(position)?;
        let node = &mut self.nodes[position];
        node.lossless_export = !node.lossless_export;
        Ok(node.lossless_export)
    }

    pub fn mark_all_lossless(&mut self) -> Result<(), TimelineError> {
        self.set_all_lossless(true)
    }

    pub fn unmark_all_lossless(&mut self) -> Result<(), TimelineError> {
        self.set_all_lossless(false)
    }

    fn set_all_lossless(&mut self, flag: bool) -> Result<(), TimelineError> {
        if self.nodes.is_empty() {
            return Err(TimelineError::EmptyTimeline);
        }
        for node in &mut self.nodes {
            node.lossless_export = flag;
        }
        Ok(())
    }

    /// Replace the node at `position` with the pieces of a split.
    ///
    /// Derived nodes keep the parent's source and label and get new ids.
    pub fn split(
        &mut self,
        mode: SplitMode,
        position: usize,
        start: f64,
        end: f64,
    ) -> Result<Vec<VideoNode>, TimelineError> {
        self.check_position(position)?;

        let parent = &self.nodes[position];
        let intervals = SplitPlanner::plan(mode, parent.start, parent.end, start, end)
            .filter(|parts| !parts.is_empty())
            .ok_or(TimelineError::InvalidCutRange {
                node_start: parent.start,
                node_end: parent.end,
                start,
                end,
            })?;

        let produced: Vec<VideoNode> = intervals
            .into_iter()
            .map(|(from, to)| parent.derive(from, to))
            .collect();

        self.nodes.splice(position..=position, produced.iter().cloned());
        Ok(produced)
    }

    /// Remove every node cut from `rid`; returns how many went away
    pub fn delete_rid_references(&mut self, rid: &str) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.rid != rid);
        before - self.nodes.len()
    }

    fn check_position(&self, position: usize) -> Result<(), TimelineError> {
        if self.nodes.is_empty() {
            return Err(TimelineError::EmptyTimeline);
        }
        if position >= self.nodes.len() {
            return Err(TimelineError::OutOfRange {
                position,
                len: self.nodes.len(),
            });
        }
        Ok(())
    }
}
