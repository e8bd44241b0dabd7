// Concat filter-graph generation

use crate::domain::errors::ValidationError;
use crate::domain::model::VideoNode;

/// Label of the concatenated video stream
pub const CONCAT_OUTPUT_LABEL: &str = "[out]";

/// A rendered concat graph plus the inputs it refers to
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatFilter {
    /// Single filter-graph fragment
    pub graph: String,
    /// Distinct source ids in first-seen order; position is the input index
    pub inputs: Vec<String>,
    /// Input index used by each node, parallel to the node list
    pub indices: Vec<usize>,
    pub output_label: String,
}

/// Assign each distinct source id the next input index in first-seen order.
///
/// Returns the distinct ids and, for every node, the index of its source.
pub fn input_indices(nodes: &[VideoNode]) -> (Vec<String>, Vec<usize>) {
    let mut inputs: Vec<String> = Vec::new();
    let mut indices = Vec::with_capacity(nodes.len());

    for node in nodes {
        let index = match inputs.iter().position(|rid| *rid == node.rid) {
            Some(index) => index,
            None => {
                inputs.push(node.rid.clone());
                inputs.len() - 1
            }
        };
        indices.push(index);
    }

    (inputs, indices)
}

/// Build a trim/setpts/scale stage per node feeding one video-only concat.
///
/// Nodes sharing a source trim independently from the same input index.
pub fn concat_filter(nodes: &[VideoNode], scale: &str) -> Result<ConcatFilter, ValidationError> {
    if nodes.is_empty() {
        return Err(ValidationError::NoNodesProvided);
    }

    let (inputs, indices) = input_indices(nodes);
    let mut graph = String::new();

    for (stage, (node, index)) in nodes.iter().zip(&indices).enumerate() {
        graph.push_str(&format!(
            "[{}:v]trim=start={:.4}:end={:.4},setpts=PTS-STARTPTS,scale={}[v{}];",
            index, node.start, node.end, scale, stage
        ));
    }
    for stage in 0..nodes.len() {
        graph.push_str(&format!("[v{}]", stage));
    }
    graph.push_str(&format!(
        "concat=n={}:v=1:a=0{}",
        nodes.len(),
        CONCAT_OUTPUT_LABEL
    ));

    Ok(ConcatFilter {
        graph,
        inputs,
        indices,
        output_label: CONCAT_OUTPUT_LABEL.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(rid: &str, start: f64, end: f64) -> VideoNode {
        VideoNode::new(rid, "clip", start, end)
    }

    #[test]
    fn test_indices_follow_first_seen_order() {
        let nodes = vec![node("A", 0.0, 1.0), node("A", 2.0, 3.0), node("B", 0.0, 1.0), node("C", 0.0, 1.0)];
        let (inputs, indices) = input_indices(&nodes);
        assert_eq!(inputs, vec!["A", "B", "C"]);
        assert_eq!(indices, vec![0, 0, 1, 2]);
    }

    #[test]
    fn test_non_adjacent_repeats_reuse_index() {
        let nodes = vec![node("B", 0.0, 1.0), node("A", 0.0, 1.0), node("B", 5.0, 6.0)];
        let (_, indices) = input_indices(&nodes);
        assert_eq!(indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_concat_graph() {
        let nodes = vec![node("A", 1.0, 2.5), node("B", 0.25, 4.0)];
        let filter = concat_filter(&nodes, "1920:1080").unwrap();
        assert_eq!(
            filter.graph,
            "[0:v]trim=start=1.0000:end=2.5000,setpts=PTS-STARTPTS,scale=1920:1080[v0];\
             [1:v]trim=start=0.2500:end=4.0000,setpts=PTS-STARTPTS,scale=1920:1080[v1];\
             [v0][v1]concat=n=2:v=1:a=0[out]"
        );
        assert_eq!(filter.output_label, "[out]");
    }

    #[test]
    fn test_empty_node_list() {
        assert_eq!(
            concat_filter(&[], "1920:1080").unwrap_err(),
            ValidationError::NoNodesProvided
        );
    }
}
