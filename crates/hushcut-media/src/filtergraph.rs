//! Deterministic FFmpeg filter graph construction.
//!
//! Compiles a keep-interval list into the trim/concat/merge graph the
//! encoder consumes. Node naming is a pure function of the interval
//! index, so identical inputs always render to byte-identical
//! filter_complex strings. A single keep interval still produces the
//! full chain.

use serde::{Deserialize, Serialize};

use hushcut_models::Interval;

/// Label of the graph's final output pad.
pub const OUTPUT_LABEL: &str = "out";

/// One named transform node in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterNode {
    /// Output pad label, without brackets (e.g. `v0`, `outa`).
    pub label: String,
    /// Filter expression including its input pads.
    pub expr: String,
}

impl FilterNode {
    fn new(label: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            expr: expr.into(),
        }
    }

    /// Render the node as `expr[label]`.
    fn render(&self) -> String {
        format!("{}[{}]", self.expr, self.label)
    }
}

/// A compiled filter graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGraph {
    /// Ordered transform nodes.
    pub nodes: Vec<FilterNode>,
    /// Label of the final output pad.
    pub output_label: String,
}

impl FilterGraph {
    /// Compile keep-intervals into the trim + concat + merge graph.
    ///
    /// Per interval `i`: one video trim node `v{i}` and one audio trim
    /// node `a{i}`, each resetting timestamps to zero. Then one concat
    /// over all video pads (`outv`), one over all audio pads (`outa`),
    /// and the final pairing node (`out`). Node count is `2n + 3`.
    pub fn build(intervals: &[Interval]) -> Self {
        let n = intervals.len();
        let mut nodes = Vec::with_capacity(2 * n + 3);

        for (i, iv) in intervals.iter().enumerate() {
            nodes.push(FilterNode::new(
                format!("v{}", i),
                format!(
                    "[0:v]trim=start={}:end={},setpts=PTS-STARTPTS",
                    iv.start, iv.end
                ),
            ));
            nodes.push(FilterNode::new(
                format!("a{}", i),
                format!(
                    "[0:a]atrim=start={}:end={},asetpts=PTS-STARTPTS",
                    iv.start, iv.end
                ),
            ));
        }

        let v_inputs: String = (0..n).map(|i| format!("[v{}]", i)).collect();
        let a_inputs: String = (0..n).map(|i| format!("[a{}]", i)).collect();

        nodes.push(FilterNode::new(
            "outv",
            format!("{}concat=n={}:v=1:a=0", v_inputs, n),
        ));
        nodes.push(FilterNode::new(
            "outa",
            format!("{}concat=n={}:v=0:a=1", a_inputs, n),
        ));
        nodes.push(FilterNode::new(
            OUTPUT_LABEL,
            "[outv][outa]concat=n=1:v=1:a=1",
        ));

        Self {
            nodes,
            output_label: OUTPUT_LABEL.to_string(),
        }
    }

    /// Render the graph as a filter_complex string.
    pub fn render(&self) -> String {
        self.nodes
            .iter()
            .map(FilterNode::render)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// The `-map` argument for the final output pad.
    pub fn output_map(&self) -> String {
        format!("[{}]", self.output_label)
    }
}
