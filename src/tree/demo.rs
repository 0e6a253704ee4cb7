//! Sample tree used by `ktree view --demo` and the demo classifier.

use crate::parser::snapshot::{self, Snapshot, SnapshotError};
use crate::tree::model::TreeModel;

pub const DEMO_SNAPSHOT: &str = r#"{
  "branches": [
    {"id": "core", "name": "Core Methods"},
    {"id": "apps", "name": "Applications"}
  ],
  "nodes": [
    {
      "id": "seq", "type": "problem", "title": "Long-range dependencies",
      "position": {"x": 400, "y": 80}, "paperCount": 12, "isFoundational": true,
      "what": "Sequence models forget context over long inputs.",
      "how": [], "gaps": [], "createdAt": 2015
    },
    {
      "id": "attn", "type": "mechanism", "parentId": "seq", "title": "Attention",
      "position": {"x": 200, "y": 260}, "paperCount": 8,
      "what": "Weighted lookup over all positions.",
      "how": ["Scaled dot-product", "Multi-head projection"],
      "gaps": [], "createdAt": "2017-06-12"
    },
    {
      "id": "rnn", "type": "solution", "parentId": "seq", "title": "Gated recurrence",
      "position": {"x": 600, "y": 260}, "paperCount": 5,
      "what": "Gates control what the hidden state keeps.",
      "how": ["LSTM cells", "GRU cells"], "gaps": [], "createdAt": 2015
    },
    {
      "id": "xf", "type": "solution", "parentId": "attn", "title": "Transformer",
      "position": {"x": 120, "y": 460}, "paperCount": 20, "isFoundational": true,
      "what": "Stacks attention without recurrence.",
      "how": ["Positional encoding", "Residual blocks"],
      "gaps": ["Quadratic cost in sequence length"],
      "createdAt": "2017-12-06T00:00:00Z"
    },
    {
      "id": "sparse", "type": "solution", "parentId": "attn", "title": "Sparse attention",
      "position": {"x": 320, "y": 460}, "paperCount": 3,
      "what": "Attend to a structured subset of positions.",
      "how": ["Sliding windows", "Global tokens"], "gaps": [], "createdAt": 2020
    },
    {
      "id": "cost", "type": "gap", "parentId": "xf", "title": "Efficient long context",
      "position": {"x": 220, "y": 640}, "paperCount": 1,
      "what": "No method matches full attention quality at linear cost.",
      "how": [], "gaps": ["Benchmarks disagree on quality loss"], "createdAt": 2021
    }
  ],
  "connections": [
    {"id": "c1", "fromNodeId": "sparse", "toNodeId": "xf", "type": "extends", "strength": "strong"},
    {"id": "c2", "fromNodeId": "rnn", "toNodeId": "xf", "type": "alternative", "strength": "moderate"},
    {"id": "c3", "fromNodeId": "sparse", "toNodeId": "cost", "type": "supporting", "strength": "weak"},
    {"id": "c4", "fromNodeId": "rnn", "toNodeId": "attn", "type": "contradictory", "strength": "weak"}
  ]
}"#;

pub fn demo_snapshot() -> Result<Snapshot, SnapshotError> {
    snapshot::parse(DEMO_SNAPSHOT)
}

pub fn demo_model() -> Result<TreeModel, SnapshotError> {
    snapshot::load_str(DEMO_SNAPSHOT)
}
