//! Reader and writer for `snapshot.json`, the batch the classifier delivers.
//!
//! The wire document (`Snapshot`) is kept separate from the semantic model
//! (`TreeModel`): the document tolerates numeric ids and free-form tags so
//! that conversion can report precisely which node or connection is wrong.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::error;

use crate::tree::model::{
    Branch, Connection, ConnectionType, CreatedAt, ModelError, NodeType, Point, Strength,
    TreeModel, TreeNode,
};

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub connections: Vec<WireConnection>,
    #[serde(default, alias = "mainBranches")]
    pub branches: Vec<WireBranch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNode {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<String>,
    pub position: WirePoint,
    #[serde(default)]
    pub paper_count: u32,
    #[serde(default)]
    pub is_foundational: bool,
    #[serde(default)]
    pub what: String,
    #[serde(default)]
    pub how: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub papers: Vec<String>,
    pub created_at: WireTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WirePoint {
    pub x: f32,
    pub y: f32,
}

/// `2019`, `"2019"`, `"2019-04-01"` or `"2019-04-01T12:00:00Z"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Year(i32),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireConnection {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(deserialize_with = "de_id")]
    pub from_node_id: String,
    #[serde(deserialize_with = "de_id")]
    pub to_node_id: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub strength: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBranch {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("node `{node}` has unknown type `{tag}`")]
    UnknownNodeType { node: String, tag: String },
    #[error("connection `{connection}` has unknown type `{tag}`")]
    UnknownConnectionType { connection: String, tag: String },
    #[error("connection `{connection}` has unknown strength `{tag}`")]
    UnknownStrength { connection: String, tag: String },
    #[error("node `{node}` has unreadable createdAt `{value}`")]
    InvalidTimestamp { node: String, value: String },
    #[error("node `{node}` has a non-finite position")]
    InvalidPosition { node: String },
    #[error("a node or connection has an empty id")]
    EmptyId,
    #[error(transparent)]
    Model(#[from] ModelError),
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

pub fn parse(input: &str) -> Result<Snapshot, SnapshotError> {
    Ok(serde_json::from_str(input)?)
}

pub fn serialize(snapshot: &Snapshot) -> Result<String, SnapshotError> {
    let mut out = serde_json::to_string_pretty(snapshot)?;
    out.push('\n');
    Ok(out)
}

/// Parse and validate in one step.
pub fn load_str(input: &str) -> Result<TreeModel, SnapshotError> {
    to_model(&parse(input)?)
}

// ---------------------------------------------------------------------------
// Semantic model conversion
// ---------------------------------------------------------------------------

/// Validate a document into a `TreeModel`.
///
/// Unknown tags are model errors: they are logged and reported, never mapped
/// to a fallback style.
pub fn to_model(snapshot: &Snapshot) -> Result<TreeModel, SnapshotError> {
    let nodes = snapshot
        .nodes
        .iter()
        .map(node_from_wire)
        .collect::<Result<Vec<_>, _>>()?;
    let connections = snapshot
        .connections
        .iter()
        .map(connection_from_wire)
        .collect::<Result<Vec<_>, _>>()?;
    let branches = snapshot
        .branches
        .iter()
        .map(|b| Branch {
            id: b.id.clone(),
            name: b.name.clone(),
        })
        .collect();
    Ok(TreeModel::new(nodes, connections, branches)?)
}

/// Canonical document for a model.
pub fn from_model(model: &TreeModel) -> Snapshot {
    Snapshot {
        nodes: model.nodes().iter().map(node_to_wire).collect(),
        connections: model
            .connections()
            .iter()
            .map(|c| WireConnection {
                id: c.id.clone(),
                from_node_id: c.from_node_id.clone(),
                to_node_id: c.to_node_id.clone(),
                connection_type: c.connection_type.to_string(),
                strength: c.strength.to_string(),
            })
            .collect(),
        branches: model
            .branches()
            .iter()
            .map(|b| WireBranch {
                id: b.id.clone(),
                name: b.name.clone(),
            })
            .collect(),
    }
}

fn node_from_wire(wire: &WireNode) -> Result<TreeNode, SnapshotError> {
    if wire.id.is_empty() {
        return Err(SnapshotError::EmptyId);
    }
    let node_type = wire.node_type.parse::<NodeType>().map_err(|_| {
        error!(node = %wire.id, tag = %wire.node_type, "node type has no visual style");
        SnapshotError::UnknownNodeType {
            node: wire.id.clone(),
            tag: wire.node_type.clone(),
        }
    })?;
    if !wire.position.x.is_finite() || !wire.position.y.is_finite() {
        return Err(SnapshotError::InvalidPosition {
            node: wire.id.clone(),
        });
    }
    let created_at = parse_timestamp(&wire.created_at).ok_or_else(|| {
        SnapshotError::InvalidTimestamp {
            node: wire.id.clone(),
            value: match &wire.created_at {
                WireTimestamp::Year(y) => y.to_string(),
                WireTimestamp::Text(s) => s.clone(),
            },
        }
    })?;

    Ok(TreeNode {
        id: wire.id.clone(),
        node_type,
        title: wire
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| wire.id.clone()),
        parent_id: wire.parent_id.clone().filter(|p| !p.is_empty()),
        position: Point::new(wire.position.x, wire.position.y),
        paper_count: wire.paper_count,
        is_foundational: wire.is_foundational,
        what: wire.what.clone(),
        how: wire.how.clone(),
        gaps: wire.gaps.clone(),
        papers: wire.papers.clone(),
        created_at,
    })
}

fn connection_from_wire(wire: &WireConnection) -> Result<Connection, SnapshotError> {
    if wire.id.is_empty() {
        return Err(SnapshotError::EmptyId);
    }
    let connection_type = wire.connection_type.parse::<ConnectionType>().map_err(|_| {
        error!(connection = %wire.id, tag = %wire.connection_type, "connection type has no stroke style");
        SnapshotError::UnknownConnectionType {
            connection: wire.id.clone(),
            tag: wire.connection_type.clone(),
        }
    })?;
    let strength = wire
        .strength
        .parse::<Strength>()
        .map_err(|_| SnapshotError::UnknownStrength {
            connection: wire.id.clone(),
            tag: wire.strength.clone(),
        })?;
    Ok(Connection {
        id: wire.id.clone(),
        from_node_id: wire.from_node_id.clone(),
        to_node_id: wire.to_node_id.clone(),
        connection_type,
        strength,
    })
}

fn node_to_wire(node: &TreeNode) -> WireNode {
    WireNode {
        id: node.id.clone(),
        node_type: node.node_type.to_string(),
        title: (node.title != node.id).then(|| node.title.clone()),
        parent_id: node.parent_id.clone(),
        position: WirePoint {
            x: node.position.x,
            y: node.position.y,
        },
        paper_count: node.paper_count,
        is_foundational: node.is_foundational,
        what: node.what.clone(),
        how: node.how.clone(),
        gaps: node.gaps.clone(),
        papers: node.papers.clone(),
        created_at: match node.created_at {
            CreatedAt::Year(y) => WireTimestamp::Year(y),
            CreatedAt::Date(d) => WireTimestamp::Text(d.format("%Y-%m-%d").to_string()),
            CreatedAt::Timestamp(t) => WireTimestamp::Text(t.to_rfc3339()),
        },
    }
}

fn parse_timestamp(wire: &WireTimestamp) -> Option<CreatedAt> {
    match wire {
        WireTimestamp::Year(y) => Some(CreatedAt::Year(*y)),
        WireTimestamp::Text(raw) => {
            let s = raw.trim();
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Some(CreatedAt::Timestamp(t));
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Some(CreatedAt::Date(d));
            }
            if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
                return s.parse().ok().map(CreatedAt::Year);
            }
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(s) => s,
            WireId::Unsigned(n) => n.to_string(),
            WireId::Signed(n) => n.to_string(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    WireId::deserialize(deserializer).map(String::from)
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<WireId>::deserialize(deserializer).map(|id| id.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "nodes": [
            {"id": 1, "type": "mechanism", "position": {"x": 100, "y": 100},
             "paperCount": 0, "createdAt": 2019},
            {"id": 2, "type": "gap", "parentId": 1, "position": {"x": 300, "y": 200},
             "paperCount": 10, "createdAt": 2021}
        ]
    }"#;

    #[test]
    fn numeric_ids_are_stringified() {
        let model = load_str(SCENARIO).unwrap();
        let child = model.get("2").unwrap();
        assert_eq!(child.parent_id.as_deref(), Some("1"));
        assert_eq!(child.node_type, NodeType::Gap);
        assert_eq!(child.title, "2");
        assert!(model.connections().is_empty());
    }

    #[test]
    fn timestamps_accept_years_dates_and_rfc3339() {
        for (raw, year) in [
            ("2019", 2019),
            ("\"2020\"", 2020),
            ("\"2021-06-30\"", 2021),
            ("\"2022-01-01T00:30:00+01:00\"", 2022),
        ] {
            let input = format!(
                r#"{{"nodes":[{{"id":"a","type":"problem","position":{{"x":0,"y":0}},"createdAt":{raw}}}]}}"#
            );
            let model = load_str(&input).unwrap();
            assert_eq!(model.get("a").unwrap().created_at.year(), year, "{raw}");
        }
    }

    #[test]
    fn bad_timestamp_names_the_node() {
        let input = r#"{"nodes":[{"id":"a","type":"problem","position":{"x":0,"y":0},"createdAt":"last spring"}]}"#;
        let err = load_str(input).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidTimestamp { ref node, .. } if node == "a"));
    }

    #[test]
    fn unknown_node_type_is_an_error() {
        let input = r#"{"nodes":[{"id":"a","type":"theory","position":{"x":0,"y":0},"createdAt":2020}]}"#;
        let err = load_str(input).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnknownNodeType { ref tag, .. } if tag == "theory"
        ));
    }

    #[test]
    fn unknown_connection_tags_are_errors() {
        let input = r#"{"connections":[{"id":"c","fromNodeId":"a","toNodeId":"b","type":"hostile","strength":"weak"}]}"#;
        assert!(matches!(
            load_str(input).unwrap_err(),
            SnapshotError::UnknownConnectionType { .. }
        ));
        let input = r#"{"connections":[{"id":"c","fromNodeId":"a","toNodeId":"b","type":"supporting","strength":"huge"}]}"#;
        assert!(matches!(
            load_str(input).unwrap_err(),
            SnapshotError::UnknownStrength { .. }
        ));
    }

    #[test]
    fn duplicate_ids_surface_as_model_errors() {
        let input = r#"{"nodes":[
            {"id":"a","type":"problem","position":{"x":0,"y":0},"createdAt":2020},
            {"id":"a","type":"gap","position":{"x":1,"y":1},"createdAt":2021}
        ]}"#;
        assert!(matches!(
            load_str(input).unwrap_err(),
            SnapshotError::Model(ModelError::DuplicateNodeId(_))
        ));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let input = r#"{"nodes":[{"id":"a","type":"problem","createdAt":2020}]}"#;
        let err = load_str(input).unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
        assert!(err.to_string().contains("missing field `position`"));
        let input = r#"{"nodes":[{"id":"a","type":"problem","position":{"x":0,"y":0},"paperCount":-1,"createdAt":2020}]}"#;
        assert!(matches!(load_str(input).unwrap_err(), SnapshotError::Json(_)));
    }

    #[test]
    fn main_branches_alias_is_accepted() {
        let input = r#"{"mainBranches":[{"id":"nlp","name":"Natural Language"}]}"#;
        let model = load_str(input).unwrap();
        assert_eq!(model.branches()[0].name, "Natural Language");
    }

    #[test]
    fn written_document_reloads_to_same_model() {
        let model = load_str(SCENARIO).unwrap();
        let text = serialize(&from_model(&model)).unwrap();
        let again = load_str(&text).unwrap();
        assert_eq!(model.nodes(), again.nodes());
    }
}
