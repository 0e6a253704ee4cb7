use std::collections::{HashMap, HashSet};
use std::ops::{Add, Mul, Sub};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// What a node represents in the research landscape.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum NodeType {
    Problem,
    Solution,
    Mechanism,
    Gap,
}

/// How two nodes relate, independent of the parent/child hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionType {
    Supporting,
    Alternative,
    Contradictory,
    Extends,
}

impl ConnectionType {
    /// Competing or conflicting relations are drawn with a dashed stroke.
    pub fn is_dashed(self) -> bool {
        matches!(self, Self::Alternative | Self::Contradictory)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

/// A point in canvas or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Point> for f32 {
    type Output = Point;

    fn mul(self, rhs: Point) -> Point {
        Point::new(self * rhs.x, self * rhs.y)
    }
}

/// When a node entered the literature. Only the year is ever consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedAt {
    Year(i32),
    Date(NaiveDate),
    Timestamp(DateTime<FixedOffset>),
}

impl CreatedAt {
    pub fn year(&self) -> i32 {
        match self {
            Self::Year(y) => *y,
            Self::Date(d) => d.year(),
            Self::Timestamp(t) => t.year(),
        }
    }
}

/// A unit of research content on the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: String,
    pub node_type: NodeType,
    pub title: String,
    pub parent_id: Option<String>,
    pub position: Point,
    pub paper_count: u32,
    pub is_foundational: bool,
    pub what: String,
    pub how: Vec<String>,
    pub gaps: Vec<String>,
    pub papers: Vec<String>,
    pub created_at: CreatedAt,
}

impl TreeNode {
    /// A bare node with empty descriptive content, used by tests and the demo tree.
    pub fn new(id: impl Into<String>, node_type: NodeType, created_at: CreatedAt) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            node_type,
            parent_id: None,
            position: Point::ORIGIN,
            paper_count: 0,
            is_foundational: false,
            what: String::new(),
            how: Vec::new(),
            gaps: Vec::new(),
            papers: Vec::new(),
            created_at,
        }
    }
}

/// A typed, strength-weighted edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    pub connection_type: ConnectionType,
    pub strength: Strength,
}

/// A top-level domain label. Not a containment relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("duplicate node id `{0}`")]
    DuplicateNodeId(String),
    #[error("duplicate connection id `{0}`")]
    DuplicateConnectionId(String),
    #[error("duplicate branch id `{0}`")]
    DuplicateBranchId(String),
    #[error("parent chain of node `{0}` forms a cycle")]
    ParentCycle(String),
}

/// Aggregate counts shown in the canvas header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub nodes: usize,
    pub connections: usize,
    pub branches: usize,
    pub gaps: usize,
    pub foundational: usize,
    pub papers: u64,
}

/// An immutable snapshot of the knowledge tree.
///
/// Node order is the order the snapshot was delivered in; it is preserved for
/// rendering and for timeline grouping. Lookups go through an id index.
#[derive(Debug, Clone, Default)]
pub struct TreeModel {
    nodes: Vec<TreeNode>,
    connections: Vec<Connection>,
    branches: Vec<Branch>,
    index: HashMap<String, usize>,
}

impl TreeModel {
    /// Build a model, rejecting duplicate ids and parent cycles.
    ///
    /// Dangling `parent_id` and connection endpoints are accepted; they are
    /// skipped at render time.
    pub fn new(
        nodes: Vec<TreeNode>,
        connections: Vec<Connection>,
        branches: Vec<Branch>,
    ) -> Result<Self, ModelError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), idx).is_some() {
                return Err(ModelError::DuplicateNodeId(node.id.clone()));
            }
        }

        let mut seen = HashSet::with_capacity(connections.len());
        for conn in &connections {
            if !seen.insert(conn.id.as_str()) {
                return Err(ModelError::DuplicateConnectionId(conn.id.clone()));
            }
        }

        let mut seen = HashSet::with_capacity(branches.len());
        for branch in &branches {
            if !seen.insert(branch.id.as_str()) {
                return Err(ModelError::DuplicateBranchId(branch.id.clone()));
            }
        }

        let model = Self {
            nodes,
            connections,
            branches,
            index,
        };
        model.check_parent_cycles()?;
        Ok(model)
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Position of a node in snapshot order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Resolved parent of a node, `None` for roots and dangling parents.
    pub fn parent_of(&self, node: &TreeNode) -> Option<&TreeNode> {
        node.parent_id.as_deref().and_then(|pid| self.get(pid))
    }

    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a TreeNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_deref() == Some(id))
    }

    /// Nodes without a resolvable parent.
    pub fn roots(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|n| self.parent_of(n).is_none())
    }

    /// Explicit connections touching a node, in snapshot order.
    pub fn connections_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections
            .iter()
            .filter(move |c| c.from_node_id == id || c.to_node_id == id)
    }

    /// Nodes whose `parent_id` points at a missing node.
    pub fn dangling_parents(&self) -> Vec<&TreeNode> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.parent_id.as_deref(), Some(pid) if !self.contains(pid)))
            .collect()
    }

    /// Connections with at least one missing endpoint.
    pub fn dangling_connections(&self) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|c| !self.contains(&c.from_node_id) || !self.contains(&c.to_node_id))
            .collect()
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            nodes: self.nodes.len(),
            connections: self.connections.len(),
            branches: self.branches.len(),
            gaps: self.nodes.iter().map(|n| n.gaps.len()).sum(),
            foundational: self.nodes.iter().filter(|n| n.is_foundational).count(),
            papers: self.nodes.iter().map(|n| u64::from(n.paper_count)).sum(),
        }
    }

    fn check_parent_cycles(&self) -> Result<(), ModelError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        for start in 0..self.nodes.len() {
            let mut path = Vec::new();
            let mut cursor = Some(start);
            while let Some(idx) = cursor {
                match marks[idx] {
                    Mark::Done => break,
                    Mark::OnPath => return Err(ModelError::ParentCycle(self.nodes[idx].id.clone())),
                    Mark::Unvisited => {
                        marks[idx] = Mark::OnPath;
                        path.push(idx);
                        cursor = self.nodes[idx]
                            .parent_id
                            .as_deref()
                            .and_then(|pid| self.index_of(pid));
                    }
                }
            }
            for idx in path {
                marks[idx] = Mark::Done;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, parent: Option<&str>) -> TreeNode {
        let mut n = TreeNode::new(id, NodeType::Problem, CreatedAt::Year(2020));
        n.parent_id = parent.map(ToString::to_string);
        n
    }

    fn conn(id: &str, from: &str, to: &str) -> Connection {
        Connection {
            id: id.to_string(),
            from_node_id: from.to_string(),
            to_node_id: to.to_string(),
            connection_type: ConnectionType::Supporting,
            strength: Strength::Moderate,
        }
    }

    #[test]
    fn lookup_by_id_uses_index() {
        let model = TreeModel::new(vec![node("a", None), node("b", Some("a"))], vec![], vec![])
            .unwrap();
        assert_eq!(model.get("b").unwrap().parent_id.as_deref(), Some("a"));
        assert_eq!(model.index_of("b"), Some(1));
        assert!(model.get("zzz").is_none());
    }

    #[test]
    fn duplicate_node_ids_are_rejected() {
        let err = TreeModel::new(vec![node("a", None), node("a", None)], vec![], vec![])
            .unwrap_err();
        assert_eq!(err, ModelError::DuplicateNodeId("a".into()));
    }

    #[test]
    fn duplicate_connection_ids_are_rejected() {
        let err = TreeModel::new(
            vec![node("a", None), node("b", None)],
            vec![conn("c1", "a", "b"), conn("c1", "b", "a")],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, ModelError::DuplicateConnectionId("c1".into()));
    }

    #[test]
    fn parent_cycles_are_rejected() {
        let err = TreeModel::new(
            vec![node("a", Some("c")), node("b", Some("a")), node("c", Some("b"))],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::ParentCycle(_)));

        let err = TreeModel::new(vec![node("self", Some("self"))], vec![], vec![]).unwrap_err();
        assert_eq!(err, ModelError::ParentCycle("self".into()));
    }

    #[test]
    fn shared_ancestors_are_not_cycles() {
        let model = TreeModel::new(
            vec![
                node("root", None),
                node("a", Some("root")),
                node("b", Some("root")),
                node("c", Some("a")),
            ],
            vec![],
            vec![],
        );
        assert!(model.is_ok());
    }

    #[test]
    fn dangling_references_are_accepted_and_reported() {
        let model = TreeModel::new(
            vec![node("a", None), node("b", Some("ghost"))],
            vec![conn("c1", "a", "b"), conn("c2", "a", "99")],
            vec![],
        )
        .unwrap();
        let parents: Vec<&str> = model.dangling_parents().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(parents, vec!["b"]);
        let conns: Vec<&str> = model
            .dangling_connections()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(conns, vec!["c2"]);
        // A node with a dangling parent is treated as a root.
        assert_eq!(model.roots().count(), 2);
    }

    #[test]
    fn children_and_connections_follow_snapshot_order() {
        let model = TreeModel::new(
            vec![node("r", None), node("x", Some("r")), node("y", Some("r"))],
            vec![conn("c1", "x", "y"), conn("c2", "r", "x")],
            vec![],
        )
        .unwrap();
        let kids: Vec<&str> = model.children("r").map(|n| n.id.as_str()).collect();
        assert_eq!(kids, vec!["x", "y"]);
        let touching: Vec<&str> = model.connections_of("x").map(|c| c.id.as_str()).collect();
        assert_eq!(touching, vec!["c1", "c2"]);
    }

    #[test]
    fn stats_sum_gaps_and_papers() {
        let mut a = node("a", None);
        a.gaps = vec!["g1".into(), "g2".into()];
        a.paper_count = 4;
        a.is_foundational = true;
        let mut b = node("b", None);
        b.gaps = vec!["g3".into()];
        b.paper_count = 6;
        let model = TreeModel::new(
            vec![a, b],
            vec![],
            vec![Branch {
                id: "ml".into(),
                name: "Machine Learning".into(),
            }],
        )
        .unwrap();
        let stats = model.stats();
        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.branches, 1);
        assert_eq!(stats.gaps, 3);
        assert_eq!(stats.foundational, 1);
        assert_eq!(stats.papers, 10);
    }

    #[test]
    fn created_at_year_from_every_form() {
        assert_eq!(CreatedAt::Year(2019).year(), 2019);
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(CreatedAt::Date(date).year(), 2021);
        let ts = DateTime::parse_from_rfc3339("2018-12-31T23:00:00-02:00").unwrap();
        assert_eq!(CreatedAt::Timestamp(ts).year(), 2018);
    }

    #[test]
    fn node_and_connection_tags_parse_from_wire_names() {
        assert_eq!("mechanism".parse::<NodeType>().unwrap(), NodeType::Mechanism);
        assert!("theory".parse::<NodeType>().is_err());
        assert!("contradictory".parse::<ConnectionType>().unwrap().is_dashed());
        assert!(!ConnectionType::Supporting.is_dashed());
        assert_eq!(Strength::Strong.to_string(), "strong");
    }
}
