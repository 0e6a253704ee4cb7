//! Resolve parent links and explicit connections into drawable strokes.

use tracing::debug;

use crate::tree::model::{ConnectionType, Point, TreeModel};
use crate::tree::style::{self, Dash};

/// Draw order: parent links sit beneath explicit connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeLayer {
    Hierarchy,
    Connection,
}

/// A single stroke in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePrimitive {
    /// Connection id, or `parent-<child id>` for hierarchy links.
    pub id: String,
    pub from_node: String,
    pub to_node: String,
    pub from: Point,
    pub to: Point,
    pub width: f32,
    pub dash: Dash,
    pub layer: EdgeLayer,
    /// `None` for hierarchy links.
    pub kind: Option<ConnectionType>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSet {
    pub primitives: Vec<EdgePrimitive>,
    /// Edges dropped because an endpoint is missing from the model.
    pub skipped: usize,
}

/// Resolve every edge of the model.
///
/// Hierarchy links come first, in node order, followed by explicit
/// connections in snapshot order. An edge with a missing endpoint is skipped
/// and counted; it never produces a partial stroke.
pub fn resolve(model: &TreeModel) -> EdgeSet {
    let mut set = EdgeSet::default();

    for node in model.nodes() {
        let Some(parent_id) = node.parent_id.as_deref() else {
            continue;
        };
        match model.get(parent_id) {
            Some(parent) => set.primitives.push(EdgePrimitive {
                id: format!("parent-{}", node.id),
                from_node: parent.id.clone(),
                to_node: node.id.clone(),
                from: parent.position,
                to: node.position,
                width: style::PARENT_STROKE_WIDTH,
                dash: Dash::Solid,
                layer: EdgeLayer::Hierarchy,
                kind: None,
            }),
            None => {
                debug!(node = %node.id, parent = %parent_id, "skipping link to missing parent");
                set.skipped += 1;
            }
        }
    }

    for conn in model.connections() {
        let (Some(from), Some(to)) = (model.get(&conn.from_node_id), model.get(&conn.to_node_id))
        else {
            debug!(
                connection = %conn.id,
                from = %conn.from_node_id,
                to = %conn.to_node_id,
                "skipping connection with missing endpoint"
            );
            set.skipped += 1;
            continue;
        };
        set.primitives.push(EdgePrimitive {
            id: conn.id.clone(),
            from_node: from.id.clone(),
            to_node: to.id.clone(),
            from: from.position,
            to: to.position,
            width: style::stroke_width(conn.strength),
            dash: style::dash_for(conn.connection_type),
            layer: EdgeLayer::Connection,
            kind: Some(conn.connection_type),
        });
    }

    set
}

/// Split a stroke into its visible dash segments.
///
/// Solid strokes come back as one segment; zero-length strokes as none.
pub fn dash_segments(from: Point, to: Point, dash: Dash) -> Vec<(Point, Point)> {
    let pattern = dash.pattern();
    let length = from.distance(to);
    if length == 0.0 {
        return Vec::new();
    }
    if pattern.is_empty() {
        return vec![(from, to)];
    }

    let dir = Point::new((to.x - from.x) / length, (to.y - from.y) / length);
    let at = |t: f32| Point::new(from.x + dir.x * t, from.y + dir.y * t);

    let mut segments = Vec::new();
    let mut t = 0.0;
    let mut phase = 0;
    while t < length {
        let step = pattern[phase % pattern.len()];
        let end = (t + step).min(length);
        if phase % 2 == 0 {
            segments.push((at(t), at(end)));
        }
        t = end;
        phase += 1;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::model::{Connection, CreatedAt, NodeType, Strength, TreeNode};

    fn node(id: &str, parent: Option<&str>, x: f32) -> TreeNode {
        let mut n = TreeNode::new(id, NodeType::Solution, CreatedAt::Year(2020));
        n.parent_id = parent.map(ToString::to_string);
        n.position = Point::new(x, 0.0);
        n
    }

    fn conn(id: &str, from: &str, to: &str, t: ConnectionType, s: Strength) -> Connection {
        Connection {
            id: id.into(),
            from_node_id: from.into(),
            to_node_id: to.into(),
            connection_type: t,
            strength: s,
        }
    }

    #[test]
    fn parent_links_come_first_and_are_solid() {
        let model = TreeModel::new(
            vec![node("1", None, 0.0), node("2", Some("1"), 100.0)],
            vec![conn(
                "c",
                "2",
                "1",
                ConnectionType::Alternative,
                Strength::Weak,
            )],
            vec![],
        )
        .unwrap();
        let set = resolve(&model);
        assert_eq!(set.primitives.len(), 2);
        let parent = &set.primitives[0];
        assert_eq!(parent.layer, EdgeLayer::Hierarchy);
        assert_eq!(parent.dash, Dash::Solid);
        assert_eq!(parent.width, 3.0);
        assert_eq!(parent.from, Point::new(0.0, 0.0));
        assert_eq!(parent.to, Point::new(100.0, 0.0));
        assert_eq!(parent.kind, None);
        let explicit = &set.primitives[1];
        assert_eq!(explicit.layer, EdgeLayer::Connection);
        assert_eq!(explicit.dash, Dash::Dashed);
        assert_eq!(explicit.width, 2.0);
        assert_eq!(explicit.kind, Some(ConnectionType::Alternative));
    }

    #[test]
    fn dangling_connection_produces_nothing() {
        let model = TreeModel::new(
            vec![node("1", None, 0.0)],
            vec![conn(
                "c",
                "1",
                "99",
                ConnectionType::Supporting,
                Strength::Strong,
            )],
            vec![],
        )
        .unwrap();
        let set = resolve(&model);
        assert!(set.primitives.is_empty());
        assert_eq!(set.skipped, 1);
    }

    #[test]
    fn dangling_parent_produces_nothing() {
        let model =
            TreeModel::new(vec![node("orphan", Some("ghost"), 0.0)], vec![], vec![]).unwrap();
        let set = resolve(&model);
        assert!(set.primitives.is_empty());
        assert_eq!(set.skipped, 1);
    }

    #[test]
    fn strength_and_type_drive_stroke() {
        let model = TreeModel::new(
            vec![node("a", None, 0.0), node("b", None, 10.0)],
            vec![
                conn("s", "a", "b", ConnectionType::Supporting, Strength::Strong),
                conn("x", "a", "b", ConnectionType::Contradictory, Strength::Moderate),
                conn("e", "a", "b", ConnectionType::Extends, Strength::Weak),
            ],
            vec![],
        )
        .unwrap();
        let strokes: Vec<(f32, Dash)> = resolve(&model)
            .primitives
            .iter()
            .map(|p| (p.width, p.dash))
            .collect();
        assert_eq!(
            strokes,
            vec![(4.0, Dash::Solid), (3.0, Dash::Dashed), (2.0, Dash::Solid)]
        );
    }

    #[test]
    fn dash_segments_follow_pattern() {
        let segs = dash_segments(Point::new(0.0, 0.0), Point::new(30.0, 0.0), Dash::Dashed);
        assert_eq!(
            segs,
            vec![
                (Point::new(0.0, 0.0), Point::new(8.0, 0.0)),
                (Point::new(12.0, 0.0), Point::new(20.0, 0.0)),
                (Point::new(24.0, 0.0), Point::new(30.0, 0.0)),
            ]
        );
        let solid = dash_segments(Point::new(0.0, 0.0), Point::new(0.0, 5.0), Dash::Solid);
        assert_eq!(solid.len(), 1);
        assert!(dash_segments(Point::new(1.0, 1.0), Point::new(1.0, 1.0), Dash::Dashed).is_empty());
    }
}
