//! Year-grouped projection of the tree for the timeline view.

use std::collections::BTreeMap;

use crate::tree::model::{TreeModel, TreeNode};

#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup<'a> {
    pub year: i32,
    pub nodes: Vec<&'a TreeNode>,
}

impl YearGroup<'_> {
    pub fn developments(&self) -> usize {
        self.nodes.len()
    }

    pub fn methods(&self) -> usize {
        self.nodes.iter().map(|n| n.how.len()).sum()
    }

    pub fn gaps(&self) -> usize {
        self.nodes.iter().map(|n| n.gaps.len()).sum()
    }
}

/// Partition the nodes by creation year.
///
/// Groups are ascending by year; inside a group nodes keep snapshot order.
pub fn group_by_year(model: &TreeModel) -> Vec<YearGroup<'_>> {
    let mut by_year: BTreeMap<i32, Vec<&TreeNode>> = BTreeMap::new();
    for node in model.nodes() {
        by_year.entry(node.created_at.year()).or_default().push(node);
    }
    by_year
        .into_iter()
        .map(|(year, nodes)| YearGroup { year, nodes })
        .collect()
}

/// `1 development`, `3 developments`.
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::model::{CreatedAt, NodeType};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn node(id: &str, year: i32) -> TreeNode {
        TreeNode::new(id, NodeType::Gap, CreatedAt::Year(year))
    }

    fn ids<'a>(group: &YearGroup<'a>) -> Vec<&'a str> {
        group.nodes.iter().map(|&n| n.id.as_str()).collect()
    }

    #[test]
    fn groups_ascend_and_keep_insertion_order() {
        let model = TreeModel::new(
            vec![
                node("c", 2021),
                node("a", 2019),
                node("d", 2021),
                node("b", 2019),
                node("e", 2020),
            ],
            vec![],
            vec![],
        )
        .unwrap();
        let groups = group_by_year(&model);
        let years: Vec<i32> = groups.iter().map(|g| g.year).collect();
        assert_eq!(years, vec![2019, 2020, 2021]);
        assert_eq!(ids(&groups[0]), vec!["a", "b"]);
        assert_eq!(ids(&groups[1]), vec!["e"]);
        assert_eq!(ids(&groups[2]), vec!["c", "d"]);
    }

    #[test]
    fn empty_model_has_no_groups() {
        assert!(group_by_year(&TreeModel::default()).is_empty());
    }

    #[test]
    fn summaries_count_methods_and_gaps() {
        let mut a = node("a", 2020);
        a.how = vec!["m1".into(), "m2".into()];
        a.gaps = vec!["g".into()];
        let mut b = node("b", 2020);
        b.how = vec!["m3".into()];
        let model = TreeModel::new(vec![a, b], vec![], vec![]).unwrap();
        let groups = group_by_year(&model);
        assert_eq!(groups[0].developments(), 2);
        assert_eq!(groups[0].methods(), 3);
        assert_eq!(groups[0].gaps(), 1);
        assert_eq!(plural(1, "gap", "gaps"), "1 gap");
        assert_eq!(plural(2, "gap", "gaps"), "2 gaps");
    }

    proptest! {
        #[test]
        fn groups_partition_the_nodes(years in prop::collection::vec(1900i32..2100, 0..60)) {
            let nodes: Vec<TreeNode> = years
                .iter()
                .enumerate()
                .map(|(i, y)| node(&format!("n{i}"), *y))
                .collect();
            let model = TreeModel::new(nodes, vec![], vec![]).unwrap();
            let groups = group_by_year(&model);

            for pair in groups.windows(2) {
                prop_assert!(pair[0].year < pair[1].year);
            }

            let mut seen: HashMap<&str, usize> = HashMap::new();
            for group in &groups {
                prop_assert!(!group.nodes.is_empty());
                for n in &group.nodes {
                    prop_assert_eq!(n.created_at.year(), group.year);
                    *seen.entry(n.id.as_str()).or_default() += 1;
                }
            }
            prop_assert_eq!(seen.len(), years.len());
            prop_assert!(seen.values().all(|&c| c == 1));

            // Within a group, snapshot order is preserved.
            for group in &groups {
                let idx: Vec<usize> = group
                    .nodes
                    .iter()
                    .map(|n| model.index_of(&n.id).unwrap())
                    .collect();
                prop_assert!(idx.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
