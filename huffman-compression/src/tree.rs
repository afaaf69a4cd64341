use std::{cmp::Ordering, collections::BinaryHeap};

use itertools::Itertools;
use log::debug;

use crate::frequency::FrequencyTable;

/// A node of the prefix tree. Leaves carry a symbol, internal nodes own both children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        ch: char,
        count: usize,
    },
    Internal {
        weight: usize,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn weight(&self) -> usize {
        match self {
            Node::Leaf { ch: _, count } => *count,
            Node::Internal { weight, .. } => *weight,
        }
    }
}

/// Result of the greedy merge.
///
/// Equal weights are broken by creation order: leaves are created in ascending
/// symbol order, merged nodes after them, and the first node popped becomes the
/// left child. The bit patterns this produces are specific to that rule; other
/// Huffman implementations may assign different (equally optimal) codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    /// Nothing to encode.
    Empty,
    /// Exactly one distinct symbol. The leaf sits under a synthetic root as its
    /// left child, so its code is `0` instead of the empty path.
    Lone(Node),
    Merged(Node),
}

impl Tree {
    pub fn build(frequencies: &FrequencyTable) -> Self {
        let forest = Forest::from_iter(
            frequencies
                .iter()
                .sorted_by_key(|&(ch, _)| ch)
                .map(|(ch, count)| Node::Leaf { ch, count }),
        );
        let tree = forest.merge();
        debug!(
            "built prefix tree over {} symbols with weight {}",
            frequencies.len(),
            tree.weight()
        );
        tree
    }

    pub fn weight(&self) -> usize {
        match self {
            Tree::Empty => 0,
            Tree::Lone(node) | Tree::Merged(node) => node.weight(),
        }
    }
}

/// Heap entry; `sequence` gives equal weights a stable order.
#[derive(Debug)]
struct Pending {
    node: Node,
    sequence: usize,
}

// BinaryHeap is a max-heap, so the ordering is reversed to pop the lightest node first.
impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .node
            .weight()
            .cmp(&self.node.weight())
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Pending {}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

struct Forest {
    heap: BinaryHeap<Pending>,
    next_sequence: usize,
}

impl FromIterator<Node> for Forest {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        let heap: BinaryHeap<_> = iter
            .into_iter()
            .enumerate()
            .map(|(sequence, node)| Pending { node, sequence })
            .collect();
        let next_sequence = heap.len();
        Self {
            heap,
            next_sequence,
        }
    }
}

impl Forest {
    fn merge(mut self) -> Tree {
        loop {
            let Some(result) = self.pop_lowest() else {
                return Tree::Empty;
            };
            match result {
                PopResult::TreesToMerge {
                    lowest,
                    second_lowest,
                } => {
                    let weight = lowest.weight() + second_lowest.weight();
                    self.insert(Node::Internal {
                        weight,
                        left: Box::new(lowest),
                        right: Box::new(second_lowest),
                    });
                }
                PopResult::Single(node @ Node::Leaf { .. }) => return Tree::Lone(node),
                PopResult::Single(node) => return Tree::Merged(node),
            }
        }
    }

    fn pop_lowest(&mut self) -> Option<PopResult> {
        let lowest = self.heap.pop()?.node;

        let item_result = match self.heap.pop() {
            Some(second_lowest) => PopResult::TreesToMerge {
                lowest,
                second_lowest: second_lowest.node,
            },
            None => PopResult::Single(lowest),
        };

        Some(item_result)
    }

    fn insert(&mut self, node: Node) {
        self.heap.push(Pending {
            node,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
    }
}

enum PopResult {
    TreesToMerge { lowest: Node, second_lowest: Node },
    Single(Node),
}

#[cfg(test)]
mod tests {
    use crate::frequency::FrequencyTable;

    use super::{Node, Tree};

    fn leaves(node: &Node) -> usize {
        match node {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => leaves(left) + leaves(right),
        }
    }

    #[test]
    fn test_merging() {
        // char_mapping test data comes from
        // https://opendsa-server.cs.vt.edu/ODSA/Books/CS3/html/Huffman.html
        let char_mapping = [
            ('Z', 2),
            ('K', 7),
            ('M', 24),
            ('C', 32),
            ('U', 37),
            ('D', 42),
            ('L', 42),
            ('E', 120),
        ];

        let tree = Tree::build(&char_mapping.into_iter().collect());
        assert_eq!(tree.weight(), 306);
        match tree {
            Tree::Merged(root) => assert_eq!(leaves(&root), 8),
            other => panic!("expected a merged tree, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_frequencies() {
        assert_eq!(Tree::build(&FrequencyTable::default()), Tree::Empty);
    }

    #[test]
    fn test_single_symbol_is_wrapped() {
        let tree = Tree::build(&[('x', 5)].into_iter().collect());
        assert_eq!(tree, Tree::Lone(Node::Leaf { ch: 'x', count: 5 }));
    }

    #[test]
    fn test_lightest_nodes_merge_first() {
        let tree = Tree::build(&[('a', 3), ('b', 1)].into_iter().collect());
        let Tree::Merged(Node::Internal {
            weight,
            left,
            right,
        }) = tree
        else {
            panic!("expected an internal root");
        };
        assert_eq!(weight, 4);
        assert_eq!(*left, Node::Leaf { ch: 'b', count: 1 });
        assert_eq!(*right, Node::Leaf { ch: 'a', count: 3 });
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let frequencies: FrequencyTable = [('c', 2), ('a', 2), ('b', 2)].into_iter().collect();
        assert_eq!(Tree::build(&frequencies), Tree::build(&frequencies));
    }
}
