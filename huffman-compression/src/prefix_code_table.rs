use std::collections::{BTreeMap, HashMap};

use bit_vec::BitVec;
use itertools::Itertools;

use crate::{
    frequency::{self, FrequencyTable},
    tree::{Node, Tree},
};

/// Builds the code table for `content` in one go.
pub fn generate_codes(content: &str) -> CodeTable {
    CodeTable::from_tree(&Tree::build(&frequency::count(content)))
}

/// Symbol to root-to-leaf path, `false` = left, `true` = right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable(BTreeMap<char, BitVec>);

impl CodeTable {
    pub fn from_tree(tree: &Tree) -> Self {
        let mut codes = BTreeMap::new();
        match tree {
            Tree::Empty => {}
            Tree::Lone(leaf) => {
                generate_codes_inner(leaf, &mut BitVec::from_elem(1, false), &mut codes)
            }
            Tree::Merged(root) => generate_codes_inner(root, &mut BitVec::new(), &mut codes),
        }
        Self(codes)
    }

    pub fn get(&self, ch: char) -> Option<&BitVec> {
        self.0.get(&ch)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &BitVec)> {
        self.0.iter().map(|(&ch, code)| (ch, code))
    }

    pub(crate) fn insert(&mut self, ch: char, code: BitVec) -> Option<BitVec> {
        self.0.insert(ch, code)
    }

    /// Number of bits needed to encode every counted symbol.
    pub fn encoded_size(&self, frequencies: &FrequencyTable) -> usize {
        frequencies
            .iter()
            .map(|(ch, count)| count * self.get(ch).map_or(0, BitVec::len))
            .sum()
    }

    pub fn inverse(&self) -> HashMap<BitVec, char> {
        self.0
            .iter()
            .map(|(&ch, code)| (code.clone(), ch))
            .collect()
    }

    /// True when no code is a prefix of another one.
    ///
    /// After sorting, a prefix always sorts directly before some code it prefixes,
    /// so checking neighbours is enough.
    pub fn is_prefix_free(&self) -> bool {
        self.0
            .values()
            .map(code_to_string)
            .sorted()
            .tuple_windows()
            .all(|(shorter, longer): (String, String)| !longer.starts_with(&shorter))
    }
}

impl FromIterator<(char, BitVec)> for CodeTable {
    fn from_iter<T: IntoIterator<Item = (char, BitVec)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub fn code_to_string(code: &BitVec) -> String {
    code.iter().map(|bit| if bit { '1' } else { '0' }).collect()
}

fn generate_codes_inner(
    node: &Node,
    current_code: &mut BitVec,
    result: &mut BTreeMap<char, BitVec>,
) {
    match node {
        Node::Leaf { ch, count: _ } => {
            result.insert(*ch, current_code.clone());
        }
        Node::Internal { left, right, .. } => {
            current_code.push(false);
            generate_codes_inner(left, current_code, result);
            current_code.pop();
            current_code.push(true);
            generate_codes_inner(right, current_code, result);
            current_code.pop();
        }
    }
}
