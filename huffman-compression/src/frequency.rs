use std::collections::HashMap;

use itertools::Itertools;
use log::trace;

/// Occurrence count of every distinct symbol in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable(HashMap<char, usize>);

pub fn count(content: &str) -> FrequencyTable {
    let mapping = content
        .chars()
        .into_grouping_map_by(|&x| x)
        .fold(0, |acc, _key, _value| acc + 1);
    trace!("counted {} distinct symbols", mapping.len());
    FrequencyTable(mapping)
}

impl FrequencyTable {
    pub fn get(&self, symbol: char) -> Option<usize> {
        self.0.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.0.iter().map(|(&ch, &count)| (ch, count))
    }

    /// Total number of symbols counted.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl FromIterator<(char, usize)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (char, usize)>>(iter: T) -> Self {
        Self(iter.into_iter().filter(|&(_, count)| count > 0).collect())
    }
}
