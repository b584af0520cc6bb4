use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::ops::Index;

/// The ordered collection of rendered strings produced by one evaluation.
///
/// Index 0 always holds the sentinel: the root context's rendered value, which is the empty
/// string unless the query operated on the whole document (a pipeline of literal stages only).
/// Indices 1..N hold the matched nodes' rendered values in document order. The sentinel is a
/// deliberate invariant, kept as a real leading element rather than special-cased accessors.
///
/// A `QueryResult` is immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryResult {
    values: Vec<String>,
}

impl QueryResult {
    /// `values[0]` is the sentinel; the rest are matches in document order.
    pub(crate) fn new(values: Vec<String>) -> Self {
        debug_assert!(!values.is_empty(), "a result always holds at least the sentinel");
        Self { values }
    }

    /// The matched values, excluding the leading sentinel.
    pub fn values(&self) -> &[String] {
        &self.values[1..]
    }

    /// All matched values joined with newlines.
    pub fn text(&self) -> String {
        self.values().join("\n")
    }

    /// The number of entries, sentinel included: always `values().len() + 1`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True iff the query matched nothing.
    pub fn is_empty(&self) -> bool {
        self.values.len() == 1
    }

    /// Index 0 is the sentinel; 1..N are matches. `None` when out of range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Iterates the sentinel first, then the matches in document order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

impl Index<usize> for QueryResult {
    type Output = str;

    /// Panics when `index` is out of range, like slice indexing.
    fn index(&self, index: usize) -> &Self::Output {
        match self.values.get(index) {
            Some(value) => value,
            None => panic!("index {index} out of range for result of length {}", self.values.len()),
        }
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter().map(String::as_str)
    }
}

/// Serializes as a JSON array of the matched values; the sentinel is an evaluation artifact, not
/// data, so it is not included.
impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values = self.values();
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> QueryResult {
        QueryResult::new(vec![
            String::new(),
            "## Section 1".to_string(),
            "## Section 2".to_string(),
        ])
    }

    #[test]
    fn length_counts_sentinel() {
        assert_eq!(result().len(), 3);
        assert_eq!(result().values().len(), 2);
    }

    #[test]
    fn index_zero_is_sentinel() {
        let result = result();
        assert_eq!(&result[0], "");
        assert_eq!(&result[1], "## Section 1");
        assert_eq!(&result[2], "## Section 2");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_panics() {
        let _ = &result()[10];
    }

    #[test]
    fn iteration_yields_sentinel_first() {
        let binding = result();
        let collected: Vec<&str> = binding.iter().collect();
        assert_eq!(collected, vec!["", "## Section 1", "## Section 2"]);
    }

    #[test]
    fn text_joins_matches_only() {
        assert_eq!(result().text(), "## Section 1\n## Section 2");
    }

    #[test]
    fn serializes_without_sentinel() {
        let json = serde_json::to_string(&result()).unwrap();
        assert_eq!(json, r###"["## Section 1","## Section 2"]"###);
    }

    #[test]
    fn empty_result_still_has_sentinel() {
        let empty = QueryResult::new(vec![String::new()]);
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 1);
        assert_eq!(empty.text(), "");
    }
}
