//! Free-text search shared by every paired-log view.

use crate::pairing::PairedTransaction;

/// Case-insensitive substring match over the given fields joined by spaces.
///
/// A blank query matches everything. Missing fields are skipped.
pub fn text_matches<'a, I>(query: &str, fields: I) -> bool
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let haystack = fields
        .into_iter()
        .flatten()
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    haystack.contains(&needle)
}

/// Returns true if `query` matches the transaction's employee, tool, or times.
pub fn matches_transaction(query: &str, pair: &PairedTransaction) -> bool {
    text_matches(
        query,
        [
            Some(pair.employee_id_number.as_str()),
            Some(pair.tool_name.as_str()),
            Some(pair.tool_number.as_str()),
            Some(pair.borrow_time.as_str()),
            pair.return_time.as_ref().map(|t| t.as_str()),
        ],
    )
}

/// Keeps the transactions matching `query`, preserving order.
pub fn filter_transactions<'a>(
    pairs: &'a [PairedTransaction],
    query: &str,
) -> Vec<&'a PairedTransaction> {
    pairs
        .iter()
        .filter(|pair| matches_transaction(query, pair))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{borrow, ret};
    use crate::pairing::pair_logs;

    fn sample() -> Vec<PairedTransaction> {
        pair_logs(&[
            borrow(1, 1, 1, "2024-01-01 09:00:00"),
            ret(2, 1, 1, "2024-01-02 10:00:00"),
            borrow(3, 2, 2, "2024-01-03 09:00:00"),
        ])
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let pairs = sample();
        for query in ["", "   ", "\t"] {
            let filtered = filter_transactions(&pairs, query);
            assert_eq!(filtered.len(), pairs.len());
            assert!(filtered.iter().zip(&pairs).all(|(a, b)| *a == b));
        }
    }

    #[test]
    fn matches_case_insensitively() {
        let pairs = sample();
        let filtered = filter_transactions(&pairs, "tool 2");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].tool_number, "T2");

        assert_eq!(filter_transactions(&pairs, "  e1 ").len(), 1);
    }

    #[test]
    fn matches_return_time() {
        let pairs = sample();
        let filtered = filter_transactions(&pairs, "2024-01-02");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].borrow_id.get(), 1);
    }

    #[test]
    fn match_spans_joined_fields() {
        // Employee number and tool name are joined with a space.
        let pairs = sample();
        assert_eq!(filter_transactions(&pairs, "e2 tool").len(), 1);
    }

    #[test]
    fn no_match_yields_empty() {
        let pairs = sample();
        assert!(filter_transactions(&pairs, "micrometer").is_empty());
    }

    #[test]
    fn text_matches_skips_missing_fields() {
        assert!(text_matches("b", [None, Some("a b")]));
        assert!(!text_matches("x", [None, None]));
        assert!(text_matches("", [None]));
    }
}
