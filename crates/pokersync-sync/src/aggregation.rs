//! Vote aggregation: average, median, consensus and the distribution
//! shown on the results screen.
//!
//! Everything here is a pure function of its input. Non-numeric labels
//! (`"?"`, `"☕"`) are kept in the vote list and count toward consensus,
//! but never toward numeric aggregates.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{Vote, VotingResults};

/// Parse a card value as a finite number, if it is one.
pub fn numeric_value(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Shortest decimal rendering of a number (`5`, `6.5`, `0`).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

fn numeric_votes(votes: &[Vote]) -> Vec<f64> {
    votes.iter().filter_map(|v| numeric_value(&v.value)).collect()
}

fn median_of(sorted: &[f64]) -> f64 {
    let len = sorted.len();
    if len == 0 {
        return 0.0;
    }
    if len % 2 == 0 {
        (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0
    } else {
        sorted[len / 2]
    }
}

/// Compute the aggregate for a vote set. The input votes are carried over
/// unchanged, in order.
pub fn calculate_results(votes: &[Vote]) -> VotingResults {
    if votes.is_empty() {
        return VotingResults::default();
    }

    let mut numeric = numeric_votes(votes);
    let average = if numeric.is_empty() {
        0.0
    } else {
        numeric.iter().sum::<f64>() / numeric.len() as f64
    };

    numeric.sort_by(|a, b| a.total_cmp(b));
    let median = median_of(&numeric);

    let first = &votes[0];
    let consensus = votes.iter().all(|v| v.value == first.value);

    VotingResults {
        votes: votes.to_vec(),
        average,
        median: format_number(median),
        consensus,
        story_id: first.story_id.clone(),
    }
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Votes sharing one card value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteGroup {
    pub value: String,
    pub count: usize,
    pub voters: Vec<String>,
    /// Share of all votes, rounded to a whole percent.
    pub percentage: u32,
    /// The most common value, when it was picked more than once.
    pub is_popular: bool,
}

/// Group votes by value, most common first.
///
/// Ties are ordered numerically for numeric values, which sort ahead of
/// non-numeric labels; labels are ordered lexically.
pub fn vote_distribution(votes: &[Vote]) -> Vec<VoteGroup> {
    let mut groups: Vec<VoteGroup> = Vec::new();
    for vote in votes {
        match groups.iter_mut().find(|g| g.value == vote.value) {
            Some(group) => {
                group.count += 1;
                group.voters.push(vote.user_name.clone());
            }
            None => groups.push(VoteGroup {
                value: vote.value.clone(),
                count: 1,
                voters: vec![vote.user_name.clone()],
                percentage: 0,
                is_popular: false,
            }),
        }
    }

    let total = votes.len() as f64;
    let max_count = groups.iter().map(|g| g.count).max().unwrap_or(0);
    for group in &mut groups {
        group.percentage = ((group.count as f64 / total) * 100.0).round() as u32;
        group.is_popular = group.count == max_count && max_count > 1;
    }

    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| compare_values(&a.value, &b.value)));
    groups
}

fn compare_values(a: &str, b: &str) -> Ordering {
    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// `"min-max"` over numeric votes, `"0"` when there are none.
pub fn vote_spread(votes: &[Vote]) -> String {
    let numeric = numeric_votes(votes);
    let min = numeric.iter().copied().reduce(f64::min);
    let max = numeric.iter().copied().reduce(f64::max);
    match (min, max) {
        (Some(min), Some(max)) => format!("{}-{}", format_number(min), format_number(max)),
        _ => "0".to_string(),
    }
}

/// A one-line summary of how aligned the numeric votes are.
pub fn consensus_message(votes: &[Vote]) -> &'static str {
    let mut numeric = numeric_votes(votes);
    if numeric.is_empty() {
        return "No votes submitted";
    }
    numeric.sort_by(|a, b| a.total_cmp(b));
    numeric.dedup();
    match numeric.len() {
        1 => "Perfect consensus achieved!",
        2 => "Great alignment in the team",
        _ => "Consider discussing the differences",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(values: &[&str]) -> Vec<Vote> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Vote::new(format!("u{i}"), format!("User{i}"), *v, "story-1"))
            .collect()
    }

    #[test]
    fn empty_input_yields_zeroed_results() {
        let results = calculate_results(&[]);
        assert!(results.votes.is_empty());
        assert_eq!(results.average, 0.0);
        assert_eq!(results.median, "0");
        assert!(!results.consensus);
        assert_eq!(results.story_id, "");
    }

    #[test]
    fn unanimous_votes_reach_consensus() {
        let results = calculate_results(&votes(&["5", "5", "5"]));
        assert_eq!(results.average, 5.0);
        assert_eq!(results.median, "5");
        assert!(results.consensus);
    }

    #[test]
    fn even_count_median_is_mean_of_middle_pair() {
        let results = calculate_results(&votes(&["3", "5", "8", "13"]));
        assert_eq!(results.median, "6.5");
        assert_eq!(results.average, 7.25);
        assert!(!results.consensus);
    }

    #[test]
    fn non_numeric_votes_are_excluded_from_numbers() {
        let results = calculate_results(&votes(&["2", "?", "5"]));
        assert_eq!(results.average, 3.5);
        assert_eq!(results.median, "3.5");
        assert!(!results.consensus);
        assert_eq!(results.votes.len(), 3);
    }

    #[test]
    fn only_non_numeric_votes() {
        let results = calculate_results(&votes(&["?", "☕"]));
        assert_eq!(results.average, 0.0);
        assert_eq!(results.median, "0");
        assert!(!results.consensus);
    }

    #[test]
    fn non_numeric_consensus_counts() {
        let results = calculate_results(&votes(&["☕", "☕"]));
        assert!(results.consensus);
        assert_eq!(results.median, "0");
    }

    #[test]
    fn single_vote_is_consensus() {
        let results = calculate_results(&votes(&["8"]));
        assert!(results.consensus);
        assert_eq!(results.median, "8");
    }

    #[test]
    fn odd_count_median_uses_sorted_middle() {
        let results = calculate_results(&votes(&["13", "1", "5"]));
        assert_eq!(results.median, "5");
    }

    #[test]
    fn votes_are_preserved_in_order() {
        let input = votes(&["13", "?", "1", "5"]);
        let results = calculate_results(&input);
        assert_eq!(results.votes, input);
    }

    #[test]
    fn story_id_comes_from_first_vote() {
        let mut input = votes(&["1", "2"]);
        input[0].story_id = "first".into();
        input[1].story_id = "second".into();
        assert_eq!(calculate_results(&input).story_id, "first");
    }

    #[test]
    fn calculation_is_reproducible() {
        let input = votes(&["3", "8", "?"]);
        assert_eq!(calculate_results(&input), calculate_results(&input));
    }

    #[test]
    fn numeric_value_rejects_non_finite() {
        assert_eq!(numeric_value("5"), Some(5.0));
        assert_eq!(numeric_value(" 0.5 "), Some(0.5));
        assert_eq!(numeric_value("?"), None);
        assert_eq!(numeric_value("inf"), None);
        assert_eq!(numeric_value("NaN"), None);
    }

    #[test]
    fn format_number_is_shortest() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(6.5), "6.5");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn distribution_groups_and_ranks() {
        let dist = vote_distribution(&votes(&["5", "8", "5", "?", "3"]));
        assert_eq!(dist[0].value, "5");
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[0].percentage, 40);
        assert!(dist[0].is_popular);
        assert_eq!(dist[0].voters, vec!["User0", "User2"]);

        let rest: Vec<&str> = dist[1..].iter().map(|g| g.value.as_str()).collect();
        assert_eq!(rest, vec!["3", "8", "?"]);
        assert!(dist[1..].iter().all(|g| !g.is_popular));
    }

    #[test]
    fn distribution_without_repeats_has_no_popular_value() {
        let dist = vote_distribution(&votes(&["1", "2"]));
        assert!(dist.iter().all(|g| !g.is_popular));
        assert!(dist.iter().all(|g| g.percentage == 50));
    }

    #[test]
    fn distribution_of_nothing_is_empty() {
        assert!(vote_distribution(&[]).is_empty());
    }

    #[test]
    fn spread_covers_numeric_range() {
        assert_eq!(vote_spread(&votes(&["8", "?", "2", "13"])), "2-13");
        assert_eq!(vote_spread(&votes(&["?"])), "0");
    }

    #[test]
    fn consensus_messages() {
        assert_eq!(consensus_message(&votes(&["5", "5"])), "Perfect consensus achieved!");
        assert_eq!(consensus_message(&votes(&["5", "8", "5"])), "Great alignment in the team");
        assert_eq!(
            consensus_message(&votes(&["1", "5", "13"])),
            "Consider discussing the differences"
        );
        assert_eq!(consensus_message(&votes(&["?"])), "No votes submitted");
    }
}
