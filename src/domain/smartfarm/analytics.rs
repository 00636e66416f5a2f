//! Aggregates over the main evaluation sheet.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::sheets::record::Record;
use crate::domain::sheets::schema::clients;

use super::cell_is;
use super::rubric::{Branch, EvaluationCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub client_id: String,
    pub client_name: String,
    pub branch: String,
    pub category: String,
    pub score: f64,
    pub timestamp: String,
}

impl LeaderboardEntry {
    fn from_record(record: &Record) -> Self {
        Self {
            client_id: record.text(clients::CLIENT_ID).to_string(),
            client_name: record.text(clients::CLIENT_NAME).to_string(),
            branch: record.text(clients::BRANCH).to_string(),
            category: record.text(clients::CATEGORY).to_string(),
            score: record.number(clients::TOTAL_SCORE),
            timestamp: record.text(clients::TIMESTAMP).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaderboardFilter {
    pub category: Option<EvaluationCategory>,
    pub branch: Option<Branch>,
}

impl LeaderboardFilter {
    fn accepts(&self, entry: &LeaderboardEntry) -> bool {
        cell_is(self.category.as_ref(), &entry.category) && cell_is(self.branch.as_ref(), &entry.branch)
    }
}

/// Evaluations sorted by score, highest first. Ties keep sheet order.
pub fn leaderboard(records: &[Record], filter: &LeaderboardFilter) -> Vec<LeaderboardEntry> {
    let mut entries = records
        .iter()
        .map(LeaderboardEntry::from_record)
        .filter(|e| filter.accepts(e))
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    entries
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub clients_evaluated: usize,
    pub evaluations: usize,
    pub average_score: f64,
    pub leader: Option<LeaderboardEntry>,
}

pub fn overview(records: &[Record]) -> Overview {
    let board = leaderboard(records, &LeaderboardFilter::default());
    let mut ids = board.iter().map(|e| e.client_id.as_str()).collect::<Vec<_>>();
    ids.sort_unstable();
    ids.dedup();

    let average_score = if board.is_empty() {
        0.0
    } else {
        board.iter().map(|e| e.score).sum::<f64>() / board.len() as f64
    };

    Overview {
        clients_evaluated: ids.len(),
        evaluations: board.len(),
        average_score,
        leader: board.first().cloned(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
}

/// Score statistics grouped by the text of `column`.
pub fn group_stats(records: &[Record], column: &str) -> BTreeMap<String, GroupStats> {
    let mut groups: BTreeMap<String, GroupStats> = BTreeMap::new();
    for record in records {
        let stats = groups
            .entry(record.text(column).trim().to_string())
            .or_default();
        stats.count += 1;
        stats.sum += record.number(clients::TOTAL_SCORE);
    }
    for stats in groups.values_mut() {
        stats.mean = stats.sum / stats.count as f64;
    }
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Total scores split into `bins` equal-width bins between the lowest and
/// highest score. The last bin is closed on both ends.
pub fn score_distribution(records: &[Record], bins: usize) -> Vec<ScoreBin> {
    let scores = records
        .iter()
        .map(|r| r.number(clients::TOTAL_SCORE))
        .collect::<Vec<_>>();
    if scores.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![ScoreBin {
            lower: min,
            upper: max,
            count: scores.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut distribution = (0..bins)
        .map(|i| ScoreBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect::<Vec<_>>();
    for score in scores {
        let index = (((score - min) / width) as usize).min(bins - 1);
        distribution[index].count += 1;
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sheets::header::HeaderRow;

    fn records() -> Vec<Record> {
        let header = HeaderRow::new(clients::SCHEMA.columns);
        [
            ["t1", "Granos", "111111", "A", "Pilar", "Tipo 1", "80"],
            ["t2", "Ganadería", "222222", "B", "Córdoba", "Tipo 2", "120"],
            ["t3", "Granos", "333333", "C", "Córdoba", "Tipo 1", "95"],
            ["t4", "Granos", "111111", "A", "Pilar", "Tipo 1", "105"],
        ]
        .iter()
        .map(|row| Record::from_row(&header, row))
        .collect()
    }

    #[test]
    fn test_leaderboard_sorted_descending() {
        let board = leaderboard(&records(), &LeaderboardFilter::default());
        let scores = board.iter().map(|e| e.score).collect::<Vec<_>>();
        assert_eq!(scores, vec![120.0, 105.0, 95.0, 80.0]);
    }

    #[test]
    fn test_leaderboard_filters() {
        let filter = LeaderboardFilter {
            category: Some(EvaluationCategory::Grains),
            branch: Some(Branch::Cordoba),
        };
        let board = leaderboard(&records(), &filter);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].client_name, "C");
    }

    #[test]
    fn test_leaderboard_filter_accepts_category_alias() {
        let filter = LeaderboardFilter {
            category: Some("ganaderia".parse().unwrap()),
            branch: None,
        };
        let board = leaderboard(&records(), &filter);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].category, "Ganadería");
    }

    #[test]
    fn test_overview() {
        let overview = overview(&records());
        assert_eq!(overview.clients_evaluated, 3);
        assert_eq!(overview.evaluations, 4);
        assert_eq!(overview.average_score, 100.0);
        assert_eq!(overview.leader.unwrap().client_name, "B");
    }

    #[test]
    fn test_overview_of_empty_sheet() {
        let overview = overview(&[]);
        assert_eq!(overview.evaluations, 0);
        assert_eq!(overview.average_score, 0.0);
        assert!(overview.leader.is_none());
    }

    #[test]
    fn test_group_stats_by_branch() {
        let stats = group_stats(&records(), clients::BRANCH);
        assert_eq!(stats["Pilar"].count, 2);
        assert_eq!(stats["Pilar"].sum, 185.0);
        assert_eq!(stats["Córdoba"].mean, 107.5);
    }

    #[test]
    fn test_score_distribution() {
        let bins = score_distribution(&records(), 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].lower, 80.0);
        assert_eq!(bins[3].upper, 120.0);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_score_distribution_single_value() {
        let header = HeaderRow::new(clients::SCHEMA.columns);
        let records = vec![Record::from_row(&header, &["t", "Granos", "1", "A", "Pilar", "Tipo 1", "50"])];
        let bins = score_distribution(&records, 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 1);
        assert!(score_distribution(&[], 10).is_empty());
    }
}
