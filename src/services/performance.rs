use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::models::PerformanceModel;
use crate::names::RECENT_PERFORMANCE_LIMIT;
use crate::utils::percentage;

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct TopicStats {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

#[derive(Debug, Serialize)]
pub struct PerformanceSummary {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub accuracy: f64,
    pub topic_stats: BTreeMap<String, TopicStats>,
    pub recent_performances: Vec<PerformanceModel>,
}

impl PerformanceSummary {
    /// Summarise a user's answers. `records` must be ordered oldest first.
    pub fn from_records(records: Vec<PerformanceModel>) -> Self {
        let total_questions = records.len();
        let correct_answers = records.iter().filter(|p| p.is_correct).count();

        let mut topic_stats: BTreeMap<String, TopicStats> = BTreeMap::new();
        for p in &records {
            let stats = topic_stats.entry(p.topic.clone()).or_default();
            stats.total += 1;
            if p.is_correct {
                stats.correct += 1;
            }
        }
        for stats in topic_stats.values_mut() {
            stats.accuracy = percentage(stats.correct, stats.total);
        }

        let skip = total_questions.saturating_sub(RECENT_PERFORMANCE_LIMIT);
        let recent_performances = records.into_iter().skip(skip).collect();

        Self {
            total_questions,
            correct_answers,
            accuracy: percentage(correct_answers, total_questions),
            topic_stats,
            recent_performances,
        }
    }
}
