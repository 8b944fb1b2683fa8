//! Question-generation pipeline: prompt, completion, parse/repair, shuffle,
//! record.

use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Deserializer, Serialize};

pub mod cache;
pub mod client;
mod error;
pub mod history;
pub mod parse;
pub mod prompt;
pub mod shuffle;

pub use cache::RecentQuestions;
pub use client::{ChatClientConfig, ChatCompletionClient, CompletionClient};
pub use error::GenerationError;
pub use history::HistoryStore;

use crate::db::{Db, NewPerformance, NewQuestionHistory};

pub const OPTION_COUNT: usize = 4;
pub const DEFAULT_TOPIC: &str = "mathematics";
pub const DEFAULT_DIFFICULTY: &str = "medium";

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

fn default_difficulty() -> String {
    DEFAULT_DIFFICULTY.to_string()
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub previous_questions: Vec<String>,
}

impl Default for QuestionRequest {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            difficulty: default_difficulty(),
            previous_questions: Vec::new(),
        }
    }
}

/// A decoded and schema-checked completion, options in the model's order.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShuffledQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

pub struct QuestionGenerator<C: CompletionClient = ChatCompletionClient, H: HistoryStore = Db> {
    client: C,
    history: H,
    recent: RecentQuestions,
    rng: Mutex<StdRng>,
}

impl<C: CompletionClient, H: HistoryStore> QuestionGenerator<C, H> {
    pub fn new(client: C, history: H, cache_capacity: usize) -> Self {
        Self::with_rng(client, history, cache_capacity, StdRng::from_entropy())
    }

    /// Deterministic generator for tests.
    pub fn with_seed(client: C, history: H, cache_capacity: usize, seed: u64) -> Self {
        Self::with_rng(client, history, cache_capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(client: C, history: H, cache_capacity: usize, rng: StdRng) -> Self {
        Self {
            client,
            history,
            recent: RecentQuestions::new(cache_capacity),
            rng: Mutex::new(rng),
        }
    }

    pub fn recent(&self) -> &RecentQuestions {
        &self.recent
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run the whole pipeline for one request. The history record is written
    /// only once a consistent question exists.
    pub async fn generate(
        &self,
        request: &QuestionRequest,
        user_id: Option<&str>,
    ) -> Result<ShuffledQuestion, GenerationError> {
        let topic = request.topic.as_str();
        let difficulty = request.difficulty.as_str();

        let previous = if request.previous_questions.is_empty() {
            self.recent.get(topic, difficulty).into_iter().collect()
        } else {
            request.previous_questions.clone()
        };

        let prompt = {
            let mut rng = self.rng();
            prompt::build_prompt(&mut *rng, topic, difficulty, &previous)
        };
        tracing::debug!(topic, difficulty, "user prompt: {}", prompt.user);

        let raw = self.client.complete(&prompt).await.inspect_err(|e| {
            tracing::error!(topic, difficulty, "completion failed: {e}");
        })?;
        tracing::debug!(topic, difficulty, "raw completion: {raw}");

        let parsed = parse::parse_completion(&raw).inspect_err(|e| {
            tracing::error!(topic, difficulty, raw = %raw, "could not parse completion: {e}");
        })?;

        let shuffled = {
            let mut rng = self.rng();
            shuffle::shuffle_options(&mut *rng, &parsed)
        }
        .inspect_err(|e| {
            tracing::error!(topic, difficulty, raw = %raw, "{e}");
        })?;

        self.recent.put(topic, difficulty, &parsed.question);

        let record = NewQuestionHistory {
            topic: topic.to_string(),
            difficulty: difficulty.to_string(),
            question_text: parsed.question,
            options: parsed.options,
            correct_answer: parsed.correct_answer,
            generated_by_user_id: user_id.map(str::to_string),
        };
        self.history
            .record_question(&record)
            .await
            .map_err(|e| {
                tracing::error!(topic, difficulty, "could not record question history: {e}");
                GenerationError::Persistence(e)
            })?;

        Ok(shuffled)
    }

    pub async fn record_answer(&self, record: &NewPerformance) -> Result<String, GenerationError> {
        self.history.record_performance(record).await.map_err(|e| {
            tracing::error!(
                topic = record.topic.as_str(),
                difficulty = record.difficulty.as_str(),
                "could not record answer: {e}"
            );
            GenerationError::Persistence(e)
        })
    }
}
