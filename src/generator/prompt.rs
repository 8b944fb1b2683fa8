//! Prompt construction for the completion endpoint.
//!
//! Topics are sorted into a handful of categories, each with its own phrasing
//! templates. Challenging requests get extra templates anchored to a worked
//! example so the model imitates its style.

use rand::seq::SliceRandom;
use rand::Rng;

pub const SYSTEM_INSTRUCTION: &str = "You are a strict generator of multiple-choice questions. \
Return your answer as a JSON object with keys: question, options (array of 4), \
and correct_answer (the correct option string).";

pub const DO_NOT_REPEAT_PREFIX: &str = "Do NOT repeat any of these questions:";

const CHALLENGING: &str = "challenging";
const TAG_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicCategory {
    CrossMethod,
    Indices,
    Factorization,
    Generic,
}

impl TopicCategory {
    /// Checked in this order; the first match wins.
    const MATCHERS: &'static [(&'static str, TopicCategory)] = &[
        ("factorization using cross method", TopicCategory::CrossMethod),
        ("positive integral indices", TopicCategory::Indices),
        ("factorization", TopicCategory::Factorization),
    ];

    pub fn for_topic(topic: &str) -> Self {
        let topic = topic.to_lowercase();
        Self::MATCHERS
            .iter()
            .find(|(needle, _)| topic.contains(needle))
            .map(|(_, category)| *category)
            .unwrap_or(TopicCategory::Generic)
    }

    fn base_templates(self) -> &'static [&'static str] {
        match self {
            TopicCategory::CrossMethod => &[
                "Generate ONE {difficulty} secondary-school mathematics question on factorization using the cross method. Provide EXACTLY 4 answer options.",
                "Write a {difficulty} math question for secondary school about factorization using the cross method, with 4 answer choices.",
                "Create a single {difficulty} level math MCQ on factorization using the cross method. Give 4 options.",
                "Formulate a {difficulty} secondary-school mathematics multiple-choice question on factorization using the cross method with 4 options.",
            ],
            TopicCategory::Indices => &[
                "Generate ONE {difficulty} secondary-school mathematics question on positive integral indices. Provide EXACTLY 4 answer options.",
                "Write a {difficulty} math question for secondary school about positive integral indices, with 4 answer choices.",
                "Create a single {difficulty} level math MCQ on positive integral indices. Give 4 options.",
                "Formulate a {difficulty} secondary-school mathematics multiple-choice question on positive integral indices with 4 options.",
            ],
            TopicCategory::Factorization => &[
                "Write a {difficulty} math question for secondary school about factorization using identities (perfect square, difference of two squares), with 4 answer choices.",
                "Create a single {difficulty} level math MCQ on factorization (identities: perfect square, difference of two squares). Give 4 options.",
                "Formulate a {difficulty} secondary-school mathematics multiple-choice question on factorization using identities (perfect square, difference of two squares) with 4 options.",
            ],
            TopicCategory::Generic => &[
                "Generate ONE {difficulty} secondary-school mathematics question on '{topic}'. Provide EXACTLY 4 answer options.",
                "Write a {difficulty} math question for secondary school about '{topic}' with 4 answer choices.",
                "Create a single {difficulty} level math MCQ on '{topic}'. Give 4 options.",
                "Formulate a {difficulty} secondary-school mathematics multiple-choice question on '{topic}' with 4 options.",
            ],
        }
    }

    fn example_templates(self) -> &'static [&'static str] {
        match self {
            TopicCategory::CrossMethod => &[
                "Write a challenging factorization question for secondary school using the cross method. Provide 4 answer choices. The question should be similar in style to: Factorize the expression: 6x^2 + 11x + 3.",
            ],
            TopicCategory::Indices => &[
                "Write a challenging question for secondary school on positive integral indices. Provide 4 answer choices. The question should be similar in style to: Simplify (x^3 * y^2)^4 / (x^2 * y)^3.",
            ],
            TopicCategory::Factorization => &[
                "Generate a CHALLENGING secondary-school mathematics question on factorization using identities (perfect square, difference of two squares). Provide EXACTLY 4 answer options. The question should be similar in style to: Factorize the expression 4x^2 + 4x + 1 - y^2.",
                "Write a challenging factorization question for secondary school using identities (perfect square, difference of two squares). Provide 4 answer choices. The question should be similar in style to: Factorize the expression: y^2 - x^2 - 2x - 1.",
            ],
            TopicCategory::Generic => &[],
        }
    }

    /// Candidate templates for a difficulty.
    pub fn templates(self, difficulty: &str) -> Vec<&'static str> {
        let mut pool = self.base_templates().to_vec();
        if difficulty.eq_ignore_ascii_case(CHALLENGING) {
            pool.extend_from_slice(self.example_templates());
        }
        pool
    }
}

pub fn build_prompt<R: Rng + ?Sized>(
    rng: &mut R,
    topic: &str,
    difficulty: &str,
    previous_questions: &[String],
) -> Prompt {
    let category = TopicCategory::for_topic(topic);
    let pool = category.templates(difficulty);
    // Every category has at least one base template.
    let template = pool.choose(rng).copied().unwrap_or_default();

    let mut user = template
        .replace("{difficulty}", difficulty)
        .replace("{topic}", topic);

    if !previous_questions.is_empty() {
        let quoted = previous_questions
            .iter()
            .map(|q| format!("\"{q}\""))
            .collect::<Vec<_>>()
            .join("; ");
        user.push_str(&format!(" {DO_NOT_REPEAT_PREFIX} {quoted}"));
    }

    user.push_str(&format!(" Tag: {}.", random_tag(rng)));

    Prompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
    }
}

fn random_tag<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TAG_LEN)
        .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
        .collect()
}
