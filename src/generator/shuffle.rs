use rand::seq::SliceRandom;
use rand::Rng;

use super::{GeneratedQuestion, GenerationError, ShuffledQuestion};

/// Shuffle the options uniformly and locate the correct answer again.
///
/// The answer is matched by exact string equality; a miss means the model
/// broke its contract and is reported rather than guessed at.
pub fn shuffle_options<R: Rng + ?Sized>(
    rng: &mut R,
    question: &GeneratedQuestion,
) -> Result<ShuffledQuestion, GenerationError> {
    if !question.options.contains(&question.correct_answer) {
        return Err(GenerationError::InconsistentAnswer(
            question.correct_answer.clone(),
        ));
    }

    let mut options = question.options.clone();
    options.shuffle(rng);

    let correct_index = options
        .iter()
        .position(|o| *o == question.correct_answer)
        .ok_or_else(|| GenerationError::InconsistentAnswer(question.correct_answer.clone()))?;

    Ok(ShuffledQuestion {
        question: question.question.clone(),
        options,
        correct_index,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(correct: &str) -> GeneratedQuestion {
        GeneratedQuestion {
            question: "Factorize x^2 - 1".to_string(),
            options: vec![
                "(x - 1)(x + 1)".to_string(),
                "(x - 1)^2".to_string(),
                "(x + 1)^2".to_string(),
                "x(x - 1)".to_string(),
            ],
            correct_answer: correct.to_string(),
        }
    }

    #[test]
    fn index_resolves_for_every_seed() {
        let q = question("(x - 1)(x + 1)");
        let mut seen = HashSet::new();

        for seed in 0..500 {
            let shuffled = shuffle_options(&mut StdRng::seed_from_u64(seed), &q).unwrap();
            assert_eq!(shuffled.options[shuffled.correct_index], q.correct_answer);
            assert_eq!(shuffled.options.len(), 4);
            seen.insert(shuffled.options);
        }

        // 500 draws over 24 permutations should hit all of them.
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn shuffle_keeps_the_same_options() {
        let q = question("x(x - 1)");
        let shuffled = shuffle_options(&mut StdRng::seed_from_u64(3), &q).unwrap();
        let mut got = shuffled.options.clone();
        let mut want = q.options.clone();
        got.sort();
        want.sort();
        assert_eq!(got, want);
        assert_eq!(shuffled.question, q.question);
    }

    #[test]
    fn missing_answer_is_inconsistent() {
        let q = question("(x - 1)(x - 1)");
        let err = shuffle_options(&mut StdRng::seed_from_u64(1), &q).unwrap_err();
        assert!(matches!(err, GenerationError::InconsistentAnswer(a) if a == "(x - 1)(x - 1)"));
    }

    #[test]
    fn near_miss_is_not_coerced() {
        let q = question("(x-1)(x+1)");
        assert!(shuffle_options(&mut StdRng::seed_from_u64(1), &q).is_err());
    }
}
