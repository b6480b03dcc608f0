use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::bank::Question;

/// Options offered per question: the answer plus up to three distractors.
pub const OPTION_COUNT: usize = 4;

/// Pick up to `count` distinct wrong answers from `pool`.
///
/// Fewer than `count` are returned when the pool does not hold enough
/// distinct answers other than `correct_answer`; an empty result is valid.
pub fn pick_distractors<R: Rng + ?Sized>(
    pool: &[Arc<Question>],
    correct_answer: &str,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut answers: Vec<String> = pool
        .iter()
        .map(|q| q.answer.as_str())
        .filter(|answer| *answer != correct_answer && seen.insert(*answer))
        .map(str::to_string)
        .collect();

    answers.shuffle(rng);
    answers.truncate(count);
    answers
}

/// Shuffled option list for `question`: its answer plus distractors from `pool`.
pub fn answer_options<R: Rng + ?Sized>(
    pool: &[Arc<Question>],
    question: &Question,
    rng: &mut R,
) -> Vec<String> {
    let mut options = pick_distractors(pool, &question.answer, OPTION_COUNT - 1, rng);
    options.push(question.answer.clone());
    options.shuffle(rng);
    options
}
