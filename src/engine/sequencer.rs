use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::bank::Question;

/// Every question in the pool has already been asked.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("every question in the pool has been asked")]
pub struct Exhausted;

/// Pick a question uniformly at random among those not yet in `asked`.
pub fn next_question<'a, R: Rng + ?Sized>(
    pool: &'a [Arc<Question>],
    asked: &HashSet<String>,
    rng: &mut R,
) -> Result<&'a Arc<Question>, Exhausted> {
    let candidates: Vec<&Arc<Question>> =
        pool.iter().filter(|q| !asked.contains(&q.id)).collect();
    candidates.choose(rng).copied().ok_or(Exhausted)
}
