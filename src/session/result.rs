use crate::engine::scoring::{self, Grade};

/// What the presenter needs to reveal after an answer is submitted.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
    pub selected: String,
    pub score: usize,
    pub asked: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuizSummary {
    pub chapter: String,
    pub score: usize,
    pub total: usize,
    pub percentage: f64,
    pub grade: Grade,
}

impl QuizSummary {
    pub fn new(chapter: &str, score: usize, total: usize) -> Self {
        let percentage = scoring::percentage(score, total);
        Self {
            chapter: chapter.to_string(),
            score,
            total,
            percentage,
            grade: Grade::from_percentage(percentage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_computes_percentage_and_grade() {
        let summary = QuizSummary::new("2", 7, 10);
        assert!((summary.percentage - 70.0).abs() < f64::EPSILON);
        assert_eq!(summary.grade, Grade::Good);
        assert_eq!(summary.chapter, "2");
    }
}
