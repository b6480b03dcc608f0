/// Final score as a percentage of the quiz length.
pub fn percentage(score: usize, total: usize) -> f64 {
    debug_assert!(total > 0, "percentage of an empty quiz");
    if total == 0 {
        return 0.0;
    }
    score as f64 / total as f64 * 100.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    NeedsPractice,
}

impl Grade {
    pub fn from_percentage(percent: f64) -> Self {
        if percent >= 90.0 {
            Grade::Excellent
        } else if percent >= 70.0 {
            Grade::Good
        } else if percent >= 50.0 {
            Grade::Fair
        } else {
            Grade::NeedsPractice
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent!",
            Grade::Good => "Good job",
            Grade::Fair => "Not bad",
            Grade::NeedsPractice => "Keep practicing",
        }
    }
}
