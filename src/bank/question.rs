use icu_normalizer::ComposingNormalizerBorrowed;

/// Number of ordered fields in a question row: id, chapter, answer, prompt, hint, category.
pub const FIELD_COUNT: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub chapter: String,
    pub answer: String,
    /// Text shown to the user, in source script.
    pub prompt: String,
    /// Phonetic reading, hidden until the user asks for it.
    pub hint: String,
    pub category: String,
}

impl Question {
    /// Build a question from the six ordered row fields.
    ///
    /// Fields are trimmed and NFC-normalised so that kana typed with combining
    /// marks compare equal to their precomposed forms. Returns `None` when the
    /// row is short or a required field (`id`, `chapter`, `answer`) is blank.
    pub fn from_fields<'a, I>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let fields: Vec<String> = fields.into_iter().map(normalize).collect();
        if fields.len() < FIELD_COUNT {
            return None;
        }
        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();
        let question = Self {
            id: next(),
            chapter: next(),
            answer: next(),
            prompt: next(),
            hint: next(),
            category: next(),
        };
        if question.id.is_empty() || question.chapter.is_empty() || question.answer.is_empty() {
            return None;
        }
        Some(question)
    }

    pub fn is_correct(&self, selected: &str) -> bool {
        normalize(selected) == self.answer
    }
}

pub fn normalize(text: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(text.trim())
        .into_owned()
}
