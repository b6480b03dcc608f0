pub mod question;
pub mod source;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

pub use question::Question;
pub use source::LoadError;

/// Immutable question collection, indexed by chapter at construction time.
///
/// Questions are reference counted so sessions can hold their chapter pool
/// without borrowing from the bank.
#[derive(Debug, Default)]
pub struct QuestionBank {
    questions: Vec<Arc<Question>>,
    chapters: Vec<String>,
    by_chapter: HashMap<String, Vec<Arc<Question>>>,
}

impl QuestionBank {
    /// Build a bank from already-validated questions. Later duplicates of an
    /// `id` are dropped.
    pub fn from_questions<I>(questions: I) -> Self
    where
        I: IntoIterator<Item = Question>,
    {
        let mut bank = Self::default();
        let mut seen: HashSet<String> = HashSet::new();

        for question in questions {
            if !seen.insert(question.id.clone()) {
                warn!("duplicate question id {:?}, keeping the first", question.id);
                continue;
            }
            let question = Arc::new(question);
            match bank.by_chapter.get_mut(&question.chapter) {
                Some(pool) => pool.push(Arc::clone(&question)),
                None => {
                    bank.chapters.push(question.chapter.clone());
                    bank.by_chapter
                        .insert(question.chapter.clone(), vec![Arc::clone(&question)]);
                }
            }
            bank.questions.push(question);
        }

        bank
    }

    pub fn load<R: Read>(source: R) -> Result<Self, LoadError> {
        let questions = source::read_questions(source)?;
        let bank = Self::from_questions(questions);
        info!(
            "loaded {} questions across {} chapters",
            bank.len(),
            bank.chapters.len()
        );
        Ok(bank)
    }

    pub fn load_path(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!("loading question bank from {}", path.display());
        Self::load(BufReader::new(file))
    }

    /// Load the question bank bundled into the binary.
    pub fn embedded() -> Result<Self, LoadError> {
        let bytes = source::embedded_source()?;
        Self::load(bytes.as_slice())
    }

    /// Questions of `chapter` in source order; empty for an unknown chapter.
    pub fn questions_in_chapter(&self, chapter: &str) -> &[Arc<Question>] {
        self.by_chapter
            .get(chapter)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Chapter keys in order of first appearance.
    pub fn chapters(&self) -> &[String] {
        &self.chapters
    }

    pub fn questions(&self) -> &[Arc<Question>] {
        &self.questions
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Question>> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,chapter,answer,prompt,hint,category
1,1,A,P1,H1,X
2,1,B,P2,H2,X
3,2,C,P3,H3,Y
4,1,D,P4,H4,X
";

    #[test]
    fn test_chapters_keep_file_order() {
        let bank = QuestionBank::load(SAMPLE.as_bytes()).unwrap();
        let ids: Vec<&str> = bank
            .questions_in_chapter("1")
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
        assert_eq!(bank.chapters(), &["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_unknown_chapter_is_empty() {
        let bank = QuestionBank::load(SAMPLE.as_bytes()).unwrap();
        assert!(bank.questions_in_chapter("9").is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let csv = "id,chapter,answer,prompt,hint,category\n1,1,A,P1,H1,X\n1,2,B,P2,H2,X\n";
        let bank = QuestionBank::load(csv.as_bytes()).unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.get("1").unwrap().answer, "A");
        assert!(bank.questions_in_chapter("2").is_empty());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = QuestionBank::load_path(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(err.to_string().contains("nope.csv"));
    }

    #[test]
    fn test_embedded_bank_has_chapters() {
        let bank = QuestionBank::embedded().unwrap();
        assert!(!bank.chapters().is_empty());
        for chapter in bank.chapters() {
            assert!(!bank.questions_in_chapter(chapter).is_empty());
        }
    }
}
