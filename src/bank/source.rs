use std::io::Read;
use std::path::PathBuf;

use csv::{ByteRecord, ErrorKind, ReaderBuilder, Trim};
use log::{debug, warn};
use rust_embed::Embed;
use thiserror::Error;

use crate::bank::question::Question;

pub const EMBEDDED_BANK: &str = "default.csv";

#[derive(Embed)]
#[folder = "assets/questions/"]
struct QuestionAssets;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open question bank {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read question bank: {0}")]
    Read(#[source] csv::Error),
    #[error("bundled question bank {0} is missing")]
    MissingEmbedded(&'static str),
}

/// Read every usable question row from a CSV source with a header row.
///
/// Short rows, rows with blank required fields and rows that are not valid
/// UTF-8 are skipped. Only transport failures are returned as errors.
pub fn read_questions<R: Read>(source: R) -> Result<Vec<Question>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let mut questions = Vec::new();
    let mut record = ByteRecord::new();
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(err) if matches!(err.kind(), ErrorKind::Io(_)) => {
                return Err(LoadError::Read(err));
            }
            Err(err) => {
                warn!("skipping malformed question row: {err}");
                continue;
            }
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let fields: Option<Vec<&str>> = record
            .iter()
            .map(|field| std::str::from_utf8(field).ok())
            .collect();
        let Some(fields) = fields else {
            debug!("skipping row on line {line}: not valid UTF-8");
            continue;
        };

        match Question::from_fields(fields) {
            Some(question) => questions.push(question),
            None => debug!("skipping row on line {line}: missing required fields"),
        }
    }

    Ok(questions)
}

pub fn embedded_source() -> Result<Vec<u8>, LoadError> {
    QuestionAssets::get(EMBEDDED_BANK)
        .map(|file| file.data.into_owned())
        .ok_or(LoadError::MissingEmbedded(EMBEDDED_BANK))
}
