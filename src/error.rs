use std::io;

use thiserror::Error;

use crate::session::CompletionReport;

/// Why the extractor gave up on a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ExtractionCause {
    /// Version or feature the extractor cannot handle (including encryption)
    Incompatible,
    /// Malformed or damaged document
    Corrupt,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{cause} document: {message}")]
pub struct ExtractError {
    pub cause: ExtractionCause,
    pub message: String,
}

impl ExtractError {
    pub fn new(cause: ExtractionCause, message: impl Into<String>) -> Self {
        Self {
            cause,
            message: message.into(),
        }
    }

    /// Sort a free-form extractor message into a cause
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        let incompatible = ["version", "unsupported", "unimplemented", "encrypt"]
            .iter()
            .any(|needle| lowered.contains(needle));

        let cause = if incompatible {
            ExtractionCause::Incompatible
        } else {
            ExtractionCause::Corrupt
        };
        Self { cause, message }
    }
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("`{0}` is not a pdf file")]
    InvalidFileType(String),
    #[error("text extraction failed: {0}")]
    ExtractionFailed(#[from] ExtractError),
    #[error("no readable text could be extracted")]
    NoTextFound,
    #[error("could not read file: {0}")]
    ReadError(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A user-facing message box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn text_ready() -> Self {
        Self::info(
            "Text Ready!",
            "The text has been extracted and your session is ready. Start typing!",
        )
    }

    pub fn completed(report: &CompletionReport) -> Self {
        Self::info(
            "Session Complete!",
            format!(
                "Congratulations! Your final WPM is {} with {} errors. Time taken: {} seconds.",
                report.wpm, report.error_count, report.elapsed_seconds
            ),
        )
    }
}

impl From<&IngestError> for Notice {
    fn from(err: &IngestError) -> Self {
        match err {
            IngestError::InvalidFileType(_) => {
                Notice::error("Invalid File", "Please select a valid PDF file (.pdf).")
            }
            IngestError::ExtractionFailed(ExtractError {
                cause: ExtractionCause::Incompatible,
                ..
            }) => Notice::error(
                "PDF Version Mismatch",
                "This document uses a PDF version or feature the text extractor does not support.",
            ),
            IngestError::ExtractionFailed(ExtractError {
                cause: ExtractionCause::Corrupt,
                ..
            }) => Notice::error(
                "PDF Error",
                "Failed to extract text from the PDF. The file might be corrupted or complex.",
            ),
            IngestError::NoTextFound => Notice::error(
                "No Text Found",
                "No readable text could be extracted from the PDF. Scanned documents need OCR first.",
            ),
            IngestError::ReadError(_) => {
                Notice::error("Read Error", "An error occurred while reading the file.")
            }
        }
    }
}
