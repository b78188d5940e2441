use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};
use lopdf::Document;

use crate::error::{ExtractError, ExtractionCause, IngestError};
use crate::runtime::AppEvent;
use crate::text::{is_blank, normalize, PAGE_SPACER};

pub const PDF_MIME: &str = "application/pdf";

/// Lazy, ordered page texts of one document
pub type PageIter = Box<dyn Iterator<Item = Result<String, ExtractError>>>;

pub struct ExtractedDocument {
    pub page_count: usize,
    pub pages: PageIter,
}

/// Turns raw document bytes into per-page plain text
pub trait TextExtractor: Send + Sync + 'static {
    fn extract(&self, bytes: Vec<u8>) -> Result<ExtractedDocument, ExtractError>;
}

/// `lopdf` backed extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: Vec<u8>) -> Result<ExtractedDocument, ExtractError> {
        let doc = Document::load_mem(&bytes).map_err(|e| ExtractError::classify(e.to_string()))?;
        debug!("loaded pdf {} document", doc.version);

        let numbers = doc.get_pages().into_keys().collect::<Vec<u32>>();
        let page_count = numbers.len();
        let pages = numbers.into_iter().map(move |n| {
            doc.extract_text(&[n])
                .map_err(|e| ExtractError::classify(format!("page {n}: {e}")))
        });

        Ok(ExtractedDocument {
            page_count,
            pages: Box::new(pages),
        })
    }
}

/// Progress of a running ingestion, reported once per extracted page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    pub page: usize,
    pub total: usize,
}

#[derive(Debug)]
pub enum IngestEvent {
    Progress(PageProgress),
    Finished(Result<String, IngestError>),
}

/// The type a file declares through its extension
pub fn declared_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(PDF_MIME),
        "txt" | "text" => Some("text/plain"),
        "md" => Some("text/markdown"),
        "html" | "htm" => Some("text/html"),
        "epub" => Some("application/epub+zip"),
        _ => None,
    }
}

pub fn check_file_type(path: &Path) -> Result<(), IngestError> {
    match declared_type(path) {
        Some(PDF_MIME) => Ok(()),
        _ => Err(IngestError::InvalidFileType(path.display().to_string())),
    }
}

/// Extract, join and normalize the text of an in-memory document
pub fn ingest_bytes<F>(
    bytes: Vec<u8>,
    extractor: &dyn TextExtractor,
    mut on_page: F,
) -> Result<String, IngestError>
where
    F: FnMut(PageProgress),
{
    info!("starting text extraction ({} bytes)", bytes.len());
    let document = extractor.extract(bytes)?;
    let total = document.page_count;
    info!("document opened, {total} pages");

    let mut raw = String::new();
    for (idx, page) in document.pages.enumerate() {
        let page_text = page?;
        raw.push_str(&page_text);
        raw.push_str(PAGE_SPACER);

        let progress = PageProgress {
            page: idx + 1,
            total,
        };
        debug!("extracted page {} of {}", progress.page, progress.total);
        on_page(progress);
    }

    let text = normalize(&raw);
    if is_blank(&text) {
        warn!("extraction produced no text");
        return Err(IngestError::NoTextFound);
    }

    info!("extraction complete, {} characters", text.chars().count());
    Ok(text)
}

/// Full pipeline for a selected file: type gate, read, extract
pub fn ingest_file<F>(
    path: &Path,
    extractor: &dyn TextExtractor,
    on_page: F,
) -> Result<String, IngestError>
where
    F: FnMut(PageProgress),
{
    check_file_type(path)?;
    let bytes = fs::read(path)?;
    ingest_bytes(bytes, extractor, on_page)
}

/// Run [`ingest_file`] on a worker thread, reporting through the app event channel.
///
/// Exactly one `Finished` event is sent, even when the extractor panics.
pub fn spawn(
    path: PathBuf,
    extractor: Arc<dyn TextExtractor>,
    tx: Sender<AppEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let progress_tx = tx.clone();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            ingest_file(&path, extractor.as_ref(), |p| {
                let _ = progress_tx.send(AppEvent::Ingest(IngestEvent::Progress(p)));
            })
        }))
        .unwrap_or_else(|payload| {
            let message = format!("extractor panicked: {}", panic_message(payload.as_ref()));
            Err(ExtractError::new(ExtractionCause::Corrupt, message).into())
        });

        if let Err(ref e) = result {
            warn!("ingestion of {} failed: {e}", path.display());
        }
        let _ = tx.send(AppEvent::Ingest(IngestEvent::Finished(result)));
    })
}

fn panic_message<'a>(payload: &'a (dyn Any + Send + 'static)) -> &'a str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}
