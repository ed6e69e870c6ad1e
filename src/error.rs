//! Error types for the pdf-pagesource library.
//!
//! The taxonomy mirrors the three moments a page source can fail:
//!
//! * **Opening** — the file is missing, unreadable, encrypted, or not a PDF.
//!   Fatal to the whole chapter: the caller reports a load failure upward and
//!   nothing is partially loaded.
//!
//! * **Rendering** — one specific page could not be rasterised or encoded.
//!   Isolated to that page's descriptor; sibling pages are unaffected and the
//!   reader may retry on user request. No retries happen at this layer.
//!
//! * **After close** — any operation on a closed renderer or a recycled
//!   loader returns [`PageSourceError::Closed`]. Surfaced to the caller as
//!   "page unavailable", never a panic.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf-pagesource library.
#[derive(Debug, Error)]
pub enum PageSourceError {
    // ── Open errors ───────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptDocument { path: PathBuf, detail: String },

    // ── Page errors ───────────────────────────────────────────────────────
    /// Requested page index is outside `[0, total)`.
    ///
    /// Under correct use of the loader's enumerated descriptors this cannot
    /// happen; seeing it indicates a caller-side defect.
    #[error("Page index {index} is out of range (document has {total} pages)")]
    PageOutOfRange { index: usize, total: usize },

    /// The rendering service failed to paint a specific page.
    #[error("Rendering failed for page {index}: {detail}")]
    RenderFailed { index: usize, detail: String },

    /// The rendered raster could not be PNG-encoded.
    #[error("PNG encoding failed for page {index}")]
    EncodeFailed {
        index: usize,
        #[source]
        source: image::ImageError,
    },

    // ── Lifecycle errors ──────────────────────────────────────────────────
    /// Operation attempted after `close()` / `recycle()`.
    #[error("Page source is closed")]
    Closed,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PageSourceError {
    /// True for the open-time family — failures that abort the whole chapter
    /// load rather than a single page.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::PermissionDenied { .. }
                | Self::NotAPdf { .. }
                | Self::PasswordRequired { .. }
                | Self::WrongPassword { .. }
                | Self::CorruptDocument { .. }
        )
    }

    /// True if the operation failed because the source was already closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
