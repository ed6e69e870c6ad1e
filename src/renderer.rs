//! The page renderer: exclusive owner of one open document handle.
//!
//! ## Why one coarse lock?
//!
//! The underlying rendering service permits only a single page render in
//! flight per handle — painting a page while another render is active is
//! unsafe. A single `Mutex` around the handle serialises every render, and
//! `close()` acquires the same lock, so the handle can never be released
//! while a render is using it. Concurrent callers (e.g. the reader
//! pre-fetching adjacent pages) simply block until the lock is free; there is
//! no ordering, priority, or cancellation beyond that.

use crate::config::SourceConfig;
use crate::encode::encode_page;
use crate::error::PageSourceError;
use crate::service::{PdfiumRenderService, RenderService};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Renders individual pages of one open document to PNG bytes on demand.
///
/// All operations after [`close`](PageRenderer::close) fail with
/// [`PageSourceError::Closed`]; a second `close()` is a safe no-op.
pub struct PageRenderer<S: RenderService> {
    /// `None` once closed. The `Option` is the single source of truth for
    /// the open/closed state, guarded by the same lock that serialises
    /// renders.
    handle: Mutex<Option<Inner<S>>>,
}

struct Inner<S> {
    service: S,
    page_count: usize,
}

impl PageRenderer<PdfiumRenderService> {
    /// Open the PDF at `path` and take ownership of its document handle.
    pub fn open(path: &Path, config: &SourceConfig) -> Result<Self, PageSourceError> {
        let service = PdfiumRenderService::open(path, config)?;
        Ok(Self::from_service(service))
    }
}

impl<S: RenderService> PageRenderer<S> {
    /// Wrap an already-open rendering service.
    pub fn from_service(service: S) -> Self {
        let page_count = service.page_count();
        Self {
            handle: Mutex::new(Some(Inner {
                service,
                page_count,
            })),
        }
    }

    /// Total number of pages in the document.
    pub fn page_count(&self) -> Result<usize, PageSourceError> {
        let guard = self.lock();
        let inner = guard.as_ref().ok_or(PageSourceError::Closed)?;
        Ok(inner.page_count)
    }

    /// Natural pixel dimensions of the page at `index`.
    pub fn page_size(&self, index: usize) -> Result<(u32, u32), PageSourceError> {
        let guard = self.lock();
        let inner = guard.as_ref().ok_or(PageSourceError::Closed)?;
        check_range(index, inner.page_count)?;
        inner.service.page_size(index)
    }

    /// Render the page at `index` and return it as PNG bytes.
    ///
    /// Blocks while another render holds the handle lock. The raster buffer
    /// is dropped as soon as encoding finishes, so peak memory is bounded to
    /// one decoded page regardless of document size.
    pub fn render_page(&self, index: usize) -> Result<Vec<u8>, PageSourceError> {
        let guard = self.lock();
        let inner = guard.as_ref().ok_or(PageSourceError::Closed)?;
        // Range check before touching the service: an out-of-range index is
        // a caller defect and must not reach the backend.
        check_range(index, inner.page_count)?;

        let image = inner.service.render_page(index)?;
        encode_page(index, &image)
    }

    /// Page count plus per-page dimensions, for inspection and JSON output.
    pub fn document_info(&self) -> Result<DocumentInfo, PageSourceError> {
        let guard = self.lock();
        let inner = guard.as_ref().ok_or(PageSourceError::Closed)?;

        let pages = (0..inner.page_count)
            .map(|index| {
                let (width, height) = inner.service.page_size(index)?;
                Ok(PageDimensions {
                    index,
                    width,
                    height,
                })
            })
            .collect::<Result<Vec<_>, PageSourceError>>()?;

        Ok(DocumentInfo {
            page_count: inner.page_count,
            pages,
        })
    }

    /// Release the document handle. Idempotent.
    ///
    /// Acquires the handle lock first, so a close racing an in-flight render
    /// waits for that render to finish rather than pulling the handle out
    /// from under it.
    pub fn close(&self) {
        let mut guard = self.lock();
        if guard.take().is_some() {
            debug!("Page renderer closed");
        }
    }

    /// True once [`close`](PageRenderer::close) has run.
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// A panic on a rendering thread must not wedge `close()` forever, so a
    /// poisoned lock is recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Option<Inner<S>>> {
        self.handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Hand-written: the service is not `Debug`, and `fmt` must not block on the
/// handle lock while a render is in flight.
impl<S: RenderService> fmt::Debug for PageRenderer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.handle.try_lock() {
            Ok(guard) if guard.is_some() => "open",
            Ok(_) => "closed",
            Err(_) => "busy",
        };
        f.debug_struct("PageRenderer").field("state", &state).finish()
    }
}

fn check_range(index: usize, total: usize) -> Result<(), PageSourceError> {
    if index >= total {
        return Err(PageSourceError::PageOutOfRange { index, total });
    }
    Ok(())
}

/// Summary of an open document: page count plus per-page pixel dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub pages: Vec<PageDimensions>,
}

/// Natural pixel dimensions of a single page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageDimensions {
    pub index: usize,
    pub width: u32,
    pub height: u32,
}
