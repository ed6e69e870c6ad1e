//! The page loader: adapts a [`PageRenderer`] to the reader's generic
//! lazy-page-list contract.
//!
//! `pages()` enumerates metadata only — one descriptor per index — and each
//! descriptor carries a deferred supplier ([`PageDescriptor::bytes`]) that
//! renders on first consumption. Nothing is rasterised until a descriptor is
//! actually read, so opening a 200-page chapter costs one file open, not 200
//! renders.
//!
//! The loader's lifecycle is `Active → Recycled`, terminal. The status probe
//! deliberately reports only those two states: it reflects whether the loader
//! as a whole is still usable, not whether a specific page rendered
//! successfully. Per-page outcomes travel through the supplier's `Result`.

use crate::config::SourceConfig;
use crate::error::PageSourceError;
use crate::renderer::PageRenderer;
use crate::service::{PdfiumRenderService, RenderService};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Readiness of a page as seen by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// The loader is active; the page can be (or has been) rendered.
    Ready,
    /// The loader was recycled; the page is no longer available.
    Error,
}

/// Loads a chapter from a PDF file as a list of lazily rendered pages.
pub struct PageLoader<S: RenderService> {
    renderer: Arc<PageRenderer<S>>,
    recycled: AtomicBool,
}

impl PageLoader<PdfiumRenderService> {
    /// Open the PDF at `path` as a page loader.
    pub fn open(path: &Path, config: &SourceConfig) -> Result<Self, PageSourceError> {
        Ok(Self::from_renderer(PageRenderer::open(path, config)?))
    }
}

impl<S: RenderService> PageLoader<S> {
    /// Wrap an already-open renderer.
    pub fn from_renderer(renderer: PageRenderer<S>) -> Self {
        Self {
            renderer: Arc::new(renderer),
            recycled: AtomicBool::new(false),
        }
    }

    /// Enumerate one descriptor per page, `0..page_count`.
    ///
    /// Renders nothing. The page count is read once at enumeration time and
    /// the document is assumed immutable for the loader's lifetime, so the
    /// returned length always equals the document's page count.
    pub fn pages(&self) -> Result<Vec<PageDescriptor<S>>, PageSourceError> {
        if self.is_recycled() {
            return Err(PageSourceError::Closed);
        }
        let count = self.renderer.page_count()?;

        Ok((0..count)
            .map(|index| PageDescriptor {
                index,
                renderer: Arc::clone(&self.renderer),
            })
            .collect())
    }

    /// Coarse readiness probe for a previously enumerated descriptor.
    ///
    /// Reports [`PageStatus::Error`] if and only if the loader has been
    /// recycled. It does not reflect whether that particular page has
    /// rendered successfully.
    pub fn page_status(&self, _page: &PageDescriptor<S>) -> PageStatus {
        if self.is_recycled() {
            PageStatus::Error
        } else {
            PageStatus::Ready
        }
    }

    /// Mark the loader terminal and release the underlying renderer.
    ///
    /// Idempotent. Waits for any in-flight render to complete before the
    /// handle is released; suppliers invoked afterwards fail with
    /// [`PageSourceError::Closed`] rather than returning stale data.
    pub fn recycle(&self) {
        if !self.recycled.swap(true, Ordering::SeqCst) {
            debug!("Page loader recycled");
        }
        self.renderer.close();
    }

    /// True once [`recycle`](PageLoader::recycle) has run.
    pub fn is_recycled(&self) -> bool {
        self.recycled.load(Ordering::SeqCst)
    }
}

impl<S: RenderService> Drop for PageLoader<S> {
    fn drop(&mut self) {
        self.recycle();
    }
}

/// One page of a loaded chapter: an index plus a deferred content supplier.
///
/// Descriptors hold a shared reference to the renderer, so they stay valid
/// (and correctly fail closed) even if they outlive the loader's active life.
pub struct PageDescriptor<S: RenderService> {
    index: usize,
    renderer: Arc<PageRenderer<S>>,
}

impl<S: RenderService> PageDescriptor<S> {
    /// Zero-based page index within the chapter.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Render this page and return its PNG bytes.
    ///
    /// The deferred supplier: each call renders afresh (no caching at this
    /// layer), serialised against all other renders on the same document.
    pub fn bytes(&self) -> Result<Vec<u8>, PageSourceError> {
        self.renderer.render_page(self.index)
    }
}

/// Hand-written: the shared renderer is not `Debug`; the index is the only
/// field a reader of test output needs.
impl<S: RenderService> fmt::Debug for PageDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageDescriptor")
            .field("index", &self.index)
            .finish()
    }
}
