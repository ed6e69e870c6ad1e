//! The rendering-service seam: the host capability that paints one document
//! page into a raster buffer.
//!
//! [`RenderService`] is the trait boundary between the page source and the
//! PDF backend. Production code uses [`PdfiumRenderService`]; tests swap in a
//! recording fake to assert that renders are strictly serialized and that
//! out-of-range requests never reach the backend.
//!
//! ## Why open the document per operation?
//!
//! pdfium documents borrow the `Pdfium` binding that loaded them, so a
//! long-lived handle would have to carry its binding alongside it. Instead
//! the service validates and opens the file once at construction (to fail
//! fast and learn the page count), then re-opens it inside each render. The
//! [`crate::PageRenderer`] handle lock already serialises every call, so at
//! most one document is open per service at a time, and the `thread_safe`
//! feature guards the FFI layer underneath.

use crate::config::SourceConfig;
use crate::error::PageSourceError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A host service that enumerates and rasterises the pages of one open
/// paginated document.
///
/// Implementations are not required to tolerate concurrent calls; the
/// [`crate::PageRenderer`] serialises all access behind its handle lock.
pub trait RenderService {
    /// Total number of pages. Constant for the lifetime of the handle.
    fn page_count(&self) -> usize;

    /// Natural pixel dimensions of the page at `index`.
    fn page_size(&self, index: usize) -> Result<(u32, u32), PageSourceError>;

    /// Paint the page at `index` into a raster buffer at its natural pixel
    /// dimensions, using display-quality rendering.
    fn render_page(&self, index: usize) -> Result<DynamicImage, PageSourceError>;
}

/// [`RenderService`] backed by pdfium.
///
/// The document is validated and opened once at construction; each operation
/// re-opens it from the stored path and drops it on return.
pub struct PdfiumRenderService {
    path: PathBuf,
    password: Option<String>,
    page_count: usize,
    max_rendered_pixels: Option<u32>,
}

impl PdfiumRenderService {
    /// Open the document at `path`.
    ///
    /// Validates existence, readability, and the `%PDF` magic bytes before
    /// handing the file to pdfium, so callers get a meaningful error rather
    /// than an opaque backend failure. The page count is read here and is
    /// assumed immutable for the service's lifetime.
    pub fn open(path: &Path, config: &SourceConfig) -> Result<Self, PageSourceError> {
        validate_pdf_file(path)?;

        let pdfium = Pdfium::default();
        let document = pdfium
            .load_pdf_from_file(path, config.password.as_deref())
            .map_err(|e| open_error(path, config.password.is_some(), e))?;

        let page_count = document.pages().len() as usize;
        info!("Opened PDF '{}': {} pages", path.display(), page_count);

        Ok(Self {
            path: path.to_path_buf(),
            password: config.password.clone(),
            page_count,
            max_rendered_pixels: config.max_rendered_pixels,
        })
    }

    /// Re-open the document and run `f` against it.
    fn with_document<T>(
        &self,
        f: impl FnOnce(&PdfDocument) -> Result<T, PageSourceError>,
    ) -> Result<T, PageSourceError> {
        let pdfium = Pdfium::default();
        let document = pdfium
            .load_pdf_from_file(&self.path, self.password.as_deref())
            .map_err(|e| open_error(&self.path, self.password.is_some(), e))?;
        f(&document)
    }

    /// Natural pixel size of a page, with the longest edge clamped to the
    /// configured cap (aspect ratio preserved).
    fn target_size(&self, page: &PdfPage) -> (u32, u32) {
        let w = page.width().value.round().max(1.0) as u32;
        let h = page.height().value.round().max(1.0) as u32;
        match self.max_rendered_pixels {
            Some(cap) if w.max(h) > cap => {
                let scale = cap as f32 / w.max(h) as f32;
                (
                    ((w as f32 * scale).round() as u32).max(1),
                    ((h as f32 * scale).round() as u32).max(1),
                )
            }
            _ => (w, h),
        }
    }
}

impl RenderService for PdfiumRenderService {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_size(&self, index: usize) -> Result<(u32, u32), PageSourceError> {
        self.with_document(|document| {
            let pages = document.pages();
            let page = pages.get(index as u16).map_err(|e| render_failed(index, e))?;
            Ok(self.target_size(&page))
        })
    }

    fn render_page(&self, index: usize) -> Result<DynamicImage, PageSourceError> {
        self.with_document(|document| {
            let pages = document.pages();
            let page = pages.get(index as u16).map_err(|e| render_failed(index, e))?;
            let (width, height) = self.target_size(&page);

            let render_config =
                PdfRenderConfig::new().set_target_size(width as i32, height as i32);

            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| render_failed(index, e))?;

            let image = bitmap.as_image();
            debug!("Rendered page {} → {}x{} px", index, image.width(), image.height());

            Ok(image)
        })
    }
}

/// Check the file exists, is readable, and starts with the `%PDF` magic.
fn validate_pdf_file(path: &Path) -> Result<(), PageSourceError> {
    if !path.exists() {
        return Err(PageSourceError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(PageSourceError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(PageSourceError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(PageSourceError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

fn render_failed(index: usize, e: PdfiumError) -> PageSourceError {
    PageSourceError::RenderFailed {
        index,
        detail: format!("{e:?}"),
    }
}

/// Map a pdfium load failure to the open-error family.
fn open_error(path: &Path, had_password: bool, e: PdfiumError) -> PageSourceError {
    let path: PathBuf = path.to_path_buf();
    let err_str = format!("{e:?}");
    if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            PageSourceError::WrongPassword { path }
        } else {
            PageSourceError::PasswordRequired { path }
        }
    } else {
        PageSourceError::CorruptDocument {
            path,
            detail: err_str,
        }
    }
}
