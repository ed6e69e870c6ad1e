//! # pdf-pagesource
//!
//! Serve a PDF chapter as a sequence of lazily rendered, losslessly encoded
//! page images for a reader front-end.
//!
//! ## Why this crate?
//!
//! Comic and document readers want one thing from a PDF: "give me page N as
//! an image, when I ask for it". Full PDF toolkits answer with text layers,
//! annotations, and eager rasterisation. This crate is the thin layer a
//! reader actually needs — open once, enumerate cheap page descriptors up
//! front, render each page to PNG only when its bytes are consumed, and tear
//! everything down safely even while a render is in flight.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF file
//!  │
//!  ├─ 1. Open     validate magic bytes, acquire document handle (pdfium)
//!  ├─ 2. Loader   enumerate one descriptor per page (metadata only)
//!  ├─ 3. Render   on demand, serialised behind the handle lock
//!  └─ 4. Encode   raster → lossless PNG bytes, buffer dropped immediately
//! ```
//!
//! Data flow is strictly pull-based: nothing is rendered until a descriptor's
//! [`bytes`](PageDescriptor::bytes) supplier is invoked.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_pagesource::{PageLoader, SourceConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SourceConfig::default();
//!     let loader = PageLoader::open(Path::new("chapter.pdf"), &config)?;
//!
//!     for page in loader.pages()? {
//!         let png = page.bytes()?; // rendered here, not earlier
//!         std::fs::write(format!("page-{:03}.png", page.index()), png)?;
//!     }
//!
//!     loader.recycle();
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Renders are blocking and strictly serialised: the document handle is
//! guarded by one mutex, and `close()`/`recycle()` take the same lock, so a
//! teardown racing an in-flight render waits for it instead of releasing the
//! handle mid-paint. The crate owns no threads and no async runtime; callers
//! that must not block (UI threads) dispatch renders onto their own workers.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfpages` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf-pagesource = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod encode;
pub mod error;
pub mod loader;
pub mod renderer;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PageSelection, SourceConfig, SourceConfigBuilder};
pub use error::PageSourceError;
pub use loader::{PageDescriptor, PageLoader, PageStatus};
pub use renderer::{DocumentInfo, PageDimensions, PageRenderer};
pub use service::{PdfiumRenderService, RenderService};
