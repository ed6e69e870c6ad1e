//! Configuration types for opening and rendering a page source.
//!
//! Everything lives in one [`SourceConfig`] built via its builder, so a
//! config can be shared across threads, logged, and diffed between two runs.

use crate::error::PageSourceError;
use serde::{Deserialize, Serialize};

/// Configuration for opening a PDF page source.
///
/// # Example
/// ```rust
/// use pdf_pagesource::SourceConfig;
///
/// let config = SourceConfig::builder()
///     .max_rendered_pixels(2000)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// PDF user password for encrypted documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Maximum rendered page dimension (width or height) in pixels.
    /// Default: None (render at the page's natural pixel size).
    ///
    /// A safety cap independent of page size. An A0 poster page rendered at
    /// natural size could produce a raster large enough to exhaust memory on
    /// a phone; capping the longest edge scales the other dimension
    /// proportionally so one page never allocates more than roughly
    /// `max_rendered_pixels²` bytes of pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rendered_pixels: Option<u32>,
}

impl SourceConfig {
    /// Create a new builder for `SourceConfig`.
    pub fn builder() -> SourceConfigBuilder {
        SourceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SourceConfig`].
#[derive(Debug)]
pub struct SourceConfigBuilder {
    config: SourceConfig,
}

impl SourceConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = Some(px);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SourceConfig, PageSourceError> {
        if let Some(px) = self.config.max_rendered_pixels {
            if px < 16 {
                return Err(PageSourceError::InvalidConfig(format!(
                    "max_rendered_pixels must be ≥ 16, got {px}"
                )));
            }
        }
        Ok(self.config)
    }
}

/// Specifies which pages of the document to process (CLI `dump` command).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// All pages (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed
    /// page numbers, clipped to `total_pages`.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = SourceConfig::builder().build().unwrap();
        assert!(config.password.is_none());
        assert!(config.max_rendered_pixels.is_none());
    }

    #[test]
    fn builder_rejects_tiny_pixel_cap() {
        let err = SourceConfig::builder()
            .max_rendered_pixels(4)
            .build()
            .unwrap_err();
        assert!(matches!(err, PageSourceError::InvalidConfig(_)));
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).to_indices(5),
            vec![0, 2] // deduplicated and sorted
        );
    }

    #[test]
    fn page_selection_range_clipping() {
        // Range 3-10 on a 4-page doc → pages 3 and 4 (indices 2, 3)
        assert_eq!(PageSelection::Range(3, 10).to_indices(4), vec![2, 3]);
    }
}
