//! Contract tests for the page source, driven by a recording fake service.
//!
//! The fake stands in for the host rendering backend so these tests can
//! assert the parts pdfium cannot show: that renders are strictly
//! non-overlapping, that teardown waits for an in-flight render, and that
//! the loader's lazy enumeration touches the service exactly when promised.

use image::{DynamicImage, Rgba, RgbaImage};
use pdf_pagesource::{
    PageLoader, PageRenderer, PageSourceError, PageStatus, RenderService,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ── Recording fake ───────────────────────────────────────────────────────────

/// Shared observation state, kept outside the service so tests can inspect it
/// after the renderer has taken ownership of the fake.
#[derive(Default)]
struct Recording {
    /// Indices passed to `render_page`, in call order.
    calls: Mutex<Vec<usize>>,
    /// Set while a render is executing inside the service.
    in_render: AtomicBool,
    /// Latched if a second render ever started while one was active.
    overlapped: AtomicBool,
    /// Completed render count.
    finished: AtomicUsize,
    /// Wall-clock instant the most recent render finished.
    last_finish: Mutex<Option<Instant>>,
}

struct RecordingService {
    pages: Vec<(u32, u32)>,
    render_delay: Duration,
    recording: Arc<Recording>,
}

impl RecordingService {
    fn new(pages: Vec<(u32, u32)>, render_delay: Duration) -> (Self, Arc<Recording>) {
        let recording = Arc::new(Recording::default());
        (
            Self {
                pages,
                render_delay,
                recording: Arc::clone(&recording),
            },
            recording,
        )
    }
}

impl RenderService for RecordingService {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, index: usize) -> Result<(u32, u32), PageSourceError> {
        Ok(self.pages[index])
    }

    fn render_page(&self, index: usize) -> Result<DynamicImage, PageSourceError> {
        if self.recording.in_render.swap(true, Ordering::SeqCst) {
            self.recording.overlapped.store(true, Ordering::SeqCst);
        }
        self.recording.calls.lock().unwrap().push(index);

        // Widen the race window: a serialisation bug shows up as overlap.
        std::thread::sleep(self.render_delay);

        let (w, h) = self.pages[index];
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255])));

        *self.recording.last_finish.lock().unwrap() = Some(Instant::now());
        self.recording.finished.fetch_add(1, Ordering::SeqCst);
        self.recording.in_render.store(false, Ordering::SeqCst);
        Ok(image)
    }
}

// ── Scenario: 3-page chapter (happy path) ───────────────────────────────────

#[test]
fn three_page_chapter_end_to_end() {
    let (service, recording) =
        RecordingService::new(vec![(100, 140), (110, 150), (120, 160)], Duration::ZERO);
    let loader = PageLoader::from_renderer(PageRenderer::from_service(service));

    // Enumeration is metadata-only: 3 descriptors, nothing rendered yet.
    let pages = loader.pages().expect("loader is active");
    assert_eq!(pages.len(), 3);
    assert!(recording.calls.lock().unwrap().is_empty());

    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.index(), i);
        assert_eq!(loader.page_status(page), PageStatus::Ready);
    }

    // Consuming descriptor 1 renders exactly page 1; the decoded dimensions
    // match the service-reported size for that page.
    let png = pages[1].bytes().expect("render should succeed");
    assert!(!png.is_empty());
    let decoded = image::load_from_memory(&png).expect("valid PNG");
    assert_eq!((decoded.width(), decoded.height()), (110, 150));
    assert_eq!(*recording.calls.lock().unwrap(), vec![1]);

    // Recycle: status flips to error for every previously obtained
    // descriptor, and pending suppliers fail closed.
    loader.recycle();
    for page in &pages {
        assert_eq!(loader.page_status(page), PageStatus::Error);
    }
    assert!(pages[0].bytes().unwrap_err().is_closed());
}

#[test]
fn page_count_equals_descriptor_count() {
    for n in [1usize, 2, 7] {
        let (service, _) = RecordingService::new(vec![(50, 50); n], Duration::ZERO);
        let renderer = PageRenderer::from_service(service);
        let count = renderer.page_count().unwrap();
        let loader = PageLoader::from_renderer(renderer);
        assert_eq!(loader.pages().unwrap().len(), count);
    }
}

#[test]
fn every_in_range_index_renders_to_a_valid_raster() {
    let (service, _) =
        RecordingService::new(vec![(90, 120), (91, 121), (92, 122)], Duration::ZERO);
    let renderer = PageRenderer::from_service(service);

    for index in 0..renderer.page_count().unwrap() {
        let png = renderer.render_page(index).expect("in-range render succeeds");
        assert!(!png.is_empty());
        let decoded = image::load_from_memory(&png).expect("valid PNG");
        assert!(decoded.width() > 0 && decoded.height() > 0);
        assert_eq!(decoded.width(), 90 + index as u32);
    }
}

#[test]
fn out_of_range_render_never_reaches_the_service() {
    let (service, recording) = RecordingService::new(vec![(50, 50); 2], Duration::ZERO);
    let renderer = PageRenderer::from_service(service);

    let err = renderer.render_page(5).unwrap_err();
    assert!(matches!(
        err,
        PageSourceError::PageOutOfRange { index: 5, total: 2 }
    ));
    assert!(recording.calls.lock().unwrap().is_empty());
}

// ── Concurrency: mutual exclusion across callers ─────────────────────────────

#[test]
fn concurrent_renders_for_different_pages_never_overlap() {
    let (service, recording) =
        RecordingService::new(vec![(60, 60); 4], Duration::from_millis(40));
    let renderer = Arc::new(PageRenderer::from_service(service));

    let mut handles = Vec::new();
    for index in 0..4 {
        let renderer = Arc::clone(&renderer);
        handles.push(std::thread::spawn(move || renderer.render_page(index)));
    }
    for handle in handles {
        handle.join().expect("no panics").expect("render succeeds");
    }

    assert!(
        !recording.overlapped.load(Ordering::SeqCst),
        "two renders executed inside the service at the same time"
    );
    assert_eq!(recording.finished.load(Ordering::SeqCst), 4);

    // All four pages rendered, order unspecified beyond mutual exclusion.
    let mut calls = recording.calls.lock().unwrap().clone();
    calls.sort_unstable();
    assert_eq!(calls, vec![0, 1, 2, 3]);
}

#[test]
fn recycle_waits_for_inflight_render() {
    let (service, recording) =
        RecordingService::new(vec![(80, 80)], Duration::from_millis(120));
    let loader = Arc::new(PageLoader::from_renderer(PageRenderer::from_service(
        service,
    )));
    let pages = loader.pages().unwrap();
    let page = &pages[0];

    // Enumerate the descriptor before spawning so the race is purely between
    // the render and the recycle, not the enumeration.
    let mut for_thread = loader.pages().unwrap();
    let thread_page = for_thread.remove(0);
    let render_thread = std::thread::spawn(move || thread_page.bytes());

    // Wait until the render is actually inside the service, then recycle.
    let deadline = Instant::now() + Duration::from_secs(5);
    while !recording.in_render.load(Ordering::SeqCst) {
        assert!(Instant::now() < deadline, "render thread never started");
        std::thread::sleep(Duration::from_millis(1));
    }
    loader.recycle();
    let recycled_at = Instant::now();

    // The in-flight render completed successfully before the handle was
    // released — recycle blocked on the handle lock.
    let rendered = render_thread.join().expect("no panic");
    assert!(rendered.is_ok(), "in-flight render must finish first");

    let finished_at = recording
        .last_finish
        .lock()
        .unwrap()
        .expect("render recorded a finish time");
    assert!(
        finished_at <= recycled_at,
        "recycle returned before the in-flight render finished"
    );

    // And afterwards the source is gone for good.
    assert!(page.bytes().unwrap_err().is_closed());
    assert_eq!(loader.page_status(page), PageStatus::Error);
}

#[test]
fn close_is_a_no_op_the_second_time_even_under_contention() {
    let (service, _) = RecordingService::new(vec![(40, 40)], Duration::ZERO);
    let renderer = Arc::new(PageRenderer::from_service(service));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let renderer = Arc::clone(&renderer);
        handles.push(std::thread::spawn(move || renderer.close()));
    }
    for handle in handles {
        handle.join().expect("close never panics");
    }
    assert!(renderer.is_closed());
    assert!(renderer.render_page(0).unwrap_err().is_closed());
}
