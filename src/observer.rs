//! Progress reporting for the detection pipeline.
//!
//! The orchestrator never prints; it hands `DetectionEvent`s to an injected
//! `DetectionObserver`. `TracingObserver` forwards them to `tracing` when the
//! feature is enabled, `NoopObserver` drops them, and tests can record them.

use crate::region::DetectionMethod;
use crate::trace::trace_event;
use std::time::Duration;

/// A step completed while processing a page or a batch.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectionEvent {
    /// Detection on a page began.
    PageStarted { page_num: usize, width: u32, height: u32 },
    /// One detector returned its suppressed candidates.
    DetectorFinished {
        page_num: usize,
        method: DetectionMethod,
        count: usize,
    },
    /// Cross-detector suppression ran.
    Consolidated {
        page_num: usize,
        before: usize,
        after: usize,
    },
    /// The global confidence filter ran.
    Filtered { page_num: usize, remaining: usize },
    /// Detection on a page finished.
    PageFinished {
        page_num: usize,
        regions: usize,
        elapsed: Duration,
    },
    /// A multi-page run finished.
    BatchFinished {
        pages: usize,
        regions: usize,
        pages_with_detections: usize,
    },
}

/// Receives pipeline progress events.
pub trait DetectionObserver: Send + Sync {
    fn on_event(&self, event: &DetectionEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl DetectionObserver for NoopObserver {
    fn on_event(&self, _event: &DetectionEvent) {}
}

/// Emits every event as a `tracing` info event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl DetectionObserver for TracingObserver {
    fn on_event(&self, event: &DetectionEvent) {
        match *event {
            DetectionEvent::PageStarted {
                page_num,
                width,
                height,
            } => {
                trace_event!("page_started", page = page_num, width = width, height = height);
            }
            DetectionEvent::DetectorFinished {
                page_num,
                method,
                count,
            } => {
                trace_event!(
                    "detector_finished",
                    page = page_num,
                    method = method.as_str(),
                    count = count
                );
            }
            DetectionEvent::Consolidated {
                page_num,
                before,
                after,
            } => {
                trace_event!("consolidated", page = page_num, before = before, after = after);
            }
            DetectionEvent::Filtered {
                page_num,
                remaining,
            } => {
                trace_event!("filtered", page = page_num, remaining = remaining);
            }
            DetectionEvent::PageFinished {
                page_num,
                regions,
                elapsed,
            } => {
                trace_event!(
                    "page_finished",
                    page = page_num,
                    regions = regions,
                    elapsed_ms = elapsed.as_secs_f64() * 1e3
                );
            }
            DetectionEvent::BatchFinished {
                pages,
                regions,
                pages_with_detections,
            } => {
                trace_event!(
                    "batch_finished",
                    pages = pages,
                    regions = regions,
                    pages_with_detections = pages_with_detections
                );
            }
        }
    }
}
