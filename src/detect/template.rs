//! Multi-scale ZNCC matching against a library of known seals.
//!
//! Each scaled template is searched coarse-to-fine. The full placement range
//! is scored on the coarsest pyramid level the template still resolves on,
//! with the threshold lowered by `template_coarse_margin`. Surviving peaks
//! are followed down one level at a time within `REFINE_RADIUS` and finally
//! confirmed at full resolution with the same ZNCC score an exhaustive scan
//! would produce. Templates too small for any coarse level are scanned
//! exhaustively.

use crate::candidate::{suppress_overlaps, suppress_peaks};
use crate::config::DetectionConfig;
use crate::detect::RegionDetector;
use crate::kernel::scalar::{placement_range, ZnccScalar};
use crate::kernel::{zncc_scan, Hit, Kernel, Roi, ScanParams, WindowStats};
use crate::raster::io::view_from_gray_image;
use crate::raster::preprocess::PreparedPage;
use crate::raster::pyramid::{downsample_box, GrayPyramid};
use crate::raster::ImageView;
use crate::region::{DetectedRegion, DetectionMethod};
use crate::template::{Template, TemplateLibrary, TemplatePlan, TemplateWarning};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::math::linspace;
use crate::util::SealScanResult;
use image::GrayImage;
use std::collections::BTreeMap;
use std::path::Path;

/// Smallest template side searched on a reduced pyramid level.
pub const COARSE_MIN_TEMPLATE_SIDE: u32 = 32;
/// Coarse peaks within this Chebyshev distance merge into one seed.
const COARSE_PEAK_RADIUS: usize = 3;
/// Seeds followed per template and scale.
const COARSE_BEAM_WIDTH: usize = 64;
/// Placement search radius around an upsampled seed.
const REFINE_RADIUS: usize = 2;

/// Finds placements of library templates across a range of scales.
#[derive(Clone, Debug)]
pub struct TemplateMatcher {
    config: DetectionConfig,
    library: TemplateLibrary,
}

impl TemplateMatcher {
    /// Loads templates from `templates_dir`.
    ///
    /// A missing directory or an empty one leaves the matcher without
    /// templates; the problems are available from `warnings`.
    pub fn new<P: AsRef<Path>>(config: DetectionConfig, templates_dir: P) -> Self {
        Self::from_library(config, TemplateLibrary::load_dir(templates_dir))
    }

    /// Uses an already loaded library.
    pub fn from_library(config: DetectionConfig, library: TemplateLibrary) -> Self {
        Self { config, library }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Returns the template library.
    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    /// Adds or replaces a named template for subsequent calls.
    pub fn add_template(&mut self, name: impl Into<String>, template: Template) -> Option<Template> {
        let name = name.into();
        trace_event!(
            "template_added",
            template = name.as_str(),
            width = template.width(),
            height = template.height()
        );
        self.library.insert(name, template)
    }

    /// Removes a named template; returns whether it existed.
    pub fn remove_template(&mut self, name: &str) -> bool {
        self.library.remove(name).is_some()
    }

    /// Names of the loaded templates in sorted order.
    pub fn template_names(&self) -> Vec<&str> {
        self.library.names()
    }

    /// Problems encountered while loading templates.
    pub fn warnings(&self) -> &[TemplateWarning] {
        self.library.warnings()
    }

    /// Scales evaluated for every template.
    pub fn scales(&self) -> Vec<f32> {
        let (min, max) = self.config.template_scale_range;
        linspace(min, max, self.config.template_scale_steps)
    }

    /// Scores every template at every scale and keeps placements at or above
    /// the template confidence threshold.
    pub fn find_matches(&self, gray: &GrayImage) -> Vec<DetectedRegion> {
        if self.library.is_empty() {
            return Vec::new();
        }
        let _span = trace_span!("template_match", templates = self.library.len()).entered();

        let pyramid = GrayPyramid::build(gray, self.config.template_pyramid_levels);
        let Ok(levels) = pyramid
            .levels()
            .iter()
            .map(PageLevel::new)
            .collect::<SealScanResult<Vec<_>>>()
        else {
            return Vec::new();
        };
        let scales = self.scales();

        let mut candidates = Vec::new();
        for (name, template) in self.library.iter() {
            for &scale in &scales {
                let Some(scaled) = template.scaled(scale) else {
                    continue;
                };
                if scaled.width() > gray.width() || scaled.height() > gray.height() {
                    continue;
                }
                let hits = match self.match_scaled(&levels, &scaled) {
                    Ok(hits) => hits,
                    Err(err) => {
                        trace_warn!(
                            "template skipped at scale",
                            template = name,
                            scale = scale,
                            reason = err.to_string().as_str()
                        );
                        continue;
                    }
                };
                for hit in hits {
                    let region = DetectedRegion::new(
                        hit.x as u32,
                        hit.y as u32,
                        scaled.width(),
                        scaled.height(),
                        hit.score,
                        DetectionMethod::Template,
                    );
                    if let Ok(region) = region {
                        candidates.push(region.with_template_name(name));
                    }
                }
            }
        }

        trace_event!("template_candidates", count = candidates.len());
        suppress_overlaps(candidates, self.config.nms_threshold)
    }

    /// Placements of one scaled template scoring at or above the threshold,
    /// in row-major order.
    fn match_scaled(&self, levels: &[PageLevel<'_>], scaled: &GrayImage) -> SealScanResult<Vec<Hit>> {
        let plans = template_plans(scaled, levels.len())?;
        let coarse = plans.len() - 1;
        let (Some(base), Some(top)) = (levels.first(), levels.get(coarse)) else {
            return Ok(Vec::new());
        };
        let (Some(fine_plan), Some(coarse_plan)) = (plans.first(), plans.last()) else {
            return Ok(Vec::new());
        };

        let threshold = self.config.template_confidence_threshold;
        let fine_params = ScanParams {
            min_score: threshold,
            ..ScanParams::default()
        };
        if coarse == 0 {
            return zncc_scan(base.view, &base.stats, fine_plan, fine_params);
        }

        let coarse_params = ScanParams {
            min_score: threshold - self.config.template_coarse_margin,
            ..ScanParams::default()
        };
        let coarse_hits = zncc_scan(top.view, &top.stats, coarse_plan, coarse_params)?;
        let seeds = suppress_peaks(coarse_hits, COARSE_PEAK_RADIUS, COARSE_BEAM_WIDTH);
        trace_event!("template_seeds", level = coarse, count = seeds.len());

        let mut confirmed = BTreeMap::new();
        for seed in seeds {
            let Some(roi) = descend(levels, &plans, coarse, seed)? else {
                continue;
            };
            let hits =
                <ZnccScalar as Kernel>::scan_roi(base.view, &base.stats, fine_plan, roi, fine_params)?;
            for hit in hits {
                confirmed.insert((hit.y, hit.x), hit);
            }
        }
        Ok(confirmed.into_values().collect())
    }
}

/// One page pyramid level with its window statistics.
struct PageLevel<'a> {
    view: ImageView<'a, u8>,
    stats: WindowStats,
}

impl<'a> PageLevel<'a> {
    fn new(img: &'a GrayImage) -> SealScanResult<Self> {
        let view = view_from_gray_image(img)?;
        Ok(Self {
            view,
            stats: WindowStats::new(view),
        })
    }
}

/// Zero-mean plans of `scaled` on every level it is searched at, finest first.
///
/// Reduction stops at the first level that would be flat or would leave the
/// template shorter than `COARSE_MIN_TEMPLATE_SIDE`.
fn template_plans(scaled: &GrayImage, page_levels: usize) -> SealScanResult<Vec<TemplatePlan>> {
    let mut plans = vec![view_from_gray_image(scaled).and_then(TemplatePlan::from_view)?];
    let mut next = downsample_box(scaled);
    while plans.len() < page_levels {
        let Some(level) = next.take() else {
            break;
        };
        if level.width() < COARSE_MIN_TEMPLATE_SIDE || level.height() < COARSE_MIN_TEMPLATE_SIDE {
            break;
        }
        let Ok(plan) = view_from_gray_image(&level).and_then(TemplatePlan::from_view) else {
            break;
        };
        plans.push(plan);
        next = downsample_box(&level);
    }
    Ok(plans)
}

/// Follows a coarse seed down the pyramid, keeping the best placement near
/// the upsampled position on each level, and returns the full-resolution
/// window to confirm. `None` when the seed runs off the page or only flat
/// windows remain.
fn descend(
    levels: &[PageLevel<'_>],
    plans: &[TemplatePlan],
    coarse: usize,
    seed: Hit,
) -> SealScanResult<Option<Roi>> {
    let (mut x, mut y) = (seed.x, seed.y);
    for level in (0..coarse).rev() {
        let (Some(page), Some(plan)) = (levels.get(level), plans.get(level)) else {
            return Ok(None);
        };
        let (max_x, max_y) = placement_range(page.view, plan)?;
        let Some(roi) = Roi::around(x * 2, y * 2, REFINE_RADIUS, max_x, max_y) else {
            return Ok(None);
        };
        if level == 0 {
            return Ok(Some(roi));
        }
        let best = <ZnccScalar as Kernel>::scan_roi(
            page.view,
            &page.stats,
            plan,
            roi,
            ScanParams::default(),
        )?
        .into_iter()
        .max_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| b.y.cmp(&a.y))
                .then_with(|| b.x.cmp(&a.x))
        });
        let Some(best) = best else {
            return Ok(None);
        };
        x = best.x;
        y = best.y;
    }
    Ok(None)
}

impl RegionDetector for TemplateMatcher {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Template
    }

    fn detect(&self, page: &PreparedPage) -> Vec<DetectedRegion> {
        self.find_matches(page.gray())
    }
}
