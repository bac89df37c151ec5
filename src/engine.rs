//! Chart lifecycle adapter.
//!
//! The engine owns a side table of per-chart state keyed by [`ChartId`].
//! Entries are created on first use and dropped by [`OutlabelsEngine::destroy`].
//! Hosts call the hooks in the same order a chart library would:
//! `resize` when the canvas changes, `after_dataset_update` once new arcs
//! exist, `after_update` to run the fit loop, then `after_dataset_draw`.

use std::collections::HashMap;

use crate::canvas::Canvas;
use crate::config::{DatasetOverride, LabelContext, OutlabelOptions};
use crate::draw::draw_label;
use crate::layout::fit::{fit_chart_area, FitReport};
use crate::layout::geometry::BoundingBox;
use crate::layout::label::OutLabel;
use crate::layout::resolver::resolve_labels;
use crate::layout::{ArcElement, ChartId};
use crate::text_metrics::{FallbackMetrics, MeasureText, SystemFontMetrics};
use crate::theme::Theme;

/// What the engine needs from the chart that owns the arcs.
pub trait PieHost {
    fn chart_id(&self) -> ChartId;
    /// Canvas height in pixels; resizable fonts scale with it.
    fn canvas_height(&self) -> f32;
    /// Plot area the labels have to fit in.
    fn chart_area(&self) -> BoundingBox;
    fn labels(&self) -> &[String];
    fn data(&self) -> &[f64];
    /// Sum of the visible data, the base for percentages.
    fn total(&self) -> f64;
    fn is_data_visible(&self, index: usize) -> bool;
    fn dataset_color(&self, index: usize) -> Option<String>;
    fn dataset_override(&self) -> &DatasetOverride;
    fn arcs(&self) -> &[ArcElement];
    fn outer_radius(&self) -> f32;
    /// Multiply both radii by `zoom` and re-derive the arcs.
    fn scale_radius(&mut self, zoom: f32);

    fn label_context(&self, index: usize) -> LabelContext {
        let value = self.data().get(index).copied().unwrap_or(f64::NAN);
        let total = self.total();
        LabelContext {
            data_index: index,
            label: self.labels().get(index).cloned().unwrap_or_default(),
            value,
            percent: if total > 0.0 { value / total } else { 0.0 },
            dataset_color: self.dataset_color(index),
        }
    }
}

/// Transient state of one chart.
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    /// Set by a resize; the next rebuild drops every stored offset.
    pub size_changed: bool,
    /// True while the fit loop runs; drawing is suppressed meanwhile.
    pub fitting: bool,
    pub labels: Vec<Option<OutLabel>>,
    /// Fit-loop radius floor; `None` lets the loop shrink freely.
    pub max_zoom_out_percentage: Option<f32>,
    pub last_fit: Option<FitReport>,
}

pub struct OutlabelsEngine {
    options: OutlabelOptions,
    theme: Theme,
    measurer: Box<dyn MeasureText + Send + Sync>,
    states: HashMap<ChartId, ChartState>,
}

impl OutlabelsEngine {
    /// Engine measuring text with system fonts.
    pub fn new(options: OutlabelOptions, theme: Theme) -> Self {
        Self::with_measurer(options, theme, SystemFontMetrics)
    }

    /// Engine measuring text with calibrated glyph widths only.
    pub fn with_fallback_metrics(options: OutlabelOptions, theme: Theme) -> Self {
        Self::with_measurer(options, theme, FallbackMetrics)
    }

    pub fn with_measurer<M>(options: OutlabelOptions, theme: Theme, measurer: M) -> Self
    where
        M: MeasureText + Send + Sync + 'static,
    {
        Self {
            options,
            theme,
            measurer: Box::new(measurer),
            states: HashMap::new(),
        }
    }

    pub fn options(&self) -> &OutlabelOptions {
        &self.options
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn state(&self, chart: ChartId) -> Option<&ChartState> {
        self.states.get(&chart)
    }

    pub fn state_mut(&mut self, chart: ChartId) -> &mut ChartState {
        state_entry(&mut self.states, chart, &self.options)
    }

    pub fn labels(&self, chart: ChartId) -> &[Option<OutLabel>] {
        self.states
            .get(&chart)
            .map(|state| state.labels.as_slice())
            .unwrap_or_default()
    }

    pub fn chart_count(&self) -> usize {
        self.states.len()
    }

    pub fn resize(&mut self, chart: ChartId) {
        tracing::trace!(?chart, "chart resized");
        self.state_mut(chart).size_changed = true;
    }

    /// Drop everything kept for `chart`. Returns whether state existed.
    pub fn destroy(&mut self, chart: ChartId) -> bool {
        tracing::trace!(?chart, "chart destroyed");
        self.states.remove(&chart).is_some()
    }

    /// Rebuild one label per arc from the current data and options.
    pub fn after_dataset_update<H: PieHost + ?Sized>(&mut self, host: &H) {
        let chart = host.chart_id();
        let options = host.dataset_override().configure(&self.options);
        let theme = &self.theme;
        let measurer = self.measurer.as_ref();
        let state = state_entry(&mut self.states, chart, &self.options);

        let count = host.arcs().len();
        let mut previous = std::mem::take(&mut state.labels);
        let mut labels = Vec::with_capacity(count);
        for index in 0..count {
            let built = options
                .as_ref()
                .filter(|_| host.is_data_visible(index))
                .and_then(|options| {
                    let context = host.label_context(index);
                    OutLabel::new(options, &context, theme, host.canvas_height(), measurer)
                        .map_err(|skip| tracing::trace!(index, ?skip, "no outlabel"))
                        .ok()
                });
            let inherited = previous.get_mut(index).and_then(Option::take);
            labels.push(built.map(|mut label| {
                if let Some(old) = inherited
                    && !state.size_changed
                    && old.same_content(&label)
                {
                    label.offset = old.offset;
                }
                label
            }));
        }

        state.labels = labels;
        state.max_zoom_out_percentage = options
            .as_ref()
            .and_then(OutlabelOptions::max_zoom_out_percentage);
        state.size_changed = false;
        tracing::trace!(?chart, count, "outlabels rebuilt");
    }

    /// Run the fit loop for `chart`.
    pub fn after_update<H: PieHost + ?Sized>(&mut self, host: &mut H) -> FitReport {
        let state = state_entry(&mut self.states, host.chart_id(), &self.options);
        state.fitting = true;
        let report = fit_chart_area(host, &mut state.labels, state.max_zoom_out_percentage);
        state.fitting = false;
        state.last_fit = Some(report);
        tracing::debug!(
            steps = report.steps,
            radius = report.radius,
            outcome = ?report.outcome,
            "outlabel fit finished"
        );
        report
    }

    /// Place and draw the labels. Returns how many were drawn.
    pub fn after_dataset_draw<H, C>(&mut self, host: &H, canvas: &mut C) -> usize
    where
        H: PieHost + ?Sized,
        C: Canvas + ?Sized,
    {
        let Some(state) = self.states.get_mut(&host.chart_id()) else {
            return 0;
        };
        if state.fitting {
            return 0;
        }

        resolve_labels(&mut state.labels, host.arcs(), |index| {
            host.is_data_visible(index)
        });

        let mut drawn = 0;
        for (index, slot) in state.labels.iter().enumerate() {
            let Some(label) = slot else {
                continue;
            };
            if !label.is_visible() || !host.is_data_visible(index) {
                continue;
            }
            draw_label(canvas, label);
            drawn += 1;
        }
        drawn
    }

    /// Rebuild labels and fit in one go, for hosts that just laid out their arcs.
    pub fn update<H: PieHost + ?Sized>(&mut self, host: &mut H) -> FitReport {
        self.after_dataset_update(&*host);
        self.after_update(host)
    }
}

/// State for `chart`, created with the engine-wide zoom-out floor on first use.
fn state_entry<'a>(
    states: &'a mut HashMap<ChartId, ChartState>,
    chart: ChartId,
    options: &OutlabelOptions,
) -> &'a mut ChartState {
    states.entry(chart).or_insert_with(|| ChartState {
        max_zoom_out_percentage: options.max_zoom_out_percentage(),
        ..Default::default()
    })
}
