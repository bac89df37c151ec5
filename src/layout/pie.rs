use std::f32::consts::PI;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{DatasetOverride, Padding};
use crate::engine::PieHost;
use crate::ir::{ChartKind, ChartSpec};
use crate::theme::Theme;

use super::geometry::BoundingBox;
use super::types::{ArcElement, ChartId};

const DEFAULT_WIDTH: f32 = 800.0;
const DEFAULT_HEIGHT: f32 = 500.0;
/// Slices start at twelve o'clock.
const ROTATION: f32 = -PI / 2.0;
const CIRCUMFERENCE: f32 = PI * 2.0;

static NEXT_CHART_ID: AtomicU64 = AtomicU64::new(1);

/// Pie/doughnut arc controller for the first dataset of a chart document.
#[derive(Debug, Clone)]
pub struct PieChart {
    id: ChartId,
    pub kind: ChartKind,
    pub width: f32,
    pub height: f32,
    pub padding: Padding,
    /// Inner radius as a percentage of the outer radius.
    pub cutout: f32,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub hidden: Vec<bool>,
    pub colors: Vec<String>,
    pub dataset_override: DatasetOverride,
    outer_radius: f32,
    inner_radius: f32,
    arcs: Vec<ArcElement>,
}

impl PieChart {
    pub fn from_spec(spec: &ChartSpec, theme: &Theme) -> Self {
        let dataset = spec.first_dataset().ok();
        let count = dataset.map_or(0, |dataset| dataset.data.len());
        let labels = (0..count)
            .map(|index| spec.data.labels.get(index).cloned().unwrap_or_default())
            .collect();
        let values = (0..count)
            .map(|index| dataset.map_or(f64::NAN, |dataset| dataset.value(index)))
            .collect();
        let hidden = (0..count)
            .map(|index| dataset.is_some_and(|dataset| dataset.is_hidden(index)))
            .collect();
        let colors = (0..count)
            .map(|index| {
                dataset
                    .and_then(|dataset| dataset.background_color.as_ref())
                    .and_then(|colors| colors.color_at(index))
                    .unwrap_or_else(|| theme.slice_color(index))
                    .to_string()
            })
            .collect();

        let mut chart = Self {
            id: ChartId(NEXT_CHART_ID.fetch_add(1, Ordering::Relaxed)),
            kind: spec.kind,
            width: spec.width.unwrap_or(DEFAULT_WIDTH),
            height: spec.height.unwrap_or(DEFAULT_HEIGHT),
            padding: spec.options.layout_padding.unwrap_or_default(),
            cutout: spec.cutout(),
            labels,
            values,
            hidden,
            colors,
            dataset_override: dataset
                .map(|dataset| dataset.outlabels.clone())
                .unwrap_or_default(),
            outer_radius: 0.0,
            inner_radius: 0.0,
            arcs: Vec::new(),
        };
        chart.update();
        chart
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    /// Reset the radii from the chart area and re-derive every arc.
    pub fn update(&mut self) {
        let area = self.chart_area();
        self.outer_radius = (area.width().min(area.height()) / 2.0).max(0.0);
        self.inner_radius = self.outer_radius * self.cutout / 100.0;
        self.update_elements();
    }

    /// Change the canvas size. The caller reports the resize to the engine.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.update();
    }

    /// Toggle one data point, as a legend click would.
    pub fn set_data_visibility(&mut self, index: usize, visible: bool) {
        if let Some(hidden) = self.hidden.get_mut(index) {
            *hidden = !visible;
            self.update_elements();
        }
    }

    pub fn inner_radius(&self) -> f32 {
        self.inner_radius
    }

    pub fn color(&self, index: usize) -> &str {
        self.colors.get(index).map_or("", String::as_str)
    }

    fn update_elements(&mut self) {
        let area = self.chart_area();
        let center_x = (area.left + area.right) / 2.0;
        let center_y = (area.top + area.bottom) / 2.0;
        let total = self.total();

        let mut angle = ROTATION;
        self.arcs = (0..self.values.len())
            .map(|index| {
                let value = self.values[index];
                let span = if total > 0.0 && value.is_finite() && self.is_data_visible(index) {
                    (value.abs() / total) as f32 * CIRCUMFERENCE
                } else {
                    0.0
                };
                let arc = ArcElement {
                    x: center_x,
                    y: center_y,
                    start_angle: angle,
                    end_angle: angle + span,
                    inner_radius: self.inner_radius,
                    outer_radius: self.outer_radius,
                };
                angle += span;
                arc
            })
            .collect();
    }
}

impl PieHost for PieChart {
    fn chart_id(&self) -> ChartId {
        self.id
    }

    fn canvas_height(&self) -> f32 {
        self.height
    }

    fn chart_area(&self) -> BoundingBox {
        BoundingBox::new(
            self.padding.left,
            self.padding.top,
            (self.width - self.padding.right).max(self.padding.left),
            (self.height - self.padding.bottom).max(self.padding.top),
        )
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn data(&self) -> &[f64] {
        &self.values
    }

    fn total(&self) -> f64 {
        self.values
            .iter()
            .enumerate()
            .filter(|(index, value)| self.is_data_visible(*index) && value.is_finite())
            .map(|(_, value)| value.abs())
            .sum()
    }

    fn is_data_visible(&self, index: usize) -> bool {
        !self.hidden.get(index).copied().unwrap_or(false)
    }

    fn dataset_color(&self, index: usize) -> Option<String> {
        self.colors.get(index).cloned()
    }

    fn dataset_override(&self) -> &DatasetOverride {
        &self.dataset_override
    }

    fn arcs(&self) -> &[ArcElement] {
        &self.arcs
    }

    fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    fn scale_radius(&mut self, zoom: f32) {
        self.outer_radius *= zoom;
        self.inner_radius *= zoom;
        self.update_elements();
    }
}
