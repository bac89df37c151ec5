use crate::engine::{OutlabelsEngine, PieHost};
use crate::error::Result;
use crate::layout::fit::FitReport;
use crate::layout::geometry::{BoundingBox, Point, Rect};
use crate::layout::pie::PieChart;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub kind: String,
    pub width: f32,
    pub height: f32,
    pub chart_area: BoundingBox,
    pub outer_radius: f32,
    pub inner_radius: f32,
    pub fit: Option<FitReport>,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDump {
    pub index: usize,
    pub text: String,
    pub lines: Vec<String>,
    /// CSS font shorthand the label is measured and drawn with.
    pub font: String,
    pub offset: Point,
    pub hidden: bool,
    pub anchor: Option<Point>,
    pub center: Option<Point>,
    pub text_rect: Option<Rect>,
    pub label_rect: Option<Rect>,
}

impl LayoutDump {
    pub fn from_engine(chart: &PieChart, engine: &OutlabelsEngine) -> Self {
        let labels = engine
            .labels(chart.id())
            .iter()
            .flatten()
            .map(|label| {
                let geometry = label.geometry;
                LabelDump {
                    index: label.index,
                    text: label.text.clone(),
                    lines: label.lines.clone(),
                    font: label.style.font.css(),
                    offset: label.offset,
                    hidden: label.hidden,
                    anchor: geometry.map(|g| g.center.anchor),
                    center: geometry.map(|g| g.center.point()),
                    text_rect: geometry.map(|g| g.text_rect),
                    label_rect: geometry.map(|g| g.label_rect),
                }
            })
            .collect();

        LayoutDump {
            kind: format!("{:?}", chart.kind),
            width: chart.width,
            height: chart.height,
            chart_area: chart.chart_area(),
            outer_radius: chart.outer_radius(),
            inner_radius: chart.inner_radius(),
            fit: engine.state(chart.id()).and_then(|state| state.last_fit),
            labels,
        }
    }
}

pub fn write_layout_dump(path: &Path, chart: &PieChart, engine: &OutlabelsEngine) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_engine(chart, engine);
    serde_json::to_writer_pretty(writer, &dump).map_err(std::io::Error::other)?;
    Ok(())
}
