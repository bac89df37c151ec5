use serde::Deserialize;

use crate::config::{DatasetOverride, OutlabelOptions, Padding};
use crate::error::{Error, Result};

/// Doughnut charts cut out this share of the radius unless told otherwise.
pub const DEFAULT_DOUGHNUT_CUTOUT: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Pie,
    Doughnut,
}

impl ChartKind {
    pub fn default_cutout(&self) -> f32 {
        match self {
            Self::Pie => 0.0,
            Self::Doughnut => DEFAULT_DOUGHNUT_CUTOUT,
        }
    }
}

/// A single color or one per data point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorList {
    Single(String),
    PerIndex(Vec<String>),
}

impl ColorList {
    pub fn color_at(&self, index: usize) -> Option<&str> {
        match self {
            Self::Single(color) => Some(color.as_str()),
            Self::PerIndex(colors) => colors.get(index).map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub label: Option<String>,
    /// `null` entries are kept so indices stay aligned with `labels`.
    pub data: Vec<Option<f64>>,
    pub background_color: Option<ColorList>,
    pub hidden: Vec<bool>,
    pub outlabels: DatasetOverride,
}

impl Dataset {
    pub fn value(&self, index: usize) -> f64 {
        self.data.get(index).copied().flatten().unwrap_or(f64::NAN)
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.hidden.get(index).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartOptions {
    /// Inner radius as a percentage of the outer radius.
    pub cutout: Option<f32>,
    pub layout_padding: Option<Padding>,
    pub outlabels: Option<OutlabelOptions>,
}

/// Chart input document, a Chart.js-style `{type, data, options}` object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    #[serde(rename = "type", default)]
    pub kind: ChartKind,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub data: ChartData,
    #[serde(default)]
    pub options: ChartOptions,
}

impl ChartSpec {
    /// Parse a JSON or JSON5 document.
    pub fn parse(input: &str) -> Result<Self> {
        json5::from_str(input).map_err(|err| Error::Input(err.to_string()))
    }

    /// Plain pie with one dataset.
    pub fn pie(labels: Vec<String>, values: Vec<f64>, width: f32, height: f32) -> Self {
        Self {
            kind: ChartKind::Pie,
            width: Some(width),
            height: Some(height),
            data: ChartData {
                labels,
                datasets: vec![Dataset {
                    data: values.into_iter().map(Some).collect(),
                    ..Default::default()
                }],
            },
            options: ChartOptions::default(),
        }
    }

    /// The dataset that gets laid out. Further datasets are ignored.
    pub fn first_dataset(&self) -> Result<&Dataset> {
        self.data.datasets.first().ok_or(Error::EmptyChart)
    }

    pub fn cutout(&self) -> f32 {
        self.options
            .cutout
            .unwrap_or_else(|| self.kind.default_cutout())
            .clamp(0.0, 100.0)
    }
}
