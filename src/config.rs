use crate::error::{Error, Result};
use crate::theme::Theme;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_COLOR: &str = "black";
pub const DEFAULT_TEXT_COLOR: &str = "white";
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;
pub const DEFAULT_LINE_HEIGHT: f32 = 1.2;
pub const DEFAULT_PADDING: f32 = 2.0;
pub const DEFAULT_STRETCH: f32 = 12.0;
pub const DEFAULT_HORIZONTAL_STRETCH_PAD: f32 = 12.0;
pub const DEFAULT_PERCENT_PRECISION: usize = 1;
pub const DEFAULT_VALUE_PRECISION: usize = 3;

/// Everything a per-label option may look at when it is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelContext {
    pub data_index: usize,
    pub label: String,
    pub value: f64,
    pub percent: f64,
    pub dataset_color: Option<String>,
}

pub type DeriveFn<T> = Arc<dyn Fn(&LabelContext) -> Option<T> + Send + Sync>;

/// An option that is a constant, a per-data-index list, or derived from the
/// label context. `None` from resolution means "not set here".
pub enum Scriptable<T> {
    Constant(T),
    PerIndex(Vec<T>),
    Derived(DeriveFn<T>),
}

impl<T: Clone> Scriptable<T> {
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&LabelContext) -> Option<T> + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(f))
    }

    pub fn resolve(&self, context: &LabelContext) -> Option<T> {
        match self {
            Self::Constant(value) => Some(value.clone()),
            Self::PerIndex(values) => values.get(context.data_index).cloned(),
            Self::Derived(f) => f(context),
        }
    }
}

impl<T: Clone> Clone for Scriptable<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Constant(value) => Self::Constant(value.clone()),
            Self::PerIndex(values) => Self::PerIndex(values.clone()),
            Self::Derived(f) => Self::Derived(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Scriptable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::PerIndex(values) => f.debug_tuple("PerIndex").field(values).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl<T> From<T> for Scriptable<T> {
    fn from(value: T) -> Self {
        Self::Constant(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Scriptable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            PerIndex(Vec<T>),
            Constant(T),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::PerIndex(values) => Self::PerIndex(values),
            Repr::Constant(value) => Self::Constant(value),
        })
    }
}

pub(crate) fn resolve_opt<T: Clone>(
    option: &Option<Scriptable<T>>,
    context: &LabelContext,
) -> Option<T> {
    option.as_ref().and_then(|value| value.resolve(context))
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn width(&self) -> f32 {
        self.left + self.right
    }

    pub fn height(&self) -> f32 {
        self.top + self.bottom
    }
}

impl<'de> Deserialize<'de> for Padding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Sides {
            top: Option<f32>,
            right: Option<f32>,
            bottom: Option<f32>,
            left: Option<f32>,
        }
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Uniform(f32),
            Sides(Sides),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Uniform(value) => Padding::uniform(value),
            Repr::Sides(sides) => Padding {
                top: sides.top.unwrap_or(0.0),
                right: sides.right.unwrap_or(0.0),
                bottom: sides.bottom.unwrap_or(0.0),
                left: sides.left.unwrap_or(0.0),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Right,
    Start,
    #[default]
    Center,
    End,
}

impl TextAlign {
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontOptions {
    pub family: Option<String>,
    pub size: Option<f32>,
    pub style: Option<String>,
    pub weight: Option<String>,
    pub line_height: Option<f32>,
    pub min_size: Option<f32>,
    pub max_size: Option<f32>,
    pub resizable: Option<bool>,
}

impl FontOptions {
    /// What applies when no font option is given at all.
    pub fn resizable() -> Self {
        Self {
            resizable: Some(true),
            ..Default::default()
        }
    }
}

/// Outlabel options. Every field is optional so that dataset overrides can
/// be layered over plugin-level options field by field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutlabelOptions {
    pub display: Option<Scriptable<bool>>,
    pub background_color: Option<Scriptable<String>>,
    pub border_color: Option<Scriptable<String>>,
    pub border_radius: Option<Scriptable<f32>>,
    pub border_width: Option<Scriptable<f32>>,
    pub line_width: Option<Scriptable<f32>>,
    pub line_color: Option<Scriptable<String>>,
    pub color: Option<Scriptable<String>>,
    pub font: Option<Scriptable<FontOptions>>,
    pub line_height: Option<Scriptable<f32>>,
    pub padding: Option<Scriptable<Padding>>,
    pub text_align: Option<Scriptable<TextAlign>>,
    pub stretch: Option<Scriptable<f32>>,
    pub horizontal_strech_pad: Option<Scriptable<f32>>,
    pub text: Option<Scriptable<String>>,
    pub max_zoom_out_percentage: Option<f32>,
    pub percent_precision: Option<usize>,
    pub value_precision: Option<usize>,
}

impl OutlabelOptions {
    /// Field-wise overlay: values set on `over` win.
    pub fn merged_with(&self, over: &OutlabelOptions) -> OutlabelOptions {
        OutlabelOptions {
            display: over.display.clone().or_else(|| self.display.clone()),
            background_color: over
                .background_color
                .clone()
                .or_else(|| self.background_color.clone()),
            border_color: over.border_color.clone().or_else(|| self.border_color.clone()),
            border_radius: over
                .border_radius
                .clone()
                .or_else(|| self.border_radius.clone()),
            border_width: over.border_width.clone().or_else(|| self.border_width.clone()),
            line_width: over.line_width.clone().or_else(|| self.line_width.clone()),
            line_color: over.line_color.clone().or_else(|| self.line_color.clone()),
            color: over.color.clone().or_else(|| self.color.clone()),
            font: over.font.clone().or_else(|| self.font.clone()),
            line_height: over.line_height.clone().or_else(|| self.line_height.clone()),
            padding: over.padding.clone().or_else(|| self.padding.clone()),
            text_align: over.text_align.clone().or_else(|| self.text_align.clone()),
            stretch: over.stretch.clone().or_else(|| self.stretch.clone()),
            horizontal_strech_pad: over
                .horizontal_strech_pad
                .clone()
                .or_else(|| self.horizontal_strech_pad.clone()),
            text: over.text.clone().or_else(|| self.text.clone()),
            max_zoom_out_percentage: over
                .max_zoom_out_percentage
                .or(self.max_zoom_out_percentage),
            percent_precision: over.percent_precision.or(self.percent_precision),
            value_precision: over.value_precision.or(self.value_precision),
        }
    }

    /// Radius floor for the fit loop, only when configured.
    pub fn max_zoom_out_percentage(&self) -> Option<f32> {
        self.max_zoom_out_percentage
            .map(|percentage| percentage.clamp(0.0, 100.0))
    }

    pub fn percent_precision(&self) -> usize {
        // An explicit 0 means whole percentages; it does not fall back to the default.
        self.percent_precision.unwrap_or(DEFAULT_PERCENT_PRECISION)
    }

    pub fn value_precision(&self) -> usize {
        self.value_precision.unwrap_or(DEFAULT_VALUE_PRECISION)
    }
}

/// Per-dataset `outlabels` value.
#[derive(Debug, Clone, Default)]
pub enum DatasetOverride {
    #[default]
    Inherit,
    Disabled,
    Custom(OutlabelOptions),
}

impl DatasetOverride {
    /// Effective options for a dataset, or `None` when labels are switched off.
    pub fn configure(&self, options: &OutlabelOptions) -> Option<OutlabelOptions> {
        match self {
            Self::Inherit => Some(options.clone()),
            Self::Disabled => None,
            Self::Custom(over) => Some(options.merged_with(over)),
        }
    }
}

impl<'de> Deserialize<'de> for DatasetOverride {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Options(Box<OutlabelOptions>),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Self::Inherit,
            Repr::Flag(false) => Self::Disabled,
            Repr::Options(options) => Self::Custom(*options),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub fast_text_metrics: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            background: "#FFFFFF".to_string(),
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub outlabels: OutlabelOptions,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    palette: Option<Vec<String>>,
    background: Option<String>,
    render: Option<RenderConfig>,
    outlabels: Option<OutlabelOptions>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile =
        json5::from_str(&contents).map_err(|err| Error::Config(err.to_string()))?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = match theme_name {
            "default" | "chartjs" => Theme::chartjs(),
            "modern" => Theme::modern(),
            other => return Err(Error::Config(format!("unknown theme `{other}`"))),
        };
    }
    if let Some(v) = parsed.font_family {
        config.theme.font_family = v;
    }
    if let Some(v) = parsed.font_size {
        config.theme.font_size = v;
    }
    if let Some(v) = parsed.palette
        && !v.is_empty()
    {
        config.theme.palette = v;
    }
    if let Some(v) = parsed.background {
        config.theme.background = v;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }
    if let Some(outlabels) = parsed.outlabels {
        config.outlabels = outlabels;
    }

    config.render.background = config.theme.background.clone();
    Ok(config)
}
