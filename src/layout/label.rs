use serde::Serialize;

use crate::config::{
    resolve_opt, FontOptions, LabelContext, OutlabelOptions, Padding, TextAlign, DEFAULT_COLOR,
    DEFAULT_HORIZONTAL_STRETCH_PAD, DEFAULT_LINE_HEIGHT, DEFAULT_LINE_WIDTH, DEFAULT_PADDING,
    DEFAULT_STRETCH, DEFAULT_TEXT_COLOR,
};
use crate::text_metrics::{text_size, Font, MeasureText};
use crate::theme::Theme;

use super::geometry::{segments_intersect, Point, Rect, Size};
use super::positioner::Center;
use super::template::{self, DEFAULT_TEMPLATE};

/// Share of the text width a label moves per collision retry.
const OFFSET_STEP_DIVISOR: f32 = 20.0;
/// Resizable fonts take this share of the canvas height, in percent.
const RESIZABLE_FONT_PERCENT: f32 = 2.5;

/// Why no label exists for a data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSkip {
    /// `display` resolved to false.
    Suppressed,
    /// No usable value for the index.
    MissingData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelStyle {
    pub background_color: String,
    pub border_color: String,
    pub border_radius: f32,
    pub border_width: f32,
    pub line_width: f32,
    pub line_color: String,
    pub color: String,
    pub font: Font,
    pub padding: Padding,
    pub text_align: TextAlign,
}

/// Positions computed by the last placement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelGeometry {
    pub center: Center,
    pub text_rect: Rect,
    pub label_rect: Rect,
    pub is_left: bool,
    pub is_top: bool,
}

/// Two-segment leader: anchor on the arc, bend point, then the text box edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub anchor: Point,
    pub bend: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutLabel {
    pub index: usize,
    /// Template before substitution; part of the identity used to carry the offset over.
    pub encoded_text: String,
    pub text: String,
    pub lines: Vec<String>,
    pub label: String,
    pub value: f64,
    pub style: LabelStyle,
    pub stretch: f32,
    pub horizontal_stretch_pad: f32,
    pub size: Size,
    pub offset: Point,
    pub offset_step: f32,
    pub geometry: Option<LabelGeometry>,
    pub hidden: bool,
}

impl OutLabel {
    pub fn new<M: MeasureText + ?Sized>(
        options: &OutlabelOptions,
        context: &LabelContext,
        theme: &Theme,
        canvas_height: f32,
        measurer: &M,
    ) -> Result<Self, LabelSkip> {
        if !resolve_opt(&options.display, context).unwrap_or(true) {
            return Err(LabelSkip::Suppressed);
        }
        if !context.value.is_finite() {
            return Err(LabelSkip::MissingData);
        }

        let encoded_text =
            resolve_opt(&options.text, context).unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
        let substituted = template::substitute(
            &encoded_text,
            &context.label,
            context.value,
            context.percent,
            options.percent_precision(),
        );
        let text = template::truncate_text(&substituted);
        let lines = template::split_lines(&text);

        let style = resolve_style(options, context, theme, canvas_height);
        let size = text_size(measurer, &lines, &style.font);

        Ok(Self {
            index: context.data_index,
            encoded_text,
            text,
            lines,
            label: context.label.clone(),
            value: context.value,
            stretch: resolve_opt(&options.stretch, context).unwrap_or(DEFAULT_STRETCH),
            horizontal_stretch_pad: resolve_opt(&options.horizontal_strech_pad, context)
                .unwrap_or(DEFAULT_HORIZONTAL_STRETCH_PAD),
            style,
            offset_step: size.width / OFFSET_STEP_DIVISOR,
            size,
            offset: Point::default(),
            geometry: None,
            hidden: false,
        })
    }

    /// Same resolved text and template: the previous offset may be reused.
    pub fn same_content(&self, other: &OutLabel) -> bool {
        self.text == other.text && self.encoded_text == other.encoded_text
    }

    /// Text box beside `center`, on the side facing away from the arc.
    pub fn compute_text_rect(&self, center: &Center) -> (Rect, bool, bool) {
        let is_left = center.x - center.anchor.x < 0.0;
        let is_top = center.y - center.anchor.y < 0.0;
        let shift = if is_left {
            -(self.horizontal_stretch_pad + self.size.width)
        } else {
            self.horizontal_stretch_pad
        };
        let rect = Rect::new(
            center.x - self.style.padding.left + shift,
            center.y - self.size.height / 2.0,
            self.size.width,
            self.size.height,
        );
        (rect, is_left, is_top)
    }

    /// Text box grown by the border on every side plus padding.
    pub fn compute_label_rect(&self, text_rect: &Rect) -> Rect {
        let border = self.style.border_width;
        let padding = &self.style.padding;
        Rect::new(
            text_rect.x - border,
            text_rect.y - border,
            text_rect.width + 2.0 * border + padding.width(),
            text_rect.height + 2.0 * border + padding.height(),
        )
    }

    pub fn compute_geometry(&self, center: Center) -> LabelGeometry {
        let (text_rect, is_left, is_top) = self.compute_text_rect(&center);
        let label_rect = self.compute_label_rect(&text_rect);
        LabelGeometry {
            center,
            text_rect,
            label_rect,
            is_left,
            is_top,
        }
    }

    pub fn label_rect(&self) -> Option<Rect> {
        self.geometry.map(|geometry| geometry.label_rect)
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden && self.geometry.is_some()
    }

    pub fn connector(&self) -> Option<Connector> {
        if self.lines.is_empty() {
            return None;
        }
        let geometry = self.geometry?;
        let rect = geometry.text_rect;
        let bend = geometry.center.copy;
        let mid_y = rect.y + rect.height / 2.0;
        // Attach to the far edge when the leader would cross the box diagonal.
        let crosses = segments_intersect(
            Point::new(rect.x, rect.y),
            Point::new(rect.right(), rect.bottom()),
            bend,
            Point::new(rect.x, mid_y),
        );
        let x_offset = if crosses {
            rect.width + self.style.padding.width()
        } else {
            0.0
        };
        Some(Connector {
            anchor: geometry.center.anchor,
            bend,
            end: Point::new(rect.x + x_offset, mid_y),
        })
    }
}

fn resolve_style(
    options: &OutlabelOptions,
    context: &LabelContext,
    theme: &Theme,
    canvas_height: f32,
) -> LabelStyle {
    let slice_color = || {
        context
            .dataset_color
            .clone()
            .unwrap_or_else(|| DEFAULT_COLOR.to_string())
    };
    let font_options = resolve_opt(&options.font, context).unwrap_or_else(FontOptions::resizable);
    let line_height = resolve_opt(&options.line_height, context);

    LabelStyle {
        background_color: resolve_opt(&options.background_color, context)
            .unwrap_or_else(slice_color),
        border_color: resolve_opt(&options.border_color, context).unwrap_or_else(slice_color),
        border_radius: resolve_opt(&options.border_radius, context).unwrap_or(0.0),
        border_width: resolve_opt(&options.border_width, context).unwrap_or(0.0),
        line_width: resolve_opt(&options.line_width, context).unwrap_or(DEFAULT_LINE_WIDTH),
        line_color: resolve_opt(&options.line_color, context).unwrap_or_else(slice_color),
        color: resolve_opt(&options.color, context)
            .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
        font: resolve_font(&font_options, line_height, canvas_height, theme),
        padding: resolve_opt(&options.padding, context)
            .unwrap_or(Padding::uniform(DEFAULT_PADDING)),
        text_align: resolve_opt(&options.text_align, context).unwrap_or_default(),
    }
}

/// Resolve font options against the host defaults. Resizable fonts follow
/// the canvas height, bounded by `minSize`/`maxSize` when those are set.
pub fn resolve_font(
    options: &FontOptions,
    line_height: Option<f32>,
    canvas_height: f32,
    theme: &Theme,
) -> Font {
    let mut size = options.size.unwrap_or(theme.font_size);
    if options.resizable.unwrap_or(false) {
        size = adapt_size_to_height(canvas_height, options.min_size, options.max_size);
    }
    let line_height = options
        .line_height
        .or(line_height)
        .unwrap_or(DEFAULT_LINE_HEIGHT);
    Font {
        family: options
            .family
            .clone()
            .unwrap_or_else(|| theme.font_family.clone()),
        size,
        style: options
            .style
            .clone()
            .unwrap_or_else(|| theme.font_style.clone()),
        weight: options.weight.clone(),
        line_height: size * line_height,
    }
}

fn adapt_size_to_height(height: f32, minimum: Option<f32>, maximum: Option<f32>) -> f32 {
    let size = height / 100.0 * RESIZABLE_FONT_PERCENT;
    let minimum = minimum.filter(|value| *value != 0.0);
    let maximum = maximum.filter(|value| *value != 0.0);
    if let Some(min) = minimum
        && size < min
    {
        return min;
    }
    if let Some(max) = maximum
        && size > max
    {
        return max;
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scriptable;
    use crate::layout::positioner;
    use crate::layout::types::ArcElement;
    use crate::text_metrics::FallbackMetrics;

    struct FixedWidth(f32);

    impl MeasureText for FixedWidth {
        fn measure(&self, _text: &str, _font: &Font) -> f32 {
            self.0
        }
    }

    fn context(label: &str, value: f64, percent: f64) -> LabelContext {
        LabelContext {
            data_index: 0,
            label: label.to_string(),
            value,
            percent,
            dataset_color: Some("#36A2EB".to_string()),
        }
    }

    fn fixed_font_options() -> OutlabelOptions {
        OutlabelOptions {
            font: Some(Scriptable::Constant(FontOptions {
                size: Some(10.0),
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    #[test]
    fn builds_default_label() {
        let label = OutLabel::new(
            &fixed_font_options(),
            &context("A", 5.0, 0.2567),
            &Theme::chartjs(),
            400.0,
            &FixedWidth(40.0),
        )
        .unwrap();
        assert_eq!(label.text, "A 25.7%");
        assert_eq!(label.lines, vec!["A 25.7%"]);
        assert_eq!(label.size.width, 40.0);
        assert!((label.size.height - 12.0).abs() < 1e-4);
        assert_eq!(label.offset_step, 2.0);
        assert_eq!(label.offset, Point::default());
        assert_eq!(label.style.background_color, "#36A2EB");
        assert_eq!(label.style.color, "white");
        assert_eq!(label.style.padding, Padding::uniform(2.0));
        assert_eq!(label.stretch, 12.0);
    }

    #[test]
    fn display_false_suppresses_label() {
        let options = OutlabelOptions {
            display: Some(Scriptable::Constant(false)),
            ..Default::default()
        };
        let result = OutLabel::new(
            &options,
            &context("A", 1.0, 0.5),
            &Theme::chartjs(),
            400.0,
            &FallbackMetrics,
        );
        assert_eq!(result.unwrap_err(), LabelSkip::Suppressed);
    }

    #[test]
    fn non_finite_value_is_missing_data() {
        let result = OutLabel::new(
            &OutlabelOptions::default(),
            &context("A", f64::NAN, 0.0),
            &Theme::chartjs(),
            400.0,
            &FallbackMetrics,
        );
        assert_eq!(result.unwrap_err(), LabelSkip::MissingData);
    }

    #[test]
    fn template_with_dash_is_truncated() {
        let options = OutlabelOptions {
            text: Some(Scriptable::Constant("%l".to_string())),
            ..fixed_font_options()
        };
        let label = OutLabel::new(
            &options,
            &context("Category - averylongdescriptionvalue", 1.0, 0.1),
            &Theme::chartjs(),
            400.0,
            &FallbackMetrics,
        )
        .unwrap();
        assert_eq!(label.text, "Category - averylongdescri...");
    }

    #[test]
    fn resizable_font_follows_canvas_height() {
        let theme = Theme::chartjs();
        let font = resolve_font(&FontOptions::resizable(), None, 800.0, &theme);
        assert_eq!(font.size, 20.0);
        assert!((font.line_height - 24.0).abs() < 1e-4);

        let bounded = FontOptions {
            resizable: Some(true),
            min_size: Some(14.0),
            max_size: Some(16.0),
            ..Default::default()
        };
        assert_eq!(resolve_font(&bounded, None, 200.0, &theme).size, 14.0);
        assert_eq!(resolve_font(&bounded, None, 2000.0, &theme).size, 16.0);
    }

    #[test]
    fn fixed_font_uses_requested_size() {
        let theme = Theme::chartjs();
        let options = FontOptions {
            size: Some(18.0),
            family: Some("Arial".to_string()),
            ..Default::default()
        };
        let font = resolve_font(&options, Some(1.5), 800.0, &theme);
        assert_eq!(font.size, 18.0);
        assert_eq!(font.family, "Arial");
        assert!((font.line_height - 27.0).abs() < 1e-4);
    }

    #[test]
    fn text_rect_sits_on_the_far_side_of_the_arc() {
        let label = OutLabel::new(
            &fixed_font_options(),
            &context("A", 1.0, 0.5),
            &Theme::chartjs(),
            400.0,
            &FixedWidth(40.0),
        )
        .unwrap();
        let arc = ArcElement {
            x: 100.0,
            y: 100.0,
            start_angle: std::f32::consts::PI - 0.2,
            end_angle: std::f32::consts::PI + 0.2,
            inner_radius: 0.0,
            outer_radius: 50.0,
        };
        let center = positioner::center(&arc, 12.0);
        let (rect, is_left, _) = label.compute_text_rect(&center);
        assert!(is_left);
        assert!((rect.right() - (center.x - 2.0 - 12.0)).abs() < 1e-3);
        assert!((rect.y + rect.height / 2.0 - center.y).abs() < 1e-3);
    }

    #[test]
    fn label_rect_adds_border_and_padding() {
        let mut label = OutLabel::new(
            &fixed_font_options(),
            &context("A", 1.0, 0.5),
            &Theme::chartjs(),
            400.0,
            &FixedWidth(40.0),
        )
        .unwrap();
        label.style.border_width = 3.0;
        label.style.padding = Padding {
            top: 1.0,
            right: 2.0,
            bottom: 4.0,
            left: 5.0,
        };
        let text_rect = Rect::new(10.0, 20.0, 40.0, 12.0);
        let rect = label.compute_label_rect(&text_rect);
        assert_eq!(rect, Rect::new(7.0, 17.0, 40.0 + 6.0 + 7.0, 12.0 + 6.0 + 5.0));
    }

    #[test]
    fn connector_runs_from_anchor_through_bend() {
        let mut label = OutLabel::new(
            &fixed_font_options(),
            &context("A", 1.0, 0.5),
            &Theme::chartjs(),
            400.0,
            &FixedWidth(40.0),
        )
        .unwrap();
        let arc = ArcElement {
            x: 100.0,
            y: 100.0,
            start_angle: -0.2,
            end_angle: 0.2,
            inner_radius: 0.0,
            outer_radius: 50.0,
        };
        label.geometry = Some(label.compute_geometry(positioner::center(&arc, 12.0)));
        let connector = label.connector().unwrap();
        let geometry = label.geometry.unwrap();
        assert_eq!(connector.anchor, geometry.center.anchor);
        assert_eq!(connector.bend, geometry.center.copy);
        assert!((connector.end.y - (geometry.text_rect.y + geometry.text_rect.height / 2.0)).abs() < 1e-4);
        assert_eq!(connector.end.x, geometry.text_rect.x);
    }
}
