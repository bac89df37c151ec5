//! Canvas-like drawing contract and an SVG backend for it.

use crate::config::TextAlign;
use crate::text_metrics::Font;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    fn as_svg(&self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Middle,
    Top,
    Bottom,
}

/// The subset of a 2D canvas context the label drawing uses.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32);
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f32);
    fn set_line_join(&mut self, join: LineJoin);
    fn set_font(&mut self, font: &Font);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, max_width: Option<f32>);
}

#[derive(Debug, Clone)]
struct DrawState {
    fill_style: String,
    stroke_style: String,
    line_width: f32,
    line_join: LineJoin,
    font: Option<Font>,
    text_align: TextAlign,
    text_baseline: TextBaseline,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            fill_style: "#000000".to_string(),
            stroke_style: "#000000".to_string(),
            line_width: 1.0,
            line_join: LineJoin::Miter,
            font: None,
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
        }
    }
}

/// Records canvas calls as SVG elements.
#[derive(Debug, Clone, Default)]
pub struct SvgCanvas {
    body: String,
    path: String,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// SVG elements emitted so far, without the `<svg>` wrapper.
    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn into_string(self) -> String {
        self.body
    }

    fn font_attributes(&self) -> String {
        let Some(font) = &self.state.font else {
            return String::new();
        };
        let mut attrs = format!(
            " font-family=\"{}\" font-size=\"{}\"",
            escape_xml(&font.family),
            font.size
        );
        if !font.style.is_empty() && font.style != "normal" {
            attrs.push_str(&format!(" font-style=\"{}\"", escape_xml(&font.style)));
        }
        if let Some(weight) = font.weight.as_deref().filter(|w| !w.is_empty()) {
            attrs.push_str(&format!(" font-weight=\"{}\"", escape_xml(weight)));
        }
        attrs
    }
}

impl Canvas for SvgCanvas {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn close_path(&mut self) {
        if !self.path.is_empty() {
            self.path.push_str(" Z");
        }
    }

    fn move_to(&mut self, x: f32, y: f32) {
        push_command(&mut self.path, &format!("M {x:.2} {y:.2}"));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        push_command(&mut self.path, &format!("L {x:.2} {y:.2}"));
    }

    fn round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let r = radius.max(0.0).min(width.abs() / 2.0).min(height.abs() / 2.0);
        let right = x + width;
        let bottom = y + height;
        if r <= 0.0 {
            push_command(
                &mut self.path,
                &format!("M {x:.2} {y:.2} H {right:.2} V {bottom:.2} H {x:.2} Z"),
            );
            return;
        }
        push_command(
            &mut self.path,
            &format!(
                "M {:.2} {y:.2} H {:.2} A {r:.2} {r:.2} 0 0 1 {right:.2} {:.2} V {:.2} A {r:.2} {r:.2} 0 0 1 {:.2} {bottom:.2} H {:.2} A {r:.2} {r:.2} 0 0 1 {x:.2} {:.2} V {:.2} A {r:.2} {r:.2} 0 0 1 {:.2} {y:.2} Z",
                x + r,
                right - r,
                y + r,
                bottom - r,
                right - r,
                x + r,
                bottom - r,
                y + r,
                x + r,
            ),
        );
    }

    fn set_fill_style(&mut self, color: &str) {
        self.state.fill_style = color.to_string();
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.state.stroke_style = color.to_string();
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    fn set_font(&mut self, font: &Font) {
        self.state.font = Some(font.clone());
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    fn fill(&mut self) {
        if self.path.is_empty() {
            return;
        }
        self.body.push_str(&format!(
            "<path d=\"{}\" fill=\"{}\"/>",
            self.path,
            escape_xml(&self.state.fill_style)
        ));
    }

    fn stroke(&mut self) {
        if self.path.is_empty() {
            return;
        }
        self.body.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"{}\"/>",
            self.path,
            escape_xml(&self.state.stroke_style),
            self.state.line_width,
            self.state.line_join.as_svg()
        ));
    }

    // Text is laid out from measured widths, so it never exceeds `max_width`
    // and no condensing is emitted.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, _max_width: Option<f32>) {
        let anchor = match self.state.text_align {
            TextAlign::Left | TextAlign::Start => "start",
            TextAlign::Center => "middle",
            TextAlign::Right | TextAlign::End => "end",
        };
        let baseline = match self.state.text_baseline {
            TextBaseline::Alphabetic => "",
            TextBaseline::Middle => " dominant-baseline=\"central\"",
            TextBaseline::Top => " dominant-baseline=\"hanging\"",
            TextBaseline::Bottom => " dominant-baseline=\"text-after-edge\"",
        };
        self.body.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{anchor}\"{baseline}{} fill=\"{}\">{}</text>",
            self.font_attributes(),
            escape_xml(&self.state.fill_style),
            escape_xml(text)
        ));
    }
}

fn push_command(path: &mut String, command: &str) {
    if !path.is_empty() {
        path.push(' ');
    }
    path.push_str(command);
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
