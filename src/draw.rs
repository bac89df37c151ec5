//! Draw pass for a single placed label: box, then text, then connector.

use crate::canvas::{Canvas, LineJoin, TextBaseline};
use crate::config::TextAlign;
use crate::layout::label::OutLabel;

/// Draw `label` if it has been placed. Visibility of the data point is the
/// caller's concern.
pub fn draw_label<C: Canvas + ?Sized>(canvas: &mut C, label: &OutLabel) {
    if label.hidden || label.geometry.is_none() {
        return;
    }
    draw_box(canvas, label);
    draw_text(canvas, label);
    draw_connector(canvas, label);
}

pub fn draw_box<C: Canvas + ?Sized>(canvas: &mut C, label: &OutLabel) {
    let Some(rect) = label.label_rect() else {
        return;
    };
    let style = &label.style;

    canvas.begin_path();
    canvas.round_rect(
        round(rect.x),
        round(rect.y),
        round(rect.width),
        round(rect.height),
        style.border_radius,
    );
    canvas.close_path();

    if !style.background_color.is_empty() {
        canvas.set_fill_style(&style.background_color);
        canvas.fill();
    }
    if !style.border_color.is_empty() && style.border_width > 0.0 {
        canvas.set_stroke_style(&style.border_color);
        canvas.set_line_width(style.border_width);
        canvas.set_line_join(LineJoin::Miter);
        canvas.stroke();
    }
}

pub fn draw_text<C: Canvas + ?Sized>(canvas: &mut C, label: &OutLabel) {
    let Some(geometry) = label.geometry else {
        return;
    };
    let style = &label.style;
    if label.lines.is_empty() || style.color.is_empty() {
        return;
    }

    let rect = geometry.text_rect;
    let line_height = style.font.line_height;
    let mut x = rect.x;
    let mut y = rect.y + line_height / 2.0;
    match style.text_align {
        TextAlign::Center => x += rect.width / 2.0,
        TextAlign::End | TextAlign::Right => x += rect.width,
        TextAlign::Start | TextAlign::Left => {}
    }

    canvas.set_font(&style.font);
    canvas.set_fill_style(&style.color);
    canvas.set_text_align(style.text_align);
    canvas.set_text_baseline(TextBaseline::Middle);

    for line in &label.lines {
        canvas.fill_text(
            line,
            round(x) + style.padding.left,
            round(y),
            Some(round(rect.width)),
        );
        y += line_height;
    }
}

pub fn draw_connector<C: Canvas + ?Sized>(canvas: &mut C, label: &OutLabel) {
    let Some(connector) = label.connector() else {
        return;
    };
    let style = &label.style;

    canvas.save();
    canvas.set_stroke_style(&style.line_color);
    canvas.set_line_width(style.line_width);
    canvas.set_line_join(LineJoin::Miter);

    canvas.begin_path();
    canvas.move_to(connector.anchor.x, connector.anchor.y);
    canvas.line_to(connector.bend.x, connector.bend.y);
    canvas.stroke();

    canvas.begin_path();
    canvas.move_to(connector.bend.x, connector.bend.y);
    canvas.line_to(connector.end.x, connector.end.y);
    canvas.stroke();
    canvas.restore();
}

/// Round half up, like canvas pixel snapping.
fn round(value: f32) -> f32 {
    (value + 0.5).floor()
}
