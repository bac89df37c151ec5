use std::f32::consts::PI;
use std::path::Path;

use crate::canvas::{escape_xml, SvgCanvas};
use crate::config::RenderConfig;
use crate::engine::{OutlabelsEngine, PieHost};
use crate::error::Result;
use crate::layout::pie::PieChart;
use crate::layout::ArcElement;
use crate::theme::Theme;

/// Render background, slices and outlabels of a chart that has already been
/// updated through `engine`.
pub fn render_svg(chart: &PieChart, engine: &mut OutlabelsEngine, theme: &Theme) -> String {
    let width = chart.width;
    let height = chart.height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    ));

    for (index, arc) in chart.arcs().iter().enumerate() {
        if !chart.is_data_visible(index) || arc.end_angle - arc.start_angle <= 0.0 {
            continue;
        }
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            arc_path(arc),
            escape_xml(chart.color(index)),
            escape_xml(&theme.slice_border_color),
            theme.slice_border_width
        ));
    }

    let mut canvas = SvgCanvas::new();
    engine.after_dataset_draw(chart, &mut canvas);
    svg.push_str(canvas.as_str());

    svg.push_str("</svg>");
    svg
}

/// SVG path of one slice; doughnut slices become ring segments.
fn arc_path(arc: &ArcElement) -> String {
    let span = arc.end_angle - arc.start_angle;
    let (cx, cy) = (arc.x, arc.y);
    let outer = arc.outer_radius;
    let inner = arc.inner_radius;
    let point = |radius: f32, angle: f32| (cx + radius * angle.cos(), cy + radius * angle.sin());

    // A full circle cannot be drawn as one arc command.
    if span >= PI * 2.0 - 1e-4 {
        let mut d = format!(
            "M {:.2} {cy:.2} A {outer:.2} {outer:.2} 0 1 1 {:.2} {cy:.2} A {outer:.2} {outer:.2} 0 1 1 {:.2} {cy:.2} Z",
            cx + outer,
            cx - outer,
            cx + outer
        );
        if inner > 0.0 {
            d.push_str(&format!(
                " M {:.2} {cy:.2} A {inner:.2} {inner:.2} 0 1 0 {:.2} {cy:.2} A {inner:.2} {inner:.2} 0 1 0 {:.2} {cy:.2} Z",
                cx + inner,
                cx - inner,
                cx + inner
            ));
        }
        return d;
    }

    let large = if span > PI { 1 } else { 0 };
    let (sx, sy) = point(outer, arc.start_angle);
    let (ex, ey) = point(outer, arc.end_angle);
    if inner <= 0.0 {
        return format!(
            "M {cx:.2} {cy:.2} L {sx:.2} {sy:.2} A {outer:.2} {outer:.2} 0 {large} 1 {ex:.2} {ey:.2} Z"
        );
    }
    let (ix, iy) = point(inner, arc.end_angle);
    let (jx, jy) = point(inner, arc.start_angle);
    format!(
        "M {sx:.2} {sy:.2} A {outer:.2} {outer:.2} 0 {large} 1 {ex:.2} {ey:.2} L {ix:.2} {iy:.2} A {inner:.2} {inner:.2} 0 {large} 0 {jx:.2} {jy:.2} Z"
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    use crate::error::Error;

    let mut opt = usvg::Options::default();
    opt.font_family = "Helvetica".to_string();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 500.0))
        .ok_or_else(|| Error::Raster("invalid canvas size".to_string()))?;

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| Error::Raster(err.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| Error::Raster("failed to allocate pixmap".to_string()))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap
        .save_png(output)
        .map_err(|err| Error::Raster(err.to_string()))?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(crate::error::Error::Raster(
        "PNG output needs the `png` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutlabelOptions;
    use crate::ir::{ChartKind, ChartSpec};

    fn render(spec: &ChartSpec) -> String {
        let theme = Theme::chartjs();
        let mut chart = PieChart::from_spec(spec, &theme);
        let mut engine = OutlabelsEngine::with_fallback_metrics(OutlabelOptions::default(), theme.clone());
        engine.update(&mut chart);
        render_svg(&chart, &mut engine, &theme)
    }

    #[test]
    fn render_svg_basic() {
        let spec = ChartSpec::pie(
            vec!["Alpha".to_string(), "Beta".to_string()],
            vec![3.0, 1.0],
            600.0,
            400.0,
        );
        let svg = render(&spec);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Alpha 75.0%"));
        assert!(svg.contains("Beta 25.0%"));
        assert_eq!(svg.matches("<path d=\"M 300.00 200.00").count(), 2);
    }

    #[test]
    fn doughnut_slices_are_rings() {
        let mut spec = ChartSpec::pie(vec!["A".into(), "B".into()], vec![1.0, 1.0], 400.0, 400.0);
        spec.kind = ChartKind::Doughnut;
        let svg = render(&spec);
        assert!(!svg.contains("<path d=\"M 200.00 200.00"));
        assert!(svg.contains("0 0 0"));
    }

    #[test]
    fn single_slice_is_a_full_circle() {
        let arc = ArcElement {
            x: 50.0,
            y: 50.0,
            start_angle: -PI / 2.0,
            end_angle: PI * 1.5,
            inner_radius: 0.0,
            outer_radius: 40.0,
        };
        let d = arc_path(&arc);
        assert_eq!(d.matches(" A ").count(), 2);
        assert!(d.starts_with("M 90.00 50.00"));
    }

    #[test]
    fn svg_output_writes_file() {
        let dir = std::env::temp_dir().join(format!("pie-outlabels-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.svg");
        write_output_svg("<svg/>", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<svg/>");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
