pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod draw;
pub mod engine;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, OutlabelOptions, Scriptable};
pub use engine::{OutlabelsEngine, PieHost};
pub use error::{Error, Result};
pub use ir::ChartSpec;
pub use layout::pie::PieChart;

/// A chart after layout: the host, the engine holding its labels, and the SVG.
pub struct RenderedChart {
    pub chart: PieChart,
    pub engine: OutlabelsEngine,
    pub svg: String,
}

/// Lay out and render the first dataset of `spec`.
///
/// Options from `config` apply first; `options.outlabels` in the document and
/// the dataset's own `outlabels` override them in that order.
pub fn render_chart(spec: &ChartSpec, config: &Config) -> Result<RenderedChart> {
    spec.first_dataset()?;

    let mut spec = spec.clone();
    spec.width = spec.width.or(Some(config.render.width));
    spec.height = spec.height.or(Some(config.render.height));

    let options = match &spec.options.outlabels {
        Some(over) => config.outlabels.merged_with(over),
        None => config.outlabels.clone(),
    };
    let mut engine = if config.render.fast_text_metrics {
        OutlabelsEngine::with_fallback_metrics(options, config.theme.clone())
    } else {
        OutlabelsEngine::new(options, config.theme.clone())
    };

    let mut chart = PieChart::from_spec(&spec, &config.theme);
    engine.update(&mut chart);
    let svg = render::render_svg(&chart, &mut engine, &config.theme);
    Ok(RenderedChart { chart, engine, svg })
}

/// Parse a JSON/JSON5 chart document and render it to SVG.
pub fn render_chart_svg(input: &str, config: &Config) -> Result<String> {
    let spec = ChartSpec::parse(input)?;
    render_chart(&spec, config).map(|rendered| rendered.svg)
}
