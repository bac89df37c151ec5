use pie_outlabels::config::OutlabelOptions;
use pie_outlabels::theme::Theme;
use pie_outlabels::{Config, render_chart_svg};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutlabelsRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
    outlabels: Option<OutlabelOptions>,
}

fn build_config(options: OutlabelsRenderOptions) -> Config {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("modern") {
        config.theme = Theme::modern();
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(background) = options.background {
        config.theme.background = background;
    }
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    if let Some(outlabels) = options.outlabels {
        config.outlabels = outlabels;
    }
    // No system fonts in the browser sandbox.
    config.render.fast_text_metrics = true;
    config
}

#[wasm_bindgen]
pub fn render_outlabels_svg(
    chart_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<OutlabelsRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        OutlabelsRenderOptions::default()
    };

    render_chart_svg(chart_json, &build_config(options))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
