use std::path::Path;

use pie_outlabels::config::RenderConfig;
use pie_outlabels::layout::geometry::collides;
use pie_outlabels::layout::template::format_to_k;
use pie_outlabels::layout::OutLabel;
use pie_outlabels::theme::Theme;
use pie_outlabels::{render_chart, ChartSpec, Config, OutlabelOptions, OutlabelsEngine, PieHost};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn fast_config() -> Config {
    Config {
        render: RenderConfig {
            fast_text_metrics: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn load_fixture(rel: &str) -> ChartSpec {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel);
    assert!(path.exists(), "fixture missing: {rel}");
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    ChartSpec::parse(&input).expect("parse failed")
}

fn visible_labels(labels: &[Option<OutLabel>]) -> Vec<&OutLabel> {
    labels
        .iter()
        .flatten()
        .filter(|label| label.is_visible())
        .collect()
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "pie/basic.json",
        "pie/many_slices.json",
        "pie/styled.json",
        "pie/hidden.json",
        "pie/disabled.json",
        "pie/long_labels.json",
        "doughnut/basic.json",
    ];

    let config = fast_config();
    for rel in candidates {
        let spec = load_fixture(rel);
        let rendered = render_chart(&spec, &config).expect("render failed");
        assert_valid_svg(&rendered.svg, rel);
        assert!(
            rendered.engine.state(rendered.chart.id()).is_some(),
            "{rel}: no engine state"
        );
    }
}

#[test]
fn visible_labels_never_overlap() {
    let config = fast_config();
    for rel in ["pie/basic.json", "pie/many_slices.json", "pie/styled.json", "doughnut/basic.json"] {
        let rendered = render_chart(&load_fixture(rel), &config).expect("render failed");
        let labels = visible_labels(rendered.engine.labels(rendered.chart.id()));
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                let (ra, rb) = (a.label_rect().unwrap(), b.label_rect().unwrap());
                assert!(
                    !collides(&ra, &rb),
                    "{rel}: labels {} and {} overlap",
                    a.index,
                    b.index
                );
            }
        }
    }
}

#[test]
fn label_rect_wraps_text_rect() {
    let rendered = render_chart(&load_fixture("pie/styled.json"), &fast_config()).unwrap();
    let labels = visible_labels(rendered.engine.labels(rendered.chart.id()));
    assert!(!labels.is_empty());
    for label in labels {
        let geometry = label.geometry.unwrap();
        let border = label.style.border_width;
        let padding = label.style.padding;
        let text = geometry.text_rect;
        let outer = geometry.label_rect;
        assert!((outer.x - (text.x - border)).abs() < 1e-3);
        assert!((outer.y - (text.y - border)).abs() < 1e-3);
        assert!(
            (outer.width - (text.width + 2.0 * border + padding.left + padding.right)).abs() < 1e-3
        );
        assert!(
            (outer.height - (text.height + 2.0 * border + padding.top + padding.bottom)).abs()
                < 1e-3
        );
    }
}

#[test]
fn styled_labels_keep_their_lines() {
    let rendered = render_chart(&load_fixture("pie/styled.json"), &fast_config()).unwrap();
    for label in rendered.engine.labels(rendered.chart.id()).iter().flatten() {
        assert_eq!(label.lines.len(), 2, "label {} lines", label.index);
        assert_eq!(label.lines[0], label.label);
    }
}

#[test]
fn hidden_and_missing_points_get_no_label() {
    let rendered = render_chart(&load_fixture("pie/hidden.json"), &fast_config()).unwrap();
    let chart = &rendered.chart;
    assert!(!chart.is_data_visible(1));
    assert!(chart.data()[3].is_nan());
    let labels = rendered.engine.labels(chart.id());
    assert!(labels[1].is_none());
    assert!(labels[3].is_none());
    assert!(!rendered.svg.contains("Toggled off"));
    assert!(!rendered.svg.contains("Missing"));
    // Shares are taken over the visible total (75).
    assert!(rendered.svg.contains("Kept 53.3%"));
    assert!(rendered.svg.contains("Also kept 46.7%"));
}

#[test]
fn disabled_dataset_draws_no_text() {
    let rendered = render_chart(&load_fixture("pie/disabled.json"), &fast_config()).unwrap();
    assert!(!rendered.svg.contains("<text"));
    assert!(rendered.svg.contains("<path"));
}

#[test]
fn long_labels_are_truncated() {
    let rendered = render_chart(&load_fixture("pie/long_labels.json"), &fast_config()).unwrap();
    let expected = [
        "Operations - infrastructure ...",
        "Research and de...",
        "Sales - regional office...",
        "Marketing",
    ];
    let labels = rendered.engine.labels(rendered.chart.id());
    assert!(labels.iter().flatten().count() > 0);
    for label in labels.iter().flatten() {
        assert_eq!(label.text, expected[label.index]);
    }
}

#[test]
fn format_to_k_properties() {
    for value in [0.0, 1.0, 12.5, 999.0] {
        assert!(!format_to_k(value).ends_with('K'));
    }
    for value in [1000.0, 1500.0, 25_000.0, 1_234_567.0] {
        assert!(format_to_k(value).ends_with('K'));
    }
    assert_eq!(format_to_k(3000.0), "3K");
    assert_eq!(format_to_k(3001.0), "3.00K");
}

#[test]
fn resize_resets_offsets_on_next_rebuild() {
    let theme = Theme::chartjs();
    let spec = ChartSpec::pie(
        vec!["A".into(), "B".into(), "C".into()],
        vec![5.0, 3.0, 2.0],
        600.0,
        400.0,
    );
    let mut chart = pie_outlabels::PieChart::from_spec(&spec, &theme);
    let mut engine = OutlabelsEngine::with_fallback_metrics(OutlabelOptions::default(), theme);
    engine.update(&mut chart);
    engine.state_mut(chart.id()).labels[0]
        .as_mut()
        .expect("label")
        .offset
        .x = 12.0;

    engine.update(&mut chart);
    assert_eq!(engine.labels(chart.id())[0].as_ref().unwrap().offset.x, 12.0);

    chart.resize(500.0, 300.0);
    engine.resize(chart.id());
    engine.update(&mut chart);
    assert_eq!(engine.labels(chart.id())[0].as_ref().unwrap().offset.x, 0.0);
}

#[test]
fn chart_without_points_renders_empty() {
    let input = r#"{ "type": "pie", "width": 300, "height": 300,
        "data": { "labels": [], "datasets": [{ "data": [] }] } }"#;
    let rendered = pie_outlabels::render_chart_svg(input, &fast_config()).unwrap();
    assert_valid_svg(&rendered, "inline");
    assert!(!rendered.contains("<text"));
}

#[test]
fn chart_without_datasets_is_an_error() {
    let input = r#"{ "type": "pie", "data": { "labels": ["A"], "datasets": [] } }"#;
    assert!(pie_outlabels::render_chart_svg(input, &fast_config()).is_err());
}
