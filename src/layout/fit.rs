//! Fit/zoom loop: shrink the plotted radius until the union of the visible
//! label boxes fits inside the chart area.

use serde::Serialize;

use crate::engine::PieHost;

use super::geometry::BoundingBox;
use super::label::OutLabel;
use super::resolver::resolve_labels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FitOutcome {
    /// Labels fit the chart area.
    Fits,
    /// The overflow is so large the computed zoom collapsed to zero.
    Collapsed,
    /// The radius reached the `maxZoomOutPercentage` floor.
    Saturated,
    /// Ran out of steps while still overflowing.
    StepsExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitReport {
    pub steps: usize,
    pub start_radius: f32,
    pub radius: f32,
    pub outcome: FitOutcome,
}

/// Union of the label boxes still present in `slots`.
pub fn bounding_box(slots: &[Option<OutLabel>]) -> BoundingBox {
    slots
        .iter()
        .flatten()
        .filter(|label| label.is_visible())
        .filter_map(OutLabel::label_rect)
        .fold(BoundingBox::EMPTY, |mut bbox, rect| {
            bbox.include(&rect);
            bbox
        })
}

/// Scale factor that pulls `labels` back inside `area`.
///
/// Each side's overflow is measured as a fraction of half the area's
/// extent; the worst side wins. Never grows the chart and never goes
/// below zero.
pub fn zoom_to_fit(labels: &BoundingBox, area: &BoundingBox) -> f32 {
    let width = area.width();
    let height = area.height();
    if labels.is_empty() || width <= 0.0 || height <= 0.0 {
        return 1.0;
    }
    let deltas = [
        (area.left - labels.left) / width * 2.0,
        (area.top - labels.top) / height * 2.0,
        (labels.right - area.right) / width * 2.0,
        (labels.bottom - area.bottom) / height * 2.0,
    ];
    let overflow = deltas.into_iter().fold(0.0_f32, f32::max);
    (1.0 - overflow).max(0.0)
}

/// Run placement and shrink the host until the labels fit.
///
/// The loop runs at most once per arc. With `max_zoom_out_percentage` set,
/// the outer radius never drops below `start * (1 - percentage / 100)`
/// within one call; without it only the zoom and the step budget stop it.
pub fn fit_chart_area<H: PieHost + ?Sized>(
    host: &mut H,
    slots: &mut [Option<OutLabel>],
    max_zoom_out_percentage: Option<f32>,
) -> FitReport {
    let max_steps = host.arcs().len();
    let start_radius = host.outer_radius();
    let floor = max_zoom_out_percentage
        .map(|percentage| start_radius * (1.0 - percentage.clamp(0.0, 100.0) / 100.0));
    let mut report = FitReport {
        steps: 0,
        start_radius,
        radius: start_radius,
        outcome: FitOutcome::Fits,
    };

    if max_steps == 0 {
        return report;
    }
    report.outcome = FitOutcome::StepsExhausted;

    for step in 1..=max_steps {
        report.steps = step;
        resolve_labels(slots, host.arcs(), |index| host.is_data_visible(index));

        let zoom = zoom_to_fit(&bounding_box(slots), &host.chart_area());
        if zoom >= 1.0 {
            report.outcome = FitOutcome::Fits;
            break;
        }
        if zoom <= 0.0 {
            report.outcome = FitOutcome::Collapsed;
            break;
        }

        let radius = host.outer_radius();
        if let Some(floor) = floor {
            if radius <= floor {
                report.outcome = FitOutcome::Saturated;
                break;
            }
            if radius * zoom < floor {
                tracing::debug!(step, radius, floor, "chart radius clamped to zoom-out floor");
                host.scale_radius(floor / radius);
                report.outcome = FitOutcome::Saturated;
                break;
            }
        }
        tracing::debug!(step, zoom, radius, "shrinking chart to fit outlabels");
        host.scale_radius(zoom);
    }

    report.radius = host.outer_radius();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FontOptions, OutlabelOptions, Scriptable};
    use crate::ir::ChartSpec;
    use crate::layout::geometry::Rect;
    use crate::layout::pie::PieChart;
    use crate::text_metrics::{Font, MeasureText};
    use crate::theme::Theme;

    struct FixedWidth(f32);

    impl MeasureText for FixedWidth {
        fn measure(&self, _text: &str, _font: &Font) -> f32 {
            self.0
        }
    }

    #[test]
    fn right_overflow_of_ten_percent_zooms_to_point_eight() {
        let area = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let labels = BoundingBox::new(10.0, 10.0, 110.0, 90.0);
        assert!((zoom_to_fit(&labels, &area) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn contained_labels_keep_zoom_at_one() {
        let area = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let labels = BoundingBox::new(10.0, 10.0, 90.0, 90.0);
        assert_eq!(zoom_to_fit(&labels, &area), 1.0);
        assert_eq!(zoom_to_fit(&BoundingBox::EMPTY, &area), 1.0);
    }

    #[test]
    fn worst_side_wins_and_zoom_never_negative() {
        let area = BoundingBox::new(0.0, 0.0, 200.0, 100.0);
        let labels = BoundingBox::new(-20.0, -10.0, 200.0, 100.0);
        // left: 20/200*2 = 0.2, top: 10/100*2 = 0.2
        assert!((zoom_to_fit(&labels, &area) - 0.8).abs() < 1e-6);

        let huge = BoundingBox::new(-500.0, 0.0, 100.0, 100.0);
        assert_eq!(zoom_to_fit(&huge, &area), 0.0);
    }

    #[test]
    fn bounding_box_skips_empty_and_unplaced_slots() {
        let mut slots: Vec<Option<OutLabel>> = vec![None];
        assert!(bounding_box(&slots).is_empty());

        let options = OutlabelOptions::default();
        let context = crate::config::LabelContext {
            data_index: 1,
            label: "A".to_string(),
            value: 1.0,
            percent: 1.0,
            dataset_color: None,
        };
        let mut label =
            OutLabel::new(&options, &context, &Theme::chartjs(), 400.0, &FixedWidth(10.0))
                .unwrap();
        slots.push(Some(label.clone()));
        assert!(bounding_box(&slots).is_empty());

        let rect = Rect::new(5.0, 6.0, 10.0, 20.0);
        label.geometry = Some(super::super::label::LabelGeometry {
            center: crate::layout::positioner::center(&Default::default(), 0.0),
            text_rect: rect,
            label_rect: rect,
            is_left: false,
            is_top: false,
        });
        slots.push(Some(label));
        assert_eq!(bounding_box(&slots), BoundingBox::new(5.0, 6.0, 15.0, 26.0));
    }

    fn chart(values: &[f64], width: f32, height: f32) -> PieChart {
        let labels: Vec<String> = (0..values.len()).map(|i| format!("Item {i}")).collect();
        let spec = ChartSpec::pie(labels, values.to_vec(), width, height);
        PieChart::from_spec(&spec, &Theme::chartjs())
    }

    fn slots_for(chart: &PieChart, width: f32) -> Vec<Option<OutLabel>> {
        let options = OutlabelOptions {
            font: Some(Scriptable::Constant(FontOptions {
                size: Some(12.0),
                ..Default::default()
            })),
            ..Default::default()
        };
        (0..chart.data().len())
            .map(|index| {
                OutLabel::new(
                    &options,
                    &chart.label_context(index),
                    &Theme::chartjs(),
                    chart.canvas_height(),
                    &FixedWidth(width),
                )
                .ok()
            })
            .collect()
    }

    #[test]
    fn zero_data_points_do_no_work() {
        let mut pie = chart(&[], 400.0, 400.0);
        let mut slots = Vec::new();
        let report = fit_chart_area(&mut pie, &mut slots, Some(50.0));
        assert_eq!(report.steps, 0);
        assert_eq!(report.outcome, FitOutcome::Fits);
        assert_eq!(report.radius, report.start_radius);
    }

    #[test]
    fn overflowing_labels_shrink_the_radius() {
        let mut pie = chart(&[3.0, 2.0, 1.0, 1.0], 400.0, 400.0);
        let mut slots = slots_for(&pie, 60.0);
        let report = fit_chart_area(&mut pie, &mut slots, Some(50.0));
        assert!(report.steps >= 1);
        assert!(report.radius < report.start_radius);
        assert!(report.radius >= report.start_radius * 0.5 - 1e-3);
        assert_eq!(pie.outer_radius(), report.radius);
    }

    #[test]
    fn unset_zoom_out_shrinks_past_half() {
        let mut pie = chart(&[1.0; 6], 400.0, 400.0);
        let mut slots = slots_for(&pie, 120.0);
        let report = fit_chart_area(&mut pie, &mut slots, None);
        assert!(report.steps > 1);
        assert_ne!(report.outcome, FitOutcome::Saturated);
        assert!(report.radius < report.start_radius * 0.5);

        let mut capped = chart(&[1.0; 6], 400.0, 400.0);
        let mut slots = slots_for(&capped, 120.0);
        let report = fit_chart_area(&mut capped, &mut slots, Some(50.0));
        assert_eq!(report.outcome, FitOutcome::Saturated);
        assert!((report.radius - report.start_radius * 0.5).abs() < 1e-2);
    }

    #[test]
    fn zoom_floor_stops_the_loop() {
        let mut pie = chart(&[3.0, 2.0, 1.0, 1.0], 400.0, 400.0);
        let mut slots = slots_for(&pie, 60.0);
        let report = fit_chart_area(&mut pie, &mut slots, Some(10.0));
        assert_eq!(report.outcome, FitOutcome::Saturated);
        assert_eq!(report.steps, 1);
        assert!((report.radius - report.start_radius * 0.9).abs() < 1e-2);
    }

    #[test]
    fn collapsed_zoom_leaves_radius_alone() {
        let mut pie = chart(&[3.0, 2.0, 1.0, 1.0], 400.0, 400.0);
        let mut slots = slots_for(&pie, 400.0);
        let report = fit_chart_area(&mut pie, &mut slots, Some(50.0));
        assert_eq!(report.outcome, FitOutcome::Collapsed);
        assert_eq!(report.radius, report.start_radius);
    }

    #[test]
    fn zero_zoom_out_keeps_radius() {
        let mut pie = chart(&[3.0, 2.0, 1.0, 1.0], 400.0, 400.0);
        let mut slots = slots_for(&pie, 60.0);
        let report = fit_chart_area(&mut pie, &mut slots, Some(0.0));
        assert_eq!(report.outcome, FitOutcome::Saturated);
        assert_eq!(report.radius, report.start_radius);
    }
}
