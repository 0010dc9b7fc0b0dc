use std::cell::Cell;
use std::rc::Rc;

use approx::assert_relative_eq;
use chart_axes::axis::{Axis, AxisId, Position};
use chart_axes::chart::{Chart, Legend, LegendPosition, PlotMargin, SeriesPlotter};
use chart_axes::core::{DataSeries, Rect, SeriesSource, Size, Stacking};
use chart_axes::render::{FrameRecorder, RenderEngine};
use chart_axes::ChartError;

fn no_legend() -> Legend {
    Legend {
        position: LegendPosition::None,
        ..Legend::default()
    }
}

#[test]
fn render_resolves_ranges_and_clears_invalidation() {
    let mut chart = Chart::new();
    chart.add_series(DataSeries::new("sales", [3.0, 7.0, 5.0])).expect("series");
    assert!(chart.is_invalidated());

    let mut recorder = FrameRecorder::new();
    let layout = chart
        .render(&mut recorder, Size::new(800.0, 600.0))
        .expect("render");

    assert!(!chart.is_invalidated());
    assert_eq!((chart.axis_x().actual_min(), chart.axis_x().actual_max()), (0.0, 2.0));
    assert_eq!((chart.axis_y().actual_min(), chart.axis_y().actual_max()), (3.0, 7.0));
    assert!(layout.plot_rect.width > 0.0 && layout.plot_rect.height > 0.0);
    assert!(layout.plot_rect.right() <= layout.chart_rect.right());
    assert_eq!(chart.last_layout(), Some(&layout));

    let frame = recorder.last_frame().expect("frame");
    assert_eq!(frame.texts_matching("sales").count(), 1);
}

#[test]
fn degenerate_host_size_falls_back_to_default() {
    let mut chart = Chart::new();
    let mut recorder = FrameRecorder::new();
    let layout = chart
        .render(&mut recorder, Size::new(0.0, f64::NAN))
        .expect("render");
    assert_eq!(layout.chart_rect, Rect::new(0.0, 0.0, 640.0, 400.0));
    assert_eq!(recorder.last_frame().expect("frame").size, Size::new(640.0, 400.0));
}

#[test]
fn explicit_margins_fix_the_plot_rect() {
    let mut chart = Chart::new();
    chart.set_legend(no_legend());
    chart.set_plot_margin(PlotMargin::uniform(30.0));
    chart.add_series(DataSeries::new("a", [1.0, 2.0])).expect("series");

    let mut recorder = FrameRecorder::new();
    let layout = chart
        .render(&mut recorder, Size::new(640.0, 400.0))
        .expect("render");
    assert_eq!(layout.plot_rect, Rect::new(35.0, 35.0, 570.0, 330.0));
}

#[test]
fn auxiliary_axis_takes_range_from_its_series_only() {
    let mut chart = Chart::new();
    let right = chart.add_axis(Axis::new(Position::Right)).expect("axis");
    chart.add_series(DataSeries::new("a", [1.0, 2.0, 3.0])).expect("series");
    chart
        .add_series(DataSeries::new("b", [100.0, 300.0]).with_axis_y(right))
        .expect("series");

    let mut recorder = FrameRecorder::new();
    let layout = chart
        .render(&mut recorder, Size::new(800.0, 600.0))
        .expect("render");

    let aux = chart.axis(right).expect("aux axis");
    assert_eq!((aux.actual_min(), aux.actual_max()), (100.0, 300.0));
    assert_eq!((chart.axis_y().actual_min(), chart.axis_y().actual_max()), (1.0, 3.0));
    assert_eq!((chart.axis_x().actual_min(), chart.axis_x().actual_max()), (0.0, 2.0));

    let aux_rect = layout.axis_rects.get(&right).expect("aux rect");
    assert_relative_eq!(aux_rect.left, layout.plot_rect.right());
}

#[test]
fn unreferenced_auxiliary_axis_is_not_laid_out() {
    let mut chart = Chart::new();
    let idle = chart.add_axis(Axis::new(Position::Top)).expect("axis");
    let mut recorder = FrameRecorder::new();
    let layout = chart
        .render(&mut recorder, Size::new(800.0, 600.0))
        .expect("render");
    assert!(!layout.axis_rects.contains_key(&idle));
    assert_eq!(layout.axis_rects.len(), 2);
}

#[test]
fn rotated_chart_puts_x_axis_on_the_left() {
    let mut chart = Chart::new();
    chart.add_series(DataSeries::new("a", [1.0, 4.0])).expect("series");
    chart.set_rotated(true);
    assert_eq!(chart.axis_x().position(), Position::Left);
    assert_eq!(chart.axis_y().position(), Position::Bottom);
    assert!(!chart.axis_x().is_horizontal());

    let mut recorder = FrameRecorder::new();
    let layout = chart
        .render(&mut recorder, Size::new(800.0, 600.0))
        .expect("render");
    let x_rect = layout.axis_rects.get(&chart.axis_x_id()).expect("x rect");
    let y_rect = layout.axis_rects.get(&chart.axis_y_id()).expect("y rect");
    assert_relative_eq!(x_rect.right(), layout.plot_rect.left);
    assert_relative_eq!(y_rect.top, layout.plot_rect.bottom());

    chart.set_rotated(false);
    assert_eq!(chart.axis_x().position(), Position::Bottom);
}

#[test]
fn header_and_footer_reserve_space() {
    let mut chart = Chart::new();
    chart.set_legend(no_legend());
    chart.set_header(Some("Revenue".to_owned()));
    chart.set_footer(Some("source: ledger".to_owned()));

    let mut recorder = FrameRecorder::new();
    let layout = chart
        .render(&mut recorder, Size::new(640.0, 400.0))
        .expect("render");
    let frame = recorder.last_frame().expect("frame");
    let header = frame.texts_matching("Revenue").next().expect("header text");
    let footer = frame.texts_matching("source: ledger").next().expect("footer text");
    assert!(header.y < layout.plot_rect.top);
    assert!(footer.y > layout.plot_rect.bottom());
}

#[test]
fn category_labels_are_drawn_on_the_x_axis() {
    let mut chart = Chart::new();
    chart.set_x_labels(Some(vec!["Q1".to_owned(), "Q2".to_owned(), "Q3".to_owned()]));
    chart.add_series(DataSeries::new("a", [4.0, 5.0, 6.0])).expect("series");

    let mut recorder = FrameRecorder::new();
    chart
        .render(&mut recorder, Size::new(640.0, 400.0))
        .expect("render");
    let frame = recorder.last_frame().expect("frame");
    for label in ["Q1", "Q2", "Q3"] {
        assert_eq!(frame.texts_matching(label).count(), 1);
    }
}

#[test]
fn multi_area_chart_shares_one_grid() {
    let mut chart = Chart::new();
    let top = chart.plot_areas_mut().add(0, 0);
    let bottom = chart.plot_areas_mut().add(1, 0);
    let mut lower_axis = Axis::new(Position::Left);
    lower_axis.set_plot_area(Some(bottom));
    let lower = chart.add_axis(lower_axis).expect("axis");
    chart.add_series(DataSeries::new("a", [1.0, 2.0])).expect("series");
    chart
        .add_series(DataSeries::new("b", [10.0, 20.0]).with_axis_y(lower))
        .expect("series");

    let mut recorder = FrameRecorder::new();
    let layout = chart
        .render(&mut recorder, Size::new(800.0, 600.0))
        .expect("render");

    assert_eq!(layout.plot_area_rects.len(), 2);
    let top_rect = layout.plot_area_rects.get(&top).expect("top cell");
    let bottom_rect = layout.plot_area_rects.get(&bottom).expect("bottom cell");
    assert!(top_rect.top < bottom_rect.top);
    assert_relative_eq!(top_rect.left, bottom_rect.left);

    let lower_rect = layout.axis_rects.get(&lower).expect("lower axis rect");
    assert_relative_eq!(lower_rect.top, bottom_rect.top);
    assert_relative_eq!(lower_rect.right(), layout.plot_rect.left);
}

#[test]
fn axis_removal_is_guarded() {
    let mut chart = Chart::new();
    let aux = chart.add_axis(Axis::new(Position::Right)).expect("axis");
    let spare = chart.add_axis(Axis::new(Position::Top)).expect("axis");
    chart
        .add_series(DataSeries::new("a", [1.0]).with_axis_y(aux))
        .expect("series");

    assert!(matches!(
        chart.remove_axis(chart.axis_x_id()),
        Err(ChartError::AxisInUse { reason: "main axis", .. })
    ));
    assert!(matches!(
        chart.remove_axis(aux),
        Err(ChartError::AxisInUse { .. })
    ));

    let removed = chart.remove_axis(spare).expect("spare axis");
    assert!(!removed.is_attached());
    assert!(matches!(
        chart.remove_axis(spare),
        Err(ChartError::UnknownAxis(id)) if id == spare
    ));
    chart.add_axis(removed).expect("detached axis can be re-added");
}

#[test]
fn series_must_reference_known_axes() {
    let mut chart = Chart::new();
    let result = chart.add_series(DataSeries::new("a", [1.0]).with_axis_x(AxisId::new(99)));
    assert!(matches!(result, Err(ChartError::UnknownAxis(_))));
    assert!(matches!(chart.remove_series(3), Err(ChartError::UnknownSeries(3))));
}

#[test]
fn setters_only_invalidate_on_change() {
    let mut chart = Chart::new();
    let mut recorder = FrameRecorder::new();
    chart
        .render(&mut recorder, Size::new(640.0, 400.0))
        .expect("render");
    assert!(!chart.is_invalidated());

    chart.set_stacking(Stacking::None);
    assert!(!chart.is_invalidated());
    chart.set_stacking(Stacking::Stacked);
    assert!(chart.is_invalidated());

    chart
        .render(&mut recorder, Size::new(640.0, 400.0))
        .expect("render");
    chart.axis_y_mut().set_reversed(true);
    assert!(chart.is_invalidated());
}

#[derive(Clone)]
struct CountingPlotter(Rc<Cell<usize>>);

impl SeriesPlotter for CountingPlotter {
    fn plot(
        &self,
        _index: usize,
        _series: &dyn SeriesSource,
        _axis_x: &Axis,
        _axis_y: &Axis,
        _engine: &mut dyn RenderEngine,
    ) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn plotter_sees_only_plotted_series() {
    let calls = Rc::new(Cell::new(0));
    let mut chart = Chart::new();
    chart.set_plotter(Box::new(CountingPlotter(Rc::clone(&calls))));
    chart.add_series(DataSeries::new("shown", [1.0])).expect("series");
    chart
        .add_series(
            DataSeries::new("legend only", [2.0])
                .with_visibility(chart_axes::core::SeriesVisibility::Legend),
        )
        .expect("series");

    let mut recorder = FrameRecorder::new();
    chart
        .render(&mut recorder, Size::new(640.0, 400.0))
        .expect("render");
    assert_eq!(calls.get(), 1);
    let frame = recorder.last_frame().expect("frame");
    assert_eq!(frame.texts_matching("legend only").count(), 1);
}
