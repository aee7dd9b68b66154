use bands_chart_wasm::application::{BandsChartService, ChartSettings};
use bands_chart_wasm::domain::bands::{Band, DisplayEntry, ZoomRangePlanner};
use bands_chart_wasm::domain::chart::{BrushRange, ChartView, IndexRange};
use serde_json::{Value, json};
use std::rc::Rc;

/// Funded bands `high..=low`, highest first, 10 USD wide from price 1000 at `low`.
fn market(high: i64, low: i64) -> Vec<Band> {
    (low..=high)
        .rev()
        .map(|n| {
            let down = 1000.0 + (n - low) as f64 * 10.0;
            Band::empty(n).with_collateral(1.0, 1.0).with_price_bounds(down, down + 10.0)
        })
        .collect()
}

fn user(indices: &[i64]) -> Vec<Band> {
    indices.iter().map(|&n| Band::empty(n).with_collateral(0.5, 0.5)).collect()
}

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
}

#[test]
fn planner_pads_and_clamps() {
    let planner = ZoomRangePlanner::new(2);
    let sequence: Vec<DisplayEntry> = market(119, 100).into_iter().map(DisplayEntry::from).collect();

    // 105 and 104 sit at positions 14 and 15
    let middle = planner.initial_zoom_indices(&sequence, &user(&[105, 104]), None);
    assert_eq!(middle, Some(IndexRange::new(12, 17)));

    let bottom = planner.initial_zoom_indices(&sequence, &user(&[101, 100]), None);
    assert_eq!(bottom, Some(IndexRange::new(16, 19)));

    let top = planner.initial_zoom_indices(&sequence, &user(&[119]), None);
    assert_eq!(top, Some(IndexRange::new(0, 2)));
}

#[test]
fn planner_widens_to_the_oracle() {
    let planner = ZoomRangePlanner::new(1);
    let sequence: Vec<DisplayEntry> = market(119, 100).into_iter().map(DisplayEntry::from).collect();

    // price 1185 is inside band 118 at position 1
    let range = planner.initial_zoom_indices(&sequence, &user(&[105]), Some(1185.0));
    assert_eq!(range, Some(IndexRange::new(0, 15)));
}

#[test]
fn planner_falls_back_to_full_range_or_nothing() {
    let planner = ZoomRangePlanner::default();
    let sequence: Vec<DisplayEntry> = market(109, 100).into_iter().map(DisplayEntry::from).collect();
    assert_eq!(planner.initial_zoom_indices(&sequence, &user(&[50]), None), Some(IndexRange::new(0, 9)));
    assert_eq!(planner.initial_zoom_indices(&[], &user(&[50]), None), None);
}

#[test]
fn render_adds_controls_and_applies_the_window_once() {
    let mut chart = BandsChartService::default();
    chart.update_market(market(159, 100), None);
    chart.update_user(user(&[130, 129]));

    let options = chart.chart_options(json!({ "series": [] }));
    // positions 29..=30, padded to 27..=32 of 60
    assert_close(&options["dataZoom"][0]["start"], 45.0);
    assert_close(&options["dataZoom"][0]["end"], 55.0);
    assert_eq!(options["dataZoom"][1]["type"], json!("inside"));
    assert!(options["dataZoom"][1].get("start").is_none());

    // a refetch with identical values changes nothing
    chart.update_market(market(159, 100), None);
    chart.update_user(user(&[129, 130]));
    let options = chart.chart_options(json!({ "series": [] }));
    assert!(options["dataZoom"][0].get("start").is_none());
}

#[test]
fn short_sequences_get_no_zoom_controls() {
    let mut chart = BandsChartService::default();
    chart.update_market(market(109, 100), None);
    chart.update_user(user(&[105]));

    let options = chart.chart_options(json!({}));
    assert!(options.get("dataZoom").is_none());
    // computed, waiting for a slider
    assert!(chart.zoom().is_pending());

    let options = chart.chart_options(json!({ "dataZoom": [{ "type": "slider" }] }));
    assert!(options["dataZoom"][0].get("start").is_some());
    assert!(!chart.zoom().is_pending());
}

#[test]
fn user_bands_off_the_chart_are_not_ready() {
    let mut chart = BandsChartService::default();
    chart.update_market(market(109, 100), None);
    chart.update_user(user(&[40]));
    assert!(!chart.evaluate_zoom());
    assert!(!chart.zoom().has_initialized());

    chart.update_market(market(109, 40), None);
    assert!(chart.evaluate_zoom());
}

#[test]
fn market_view_is_trimmed_and_stable() {
    let mut bands = market(104, 100);
    bands.insert(0, Band::empty(105));
    bands.push(Band::empty(99));

    let mut chart = BandsChartService::default();
    chart.update_market(bands.clone(), Some(110));
    let first = chart.market_sequence();
    // [110, 106...109, 105, 104..=100, 99] trimmed of its empty tail
    assert_eq!(first.len(), 8);
    assert!(first[0].is_oracle_price_band());

    chart.update_market(bands.clone(), Some(110));
    assert!(Rc::ptr_eq(&first, &chart.market_sequence()));

    let mut untrimmed = BandsChartService::new(ChartSettings::untrimmed());
    untrimmed.update_market(bands, Some(110));
    assert_eq!(untrimmed.market_sequence().len(), 9);
}

#[test]
fn brush_resets_only_when_the_sequence_changes() {
    let mut chart = BandsChartService::default();
    chart.update_market(market(109, 100), None);
    chart.set_brush_range(BrushRange::new(Some(2), Some(5)));

    chart.update_market(market(109, 100), None);
    assert_eq!(chart.brush_range(), BrushRange::new(Some(2), Some(5)));

    chart.update_market(market(110, 100), None);
    assert!(chart.brush_range().is_empty());
}

#[test]
fn user_view_keeps_empty_bands_and_the_marker() {
    let mut chart = BandsChartService::default();
    chart.update_market(market(109, 100), Some(3));
    chart.update_user(vec![Band::empty(7), Band::empty(6).with_collateral(1.0, 1.0), Band::empty(5)]);

    let sequence = chart.sequence(ChartView::User);
    let labels: Vec<String> = sequence.iter().map(|e| e.label().to_string()).collect();
    assert_eq!(labels, ["7", "6", "5", "4", "3"]);
}

#[test]
fn user_price_range_and_liquidation_proximity() {
    let mut chart = BandsChartService::default();
    chart.update_market(market(109, 100), Some(99));
    chart.update_user(user(&[103, 102]));

    let range = chart.user_price_range().unwrap();
    assert_eq!(range.upper_price_up, 1040.0);
    assert_eq!(range.lower_price_down, 1020.0);
    assert_eq!(range.lower_median, 1025.0);
    assert!(!chart.is_user_close_to_liquidation());

    chart.update_market(market(109, 100), Some(100));
    assert!(chart.is_user_close_to_liquidation());
}

#[test]
fn host_zoom_indices_take_precedence() {
    let mut chart = BandsChartService::default();
    chart.update_market(market(109, 100), None);
    chart.update_user(user(&[40]));
    chart.set_initial_zoom_indices(Some(IndexRange::new(5, 9)));
    assert!(chart.evaluate_zoom());
    assert_eq!(chart.zoom().pending_window().and_then(|w| w.start), Some(50.0));

    let mut out_of_bounds = BandsChartService::default();
    out_of_bounds.update_market(market(109, 100), None);
    out_of_bounds.update_user(user(&[40]));
    out_of_bounds.set_initial_zoom_indices(Some(IndexRange::new(5, 10)));
    assert!(!out_of_bounds.evaluate_zoom());
}

#[test]
fn window_pending_on_a_short_view_is_recomputed_for_the_longer_one() {
    let mut chart = BandsChartService::default();
    chart.update_market(market(119, 100), None);
    chart.update_user(user(&[110]));

    // 20 entries: no slider yet, window 35..60 waits
    let options = chart.chart_options(json!({}));
    assert!(options.get("dataZoom").is_none());
    assert_eq!(chart.zoom().pending_len(), Some(20));

    // 100 entries: 110 now sits at position 89
    chart.update_market(market(199, 100), None);
    let options = chart.chart_options(json!({}));
    assert_close(&options["dataZoom"][0]["start"], 87.0);
    assert_close(&options["dataZoom"][0]["end"], 92.0);
    assert!(!chart.zoom().is_pending());
}

#[test]
fn brush_reaching_past_the_end_is_not_used() {
    let mut chart = BandsChartService::default();
    chart.update_market(market(109, 100), None);
    chart.update_user(user(&[40]));
    chart.set_brush_range(BrushRange::new(Some(5), Some(20)));
    assert!(!chart.evaluate_zoom());
    assert!(chart.zoom().pending_window().is_none());

    chart.set_brush_range(BrushRange::new(Some(5), Some(9)));
    assert!(chart.evaluate_zoom());
    let window = chart.zoom().pending_window().unwrap();
    assert!(window.end.is_some_and(|end| end <= 100.0));
}
