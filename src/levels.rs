//! Windowed extrema detection and proximity clustering

use crate::types::{Level, Point, RawLevel, Resolution};

/// Scan a price series for turning points at the given resolution.
///
/// The series is cut into non-overlapping windows of `frame` points (the
/// final window may be shorter) and each window nominates its minimum and
/// maximum. A candidate becomes a level when:
/// - it sits at the window's first point, a preceding point exists and that
///   point is strictly beyond it (higher for a minimum, lower for a maximum);
/// - it sits at the window's last point, a following window exists and the
///   next point is strictly higher (both branches compare the same way, see
///   the trailing-edge tests);
/// - or it sits strictly inside the window.
///
/// Day and Week scans only cover the trailing stretch of the series so that
/// short frames stay biased to recent structure; Month scans everything.
pub fn detect_levels(points: &[Point], resolution: Resolution) -> Vec<RawLevel> {
    let frame = resolution.frame();
    let mut levels = Vec::new();

    let mut w_start = scan_start(points.len(), resolution);
    while w_start < points.len() {
        let w_end = (w_start + frame).min(points.len());
        let (min_idx, max_idx) = window_extrema(points, w_start, w_end);

        let min_price = points[min_idx].price;
        if (min_idx == w_start && w_start != 0 && points[w_start - 1].price > min_price)
            || (min_idx == w_end - 1 && w_end != points.len() && points[w_end].price > min_price)
            || (min_idx != w_start && min_idx != w_end - 1)
        {
            levels.push(RawLevel {
                time: points[min_idx].time,
                price: min_price,
            });
        }

        // Trailing-edge check compares the same way as the minimum branch:
        // the next point must be strictly higher for the maximum to count.
        let max_price = points[max_idx].price;
        if (max_idx == w_start && w_start != 0 && points[w_start - 1].price < max_price)
            || (max_idx == w_end - 1 && w_end != points.len() && points[w_end].price > max_price)
            || (max_idx != w_start && max_idx != w_end - 1)
        {
            levels.push(RawLevel {
                time: points[max_idx].time,
                price: max_price,
            });
        }

        w_start = w_end;
    }

    levels
}

/// Seed freshly detected turning points with strength 1 (themselves)
pub fn raw_to_levels(raw: Vec<RawLevel>) -> Vec<Level> {
    raw.into_iter()
        .map(|r| Level {
            time: r.time,
            price: r.price,
            strength: 1,
        })
        .collect()
}

/// Merge levels that sit within `deviation` (relative to the earlier level's
/// price) of each other. The earlier level survives, keeps its timestamp and
/// gains one strength per absorbed level. Order dependent by construction:
/// once a level has swept its followers, no survivor behind it is within the
/// band, so re-running the pass changes nothing.
pub fn reduce_levels(mut levels: Vec<Level>, deviation: f64) -> Vec<Level> {
    let mut i = 0;
    while i + 1 < levels.len() {
        let mut j = i + 1;
        while j < levels.len() {
            if (levels[i].price - levels[j].price).abs() / levels[i].price <= deviation {
                levels[i].strength += 1;
                levels.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
    levels
}

/// Full per-resolution computation: scan, seed strengths, cluster
pub fn compute_levels(points: &[Point], resolution: Resolution, deviation: f64) -> Vec<Level> {
    reduce_levels(raw_to_levels(detect_levels(points, resolution)), deviation)
}

/// Day and Week frames only look at the trailing stretch of history
fn scan_start(len: usize, resolution: Resolution) -> usize {
    let month_frame = Resolution::Month.frame();
    match resolution {
        Resolution::Month => 0,
        Resolution::Week => len.saturating_sub(month_frame * 3),
        Resolution::Day => len.saturating_sub(month_frame),
    }
}

/// Index of the first minimal and the last maximal price in `[start, end)`
fn window_extrema(points: &[Point], start: usize, end: usize) -> (usize, usize) {
    let mut min_idx = start;
    let mut max_idx = start;
    for i in start + 1..end {
        if points[i].price < points[min_idx].price {
            min_idx = i;
        }
        if points[i].price >= points[max_idx].price {
            max_idx = i;
        }
    }
    (min_idx, max_idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn pts(prices: &[f64]) -> Vec<Point> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Point {
                time: base + Duration::hours(i as i64),
                price: p,
            })
            .collect()
    }

    fn prices(levels: &[RawLevel]) -> Vec<f64> {
        levels.iter().map(|l| l.price).collect()
    }

    #[test]
    fn test_empty_series() {
        assert!(detect_levels(&[], Resolution::Day).is_empty());
        assert!(detect_levels(&[], Resolution::Month).is_empty());
    }

    #[test]
    fn test_interior_extrema_always_emit() {
        // One Day window; trough and peak both strictly inside
        let points = pts(&[5.0, 1.0, 9.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        let raw = detect_levels(&points, Resolution::Day);
        // Minimum is nominated before the maximum
        assert_eq!(prices(&raw), vec![1.0, 9.0]);
    }

    #[test]
    fn test_single_interior_minimum() {
        let points = pts(&[5.0, 4.0, 3.0, 1.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let raw = detect_levels(&points, Resolution::Day);
        assert_eq!(prices(&raw), vec![1.0]);
    }

    #[test]
    fn test_window_first_minimum_needs_higher_prev() {
        // Second window opens on its minimum; the point before it is higher
        let mut series = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0];
        series.extend([9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0]);
        let raw = detect_levels(&pts(&series), Resolution::Day);
        assert_eq!(prices(&raw), vec![9.0]);

        // Same shape but the preceding point is lower: nothing detected
        let mut series = vec![8.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 8.5];
        series.extend([9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0]);
        let raw = detect_levels(&pts(&series), Resolution::Day);
        assert!(
            !prices(&raw).contains(&9.0),
            "window-first minimum needs a strictly higher predecessor"
        );
    }

    #[test]
    fn test_window_last_minimum_needs_higher_next() {
        // First window closes on its minimum; next window opens higher
        let mut series = vec![9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        series.extend([2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let raw = detect_levels(&pts(&series), Resolution::Day);
        assert_eq!(prices(&raw), vec![1.0]);

        // Next window opens lower instead: the trailing minimum is dropped
        let mut series = vec![9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        series.extend([0.5, 1.5, 2.5, 3.5, 4.5, 5.5, 6.5, 7.5, 8.5]);
        let raw = detect_levels(&pts(&series), Resolution::Day);
        assert!(!prices(&raw).contains(&1.0));
    }

    #[test]
    fn test_trailing_edge_max_mirrors_min_rule() {
        // A maximum on the window's last point counts only when the next
        // point is strictly higher, so a rising continuation is recorded...
        let mut series = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        series.extend([10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0]);
        let raw = detect_levels(&pts(&series), Resolution::Day);
        assert_eq!(prices(&raw), vec![9.0]);

        // ...while a genuine peak right on the boundary goes undetected
        let mut series = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        series.extend([8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0]);
        let raw = detect_levels(&pts(&series), Resolution::Day);
        assert!(raw.is_empty());
    }

    #[test]
    fn test_short_final_window() {
        // Ten points leave a one-point final window; its lone price still
        // qualifies through the window-first branch
        let series = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 0.5];
        let raw = detect_levels(&pts(&series), Resolution::Day);
        assert_eq!(prices(&raw), vec![0.5]);
    }

    #[test]
    fn test_tied_extrema_pick_first_min_last_max() {
        // Two equal minima: the earlier one is nominated.
        // Two equal maxima: the later one is.
        let points = pts(&[5.0, 1.0, 3.0, 1.0, 3.0, 9.0, 4.0, 9.0, 4.0]);
        let raw = detect_levels(&points, Resolution::Day);
        let times: Vec<_> = raw.iter().map(|l| l.time).collect();
        assert_eq!(prices(&raw), vec![1.0, 9.0]);
        assert_eq!(times[0], points[1].time, "first of the tied minima");
        assert_eq!(times[1], points[7].time, "last of the tied maxima");
    }

    #[test]
    fn test_scan_offsets_bias_short_frames_to_recent_history() {
        // Deep dip early in a 600-point flat series
        let mut series = vec![100.0; 600];
        series[30] = 50.0;
        let points = pts(&series);

        // Month scans the whole series and sees the dip
        assert_eq!(prices(&detect_levels(&points, Resolution::Month)), vec![50.0]);
        // Week starts 540 points from the end (index 60), Day 180 (index 420)
        assert!(detect_levels(&points, Resolution::Week).is_empty());
        assert!(detect_levels(&points, Resolution::Day).is_empty());

        // With less history than the offset, Week scans from the start
        let mut series = vec![100.0; 500];
        series[30] = 50.0;
        let points = pts(&series);
        assert_eq!(prices(&detect_levels(&points, Resolution::Week)), vec![50.0]);
    }

    #[test]
    fn test_cluster_nearby_levels() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let mk = |i: i64, price: f64| Level {
            time: base + Duration::hours(i),
            price,
            strength: 1,
        };

        let reduced = reduce_levels(vec![mk(0, 100.0), mk(1, 100.2), mk(2, 105.0)], 0.0025);
        assert_eq!(reduced.len(), 2);
        assert_eq!(reduced[0].price, 100.0);
        assert_eq!(reduced[0].strength, 2);
        assert_eq!(reduced[0].time, base, "survivor keeps its own timestamp");
        assert_eq!(reduced[1].price, 105.0);
        assert_eq!(reduced[1].strength, 1);
    }

    #[test]
    fn test_cluster_is_order_dependent() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let mk = |i: i64, price: f64| Level {
            time: base + Duration::hours(i),
            price,
            strength: 1,
        };

        // 100.0 absorbs 100.2; 99.8 is within band of 100.0 too and is
        // swept by it, not by 100.2
        let reduced = reduce_levels(vec![mk(0, 100.0), mk(1, 100.2), mk(2, 99.8)], 0.0025);
        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced[0].price, 100.0);
        assert_eq!(reduced[0].strength, 3);
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let mk = |i: i64, price: f64| Level {
            time: base + Duration::hours(i),
            price,
            strength: 1,
        };

        let once = reduce_levels(
            vec![
                mk(0, 100.0),
                mk(1, 100.2),
                mk(2, 99.9),
                mk(3, 105.0),
                mk(4, 104.9),
                mk(5, 200.0),
            ],
            0.0025,
        );
        let twice = reduce_levels(once.clone(), 0.0025);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_compute_levels_seeds_strength() {
        let points = pts(&[5.0, 4.0, 3.0, 1.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let levels = compute_levels(&points, Resolution::Day, 0.0025);
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].price, 1.0);
        assert_eq!(levels[0].strength, 1, "an unmerged level counts itself");
    }
}
