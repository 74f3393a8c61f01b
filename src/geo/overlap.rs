//! Overlap Module
//!
//! Ratio-based comparisons between viewport rectangles.
//!
//! Two thresholds are in play: a strict one for cache matching (both
//! rectangles must be mostly covered) and a looser one for deciding whether
//! a pan or zoom is worth reacting to at all.

use crate::geo::GeoBounds;

// == Overlap Ratio ==
/// Computes how much of each rectangle is covered by their intersection.
///
/// Returns `(intersection / area(a), intersection / area(b))`. Disjoint
/// rectangles yield `(0.0, 0.0)`, and a zero-area rectangle always has a
/// ratio of `0.0`.
pub fn overlap_ratio(a: &GeoBounds, b: &GeoBounds) -> (f64, f64) {
    let Some(intersection) = a.intersection(b) else {
        return (0.0, 0.0);
    };

    let overlap_area = intersection.area();
    (ratio(overlap_area, a.area()), ratio(overlap_area, b.area()))
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        (part / whole).clamp(0.0, 1.0)
    }
}

// == Significant Overlap ==
/// True when the intersection covers at least `threshold` of both rectangles.
///
/// A small cached tile therefore never "covers" a much larger viewport just
/// because it is fully contained in it.
pub fn have_significant_overlap(a: &GeoBounds, b: &GeoBounds, threshold: f64) -> bool {
    let (ratio_a, ratio_b) = overlap_ratio(a, b);
    ratio_a >= threshold && ratio_b >= threshold
}

// == Significant Change ==
/// Decides whether moving from `old` to `new` deserves a re-evaluation.
///
/// True when there is no previous viewport, the two do not overlap, or
/// either overlap ratio is below `threshold`.
pub fn is_change_significant(old: Option<&GeoBounds>, new: &GeoBounds, threshold: f64) -> bool {
    let Some(old) = old else {
        return true;
    };

    let (ratio_old, ratio_new) = overlap_ratio(old, new);
    if ratio_old == 0.0 && ratio_new == 0.0 {
        return true;
    }

    ratio_old < threshold || ratio_new < threshold
}

// == Center Distance ==
/// Haversine distance in meters between the centers of two rectangles.
///
/// Returns `f64::INFINITY` when either side is absent.
pub fn center_distance(a: Option<&GeoBounds>, b: Option<&GeoBounds>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => a.center().distance_to(&b.center()),
        _ => f64::INFINITY,
    }
}
