//! Boundary snapping for association endpoints.
//!
//! When an endpoint is dropped onto a character node, it snaps to one of
//! eight attachment regions on the node rectangle's boundary: the four
//! edge bands and the four corners. The rule is pure and deterministic so
//! the host can preview the snap target during a drag.

use fabula_core::geometry::{Point, Rect};

/// Snaps a point to the nearest attachment position on a rectangle's
/// boundary.
///
/// `band` is the fraction of the rectangle's extent forming the snap band
/// on each side (0.2 gives 20% bands). A point inside the left or right
/// band snaps its x-coordinate to that edge; inside the top or bottom band
/// it snaps its y-coordinate. A point inside the central dead zone snaps
/// to the midpoint of a single edge: left or right when the point lies in
/// the middle vertical third of the rectangle, otherwise top when above
/// center and bottom when below.
///
/// The function is idempotent: applying it to its own output returns the
/// same point.
///
/// # Examples
///
/// ```
/// use fabula::chart::snap_to_rect_boundary;
/// use fabula_core::geometry::{Point, Rect, Size};
///
/// let rect = Rect::new(Point::new(0.0, 0.0), Size::new(100.0, 50.0));
///
/// // Inside the left band: x snaps to the left edge.
/// let snapped = snap_to_rect_boundary(rect, Point::new(10.0, 30.0), 0.2);
/// assert_eq!(snapped, Point::new(0.0, 30.0));
///
/// // Dead zone, above center: snaps to the top edge midpoint.
/// let snapped = snap_to_rect_boundary(rect, Point::new(50.0, 20.0), 0.2);
/// assert_eq!(snapped, Point::new(50.0, 0.0));
/// ```
pub fn snap_to_rect_boundary(rect: Rect, point: Point, band: f64) -> Point {
    let mut x = point.x();
    let mut y = point.y();
    let mut in_dead_zone_x = false;
    let mut in_dead_zone_y = false;

    if x < rect.min_x() + rect.width() * band {
        x = rect.min_x();
    } else if x > rect.max_x() - rect.width() * band {
        x = rect.max_x();
    } else {
        in_dead_zone_x = true;
    }

    if y < rect.min_y() + rect.height() * band {
        y = rect.min_y();
    } else if y > rect.max_y() - rect.height() * band {
        y = rect.max_y();
    } else {
        in_dead_zone_y = true;
    }

    // Inside the central dead zone: pick a single edge midpoint.
    if in_dead_zone_x && in_dead_zone_y {
        let center = rect.center();
        let third_top = rect.min_y() + rect.height() / 3.0;
        let third_bottom = rect.min_y() + rect.height() * 2.0 / 3.0;
        let in_middle_third = y > third_top && y < third_bottom;

        if in_middle_third && x < center.x() {
            x = rect.min_x();
            y = center.y();
        } else if in_middle_third {
            x = rect.max_x();
            y = center.y();
        } else if y < center.y() {
            x = center.x();
            y = rect.min_y();
        } else {
            x = center.x();
            y = rect.max_y();
        }
    }

    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use fabula_core::geometry::Size;

    use super::*;

    fn rect() -> Rect {
        Rect::new(Point::new(100.0, 200.0), Size::new(100.0, 50.0))
    }

    #[test]
    fn test_left_band_snaps_x() {
        let snapped = snap_to_rect_boundary(rect(), Point::new(110.0, 225.0), 0.2);
        assert_eq!(snapped, Point::new(100.0, 225.0));
    }

    #[test]
    fn test_right_band_snaps_x() {
        let snapped = snap_to_rect_boundary(rect(), Point::new(195.0, 225.0), 0.2);
        assert_eq!(snapped, Point::new(200.0, 225.0));
    }

    #[test]
    fn test_top_band_snaps_y() {
        let snapped = snap_to_rect_boundary(rect(), Point::new(150.0, 205.0), 0.2);
        assert_eq!(snapped, Point::new(150.0, 200.0));
    }

    #[test]
    fn test_bottom_band_snaps_y() {
        let snapped = snap_to_rect_boundary(rect(), Point::new(150.0, 245.0), 0.2);
        assert_eq!(snapped, Point::new(150.0, 250.0));
    }

    #[test]
    fn test_corner_band_snaps_both() {
        let snapped = snap_to_rect_boundary(rect(), Point::new(105.0, 204.0), 0.2);
        assert_eq!(snapped, Point::new(100.0, 200.0));
    }

    #[test]
    fn test_dead_zone_left_of_center() {
        // Middle vertical third, left of center.
        let snapped = snap_to_rect_boundary(rect(), Point::new(140.0, 224.0), 0.2);
        assert_eq!(snapped, Point::new(100.0, 225.0));
    }

    #[test]
    fn test_dead_zone_right_of_center() {
        let snapped = snap_to_rect_boundary(rect(), Point::new(160.0, 226.0), 0.2);
        assert_eq!(snapped, Point::new(200.0, 225.0));
    }

    #[test]
    fn test_dead_zone_above_center() {
        // Dead zone but outside the middle vertical third.
        let snapped = snap_to_rect_boundary(rect(), Point::new(140.0, 214.0), 0.2);
        assert_eq!(snapped, Point::new(150.0, 200.0));
    }

    #[test]
    fn test_dead_zone_below_center() {
        let snapped = snap_to_rect_boundary(rect(), Point::new(160.0, 236.0), 0.2);
        assert_eq!(snapped, Point::new(150.0, 250.0));
    }

    #[test]
    fn test_idempotent_on_edges() {
        let candidates = [
            Point::new(110.0, 225.0),
            Point::new(195.0, 225.0),
            Point::new(150.0, 205.0),
            Point::new(150.0, 245.0),
            Point::new(140.0, 224.0),
            Point::new(160.0, 236.0),
            Point::new(105.0, 204.0),
        ];

        for point in candidates {
            let once = snap_to_rect_boundary(rect(), point, 0.2);
            let twice = snap_to_rect_boundary(rect(), once, 0.2);
            assert_eq!(once, twice, "not idempotent for {point:?}");
        }
    }
}
