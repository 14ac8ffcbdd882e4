//! Calendar popup placement
//!
//! The popup opens beside its trigger, on whichever side faces the middle of
//! the screen. On a horizontal panel it opens below or above the trigger; on
//! a vertical panel it opens to the right or left. Along the other axis it is
//! aligned with the trigger edge nearest the screen edge.
//!
//! Everything here is pure integer arithmetic so that the result can be
//! recomputed whenever the orientation or trigger position changes.

use crate::panel::Orientation;

/// A position in screen coordinates
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height in pixels
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A screen rectangle: top left corner plus extent
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Construct a rect from a position and a size
    pub const fn from_parts(at: Point, size: Size) -> Self {
        Self::new(at.x, at.y, size.width, size.height)
    }

    /// The top left corner
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The extent
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Whether `other` lies entirely within this rect
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.w <= self.x + self.w
            && other.y + other.h <= self.y + self.h
    }
}

/// A Rect converts to its top left corner
impl From<Rect> for Point {
    fn from(r: Rect) -> Self {
        r.origin()
    }
}

/// Everything needed to place the popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupGeometry {
    /// Trigger origin and size in screen coordinates
    pub trigger: Rect,
    /// Usable screen size
    pub screen: Size,
    /// Measured popup size
    pub popup: Size,
    /// Orientation of the panel the trigger lives on
    pub orientation: Orientation,
}

impl PopupGeometry {
    /// Where the popup's top left corner goes
    pub fn place(&self) -> Point {
        place_popup(self.trigger, self.screen, self.popup, self.orientation)
    }
}

/// Compute the popup's top left corner.
///
/// The trigger counts as being in the left (top) half when its origin is
/// strictly less than half the screen width (height), using integer halves.
pub fn place_popup(trigger: Rect, screen: Size, popup: Size, orientation: Orientation) -> Point {
    let Rect {
        x: px,
        y: py,
        w: pw,
        h: ph,
    } = trigger;
    let left_half = px < screen.width / 2;
    let top_half = py < screen.height / 2;

    let point = match orientation {
        Orientation::Vertical => {
            let x = if left_half { px + pw } else { px - popup.width };
            let y = if top_half { py } else { py + ph - popup.height };
            Point::new(x, y)
        }
        Orientation::Horizontal => {
            let x = if left_half { px } else { px + pw - popup.width };
            let y = if top_half { py + ph } else { py - popup.height };
            Point::new(x, y)
        }
    };

    tracing::debug!(
        %orientation,
        trigger = ?trigger,
        screen = ?screen,
        popup = ?popup,
        x = point.x,
        y = point.y,
        "Placed calendar popup"
    );

    point
}

/// Move `at` so that a popup of `size` stays inside `monitor`.
///
/// The right and bottom edges are fixed first, then the left and top edges,
/// so a popup larger than the monitor ends up aligned to its top left.
pub fn clamp_to_monitor(at: Point, size: Size, monitor: Rect) -> Point {
    let mut x = at.x;
    let mut y = at.y;

    if x > monitor.x + monitor.w - size.width {
        x = monitor.x + monitor.w - size.width;
    }
    if x < monitor.x {
        x = monitor.x;
    }
    if y > monitor.y + monitor.h - size.height {
        y = monitor.y + monitor.h - size.height;
    }
    if y < monitor.y {
        y = monitor.y;
    }

    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    const SCREEN: Size = Size::new(1920, 1080);
    const POPUP: Size = Size::new(200, 250);

    #[test]
    fn test_horizontal_top_left() {
        let at = place_popup(
            Rect::new(10, 10, 100, 20),
            SCREEN,
            POPUP,
            Orientation::Horizontal,
        );
        assert_eq!(at, Point::new(10, 30));
    }

    #[test]
    fn test_vertical_bottom_right() {
        let at = place_popup(
            Rect::new(1800, 1000, 100, 20),
            SCREEN,
            POPUP,
            Orientation::Vertical,
        );
        assert_eq!(at, Point::new(1600, 770));
    }

    #[test_case(Rect::new(10, 10, 100, 20), Point::new(10, 30); "upper left")]
    #[test_case(Rect::new(10, 1050, 100, 30), Point::new(10, 800); "lower left")]
    #[test_case(Rect::new(1800, 0, 120, 30), Point::new(1720, 30); "upper right")]
    #[test_case(Rect::new(1800, 1050, 120, 30), Point::new(1720, 800); "lower right")]
    #[test]
    fn test_horizontal_quadrants(trigger: Rect, expected: Point) {
        assert_eq!(
            place_popup(trigger, SCREEN, POPUP, Orientation::Horizontal),
            expected
        );
    }

    #[test_case(Rect::new(0, 10, 40, 30), Point::new(40, 10); "upper left")]
    #[test_case(Rect::new(0, 900, 40, 30), Point::new(40, 680); "lower left")]
    #[test_case(Rect::new(1880, 10, 40, 30), Point::new(1680, 10); "upper right")]
    #[test_case(Rect::new(1880, 900, 40, 30), Point::new(1680, 680); "lower right")]
    #[test]
    fn test_vertical_quadrants(trigger: Rect, expected: Point) {
        assert_eq!(
            place_popup(trigger, SCREEN, POPUP, Orientation::Vertical),
            expected
        );
    }

    #[test]
    fn test_exact_half_counts_as_right_and_bottom() {
        let at = place_popup(
            Rect::new(960, 540, 100, 20),
            SCREEN,
            POPUP,
            Orientation::Horizontal,
        );
        assert_eq!(at, Point::new(860, 290));
    }

    #[test]
    fn test_odd_screen_uses_integer_half() {
        // 1921 / 2 == 960, so 960 is not in the left half
        let at = place_popup(
            Rect::new(960, 0, 10, 10),
            Size::new(1921, 1080),
            POPUP,
            Orientation::Horizontal,
        );
        assert_eq!(at.x, 960 + 10 - 200);
    }

    #[test]
    fn test_geometry_place_matches_free_function() {
        let geometry = PopupGeometry {
            trigger: Rect::new(10, 10, 100, 20),
            screen: SCREEN,
            popup: POPUP,
            orientation: Orientation::Horizontal,
        };
        assert_eq!(geometry.place(), Point::new(10, 30));
    }

    #[test]
    fn test_popup_inside_screen_over_grid() {
        let screen_rect = Rect::from_parts(Point::default(), SCREEN);

        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            for popup in [Size::new(1, 1), Size::new(200, 250), Size::new(300, 400)] {
                for (pw, ph) in [(1, 1), (24, 24), (64, 32), (40, 64)] {
                    for px in (0..=(SCREEN.width - pw)).step_by(37) {
                        for py in (0..=(SCREEN.height - ph)).step_by(41) {
                            let trigger = Rect::new(px, py, pw, ph);
                            let at = place_popup(trigger, SCREEN, popup, orientation);
                            let placed = Rect::from_parts(at, popup);
                            assert!(
                                screen_rect.contains(&placed),
                                "{placed:?} outside screen for {trigger:?} {orientation}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_clamp_inside_is_noop() {
        let monitor = Rect::new(0, 0, 1920, 1080);
        let at = Point::new(100, 100);
        assert_eq!(clamp_to_monitor(at, POPUP, monitor), at);
    }

    #[test]
    fn test_clamp_to_second_monitor() {
        let monitor = Rect::new(1920, 0, 1280, 1024);

        let off_right = clamp_to_monitor(Point::new(3150, 10), POPUP, monitor);
        assert_eq!(off_right, Point::new(3000, 10));

        let off_left = clamp_to_monitor(Point::new(1800, -20), POPUP, monitor);
        assert_eq!(off_left, Point::new(1920, 0));
    }

    #[test]
    fn test_clamp_oversized_popup_aligns_top_left() {
        let monitor = Rect::new(0, 0, 100, 100);
        let at = clamp_to_monitor(Point::new(50, 50), Size::new(300, 300), monitor);
        assert_eq!(at, Point::new(0, 0));
    }

    mod properties {
        use super::super::*;
        use quickcheck::{Arbitrary, Gen, TestResult};
        use quickcheck_macros::quickcheck;

        // Inputs are kept to the region where the popup always fits beside
        // the trigger: popup at most 300x400, trigger at most 64 square and
        // fully on a 1920x1080 screen.
        #[derive(Debug, Clone)]
        struct Scenario {
            trigger: Rect,
            popup: Size,
            orientation: Orientation,
        }

        impl Arbitrary for Scenario {
            fn arbitrary(g: &mut Gen) -> Self {
                let pw = 1 + i32::from(u8::arbitrary(g)) % 64;
                let ph = 1 + i32::from(u8::arbitrary(g)) % 64;
                let px = i32::from(u16::arbitrary(g)) % (1920 - pw + 1);
                let py = i32::from(u16::arbitrary(g)) % (1080 - ph + 1);
                let w = 1 + i32::from(u16::arbitrary(g)) % 300;
                let h = 1 + i32::from(u16::arbitrary(g)) % 400;
                let orientation = if bool::arbitrary(g) {
                    Orientation::Horizontal
                } else {
                    Orientation::Vertical
                };

                Self {
                    trigger: Rect::new(px, py, pw, ph),
                    popup: Size::new(w, h),
                    orientation,
                }
            }
        }

        const SCREEN: Size = Size::new(1920, 1080);

        #[quickcheck]
        fn placement_is_idempotent(s: Scenario) -> bool {
            let first = place_popup(s.trigger, SCREEN, s.popup, s.orientation);
            let second = place_popup(s.trigger, SCREEN, s.popup, s.orientation);

            first == second
        }

        #[quickcheck]
        fn placement_stays_on_screen(s: Scenario) -> bool {
            let at = place_popup(s.trigger, SCREEN, s.popup, s.orientation);
            let screen = Rect::from_parts(Point::default(), SCREEN);

            screen.contains(&Rect::from_parts(at, s.popup))
        }

        #[quickcheck]
        fn placement_touches_trigger(s: Scenario) -> bool {
            let at = place_popup(s.trigger, SCREEN, s.popup, s.orientation);
            let t = s.trigger;

            match s.orientation {
                Orientation::Horizontal => at.y == t.y + t.h || at.y + s.popup.height == t.y,
                Orientation::Vertical => at.x == t.x + t.w || at.x + s.popup.width == t.x,
            }
        }

        #[quickcheck]
        fn clamped_popup_fits_monitor(x: i16, y: i16, s: Scenario) -> TestResult {
            let monitor = Rect::new(0, 0, 1920, 1080);
            let at = clamp_to_monitor(Point::new(x.into(), y.into()), s.popup, monitor);

            TestResult::from_bool(monitor.contains(&Rect::from_parts(at, s.popup)))
        }
    }
}
