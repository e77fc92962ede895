//! Spring-damped point field behind the fallback curve.

/// Pull toward the target per tick.
pub const SPRING: f64 = 0.06;
/// Velocity kept per tick.
pub const DAMPING: f64 = 0.86;
/// Horizontal pointer offset from the viewport center that reaches the curve.
pub const INFLUENCE_X: f64 = 0.05;
/// Vertical pointer offset from the viewport center that reaches the curve.
pub const INFLUENCE_Y: f64 = 0.12;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Point {
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Pointer position in CSS pixels. Absence is `Option::None` at call sites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered control points of the fallback curve.
#[derive(Clone, Debug, Default)]
pub struct PointField {
    points: Vec<Point>,
}

impl PointField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the field with `count` resting points spread across `[0, width]`
    /// on the horizontal midline.
    ///
    /// A count of 1 divides by zero and leaves a NaN x; `step` skips such a
    /// field.
    pub fn initialize(&mut self, width: f64, height: f64, count: usize) {
        self.points.clear();
        self.points.extend((0..count).map(|i| Point {
            x: rest_x(width, i, count),
            y: height / 2.0,
            vx: 0.0,
            vy: 0.0,
        }));
    }

    /// Advance every point one tick toward its target.
    pub fn step(&mut self, pointer: Option<Pointer>, width: f64, height: f64) -> &[Point] {
        let count = self.points.len();
        if count <= 1 {
            return &self.points;
        }
        let n = count as f64;
        let mid = (n - 1.0) / 2.0;
        let (influence_x, influence_y) = match pointer {
            Some(p) => (
                (p.x - width / 2.0) * INFLUENCE_X,
                (p.y - height / 2.0) * INFLUENCE_Y,
            ),
            None => (0.0, 0.0),
        };

        for (i, p) in self.points.iter_mut().enumerate() {
            let offset = i as f64 - mid;
            let falloff = 1.0 - (offset.abs() / n).min(1.0);
            let tx = rest_x(width, i, count) + influence_x * falloff;
            let ty = height / 2.0 + influence_y * (offset / (n / 2.0));

            p.vx += (tx - p.x) * SPRING;
            p.vy += (ty - p.y) * SPRING;
            p.vx *= DAMPING;
            p.vy *= DAMPING;
            p.x += p.vx;
            p.y += p.vy;
        }
        &self.points
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn rest_x(width: f64, i: usize, count: usize) -> f64 {
    width * (i as f64 / (count as f64 - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_xs(field: &PointField, expected: &[f64]) {
        let xs: Vec<f64> = field.points().iter().map(|p| p.x).collect();
        assert_eq!(xs.len(), expected.len());
        for (x, e) in xs.iter().zip(expected) {
            assert!((x - e).abs() < 1e-9, "{xs:?} != {expected:?}");
        }
    }

    #[test]
    fn initialize_spreads_across_width() {
        let mut field = PointField::new();
        field.initialize(600.0, 400.0, 6);
        assert_xs(&field, &[0.0, 120.0, 240.0, 360.0, 480.0, 600.0]);
        assert!(field.points().iter().all(|p| p.y == 200.0 && p.speed() == 0.0));
    }

    #[test]
    fn resting_field_stays_put_without_pointer() {
        let mut field = PointField::new();
        field.initialize(600.0, 400.0, 6);
        let before = field.points().to_vec();
        field.step(None, 600.0, 400.0);
        assert_eq!(field.points(), &before[..]);
    }

    #[test]
    fn centered_pointer_only_bends_vertically() {
        let mut field = PointField::new();
        field.initialize(600.0, 400.0, 6);
        field.step(Some(Pointer::new(300.0, 0.0)), 600.0, 400.0);

        assert_xs(&field, &[0.0, 120.0, 240.0, 360.0, 480.0, 600.0]);
        // influence_y = -24; mid = 2.5; point 0 target = 200 - 24 * (-2.5 / 3) = 220
        let p0 = field.points()[0];
        assert!((p0.vy - 20.0 * SPRING * DAMPING).abs() < 1e-9);
        assert!((p0.y - (200.0 + p0.vy)).abs() < 1e-9);
        // the curve tilts through the middle: left half down, right half up
        let ys: Vec<f64> = field.points().iter().map(|p| p.y).collect();
        assert!(ys[0] > 200.0 && ys[2] > 200.0);
        assert!(ys[3] < 200.0 && ys[5] < 200.0);
        assert!((ys[0] - 200.0 + (ys[5] - 200.0)).abs() < 1e-9);
    }

    #[test]
    fn horizontal_influence_peaks_in_the_middle() {
        let mut field = PointField::new();
        field.initialize(500.0, 400.0, 5);
        for _ in 0..400 {
            field.step(Some(Pointer::new(500.0, 200.0)), 500.0, 400.0);
        }
        let rest = [0.0, 125.0, 250.0, 375.0, 500.0];
        let shift: Vec<f64> = field
            .points()
            .iter()
            .zip(rest)
            .map(|(p, r)| p.x - r)
            .collect();
        // influence_x = 12.5; falloff = 1 - |i - 2| / 5
        assert!((shift[2] - 12.5).abs() < 1e-6);
        assert!((shift[0] - 12.5 * 0.6).abs() < 1e-6);
        assert!((shift[1] - shift[3]).abs() < 1e-6);
    }

    #[test]
    fn single_point_is_left_alone() {
        let mut field = PointField::new();
        field.initialize(600.0, 400.0, 1);
        assert_eq!(field.len(), 1);
        assert!(field.points()[0].x.is_nan());
        let before = field.points()[0];
        field.step(Some(Pointer::new(10.0, 10.0)), 600.0, 400.0);
        assert!(field.points()[0].x.is_nan());
        assert_eq!(field.points()[0].y, before.y);
    }

    #[test]
    fn empty_field_steps_to_nothing() {
        let mut field = PointField::new();
        assert!(field.step(None, 100.0, 100.0).is_empty());
    }
}
