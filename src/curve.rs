//! Layered translucent curves and pointer glow.

use crate::color::{Color, Rgba};
use crate::field::{Point, Pointer};

pub const LAYERS: usize = 3;
/// Vertical distance between neighbouring layers.
pub const LAYER_OFFSET: f64 = 8.0;
/// Near-black wash painted each frame so old strokes fade into a trail.
pub const TRAIL: Rgba = Rgba {
    r: 10,
    g: 18,
    b: 26,
    a: 0.02,
};
pub const GLOW_RADIUS: f64 = 22.0;
pub const GLOW_ALPHA: f64 = 0.08;

/// How a rectangle is filled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    /// Gradient from `inner` at the center to `outer` at `radius`.
    Radial {
        cx: f64,
        cy: f64,
        radius: f64,
        inner: Rgba,
        outer: Rgba,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
}

/// One segment of an open path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSeg {
    MoveTo(f64, f64),
    /// Control point, then end point.
    QuadTo(f64, f64, f64, f64),
}

/// A 2-D drawing target. Coordinates are CSS pixels.
pub trait Surface {
    /// The viewport changed; `scale` is backing pixels per CSS pixel.
    fn resize(&mut self, _width: f64, _height: f64, _scale: f64) {}
    fn clear(&mut self, width: f64, height: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: Paint);
    /// Stroke an open path with round caps and joins.
    fn stroke_path(&mut self, path: &[PathSeg], stroke: Stroke);
}

/// Style inputs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Look {
    pub color: Color,
    pub intensity: f64,
}

/// Draw one frame of the fallback animation.
pub fn draw(
    surface: &mut dyn Surface,
    width: f64,
    height: f64,
    points: &[Point],
    pointer: Option<Pointer>,
    look: Look,
) {
    surface.clear(width, height);
    surface.fill_rect(0.0, 0.0, width, height, Paint::Solid(TRAIL));

    if !points.is_empty() {
        let mut path = Vec::with_capacity(points.len());
        for layer in 0..LAYERS {
            layer_path(points, layer, &mut path);
            surface.stroke_path(&path, layer_stroke(layer, look));
        }
    }

    if let Some(p) = pointer {
        let radius = GLOW_RADIUS * look.intensity.clamp(0.6, 2.0);
        let inner = look
            .color
            .with_alpha((GLOW_ALPHA * look.intensity).clamp(0.0, 1.0));
        surface.fill_rect(
            p.x - radius,
            p.y - radius,
            radius * 2.0,
            radius * 2.0,
            Paint::Radial {
                cx: p.x,
                cy: p.y,
                radius,
                inner,
                outer: Rgba::TRANSPARENT,
            },
        );
    }
}

/// Quadratic segments through the interior points, each ending halfway to
/// the next point; the last point only shapes the final midpoint.
pub fn layer_path(points: &[Point], layer: usize, path: &mut Vec<PathSeg>) {
    path.clear();
    let dy = (layer as f64 - 1.0) * LAYER_OFFSET;
    let Some(first) = points.first() else {
        return;
    };
    path.push(PathSeg::MoveTo(first.x, first.y + dy));
    for pair in points[1..].windows(2) {
        let (p0, p1) = (pair[0], pair[1]);
        path.push(PathSeg::QuadTo(
            p0.x,
            p0.y + dy,
            (p0.x + p1.x) / 2.0,
            (p0.y + p1.y) / 2.0 + dy,
        ));
    }
}

pub fn layer_stroke(layer: usize, look: Look) -> Stroke {
    let layer = layer as f64;
    let base = (0.18 - layer * 0.05).max(0.03);
    Stroke {
        color: look.color.with_alpha((base * look.intensity).clamp(0.0, 1.0)),
        width: 1.6 + layer * 1.2,
    }
}
