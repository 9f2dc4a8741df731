// Stroke capture: turns a pointer gesture into ink on a drawing surface.
// Visual outcomes:
// - While the button is held, each pointer move paints one straight segment
//   (fixed width, or thinner/thicker depending on how fast the pointer moved).
// - On release, with smoothing on, the jagged polyline is swapped for a
//   chain of quadratic curves through the midpoints.

use crate::types::{Point, RasterImage, Rgb};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Width used when no profile entry matches, and while smoothing is on.
pub const FALLBACK_WIDTH: f32 = 3.0;

/// How ink is laid down. Every field is a user-facing knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub color: Rgb,
    pub base_thickness: f32,
    pub thickness_multiplier: f32,
    pub variable_thickness: bool,
    pub smoothing: bool,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgb::new(0x0d, 0x3d, 0x78),
            base_thickness: 10.0,
            thickness_multiplier: 1.35,
            variable_thickness: false,
            smoothing: false,
        }
    }
}

/// One row of the thickness table: movements no longer than `tolerance`
/// (as a fraction of surface width) draw at `width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceStep {
    pub tolerance: f32,
    pub width: f32,
}

const fn step(tolerance: f32, width: f32) -> ToleranceStep {
    ToleranceStep { tolerance, width }
}

/// Loosest tolerance first. Slow movement => small distance => wide ink.
const DEFAULT_STEPS: [ToleranceStep; 26] = [
    step(0.350, 0.81),
    step(0.300, 0.83),
    step(0.250, 0.86),
    step(0.200, 0.9),
    step(0.150, 0.93),
    step(0.100, 0.96),
    step(0.095, 0.99),
    step(0.090, 1.3),
    step(0.085, 1.4),
    step(0.080, 1.6),
    step(0.075, 1.8),
    step(0.070, 1.9),
    step(0.065, 2.1),
    step(0.060, 2.3),
    step(0.055, 2.5),
    step(0.050, 2.7),
    step(0.045, 2.9),
    step(0.040, 3.1),
    step(0.035, 3.3),
    step(0.030, 3.5),
    step(0.025, 3.7),
    step(0.020, 3.9),
    step(0.015, 4.1),
    step(0.010, 4.3),
    step(0.005, 4.5),
    step(0.001, 4.7),
];

/// Ordered table mapping normalized movement distance to a width factor.
#[derive(Debug, Clone, PartialEq)]
pub struct ThicknessProfile {
    steps: Vec<ToleranceStep>,
}

impl ThicknessProfile {
    /// Entries are consulted in the given order; nothing is re-sorted.
    pub fn new(steps: Vec<ToleranceStep>) -> Self {
        Self { steps }
    }

    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// Linear scan; the *last* entry whose tolerance covers `distance` wins.
    /// With the table sorted loosest-first this is the tightest match.
    pub fn width_for(&self, distance: f32) -> Option<f32> {
        let mut width = None;
        for s in &self.steps {
            if distance <= s.tolerance {
                width = Some(s.width);
            }
        }
        width
    }
}

impl Default for ThicknessProfile {
    fn default() -> Self {
        Self::new(DEFAULT_STEPS.to_vec())
    }
}

/// Points recorded between one start and one stop, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StrokeSession {
    pub points: Vec<Point>,
}

impl StrokeSession {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// One straight piece of ink produced by a pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub from: Point,
    pub to: Point,
    pub width: f32,
    pub color: Rgb,
}

/// Sub-pixel position; curve midpoints land between pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for CurvePoint {
    fn from(p: Point) -> Self {
        Self {
            x: p.x as f32,
            y: p.y as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCurve {
    pub control: CurvePoint,
    pub end: CurvePoint,
}

/// A chain of quadratic curves starting at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothPath {
    pub start: CurvePoint,
    pub curves: Vec<QuadCurve>,
    pub width: f32,
    pub color: Rgb,
}

/// Build the smoothed replacement for a polyline, or None for fewer than 3 points.
/// Each interior point becomes a control point ending at the midpoint to its
/// successor; the last curve uses the second-to-last point as control and ends
/// exactly on the final point.
pub fn smooth_path(points: &[Point], width: f32, color: Rgb) -> Option<SmoothPath> {
    if points.len() < 3 {
        return None;
    }
    let last = points.len() - 1;
    let mut curves = Vec::with_capacity(last - 1);
    for i in 1..last - 1 {
        let (a, b) = (points[i], points[i + 1]);
        curves.push(QuadCurve {
            control: a.into(),
            end: CurvePoint {
                x: (a.x + b.x) as f32 / 2.0,
                y: (a.y + b.y) as f32 / 2.0,
            },
        });
    }
    curves.push(QuadCurve {
        control: points[last - 1].into(),
        end: points[last].into(),
    });
    Some(SmoothPath {
        start: points[0].into(),
        curves,
        width,
        color,
    })
}

/// Something ink can be put on. The capture owns one for its whole life.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn stroke_segment(&mut self, segment: &LineSegment);
    fn stroke_path(&mut self, path: &SmoothPath);
    /// Wipe everything back to transparent.
    fn clear(&mut self);
    fn snapshot(&self) -> RasterImage;
    fn restore(&mut self, image: &RasterImage);
}

struct ActiveStroke {
    points: Vec<Point>,
    // Surface content before this stroke; smoothing repaints on top of it.
    baseline: RasterImage,
}

/// Drives one surface from pointer events. Holds only per-gesture state.
pub struct StrokeCapture<S: Surface> {
    surface: S,
    style: StrokeStyle,
    default_style: StrokeStyle,
    profile: ThicknessProfile,
    active: Option<ActiveStroke>,
}

impl<S: Surface> StrokeCapture<S> {
    /// `style` also becomes the style restored by `reset`.
    pub fn new(surface: S, style: StrokeStyle) -> Self {
        Self {
            surface,
            default_style: style.clone(),
            style,
            profile: ThicknessProfile::default(),
            active: None,
        }
    }

    pub fn with_profile(mut self, profile: ThicknessProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    pub fn toggle_smoothing(&mut self) -> bool {
        self.style.smoothing = !self.style.smoothing;
        self.style.smoothing
    }

    pub fn toggle_variable_thickness(&mut self) -> bool {
        self.style.variable_thickness = !self.style.variable_thickness;
        self.style.variable_thickness
    }

    /// Keep points on the surface so distances and ink stay in bounds.
    fn clamp(&self, p: Point) -> Point {
        let max_x = (self.surface.width() as i32 - 1).max(0);
        let max_y = (self.surface.height() as i32 - 1).max(0);
        Point::new(p.x.clamp(0, max_x), p.y.clamp(0, max_y))
    }

    /// Pointer went down. Ignored while a gesture is already running.
    pub fn start(&mut self, point: Point) {
        if self.active.is_some() {
            trace!("start ignored: stroke already active");
            return;
        }
        let p = self.clamp(point);
        debug!(x = p.x, y = p.y, "stroke started");
        self.active = Some(ActiveStroke {
            points: vec![p],
            baseline: self.surface.snapshot(),
        });
    }

    /// Pointer moved. Paints and returns the new segment; None outside a gesture.
    pub fn move_to(&mut self, point: Point) -> Option<LineSegment> {
        let from = self.active.as_ref()?.points.last().copied()?;
        let to = self.clamp(point);

        let distance = from.distance(to) / self.surface.width().max(1) as f32;
        let width = if self.style.variable_thickness {
            self.stroke_width(distance)
        } else {
            self.style.base_thickness
        };

        let segment = LineSegment {
            from,
            to,
            width,
            color: self.style.color,
        };
        trace!(?from, ?to, distance, width, "stroke segment");
        self.surface.stroke_segment(&segment);

        if let Some(active) = self.active.as_mut() {
            active.points.push(to);
        }
        Some(segment)
    }

    /// Pointer released. Returns the recorded points (empty outside a gesture).
    pub fn stop(&mut self) -> StrokeSession {
        let Some(active) = self.active.take() else {
            return StrokeSession::default();
        };

        if self.style.smoothing {
            if let Some(path) =
                smooth_path(&active.points, self.style.base_thickness, self.style.color)
            {
                debug!(curves = path.curves.len(), "replacing stroke with smoothed path");
                self.surface.restore(&active.baseline);
                self.surface.stroke_path(&path);
            }
        }

        debug!(points = active.points.len(), "stroke finished");
        StrokeSession {
            points: active.points,
        }
    }

    /// Drop any gesture, wipe the surface and go back to the initial style.
    pub fn reset(&mut self) {
        self.active = None;
        self.surface.clear();
        self.style = self.default_style.clone();
        debug!("pad reset");
    }

    /// Width for a move of `distance` (fraction of surface width).
    pub fn stroke_width(&self, distance: f32) -> f32 {
        if self.style.smoothing {
            return FALLBACK_WIDTH;
        }
        let width = self.profile.width_for(distance).unwrap_or(FALLBACK_WIDTH);
        width * self.style.thickness_multiplier
    }

    /// Snapshot of what is currently drawn, ready for filters or encoding.
    pub fn current_image(&self) -> RasterImage {
        self.surface.snapshot()
    }
}
