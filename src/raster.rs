// Software canvas: the drawing surface the pad paints into.
// Visual effects provided here:
// 1) Round-capped straight strokes (each pointer move).
// 2) Quadratic curves, flattened into short strokes (the smoothed signature).

use crate::error::{Error, Result};
use crate::stroke::{CurvePoint, LineSegment, SmoothPath, Surface};
use crate::types::{RasterImage, Rgb};

/// A transparent RGBA canvas.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RasterImage,
}

impl Canvas {
    /// Both sides must be at least one pixel (distances are normalized by width).
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidInput(format!(
                "canvas must be at least 1x1, got {width}x{height}"
            )));
        }
        Ok(Self {
            image: RasterImage::new(width, height),
        })
    }

    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Paint a capsule (thick line with round caps) from `a` to `b`.
    /// Visual: every pixel whose center lies within width/2 of the segment turns `color`.
    fn stamp_capsule(&mut self, a: CurvePoint, b: CurvePoint, width: f32, color: Rgb) {
        // Thinner than a pixel would vanish between pixel centers.
        let r = (width * 0.5).max(0.5);
        let r2 = r * r;
        let w = self.image.width as i32;
        let h = self.image.height as i32;

        // Scan just the bounding box
        let x0 = ((a.x.min(b.x) - r).floor() as i32).max(0);
        let x1 = ((a.x.max(b.x) + r).ceil() as i32).min(w - 1);
        let y0 = ((a.y.min(b.y) - r).floor() as i32).max(0);
        let y1 = ((a.y.max(b.y) + r).ceil() as i32).min(h - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len2 = dx * dx + dy * dy;
        let rgba = [color.r, color.g, color.b, 255];

        for y in y0..=y1 {
            for x in x0..=x1 {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                // Project the pixel center onto the segment, clamped to its ends
                let t = if len2 > 0.0 {
                    (((px - a.x) * dx + (py - a.y) * dy) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let ex = a.x + dx * t - px;
                let ey = a.y + dy * t - py;
                if ex * ex + ey * ey <= r2 {
                    self.image.put_pixel(x as usize, y as usize, rgba);
                }
            }
        }
    }
}

/// Point on the quadratic Bezier p0 -> p1 with control c at parameter t.
#[inline]
fn quad_at(p0: CurvePoint, c: CurvePoint, p1: CurvePoint, t: f32) -> CurvePoint {
    let u = 1.0 - t;
    CurvePoint {
        x: u * u * p0.x + 2.0 * u * t * c.x + t * t * p1.x,
        y: u * u * p0.y + 2.0 * u * t * c.y + t * t * p1.y,
    }
}

impl Surface for Canvas {
    fn width(&self) -> usize {
        self.image.width
    }

    fn height(&self) -> usize {
        self.image.height
    }

    fn stroke_segment(&mut self, segment: &LineSegment) {
        self.stamp_capsule(
            segment.from.into(),
            segment.to.into(),
            segment.width,
            segment.color,
        );
    }

    fn stroke_path(&mut self, path: &SmoothPath) {
        let mut pen = path.start;
        for curve in &path.curves {
            // Control polygon length bounds the curve length; step every ~2 px
            let hull = ((curve.control.x - pen.x).hypot(curve.control.y - pen.y)
                + (curve.end.x - curve.control.x).hypot(curve.end.y - curve.control.y))
            .max(1.0);
            let steps = (hull / 2.0).ceil() as usize;

            let mut prev = pen;
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                let next = quad_at(pen, curve.control, curve.end, t);
                self.stamp_capsule(prev, next, path.width, path.color);
                prev = next;
            }
            pen = curve.end;
        }
    }

    fn clear(&mut self) {
        self.image.clear();
    }

    fn snapshot(&self) -> RasterImage {
        self.image.clone()
    }

    fn restore(&mut self, image: &RasterImage) {
        if image.width == self.image.width && image.height == self.image.height {
            self.image.data.copy_from_slice(&image.data);
        } else {
            tracing::warn!(
                "restore ignored: {}x{} snapshot on {}x{} canvas",
                image.width,
                image.height,
                self.image.width,
                self.image.height
            );
        }
    }
}
