// Window for the interactive pad.
// Visual effects provided here:
// 1) A window that shows the canvas (ink composited over white paper).
// 2) A small crosshair that follows your mouse.

use crate::error::{Error, Result};
use crate::types::{Point, RasterImage, Rgb};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

const PAPER: Rgb = Rgb::new(255, 255, 255);

pub struct Drawer {
    window: Window, // the on-screen window you see
    frame: Vec<u32>,
    width: usize,
    height: usize,
}

impl Drawer {
    /// Create a window sized to the canvas.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self {
            window,
            frame: vec![0u32; width * height],
            width,
            height,
        })
    }

    /// Push the canvas (plus cursor) to the screen.
    /// Visual: the window immediately shows the current ink.
    pub fn present(&mut self, canvas: &RasterImage, cursor: Option<Point>) -> Result<()> {
        if canvas.width != self.width || canvas.height != self.height {
            return Err(Error::InvalidInput(format!(
                "canvas is {}x{}, window is {}x{}",
                canvas.width, canvas.height, self.width, self.height
            )));
        }
        self.frame = canvas.to_rgb_words(PAPER);
        if let Some(p) = cursor {
            draw_crosshair(&mut self.frame, self.width, p.x, p.y, 6, 0x00_99_99_99);
        }
        self.window
            .update_with_buffer(&self.frame, self.width, self.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Mouse position in canvas pixels (clamped to the window).
    pub fn mouse_pos(&self) -> Option<Point> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| Point::new(x.floor() as i32, y.floor() as i32))
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// True once per key press (no auto-repeat).
    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }
}

/// Put a pixel on a 0x00RRGGBB frame if (x,y) is inside bounds.
#[inline]
fn put_pixel(frame: &mut [u32], width: usize, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= width || y * width + x >= frame.len() {
        return;
    }
    frame[y * width + x] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
fn draw_line(frame: &mut [u32], width: usize, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(frame, width, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Visual: a "+" with a small gap in the middle, so the ink under it stays visible.
fn draw_crosshair(frame: &mut [u32], width: usize, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(frame, width, cx - size, cy, cx - 2, cy, color);
    draw_line(frame, width, cx + 2, cy, cx + size, cy, color);
    draw_line(frame, width, cx, cy - size, cx, cy - 2, color);
    draw_line(frame, width, cx, cy + 2, cx, cy + size, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crosshair_leaves_center_clear_and_clips() {
        let mut frame = vec![0u32; 20 * 20];
        draw_crosshair(&mut frame, 20, 1, 10, 6, 7);
        assert_eq!(frame[10 * 20 + 1], 0);
        assert_eq!(frame[10 * 20 + 4], 7);
        assert_eq!(frame[4 * 20 + 1], 7);
        assert_eq!(frame[10 * 20], 0);
    }
}
