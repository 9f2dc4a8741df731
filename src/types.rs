// Core types shared by the stroke capture, the canvas and the filters.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A pointer position in device pixels, relative to the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance(self, other: Point) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// An opaque color. Written as `"#rrggbb"` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or("");
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::Config(format!("expected #rrggbb color, got {s:?}")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| Error::Config(format!("bad color {s:?}: {e}")))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A grid of RGBA pixels, row-major, 4 bytes per pixel.
/// Visual: this is exactly what the canvas shows and what gets exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: usize,  // pixels per row
    pub height: usize, // rows
    pub data: Vec<u8>, // length = width * height * 4, [r, g, b, a] per pixel
}

impl RasterImage {
    /// A fully transparent image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height * 4],
        }
    }

    /// Wrap an existing RGBA buffer, rejecting it if the length does not match.
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let image = Self {
            width,
            height,
            data,
        };
        image.validate()?;
        Ok(image)
    }

    /// Check the buffer holds whole RGBA pixels and matches the declared size.
    pub fn validate(&self) -> Result<()> {
        if self.data.len() % 4 != 0 {
            return Err(Error::InvalidInput(format!(
                "pixel buffer length {} is not a multiple of 4",
                self.data.len()
            )));
        }
        let expected = self
            .width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                Error::InvalidInput(format!("{}x{} image is too large", self.width, self.height))
            })?;
        if self.data.len() != expected {
            return Err(Error::InvalidInput(format!(
                "pixel buffer length {} does not match {}x{} (expected {expected})",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * 4
    }

    /// RGBA at (x,y), or None outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Overwrite the pixel at (x,y) if inside bounds.
    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Make every pixel transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Composite over an opaque background; the result is fully opaque.
    /// Visual: transparent areas become `background`, ink stays on top.
    pub fn flatten_onto(&self, background: Rgb) -> RasterImage {
        let data = self
            .data
            .chunks_exact(4)
            .flat_map(|px| {
                let [r, g, b] = over(px, background);
                [r, g, b, 255]
            })
            .collect();
        RasterImage {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Pack into 0x00RRGGBB words (what minifb wants), composited over `background`.
    pub fn to_rgb_words(&self, background: Rgb) -> Vec<u32> {
        self.data
            .chunks_exact(4)
            .map(|px| {
                let [r, g, b] = over(px, background);
                ((r as u32) << 16) | ((g as u32) << 8) | b as u32
            })
            .collect()
    }
}

/// Straight-alpha "source over" of one RGBA pixel onto an opaque color.
#[inline]
fn over(px: &[u8], bg: Rgb) -> [u8; 3] {
    let a = px[3] as u32;
    let mix = |c: u8, under: u8| ((c as u32 * a + under as u32 * (255 - a) + 127) / 255) as u8;
    [mix(px[0], bg.r), mix(px[1], bg.g), mix(px[2], bg.b)]
}
