//! Signature pad: freehand stroke capture with variable width and curve
//! smoothing, plus per-pixel filters for the exported raster.
//!
//! ```
//! use signing_pad::{Canvas, FilterPipeline, Point, StrokeCapture, StrokeStyle};
//!
//! let canvas = Canvas::new(200, 80)?;
//! let mut pad = StrokeCapture::new(canvas, StrokeStyle::default());
//! pad.start(Point::new(10, 40));
//! pad.move_to(Point::new(60, 30));
//! pad.move_to(Point::new(120, 50));
//! let session = pad.stop();
//! assert_eq!(session.len(), 3);
//!
//! let ink_only = FilterPipeline::signature().apply(pad.current_image())?;
//! assert_eq!(ink_only.width, 200);
//! # Ok::<(), signing_pad::Error>(())
//! ```

pub mod config;
#[cfg(feature = "viewer")]
pub mod draw;
pub mod error;
pub mod export;
pub mod filter;
pub mod logging;
pub mod raster;
pub mod stroke;
pub mod types;

pub use config::PadConfig;
pub use error::{Error, Result};
pub use filter::{Filter, FilterPipeline};
pub use raster::Canvas;
pub use stroke::{
    LineSegment, SmoothPath, StrokeCapture, StrokeSession, StrokeStyle, Surface, ThicknessProfile,
    ToleranceStep,
};
pub use types::{Point, RasterImage, Rgb};
