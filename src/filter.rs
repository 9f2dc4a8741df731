// Per-pixel filters for an exported signature.
// Visual outcomes:
// - desaturate: grey image.
// - multiply: darker mid-tones (the image multiplied by itself).
// - brightness: everything lighter, saturating at white.
// - extract: light pixels knocked out to transparent, the rest recolored as ink.
//
// Every filter takes the image by value and hands it back, so a chain reads
// in the order it runs. The buffer is validated before the first write.

use crate::error::Result;
use crate::types::{RasterImage, Rgb};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_BRIGHTNESS: f32 = 1.25;
pub const DEFAULT_THRESHOLD: i32 = 200;
pub const DEFAULT_FILL: Rgb = Rgb::new(0, 67, 124);

/// Round a float channel into 0..=255, halves to even like a clamped byte array.
#[inline]
fn to_channel(v: f32) -> u8 {
    v.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Grey = 0.21 R + 0.71 G + 0.07 B on every pixel; alpha forced to 255.
pub fn desaturate(mut image: RasterImage) -> Result<RasterImage> {
    image.validate()?;
    for px in image.data.chunks_exact_mut(4) {
        let gray = to_channel(0.21 * px[0] as f32 + 0.71 * px[1] as f32 + 0.07 * px[2] as f32);
        px[0] = gray;
        px[1] = gray;
        px[2] = gray;
        px[3] = 255;
    }
    Ok(image)
}

/// Each channel becomes c*c/255; alpha forced to 255.
pub fn multiply(mut image: RasterImage) -> Result<RasterImage> {
    image.validate()?;
    for px in image.data.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            let v = *c as u32;
            // c*c/255 is never exactly .5, so +127 rounds to nearest
            *c = ((v * v + 127) / 255) as u8;
        }
        px[3] = 255;
    }
    Ok(image)
}

/// Scale RGB by `factor` (default 1.25), saturating at 255; alpha forced to 255.
/// `Some(0.0)` is honoured and blacks the image out.
pub fn brightness(mut image: RasterImage, factor: Option<f32>) -> Result<RasterImage> {
    image.validate()?;
    let factor = factor.unwrap_or(DEFAULT_BRIGHTNESS);
    for px in image.data.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = to_channel(*c as f32 * factor);
        }
        px[3] = 255;
    }
    Ok(image)
}

/// Knock out pixels whose red channel is above `threshold` (default 200) by
/// zeroing their alpha; paint every other pixel `fill` (default #00437c) at
/// full opacity. Expects a grey input, so red stands in for all channels.
pub fn extract(
    mut image: RasterImage,
    threshold: Option<i32>,
    fill: Option<Rgb>,
) -> Result<RasterImage> {
    image.validate()?;
    let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);
    let fill = fill.unwrap_or(DEFAULT_FILL);
    for px in image.data.chunks_exact_mut(4) {
        if px[0] as i32 > threshold {
            px[3] = 0;
        } else {
            px[0] = fill.r;
            px[1] = fill.g;
            px[2] = fill.b;
            px[3] = 255;
        }
    }
    Ok(image)
}

/// One pipeline stage. In TOML: `{ kind = "extract", threshold = 180 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    Desaturate,
    Multiply,
    Brightness {
        #[serde(default)]
        factor: Option<f32>,
    },
    Extract {
        #[serde(default)]
        threshold: Option<i32>,
        #[serde(default)]
        fill: Option<Rgb>,
    },
}

impl Filter {
    pub fn apply(&self, image: RasterImage) -> Result<RasterImage> {
        match self {
            Filter::Desaturate => desaturate(image),
            Filter::Multiply => multiply(image),
            Filter::Brightness { factor } => brightness(image, *factor),
            Filter::Extract { threshold, fill } => extract(image, *threshold, *fill),
        }
    }
}

/// Ordered list of filters; order is the caller's and matters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPipeline {
    stages: Vec<Filter>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, filter: Filter) -> Self {
        self.stages.push(filter);
        self
    }

    pub fn stages(&self) -> &[Filter] {
        &self.stages
    }

    /// Desaturate, then extract with the defaults: a clean ink-on-transparent signature.
    pub fn signature() -> Self {
        Self::new().then(Filter::Desaturate).then(Filter::Extract {
            threshold: None,
            fill: None,
        })
    }

    /// Run every stage in order. Rejects a malformed image before any stage runs.
    pub fn apply(&self, image: RasterImage) -> Result<RasterImage> {
        image.validate()?;
        self.stages.iter().try_fold(image, |image, stage| {
            debug!(?stage, "applying filter");
            stage.apply(image)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn img(px: &[[u8; 4]]) -> RasterImage {
        RasterImage::from_rgba(px.len(), 1, px.concat()).unwrap()
    }

    fn pixels(image: &RasterImage) -> Vec<[u8; 4]> {
        image
            .data
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
            .collect()
    }

    #[test]
    fn desaturate_uses_fixed_weights() {
        let out = desaturate(img(&[[100, 150, 200, 255], [10, 10, 10, 255]])).unwrap();
        let px = pixels(&out);
        // 0.21*100 + 0.71*150 + 0.07*200 = 141.5
        assert!((141..=142).contains(&px[0][0]), "got {:?}", px[0]);
        assert_eq!(px[0][0], px[0][1]);
        assert_eq!(px[0][1], px[0][2]);
        assert_eq!(px[0][3], 255);
        assert_eq!(px[1], [10, 10, 10, 255]);
    }

    #[test]
    fn desaturate_forces_opacity() {
        let out = desaturate(img(&[[0, 0, 0, 0]])).unwrap();
        assert_eq!(pixels(&out), vec![[0, 0, 0, 255]]);
    }

    #[test]
    fn desaturate_twice_is_stable_up_to_weight_loss() {
        // The weights sum to 0.99, so a second pass can shave at most 1% off.
        let source: Vec<[u8; 4]> = (0..=255u8)
            .step_by(5)
            .map(|v| [v, 255 - v, v / 2, 255])
            .collect();
        let once = desaturate(img(&source)).unwrap();
        let twice = desaturate(once.clone()).unwrap();
        for (a, b) in once.data.iter().zip(&twice.data) {
            assert!(a.abs_diff(*b) <= 3, "{a} vs {b}");
        }

        let dark = desaturate(img(&[[40, 40, 40, 255], [7, 7, 7, 255]])).unwrap();
        assert_eq!(desaturate(dark.clone()).unwrap(), dark);
    }

    #[test]
    fn multiply_squares_channels() {
        let out = multiply(img(&[[255, 128, 0, 10]])).unwrap();
        assert_eq!(pixels(&out), vec![[255, 64, 0, 255]]);
    }

    #[test]
    fn brightness_saturates() {
        let out = brightness(img(&[[200, 200, 200, 255]]), Some(2.0)).unwrap();
        assert_eq!(pixels(&out), vec![[255, 255, 255, 255]]);
    }

    #[test]
    fn brightness_defaults_only_when_absent() {
        let out = brightness(img(&[[100, 40, 0, 0]]), None).unwrap();
        assert_eq!(pixels(&out), vec![[125, 50, 0, 255]]);

        let out = brightness(img(&[[100, 40, 9, 255]]), Some(0.0)).unwrap();
        assert_eq!(pixels(&out), vec![[0, 0, 0, 255]]);
    }

    #[test]
    fn halves_round_to_even() {
        let out = brightness(img(&[[1, 3, 5, 255]]), Some(0.5)).unwrap();
        assert_eq!(pixels(&out), vec![[0, 2, 2, 255]]);
    }

    #[test]
    fn extract_default_threshold_and_fill() {
        let out = extract(img(&[[201, 201, 201, 255], [200, 200, 200, 255]]), None, None).unwrap();
        assert_eq!(pixels(&out), vec![[201, 201, 201, 0], [0, 67, 124, 255]]);
    }

    #[test]
    fn extract_threshold_extremes() {
        let grey = desaturate(img(&[
            [255, 255, 255, 255],
            [0, 0, 0, 255],
            [90, 90, 90, 255],
        ]))
        .unwrap();

        // nothing exceeds 255: every pixel is filled
        let fill = Rgb::new(1, 2, 3);
        let all = extract(grey.clone(), Some(255), Some(fill)).unwrap();
        assert!(pixels(&all).iter().all(|p| *p == [1, 2, 3, 255]));

        // everything exceeds -1: every pixel is knocked out
        let none = extract(grey, Some(-1), None).unwrap();
        assert!(pixels(&none).iter().all(|p| p[3] == 0));
    }

    #[test]
    fn extract_honours_zero_values() {
        // threshold 0 and a black fill are real values, not "use the default"
        let black = Some(Rgb::new(0, 0, 0));
        let out = extract(img(&[[0, 0, 0, 255], [1, 1, 1, 255]]), Some(0), black).unwrap();
        assert_eq!(pixels(&out), vec![[0, 0, 0, 255], [1, 1, 1, 0]]);
    }

    #[test]
    fn filters_reject_malformed_buffers() {
        let bad = RasterImage {
            width: 1,
            height: 2,
            data: vec![0; 7],
        };
        assert!(matches!(desaturate(bad.clone()), Err(Error::InvalidInput(_))));
        assert!(matches!(multiply(bad.clone()), Err(Error::InvalidInput(_))));
        assert!(matches!(brightness(bad.clone(), None), Err(Error::InvalidInput(_))));
        assert!(matches!(extract(bad.clone(), None, None), Err(Error::InvalidInput(_))));

        let mismatched = RasterImage {
            width: 3,
            height: 3,
            data: vec![0; 8],
        };
        assert!(FilterPipeline::new().apply(mismatched).is_err());
    }

    #[test]
    fn signature_pipeline_keeps_ink_and_drops_paper() {
        let paper = [255, 255, 255, 255];
        let ink = [13, 61, 120, 255];
        let out = FilterPipeline::signature().apply(img(&[paper, ink])).unwrap();
        let px = pixels(&out);
        assert_eq!(px[0][3], 0);
        assert_eq!(px[1], [0, 67, 124, 255]);
    }

    #[test]
    fn stage_order_matters() {
        let source = img(&[[250, 10, 10, 255]]);
        // red 250 is above the threshold before desaturation, far below after it
        let extract_first = FilterPipeline::new()
            .then(Filter::Extract {
                threshold: None,
                fill: None,
            })
            .then(Filter::Desaturate)
            .apply(source.clone())
            .unwrap();
        let desaturate_first = FilterPipeline::signature().apply(source).unwrap();
        assert_ne!(extract_first, desaturate_first);
        assert_eq!(pixels(&desaturate_first), vec![[0, 67, 124, 255]]);
    }
}
