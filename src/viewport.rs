/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use crate::render_loop::LoopError;

pub const MAX_PIXEL_RATIO: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn surface_ratio(&self) -> f32 {
        if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }

    /// Limits each side to `max` pixels, keeping at least one.
    #[must_use]
    pub fn clamped(self, max: u32) -> Self {
        let max = max.max(1);
        Self {
            width: self.width.clamp(1, max),
            height: self.height.clamp(1, max),
        }
    }
}

/// Drawable area of the output surface, in physical pixels.
///
/// Only built through [`Viewport::new`], so width and height are always
/// strictly positive and the pixel ratio is finite, positive and capped at
/// [`MAX_PIXEL_RATIO`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: i64, height: i64, pixel_ratio: f64) -> Result<Self, LoopError> {
        let invalid = || LoopError::InvalidViewport {
            width,
            height,
            pixel_ratio,
        };
        let width = u32::try_from(width).map_err(|_| invalid())?;
        let height = u32::try_from(height).map_err(|_| invalid())?;
        if width == 0 || height == 0 || !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
            return Err(invalid());
        }
        Ok(Self {
            width,
            height,
            pixel_ratio: pixel_ratio.min(MAX_PIXEL_RATIO),
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.dimensions().surface_ratio()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            pixel_ratio: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        let viewport = Viewport::new(1920, 1080, 3.0).unwrap();
        assert!((viewport.pixel_ratio() - MAX_PIXEL_RATIO).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_degenerate_sizes() {
        assert!(Viewport::new(0, 600, 1.0).is_err());
        assert!(Viewport::new(800, -1, 1.0).is_err());
        assert!(Viewport::new(800, 600, 0.0).is_err());
        assert!(Viewport::new(800, 600, f64::NAN).is_err());
        assert!(Viewport::new(i64::from(u32::MAX) + 1, 600, 1.0).is_err());
    }

    #[test]
    fn aspect_follows_dimensions() {
        let viewport = Viewport::new(1024, 768, 2.0).unwrap();
        assert_eq!(viewport.aspect(), 1024.0 / 768.0);
        assert_eq!(
            viewport.dimensions(),
            Dimensions {
                width: 1024,
                height: 768
            }
        );
    }

    #[test]
    fn oversized_dimensions_are_clamped_to_device_limit() {
        let viewport = Viewport::new(20_000, 600, 1.0).unwrap();
        assert_eq!(
            viewport.dimensions().clamped(8192),
            Dimensions {
                width: 8192,
                height: 600
            }
        );
        let fits = Dimensions {
            width: 800,
            height: 600,
        };
        assert_eq!(fits.clamped(8192), fits);
    }
}
