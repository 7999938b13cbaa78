use serde::{Deserialize, Serialize};

/// Errors produced when building or slicing a [`Raster`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("unsupported channel count {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(usize),

    #[error("invalid raster buffer length (expected {expected} bytes, got {got})")]
    InvalidBufferLength { expected: usize, got: usize },

    #[error("crop {width}x{height}+{x}+{y} exceeds raster bounds {raster_width}x{raster_height}")]
    CropOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        raster_width: usize,
        raster_height: usize,
    },

    #[error("no opaque pixels bound a non-empty region in a {width}x{height} raster")]
    NoOpaqueRegion { width: usize, height: usize },
}

/// Sample layout of a raster pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channels {
    Gray,
    Rgb,
    Rgba,
}

impl Channels {
    #[inline]
    pub fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }

    pub fn from_count(count: usize) -> Result<Self, RasterError> {
        match count {
            1 => Ok(Channels::Gray),
            3 => Ok(Channels::Rgb),
            4 => Ok(Channels::Rgba),
            other => Err(RasterError::UnsupportedChannels(other)),
        }
    }

    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, Channels::Rgba)
    }
}

/// Owned 8-bit raster, row-major with interleaved channels.
///
/// Every algorithm in the workspace treats rasters as immutable input and
/// returns a new raster when it transforms one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    channels: Channels,
    data: Vec<u8>, // len = width * height * channels
}

impl Raster {
    pub fn new(
        width: usize,
        height: usize,
        channels: Channels,
        data: Vec<u8>,
    ) -> Result<Self, RasterError> {
        let expected = width * height * channels.count();
        if data.len() != expected {
            return Err(RasterError::InvalidBufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn gray(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RasterError> {
        Self::new(width, height, Channels::Gray, data)
    }

    pub fn rgb(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RasterError> {
        Self::new(width, height, Channels::Rgb, data)
    }

    pub fn rgba(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RasterError> {
        Self::new(width, height, Channels::Rgba, data)
    }

    /// Raster with every sample set to `fill`.
    pub fn blank(width: usize, height: usize, channels: Channels, fill: u8) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![fill; width * height * channels.count()],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Samples of the pixel at `(x, y)`. Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let c = self.channels.count();
        let idx = (y * self.width + x) * c;
        &self.data[idx..idx + c]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let c = self.channels.count();
        let idx = (y * self.width + x) * c;
        &mut self.data[idx..idx + c]
    }

    /// RGB triple at `(x, y)`; gray is replicated, alpha is ignored.
    #[inline]
    pub fn rgb_at(&self, x: usize, y: usize) -> [u8; 3] {
        let p = self.pixel(x, y);
        match self.channels {
            Channels::Gray => [p[0], p[0], p[0]],
            Channels::Rgb | Channels::Rgba => [p[0], p[1], p[2]],
        }
    }

    /// Alpha at `(x, y)`; rasters without an alpha channel are opaque.
    #[inline]
    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        match self.channels {
            Channels::Rgba => self.data[(y * self.width + x) * 4 + 3],
            Channels::Gray | Channels::Rgb => 255,
        }
    }

    /// Luma `0.299R + 0.587G + 0.114B` as a float.
    #[inline]
    pub fn luma_at(&self, x: usize, y: usize) -> f64 {
        let [r, g, b] = self.rgb_at(x, y);
        0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
    }

    /// Single-channel raster of truncated luma values.
    pub fn to_gray(&self) -> Raster {
        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                data.push(self.luma_at(x, y) as u8);
            }
        }
        Raster {
            width: self.width,
            height: self.height,
            channels: Channels::Gray,
            data,
        }
    }

    /// Three-channel copy. Gray samples are duplicated into R=G=B, alpha is dropped.
    pub fn to_rgb(&self) -> Raster {
        if self.channels == Channels::Rgb {
            return self.clone();
        }
        let mut data = Vec::with_capacity(self.width * self.height * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                data.extend_from_slice(&self.rgb_at(x, y));
            }
        }
        Raster {
            width: self.width,
            height: self.height,
            channels: Channels::Rgb,
            data,
        }
    }

    /// Copy of the `width x height` block whose top-left corner is `(x, y)`.
    pub fn crop(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<Raster, RasterError> {
        if x + width > self.width || y + height > self.height {
            return Err(RasterError::CropOutOfBounds {
                x,
                y,
                width,
                height,
                raster_width: self.width,
                raster_height: self.height,
            });
        }
        let c = self.channels.count();
        let mut data = Vec::with_capacity(width * height * c);
        for row in y..y + height {
            let start = (row * self.width + x) * c;
            data.extend_from_slice(&self.data[start..start + width * c]);
        }
        Ok(Raster {
            width,
            height,
            channels: self.channels,
            data,
        })
    }

    /// Resample to `width x height` with pixel-centre bilinear interpolation.
    pub fn resize_bilinear(&self, width: usize, height: usize) -> Raster {
        let mut out = Raster::blank(width, height, self.channels, 0);
        if self.is_empty() || width == 0 || height == 0 {
            return out;
        }
        if width == self.width && height == self.height {
            return self.clone();
        }

        let sx = self.width as f32 / width as f32;
        let sy = self.height as f32 / height as f32;
        let c = self.channels.count();
        for y in 0..height {
            let fy = (y as f32 + 0.5) * sy - 0.5;
            for x in 0..width {
                let fx = (x as f32 + 0.5) * sx - 0.5;
                let dst = out.pixel_mut(x, y);
                for (ch, sample) in dst.iter_mut().enumerate().take(c) {
                    *sample = sample_bilinear(self, fx, fy, ch).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        out
    }
}

#[inline]
fn get_clamped(src: &Raster, x: i64, y: i64, ch: usize) -> f32 {
    let x = x.clamp(0, src.width as i64 - 1) as usize;
    let y = y.clamp(0, src.height as i64 - 1) as usize;
    src.data[(y * src.width + x) * src.channels.count() + ch] as f32
}

/// Bilinear sample of channel `ch` at a sub-pixel position, clamping at the borders.
///
/// `src` must be non-empty.
#[inline]
pub fn sample_bilinear(src: &Raster, x: f32, y: f32, ch: usize) -> f32 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_clamped(src, x0, y0, ch);
    let p10 = get_clamped(src, x0 + 1, y0, ch);
    let p01 = get_clamped(src, x0, y0 + 1, ch);
    let p11 = get_clamped(src, x0 + 1, y0 + 1, ch);

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> Raster {
        let data = (0..width * height).map(|i| (i * 7 % 256) as u8).collect();
        Raster::gray(width, height, data).expect("gray ramp")
    }

    #[test]
    fn rejects_wrong_buffer_length() {
        let err = Raster::rgb(4, 4, vec![0; 47]).unwrap_err();
        assert_eq!(
            err,
            RasterError::InvalidBufferLength {
                expected: 48,
                got: 47
            }
        );
        assert_eq!(
            Channels::from_count(2),
            Err(RasterError::UnsupportedChannels(2))
        );
    }

    #[test]
    fn rgb_promotion_replicates_gray_and_drops_alpha() {
        let gray = Raster::gray(2, 1, vec![10, 200]).unwrap();
        assert_eq!(gray.to_rgb().as_raw(), &[10, 10, 10, 200, 200, 200]);

        let rgba = Raster::rgba(1, 1, vec![1, 2, 3, 0]).unwrap();
        assert_eq!(rgba.to_rgb().as_raw(), &[1, 2, 3]);
        assert_eq!(rgba.alpha_at(0, 0), 0);
        assert_eq!(gray.alpha_at(1, 0), 255);
    }

    #[test]
    fn luma_truncates() {
        let img = Raster::rgb(1, 1, vec![255, 0, 0]).unwrap();
        // 0.299 * 255 = 76.245
        assert_eq!(img.to_gray().as_raw(), &[76]);
    }

    #[test]
    fn crop_copies_block_and_checks_bounds() {
        let img = ramp(5, 4);
        let sub = img.crop(1, 2, 3, 2).unwrap();
        assert_eq!(sub.width(), 3);
        assert_eq!(sub.height(), 2);
        assert_eq!(sub.pixel(0, 0), img.pixel(1, 2));
        assert_eq!(sub.pixel(2, 1), img.pixel(3, 3));
        assert!(matches!(
            img.crop(3, 0, 3, 1),
            Err(RasterError::CropOutOfBounds { .. })
        ));
    }

    #[test]
    fn resize_keeps_constant_images_constant() {
        let img = Raster::blank(7, 3, Channels::Rgb, 42);
        let out = img.resize_bilinear(11, 5);
        assert_eq!(out.width(), 11);
        assert_eq!(out.height(), 5);
        assert!(out.as_raw().iter().all(|&v| v == 42));
    }

    #[test]
    fn resize_same_size_is_identity() {
        let img = ramp(6, 6);
        assert_eq!(img.resize_bilinear(6, 6), img);
    }

    #[test]
    fn bilinear_interpolates_between_neighbours() {
        let img = Raster::gray(2, 1, vec![0, 100]).unwrap();
        let v = sample_bilinear(&img, 0.25, 0.0, 0);
        assert!((v - 25.0).abs() < 1e-4);
        // clamped beyond the right border
        assert!((sample_bilinear(&img, 3.0, 0.0, 0) - 100.0).abs() < 1e-4);
    }
}
