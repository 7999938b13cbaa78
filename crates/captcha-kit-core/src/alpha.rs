use crate::raster::{Raster, RasterError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A sub-raster cut out of a larger one, with its original top-left offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaRegion {
    pub raster: Raster,
    pub x: usize,
    pub y: usize,
}

/// Cut the region spanned by non-transparent pixels out of `raster`.
///
/// The bounding box is computed over pixels with alpha > 0 and the crop covers
/// the half-open range `[start, end)` on each axis, so the last opaque row and
/// column are not included. Fails when that range is empty on either axis.
/// Rasters without alpha are treated as fully opaque.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(raster), fields(w = raster.width(), h = raster.height()))
)]
pub fn extract_alpha_region(raster: &Raster) -> Result<AlphaRegion, RasterError> {
    let (w, h) = (raster.width(), raster.height());
    let (mut start_x, mut start_y) = (w, h);
    let (mut end_x, mut end_y) = (0usize, 0usize);

    for x in 0..w {
        for y in 0..h {
            if raster.alpha_at(x, y) > 0 {
                start_x = start_x.min(x);
                start_y = start_y.min(y);
                end_x = end_x.max(x);
                end_y = end_y.max(y);
            }
        }
    }

    if start_x >= end_x || start_y >= end_y {
        return Err(RasterError::NoOpaqueRegion {
            width: w,
            height: h,
        });
    }

    let cropped = raster.crop(start_x, start_y, end_x - start_x, end_y - start_y)?;
    Ok(AlphaRegion {
        raster: cropped,
        x: start_x,
        y: start_y,
    })
}
