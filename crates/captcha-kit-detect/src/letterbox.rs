use captcha_kit_core::{Raster, Tensor};

use crate::DetectError;

/// Fill value for the padded area.
pub const LETTERBOX_PAD: f32 = 114.0;

/// Scale `raster` into the top-left corner of a square `input_size` canvas.
///
/// Returns a `[1, 3, S, S]` tensor of raw `0..=255` samples and the scale
/// ratio `min(S / h, S / w)` needed to map detections back.
pub fn letterbox(raster: &Raster, input_size: usize) -> Result<(Tensor, f64), DetectError> {
    if raster.is_empty() {
        return Err(DetectError::EmptyImage);
    }
    let (w, h) = (raster.width(), raster.height());
    let s = input_size as f64;
    let ratio = (s / h as f64).min(s / w as f64);
    let new_w = ((w as f64 * ratio) as usize).min(input_size);
    let new_h = ((h as f64 * ratio) as usize).min(input_size);
    let resized = raster.resize_bilinear(new_w, new_h);

    let plane = input_size * input_size;
    let mut data = vec![LETTERBOX_PAD; 3 * plane];
    for y in 0..new_h {
        for x in 0..new_w {
            let idx = y * input_size + x;
            for (ch, &v) in resized.rgb_at(x, y).iter().enumerate() {
                data[ch * plane + idx] = v as f32;
            }
        }
    }
    let tensor = Tensor::new(data, vec![1, 3, input_size, input_size])?;
    Ok((tensor, ratio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use captcha_kit_core::Channels;

    #[test]
    fn wide_image_is_padded_below() {
        let img = Raster::blank(100, 50, Channels::Rgb, 10);
        let (t, ratio) = letterbox(&img, 40).unwrap();
        assert_relative_eq!(ratio, 0.4);
        assert_eq!(t.shape(), &[1, 3, 40, 40]);

        let plane = 40 * 40;
        let d = t.data();
        // resized region is 40 x 20
        assert_eq!(d[19 * 40 + 39], 10.0);
        assert_eq!(d[20 * 40], LETTERBOX_PAD);
        assert_eq!(d[2 * plane + 39 * 40 + 39], LETTERBOX_PAD);
    }

    #[test]
    fn gray_input_fills_all_planes() {
        let img = Raster::blank(8, 8, Channels::Gray, 200);
        let (t, ratio) = letterbox(&img, 16).unwrap();
        assert_relative_eq!(ratio, 2.0);
        assert!(t.data().iter().all(|&v| v == 200.0));
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = Raster::blank(0, 0, Channels::Rgb, 0);
        assert_eq!(letterbox(&img, 16).unwrap_err(), DetectError::EmptyImage);
    }
}
