use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use captcha_kit_core::{extract_alpha_region, Raster};

use crate::canny::{canny, CannyParams};
use crate::template::match_template;

/// Where the slider piece fits into the background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideMatchResult {
    /// Offset of the opaque piece inside the target image.
    pub target_x: u32,
    pub target_y: u32,
    /// `[x1, y1, x2, y2]` of the matched window in the background.
    pub target: [u32; 4],
}

/// Locate `target` in `background` by matching their Canny edge maps.
///
/// Unless `simple_target` is set, the target is first cropped to its opaque
/// region; when no such region exists the whole target is used with a zero
/// offset.
pub fn slide_match(target: &Raster, background: &Raster, simple_target: bool) -> SlideMatchResult {
    slide_match_with(target, background, simple_target, &CannyParams::default())
}

#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(target, background, params), fields(simple = simple_target))
)]
pub fn slide_match_with(
    target: &Raster,
    background: &Raster,
    simple_target: bool,
    params: &CannyParams,
) -> SlideMatchResult {
    let cropped;
    let (piece, offset_x, offset_y) = if simple_target {
        (target, 0, 0)
    } else {
        match extract_alpha_region(target) {
            Ok(region) => {
                cropped = region;
                (&cropped.raster, cropped.x, cropped.y)
            }
            Err(err) => {
                log::debug!("slide target crop failed ({err}), matching the whole image");
                (target, 0, 0)
            }
        }
    };

    let piece_edges = canny(piece, params).to_rgb();
    let bg_edges = canny(background, params).to_rgb();
    let found = match_template(&bg_edges, &piece_edges);

    let (x, y) = (found.location.x, found.location.y);
    SlideMatchResult {
        target_x: offset_x as u32,
        target_y: offset_y as u32,
        target: [
            x,
            y,
            x + piece.width() as u32,
            y + piece.height() as u32,
        ],
    }
}
