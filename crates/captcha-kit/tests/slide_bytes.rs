use std::io::Cursor;

use captcha_kit::{decode_raster, slide_comparison_bytes, slide_match_bytes, Channels, KitError};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};

fn png(img: DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

fn in_square(x: u32, y: u32, x0: u32, y0: u32, size: u32) -> bool {
    (x0..x0 + size).contains(&x) && (y0..y0 + size).contains(&y)
}

fn background() -> RgbImage {
    RgbImage::from_fn(80, 40, |x, y| {
        if in_square(x, y, 50, 14, 12) {
            Rgb([240, 240, 240])
        } else {
            Rgb([20, 20, 20])
        }
    })
}

#[test]
fn transparent_piece_is_located_in_background() {
    let bg = background();
    // opaque 20 x 20 copy of the background around the square, offset by (5, 8)
    let piece = RgbaImage::from_fn(30, 40, |x, y| {
        if in_square(x, y, 5, 8, 20) {
            let Rgb([r, g, b]) = *bg.get_pixel(x - 5 + 46, y - 8 + 10);
            Rgba([r, g, b, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    let res = slide_match_bytes(
        &png(DynamicImage::ImageRgba8(piece)),
        &png(DynamicImage::ImageRgb8(bg)),
        false,
    )
    .expect("slide match");
    assert_eq!((res.target_x, res.target_y), (5, 8));
    assert_eq!(res.target, [46, 10, 65, 29]);

    let json = serde_json::to_value(res).unwrap();
    assert_eq!(json["target"][0], 46);
}

#[test]
fn undecodable_target_is_an_error() {
    let bg = png(DynamicImage::ImageRgb8(background()));
    let err = slide_match_bytes(b"definitely not a png", &bg, false).unwrap_err();
    assert!(matches!(err, KitError::Decode { role: "target", .. }));

    let err = slide_match_bytes(&bg, b"\x89PNG broken", true).unwrap_err();
    assert!(matches!(err, KitError::Decode { role: "background", .. }));
}

#[test]
fn comparison_finds_block_column() {
    let plain = RgbImage::from_pixel(60, 30, Rgb([40, 40, 40]));
    let with_block = RgbImage::from_fn(60, 30, |x, y| {
        if in_square(x, y, 20, 12, 10) {
            Rgb([255, 255, 255])
        } else {
            Rgb([40, 40, 40])
        }
    });
    let res = slide_comparison_bytes(
        &png(DynamicImage::ImageRgb8(with_block)),
        &png(DynamicImage::ImageRgb8(plain)),
    )
    .expect("slide comparison");
    assert_eq!(res.target, [22, 12]);
}

#[test]
fn decoded_layout_follows_source_color_type() {
    let gray = png(DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 3, Luma([7]))));
    let raster = decode_raster(&gray).unwrap();
    assert_eq!(raster.channels(), Channels::Gray);
    assert_eq!((raster.width(), raster.height()), (4, 3));

    let rgba = png(DynamicImage::ImageRgba8(RgbaImage::new(2, 2)));
    assert_eq!(decode_raster(&rgba).unwrap().channels(), Channels::Rgba);
}
