use captcha_kit::{BoundingBox, Channels, DetectParams, Detector, Raster, Tensor};

#[test]
fn hot_anchor_maps_back_to_source_pixels() {
    let params = DetectParams {
        input_size: 64,
        ..DetectParams::default()
    };
    let session = |input: &Tensor| -> Result<Option<Tensor>, std::io::Error> {
        assert_eq!(input.shape(), &[1, 3, 64, 64]);
        // 8x8 + 4x4 + 2x2 anchors, one class
        let mut out = vec![0.0f32; 84 * 6];
        let i = 64 + 4 + 2;
        out[i * 6..i * 6 + 6].copy_from_slice(&[0.5, 0.5, 0.0, 0.0, 0.9, 0.8]);
        Ok(Some(Tensor::new(out, vec![1, 84, 6]).expect("output")))
    };
    let det = Detector::with_params(session, params);

    // 128 x 64 letterboxes with ratio 0.5
    let img = Raster::blank(128, 64, Channels::Rgb, 30);
    let boxes = det.detect(&img).expect("detect");
    assert_eq!(boxes, vec![BoundingBox::new(64, 32, 96, 64)]);
    assert_eq!(boxes[0].to_array(), [64, 32, 96, 64]);
}

#[test]
fn output_that_does_not_split_into_anchors_is_fatal() {
    let session = |_: &Tensor| -> Result<Option<Tensor>, std::io::Error> {
        Ok(Some(Tensor::new(vec![0.0; 7], vec![7]).expect("output")))
    };
    let det = Detector::new(session);
    let img = Raster::blank(20, 20, Channels::Gray, 0);
    let err = det.detect(&img).unwrap_err();
    assert!(matches!(err, captcha_kit::KitError::Detect(_)));
}
