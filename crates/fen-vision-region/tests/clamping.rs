use approx::assert_relative_eq;
use fen_vision_core::{
    ImageBufferError, ImageView, NullObserver, OwnedImage, PipelineEvent, Point2,
    RecordingObserver, Size,
};
use fen_vision_region::{BoardCandidate, LocateError, NoDetectionCause, RegionLocator, RegionParams};

fn default_locator() -> RegionLocator {
    RegionLocator::new(RegionParams::default())
}

#[test]
fn candidate_near_origin_is_clamped_not_rejected() {
    // Padding pushes this box past the top-left corner.
    let img = OwnedImage::blank(320, 240, 3);
    let candidates = [BoardCandidate::new(40.0, 40.0, 90.0, 80.0, Some(0.8))];

    let cropped = default_locator()
        .locate_and_crop(&img.view(), &candidates, &NullObserver)
        .expect("clamped crop");

    let r = cropped.region.rect_in_source;
    assert_relative_eq!(r.x, 0.0);
    assert_relative_eq!(r.y, 0.0);
    assert_relative_eq!(r.width, 99.0, epsilon = 1e-3);
    assert_relative_eq!(r.height, 99.0, epsilon = 1e-3);
    assert!(r.is_within(&Size::new(320.0, 240.0).bounds()));
    assert_eq!((cropped.image.width, cropped.image.height), (800, 800));
}

#[test]
fn tiny_region_after_clamp_is_no_detection() {
    let candidates = [BoardCandidate::new(0.5, 0.5, 1.0, 1.0, Some(0.99))];
    let obs = RecordingObserver::new();

    let err = default_locator()
        .locate(Size::new(640.0, 480.0), &candidates, &obs)
        .unwrap_err();

    let LocateError::NoDetection(NoDetectionCause::Degenerate { width, height }) = err else {
        panic!("expected a degenerate region, got {err:?}");
    };
    assert!(width <= 2.0 && height <= 2.0);
    assert!(matches!(
        obs.events().as_slice(),
        [PipelineEvent::RegionRejected { .. }]
    ));
}

#[test]
fn region_exactly_at_threshold_is_rejected() {
    let params = RegionParams {
        pad_frac: 0.0,
        ..RegionParams::default()
    };
    let err = RegionLocator::new(params)
        .locate(
            Size::new(100.0, 100.0),
            &[BoardCandidate::new(50.0, 50.0, 2.0, 2.0, Some(0.5))],
            &NullObserver,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LocateError::NoDetection(NoDetectionCause::Degenerate { .. })
    ));
}

#[test]
fn oversized_box_in_non_square_image_fills_short_axis() {
    let region = default_locator()
        .locate(
            Size::new(1280.0, 720.0),
            &[BoardCandidate::new(640.0, 360.0, 900.0, 700.0, Some(0.7))],
            &NullObserver,
        )
        .expect("region");

    let r = region.rect_in_source;
    assert!(r.is_within(&region.source_size.bounds()));
    assert_relative_eq!(r.height, 720.0);
    assert_relative_eq!(r.width, 990.0, epsilon = 1e-3);
    assert_relative_eq!(r.x, 145.0, epsilon = 1e-3);
}

#[test]
fn most_confident_candidate_wins() {
    let region = default_locator()
        .locate(
            Size::new(640.0, 480.0),
            &[
                BoardCandidate::new(100.0, 100.0, 80.0, 80.0, Some(0.3)),
                BoardCandidate::new(400.0, 240.0, 200.0, 200.0, Some(0.9)),
                BoardCandidate::new(500.0, 300.0, 50.0, 50.0, None),
            ],
            &NullObserver,
        )
        .expect("region");
    assert_eq!(region.candidate_index, 1);
    assert_relative_eq!(region.rect_in_source.center().x, 400.0, epsilon = 1e-3);
}

#[test]
fn crop_and_source_mappings_invert_each_other() {
    let region = default_locator()
        .locate(
            Size::new(1000.0, 800.0),
            &[BoardCandidate::new(500.0, 400.0, 400.0, 380.0, Some(0.9))],
            &NullObserver,
        )
        .expect("region");

    for p in [
        Point2::new(0.0_f32, 0.0),
        Point2::new(400.0, 400.0),
        Point2::new(799.0, 13.0),
    ] {
        let back = region.source_to_crop(region.crop_to_source(p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-2);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-2);
    }

    let corner = region.crop_to_source(Point2::new(800.0, 800.0));
    assert_relative_eq!(corner.x, region.rect_in_source.max_x(), epsilon = 1e-3);
    assert_relative_eq!(corner.y, region.rect_in_source.max_y(), epsilon = 1e-3);
}

#[test]
fn short_buffer_is_rejected_before_cropping() {
    let view = ImageView {
        width: 100,
        height: 100,
        channels: 3,
        data: &[0; 10],
    };
    let obs = RecordingObserver::new();

    let err = default_locator()
        .locate_and_crop(
            &view,
            &[BoardCandidate::new(50.0, 50.0, 60.0, 60.0, Some(0.9))],
            &obs,
        )
        .unwrap_err();

    assert_eq!(
        err,
        LocateError::InvalidImage(ImageBufferError::LengthMismatch {
            expected: 30_000,
            got: 10
        })
    );
    assert!(obs.events().is_empty());
}

#[test]
fn zero_output_size_is_rejected() {
    let params = RegionParams {
        output_size: 0,
        ..RegionParams::default()
    };
    let img = OwnedImage::blank(320, 240, 3);
    let obs = RecordingObserver::new();

    let err = RegionLocator::new(params)
        .locate_and_crop(
            &img.view(),
            &[BoardCandidate::new(160.0, 120.0, 150.0, 150.0, Some(0.9))],
            &obs,
        )
        .unwrap_err();

    assert_eq!(err, LocateError::EmptyOutput);
    assert!(matches!(
        obs.events().as_slice(),
        [PipelineEvent::RegionRejected { .. }]
    ));
}
