mod common;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sonarlog_core::error::SonarError;
use sonarlog_core::frame::{Channel, CoordinatePoint};
use sonarlog_core::transform::{
    anonymize, flip_sounded_data, parse_channels, parse_depth_shift, FrameFilter, TrackOffset,
};

use common::{frame_at, sounded_frame, track};

#[test]
fn test_flip_twice_restores_data() {
    let mut frames = vec![
        sounded_frame(Channel::SidescanComposite, 0, 0.0, 0.0, vec![1, 2, 3, 4, 5]),
        sounded_frame(Channel::SidescanComposite, 1, 0.0, 0.0, vec![9, 8]),
    ];
    let original = frames.clone();

    assert_eq!(flip_sounded_data(&mut frames, Channel::SidescanComposite), 2);
    assert_eq!(frames[0].sounded_data.as_bytes(), &[5, 4, 3, 2, 1]);
    flip_sounded_data(&mut frames, Channel::SidescanComposite);
    assert_eq!(frames, original);
}

#[test]
fn test_flip_leaves_other_channels_alone() {
    let mut frames = vec![
        sounded_frame(Channel::Primary, 0, 0.0, 0.0, vec![1, 2, 3]),
        sounded_frame(Channel::SidescanComposite, 0, 0.0, 0.0, vec![1, 2, 3]),
    ];
    flip_sounded_data(&mut frames, Channel::SidescanComposite);
    assert_eq!(frames[0].sounded_data.as_bytes(), &[1, 2, 3]);
    assert_eq!(frames[1].sounded_data.as_bytes(), &[3, 2, 1]);
    assert_eq!(frames[1].index, 0);
}

#[test]
fn test_filter_by_range_and_channel() {
    let frames = track(&[Channel::Primary, Channel::DownScan, Channel::SidescanComposite], 20);
    let filter = FrameFilter {
        from: 5,
        to: 9,
        channels: vec![Channel::Primary, Channel::SidescanComposite],
    };

    let kept = filter.apply(frames.clone());
    assert_eq!(kept.len(), 10);
    for f in &kept {
        assert!((5..=9).contains(&f.index));
        assert!(f.channel != Channel::DownScan);
    }
    let rejected = frames.iter().filter(|f| !filter.matches(f)).count();
    assert_eq!(rejected, frames.len() - kept.len());
}

#[test]
fn test_empty_channel_set_accepts_all_channels() {
    let frames = track(&[Channel::Primary, Channel::ThreeD], 4);
    let filter = FrameFilter {
        from: 0,
        to: 1,
        ..Default::default()
    };
    let kept = filter.apply(frames);
    assert_eq!(kept.len(), 4);
}

#[test]
fn test_default_filter_keeps_everything() {
    let frames = track(&[Channel::Primary], 3);
    assert_eq!(FrameFilter::default().apply(frames.clone()), frames);
}

#[test]
fn test_parse_channels() {
    assert_eq!(
        parse_channels(&["0", "2", "9", "2"]).unwrap(),
        vec![Channel::Primary, Channel::DownScan, Channel::ThreeD]
    );
    assert!(matches!(
        parse_channels(&["zero"]),
        Err(SonarError::InvalidInput(_))
    ));
}

#[test]
fn test_depth_shift_strings() {
    assert_relative_eq!(parse_depth_shift("m1.15").unwrap().meters(), -1.15);
    assert_relative_eq!(parse_depth_shift("p1.15").unwrap().meters(), 1.15);
    assert!(matches!(
        parse_depth_shift("x1.0"),
        Err(SonarError::InvalidInput(_))
    ));
}

#[test]
fn test_anonymize_preserves_track_shape() {
    let mut frames = vec![
        frame_at(Channel::Primary, 0, 55.751244, 37.618423, 1.0),
        frame_at(Channel::Primary, 1, 55.752011, 37.619874, 1.0),
        frame_at(Channel::Primary, 2, -33.868820, 151.209290, 1.0),
    ];
    let original = frames.clone();
    let mut rng = StdRng::seed_from_u64(42);

    let offset = anonymize(&mut frames, &mut rng);

    for (a, b) in [(0, 1), (0, 2), (1, 2)] {
        let before_lat = original[a].point.latitude.fract() - original[b].point.latitude.fract();
        let after_lat = frames[a].point.latitude - frames[b].point.latitude;
        let before_lon = original[a].point.longitude.fract() - original[b].point.longitude.fract();
        let after_lon = frames[a].point.longitude - frames[b].point.longitude;
        assert_relative_eq!(before_lat, after_lat, epsilon = 1e-9);
        assert_relative_eq!(before_lon, after_lon, epsilon = 1e-9);
    }
    assert_relative_eq!(
        frames[0].point.latitude,
        original[0].point.latitude.fract() + offset.latitude,
        epsilon = 1e-12
    );
}

#[test]
fn test_anonymize_offset_is_whole_degrees_in_range() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let offset = TrackOffset::random(&mut rng);
        assert!((-90.0..90.0).contains(&offset.latitude));
        assert!((-180.0..180.0).contains(&offset.longitude));
        assert_eq!(offset.latitude.fract(), 0.0);
        assert_eq!(offset.longitude.fract(), 0.0);
    }
}

#[test]
fn test_anonymize_is_reproducible_with_seed() {
    let frames = track(&[Channel::Primary], 5);
    let mut a = frames.clone();
    let mut b = frames;
    anonymize(&mut a, &mut StdRng::seed_from_u64(99));
    anonymize(&mut b, &mut StdRng::seed_from_u64(99));
    assert_eq!(a, b);
}

#[test]
fn test_track_offset_apply() {
    let offset = TrackOffset {
        latitude: 10.0,
        longitude: -20.0,
    };
    let moved = offset.apply(&CoordinatePoint::new(55.25, -37.5));
    assert_relative_eq!(moved.latitude, 10.25);
    assert_relative_eq!(moved.longitude, -20.5);
}
