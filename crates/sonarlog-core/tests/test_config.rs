use std::path::PathBuf;

use sonarlog_core::error::SonarError;
use sonarlog_core::frame::Channel;
use sonarlog_core::pipeline::config::{AnonymizeConfig, OutputFormat, PipelineConfig};
use sonarlog_core::pipeline::PipelineStage;
use sonarlog_core::transform::{FrameFilter, GenerateParams};

#[test]
fn test_minimal_toml_uses_defaults() {
    let config: PipelineConfig = toml::from_str(r#"input = "track.sl2""#).unwrap();

    assert_eq!(config.input, PathBuf::from("track.sl2"));
    assert!(config.depth_adjust.is_none());
    assert!(config.generate.is_none());
    assert!(!config.flip_sidescan);
    assert_eq!(config.filter, FrameFilter::default());
    assert_eq!(config.filter.to, u32::MAX);
    assert!(config.output.formats.is_empty());
    assert_eq!(config.output.path_for(OutputFormat::Csv), PathBuf::from("./out.csv"));
}

#[test]
fn test_full_toml() {
    let text = r#"
        input = "a.sl3"
        depth_adjust = "b.sl3"
        depth_shift = "m1.15"
        flip_sidescan = true

        [generate]
        destination = 1
        sources = [2, 5]
        from_depth = true

        [filter]
        from = 100
        to = 200
        channels = [0, 9]

        [anonymize]
        seed = 11

        [output]
        formats = ["sl2", "csv"]
        directory = "out"
        stem = "trip"
    "#;
    let config: PipelineConfig = toml::from_str(text).unwrap();

    assert_eq!(config.depth_adjust, Some(PathBuf::from("b.sl3")));
    assert_eq!(config.depth_shift.as_deref(), Some("m1.15"));
    assert_eq!(
        config.generate,
        Some(GenerateParams {
            destination: Channel::Secondary,
            sources: vec![Channel::DownScan, Channel::SidescanComposite],
            force_overwrite: false,
            from_depth: true,
        })
    );
    assert_eq!(config.filter.channels, vec![Channel::Primary, Channel::ThreeD]);
    assert_eq!(config.anonymize, Some(AnonymizeConfig { seed: Some(11) }));
    assert_eq!(config.output.formats, vec![OutputFormat::Sl2, OutputFormat::Csv]);
    assert_eq!(
        config.output.path_for(OutputFormat::Sl2),
        PathBuf::from("out").join("trip.sl2")
    );
}

#[test]
fn test_config_survives_serialization() {
    let mut config = PipelineConfig::new(PathBuf::from("in.sl2"));
    config.depth_shift = Some("p0.4".into());
    config.generate = Some(GenerateParams::from_tokens(&["0", "2", "f"]).unwrap());
    config.filter.channels = vec![Channel::Other(14)];
    config.output.formats = vec![OutputFormat::Sl3];

    let text = toml::to_string_pretty(&config).unwrap();
    let back: PipelineConfig = toml::from_str(&text).unwrap();

    assert_eq!(back.depth_shift, config.depth_shift);
    assert_eq!(back.generate, config.generate);
    assert_eq!(back.filter, config.filter);
    assert_eq!(back.output, config.output);
}

#[test]
fn test_output_format_from_str() {
    assert_eq!("SL2".parse::<OutputFormat>().unwrap(), OutputFormat::Sl2);
    assert_eq!(" csv ".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
    assert!(matches!(
        "slg".parse::<OutputFormat>(),
        Err(SonarError::InvalidInput(_))
    ));
}

#[test]
fn test_stage_names() {
    assert_eq!(PipelineStage::Reading.to_string(), "Reading log");
    assert_eq!(PipelineStage::Writing.to_string(), "Writing output");
}
