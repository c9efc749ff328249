use cli::{ConfigError, FieldConfig};
use image::{Rgba, RgbaImage};
use particle_field::{CropMode, DistanceRange, LineMode, SizeFilter};

fn tuned_config() -> FieldConfig {
    let mut config = FieldConfig { image: Some("input.png".into()), ..Default::default() };
    let settings = &mut config.settings;
    settings.seed = 42;
    settings.sampler.density = 3.0;
    settings.sampler.crop = CropMode::Circular { edge_percent: 20.0 };
    settings.sampler.edge_sampling.enabled = true;
    settings.lines.enabled = true;
    settings.lines.mode = LineMode::Color { color_threshold: 0.3, distance_multiplier: 1.5 };
    settings.lines.distance_ranges =
        vec![DistanceRange::new(0.0, 12.0), DistanceRange::new(30.0, 40.0)];
    settings.lines.max_connections = Some(4);
    settings.lines.size_filter = SizeFilter { min_percentile: Some(25.0), ..Default::default() };
    config
}

#[test]
fn toml_and_json_files_load_the_same_document() {
    let dir = tempfile::tempdir().unwrap();
    let config = tuned_config();

    let toml_path = dir.path().join("field.toml");
    let json_path = dir.path().join("field.json");
    config.to_file(&toml_path).unwrap();
    config.to_file(&json_path).unwrap();

    assert_eq!(FieldConfig::from_file(&toml_path).unwrap(), config);
    assert_eq!(FieldConfig::from_file(&json_path).unwrap(), config);
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("field.yaml");
    std::fs::write(&path, "seed: 1").unwrap();

    assert!(matches!(FieldConfig::from_file(&path), Err(ConfigError::UnsupportedFileFormat)));
    let written = FieldConfig::default().to_file(&path);
    assert!(matches!(written, Err(ConfigError::UnsupportedFileFormat)));
}

#[test]
fn malformed_documents_report_parse_errors() {
    assert!(matches!(FieldConfig::from_json("{\"seed\": \"x\"}"), Err(ConfigError::SerdeError(_))));
    assert!(matches!(FieldConfig::from_toml("seed = [1"), Err(ConfigError::TomlDeError(_))));
}

#[test]
fn schema_describes_settings() {
    let schema = serde_json::to_string(&FieldConfig::schema()).unwrap();
    assert!(schema.contains("sampler"));
    assert!(schema.contains("lines"));
    assert!(schema.contains("edge_sensitivity"));
}

#[test]
fn config_pipeline_processes_image_file() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("input.png");
    RgbaImage::from_fn(24, 16, |x, y| Rgba([(x * 10) as u8, (y * 15) as u8, 200, 255]))
        .save(&image_path)
        .unwrap();

    let mut config = tuned_config();
    config.image = Some(image_path.clone());
    // The soft gradient has no edges strong enough for an outline pass
    config.settings.sampler.edge_sampling.enabled = false;
    let pipeline = config.pipeline().unwrap();
    let output = pipeline.process_file(config.resolve_image(None).unwrap()).unwrap();

    assert_eq!((output.image_width, output.image_height), (24, 16));
    assert!(!output.particles.is_empty());
    assert!(output.lines.is_some());
}
