use std::collections::HashSet;

use image::{Rgba, RgbaImage};
use particle_field::{
    ColorFilterSettings, DepthMode, DistanceRange, EdgeSamplingSettings, HueRange, LineMode,
    LineSettings, ParticleField, Pipeline, SamplerSettings, build_lines, build_lines_with_rng,
    lines::delaunay::{Point2D, triangulate},
    sample, sample_with_rng,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use strum::IntoEnumIterator;

fn photo(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = if (x / 8 + y / 8) % 2 == 0 { 220 } else { 30 };
        Rgba([r, g, b, 255])
    })
}

fn field_at(positions: &[[f32; 3]]) -> ParticleField {
    let particles: Vec<_> = positions.iter().map(|&p| (p, [1.0, 1.0, 1.0], 1.0)).collect();
    ParticleField::from_particles(&particles)
}

fn scattered(n: usize, seed: u64) -> ParticleField {
    let mut rng = StdRng::seed_from_u64(seed);
    let positions: Vec<[f32; 3]> = (0..n)
        .map(|_| [rng.gen_range(-60.0..60.0), rng.gen_range(-60.0..60.0), rng.gen_range(0.0..20.0)])
        .collect();
    field_at(&positions)
}

fn all_modes() -> Vec<LineMode> {
    vec![
        LineMode::Distance,
        LineMode::Color { color_threshold: 0.5, distance_multiplier: 1.5 },
        LineMode::Knn { k: 4 },
        LineMode::Delaunay,
    ]
}

#[test]
fn white_square_yields_one_particle_per_pixel() {
    let image = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let settings = SamplerSettings { density: 1.0, threshold: 0.0, ..Default::default() };
    let field = sample(&image, &settings).unwrap();

    assert_eq!(field.count, 16);
    for i in 0..field.count {
        assert_eq!(field.position(i)[2], 100.0);
        assert_eq!(field.color(i), [1.0, 1.0, 1.0]);
    }
}

#[test]
fn particle_count_never_exceeds_limit() {
    let image = photo(120, 90);
    for max_particles in [1, 17, 250, 10_000] {
        for edges in [false, true] {
            let settings = SamplerSettings {
                density: 1.0,
                max_particles,
                edge_sampling: EdgeSamplingSettings { enabled: edges, ..Default::default() },
                ..Default::default()
            };
            let field = sample(&image, &settings).unwrap();
            assert!(field.count <= max_particles);
            assert_eq!(field.positions.len(), field.count * 3);
            assert_eq!(field.colors.len(), field.count * 3);
            assert_eq!(field.sizes.len(), field.count);
        }
    }
}

#[test]
fn uniform_sizes_stay_in_unit_range() {
    let field = sample(&photo(64, 48), &SamplerSettings::default()).unwrap();
    assert!(field.sizes.iter().all(|s| (0.0..=1.0).contains(s)));

    let edged = SamplerSettings {
        edge_sampling: EdgeSamplingSettings { enabled: true, ..Default::default() },
        ..Default::default()
    };
    let field = sample(&photo(64, 48), &edged).unwrap();
    assert!(field.sizes.iter().all(|&s| s >= 0.0));
}

#[test]
fn invert_negates_every_depth() {
    let image = photo(48, 32);
    for mode in DepthMode::iter() {
        let mode = match mode {
            DepthMode::Fbm { .. } => DepthMode::Fbm { octaves: 4, noise_strength: 40.0 },
            DepthMode::Stereo { .. } => DepthMode::Stereo { separation: 12.0 },
            other => other,
        };
        let mut settings = SamplerSettings {
            edge_sampling: EdgeSamplingSettings {
                enabled: true,
                fill_density: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        settings.depth.mode = mode;

        let plain = sample_with_rng(&image, &settings, &mut StdRng::seed_from_u64(3)).unwrap();
        settings.depth.invert = true;
        let inverted = sample_with_rng(&image, &settings, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(plain.count, inverted.count, "{mode}");
        for i in 0..plain.count {
            let (a, b) = (plain.position(i), inverted.position(i));
            assert_eq!(a[2], -b[2], "{mode} particle {i}");
            assert_eq!(a[0], b[0], "{mode} particle {i}");
        }
    }
}

#[test]
fn hue_filter_excludes_red_keeps_cyan() {
    let image = RgbaImage::from_fn(4, 2, |x, _| {
        if x < 2 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 255, 255, 255]) }
    });
    let settings = SamplerSettings {
        density: 1.0,
        color_filter: ColorFilterSettings {
            enabled: true,
            filters: vec![HueRange::new(0.0, 60.0)],
            ..Default::default()
        },
        ..Default::default()
    };
    let field = sample(&image, &settings).unwrap();

    assert_eq!(field.count, 4);
    assert!((0..field.count).all(|i| field.color(i) == [0.0, 1.0, 1.0]));
}

#[test]
fn distance_mode_connects_only_close_pair() {
    let field = field_at(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [100.0, 0.0, 0.0]]);
    let settings = LineSettings {
        enabled: true,
        mode: LineMode::Distance,
        distance_ranges: vec![DistanceRange::new(0.0, 20.0)],
        ..Default::default()
    };
    let graph = build_lines(&field, &settings).unwrap();

    assert_eq!(graph.count, 1);
    assert!(graph.connects(0, 1));
    assert_eq!(graph.positions.len(), 6);
}

#[test]
fn knn_collinear_has_no_duplicate_pairs() {
    let field = field_at(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [20.0, 0.0, 0.0], [30.0, 0.0, 0.0]]);
    let settings =
        LineSettings { enabled: true, mode: LineMode::Knn { k: 1 }, ..Default::default() };

    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let graph = build_lines_with_rng(&field, &settings, &mut rng).unwrap();
        let keys: HashSet<_> = graph.pairs.iter().map(|&[a, b]| (a.min(b), a.max(b))).collect();
        assert_eq!(keys.len(), graph.count, "seed {seed}");
    }
}

#[test]
fn delaunay_lines_come_from_real_triangles() {
    let field = scattered(80, 11);
    let points: Vec<Point2D> = (0..field.count)
        .map(|i| {
            let [x, y, _] = field.position(i);
            Point2D::new(x as f64, y as f64, i)
        })
        .collect();
    let triangles = triangulate(&points);
    assert!(triangles.iter().all(|t| t.vertices.iter().all(|&v| v < points.len())));
    let edges: HashSet<(usize, usize)> = triangles
        .iter()
        .flat_map(|t| t.edges())
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect();

    let settings = LineSettings {
        enabled: true,
        mode: LineMode::Delaunay,
        distance_ranges: vec![DistanceRange::new(0.0, 40.0)],
        ..Default::default()
    };
    let graph = build_lines(&field, &settings).unwrap();
    assert!(!graph.is_empty());
    for &[a, b] in &graph.pairs {
        assert!(edges.contains(&(a.min(b), a.max(b))));
    }
}

#[test]
fn every_mode_respects_line_budget_and_degree_cap() {
    let field = scattered(150, 5);
    for mode in all_modes() {
        for max_lines in [0, 1, 25, 400] {
            let settings = LineSettings {
                enabled: true,
                mode,
                distance_ranges: vec![DistanceRange::new(0.0, 30.0)],
                max_lines,
                max_connections: Some(3),
                ..Default::default()
            };
            let graph = build_lines(&field, &settings).unwrap();
            assert!(graph.count <= max_lines, "{mode}: {} > {max_lines}", graph.count);
            assert_eq!(graph.positions.len(), graph.count * 6);
            assert_eq!(graph.colors.len(), graph.count * 6);

            for i in 0..field.count {
                let degree = graph.pairs.iter().filter(|p| p.contains(&i)).count();
                assert!(degree <= 3, "{mode}: particle {i} has {degree} lines");
            }
        }
    }
}

#[test]
fn line_colors_never_exceed_endpoint_colors() {
    let field = scattered(60, 8);
    for mode in all_modes() {
        let settings = LineSettings {
            enabled: true,
            mode,
            distance_ranges: vec![DistanceRange::new(0.0, 50.0)],
            ..Default::default()
        };
        let graph = build_lines(&field, &settings).unwrap();
        assert!(graph.colors.iter().all(|c| (0.0..=1.0).contains(c)), "{mode}");
    }
}

#[test]
fn sampling_ratio_limits_participants() {
    let field = scattered(200, 2);
    let settings = LineSettings {
        enabled: true,
        mode: LineMode::Knn { k: 2 },
        sample_ratio: 0.25,
        ..Default::default()
    };
    let graph = build_lines(&field, &settings).unwrap();
    let touched: HashSet<usize> = graph.pairs.iter().flatten().copied().collect();
    assert!(touched.len() <= 50);
    assert!(touched.iter().all(|i| i % 4 == 0));
}

#[test]
fn pipeline_output_saves_as_json() {
    let pipeline = Pipeline::builder()
        .density(4.0)
        .line_mode(LineMode::Distance)
        .distance_ranges(vec![DistanceRange::new(0.0, 10.0)])
        .build()
        .unwrap();
    let output = pipeline.process(&photo(40, 40)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("field.json");
    output.save_json(&path).unwrap();

    let loaded = particle_field::FieldOutput::from_json_file(&path).unwrap();
    assert_eq!(loaded.particles, output.particles);
    assert_eq!(loaded.lines, output.lines);
}
