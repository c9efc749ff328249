use clap::{Parser, Subcommand};
use cli::FieldConfig;
use color_eyre::eyre::Result;
use particle_field::{extract_dominant_colors, load_rgba};
use rand::{SeedableRng, rngs::StdRng};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample an image into a particle field (and optional line graph)
    Sample {
        /// Path to the input image (overrides `image` in the config)
        #[arg(short, long)]
        image: Option<PathBuf>,
        /// Path to a TOML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Path to write the output JSON (overrides `output` in the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Random seed (overrides `seed` in the config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Extract dominant colors as tint mappings
    Palette {
        /// Path to the input image
        #[arg(short, long)]
        image: PathBuf,
        /// Number of clusters
        #[arg(short = 'k', long, default_value = "5")]
        clusters: usize,
        /// Random seed for the cluster initialisation
        #[arg(long, default_value = "24301")]
        seed: u64,
        /// Write a configuration with tinting enabled instead of printing the mappings
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the JSON schema of the configuration document
    Schema {
        /// Write the schema to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a configuration file with every default spelled out
    Init {
        /// Path of the new .toml or .json file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Sample { image, config, output, seed } => {
            sample_image(image.as_deref(), config.as_deref(), output.as_deref(), *seed)?;
        }
        Commands::Palette { image, clusters, seed, output } => {
            extract_palette(image, *clusters, *seed, output.as_deref())?;
        }
        Commands::Schema { output } => {
            let schema = serde_json::to_string_pretty(&FieldConfig::schema())?;
            match output {
                Some(path) => std::fs::write(path, schema)?,
                None => println!("{schema}"),
            }
        }
        Commands::Init { output } => {
            FieldConfig::default().to_file(output)?;
            info!("Wrote default configuration to {:?}", output);
        }
    }

    Ok(())
}

fn sample_image(
    image: Option<&Path>,
    config_path: Option<&Path>,
    output: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => FieldConfig::from_file(path)?,
        None => FieldConfig::default(),
    };
    if let Some(seed) = seed {
        config.settings.seed = seed;
    }

    let image_path = config.resolve_image(image)?;
    let pipeline = config.pipeline()?;
    info!("{}", pipeline.info());
    info!("Sampling {:?}", image_path);

    let result = pipeline.process_file(&image_path)?;
    if result.particles.is_empty() {
        warn!("No particles were produced; check threshold, crop and color filter settings");
    }

    match output.map(Path::to_path_buf).or_else(|| config.output.clone()) {
        Some(path) => {
            result.save_json(&path)?;
            info!(
                "Wrote {} particles and {} lines to {:?}",
                result.particles.count,
                result.lines.as_ref().map_or(0, |l| l.count),
                path
            );
        }
        None => println!("{}", result.to_json_string()?),
    }

    Ok(())
}

fn extract_palette(
    image_path: &Path,
    clusters: usize,
    seed: u64,
    output: Option<&Path>,
) -> Result<()> {
    let image = load_rgba(image_path)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mappings = extract_dominant_colors(&image, clusters, &mut rng);

    if mappings.is_empty() {
        warn!("No chromatic pixels to cluster in {:?}", image_path);
    }
    for mapping in &mappings {
        info!(
            "{} hue {:.1} ({:.1}%)",
            mapping.source_color, mapping.source_hue, mapping.percentage
        );
    }

    match output {
        Some(path) => {
            let config = FieldConfig { image: Some(image_path.to_path_buf()), ..Default::default() }
                .with_tint(mappings);
            config.to_file(path)?;
            info!("Wrote tint configuration to {:?}", path);
        }
        None => println!("{}", serde_json::to_string_pretty(&mappings)?),
    }

    Ok(())
}
