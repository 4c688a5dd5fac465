//! DeltaSpec CLI - Change detection from multi-spectral imagery

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use deltaspec_algorithms::{bands, change, mask_clouds, ChangeResult, SpectralIndex};
use deltaspec_core::image::Image;
use deltaspec_core::io::{read_geotiff, write_geotiff};
use deltaspec_core::{ImageCollection, Raster};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "deltaspec")]
#[command(author, version, about = "Change detection from multi-spectral imagery", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about the bands of an image directory
    Info {
        /// Directory with one GeoTIFF per band (B4.tif, B8.tif, ...)
        image: PathBuf,
    },
    /// Compute a spectral index for a single image
    Index {
        /// Image directory (one GeoTIFF per band)
        #[arg(long)]
        image: PathBuf,
        /// Index name: NDVI, kNDVI, NDWI, MNDWI, RBR, GBR, EGI, GRVI,
        /// NDBRBI, SAVI, TSAVI, MSI, LSWI, EVI, HSV, HSV_1
        #[arg(long)]
        index: String,
        /// Output file; multi-band indices write one file per band
        output: PathBuf,
    },
    /// Pre/post change detection over two image collections
    Change {
        /// Pre-event image directory (repeatable)
        #[arg(long, required = true)]
        pre: Vec<PathBuf>,
        /// Post-event image directory (repeatable)
        #[arg(long, required = true)]
        post: Vec<PathBuf>,
        /// Index name
        #[arg(long)]
        index: String,
        /// Directory for the <index>_pre, <index>_post and rd<index> outputs
        #[arg(long)]
        output_dir: PathBuf,
        /// Mask clouds with the QA60 band before computing the index
        #[arg(long)]
        cloud_mask: bool,
    },
    /// Mask cloudy pixels using the QA60 band
    MaskClouds {
        /// Image directory (one GeoTIFF per band, QA60.tif included)
        #[arg(long)]
        image: PathBuf,
        /// Directory for the masked band files
        #[arg(long)]
        output_dir: PathBuf,
    },
}

// ─── Entry point ────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { image } => {
            let image = load_image_all(&image)?;
            let (rows, cols) = image.shape();
            let bounds = image.transform().bounds(cols, rows);

            println!("Dimensions: {} x {} ({} bands)", cols, rows, image.num_bands());
            println!("Cell size: {}", image.transform().cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );

            println!("\nBands:");
            for (name, band) in image.bands() {
                let stats = band.statistics();
                match (stats.min, stats.max, stats.mean) {
                    (Some(min), Some(max), Some(mean)) => println!(
                        "  {:8} min {:12.4}  max {:12.4}  mean {:12.4}  valid {}",
                        name, min, max, mean, stats.valid_count
                    ),
                    _ => println!("  {:8} (no valid cells)", name),
                }
            }
        }

        Commands::Index {
            image,
            index,
            output,
        } => {
            let index = parse_index(&index)?;
            let input = load_image(&image, index.required_bands())?;

            let start = Instant::now();
            let result = index
                .apply(&input)
                .with_context(|| format!("Failed to compute {}", index))?;
            let elapsed = start.elapsed();

            write_image(&result, output_target(&output))?;
            done(index.name(), &output, elapsed);
        }

        Commands::Change {
            pre,
            post,
            index,
            output_dir,
            cloud_mask,
        } => {
            let index = parse_index(&index)?;

            let mut required: Vec<&str> = index.required_bands().to_vec();
            if cloud_mask {
                required.push(bands::QA);
            }

            let pre = load_collection(&pre, &required, cloud_mask)?;
            let post = load_collection(&post, &required, cloud_mask)?;
            info!(
                "Loaded {} pre and {} post image(s)",
                pre.len(),
                post.len()
            );

            let start = Instant::now();
            let ChangeResult {
                pre: pre_composite,
                post: post_composite,
                diff,
            } = change(&pre, &post, index)
                .with_context(|| format!("Failed to compute {} change", index))?;
            let elapsed = start.elapsed();

            std::fs::create_dir_all(&output_dir)
                .with_context(|| format!("Cannot create {}", output_dir.display()))?;

            let name = index.name();
            write_image(
                &pre_composite,
                Target::Stem(output_dir.as_path(), format!("{}_pre", name)),
            )?;
            write_image(
                &post_composite,
                Target::Stem(output_dir.as_path(), format!("{}_post", name)),
            )?;
            write_image(
                &diff,
                Target::Stem(output_dir.as_path(), format!("rd{}", name)),
            )?;
            done(&format!("{} change", name), &output_dir, elapsed);
        }

        Commands::MaskClouds { image, output_dir } => {
            let input = load_image_all(&image)?;

            let start = Instant::now();
            let masked = mask_clouds(&input).context("Failed to mask clouds")?;
            let elapsed = start.elapsed();

            std::fs::create_dir_all(&output_dir)
                .with_context(|| format!("Cannot create {}", output_dir.display()))?;
            for (name, band) in masked.bands() {
                let path = output_dir.join(format!("{}.tif", name));
                write_band(band, &path)?;
            }
            done("Cloud mask", &output_dir, elapsed);
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn parse_index(name: &str) -> Result<SpectralIndex> {
    name.parse::<SpectralIndex>().map_err(|e| {
        let supported: Vec<&str> = SpectralIndex::ALL.iter().map(|i| i.name()).collect();
        anyhow::anyhow!("{} (supported: {})", e, supported.join(", "))
    })
}

/// Load the named bands of an image directory (`<dir>/<band>.tif` each)
fn load_image(dir: &Path, band_names: &[&str]) -> Result<Image> {
    let pb = spinner(&format!("Reading {}...", dir.display()));

    let mut image_bands = Vec::with_capacity(band_names.len());
    for name in band_names {
        let path = dir.join(format!("{}.tif", name));
        let band: Raster<f64> = read_geotiff(&path)
            .with_context(|| format!("Failed to read band {}", path.display()))?;
        image_bands.push((name.to_string(), band));
    }

    pb.finish_and_clear();
    let image = Image::from_bands(image_bands)
        .with_context(|| format!("Inconsistent bands in {}", dir.display()))?;
    info!(
        "Input {}: {} x {}",
        dir.display(),
        image.shape().1,
        image.shape().0
    );
    Ok(image)
}

/// Load every `*.tif` in a directory as a band named by its file stem
fn load_image_all(dir: &Path) -> Result<Image> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("tif") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();

    if names.is_empty() {
        bail!("No .tif band files in {}", dir.display());
    }

    let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    load_image(dir, &name_refs)
}

fn load_collection(
    dirs: &[PathBuf],
    band_names: &[&str],
    cloud_mask: bool,
) -> Result<ImageCollection> {
    let mut images = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let mut image = load_image(dir, band_names)?;
        if cloud_mask {
            image = mask_clouds(&image)
                .with_context(|| format!("Failed to mask clouds in {}", dir.display()))?;
        }
        images.push(image);
    }
    ImageCollection::from_images(images).context("Images do not share a band schema")
}

/// Output location: a concrete file, or a directory plus file stem
enum Target<'a> {
    File(&'a Path),
    Stem(&'a Path, String),
}

fn output_target(path: &Path) -> Target<'_> {
    Target::File(path)
}

/// Write an image; multi-band images get one file per band
fn write_image(image: &Image, target: Target<'_>) -> Result<()> {
    let single = image.num_bands() == 1;

    for (name, band) in image.bands() {
        let path = match &target {
            Target::File(path) if single => path.to_path_buf(),
            Target::File(path) => {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("output");
                path.with_file_name(format!("{}_{}.tif", stem, name))
            }
            Target::Stem(dir, stem) if single => dir.join(format!("{}.tif", stem)),
            Target::Stem(dir, stem) => dir.join(format!("{}_{}.tif", stem, name)),
        };
        write_band(band, &path)?;
    }

    Ok(())
}

fn write_band(band: &Raster<f64>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(band, path).with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn done(what: &str, output: &Path, elapsed: std::time::Duration) {
    info!("{} -> {} ({:.2?})", what, output.display(), elapsed);
}
