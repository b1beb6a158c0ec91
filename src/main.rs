use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::io::Reader as ImageReader;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sobel_edge_pipeline::config::{load_config, CommandLineOverrides, PipelineConfig};
use sobel_edge_pipeline::grayscale::GrayscaleWeights;
use sobel_edge_pipeline::image_arithmetic::PixelBuffer;
use sobel_edge_pipeline::pipeline::Pipeline;
use sobel_edge_pipeline::sobel_filter::FilterPreset;

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(
    about = "Convert the image at the given path to grayscale, threshold it and \
             detect its edges with a Sobel filter."
)]
struct Cli {
    /// Image to process
    image: PathBuf,

    /// Directory receiving grayscale.png, thresholded.png and sobel.png
    results: PathBuf,

    /// JSON pipeline configuration; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Intensities strictly above this value become white
    #[arg(short, long, allow_hyphen_values = true)]
    threshold: Option<i32>,

    /// Sobel gain B applied to the gradient magnitude
    #[arg(long)]
    gain: Option<f64>,

    /// Sobel offset A added after the gain
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<f64>,

    /// Named Sobel variant
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Channel weights for the grayscale conversion
    #[arg(long, value_enum)]
    grayscale: Option<WeightsArg>,

    /// Run the Sobel filter on NUM threads
    #[arg(short, long, value_name = "NUM")]
    parallel: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Reference,
    SingleAxis,
    Extended,
    Replicated,
}

impl From<PresetArg> for FilterPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Reference => FilterPreset::Reference,
            PresetArg::SingleAxis => FilterPreset::SingleAxis,
            PresetArg::Extended => FilterPreset::Extended,
            PresetArg::Replicated => FilterPreset::Replicated,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum WeightsArg {
    Average,
    Luma,
}

impl From<WeightsArg> for GrayscaleWeights {
    fn from(arg: WeightsArg) -> Self {
        match arg {
            WeightsArg::Average => GrayscaleWeights::Average,
            WeightsArg::Luma => GrayscaleWeights::Luma,
        }
    }
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let from_file = match &self.config {
            Some(path) => load_config(path)?,
            None => PipelineConfig::default(),
        };
        let overrides = CommandLineOverrides {
            threshold: self.threshold,
            preset: self.preset.map(FilterPreset::from),
            grayscale: self.grayscale.map(GrayscaleWeights::from),
            gain: self.gain,
            offset: self.offset,
            parallelity: self.parallel,
        };
        let config = from_file.with_overrides(&overrides);
        config.validate()?;
        return Ok(config);
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).with_target(false).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("A global tracing subscriber was already installed");
    }
}

fn save(img: impl Into<image::DynamicImage>, path: &Path) -> Result<()> {
    img.into().save(path).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    return Ok(());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = cli.pipeline_config()?;
    let pipeline = Pipeline::from_config(&config)?;
    let params = pipeline.sobel.params();
    info!(
        "Sobel A={} B={} combine={:?} border={:?}, threshold {}",
        params.offset, params.gain, params.combine, params.border, config.threshold
    );

    let mut dirbuilder = fs::DirBuilder::new();
    dirbuilder.recursive(true);
    dirbuilder
        .create(&cli.results)
        .with_context(|| format!("Failed to create {}", cli.results.display()))?;

    let input_image = ImageReader::open(&cli.image)
        .with_context(|| format!("Failed to open {}", cli.image.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", cli.image.display()))?;
    let source = PixelBuffer::from_dynamic(&input_image)?;
    info!("Loaded {} ({}x{})", cli.image.display(), source.width(), source.height());

    let start_time = Instant::now();
    let output = pipeline.run(&source)?;
    info!(
        "Filtered in {:.3} ms on {} thread(s)",
        start_time.elapsed().as_secs_f64() * 1e3,
        pipeline.sobel.parallelity()
    );

    save(output.grayscale.to_gray_image()?, &cli.results.join("grayscale.png"))?;
    save(output.thresholded.to_rgba_image(), &cli.results.join("thresholded.png"))?;
    save(output.edges.to_rgba_image(), &cli.results.join("sobel.png"))?;
    return Ok(());
}
