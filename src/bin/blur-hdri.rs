use std::path::PathBuf;

use anyhow::Context as _;
use blur_hdri::{BlurJob, NarrowPanoramaPolicy, TextureKind, WorkingPrecision};
use clap::{Parser, ValueEnum};
use tracing::Level;

const MIN_RADIUS: f32 = 0.1;
const MAX_RADIUS: f32 = 100.0;

/// Blur an image or environment texture without a seam at the 360° wrap.
#[derive(Parser, Debug)]
#[command(name = "blur-hdri", version)]
struct Cli {
    /// Source texture (.exr, .png, .jpg, .bmp, .tga, .tif).
    input: PathBuf,

    /// Gaussian blur radius (standard deviation in pixels), 0.1 to 100.
    #[arg(long, short, default_value_t = 5.0)]
    radius: f32,

    /// Node the texture belongs to; environment textures wrap horizontally.
    #[arg(long, value_enum, default_value_t = KindChoice::Environment)]
    kind: KindChoice,

    /// Numeric space used to blur float (HDR) images.
    #[arg(long, value_enum, default_value_t = PrecisionChoice::Clamped8)]
    precision: PrecisionChoice,

    /// What to do when the panorama is too narrow for the wrap padding.
    #[arg(long, value_enum, default_value_t = NarrowChoice::Clamp)]
    narrow: NarrowChoice,

    /// Output path. Defaults to the input name with `_blurred` before the extension.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Log every pipeline step.
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindChoice {
    Image,
    Environment,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PrecisionChoice {
    /// Clamp to [0, 1] and blur in 8 bits (highlights above 1.0 are lost).
    Clamped8,
    /// Blur the float samples directly.
    Float,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NarrowChoice {
    Clamp,
    Reject,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    anyhow::ensure!(
        (MIN_RADIUS..=MAX_RADIUS).contains(&cli.radius),
        "radius must be between {MIN_RADIUS} and {MAX_RADIUS}, got {}",
        cli.radius
    );

    let kind = match cli.kind {
        KindChoice::Image => TextureKind::Image,
        KindChoice::Environment => TextureKind::Environment,
    };
    let precision = match cli.precision {
        PrecisionChoice::Clamped8 => WorkingPrecision::Clamped8Bit,
        PrecisionChoice::Float => WorkingPrecision::NativeFloat,
    };
    let narrow = match cli.narrow {
        NarrowChoice::Clamp => NarrowPanoramaPolicy::Clamp,
        NarrowChoice::Reject => NarrowPanoramaPolicy::Reject,
    };

    let mut job = BlurJob::new(&cli.input, kind, cli.radius)?
        .with_precision(precision)
        .with_narrow_policy(narrow);
    if let Some(output) = cli.output {
        job = job.with_destination(output);
    }

    let written = blur_hdri::run(&job)
        .with_context(|| format!("blur '{}'", cli.input.display()))?;
    println!("{}", written.display());
    Ok(())
}
