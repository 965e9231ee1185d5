//! CLI for joining two half faces into one portrait.
//!
//! Usage:
//!   face-splice -l a.jpg -r b.jpg -o out.jpg          # left/right composite
//!   face-splice -u a.jpg -d b.jpg -o out.jpg          # up/down composite
//!   face-splice --inspect a.jpg [-o annotated.png]    # show landmarks and splits
//!
//! Landmarks for `a.jpg` are read from `a.json`, next to the image or in
//! `--landmarks-dir`.

use clap::{Parser, ValueEnum};
use face_splice::{
    anchors, annotate, raster, AnchorPair, Arrangement, CompositeLayout, Compositor, FaceSelection,
    FilterType, LandmarkDetector, LandmarkFiles, LandmarkSet, Side,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "face-splice")]
#[command(author, version, about = "Join two half faces into one portrait", long_about = None)]
struct Args {
    /// Face on the left
    #[arg(short, long)]
    left: Option<PathBuf>,

    /// Face on the right
    #[arg(short, long)]
    right: Option<PathBuf>,

    /// Face on the upside
    #[arg(short, long)]
    upside: Option<PathBuf>,

    /// Face on the downside
    #[arg(short, long)]
    downside: Option<PathBuf>,

    /// Output image; the format follows the extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output for the up/down composite when both pairs are given
    #[arg(long)]
    vertical_output: Option<PathBuf>,

    /// Directory holding the landmark files (default: next to each image)
    #[arg(long)]
    landmarks_dir: Option<PathBuf>,

    /// Resampling filter for the rescaled half
    #[arg(long, value_enum, default_value_t = Filter::CatmullRom)]
    filter: Filter,

    /// Print the landmarks and splits of one image instead of compositing
    #[arg(long, conflicts_with_all = ["left", "right", "upside", "downside"])]
    inspect: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Filter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<Filter> for FilterType {
    fn from(f: Filter) -> Self {
        match f {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Serialize)]
struct CompositeOutput {
    output: String,
    #[serde(flatten)]
    layout: CompositeLayout,
}

#[derive(Serialize)]
struct InspectOutput<'a> {
    image: String,
    width: u32,
    height: u32,
    faces_detected: usize,
    faces: Vec<FaceOutput<'a>>,
}

#[derive(Serialize)]
struct FaceOutput<'a> {
    /// Face index (1-based)
    index: usize,
    landmarks: &'a LandmarkSet,
    splits: Vec<SplitOutput>,
}

#[derive(Serialize)]
struct SplitOutput {
    side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    boundary: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchors: Option<AnchorPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    if let Err(e) = run(&args) {
        tracing::debug!(error = ?e, "run failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let default = if verbose {
        "face_splice=debug,info"
    } else {
        "face_splice=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let detector = match &args.landmarks_dir {
        Some(dir) => LandmarkFiles::in_dir(dir),
        None => LandmarkFiles::beside_images(),
    };

    if let Some(image) = &args.inspect {
        return inspect(args, &detector, image);
    }

    // Settle every output path before writing anything.
    let jobs = plan(args)?;
    let compositor = Compositor::new(&detector).filter(args.filter.into());

    let mut outputs = Vec::new();
    for job in &jobs {
        let composite = compositor.compose(job.arrangement, job.first, job.second, job.output)?;
        outputs.push(CompositeOutput {
            output: job.output.display().to_string(),
            layout: composite.layout,
        });
    }

    let output_str = if args.json {
        serde_json::to_string_pretty(&outputs)?
    } else {
        outputs
            .iter()
            .map(format_composite)
            .collect::<Vec<_>>()
            .join("\n")
    };
    println!("{}", output_str);

    Ok(())
}

/// One composite to build: two sources and where to write the result.
#[derive(Debug)]
struct Job<'a> {
    arrangement: Arrangement,
    first: &'a Path,
    second: &'a Path,
    output: &'a Path,
}

fn plan(args: &Args) -> Result<Vec<Job<'_>>, Box<dyn std::error::Error>> {
    let horizontal = args.left.as_deref().zip(args.right.as_deref());
    let vertical = args.upside.as_deref().zip(args.downside.as_deref());
    let mut jobs = Vec::new();

    if let Some((left, right)) = horizontal {
        let output = args.output.as_deref().ok_or("--left/--right need --output")?;
        jobs.push(Job {
            arrangement: Arrangement::Horizontal,
            first: left,
            second: right,
            output,
        });
    }

    if let Some((up, down)) = vertical {
        let output = if horizontal.is_some() {
            args.vertical_output.as_deref().ok_or(
                "--upside/--downside need --vertical-output when --left/--right are given too",
            )?
        } else {
            args.output
                .as_deref()
                .or(args.vertical_output.as_deref())
                .ok_or("--upside/--downside need --output")?
        };
        jobs.push(Job {
            arrangement: Arrangement::Vertical,
            first: up,
            second: down,
            output,
        });
    }

    if jobs.is_empty() {
        return Err("nothing to do: give --left and --right, or --upside and --downside".into());
    }
    Ok(jobs)
}

fn inspect(
    args: &Args,
    detector: &LandmarkFiles,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = raster::load(path)?;
    let faces = detector.face_landmarks(&image, path)?;

    let face_outputs = faces
        .iter()
        .enumerate()
        .map(|(i, face)| FaceOutput {
            index: i + 1,
            landmarks: face,
            splits: Side::ALL
                .iter()
                .map(|&side| match anchors::derive(face, side) {
                    Ok((boundary, pair)) => SplitOutput {
                        side,
                        boundary: Some(boundary),
                        anchors: Some(pair),
                        error: None,
                    },
                    Err(e) => SplitOutput {
                        side,
                        boundary: None,
                        anchors: None,
                        error: Some(e.to_string()),
                    },
                })
                .collect(),
        })
        .collect();

    let report = InspectOutput {
        image: path.display().to_string(),
        width: image.width(),
        height: image.height(),
        faces_detected: faces.len(),
        faces: face_outputs,
    };

    let output_str = if args.json {
        serde_json::to_string_pretty(&report)?
    } else {
        format_inspection(&report)
    };
    println!("{}", output_str);

    if let Some(output) = &args.output {
        let face = FaceSelection::First.select(faces, path)?;
        raster::save(&annotate(&image, &face), output)?;
        tracing::info!(output = %output.display(), "annotated image written");
    }

    Ok(())
}

fn format_composite(output: &CompositeOutput) -> String {
    let layout = &output.layout;
    let mut s = String::new();

    s.push_str(&format!("Wrote {} ({}x{})\n", output.output, layout.width, layout.height));
    s.push_str(&format!("  Scale ratio: {:.3} ({:?})\n", layout.scale_ratio, layout.metric));
    match layout.resampled {
        Some(side) => s.push_str(&format!("  Resampled:   {} half\n", side)),
        None => s.push_str("  Resampled:   none\n"),
    }
    s.push_str(&format!(
        "  Seam band:   {} px from offsets {} / {}\n",
        layout.band, layout.offsets[0], layout.offsets[1]
    ));

    s
}

fn format_inspection(report: &InspectOutput) -> String {
    let mut s = String::new();

    s.push_str(&format!("Image: {} ({}x{})\n", report.image, report.width, report.height));
    s.push_str(&format!("Faces detected: {}\n", report.faces_detected));

    if report.faces.is_empty() {
        s.push_str("\nNo faces found.\n");
        return s;
    }
    if report.faces.len() > 1 {
        s.push_str("Only face 1 is used for compositing.\n");
    }

    for face in &report.faces {
        s.push_str(&format!("\n--- Face {} ---\n", face.index));
        for (name, points) in face.landmarks.iter() {
            let coords: Vec<String> =
                points.iter().map(|p| format!("({}, {})", p.x, p.y)).collect();
            s.push_str(&format!("  {:<14} {}\n", name, coords.join(" ")));
        }

        s.push_str("\nSplits:\n");
        for split in &face.splits {
            match (split.boundary, split.anchors, &split.error) {
                (Some(boundary), Some(pair), _) => s.push_str(&format!(
                    "  {:<9} at {:>5}  anchors ({}, {}) ({}, {})\n",
                    split.side,
                    boundary,
                    pair.first().x,
                    pair.first().y,
                    pair.second().x,
                    pair.second().y
                )),
                (_, _, Some(error)) => {
                    s.push_str(&format!("  {:<9} unavailable: {}\n", split.side, error))
                }
                _ => {}
            }
        }
    }

    s
}
