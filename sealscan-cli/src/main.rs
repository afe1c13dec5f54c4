use clap::Parser;
use sealscan::{
    draw_detections, load_rgb_image, DetectionConfig, DetectionRecord, DetectionSummary,
    SealDetector,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "SealScan CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for per-stage progress and timings.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_paths: Vec<String>,
    templates_dir: String,
    output_path: Option<String>,
    annotated_dir: Option<String>,
    detection: DetectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_paths: Vec::new(),
            templates_dir: "templates".to_string(),
            output_path: None,
            annotated_dir: None,
            detection: DetectionConfig::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PageOutput<'a> {
    image_path: &'a str,
    result: DetectionRecord<'a>,
    summary: DetectionSummary,
}

#[derive(Debug, Serialize)]
struct Output<'a> {
    template_warnings: Vec<String>,
    pages: Vec<PageOutput<'a>>,
}

fn annotated_path(dir: &Path, image_path: &str) -> PathBuf {
    let stem = Path::new(image_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");
    dir.join(format!("{stem}_annotated.png"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("sealscan=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_paths.is_empty() {
        return Err("image_paths must list at least one image".into());
    }

    let detector = SealDetector::new(config.detection.clone(), &config.templates_dir);
    let template_warnings = detector
        .template_warnings()
        .iter()
        .map(|w| format!("{}: {}", w.path.display(), w.reason))
        .collect();

    let mut pages = Vec::with_capacity(config.image_paths.len());
    for (page_num, path) in config.image_paths.iter().enumerate() {
        let page = load_rgb_image(path)?;
        let result = detector.detect(&page, page_num)?;
        if let Some(dir) = &config.annotated_dir {
            let dir = Path::new(dir);
            fs::create_dir_all(dir)?;
            draw_detections(&page, result.regions()).save(annotated_path(dir, path))?;
        }
        pages.push((path.as_str(), result));
    }

    let output = Output {
        template_warnings,
        pages: pages
            .iter()
            .map(|(path, result)| PageOutput {
                image_path: path,
                result: result.to_record(),
                summary: detector.detection_summary(result),
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
