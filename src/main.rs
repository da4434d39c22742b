use serde::Serialize;
use sprite_splitter::config::{load_config, SplitterConfig};
use sprite_splitter::diagnostics::DetectionReport;
use sprite_splitter::extract::{ExtractionMetadata, LayerExtractor};
use sprite_splitter::image::io::{load_raster, save_mask_png, write_json_file};
use sprite_splitter::segmentation::foreground_mask;
use sprite_splitter::split::{LayerFailure, SheetSplitter};
use sprite_splitter::types::{PercentRect, Rect, SpriteType};
use sprite_splitter::SpriteDetector;
use std::env;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path)).map_err(|e| e.to_string())?;
    let SplitterConfig {
        input,
        detector,
        extraction,
        output,
    } = config;

    let image = load_raster(&input).map_err(|e| e.to_string())?;
    if output.save_mask {
        let mask = foreground_mask(&image, &detector.foreground);
        save_mask_png(&mask, &output.dir.join("mask.png")).map_err(|e| e.to_string())?;
    }

    let splitter = SheetSplitter::new(SpriteDetector::new(detector), LayerExtractor::new(extraction));
    let outcome = splitter.split(&image).map_err(|e| e.to_string())?;

    let mut layers = Vec::with_capacity(outcome.layers.len());
    for layer in &outcome.layers {
        let path = output.dir.join(format!("{}.png", layer.id));
        layer.save_png(&path).map_err(|e| e.to_string())?;
        layers.push(LayerSummary {
            id: layer.id.clone(),
            name: layer.name.clone(),
            sprite_type: layer.sprite_type,
            refined_bounds: layer.refined_bounds,
            refined_pixels: layer.refined_pixels,
            contour_points: layer.contour.points.len(),
            metadata: layer.metadata.clone(),
            png: path,
        });
    }

    let summary = SplitSummary {
        input: input.clone(),
        width: image.width(),
        height: image.height(),
        layers,
        failures: outcome.failures,
        extraction_ms: outcome.extraction_ms,
        detection: outcome.report,
    };
    let summary_path = output.summary_path();
    write_json_file(&summary_path, &summary).map_err(|e| e.to_string())?;

    println!(
        "Wrote {} layers from {} to {}",
        summary.layers.len(),
        input.display(),
        output.dir.display()
    );
    println!("Saved summary to {}", summary_path.display());
    Ok(())
}

fn usage() -> String {
    "Usage: sprite-splitter <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LayerSummary {
    id: String,
    name: String,
    sprite_type: SpriteType,
    refined_bounds: PercentRect,
    refined_pixels: Rect,
    contour_points: usize,
    metadata: ExtractionMetadata,
    png: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SplitSummary {
    input: PathBuf,
    width: u32,
    height: u32,
    layers: Vec<LayerSummary>,
    failures: Vec<LayerFailure>,
    extraction_ms: f64,
    detection: DetectionReport,
}
