// Command-line runner for the `swatch_score` library: scores one image file on disk
// against a theme color and prints the result.

use std::env;
use std::fs;
use std::process::ExitCode;
use swatch_score::ScoringPipeline;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: swatch_score <image_path> <#RRGGBB>");
        return ExitCode::FAILURE;
    }
    let image_path = &args[1];
    let theme_hex = &args[2];

    let bytes = match fs::read(image_path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("failed to read {image_path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    match ScoringPipeline::default().score(&bytes, theme_hex) {
        Ok(result) => {
            println!("score:         {:.1}", result.score);
            println!("avg_color_hex: {}", result.avg_color_hex);
            println!("method:        {}", result.method);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
