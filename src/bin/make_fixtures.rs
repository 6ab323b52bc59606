// Writes the bundled test-mode images: deterministic gradients in assorted
// aspect ratios so normalization has something to crop in both directions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use image::{Rgb, RgbImage};

#[derive(Parser)]
#[command(name = "make_fixtures", about = "Generate bundled fixture images")]
struct Cli {
    /// Directory to write the images into
    #[arg(short, long, default_value = "fixtures")]
    output: PathBuf,
}

/// (width, height, base color)
const FIXTURES: [(u32, u32, [u8; 3]); 5] = [
    (640, 360, [200, 60, 40]),
    (360, 640, [40, 160, 80]),
    (480, 480, [50, 80, 200]),
    (800, 300, [220, 180, 40]),
    (300, 500, [150, 60, 180]),
];

fn gradient(width: u32, height: u32, base: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let fx = x as f32 / width.max(1) as f32;
        let fy = y as f32 / height.max(1) as f32;
        let shade = |c: u8, f: f32| (c as f32 * (0.35 + 0.65 * f)).round().min(255.0) as u8;

        // Checker marks make motion visible in the rendered video
        if (x / 40 + y / 40) % 2 == 0 && (x % 40 < 4 || y % 40 < 4) {
            Rgb([255, 255, 255])
        } else {
            Rgb([shade(base[0], fx), shade(base[1], fy), shade(base[2], 1.0 - fx)])
        }
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    println!("🎨 Writing fixture images to {:?}", cli.output);
    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("creating {:?}", cli.output))?;

    for (i, (width, height, base)) in FIXTURES.iter().enumerate() {
        let path = cli.output.join(format!("{:02}.png", i + 1));
        gradient(*width, *height, *base)
            .save(&path)
            .with_context(|| format!("writing {:?}", path))?;
        println!("   ✅ {:?} ({}x{})", path, width, height);
    }

    Ok(())
}
