//! Render raw ADPCM-B sample data to WAV through the Delta-T unit

mod args;
mod render;

use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};

use args::CliArgs;
use render::{chip_clock, render, write_wav_file, RenderConfig};

fn main() -> Result<()> {
    println!("Delta-T ADPCM-B Renderer");
    println!("========================\n");

    let args = CliArgs::parse();

    if args.show_help {
        CliArgs::print_help();
        return if args.input.is_none() {
            Ok(())
        } else {
            Err(anyhow!("Invalid arguments"))
        };
    }

    let Some(input) = args.input.as_deref() else {
        CliArgs::print_help();
        bail!("No input file given");
    };
    let output = args.output_path().unwrap_or_else(|| "out.wav".to_string());

    let data = std::fs::read(input).with_context(|| format!("Failed to read {}", input))?;

    let config = RenderConfig {
        chip: args.chip,
        sample_rate: args.sample_rate,
        delta_n: args.delta_n,
        volume: args.volume,
        cpu_feed: args.cpu_feed,
        repeat_once: args.repeat_once,
    };

    println!("Input:        {} ({} bytes)", input, data.len());
    println!("Chip:         {:?} @ {} Hz", config.chip, chip_clock(config.chip));
    println!("DELTA-N:      ${:04X}", config.delta_n);
    println!("Level:        ${:02X}", config.volume);
    println!(
        "Source:       {}{}\n",
        if config.cpu_feed { "CPU ($08)" } else { "external memory" },
        if config.repeat_once { ", repeat once" } else { "" }
    );

    let started = Instant::now();
    println!("Rendering at {} Hz...", config.sample_rate);
    let samples = render(&data, &config)?;

    println!("Writing WAV file to {}...", output);
    write_wav_file(Path::new(&output), &samples, config.sample_rate)?;

    println!(
        "Export complete! {} samples ({:.2}s) in {:.0} ms",
        samples.len(),
        samples.len() as f64 / config.sample_rate as f64,
        started.elapsed().as_secs_f64() * 1000.0
    );

    Ok(())
}
