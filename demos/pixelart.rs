#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::path::PathBuf;

use clap::Parser;
use eightbit::{BlockSize, PaletteSize, PixelArtPipeline, Raster};
use image::RgbaImage;

#[derive(Parser)]
struct Options {
    #[arg(short, long, default_value_t = PaletteSize::default(), value_parser = parse_palette_size)]
    k: PaletteSize,

    #[arg(short, long, default_value_t = BlockSize::default(), value_parser = parse_block_size)]
    block_size: BlockSize,

    #[arg(long)]
    no_dither: bool,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long)]
    verbose: bool,

    input: PathBuf,

    output: PathBuf,
}

fn parse_palette_size(s: &str) -> Result<PaletteSize, String> {
    let value: u16 = s.parse().map_err(|e| format!("{e}"))?;
    value.try_into().map_err(|e| format!("{e}"))
}

fn parse_block_size(s: &str) -> Result<BlockSize, String> {
    let value: u32 = s.parse().map_err(|e| format!("{e}"))?;
    value.try_into().map_err(|e| format!("{e}"))
}

fn main() {
    let Options { k, block_size, no_dither, seed, verbose, input, output } = Options::parse();

    macro_rules! log {
        ($name: literal, $val: expr) => {
            if verbose {
                let time = std::time::Instant::now();
                let value = $val;
                println!("{} took {}ms", $name, time.elapsed().as_millis());
                value
            } else {
                $val
            }
        };
    }

    let image = log!("read image", image::open(input).unwrap().into_rgba8());
    let raster = Raster::from(&image);

    let mut pipeline = PixelArtPipeline::new(&raster);
    pipeline
        .block_size(block_size)
        .palette_size(k)
        .dither(!no_dither)
        .seed(seed);

    let art: RgbaImage = log!("pixel art effect", pipeline.pixel_art_image());

    log!("write image", art.save(output).unwrap())
}
