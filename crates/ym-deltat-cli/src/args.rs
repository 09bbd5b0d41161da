//! Command-line argument parsing for the Delta-T renderer.
//!
//! Flags may be given as `--flag value` or `--flag=value`. Numbers accept a
//! `0x` or `$` prefix for hexadecimal.

use std::env;

use ym_deltat::ChipVariant;

/// DELTA-N giving roughly 16 kHz playback on a YM2608
pub const DEFAULT_DELTA_N: u16 = 0x49BA;

/// Output sample rate when `--rate` is not given
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Parsed command-line arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// Raw ADPCM-B input file
    pub input: Option<String>,
    /// WAV output path (defaults to the input with a .wav extension)
    pub output: Option<String>,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Playback rate register value
    pub delta_n: u16,
    /// Output level register value
    pub volume: u8,
    /// Host chip preset
    pub chip: ChipVariant,
    /// Feed bytes through the data register instead of external memory
    pub cpu_feed: bool,
    /// Play the sample a second time through the REPEAT bit
    pub repeat_once: bool,
    /// Whether help was requested
    pub show_help: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            delta_n: DEFAULT_DELTA_N,
            volume: 0xFF,
            chip: ChipVariant::Ym2608,
            cpu_feed: false,
            repeat_once: false,
            show_help: false,
        }
    }
}

/// Parse a decimal, `0x` or `$` prefixed hexadecimal number
fn parse_number(value: &str) -> Option<u32> {
    if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix('$')) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        value.parse().ok()
    }
}

impl CliArgs {
    /// Parse arguments from command line.
    pub fn parse() -> Self {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse arguments from any iterator (program name already skipped).
    pub fn parse_from<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = Self::default();
        let mut iter = iter.into_iter();

        while let Some(arg) = iter.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };

            match flag.as_str() {
                "--help" | "-h" => {
                    args.show_help = true;
                }
                "--cpu" => {
                    args.cpu_feed = true;
                }
                "--repeat-once" => {
                    args.repeat_once = true;
                }
                "-o" | "--output" | "--rate" | "--delta-n" | "--volume" | "--chip" => {
                    let Some(value) = inline.or_else(|| iter.next()) else {
                        eprintln!("{} requires an argument", flag);
                        args.show_help = true;
                        continue;
                    };
                    if !args.apply_value(&flag, &value) {
                        eprintln!("Invalid value for {}: {}", flag, value);
                        args.show_help = true;
                    }
                }
                _ if flag.starts_with('-') => {
                    eprintln!("Unknown flag: {}", arg);
                    args.show_help = true;
                }
                _ => {
                    if args.input.is_some() {
                        eprintln!("Only one input file is supported: {}", arg);
                        args.show_help = true;
                    } else {
                        args.input = Some(arg);
                    }
                }
            }
        }

        args
    }

    fn apply_value(&mut self, flag: &str, value: &str) -> bool {
        match flag {
            "-o" | "--output" => {
                self.output = Some(value.to_string());
                true
            }
            "--rate" => match parse_number(value) {
                Some(rate) if rate > 0 => {
                    self.sample_rate = rate;
                    true
                }
                _ => false,
            },
            "--delta-n" => match parse_number(value).and_then(|v| u16::try_from(v).ok()) {
                Some(delta_n) if delta_n > 0 => {
                    self.delta_n = delta_n;
                    true
                }
                _ => false,
            },
            "--volume" => match parse_number(value).and_then(|v| u8::try_from(v).ok()) {
                Some(volume) => {
                    self.volume = volume;
                    true
                }
                None => false,
            },
            "--chip" => match ChipVariant::from_name(value) {
                Some(chip) => {
                    self.chip = chip;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Output path, derived from the input when `-o` was not given
    pub fn output_path(&self) -> Option<String> {
        if let Some(output) = &self.output {
            return Some(output.clone());
        }
        let input = self.input.as_ref()?;
        let path = std::path::Path::new(input).with_extension("wav");
        Some(path.to_string_lossy().into_owned())
    }

    /// Print help text to stderr.
    pub fn print_help() {
        eprintln!(
            "Usage:\n  ym-deltat <input.pcm> [-o out.wav] [--rate N] [--delta-n N] [--volume N]\n\
             \x20           [--chip ym2608|ym2610|y8950] [--cpu] [--repeat-once]\n\n\
             Flags:\n\
             \x20 -o, --output <file>   WAV output (default: input with .wav extension)\n\
             \x20 --rate <hz>           Output sample rate (default 44100)\n\
             \x20 --delta-n <n>         Playback rate register $09/$0A (default $49BA)\n\
             \x20 --volume <n>          Output level register $0B (default $FF)\n\
             \x20 --chip <name>         Host chip preset:\n\
             \x20                         - ym2608 (default)\n\
             \x20                         - ym2610\n\
             \x20                         - y8950\n\
             \x20 --cpu                 Feed bytes through register $08 instead of memory\n\
             \x20 --repeat-once         Play the sample twice using the REPEAT bit\n\
             \x20 -h, --help            Show this help\n\n\
             Examples:\n\
             \x20 ym-deltat drums.pcm                     # Render drums.wav\n\
             \x20 ym-deltat voice.pcm --chip ym2610 -o voice.wav\n"
        );
    }
}
