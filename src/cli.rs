use std::num::IntErrorKind;
use std::path::Path;
use std::time::Instant;

use bandlimit::{ResampleError, ResampleParams};

/// Highest accepted output rate (`i32::MAX`).
const MAX_RATE: i64 = i32::MAX as i64;

/// Positional arguments of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    input: String,
    rate: u32,
    output: String,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e @ ResampleError::Usage(_)) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &CliArgs) -> Result<(), ResampleError> {
    // Fail on an unwritable container before decoding anything
    bandlimit::io::check_output_path(&cli.output)?;

    let buffer = bandlimit::io::read_audio_file(&cli.input)?;
    eprintln!(
        "Input: {} frames, {} Hz, {} ch, {:.2}s",
        buffer.num_frames(),
        buffer.sample_rate,
        buffer.channels,
        buffer.duration_secs()
    );
    if buffer.channels > 1 {
        eprintln!("Using channel 0 of {}", buffer.channels);
    }

    let params = ResampleParams::new(buffer.sample_rate, cli.rate)?.with_threads(0);
    let start = Instant::now();
    let output = bandlimit::resample_buffer(&buffer, &params)?;
    let elapsed = start.elapsed();

    bandlimit::io::write_audio_file(&cli.output, &output)?;
    eprintln!(
        "Output: {} frames, {} Hz, {:.2}s ({:.1} ms)",
        output.num_frames(),
        output.sample_rate,
        output.duration_secs(),
        elapsed.as_secs_f64() * 1000.0
    );
    eprintln!("Wrote {}", cli.output);
    Ok(())
}

/// Splits `args` into [`CliArgs`]. The program name in `args[0]` only
/// feeds the usage message.
fn parse_args(args: &[String]) -> Result<CliArgs, ResampleError> {
    let program = args
        .first()
        .map(|p| program_name(p))
        .unwrap_or_else(|| "bandlimit-cli".to_string());

    if args.len() != 4 {
        return Err(ResampleError::Usage(format!("{} input rate output", program)));
    }

    Ok(CliArgs {
        rate: parse_rate(&args[2])?,
        input: args[1].clone(),
        output: args[3].clone(),
    })
}

fn program_name(arg0: &str) -> String {
    Path::new(arg0)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(arg0)
        .to_string()
}

/// Parses an output rate in `[1, i32::MAX]`.
///
/// Leading whitespace and a sign are accepted; anything else that is not a
/// decimal integer is invalid.
fn parse_rate(s: &str) -> Result<u32, ResampleError> {
    let value = match s.trim_start().parse::<i64>() {
        Ok(v) => v,
        Err(e) => {
            let reason = match e.kind() {
                IntErrorKind::PosOverflow => "too large",
                IntErrorKind::NegOverflow => "too small",
                _ => "invalid",
            };
            return Err(ResampleError::InvalidRate(format!("{}: {}", reason, s)));
        }
    };
    if value < 1 {
        return Err(ResampleError::InvalidRate(format!("too small: {}", s)));
    }
    if value > MAX_RATE {
        return Err(ResampleError::InvalidRate(format!("too large: {}", s)));
    }
    Ok(value as u32)
}
