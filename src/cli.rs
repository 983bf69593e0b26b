// Command-line front end for the shader packer.
//
// One-shot batch tool: read shaders, compress, write the packed blob and
// the generated C artifacts.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueHint};

use crate::io::{self, BuildOptions, OutputPaths};

/// Pack GLSL shaders into a compressed blob with a generated C unpacker.
#[derive(Parser, Debug)]
#[command(
    name = "glslpack",
    version,
    about = "GLSL shader packer",
    arg_required_else_help = true
)]
struct Cli {
    /// Input shader files.
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    shaders: Vec<PathBuf>,

    /// Minimum substring length considered for tokens.
    #[arg(long, default_value_t = 3)]
    min_token_size: usize,

    /// Maximum substring length considered for tokens (0 = unbounded).
    /// A nonzero bound also limits mining to each shader's leading bytes.
    #[arg(long, default_value_t = 0)]
    max_token_size: usize,

    /// Packed blob output path.
    #[arg(short = 'p', long, default_value = "shaders.pack", value_hint = ValueHint::FilePath)]
    output_pack: PathBuf,

    /// Generated header output path.
    #[arg(long, default_value = "unpacker.h", value_hint = ValueHint::FilePath)]
    output_header: PathBuf,

    /// Generated C source output path.
    #[arg(short = 'c', long, default_value = "unpacker.c", value_hint = ValueHint::FilePath)]
    output_source: PathBuf,

    /// Target GLSL version (0 = highest #version found in the inputs).
    #[arg(long, default_value_t = 0)]
    glsl_version: u32,

    /// Omit "core" from the emitted version directive.
    #[arg(long)]
    no_core: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Output build stats as JSON to stderr.
    #[arg(long = "json")]
    json_output: bool,
}

fn build_options(cli: &Cli) -> BuildOptions {
    BuildOptions {
        min_token_size: cli.min_token_size,
        max_token_size: cli.max_token_size,
        glsl_version: cli.glsl_version,
        core_profile: !cli.no_core,
    }
}

fn cmd_build(cli: &Cli) -> i32 {
    if cli.max_token_size != 0 && cli.max_token_size < cli.min_token_size {
        eprintln!("glslpack: --max-token-size must be >= --min-token-size");
        return 1;
    }

    let outputs = OutputPaths {
        pack: cli.output_pack.clone(),
        header: cli.output_header.clone(),
        source: cli.output_source.clone(),
    };

    match io::build_files(&cli.shaders, &outputs, &build_options(cli)) {
        Ok(output) => {
            if cli.json_output {
                let s = &output.stats;
                let json = serde_json::json!({
                    "assets": s.assets,
                    "input_bytes": s.input_bytes,
                    "packed_bytes": s.packed_bytes,
                    "byte_tokens": s.byte_tokens,
                    "offset_tokens": s.offset_tokens,
                    "max_output_size": s.max_output_size,
                });
                eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
            }
            0
        }
        Err(e) => {
            eprintln!("glslpack: {e}");
            1
        }
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("glslpack".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = build_options(&cli);
    }
}

/// Main CLI entry point. Parses arguments via clap, runs the build.
pub fn run() -> ! {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    process::exit(cmd_build(&cli));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
