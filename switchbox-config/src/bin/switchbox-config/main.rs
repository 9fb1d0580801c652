use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::{
    fs,
    path::{Path, PathBuf},
    process,
};
use switchbox_config::{
    bytes_to_words, compiler::LayoutConfig, pretty_compile, words_to_bytes, words_to_rust,
};

/// Compile and check switchbox button layouts
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a layout description for errors
    Validate(ValidateArgs),
    /// Compile a layout description to its binary form
    Compile(CompileArgs),
    /// Convert a binary layout back to a layout description
    Decompile(DecompileArgs),
}

#[derive(Args)]
struct ValidateArgs {
    /// layout description file
    file: PathBuf,
}

#[derive(Args)]
struct CompileArgs {
    /// layout description file
    file: PathBuf,
    /// Write to this file instead of stdout
    #[clap(long, short)]
    output: Option<PathBuf>,
    /// Emit a Rust constant instead of little endian binary
    #[clap(long)]
    rust: bool,
}

#[derive(Args)]
struct DecompileArgs {
    /// binary layout file
    file: PathBuf,
}

fn compile_file(file: &Path) -> anyhow::Result<LayoutConfig> {
    let src = fs::read_to_string(file)
        .with_context(|| format!("Failed to read \"{}\"", file.display()))?;
    match pretty_compile(file, &src) {
        Ok(config) => {
            log::info!(
                "{}: {} buttons, scan length {}, {} outputs",
                file.display(),
                config.units.len(),
                config.scan_len,
                config.output_count
            );
            Ok(config)
        }
        Err(err) => match err.line_col(&src) {
            Some((line, col)) => bail!(
                "Failed to compile \"{}\"!\n    {}:{}: {}",
                file.display(),
                line,
                col,
                err.message
            ),
            None => bail!("Failed to compile \"{}\"!\n    {}", file.display(), err),
        },
    }
}

fn validate(args: &ValidateArgs) -> anyhow::Result<()> {
    compile_file(&args.file)?;
    Ok(())
}

fn compile(args: &CompileArgs) -> anyhow::Result<()> {
    let config = compile_file(&args.file)?;
    let words = config.serialize();

    let bytes = if args.rust {
        words_to_rust("LAYOUT", &words).into_bytes()
    } else {
        words_to_bytes(&words)
    };

    match &args.output {
        Some(path) => {
            fs::write(path, bytes)
                .with_context(|| format!("Failed to write \"{}\"", path.display()))?;
            log::info!("wrote {} words to {}", words.len(), path.display());
        }
        None if args.rust => print!("{}", String::from_utf8_lossy(&bytes)),
        None => {
            let text: Vec<String> = words.iter().map(|w| format!("{w:04x}")).collect();
            println!("{}", text.join(" "));
        }
    }
    Ok(())
}

fn decompile(args: &DecompileArgs) -> anyhow::Result<String> {
    let file = &args.file;
    let bytes =
        fs::read(file).with_context(|| format!("Failed to read \"{}\"", file.display()))?;
    let config = LayoutConfig::deserialize(&bytes_to_words(&bytes)?)
        .with_context(|| format!("Invalid layout \"{}\"", file.display()))?;
    Ok(config.to_string())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Validate(args) => validate(args),
        Commands::Compile(args) => compile(args),
        Commands::Decompile(args) => {
            print!("{}", decompile(args)?);
            Ok(())
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("{:#}", err);
        process::exit(1);
    };
}
