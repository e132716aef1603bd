use clap::Parser;
use gjs_bundle_rs::{BuildOutcome, BundleConfig, BundleOrchestrator, ToolchainConfig};
use std::io::Write;
use std::path::PathBuf;

/// gjs-bundle: A utility for bundling GJS applications into a single ES module
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the application entry file
    pub entry: PathBuf,

    /// Path to output bundle file to be created
    #[clap(short, long)]
    pub outfile: PathBuf,

    /// Path to a tsconfig.json whose compilerOptions control transpilation
    #[clap(long)]
    pub tsconfig: Option<PathBuf>,

    /// Inline tsconfig JSON. Its compilerOptions override those of --tsconfig
    #[clap(long)]
    pub tsconfig_raw: Option<String>,

    /// Minify the output bundle
    #[clap(long)]
    pub minify: bool,

    /// Style-sheet compiler invoked for .scss imports
    #[clap(long, default_value = "sass")]
    pub sass_bin: String,

    /// UI-markup compiler invoked for .blp imports
    #[clap(long, default_value = "blueprint-compiler")]
    pub blueprint_compiler_bin: String,

    /// Print every file read for the build to stdout, one per line
    #[clap(long)]
    pub print_inputs: bool,
}

#[tokio::main]
async fn main() {
    let args: Args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = BundleConfig {
        entry_path: args.entry,
        output_path: args.outfile,
        tsconfig: args.tsconfig,
        tsconfig_raw: args.tsconfig_raw,
        minify: args.minify,
        toolchain: ToolchainConfig {
            sass: args.sass_bin,
            blueprint_compiler: args.blueprint_compiler_bin,
        },
    };

    let outcome = BundleOrchestrator::new(config).build().await;
    match &outcome {
        BuildOutcome::Written(artifact) => {
            if args.print_inputs {
                let mut stdout = std::io::stdout().lock();
                for input in &artifact.inputs {
                    if let Err(err) = writeln!(stdout, "{}", input.display()) {
                        log::warn!("Failed to print inputs: {err}");
                        break;
                    }
                }
            }
        }
        BuildOutcome::Failed(failure) => {
            for message in failure.messages() {
                log::error!("{message}");
            }
        }
    }
    std::process::exit(outcome.exit_code());
}
