use clap::{CommandFactory, Parser, error::ErrorKind};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

use vendorlink::{
    commands,
    config::{self, Config, DEFAULT_DPKG_QUERY},
    layout::{Layout, cuda, mkl_dnn},
    logging,
    package::Dpkg,
    runtime::RealRuntime,
};

/// Missing or rejected arguments
const EXIT_USAGE: u8 = 1;
/// Any failure once the run has started
const EXIT_FATAL: u8 = 2;

/// vendorlink - build vendor SDK directory trees out of installed packages
///
/// Creates a tree of symlinks that mirrors the layout a vendor SDK installer
/// would produce, pointing every entry at the file dpkg installed.
///
/// Examples:
///   vendorlink cuda /opt/cuda          # CUDA toolkit layout
///   vendorlink cuda /opt/cuda verbose  # same, with debug output
///   vendorlink mkl-dnn /opt/mkl-dnn    # MKL-DNN layout
#[derive(Parser, Debug)]
#[command(author, version = env!("VENDORLINK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// dpkg-query executable used to inspect installed packages
    #[arg(
        long = "dpkg-query",
        env = "VENDORLINK_DPKG_QUERY",
        value_name = "PATH",
        default_value = DEFAULT_DPKG_QUERY,
        global = true
    )]
    dpkg_query: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Build the CUDA toolkit layout (lib64, include, bin, extras/CUPTI, nvvm)
    Cuda(CudaArgs),

    /// Build the MKL-DNN layout (lib, include, license.txt)
    MklDnn(MklDnnArgs),

    /// Build a layout described by a JSON file
    Build(BuildArgs),

    /// Print a built-in layout as JSON
    ShowLayout(ShowLayoutArgs),
}

#[derive(clap::Args, Debug)]
struct CudaArgs {
    /// Output directory; must not exist
    #[arg(value_name = "OUTPUT", value_parser = config::parse_new_output)]
    output: PathBuf,

    /// Any value enables debug output
    #[arg(value_name = "VERBOSE")]
    verbose: Option<String>,
}

#[derive(clap::Args, Debug)]
struct MklDnnArgs {
    /// Output directory; must not exist
    #[arg(value_name = "OUTPUT", value_parser = config::parse_new_output)]
    output: PathBuf,
}

#[derive(clap::Args, Debug)]
struct BuildArgs {
    /// Layout file, in the format printed by `show-layout`
    #[arg(long, value_name = "FILE")]
    layout: PathBuf,

    /// Output directory; must not exist
    #[arg(value_name = "OUTPUT", value_parser = config::parse_new_output)]
    output: PathBuf,

    /// Show debug output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::Args, Debug)]
struct ShowLayoutArgs {
    /// Built-in layout name
    #[arg(value_name = "NAME", value_parser = Layout::BUILTIN)]
    name: String,
}

fn parse() -> Result<Cli, ExitCode> {
    Cli::try_parse().map_err(|e| {
        let _ = e.print();
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
            _ => ExitCode::from(EXIT_USAGE),
        }
    })
}

fn main() -> ExitCode {
    let cli = match parse() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    let runtime = RealRuntime;

    let (layout, output, verbose) = match cli.command {
        Commands::ShowLayout(args) => {
            return match commands::show_layout(&args.name) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    let _ = Cli::command()
                        .error(ErrorKind::InvalidValue, format!("{:#}", e))
                        .print();
                    ExitCode::from(EXIT_USAGE)
                }
            };
        }
        Commands::Cuda(args) => (Ok(cuda::layout()), args.output, args.verbose.is_some()),
        Commands::MklDnn(args) => (Ok(mkl_dnn::layout()), args.output, false),
        Commands::Build(args) => (Layout::load(&runtime, &args.layout), args.output, args.verbose),
    };

    let layout_name = match &layout {
        Ok(layout) => layout.name.clone(),
        Err(_) => "build".to_string(),
    };
    let config = Config::new(&layout_name, output, verbose, cli.dpkg_query);
    logging::init(&config.tool, config.verbose);

    let db = Dpkg::new(&config.dpkg_query);
    let result = layout.and_then(|layout| commands::build(&runtime, &db, &config, &layout));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
