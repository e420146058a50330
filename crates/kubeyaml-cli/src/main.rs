//! kubeyaml CLI - render Jinja2 templates into Kubernetes YAML

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod exit_codes;

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "KUBEYAML_LOG";

#[derive(Parser)]
#[command(name = "kubeyaml")]
#[command(version)]
#[command(about = "Render Jinja2 templates into Kubernetes YAML manifests", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template to stdout or a file
    Render {
        /// Template file
        template: PathBuf,

        /// Values file(s) to merge, in order
        #[arg(short = 'f', long = "values")]
        values: Vec<PathBuf>,

        /// Set values on command line (key=value)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Output file (if not set, outputs to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render undefined variables as empty instead of failing
        #[arg(long)]
        lenient: bool,

        /// Parse the output as YAML documents and print it normalized
        #[arg(long)]
        check: bool,
    },

    /// Re-emit a YAML stream in normalized block style
    Fmt {
        /// YAML file
        file: PathBuf,

        /// Output file (if not set, outputs to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the value at a dotted path
    Get {
        /// YAML file
        file: PathBuf,

        /// Dotted key path (e.g. spec.template.metadata.labels)
        path: String,

        /// Document index in the stream
        #[arg(short, long, default_value_t = 0)]
        document: usize,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        match EnvFilter::try_from_env(LOG_ENV) {
            Ok(filter) => filter,
            Err(_) => return,
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Render {
            template,
            values,
            set,
            output,
            lenient,
            check,
        } => commands::render::run(&template, &values, &set, output.as_deref(), lenient, check),

        Commands::Fmt { file, output } => commands::fmt::run(&file, output.as_deref()),

        Commands::Get {
            file,
            path,
            document,
        } => commands::get::run(&file, &path, document),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
