use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use spiegel::commands;
use spiegel::output::{print_error, Output, OutputFormat};

#[derive(Parser)]
#[command(name = "spiegel")]
#[command(about = "Publish a local directory to a git remote as a new branch or an overwritten default branch")]
#[command(version = env!("SPIEGEL_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a directory to a remote repository
    Publish {
        /// Directory whose contents become the branch content
        source: PathBuf,

        /// Remote repository URL or path (default: `remote` from the config file)
        #[arg(short, long)]
        remote: Option<String>,

        /// Branch to create (default: export-from-local-<timestamp>)
        #[arg(short, long)]
        branch: Option<String>,

        /// Force-push over the remote's default branch (asks for confirmation)
        #[arg(long)]
        overwrite_default: bool,

        /// Keep the ephemeral clone after the run
        #[arg(long)]
        keep_clone: bool,

        /// Config file (default: <SOURCE>/.spiegel.yaml)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Write a default .spiegel.yaml
    Init {
        /// Directory to write the config into (default: current directory)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Default remote to record in the config
        #[arg(short, long)]
        remote: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let out = Output::new(format, cli.verbose);

    match run(cli, &out) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, out: &Output) -> anyhow::Result<u8> {
    match cli.command {
        Commands::Publish {
            source,
            remote,
            branch,
            overwrite_default,
            keep_clone,
            config,
        } => {
            let opts = commands::publish::PublishOptions {
                source,
                remote,
                branch,
                overwrite_default,
                keep_clone,
                config,
            };
            let result = commands::publish(opts, out)?;
            Ok(result.exit_code())
        }

        Commands::Init {
            path,
            remote,
            force,
        } => {
            let opts = commands::init::InitOptions {
                path,
                remote,
                force,
            };
            commands::init(opts, out)?;
            Ok(0)
        }

        Commands::Completion { shell } => {
            generate_completions(shell);
            Ok(0)
        }
    }
}

fn generate_completions(shell: Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
