//! Command-line interface implementation

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{load_config, Category};
use crate::outputs::OutputRegistry;
use crate::registry::TaskSet;
use crate::reload::{run_serve, ConsoleReload};
use crate::runner::{RunOptions, Runner, Selection, TaskStatus};
use crate::watch::run_watch;

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_CONFIG: u8 = 2;

/// assetpipe - declarative build orchestrator for front-end assets
#[derive(Parser)]
#[command(name = "assetpipe")]
#[command(about = "Declarative build orchestrator for front-end assets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub options: GlobalOptions,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the configured tasks once (the default)
    Build,
    /// Build, then rebuild affected tasks on file changes
    Watch,
    /// Watch with the live-reload bridge attached
    Serve,
}

/// Options shared by every command.
#[derive(Args, Clone)]
pub struct GlobalOptions {
    /// Path to assetpipe.toml (default: walk up from the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment override profile (e.g. prod)
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// Orchestrator progress logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all deletion preambles
    #[arg(long, global = true)]
    pub no_delete: bool,

    /// Number of parallel workers (default: available parallelism)
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Only run stylesheet tasks
    #[arg(long, global = true)]
    pub sass: bool,

    /// Only run script tasks
    #[arg(long, global = true)]
    pub js: bool,

    /// Only run image tasks
    #[arg(long, global = true)]
    pub image: bool,

    /// Only run view tasks
    #[arg(long, global = true)]
    pub view: bool,

    /// Only run copy tasks
    #[arg(long, global = true)]
    pub copy: bool,
}

impl GlobalOptions {
    /// The task selection these flags describe.
    pub fn selection(&self) -> Selection {
        let mut prefixes = Vec::new();
        if self.sass {
            prefixes.push(Category::Sass);
        }
        if self.js {
            prefixes.push(Category::Js);
        }
        if self.image {
            prefixes.push(Category::Image);
        }
        if self.view {
            prefixes.push(Category::View);
        }
        if self.copy {
            prefixes.push(Category::Copy);
        }
        Selection::categories(prefixes)
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.options;

    let loaded = match load_config(options.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let tasks = match TaskSet::register(&loaded.raw, options.env.as_deref()) {
        Ok(tasks) => tasks,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    if tasks.is_empty() {
        println!("No tasks configured; nothing to do.");
        return ExitCode::from(EXIT_SUCCESS);
    }

    let mut run_options = RunOptions::new(&loaded.root);
    run_options.no_delete = options.no_delete;
    run_options.verbose = options.verbose;
    if let Some(jobs) = options.jobs {
        run_options.jobs = jobs.max(1);
    }
    let selection = options.selection();

    match cli.command.unwrap_or(Commands::Build) {
        Commands::Build => run_build(&tasks, run_options, &selection),
        Commands::Watch => match run_watch(&tasks, run_options, &selection, None) {
            Ok(()) => ExitCode::from(EXIT_SUCCESS),
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        },
        Commands::Serve => {
            let serve = loaded.raw.serve.clone();
            match run_serve(&tasks, run_options, &selection, &serve, Box::new(ConsoleReload)) {
                Ok(()) => ExitCode::from(EXIT_SUCCESS),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(EXIT_ERROR)
                }
            }
        }
    }
}

/// Execute the build command
fn run_build(tasks: &TaskSet, options: RunOptions, selection: &Selection) -> ExitCode {
    let runner = Runner::new(tasks, options);
    let mut outputs = OutputRegistry::new();
    let result = runner.run_build(selection, &mut outputs);

    for task in &result.tasks {
        if let TaskStatus::Failed(message) = &task.status {
            eprintln!("Error: {}: {}", task.task, message);
        }
    }
    println!("Build: {}", result.summary());

    if result.is_success() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_command_is_build() {
        let cli = parse(&["assetpipe"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_category_flags_build_selection() {
        let cli = parse(&["assetpipe", "build", "--js", "--sass"]);
        let selection = cli.options.selection();
        let names = vec!["sass-1", "js-1", "image-1"];
        assert_eq!(selection.eligible(&names), vec!["sass-1", "js-1"]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["assetpipe", "watch", "--env", "prod", "--no-delete", "-j", "2"]);
        assert!(matches!(cli.command, Some(Commands::Watch)));
        assert_eq!(cli.options.env.as_deref(), Some("prod"));
        assert!(cli.options.no_delete);
        assert_eq!(cli.options.jobs, Some(2));
    }

    #[test]
    fn test_no_flags_selects_everything() {
        let cli = parse(&["assetpipe", "build"]);
        assert!(cli.options.selection().is_all());
    }
}
