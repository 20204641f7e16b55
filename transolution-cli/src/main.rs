use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use transolution_cli::{
    Config, LogConfig,
    convert::{ConvertOptions, run_convert_command},
    edit::{
        AddFileOptions, FileRole, run_add_file_command, run_add_project_command,
        run_new_command, run_remove_file_command, run_remove_project_command,
    },
    init_logging,
    stats::run_stats_command,
    validation::run_validate_command,
    view::{run_show_command, run_view_command},
};

#[derive(Parser, Debug)]
#[command(name = "transolution", author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./transolution.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty solution file.
    New {
        /// Solution file to create
        output: String,
        /// Solution name (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "")]
        comment: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Add an empty project to a solution.
    AddProject { solution: String, name: String },

    /// Remove a project from a solution.
    RemoveProject { solution: String, name: String },

    /// Set the source file of a project, or add a target file to it.
    AddFile {
        solution: String,
        /// Project name
        #[arg(short, long)]
        project: String,
        /// File path; targets may give --culture instead
        path: Option<String>,
        /// Set the project's source file instead of adding a target
        #[arg(long)]
        source: bool,
        /// Derive the target path from the source path and this culture
        #[arg(long, conflicts_with = "source")]
        culture: Option<String>,
        /// Format tag (defaults to the config, then the file extension)
        #[arg(short, long)]
        format: Option<String>,
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Remove a target file (or, with --source, the source file) from a project.
    RemoveFile {
        solution: String,
        #[arg(short, long)]
        project: String,
        path: String,
        #[arg(long)]
        source: bool,
    },

    /// Print the solution tree.
    Show {
        solution: String,
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a solution for structural problems.
    Validate {
        solution: String,
        /// Also require every referenced file to exist
        #[arg(long)]
        check_files: bool,
        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },

    /// Count projects, files, formats and cultures.
    Stats {
        solution: String,
        /// Load every file and report key coverage per target
        #[arg(long)]
        coverage: bool,
        #[arg(long)]
        json: bool,
    },

    /// View the entries of a resource file.
    View {
        /// The input file to view
        #[arg(short, long)]
        input: String,
        /// Format tag (defaults to the file extension)
        #[arg(short, long)]
        format: Option<String>,
        /// Display full value without truncation
        #[arg(long)]
        full: bool,
    },

    /// Convert a resource file between formats.
    Convert {
        /// The input file to process
        #[arg(short, long)]
        input: String,
        /// The output file to write the results to
        #[arg(short, long)]
        output: String,
        #[arg(long)]
        input_format: Option<String>,
        #[arg(long)]
        output_format: Option<String>,
    },

    /// Print shell completions.
    Completions { shell: Shell },
}

fn main() {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).unwrap_or_else(|e| exit_with(&e));
    let log_config = LogConfig::from_verbosity(args.verbose, config.log_level.as_deref())
        .unwrap_or_else(|e| exit_with(&e));
    if let Err(e) = init_logging(&log_config) {
        exit_with(&e);
    }

    let result = match args.commands {
        Commands::New {
            output,
            name,
            comment,
            force,
        } => run_new_command(&output, name, comment, force),
        Commands::AddProject { solution, name } => run_add_project_command(&solution, name),
        Commands::RemoveProject { solution, name } => run_remove_project_command(&solution, &name),
        Commands::AddFile {
            solution,
            project,
            path,
            source,
            culture,
            format,
            comment,
        } => {
            let role = if source {
                FileRole::Source
            } else {
                FileRole::Target
            };
            let options = AddFileOptions {
                path,
                culture,
                format,
                comment,
            };
            run_add_file_command(
                &solution,
                &project,
                role,
                options,
                config.default_format.as_deref(),
            )
        }
        Commands::RemoveFile {
            solution,
            project,
            path,
            source,
        } => {
            let role = if source {
                FileRole::Source
            } else {
                FileRole::Target
            };
            run_remove_file_command(&solution, &project, &path, role)
        }
        Commands::Show { solution, json } => run_show_command(&solution, json),
        Commands::Validate {
            solution,
            check_files,
            strict,
            json,
        } => run_validate_command(&solution, check_files, strict, json),
        Commands::Stats {
            solution,
            coverage,
            json,
        } => run_stats_command(&solution, coverage, json),
        Commands::View {
            input,
            format,
            full,
        } => run_view_command(&input, format.as_deref(), full),
        Commands::Convert {
            input,
            output,
            input_format,
            output_format,
        } => {
            let options = ConvertOptions {
                input_format,
                output_format,
            };
            run_convert_command(&input, &output, &options)
        }
        Commands::Completions { shell } => {
            let mut command = Args::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        exit_with(&e);
    }
}

fn exit_with(message: &str) -> ! {
    eprintln!("❌ {}", message);
    std::process::exit(1);
}
