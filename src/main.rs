//! @ai:module:intent CLI entry point: list marks, step between them, pick one interactively, show counts
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on commands, terminal, project, presentation, status, config

use clap::{Parser, Subcommand, ValueEnum};
use markjump::commands::{execute, Command, CommandContext, CommandOutcome};
use markjump::config::{Config, ConfigSource, FileConfigSource, StaticConfig, Theme};
use markjump::navigation::no_marks_message;
use markjump::presentation::{self, OutputFormat, PresentationOptions};
use markjump::terminal::{location_arg, LinePicker, TerminalHost};
use markjump::{
    scan, CategoryFilter, ClassifierSet, FsReader, MarkKind, Position, ProjectScanner, ScanMode,
    StatusTracker, TextDocument, WalkDirLister,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

type Project = ProjectScanner<WalkDirLister, FsReader>;

#[derive(Parser)]
#[command(name = "markjump")]
#[command(author, version, about = "Find section, TODO and note marks and jump between them")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "markjump.toml")]
    config: PathBuf,

    /// Editor theme, used to pick the highlight colour
    #[arg(long, global = true, value_enum, default_value = "dark")]
    theme: ThemeArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List marks in a file, or in every file under a directory
    List {
        /// File or directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only these categories (section, todo, note); repeatable
        #[arg(short = 'c', long = "category")]
        categories: Vec<MarkKind>,

        /// With a file path, also list project marks from the current directory
        /// (implied when show_project_marks is set)
        #[arg(long)]
        project: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print the next mark after a line, wrapping to the top
    Next {
        file: PathBuf,

        /// 1-based cursor line
        #[arg(long, short, default_value = "1")]
        line: usize,

        #[arg(short = 'c', long = "category")]
        categories: Vec<MarkKind>,
    },

    /// Print the previous mark before a line, wrapping to the bottom
    Prev {
        file: PathBuf,

        /// 1-based cursor line
        #[arg(long, short, default_value = "1")]
        line: usize,

        #[arg(short = 'c', long = "category")]
        categories: Vec<MarkKind>,
    },

    /// Pick a mark interactively from stdin and print its location
    Jump {
        /// Active file; without it the whole project is offered
        file: Option<PathBuf>,

        /// Include project marks alongside the file's
        #[arg(long)]
        project: bool,

        /// 1-based cursor line, used to preselect the nearest mark
        #[arg(long, short, default_value = "1")]
        line: usize,

        #[arg(short = 'c', long = "category")]
        categories: Vec<MarkKind>,
    },

    /// Show mark counts for a file
    Status {
        file: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Write the default configuration
    Init {
        #[arg(long, short, default_value = "markjump.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
}

impl From<ThemeArg> for Theme {
    fn from(t: ThemeArg) -> Self {
        match t {
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Light => Theme::Light,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("markjump=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = FileConfigSource::new(&cli.config);

    match run(cli.command, &source, cli.theme.into()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(command: Commands, source: &FileConfigSource, theme: Theme) -> markjump::Result<ExitCode> {
    match command {
        Commands::List {
            path,
            categories,
            project,
            format,
        } => {
            let config = with_project(source.load()?, project || path.is_dir());
            let filter = CategoryFilter::of(categories);
            let classifiers = ClassifierSet::from_config(&config, &filter);
            if classifiers.is_empty() {
                eprintln!("No mark category is enabled");
                return Ok(ExitCode::from(1));
            }

            let marks = if path.is_dir() {
                project_at(&path)
                    .scan(&config.project, &classifiers, None)
                    .await
            } else {
                let doc = TextDocument::open(&path).await?;
                let mut marks = scan(&doc, &classifiers, ScanMode::Full);
                if config.show_project_marks {
                    marks.extend(
                        project_at(Path::new("."))
                            .scan(&config.project, &classifiers, Some(path.as_path()))
                            .await,
                    );
                }
                marks
            };

            if marks.is_empty() {
                eprintln!("{}", no_marks_message(&filter));
                return Ok(ExitCode::from(1));
            }
            let options = PresentationOptions::from(&config);
            let rendered = presentation::format_marks(&marks, format.into(), &options);
            println!("{}", rendered.trim_end());
            Ok(ExitCode::SUCCESS)
        }

        Commands::Next {
            file,
            line,
            categories,
        } => step(Command::JumpToNext(CategoryFilter::of(categories)), &file, line, source).await,

        Commands::Prev {
            file,
            line,
            categories,
        } => {
            step(Command::JumpToPrevious(CategoryFilter::of(categories)), &file, line, source).await
        }

        Commands::Jump {
            file,
            project,
            line,
            categories,
        } => {
            let filter = CategoryFilter::of(categories);
            let file_less = file.is_none();
            let (command, host) = match file {
                Some(file) => {
                    let doc = TextDocument::open(&file).await?;
                    let cursor = Position::new(line.saturating_sub(1), 0);
                    let command = if project {
                        Command::JumpToMarks(filter)
                    } else {
                        Command::JumpToEditorMarks(filter)
                    };
                    (command, TerminalHost::with_document(doc, cursor, std::io::stderr()))
                }
                None => (
                    Command::JumpToProjectMarks(filter),
                    TerminalHost::empty(std::io::stderr()),
                ),
            };
            let mut host = host.with_theme(theme);
            let config = StaticConfig(with_project(source.load()?, project || file_less));

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut picker = LinePicker::new(stdin, std::io::stderr());
            let scanner = project_at(Path::new("."));
            let mut ctx = CommandContext {
                host: &mut host,
                picker: &mut picker,
                project: Some(&scanner),
                config: &config,
            };

            let outcome = execute(&command, &mut ctx).await?;
            Ok(match outcome {
                CommandOutcome::Selected(mark) => {
                    println!("{}", location_arg(&mark.location().document, host.cursor_position()));
                    ExitCode::SUCCESS
                }
                other => report(&other),
            })
        }

        Commands::Status { file, format } => {
            let config = source.load()?;
            let doc = TextDocument::open(&file).await?;
            let mut tracker = StatusTracker::new(&config);
            let summary = *tracker
                .refresh(Some(&doc), Some(&project_at(Path::new("."))), &config)
                .await;

            match format {
                Format::Text => {
                    if let Some(text) = tracker.text() {
                        println!("{}", text);
                    }
                }
                Format::Json => println!("{}", presentation::to_json(&summary, false)),
                Format::JsonPretty => println!("{}", presentation::to_json(&summary, true)),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Init { output, force } => {
            if output.exists() && !force {
                eprintln!("{} already exists; pass --force to overwrite", output.display());
                return Ok(ExitCode::from(2));
            }
            Config::default().save(&output)?;
            println!("Wrote {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// @ai:intent A project named on the command line turns project marks on for this run
fn with_project(config: Config, requested: bool) -> Config {
    Config {
        show_project_marks: config.show_project_marks || requested,
        ..config
    }
}

fn project_at(root: &Path) -> Project {
    ProjectScanner::new(WalkDirLister::new(root), FsReader)
}

/// @ai:intent Run next/previous against a file and print where the cursor lands
async fn step(
    command: Command,
    file: &Path,
    line: usize,
    source: &FileConfigSource,
) -> markjump::Result<ExitCode> {
    let doc = TextDocument::open(file).await?;
    let cursor = Position::new(line.saturating_sub(1), 0);
    let mut host = TerminalHost::with_document(doc, cursor, std::io::sink());
    let mut picker = LinePicker::new(tokio::io::empty(), std::io::sink());
    let mut ctx = CommandContext {
        host: &mut host,
        picker: &mut picker,
        project: None::<&Project>,
        config: source,
    };

    let outcome = execute(&command, &mut ctx).await?;
    Ok(match outcome {
        CommandOutcome::Moved(mark) => {
            println!("{}", location_arg(&mark.location().document, host.cursor_position()));
            ExitCode::SUCCESS
        }
        other => report(&other),
    })
}

fn report(outcome: &CommandOutcome) -> ExitCode {
    match outcome {
        CommandOutcome::Cancelled => ExitCode::SUCCESS,
        CommandOutcome::NoDocument => {
            eprintln!("Error: no document to scan");
            ExitCode::from(2)
        }
        other => {
            if let Some(message) = other.message() {
                eprintln!("{}", message);
            }
            ExitCode::from(1)
        }
    }
}
