use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use helpspec_core::{DefaultValueRule, ParserConfig, PropertyDialect};
use helpspec_parser::output::{OutputFormat, format_document};
use helpspec_parser::{HelpDocument, ModelResolver, parse_help_file, parse_help_text};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "helpspec")]
#[command(about = "Parse annotated help files and render them through templates")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    /// Log deduction steps to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a help file and print the deduced model.
    Parse(ParseArgs),
    /// Print the help text with every definition replaced by its visible text.
    Text(InputArgs),
    /// Check one or more help files and report the first error of each.
    Check(CheckArgs),
    /// Render a template against a parsed help file.
    Render(RenderArgs),
    /// Write the effective parser configuration as YAML.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// YAML parser configuration; command-line switches override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Property alias table.
    #[arg(long, global = true)]
    dialect: Option<PropertyDialect>,
    /// When an explicit default value is rejected.
    #[arg(long, global = true)]
    default_rule: Option<DefaultValueRule>,
    /// Fail when the help file has no help option.
    #[arg(long, global = true)]
    require_help: bool,
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Help file to read, or `-` for stdin.
    input: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Help files to check.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Template file.
    #[arg(long)]
    template: PathBuf,
    /// Write the result here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Where to write the configuration.
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(&cli.config).and_then(|config| match cli.command {
        Command::Parse(args) => run_parse(args, &config),
        Command::Text(args) => run_text(args, &config),
        Command::Check(args) => run_check(args, &config),
        Command::Render(args) => run_render(args, &config),
        Command::InitConfig(args) => run_init_config(args, &config),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs to stderr; `RUST_LOG` overrides the level picked by `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ConfigArgs) -> Result<ParserConfig, String> {
    let mut config = match &args.config {
        Some(path) => ParserConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => ParserConfig::default(),
    };
    if let Some(dialect) = args.dialect {
        config.dialect = dialect;
    }
    if let Some(rule) = args.default_rule {
        config.default_rule = rule;
    }
    if args.require_help {
        config.require_help_option = true;
    }
    debug!(?config, "effective configuration");
    Ok(config)
}

fn load_document(input: &Path, config: &ParserConfig) -> Result<HelpDocument, String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        parse_help_text(&text, config).map_err(|err| err.to_string())
    } else {
        parse_help_file(input, config).map_err(|err| err.to_string())
    }
}

fn run_parse(args: ParseArgs, config: &ParserConfig) -> Result<(), String> {
    let document = load_document(&args.input.input, config)?;
    let output = format_document(&document, args.format)?;
    println!("{}", output.trim_end());
    Ok(())
}

fn run_text(args: InputArgs, config: &ParserConfig) -> Result<(), String> {
    let document = load_document(&args.input, config)?;
    print!("{}", document.text);
    Ok(())
}

fn run_check(args: CheckArgs, config: &ParserConfig) -> Result<(), String> {
    let mut failures = 0;
    for input in &args.inputs {
        match parse_help_file(input, config) {
            Ok(document) => println!(
                "ok: {} ({} members)",
                input.display(),
                document.members.len()
            ),
            Err(err) => {
                eprintln!("{err}");
                failures += 1;
            }
        }
    }
    if failures > 0 {
        return Err(format!("{failures} of {} help files failed", args.inputs.len()));
    }
    Ok(())
}

fn run_render(args: RenderArgs, config: &ParserConfig) -> Result<(), String> {
    let document = load_document(&args.input.input, config)?;
    let template = fs::read_to_string(&args.template)
        .map_err(|err| format!("Failed to read '{}': {err}", args.template.display()))?;
    let rendered = helpspec_template::render(&template, &ModelResolver::new(&document))
        .map_err(|err| format!("{}: {err}", args.template.display()))?;

    match args.output {
        Some(path) => {
            fs::write(&path, format!("{rendered}\n"))
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            debug!(output = %path.display(), "wrote rendered template");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn run_init_config(args: InitConfigArgs, config: &ParserConfig) -> Result<(), String> {
    config
        .save(&args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;
    println!("wrote {}", args.output.display());
    Ok(())
}
