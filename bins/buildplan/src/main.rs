//! buildplan CLI
//!
//! Validates Android build descriptors and emits build plans for Gradle.

use buildplan_android::descriptor::SigningRegistry;
use buildplan_android::parser::{self, InputFormat, RawConfig};
use buildplan_android::plan::PlanFormat;
use buildplan_android::{pipeline, schema};
use buildplan_cli::output::{self, Status};
use buildplan_core::config::Config;
use buildplan_core::error::exit_codes;
use buildplan_core::{Error, ResultExt};
use buildplan_telemetry::TelemetryConfig;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "buildplan")]
#[command(about = "Validate Android build descriptors and emit build plans")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, env = "BUILDPLAN_CONFIG")]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print errors as JSON reports
    #[arg(long, global = true)]
    json_errors: bool,

    /// Emit log events as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, validate and emit a build plan
    Plan {
        /// Descriptor file (.toml or .json), or - for stdin
        descriptor: PathBuf,
        /// Plan format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
        /// Write the plan to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Descriptor format when it cannot be inferred
        #[arg(long, value_enum)]
        input_format: Option<InputFormatArg>,
    },

    /// Parse and validate a descriptor without emitting a plan
    Check {
        /// Descriptor file (.toml or .json), or - for stdin
        descriptor: PathBuf,
        /// Descriptor format when it cannot be inferred
        #[arg(long, value_enum)]
        input_format: Option<InputFormatArg>,
    },

    /// List recognized descriptor keys
    Keys {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured signing identities
    Identities {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Plan format accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Toml,
    /// Gradle Kotlin DSL fragment
    #[value(alias = "kts")]
    Gradle,
}

impl From<FormatArg> for PlanFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Self::Json,
            FormatArg::Toml => Self::Toml,
            FormatArg::Gradle => Self::Gradle,
        }
    }
}

/// Descriptor syntax accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormatArg {
    Toml,
    Json,
}

impl From<InputFormatArg> for InputFormat {
    fn from(arg: InputFormatArg) -> Self {
        match arg {
            InputFormatArg::Toml => Self::Toml,
            InputFormatArg::Json => Self::Json,
        }
    }
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn main() -> ExitCode {
    // Usage errors exit with FAILURE; clap's default of 2 is the validation code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                exit_codes::FAILURE
            } else {
                exit_codes::SUCCESS
            };
            let _ = e.print();
            return exit(code);
        }
    };

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let telemetry = TelemetryConfig {
        json: cli.log_json,
        ..TelemetryConfig::for_verbosity(cli.verbose, cli.quiet)
    };
    if let Err(e) = buildplan_telemetry::init_with_config(telemetry) {
        Status::warning(&format!("Logging disabled: {e}"));
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            output::report_error(&e, cli.json_errors);
            return exit(e.exit_code());
        }
    };
    if let Some(path) = &config.path {
        tracing::debug!(path = %path.display(), "Loaded configuration");
    }

    let ctx = CliContext {
        quiet: cli.quiet,
        json_errors: cli.json_errors,
    };

    let exit_code = match cli.command {
        Commands::Plan {
            descriptor,
            format,
            output,
            input_format,
        } => run_plan(
            &ctx,
            &config,
            &descriptor,
            format.map(PlanFormat::from),
            output.as_deref(),
            input_format.map(InputFormat::from),
        ),
        Commands::Check {
            descriptor,
            input_format,
        } => run_check(
            &ctx,
            &config,
            &descriptor,
            input_format.map(InputFormat::from),
        ),
        Commands::Keys { json } => run_keys(json),
        Commands::Identities { json } => run_identities(&config, json),
    };

    exit(exit_code)
}

/// Output flags shared by the pipeline commands
struct CliContext {
    quiet: bool,
    json_errors: bool,
}

impl CliContext {
    fn fail(&self, err: &Error) -> i32 {
        output::report_error(err, self.json_errors);
        err.exit_code()
    }
}

fn read_descriptor(
    path: &Path,
    format: Option<InputFormat>,
) -> buildplan_core::Result<RawConfig> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(Error::from)
            .context("<stdin>")?;
        return parser::read_raw(&content, format.unwrap_or(InputFormat::Toml)).context("<stdin>");
    }

    parser::load_raw(path, format)
}

fn run_plan(
    ctx: &CliContext,
    config: &Config,
    descriptor: &Path,
    format: Option<PlanFormat>,
    output_path: Option<&Path>,
    input_format: Option<InputFormat>,
) -> i32 {
    let started = Instant::now();

    let format = match format {
        Some(f) => f,
        None => match config
            .schema
            .general
            .output_format
            .parse::<PlanFormat>()
            .context("[general] output_format")
        {
            Ok(f) => f,
            Err(e) => return ctx.fail(&e),
        },
    };

    let registry = SigningRegistry::from_config(&config.schema.signing);
    let rendered = read_descriptor(descriptor, input_format)
        .and_then(|raw| pipeline::build_plan(&raw, &registry))
        .and_then(|plan| plan.render(format));

    let rendered = match rendered {
        Ok(r) => r,
        Err(e) => return ctx.fail(&e),
    };

    match output_path {
        Some(path) => {
            let written = std::fs::write(path, &rendered)
                .map_err(Error::from)
                .context(format!("writing {}", path.display()));
            if let Err(e) = written {
                return ctx.fail(&e);
            }
            if !ctx.quiet {
                Status::success(&format!(
                    "Wrote {} plan to {} in {}",
                    format,
                    path.display(),
                    output::format_duration(started.elapsed())
                ));
            }
        }
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }

    exit_codes::SUCCESS
}

fn run_check(
    ctx: &CliContext,
    config: &Config,
    descriptor: &Path,
    input_format: Option<InputFormat>,
) -> i32 {
    let registry = SigningRegistry::from_config(&config.schema.signing);

    let validated = match read_descriptor(descriptor, input_format)
        .and_then(|raw| pipeline::check(&raw, &registry))
    {
        Ok(v) => v,
        Err(e) => return ctx.fail(&e),
    };

    if !ctx.quiet {
        let d = validated.descriptor();
        Status::success(&format!(
            "{} is valid: {} {} (SDK {}..{}, compile {}), signed with `{}`, {}",
            descriptor.display(),
            d.application_id,
            d.build_type,
            d.min_sdk,
            d.target_sdk,
            d.compile_sdk,
            validated.signing_identity().name,
            output::format_count(d.dependencies.len(), "dependency", "dependencies")
        ));
    }

    exit_codes::SUCCESS
}

fn run_keys(json: bool) -> i32 {
    let specs = schema::key_specs();

    if json {
        return match serde_json::to_string_pretty(&specs) {
            Ok(out) => {
                println!("{out}");
                exit_codes::SUCCESS
            }
            Err(e) => {
                Status::error(&format!("Failed to serialize schema: {e}"));
                exit_codes::FAILURE
            }
        };
    }

    Status::header("Descriptor keys");
    let width = specs.iter().map(|s| s.key.as_str().len()).max().unwrap_or(0) + 2;
    for spec in &specs {
        let requirement = if spec.required {
            "required".to_string()
        } else {
            format!("default: {}", spec.default.unwrap_or("none"))
        };
        println!(
            "{}{}  [{}]  {}",
            output::pad(spec.key.as_str(), width),
            spec.value_type,
            requirement,
            spec.description
        );
    }

    exit_codes::SUCCESS
}

fn run_identities(config: &Config, json: bool) -> i32 {
    let identities = config.schema.signing.resolved_identities();

    if json {
        let value: Vec<_> = identities
            .iter()
            .map(|i| serde_json::json!({ "name": i.name, "keyRef": i.key_ref }))
            .collect();
        println!("{}", serde_json::Value::Array(value));
        return exit_codes::SUCCESS;
    }

    if identities.is_empty() {
        Status::warning("No signing identities configured");
        return exit_codes::SUCCESS;
    }

    Status::header("Signing identities");
    let width = identities.iter().map(|i| i.name.len()).max().unwrap_or(0) + 2;
    for identity in &identities {
        println!(
            "{}{}",
            output::pad(&identity.name, width),
            identity.expanded_key_ref()
        );
    }

    if config.path.is_none() {
        Status::info("No configuration file found; declare identities in .buildplan.toml");
    }

    exit_codes::SUCCESS
}
