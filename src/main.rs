//! bindfmt CLI - render binding templates against a states file

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{Map, Value as Json};

use bindfmt::{
    BindError, BindingParser, CalendarLocale, EngineConfig, FixSuggestion, FormatRequest,
    FormattingEngine, MomentCalendar, TokenParser,
};

#[derive(Parser)]
#[command(name = "bindfmt")]
#[command(about = "Resolve live-state bindings in display templates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template
    Render {
        /// Template text, e.g. "{hall.temp;round(1)} °C"
        template: String,

        /// JSON object of state id → value
        #[arg(short, long)]
        states: Option<String>,

        /// Engine config (TOML)
        #[arg(short, long)]
        config: Option<String>,

        /// Current view name
        #[arg(long, default_value = "")]
        view: String,

        /// Current widget id
        #[arg(long, default_value = "")]
        widget: String,

        /// Bypass the binding cache
        #[arg(long)]
        edit: bool,
    },

    /// Print the bindings of a template as JSON
    Parse {
        template: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            template,
            states,
            config,
            view,
            widget,
            edit,
        } => render(&template, states.as_deref(), config.as_deref(), &view, &widget, edit),
        Commands::Parse { template } => parse(&template),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn render(
    template: &str,
    states: Option<&str>,
    config: Option<&str>,
    view: &str,
    widget: &str,
    edit: bool,
) -> Result<(), BindError> {
    let config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let states = match states {
        Some(path) => load_states(Path::new(path))?,
        None => Map::new(),
    };

    let calendar = MomentCalendar::new(CalendarLocale::from_language(&config.language), config.zone()?);
    let engine = FormattingEngine::new(&config, Arc::new(states))?.with_calendar(Arc::new(calendar));
    engine.set_edit_mode(edit);

    println!("{}", engine.format(template, &FormatRequest::new(view, widget)));
    Ok(())
}

fn parse(template: &str) -> Result<(), BindError> {
    let bindings = TokenParser::default().parse(template).unwrap_or_default();
    println!("{}", serde_json::to_string_pretty(&bindings)?);
    Ok(())
}

fn load_states(path: &Path) -> Result<Map<String, Json>, BindError> {
    let text = std::fs::read_to_string(path).map_err(|source| BindError::Io {
        path: path.display().to_string(),
        source,
    })?;
    match serde_json::from_str::<Json>(&text)? {
        Json::Object(map) => Ok(map),
        other => Err(BindError::StatesNotObject {
            found: json_kind(&other).to_string(),
        }),
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
