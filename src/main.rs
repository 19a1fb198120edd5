mod debug_report;

use jsonrouter::{CompiledRules, MatchEngine, RecordBatch, RouterRegistry, RulesConfig, decode_sns_messages};
use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` when set and valid, `warn` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

struct CliConfig {
    rules: PathBuf,
    input: Option<PathBuf>,
    sns: bool,
    json: bool,
    color: bool,
}

fn run(config: &CliConfig) -> jsonrouter::Result<()> {
    let rules = CompiledRules::compile(&RulesConfig::from_path(&config.rules)?)?;

    // Every declared router is replaced by a counter, so nothing leaves the process.
    let mut deliveries: BTreeMap<String, Arc<AtomicUsize>> = BTreeMap::new();
    let mut registry = RouterRegistry::new();
    for name in rules.router_names() {
        let counter = Arc::new(AtomicUsize::new(0));
        let sink = counter.clone();
        registry.register(name, move |_| {
            sink.fetch_add(1, Ordering::Relaxed);
        });
        deliveries.insert(name.to_string(), counter);
    }
    let engine = MatchEngine::from_compiled(rules, registry);

    let mut batch = RecordBatch::from_json_str(&read_input(config.input.as_ref())?)?;
    if config.sns {
        batch = decode_sns_messages(&batch)?;
    }

    let run = engine.route_matches_with_metrics(&batch)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&run.matches)?);
    } else {
        let counts: Vec<(String, usize)> =
            deliveries.iter().map(|(name, counter)| (name.clone(), counter.load(Ordering::Relaxed))).collect();
        debug_report::print_run(&config.rules, &run, &counts, config.color);
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> jsonrouter::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| jsonrouter::Error::Io { path: path.clone(), source }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| jsonrouter::Error::Io { path: PathBuf::from("<stdin>"), source })?;
            Ok(buffer)
        }
    }
}

fn parse_args() -> Result<CliConfig, String> {
    let mut rules: Option<PathBuf> = None;
    let mut input: Option<PathBuf> = None;
    let mut sns = false;
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("jsonrouter {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--sns" => sns = true,
            "--json" => json = true,
            "--rules" | "-r" => {
                let value = args.next().ok_or_else(|| "error: --rules expects a value".to_string())?;
                set_once(&mut rules, "rules", value)?;
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                set_once(&mut input, "input", value)?;
            }
            _ if arg.starts_with("--rules=") => {
                set_once(&mut rules, "rules", arg.trim_start_matches("--rules=").to_string())?;
            }
            _ if arg.starts_with("--input=") => {
                set_once(&mut input, "input", arg.trim_start_matches("--input=").to_string())?;
            }
            _ => return Err(format!("error: unknown argument '{arg}'\n\n{}", help_text())),
        }
    }

    let rules = rules.ok_or_else(|| format!("error: --rules is required\n\n{}", help_text()))?;
    Ok(CliConfig { rules, input, sns, json, color })
}

fn set_once(slot: &mut Option<PathBuf>, flag: &str, value: String) -> Result<(), String> {
    if slot.is_some() {
        return Err(format!("error: --{flag} provided multiple times"));
    }
    if value.is_empty() {
        return Err(format!("error: --{flag} expects a non-empty value"));
    }
    *slot = Some(PathBuf::from(value));
    Ok(())
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "jsonrouter {version}

Dry-run a rule file against a batch of JSON records.

Usage:
  jsonrouter --rules <file> [OPTIONS]

Options:
  -r, --rules <file>   Rule file (YAML, or JSON with a .json extension).
  -i, --input <file>   Batch file {{\"Records\": [...]}}. Reads stdin when omitted.
  --sns                Decode each record's Sns.Message JSON string first.
  --json               Print the matches as JSON instead of a report.
  --color              Force ANSI color output.
  --no-color           Disable ANSI color output.
  -h, --help           Show this help message.
  -V, --version        Print version information.

Routers named by the rules are replaced by counters; nothing is delivered.
Logs go to stderr; RUST_LOG overrides the default filter ({default_log}),
e.g. RUST_LOG=jsonrouter=debug.

Exit codes:
  0  Success.
  1  Rule, batch or dispatch error.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        default_log = DEFAULT_LOG_FILTER,
    )
}
