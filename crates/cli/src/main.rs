use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use rekt_api::ClientOptions;
use rekt_engine::{Arguments, Client, Response, Service};
use rekt_registry::{CallMode, OperationEntry, build_clap};
use serde_json::Value;
use tracing::debug;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let bootstrap = bootstrap(&args);
    init_tracing(bootstrap.verbosity);

    let service = match &bootstrap.config {
        Some(path) => Some(Service::from_path(path).with_context(|| format!("load service definition {}", path.display()))?),
        None => None,
    };
    let cli = match &service {
        Some(service) => build_clap(root_command(), service.registry()),
        None => root_command(),
    };
    let matches = cli.get_matches_from(&args);

    let Some(service) = service else {
        bail!("no service definition; pass one with --config <FILE>");
    };

    match matches.subcommand() {
        Some(("operations", _)) => {
            print_operations(&service);
            Ok(())
        }
        Some(("describe", sub)) => describe(&service, sub),
        Some((name, sub)) => {
            let client = service.client(client_options(&matches))?;
            run_operation(&client, name, sub, &matches)
        }
        None => bail!("expected an operation; run `rekt --config <FILE> operations` to list them"),
    }
}

fn init_tracing(verbosity: u8) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        match verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
        .into()
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Service definition (YAML or JSON)")
}

/// Root flags needed before the full command tree exists.
#[derive(Debug, Default, PartialEq)]
struct Bootstrap {
    config: Option<PathBuf>,
    verbosity: u8,
}

/// Reads `--config` and `-v` before the service is loaded.
///
/// Operation subcommands are generated from the definition, so the path has
/// to be known before the real parse, and logging has to be up before loading
/// so load-time events are reported. Anything after the first subcommand is
/// ignored here.
fn bootstrap(args: &[String]) -> Bootstrap {
    let Ok(matches) = root_command()
        .ignore_errors(true)
        .allow_external_subcommands(true)
        .try_get_matches_from(args)
    else {
        return Bootstrap::default();
    };
    Bootstrap {
        config: matches.get_one::<PathBuf>("config").cloned(),
        verbosity: matches.get_count("verbose"),
    }
}

fn root_command() -> Command {
    Command::new("rekt")
        .about("Call HTTP services described by a YAML or JSON definition")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .arg(config_arg())
        .arg(
            Arg::new("cert")
                .long("cert")
                .value_name("PEM")
                .value_parser(value_parser!(PathBuf))
                .help("Client certificate"),
        )
        .arg(
            Arg::new("key")
                .long("key")
                .value_name("PEM")
                .value_parser(value_parser!(PathBuf))
                .help("Client private key, when not bundled with --cert"),
        )
        .arg(
            Arg::new("no-verify")
                .long("no-verify")
                .action(ArgAction::SetTrue)
                .conflicts_with("ca-bundle")
                .help("Skip TLS certificate verification"),
        )
        .arg(
            Arg::new("ca-bundle")
                .long("ca-bundle")
                .value_name("PEM")
                .value_parser(value_parser!(PathBuf))
                .help("Extra CA certificates to trust"),
        )
        .arg(
            Arg::new("header")
                .short('H')
                .long("header")
                .value_name("NAME=VALUE")
                .value_parser(parse_header)
                .action(ArgAction::Append)
                .help("Header sent with every request"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_parser(value_parser!(usize))
                .help("Worker pool size"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .value_parser(value_parser!(u64))
                .help("Request timeout"),
        )
        .arg(
            Arg::new("path")
                .long("path")
                .value_name("DOTTED")
                .help("Print only this part of the response, e.g. results.0.name"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print JSON instead of YAML"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("More logging (-v info, -vv debug)"),
        )
        .subcommand(Command::new("operations").about("List generated operations"))
        .subcommand(
            Command::new("describe")
                .about("Show the signature of one operation")
                .arg(Arg::new("operation").required(true)),
        )
}

fn client_options(matches: &ArgMatches) -> ClientOptions {
    let mut options = ClientOptions::default();
    if let Some(cert) = matches.get_one::<PathBuf>("cert") {
        options = options.with_cert(cert);
    }
    if let Some(key) = matches.get_one::<PathBuf>("key") {
        options = options.with_key(key);
    }
    if matches.get_flag("no-verify") {
        options = options.with_verify(false);
    }
    if let Some(bundle) = matches.get_one::<PathBuf>("ca-bundle") {
        options = options.with_ca_bundle(bundle);
    }
    if let Some(workers) = matches.get_one::<usize>("workers") {
        options = options.with_worker_threads(*workers);
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        options = options.with_timeout_secs(*timeout);
    }
    for (name, value) in matches.get_many::<(String, String)>("header").into_iter().flatten() {
        options = options.with_header(name, value);
    }
    options
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn print_operations(service: &Service) {
    for entry in service.registry().operations() {
        let mode = match entry.mode {
            CallMode::Blocking => "",
            CallMode::Async => " (async)",
        };
        println!("{:<32} {:<7} {}{}", entry.name, entry.verb.as_str(), entry.resource.url, mode);
    }
}

fn describe(service: &Service, matches: &ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("operation")
        .context("expected an operation name")?;
    let entry = service
        .registry()
        .operation(name)
        .with_context(|| format!("unknown operation '{}'", name))?;
    println!("{}", entry.help());
    print_details(entry);
    Ok(())
}

fn print_details(entry: &OperationEntry) {
    let defaults = entry.request_schema().defaults();
    if !defaults.is_empty() {
        println!("Defaults:");
        for (name, value) in defaults {
            println!("  {} = {}", name, value);
        }
    }
    println!("Request: {} {}", entry.verb, entry.resource.url);
    println!("Returns: {}", entry.response_descriptor().type_name);
}

fn run_operation(client: &Client, name: &str, sub: &ArgMatches, matches: &ArgMatches) -> Result<()> {
    let entry = client
        .operation(name)
        .with_context(|| format!("unknown operation '{}'", name))?;

    let mut arguments = Arguments::new();
    for argument in entry.request_schema().arguments() {
        if let Some(raw) = sub.get_one::<String>(&argument.name) {
            arguments.insert(argument.name.clone(), parse_cli_value(raw));
        }
    }
    debug!(operation = name, arguments = arguments.len(), "running operation");

    let response = client.call(name, arguments)?;
    print_response(&response, matches.get_one::<String>("path").map(String::as_str), matches.get_flag("json"))
}

/// Interprets a flag value as JSON, falling back to a plain string.
fn parse_cli_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_response(response: &Response, path: Option<&str>, json: bool) -> Result<()> {
    let Some(path) = path else {
        if json {
            println!("{}", serde_json::to_string_pretty(response)?);
        } else {
            println!("{}", response);
        }
        return Ok(());
    };

    let selected = response.path(path).value().unwrap_or(&Value::Null);
    match selected {
        Value::Object(_) | Value::Array(_) if !json => print!("{}", serde_yaml::to_string(selected)?),
        Value::String(text) if !json => println!("{}", text),
        other if json => println!("{}", serde_json::to_string_pretty(other)?),
        other => println!("{}", other),
    }
    Ok(())
}
