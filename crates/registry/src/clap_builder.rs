use clap::{Arg, ArgAction, Command as ClapCommand};

use crate::{CallMode, OperationEntry, ServiceRegistry};

/// Builds a Clap command tree exposing every blocking operation of a service.
///
/// Each operation becomes a subcommand named after it (e.g. `get_places`),
/// and each argument of its request schema becomes a long flag. Arguments
/// without a default are required; defaults are not duplicated into Clap so
/// that omitted arguments are resolved by the operation itself.
///
/// The root command is `root`, typically created by the caller with its own
/// global flags.
///
/// # Examples
///
/// ```rust
/// use clap::Command;
/// use rekt_registry::{ServiceRegistry, build_clap};
///
/// let registry: ServiceRegistry = "name: Echo\nbase_url: http://localhost\napis:\n  Echo:\n    url: /echo\n    GET:\n      q:\n"
///     .parse()
///     .expect("load service");
/// let command = build_clap(Command::new("rekt"), &registry);
/// assert!(command.find_subcommand("get_echo").is_some());
/// ```
pub fn build_clap(root: ClapCommand, registry: &ServiceRegistry) -> ClapCommand {
    let mut root = root;
    for entry in registry.operations().filter(|entry| entry.mode == CallMode::Blocking) {
        root = root.subcommand(build_subcommand(entry));
    }
    root
}

/// Id of the help flag on operation subcommands. Argument names are free
/// form, so Clap's built-in `help` id and `--help` flag are not assumed to be
/// available.
const HELP_ID: &str = "rekt::help";

/// Builds the subcommand for one operation.
///
/// Clap requires `'static` identifiers; names are leaked since the command
/// tree is built once per process.
fn build_subcommand(entry: &OperationEntry) -> ClapCommand {
    let name: &'static str = Box::leak(entry.name.clone().into_boxed_str());
    let about = format!("{} {}", entry.verb, entry.resource.url);
    let mut help = Arg::new(HELP_ID)
        .short('h')
        .action(ArgAction::Help)
        .help("Print help");
    if entry.request_schema().get("help").is_none() {
        help = help.long("help");
    }
    let mut subcommand = ClapCommand::new(name).about(about).disable_help_flag(true).arg(help);

    for argument in entry.request_schema().arguments() {
        let id: &'static str = Box::leak(argument.name.clone().into_boxed_str());
        let description = match &argument.default {
            Some(default) => format!("optional (default: {})", default),
            None => "required".to_string(),
        };
        subcommand = subcommand.arg(
            Arg::new(id)
                .long(id)
                .required(!argument.has_default())
                .action(ArgAction::Set)
                .help(description),
        );
    }
    subcommand
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> ServiceRegistry {
        ServiceRegistry::from_value(json!({
            "name": "GooglePlaces",
            "base_url": "https://maps.example.com",
            "apis": {
                "Places": {
                    "url": "/nearby",
                    "GET": { "key": null, "location": null, "radius": { "default": 500 } }
                }
            }
        }))
        .expect("load service")
    }

    #[test]
    fn exposes_only_blocking_operations() {
        let command = build_clap(ClapCommand::new("rekt"), &registry());
        let names: Vec<_> = command.get_subcommands().map(|sub| sub.get_name().to_string()).collect();
        assert_eq!(names, vec!["get_places"]);
    }

    #[test]
    fn arguments_without_defaults_are_required_flags() {
        let command = build_clap(ClapCommand::new("rekt"), &registry());
        let matches = command
            .clone()
            .try_get_matches_from(["rekt", "get_places", "--key", "abc", "--location", "1,2"])
            .expect("parse arguments");
        let (name, sub_matches) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "get_places");
        assert_eq!(sub_matches.get_one::<String>("key").map(String::as_str), Some("abc"));
        assert!(sub_matches.get_one::<String>("radius").is_none());

        let missing = command.try_get_matches_from(["rekt", "get_places", "--key", "abc"]);
        assert!(missing.is_err(), "location is required");
    }

    #[test]
    fn arguments_may_shadow_clap_flag_names() {
        let registry = ServiceRegistry::from_value(json!({
            "name": "Manual",
            "base_url": "https://docs.example.com",
            "apis": {
                "Pages": {
                    "url": "/pages",
                    "GET": { "help": null, "version": { "default": 1 } }
                }
            }
        }))
        .expect("load service");
        let command = build_clap(ClapCommand::new("rekt"), &registry);
        command.clone().debug_assert();

        let matches = command
            .clone()
            .try_get_matches_from(["rekt", "get_pages", "--help", "intro", "--version", "2"])
            .expect("parse arguments");
        let (_, sub_matches) = matches.subcommand().expect("subcommand");
        assert_eq!(sub_matches.get_one::<String>("help").map(String::as_str), Some("intro"));
        assert_eq!(sub_matches.get_one::<String>("version").map(String::as_str), Some("2"));

        let error = command
            .try_get_matches_from(["rekt", "get_pages", "-h"])
            .expect_err("short help still prints help");
        assert_eq!(error.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn operation_subcommands_keep_long_help() {
        let command = build_clap(ClapCommand::new("rekt"), &registry());
        command.clone().debug_assert();
        let error = command
            .try_get_matches_from(["rekt", "get_places", "--help"])
            .expect_err("help requested");
        assert_eq!(error.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
