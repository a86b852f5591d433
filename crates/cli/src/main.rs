mod config;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use entitlement::{CustomEntitlement, Profile, SecurityContext};
use manager::EntitlementsManager;
use tracing::info;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "entitle.toml";

#[derive(Parser)]
#[command(name = "entitle")]
#[command(about = "Apply entitlement profiles to a sandbox security context", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (falls back to the restrictive profile if missing)
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log filter, overrides the config file (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the profile and print the resulting security context
    Apply {
        /// Enforce all recorded entitlements a second time on top of the result
        #[arg(long, conflicts_with = "replay")]
        reenforce: bool,
        /// Re-apply all recorded entitlements on a fresh context
        #[arg(long)]
        replay: bool,
    },
    /// Check whether the profile contains an entitlement
    Check {
        #[arg(short, long)]
        domain: String,
        #[arg(short, long)]
        identifier: String,
        /// Value as JSON (defaults to null)
        #[arg(short, long)]
        value: Option<String>,
    },
    /// List the profile's entitlements in application order
    List,
}

fn main() {
    let outcome = run();
    if let Err(e) = &outcome {
        eprintln!("Error: {e}");
    }

    let code = exit_code(&outcome);
    if code != 0 {
        std::process::exit(code);
    }
}

/// 0 on success, 1 when a `check` finds nothing, 2 on error.
fn exit_code(outcome: &Result<bool>) -> i32 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

/// Returns `false` when a `check` finds nothing.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;
    init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level))?;

    if cli.config.exists() {
        info!(path = %cli.config.display(), "loaded config");
    } else {
        info!("no config file, using restrictive profile");
    }

    match cli.command {
        Some(Commands::Apply { reenforce, replay }) => cmd_apply(&config.profile, reenforce, replay),
        None => cmd_apply(&config.profile, false, false),
        Some(Commands::Check {
            domain,
            identifier,
            value,
        }) => cmd_check(&config.profile, domain, identifier, value.as_deref()),
        Some(Commands::List) => cmd_list(&config.profile),
    }
}

fn apply_profile(profile: &Profile) -> Result<EntitlementsManager> {
    let mut manager = EntitlementsManager::new(SecurityContext::new());
    manager.add(profile.build()?)?;
    info!(count = manager.len(), "profile applied");
    Ok(manager)
}

fn cmd_apply(profile: &Profile, reenforce: bool, replay: bool) -> Result<bool> {
    let mut manager = apply_profile(profile)?;

    if reenforce {
        manager.enforce()?;
    } else if replay {
        manager.replay(SecurityContext::new())?;
    }

    let context = manager.into_context();
    println!("{}", serde_json::to_string_pretty(&context)?);
    Ok(true)
}

fn cmd_check(
    profile: &Profile,
    domain: String,
    identifier: String,
    value: Option<&str>,
) -> Result<bool> {
    let query = check_query(domain, identifier, value)?;
    let found = profile_contains(profile, &query)?;
    println!("{}", if found { "present" } else { "absent" });
    Ok(found)
}

/// Build a membership query from `check` arguments; `value` is JSON.
fn check_query(
    domain: String,
    identifier: String,
    value: Option<&str>,
) -> Result<CustomEntitlement<SecurityContext>> {
    let value = match value {
        Some(json) => serde_json::from_str(json)?,
        None => serde_json::Value::Null,
    };

    Ok(CustomEntitlement::passthrough()
        .with_domain(domain)
        .with_identifier(identifier)
        .with_value(value))
}

fn profile_contains(profile: &Profile, query: &CustomEntitlement<SecurityContext>) -> Result<bool> {
    let manager = apply_profile(profile)?;
    Ok(manager.has_entitlement(query)?)
}

fn cmd_list(profile: &Profile) -> Result<bool> {
    if profile.entitlements.is_empty() {
        println!("No entitlements.");
        return Ok(true);
    }

    println!("{:<4}  {:<12}  {:<20}  VALUE", "#", "DOMAIN", "IDENTIFIER");
    println!("{}", "-".repeat(60));

    for (i, spec) in profile.entitlements.iter().enumerate() {
        println!(
            "{:<4}  {:<12}  {:<20}  {}",
            i, spec.domain, spec.identifier, spec.value
        );
    }

    Ok(true)
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .map_err(|e| Error::Logging(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitlement::{Entitlement, EntitlementSpec};
    use serde_json::json;

    fn check(profile: &Profile, domain: &str, identifier: &str, value: Option<&str>) -> Result<bool> {
        let query = check_query(domain.to_string(), identifier.to_string(), value)?;
        profile_contains(profile, &query)
    }

    #[test]
    fn test_check_present_exits_zero() {
        let outcome = check(&Profile::restrictive(), "network", "mode", Some("\"none\""));
        assert!(matches!(outcome, Ok(true)));
        assert_eq!(exit_code(&outcome), 0);
    }

    #[test]
    fn test_check_absent_exits_one() {
        let outcome = check(&Profile::restrictive(), "network", "mode", Some("\"host\""));
        assert!(matches!(outcome, Ok(false)));
        assert_eq!(exit_code(&outcome), 1);

        // Missing --value queries a null payload
        let outcome = check(&Profile::restrictive(), "network", "mode", None);
        assert_eq!(exit_code(&outcome), 1);
    }

    #[test]
    fn test_check_invalid_value_exits_two() {
        let outcome = check(&Profile::restrictive(), "network", "mode", Some("none"));
        assert!(matches!(outcome, Err(Error::Json(_))));
        assert_eq!(exit_code(&outcome), 2);
    }

    #[test]
    fn test_check_bad_profile_exits_two() {
        let profile = Profile {
            entitlements: vec![EntitlementSpec::new("debug", "ptrace", json!(true))],
        };
        let outcome = check(&profile, "debug", "ptrace", Some("true"));
        assert!(matches!(outcome, Err(Error::Entitlement(_))));
        assert_eq!(exit_code(&outcome), 2);
    }

    #[test]
    fn test_check_query_value() {
        let query = check_query("filesystem".into(), "masked".into(), Some(r#"["/proc/kcore"]"#))
            .unwrap();
        assert_eq!(query.value().unwrap(), &json!(["/proc/kcore"]));
    }
}
