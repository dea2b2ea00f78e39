// # zonesync - zone file synchroniser
//
// Thin command line shell over zonesync-core. Parses flags, loads the zone
// file, builds the provider from the registry and hands everything to the
// SyncEngine. No reconciliation logic lives here.
//
// ## Credentials
//
// - `CF_API_KEY` + `CF_API_EMAIL`: global API key (preferred when set)
// - `CF_API_TOKEN`: scoped API token
//
// ## Example
//
// ```bash
// export CF_API_TOKEN=your_token
// zonesync --leave-unknown --ignore-spf /etc/zones/example.com.zone
// ```

mod console;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::{
    DesiredZone, LineConfirmation, ProviderConfig, ProviderRegistry, RecordType, REVISION,
    SyncConfig, SyncEngine, SyncOutcome,
};

use console::ConsoleReporter;

/// Exit codes
///
/// - 0: Success, including an operator abort
/// - 1: Configuration or zone file error
/// - 2: Provider or runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZonesyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<ZonesyncExitCode> for ExitCode {
    fn from(code: ZonesyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Synchronise a DNS zone file to Cloudflare
#[derive(Debug, Parser)]
#[command(name = "zonesync", disable_version_flag = true)]
struct Args {
    /// Path to the zone file
    #[arg(required_unless_present = "version")]
    zone_file: Option<PathBuf>,

    /// Apply changes without showing them or asking for confirmation
    #[arg(long)]
    yes: bool,

    /// Keep remote records that are not in the zone file
    #[arg(long)]
    leave_unknown: bool,

    /// Leave SPF records alone
    #[arg(long)]
    ignore_spf: bool,

    /// Leave SRV records alone
    #[arg(long)]
    ignore_srv: bool,

    /// Origin for names before the first $ORIGIN
    #[arg(long)]
    origin: Option<String>,

    /// Zone file TTL meaning "automatic"
    #[arg(long, default_value_t = 0)]
    auto_ttl: u32,

    /// Zone file TTL meaning "proxied, automatic TTL"
    #[arg(long, default_value_t = 1)]
    cache_ttl: u32,

    /// Show the changes without applying them
    #[arg(long)]
    dry_run: bool,

    /// Print the version number and exit
    #[arg(long)]
    version: bool,

    /// Log verbosity (trace, debug, info, warn, error)
    #[arg(long, env = "ZONESYNC_LOG_LEVEL", default_value = "warn")]
    log_level: Level,

    #[arg(long, env = "CF_API_TOKEN", hide = true, hide_env_values = true)]
    api_token: Option<String>,

    #[arg(long, env = "CF_API_KEY", hide = true, hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "CF_API_EMAIL", hide = true, hide_env_values = true)]
    api_email: Option<String>,
}

impl Args {
    fn sync_config(&self) -> SyncConfig {
        let mut config = SyncConfig::new()
            .with_skip_confirmation(self.yes)
            .with_preserve_unknown(self.leave_unknown);
        if self.ignore_spf {
            config = config.excluding(RecordType::Spf);
        }
        if self.ignore_srv {
            config = config.excluding(RecordType::Srv);
        }
        config.origin_override = self.origin.clone();
        config.auto_ttl = self.auto_ttl;
        config.cache_ttl = self.cache_ttl;
        config.dry_run = self.dry_run;
        config
    }

    fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::Cloudflare {
            api_token: self.api_token.clone(),
            api_key: self.api_key.clone(),
            api_email: self.api_email.clone(),
            dry_run: self.dry_run,
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ZonesyncExitCode::ConfigError.into()
            } else {
                ZonesyncExitCode::Success.into()
            };
        }
    };

    if args.version {
        println!("{}", REVISION);
        return ZonesyncExitCode::Success.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonesyncExitCode::RuntimeError.into();
        }
    };

    match rt.block_on(run(&args)) {
        Ok(outcome) => {
            if let SyncOutcome::DryRun { changes } = outcome {
                println!("Dry run: {} change(s) not applied", changes);
            }
            debug!(?outcome, "run finished");
            ZonesyncExitCode::Success.into()
        }
        Err(e) => {
            eprintln!("{:#}", e);
            exit_code_for(&e).into()
        }
    }
}

/// Input problems exit with 1, everything else with 2
fn exit_code_for(err: &anyhow::Error) -> ZonesyncExitCode {
    match err.downcast_ref::<zonesync_core::Error>() {
        Some(e) if e.is_input_error() => ZonesyncExitCode::ConfigError,
        _ => ZonesyncExitCode::RuntimeError,
    }
}

async fn run(args: &Args) -> anyhow::Result<SyncOutcome> {
    let config = args.sync_config();
    config.validate()?;

    let registry = ProviderRegistry::new();
    #[cfg(feature = "cloudflare")]
    zonesync_provider_cloudflare::register(&registry);

    let provider = registry.create_provider(&args.provider_config())?;

    let path = args
        .zone_file
        .as_ref()
        .ok_or_else(|| zonesync_core::Error::config("no zone file given"))?;
    let desired = DesiredZone::load(path, &config.parse_options())
        .with_context(|| format!("Error reading '{}'", path.display()))?;

    let engine = SyncEngine::new(
        provider,
        Box::new(LineConfirmation::stdio()),
        Box::new(ConsoleReporter::stdout()),
        config,
    )?;

    Ok(engine.run(&desired).await?)
}
