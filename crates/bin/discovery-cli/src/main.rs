//! Command line front-end for the discovery cache.

use color_eyre::eyre::{Context, bail, eyre};
use discovery_record::{Capability, DiscoveryRecord};

/// Usage text.
const USAGE: &str = "Usage: discovery-cli <all | get <capability> | token <capability> | clear>";

/// The concrete service the CLI drives.
type Service = discovery_service::DiscoveryCacheService<
    authenticator_static::StaticAuthenticator,
    discovery_provider_http::HttpDiscoveryProvider,
>;

/// A parsed command line.
#[derive(Debug)]
enum Command {
    /// Print every capability.
    All,

    /// Print one capability.
    Get(String),

    /// Print an access token for one capability.
    Token(String),

    /// Remove the cache file.
    Clear,
}

impl Command {
    /// Parse the arguments following the program name.
    fn parse(args: &[String]) -> color_eyre::eyre::Result<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Ok(match args.as_slice() {
            ["all"] => Self::All,
            ["get", name] => Self::Get(canonical_capability(name)),
            ["token", name] => Self::Token(canonical_capability(name)),
            ["clear"] => Self::Clear,
            _ => bail!(USAGE),
        })
    }
}

/// Spell well-known capabilities canonically; pass other names through.
fn canonical_capability(name: &str) -> String {
    name.parse::<Capability>()
        .map_or_else(|_| name.to_owned(), |capability| capability.as_str().to_owned())
}

/// Run the discovery cache CLI.
#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let command = Command::parse(&args)?;

    let config_load::Loaded { config, path } = config_load::with_default_env_var().await?;
    tracing::debug!(config_path = %path.display(), "loaded config");

    let service = build_service(config)?;

    let outcome = match command {
        Command::All => service.get_all_capabilities().await.map(|records| {
            let mut records: Vec<_> = records.into_iter().collect();
            records.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            for (name, record) in &records {
                print_record(name, record);
            }
        }),
        Command::Get(name) => service
            .get_capability(&name)
            .await
            .map(|record| print_record(&name, &record)),
        Command::Token(name) => match service.get_capability(&name).await {
            Ok(record) => {
                let token = service
                    .access_token_for(&record)
                    .await
                    .wrap_err_with(|| format!("Failed to get an access token for {name}"))?;
                println!("{token}");
                Ok(())
            }
            Err(error) => Err(error),
        },
        Command::Clear => {
            service
                .store()
                .clear()
                .await
                .wrap_err("Failed to clear the discovery cache")?;
            println!("Cleared {}", service.store().path().display());
            Ok(())
        }
    };

    match outcome {
        Err(error) if error.is_canceled() => {
            tracing::info!("sign-in canceled");
            Ok(())
        }
        result => result.wrap_err("Capability discovery failed"),
    }
}

/// Assemble the service from configuration.
fn build_service(config: config_core::Config) -> color_eyre::eyre::Result<Service> {
    let config_core::Config {
        discovery,
        cache,
        identity,
    } = config;

    let endpoint = url::Url::parse(&discovery.endpoint)
        .wrap_err_with(|| format!("Invalid discovery endpoint '{}'", discovery.endpoint))?;
    let provider =
        discovery_provider_http::HttpDiscoveryProvider::new(reqwest::Client::new(), &endpoint)
            .wrap_err("Invalid discovery endpoint")?;

    let cache_path = match cache.path {
        Some(path) => path,
        None => config_paths::default_cache_file()
            .ok_or_else(|| eyre!("No local data directory; set cache.path in config"))?,
    };

    let authenticator =
        authenticator_static::StaticAuthenticator::new(identity.user_id, identity.access_tokens);

    Ok(discovery_service::DiscoveryCacheService::new(
        discovery_service::Params {
            authenticator,
            provider,
            store: discovery_store::DiscoveryCacheStore::open(cache_path),
            discovery_resource_id: discovery.resource_id,
        },
    ))
}

/// Print a capability as a tab-separated line.
fn print_record(name: &str, record: &DiscoveryRecord) {
    println!(
        "{name}\t{}\t{}\t{}",
        record.service_endpoint(),
        record.service_resource_id(),
        record.api_version()
    );
}
