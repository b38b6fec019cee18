//! dapp-registry - timelocked dapp authorisation for smart-contract wallets

use std::path::PathBuf;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes};
use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use registry_core::{Paths, SystemClock, Timestamp};
use tracing_subscriber::EnvFilter;

use dapp_registry::{
    config::{ConfigLoader, FilterSpec, YamlConfigLoader},
    evaluator::AuthorizationEvaluator,
    events::{EventLog, EventQuery, EventRecord},
    filter::paraswap::KnownProxy,
    filter::{CallRequest, ParaswapFilter},
    registry::{ListId, TrustRegistry, ROOT_LIST},
    relay::{LocalRelay, RegistryCall, Relay},
    store::StateStore,
    tokens::{TokenRegistry, TradableTokens},
    RegistryError,
};

/// dapp-registry - timelocked dapp authorisation for smart-contract wallets
#[derive(Parser)]
#[command(name = "dapp-registry")]
#[command(version)]
#[command(about = "Timelocked dapp authorisation registry")]
#[command(long_about = "Timelocked dapp authorisation registry.\n\n\
    Wallets may skip guardian approval for calls to dapps registered in a\n\
    trust list they enabled, as long as the dapp's filter accepts the call.\n\
    Additions and filter changes only take effect after the timelock.")]
pub struct Cli {
    /// Deployment environment
    #[arg(long, global = true, default_value = "local")]
    env: String,

    /// Account the command is sent from
    #[arg(long = "as", global = true, value_name = "ADDRESS")]
    caller: Option<Address>,

    /// Use this directory instead of the standard config and data directories
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the registry from the environment's configuration
    Init {
        /// Root owner, overriding the configuration
        #[arg(long)]
        owner: Option<Address>,

        /// Overwrite an existing deployment
        #[arg(long)]
        force: bool,
    },

    /// Show lists, dapps and pending changes
    Status,

    /// Create a trust list (root owner only)
    CreateRegistry { list: ListId, owner: Address },

    /// Hand a trust list over to a new owner
    ChangeOwner { list: ListId, new_owner: Address },

    /// Queue a new timelock period (root owner only)
    RequestTimelock { period: u64 },

    /// Apply the queued timelock period
    ConfirmTimelock,

    /// Register a dapp; it counts once the timelock has elapsed
    AddDapp {
        dapp: Address,

        /// Filter vetting calls to the dapp; omit to allow any call
        #[arg(long)]
        filter: Option<Address>,

        #[arg(long, default_value_t = ROOT_LIST)]
        list: ListId,
    },

    /// Remove a dapp immediately
    RemoveDapp {
        dapp: Address,

        #[arg(long, default_value_t = ROOT_LIST)]
        list: ListId,
    },

    /// Queue a filter replacement for a dapp
    RequestFilterUpdate {
        dapp: Address,
        filter: Address,

        #[arg(long, default_value_t = ROOT_LIST)]
        list: ListId,
    },

    /// Apply a queued filter replacement
    ConfirmFilterUpdate {
        dapp: Address,

        #[arg(long, default_value_t = ROOT_LIST)]
        list: ListId,
    },

    /// Enable or disable a trust list for the calling wallet
    Toggle {
        list: ListId,

        /// Disable instead of enable
        #[arg(long)]
        disable: bool,
    },

    /// Show the entry for a dapp
    GetAuthorisation {
        dapp: Address,

        #[arg(long, default_value_t = ROOT_LIST)]
        list: ListId,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Whether a wallet has a trust list enabled
    IsEnabled { wallet: Address, list: ListId },

    /// Decide a call. Exits 0 when authorised, 1 otherwise.
    IsAuthorised {
        wallet: Address,

        /// Registered dapp
        spender: Address,

        /// Contract called, when it is not the dapp (token approvals)
        #[arg(long)]
        to: Option<Address>,

        /// Calldata as hex
        #[arg(long, default_value = "0x")]
        data: Bytes,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Query the event log
    Events {
        #[arg(long)]
        list: Option<ListId>,

        #[arg(long)]
        dapp: Option<Address>,

        /// Event kind (e.g. "dapp_added")
        #[arg(long)]
        kind: Option<String>,

        /// Show events since (e.g., "1h", "1d", "1w")
        #[arg(long)]
        since: Option<String>,

        /// Limit number of results
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the registry view from the event log
    Snapshot {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the tradable token registry
    Tokens {
        #[command(subcommand)]
        command: TokensCommand,
    },

    /// Re-check the aggregator's Uniswap proxy for a paraswap filter
    RefreshProxy {
        /// Address of the paraswap filter
        filter: Address,

        /// Proxy the aggregator currently uses
        #[arg(long)]
        current: Address,
    },
}

#[derive(Subcommand)]
enum TokensCommand {
    /// Show owner, managers and tradable tokens
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark tokens tradable (owner) or untradable (owner or manager)
    SetTradable {
        #[arg(required = true)]
        tokens: Vec<Address>,

        /// Take the tokens off the list
        #[arg(long)]
        off: bool,
    },

    AddManager { manager: Address },

    RevokeManager { manager: Address },

    ChangeOwner { new_owner: Address },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = Context {
        paths: cli.home.map(Paths::with_root).unwrap_or_default(),
        env: cli.env,
        caller: cli.caller,
    };

    match cli.command {
        Commands::Init { owner, force } => cmd_init(&ctx, owner, force),
        Commands::Status => cmd_status(&ctx),
        Commands::CreateRegistry { list, owner } => {
            ctx.submit(RegistryCall::CreateRegistry { list, owner })
        }
        Commands::ChangeOwner { list, new_owner } => {
            ctx.submit(RegistryCall::ChangeOwner { list, new_owner })
        }
        Commands::RequestTimelock { period } => {
            ctx.submit(RegistryCall::RequestTimelockChange { period })
        }
        Commands::ConfirmTimelock => ctx.submit(RegistryCall::ConfirmTimelockChange),
        Commands::AddDapp { dapp, filter, list } => ctx.submit(RegistryCall::AddDapp {
            list,
            dapp,
            filter: filter.unwrap_or(Address::ZERO),
        }),
        Commands::RemoveDapp { dapp, list } => ctx.submit(RegistryCall::RemoveDapp { list, dapp }),
        Commands::RequestFilterUpdate { dapp, filter, list } => {
            ctx.submit(RegistryCall::RequestFilterUpdate { list, dapp, filter })
        }
        Commands::ConfirmFilterUpdate { dapp, list } => {
            ctx.submit(RegistryCall::ConfirmFilterUpdate { list, dapp })
        }
        Commands::Toggle { list, disable } => {
            let wallet = ctx.caller()?;
            ctx.submit(RegistryCall::ToggleTrustList {
                wallet,
                list,
                enabled: !disable,
            })
        }
        Commands::GetAuthorisation { dapp, list, json } => cmd_get_authorisation(&ctx, dapp, list, json),
        Commands::IsEnabled { wallet, list } => cmd_is_enabled(&ctx, wallet, list),
        Commands::IsAuthorised {
            wallet,
            spender,
            to,
            data,
            json,
        } => cmd_is_authorised(&ctx, wallet, spender, to.unwrap_or(spender), &data, json),
        Commands::Events {
            list,
            dapp,
            kind,
            since,
            limit,
            json,
        } => cmd_events(&ctx, list, dapp, kind, since, limit, json),
        Commands::Snapshot { json } => cmd_snapshot(&ctx, json),
        Commands::Tokens { command } => cmd_tokens(&ctx, command),
        Commands::RefreshProxy { filter, current } => cmd_refresh_proxy(&ctx, filter, current),
    }
}

/// Where the selected environment lives, and who is asking
struct Context {
    paths: Paths,
    env: String,
    caller: Option<Address>,
}

impl Context {
    fn config(&self) -> YamlConfigLoader {
        YamlConfigLoader::with_path(self.paths.deployment(&self.env))
    }

    fn store(&self) -> StateStore {
        StateStore::with_dir(self.paths.state(&self.env))
    }

    fn event_log(&self) -> EventLog {
        EventLog::with_path(self.paths.events(&self.env))
    }

    fn caller(&self) -> Result<Address> {
        self.caller
            .context("this command needs a sender, pass --as <ADDRESS>")
    }

    fn open(&self) -> Result<TrustRegistry> {
        let state = self.store().load_state()?.with_context(|| {
            format!(
                "no registry deployed for '{}', run `dapp-registry init` first",
                self.env
            )
        })?;
        Ok(TrustRegistry::from_state(state, SystemClock))
    }

    /// Persisted token registry, or the configured seed before the first save
    fn tokens(&self) -> Result<TokenRegistry> {
        match self.store().load_tokens()? {
            Some(tokens) => Ok(tokens),
            None => Ok(self.config().load()?.tokens),
        }
    }

    /// Persist the registry and append its new events to the log
    fn commit(&self, registry: &mut TrustRegistry) -> Result<()> {
        self.store().save_state(registry.state())?;
        self.event_log().append(&registry.take_events())?;
        Ok(())
    }

    fn submit(&self, call: RegistryCall) -> Result<()> {
        let signer = self.caller()?;
        let mut registry = self.open()?;

        let handle = {
            let mut relay = LocalRelay::new(&mut registry, signer);
            match relay.execute(call) {
                Ok(handle) => handle,
                Err(e) => {
                    if let Some(RegistryError::TooEarly {
                        confirmable_after, ..
                    }) = e.downcast_ref::<RegistryError>()
                    {
                        eprintln!("Retry after {}", fmt_time(*confirmable_after));
                    }
                    return Err(e);
                }
            }
        };
        self.commit(&mut registry)?;

        println!("{} executed (#{})", handle.call.method(), handle.sequence);
        for record in &handle.events {
            println!("  {}", describe(record));
        }
        Ok(())
    }
}

fn cmd_init(ctx: &Context, owner: Option<Address>, force: bool) -> Result<()> {
    let loader = ctx.config();
    let mut config = loader.load()?;
    if let Some(owner) = owner {
        config.root_owner = owner;
    }

    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("  {}", problem);
        }
        bail!(
            "deployment config {:?} has {} problem(s)",
            loader.path(),
            problems.len()
        );
    }

    let store = ctx.store();
    if store.exists() && !force {
        println!("Registry already deployed at {:?}", store.dir());
        println!("Use --force to overwrite");
        return Ok(());
    }

    let event_log = ctx.event_log();
    if event_log.path().exists() {
        std::fs::remove_file(event_log.path())
            .with_context(|| format!("Failed to reset event log {:?}", event_log.path()))?;
    }

    let mut registry = TrustRegistry::new(config.root_owner, config.timelock_period, SystemClock);
    for (list, list_owner) in &config.lists {
        registry.create_registry(config.root_owner, *list, *list_owner)?;
    }
    for dapp in &config.dapps {
        let list_owner = config
            .list_owner(dapp.list)
            .with_context(|| format!("no owner for list {}", dapp.list))?;
        let valid_after =
            registry.add_dapp(list_owner, dapp.list, dapp.address, dapp.filter_address())?;
        println!(
            "  + {} {} in list {}, valid after {}",
            dapp.name,
            dapp.address,
            dapp.list,
            fmt_time(valid_after)
        );
    }

    let mut tokens = config.tokens.clone();
    if tokens.owner.is_zero() {
        tokens.owner = config.root_owner;
    }
    store.save_tokens(&tokens)?;
    ctx.commit(&mut registry)?;

    if !loader.path().exists() {
        loader.save(&config)?;
        println!("Wrote deployment config to {:?}", loader.path());
    }

    println!(
        "Registry deployed for '{}' (root owner {}, timelock {}s)",
        ctx.env, config.root_owner, config.timelock_period
    );
    Ok(())
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let registry = ctx.open()?;
    let config = ctx.config().load()?;
    let now = registry.now();

    println!("Dapp Registry ({})", ctx.env);
    println!("{}", "=".repeat(50));
    println!();
    println!("Root owner: {}", registry.root_owner());

    let timelock = registry.timelock();
    println!("Timelock: {}s", timelock.period);
    if let (Some(period), Some(after)) = (timelock.change.value(), timelock.change.confirmable_after()) {
        println!("  Pending change to {}s, confirmable after {}", period, fmt_time(after));
    }
    println!();

    for (id, list) in registry.lists() {
        println!("List {} (owner {}), {} dapp(s)", id, list.owner, list.dapps.len());
        for (dapp, entry) in &list.dapps {
            let filter = match entry.filter() {
                Some(filter) => match config.filters.get(&filter) {
                    Some(spec) => format!("{} ({})", filter, filter_kind(spec)),
                    None => format!("{} (not configured)", filter),
                },
                None => "none".to_string(),
            };
            let state = if entry.is_live(now) { "live" } else { "pending" };
            println!("  {:<44} {:<8} filter {}", dapp.to_string(), state, filter);
            if let Some((new_filter, after)) = registry.pending_filter_update(id, *dapp) {
                println!("    -> {} confirmable after {}", new_filter, fmt_time(after));
            }
        }
    }

    let problems = config.validate();
    if !problems.is_empty() {
        println!();
        println!("Config problems:");
        for problem in problems {
            println!("  {}", problem);
        }
    }

    Ok(())
}

fn cmd_get_authorisation(ctx: &Context, dapp: Address, list: ListId, json_output: bool) -> Result<()> {
    let registry = ctx.open()?;
    let entry = registry.get_authorisation(list, dapp);
    let pending = registry.pending_filter_update(list, dapp);

    if json_output {
        let value = serde_json::json!({
            "list": list,
            "dapp": dapp,
            "filter": entry.filter,
            "valid_after": entry.valid_after,
            "pending_filter": pending.map(|(filter, _)| filter),
            "confirmable_after": pending.map(|(_, after)| after),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Filter: {}", entry.filter);
        println!("Valid after: {}", fmt_time(entry.valid_after));
        if let Some((filter, after)) = pending {
            println!("Pending filter: {} (confirmable after {})", filter, fmt_time(after));
        }
    }
    Ok(())
}

fn cmd_is_enabled(ctx: &Context, wallet: Address, list: ListId) -> Result<()> {
    let registry = ctx.open()?;
    println!("{}", registry.is_enabled(wallet, list));
    Ok(())
}

fn cmd_is_authorised(
    ctx: &Context,
    wallet: Address,
    spender: Address,
    to: Address,
    data: &[u8],
    json_output: bool,
) -> Result<()> {
    let registry = ctx.open()?;
    let config = ctx.config().load()?;
    let filters = config.build_filters(ctx.tokens()?.shared());

    let evaluator = AuthorizationEvaluator::new(&registry, &filters);
    let request = CallRequest {
        wallet,
        spender,
        to,
        data,
    };
    let decision = evaluator.evaluate(&request);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        let verdict = if decision.authorised { "AUTHORISED" } else { "DENIED" };
        println!("{}: {} -> {}", verdict, wallet, to);
        println!("  Reason: {:?}", decision.reason);
        println!("  Details: {}", decision.details);
        if let Some(list) = decision.list {
            println!("  List: {}", list);
        }
    }

    // Exit with appropriate code
    if decision.authorised {
        std::process::exit(0)
    } else {
        std::process::exit(1)
    }
}

fn cmd_events(
    ctx: &Context,
    list: Option<ListId>,
    dapp: Option<Address>,
    kind: Option<String>,
    since: Option<String>,
    limit: usize,
    json_output: bool,
) -> Result<()> {
    let mut query = EventQuery::default().limit(limit);
    if let Some(list) = list {
        query = query.list(list);
    }
    if let Some(dapp) = dapp {
        query = query.dapp(dapp);
    }
    if let Some(kind) = kind {
        query = query.kind(&kind);
    }
    if let Some(since_str) = since {
        let since_time = parse_duration(&since_str)?;
        query = query.since(since_time.timestamp().max(0) as Timestamp);
    }

    let records = ctx.event_log().query(&query)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        println!("{:<20} {:<26} {:<5} {}", "TIME", "EVENT", "LIST", "DETAILS");
        println!("{}", "-".repeat(80));
        for record in &records {
            let list = record
                .event
                .list()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<20} {:<26} {:<5} {}",
                fmt_time(record.at),
                record.event.kind(),
                list,
                describe(record)
            );
        }
    }
    Ok(())
}

fn cmd_snapshot(ctx: &Context, json_output: bool) -> Result<()> {
    let snapshot = ctx.event_log().snapshot()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    match snapshot.timelock_period {
        Some(period) => println!("Timelock: {}s", period),
        None => println!("Timelock: unknown"),
    }
    if let Some((period, after)) = snapshot.pending_timelock {
        println!("  Pending change to {}s, confirmable after {}", period, fmt_time(after));
    }
    for (id, list) in &snapshot.lists {
        println!("List {} (owner {})", id, list.owner);
        for (dapp, view) in &list.dapps {
            println!(
                "  {} filter {} valid after {} (changed {})",
                dapp,
                view.filter,
                fmt_time(view.valid_after),
                fmt_time(view.last_change)
            );
            if let (Some(filter), Some(after)) = (view.pending_filter, view.confirmable_after) {
                println!("    -> {} confirmable after {}", filter, fmt_time(after));
            }
        }
    }
    println!("Wallets with explicit toggles: {}", snapshot.toggles.len());
    Ok(())
}

fn cmd_tokens(ctx: &Context, command: TokensCommand) -> Result<()> {
    let store = ctx.store();
    let mut tokens = ctx.tokens()?;

    match command {
        TokensCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&tokens)?);
            } else {
                println!("Owner: {}", tokens.owner);
                println!("Managers: {}", tokens.managers.len());
                for manager in &tokens.managers {
                    println!("  {}", manager);
                }
                println!("Tradable: {}", tokens.tradable.len());
                for token in &tokens.tradable {
                    println!("  {}", token);
                }
            }
            return Ok(());
        }
        TokensCommand::SetTradable { tokens: list, off } => {
            let flags = vec![!off; list.len()];
            tokens.set_tradable(ctx.caller()?, &list, &flags)?;
            println!("{} token(s) marked {}", list.len(), if off { "untradable" } else { "tradable" });
        }
        TokensCommand::AddManager { manager } => {
            tokens.add_manager(ctx.caller()?, manager)?;
            println!("Added manager {}", manager);
        }
        TokensCommand::RevokeManager { manager } => {
            tokens.revoke_manager(ctx.caller()?, manager)?;
            println!("Revoked manager {}", manager);
        }
        TokensCommand::ChangeOwner { new_owner } => {
            tokens.change_owner(ctx.caller()?, new_owner)?;
            println!("Token registry now owned by {}", new_owner);
        }
    }

    store.save_tokens(&tokens)
}

fn cmd_refresh_proxy(ctx: &Context, filter: Address, current: Address) -> Result<()> {
    let loader = ctx.config();
    let mut config = loader.load()?;
    let tokens: Arc<dyn TradableTokens> = Arc::new(ctx.tokens()?);

    let Some(FilterSpec::Paraswap(paraswap)) = config.filters.get_mut(&filter) else {
        bail!("no paraswap filter configured at {}", filter);
    };

    let live = ParaswapFilter::new(paraswap.clone(), tokens);
    let trusted = live.refresh_trusted_proxy(&KnownProxy(current));
    paraswap.uniswap_proxy_trusted = trusted;
    loader.save(&config)?;

    if trusted {
        println!("Uniswap proxy {} is trusted, swapOnUniswap calls allowed", current);
    } else {
        println!("Uniswap proxy changed to {}, swapOnUniswap calls denied", current);
    }
    Ok(())
}

fn filter_kind(spec: &FilterSpec) -> &'static str {
    match spec {
        FilterSpec::OnlyApprove => "only_approve",
        FilterSpec::Weth => "weth",
        FilterSpec::Curve => "curve",
        FilterSpec::Lido => "lido",
        FilterSpec::MakerVat { .. } => "maker_vat",
        FilterSpec::MakerPot => "maker_pot",
        FilterSpec::MakerDaiJoin => "maker_dai_join",
        FilterSpec::AaveV1LendingPool => "aave_v1_lending_pool",
        FilterSpec::AaveV1AToken => "aave_v1_atoken",
        FilterSpec::AaveV2 => "aave_v2",
        FilterSpec::Yearn { .. } => "yearn",
        FilterSpec::YearnV2 => "yearn_v2",
        FilterSpec::Balancer => "balancer",
        FilterSpec::GroDeposit => "gro_deposit",
        FilterSpec::GroWithdraw => "gro_withdraw",
        FilterSpec::ArgentEnsManager => "argent_ens_manager",
        FilterSpec::ZkSync => "zksync",
        FilterSpec::CompoundEther => "compound_ether",
        FilterSpec::CompoundToken { .. } => "compound_token",
        FilterSpec::UniswapV2Router { .. } => "uniswap_v2_router",
        FilterSpec::UniswapV2Unizap { .. } => "uniswap_v2_unizap",
        FilterSpec::Paraswap(_) => "paraswap",
    }
}

/// One-line summary of an event
fn describe(record: &EventRecord) -> String {
    match record.event.dapp() {
        Some(dapp) => format!("{} {}", record.event.kind(), dapp),
        None => serde_json::to_string(&record.event).unwrap_or_else(|_| record.event.kind().to_string()),
    }
}

fn fmt_time(ts: Timestamp) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Parse a duration string like "1h", "1d", "1w" into a DateTime
fn parse_duration(s: &str) -> Result<DateTime<Utc>> {
    Ok(Utc::now() - parse_age(s)?)
}

fn parse_age(s: &str) -> Result<Duration> {
    let s = s.trim();
    let Some((split, unit)) = s.char_indices().last() else {
        bail!("Empty duration");
    };
    let num: i64 = s[..split]
        .parse()
        .with_context(|| format!("Invalid duration: {}", s))?;

    let duration = match unit {
        'h' => Duration::hours(num),
        'd' => Duration::days(num),
        'w' => Duration::weeks(num),
        'm' => Duration::minutes(num),
        _ => bail!("Unknown duration unit: {}", unit),
    };
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age("2h").unwrap(), Duration::hours(2));
        assert_eq!(parse_age(" 3d ").unwrap(), Duration::days(3));
        assert_eq!(parse_age("1w").unwrap(), Duration::weeks(1));
        assert_eq!(parse_age("30m").unwrap(), Duration::minutes(30));
    }

    #[test]
    fn test_parse_age_rejects_garbage() {
        assert!(parse_age("").is_err());
        assert!(parse_age("   ").is_err());
        assert!(parse_age("h").is_err());
        assert!(parse_age("5x").is_err());
        assert!(parse_age("5é").is_err());
        assert!(parse_age("é").is_err());
    }

    #[test]
    fn test_parse_duration_is_in_the_past() {
        let since = parse_duration("1h").unwrap();
        assert!(since < Utc::now());
    }
}
