mod render;

use std::{
    env,
    io::{self, Write},
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use farm_client::WorkspacesClient;
use farm_lib::{yocto_to_near, FarmConfig, Network, Session, StakeRequest, TxOutcome};
use near_sdk::AccountId;
use near_workspaces::network::{Mainnet, Testnet};
use owo_colors::OwoColorize;
use tokio::time;

const STATS_INTERVAL: Duration = Duration::from_secs(1);

enum Command {
    Watch,
    Stats,
    Stake(StakeRequest),
    Claim,
}

impl Command {
    fn from_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        Ok(match args.next().as_deref() {
            None | Some("watch") => Self::Watch,
            Some("stats") => Self::Stats,
            Some("stake") => Self::Stake(args.next().unwrap_or_default().parse()?),
            Some("claim") => Self::Claim,
            Some(other) => anyhow::bail!(
                "unknown command `{other}`, expected one of: watch, stats, stake <amount|all>, claim"
            ),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let command = Command::from_args(env::args().skip(1))?;
    let config = FarmConfig::from_env()?;
    match config.network {
        Network::Mainnet => {
            let client = farm_client::mainnet(&config).await?;
            run::<Mainnet>(client, config, command).await
        }
        Network::Testnet => {
            let client = farm_client::testnet(&config).await?;
            run::<Testnet>(client, config, command).await
        }
    }
}

async fn run<T>(
    client: WorkspacesClient<T>,
    config: FarmConfig,
    command: Command,
) -> anyhow::Result<()>
where
    T: near_workspaces::Network + 'static,
{
    let client = match env::var("FARM_ACCOUNT_ID") {
        Ok(account_id) => {
            let account_id: AccountId = account_id.parse()?;
            let secret_key = env::var("PRIVATE_KEY")
                .context("PRIVATE_KEY is required together with FARM_ACCOUNT_ID")?
                .parse()?;
            client.with_signer(&account_id, secret_key)?
        }
        Err(_) => client,
    };
    let account_id = client.signer_id();
    let session = Session::new(Arc::new(client), config);
    session.connect(account_id).await?;

    match command {
        Command::Watch => watch(&session).await,
        Command::Stats => {
            if let Some(stats) = session.stats() {
                println!("{}", render::global_stats(&stats));
                println!("{}", render::reward_timer(stats.reward_timer));
            }
            if let (Some(view), Some(stats)) = (session.account(), session.stats()) {
                println!("{}", render::balances(&view.extrapolate(session.now_ms())));
                println!("{}", render::rewards(&view, &stats));
            }
            Ok(())
        }
        Command::Stake(request) => {
            let outcome = session.stake(request).await?;
            println!(
                "Swapped {} {} for {}",
                outcome.amount.bright_yellow(),
                render::BANANA,
                render::CUCUMBER
            );
            report_refresh(outcome);
            Ok(())
        }
        Command::Claim => {
            let outcome = session.claim().await?;
            println!(
                "Claimed {:.6} {}",
                yocto_to_near(outcome.amount).bright_magenta().bold(),
                render::NEAR
            );
            report_refresh(outcome);
            Ok(())
        }
    }
}

fn report_refresh(outcome: TxOutcome) {
    match outcome.refreshed {
        Ok(view) => {
            let projected = view.extrapolate(view.farm.start_time_ms);
            println!("{}", render::balances(&projected));
        }
        Err(err) => println!(
            "{} {}",
            "Transaction went through, balances not reloaded:".bright_red(),
            err
        ),
    }
}

/// Redraws the dashboard on every tick until the process is stopped.
async fn watch<C, K>(session: &Session<C, K>) -> anyhow::Result<()>
where
    C: farm_lib::ChainClient,
    K: farm_lib::Clock,
{
    let mut projected = session.subscribe();
    let mut stats_interval = time::interval(STATS_INTERVAL);
    let mut timer = None;
    loop {
        tokio::select! {
            changed = projected.changed() => changed?,
            _ = stats_interval.tick() => {
                let Some(stats) = session.stats() else {
                    continue;
                };
                timer = stats.reward_timer_at(session.now_ms());
                if timer.is_none() {
                    if let Err(err) = session.refresh().await {
                        println!("\n{}", err.bright_red());
                        continue;
                    }
                    if let Some(stats) = session.stats() {
                        println!("\n{}", render::global_stats(&stats));
                        if let Some(view) = session.account() {
                            println!("{}", render::rewards(&view, &stats));
                        }
                        timer = stats.reward_timer_at(session.now_ms());
                    }
                }
            }
        }
        let line = render::dashboard(projected.borrow_and_update().as_ref(), timer);
        print!("\r{line}\x1b[K");
        io::stdout().flush()?;
    }
}
