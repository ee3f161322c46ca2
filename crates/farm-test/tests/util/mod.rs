use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use farm_lib::{
    Berry, ChainClient, Clock, FarmConfig, RawFarmAccount, RawRewardAccount, RawStats, Session,
    ONE_NEAR,
};
use near_sdk::{
    json_types::{U128, U64},
    serde_json::{self, json, Value},
    AccountId, Gas, NearToken,
};
use owo_colors::OwoColorize;
use tokio::sync::{Notify, Semaphore};

pub const PIXEL_COST: u128 = 1_000;

#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub contract_id: AccountId,
    pub method: String,
    pub args: Value,
    pub gas: Gas,
    pub deposit: NearToken,
}

pub struct ChainState {
    pub pixel_cost: u128,
    pub farm_accounts: HashMap<AccountId, RawFarmAccount>,
    pub reward_accounts: HashMap<AccountId, RawRewardAccount>,
    pub stats: RawStats,
    pub next_reward_ms: u64,
    pub last_reward_ms: u64,
    pub expected_reward: u128,
    pub balances: HashMap<AccountId, u128>,
}

/// In-memory stand-in for the banana and farm contracts.
pub struct FakeChain {
    pub config: FarmConfig,
    pub signer: AccountId,
    pub state: Mutex<ChainState>,
    pub calls: Mutex<Vec<RecordedCall>>,
    pub fail: AtomicBool,
    /// Sets `fail` once a transaction went through.
    pub fail_after_call: AtomicBool,
    pub failing_views: Mutex<Vec<(AccountId, String)>>,
    /// When set, views wait for a permit after signalling `entered`.
    pub gate: Mutex<Option<Arc<Semaphore>>>,
    pub entered: Notify,
}

impl FakeChain {
    pub fn new(signer: &str) -> Self {
        Self {
            config: FarmConfig::mainnet(),
            signer: signer.parse().unwrap(),
            state: Mutex::new(ChainState {
                pixel_cost: PIXEL_COST,
                farm_accounts: HashMap::new(),
                reward_accounts: HashMap::new(),
                stats: RawStats {
                    total_cucumber_balance: U128(100_000),
                    total_near_claimed: U128(0),
                    total_near_received: U128(10 * ONE_NEAR),
                },
                next_reward_ms: 1_060_000,
                last_reward_ms: 1_000_000,
                expected_reward: ONE_NEAR,
                balances: HashMap::new(),
            }),
            calls: Mutex::new(vec![]),
            fail: AtomicBool::new(false),
            fail_after_call: AtomicBool::new(false),
            failing_views: Mutex::new(vec![]),
            gate: Mutex::new(None),
            entered: Notify::new(),
        }
    }

    pub fn with_farm_account(
        self,
        account_id: &str,
        avocado_balance: u128,
        banana_balance: u128,
        num_pixels: u32,
        farming_preference: Berry,
    ) -> Self {
        let account_id: AccountId = account_id.parse().unwrap();
        {
            let mut state = self.state.lock().unwrap();
            let account_index = state.farm_accounts.len() as u32;
            state.farm_accounts.insert(
                account_id.clone(),
                RawFarmAccount {
                    account_id,
                    account_index,
                    avocado_balance: U128(avocado_balance),
                    banana_balance: U128(banana_balance),
                    num_pixels,
                    farming_preference,
                },
            );
        }
        self
    }

    pub fn with_reward_account(
        self,
        account_id: &str,
        near_balance: u128,
        cucumber_balance: u128,
        near_claimed: u128,
    ) -> Self {
        self.state.lock().unwrap().reward_accounts.insert(
            account_id.parse().unwrap(),
            RawRewardAccount {
                near_balance: U128(near_balance),
                cucumber_balance: U128(cucumber_balance),
                near_claimed: U128(near_claimed),
            },
        );
        self
    }

    pub fn update(&self, f: impl FnOnce(&mut ChainState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_view(&self, contract_id: &AccountId, method: &str) {
        self.failing_views
            .lock()
            .unwrap()
            .push((contract_id.clone(), method.to_string()));
    }

    pub fn hold_views(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    fn answer_view(
        &self,
        contract_id: &AccountId,
        method: &str,
        args: &Value,
    ) -> anyhow::Result<Value> {
        let state = self.state.lock().unwrap();
        let account_id = || -> anyhow::Result<AccountId> {
            Ok(serde_json::from_value(args["account_id"].clone())?)
        };
        let res = if contract_id == &self.config.banana_contract_id {
            match method {
                "get_pixel_cost" => json!(U128(state.pixel_cost)),
                "get_account" => json!(state.farm_accounts.get(&account_id()?)),
                "get_next_reward_timestamp" => json!(U64(state.next_reward_ms * 1_000_000)),
                "get_last_reward_timestamp" => json!(U64(state.last_reward_ms * 1_000_000)),
                "get_expected_reward" => json!(U128(state.expected_reward)),
                _ => anyhow::bail!("{contract_id} has no view method {method}"),
            }
        } else if contract_id == &self.config.farm_contract_id {
            match method {
                "get_account" => json!(state.reward_accounts.get(&account_id()?)),
                "get_stats" => json!(state.stats),
                _ => anyhow::bail!("{contract_id} has no view method {method}"),
            }
        } else {
            anyhow::bail!("unknown contract {contract_id}");
        };
        Ok(res)
    }

    fn execute(
        &self,
        contract_id: &AccountId,
        method: &str,
        args: &Value,
    ) -> anyhow::Result<Value> {
        let mut state = self.state.lock().unwrap();
        let state = &mut *state;
        match method {
            "ft_transfer_call" if contract_id == &self.config.banana_contract_id => {
                let amount: U128 = serde_json::from_value(args["amount"].clone())?;
                let account = state
                    .farm_accounts
                    .get_mut(&self.signer)
                    .ok_or_else(|| anyhow::anyhow!("account not registered"))?;
                anyhow::ensure!(account.banana_balance.0 >= amount.0, "Not enough balance");
                account.banana_balance.0 -= amount.0;
                let reward = state
                    .reward_accounts
                    .entry(self.signer.clone())
                    .or_insert(RawRewardAccount {
                        near_balance: U128(0),
                        cucumber_balance: U128(0),
                        near_claimed: U128(0),
                    });
                reward.cucumber_balance.0 += amount.0;
                state.stats.total_cucumber_balance.0 += amount.0;
                Ok(json!(amount))
            }
            "claim_near" if contract_id == &self.config.farm_contract_id => {
                let amount = match state.reward_accounts.get_mut(&self.signer) {
                    Some(reward) => {
                        let amount = reward.near_balance.0;
                        reward.near_balance.0 = 0;
                        reward.near_claimed.0 += amount;
                        amount
                    }
                    None => 0,
                };
                state.stats.total_near_claimed.0 += amount;
                *state.balances.entry(self.signer.clone()).or_default() += amount;
                Ok(json!(U128(amount)))
            }
            _ => anyhow::bail!("{contract_id} has no call method {method}"),
        }
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            self.entered.notify_one();
            let _permit = gate.acquire().await;
        }
    }

    fn check_failure(&self, method: &str) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            println!("{} {}", method.italic(), "rejected".bright_red());
            anyhow::bail!("RPC node unreachable");
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn view(
        &self,
        contract_id: &AccountId,
        method: &str,
        args: Value,
    ) -> anyhow::Result<Value> {
        self.pass_gate().await;
        self.check_failure(method)?;
        let failing = self
            .failing_views
            .lock()
            .unwrap()
            .iter()
            .any(|(contract, failing)| contract == contract_id && failing == method);
        if failing {
            println!(
                "{} {} {}",
                contract_id.bright_cyan(),
                method.italic(),
                "rejected".bright_red()
            );
            anyhow::bail!("{contract_id} {method} timed out");
        }
        self.answer_view(contract_id, method, &args)
    }

    async fn call(
        &self,
        contract_id: &AccountId,
        method: &str,
        args: Value,
        gas: Gas,
        deposit: NearToken,
    ) -> anyhow::Result<Value> {
        self.check_failure(method)?;
        println!(
            "{} {} {}",
            contract_id.bright_cyan(),
            method.italic(),
            args.bright_yellow()
        );
        self.calls.lock().unwrap().push(RecordedCall {
            contract_id: contract_id.clone(),
            method: method.to_string(),
            args: args.clone(),
            gas,
            deposit,
        });
        let res = self.execute(contract_id, method, &args)?;
        if self.fail_after_call.load(Ordering::SeqCst) {
            self.fail.store(true, Ordering::SeqCst);
        }
        Ok(res)
    }

    async fn account_balance(&self, account_id: &AccountId) -> anyhow::Result<NearToken> {
        self.pass_gate().await;
        self.check_failure("view_account")?;
        let state = self.state.lock().unwrap();
        Ok(NearToken::from_yoctonear(
            state.balances.get(account_id).copied().unwrap_or_default(),
        ))
    }
}

#[derive(Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn at(now_ms: u64) -> Arc<Self> {
        Arc::new(Self(AtomicU64::new(now_ms)))
    }

    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub const START_MS: u64 = 1_030_000;

pub struct Init {
    pub chain: Arc<FakeChain>,
    pub clock: Arc<ManualClock>,
    pub session: Arc<Session<FakeChain, ManualClock>>,
}

pub async fn connect(chain: FakeChain, signed_in: bool) -> anyhow::Result<Init> {
    let chain = Arc::new(chain);
    let clock = ManualClock::at(START_MS);
    let session = Arc::new(Session::with_clock(
        Arc::clone(&chain),
        Arc::clone(&clock),
        chain.config.clone(),
    ));
    let account_id = signed_in.then(|| chain.signer.clone());
    session.connect(account_id).await?;
    Ok(Init {
        chain,
        clock,
        session,
    })
}
