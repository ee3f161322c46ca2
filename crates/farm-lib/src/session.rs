use std::{
    future::Future,
    sync::{Arc, Mutex, OnceLock, PoisonError},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use near_sdk::AccountId;
use tokio::{
    sync::{watch, Mutex as AsyncMutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{
    call, compute_stake_amount, normalize_farm_account, normalize_reward_account,
    normalize_stats, view, yocto_to_near, AccountView, ChainClient, ExtrapolatedView, FarmConfig,
    FarmError, FarmResult, PixelCost, StakeRequest, StatsView,
};

/// Period of the balance animation.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub trait Clock: Send + Sync + 'static {
    /// Milliseconds since the unix epoch.
    fn now_ms(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_millis() as u64)
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenState {
    Disconnected,
    Connecting,
    SignedOut,
    SignedIn(Activity),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Refreshing,
    Staking,
    Claiming,
}

/// A transaction that went through. `refreshed` reports the reload that
/// follows it, which may fail without undoing the transaction.
#[derive(Debug)]
pub struct TxOutcome {
    pub amount: u128,
    pub refreshed: FarmResult<Arc<AccountView>>,
}

/// Everything the dashboard knows about the chain and the signed in account.
///
/// Views are only ever replaced as a whole. Refreshes and transactions share
/// one guard: starting one while another is in flight fails with
/// [`FarmError::RefreshInFlight`] instead of interleaving snapshots.
pub struct Session<C, K = SystemClock> {
    client: Arc<C>,
    clock: Arc<K>,
    config: FarmConfig,
    pixel_cost: OnceLock<PixelCost>,
    account_id: watch::Sender<Option<AccountId>>,
    state: watch::Sender<ScreenState>,
    stats: watch::Sender<Option<Arc<StatsView>>>,
    account: watch::Sender<Option<Arc<AccountView>>>,
    projected: Arc<watch::Sender<Option<ExtrapolatedView>>>,
    in_flight: AsyncMutex<()>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl<C: ChainClient> Session<C> {
    pub fn new(client: Arc<C>, config: FarmConfig) -> Self {
        Self::with_clock(client, Arc::new(SystemClock), config)
    }
}

impl<C: ChainClient, K: Clock> Session<C, K> {
    pub fn with_clock(client: Arc<C>, clock: Arc<K>, config: FarmConfig) -> Self {
        Self {
            client,
            clock,
            config,
            pixel_cost: OnceLock::new(),
            account_id: watch::Sender::new(None),
            state: watch::Sender::new(ScreenState::Disconnected),
            stats: watch::Sender::new(None),
            account: watch::Sender::new(None),
            projected: Arc::new(watch::Sender::new(None)),
            in_flight: AsyncMutex::new(()),
            ticker: Mutex::new(None),
        }
    }

    /// Reads the pixel cost and loads the first snapshot for `account_id`,
    /// or only the global stats when nobody is signed in.
    pub async fn connect(&self, account_id: Option<AccountId>) -> FarmResult<()> {
        let _guard = self.guard()?;
        self.state.send_replace(ScreenState::Connecting);
        if self.pixel_cost.get().is_none() {
            match view::get_pixel_cost(self.client.as_ref(), &self.config).await {
                Ok(pixel_cost) => {
                    let _ = self.pixel_cost.set(pixel_cost);
                }
                Err(err) => {
                    self.state.send_replace(ScreenState::Disconnected);
                    return Err(err);
                }
            }
        }
        match account_id {
            Some(account_id) => self.switch_account(account_id).await,
            None => {
                self.state.send_replace(ScreenState::SignedOut);
                self.load_stats().await.map(|_| ())
            }
        }
    }

    /// Fails with [`FarmError::RefreshInFlight`] without touching the current
    /// account while another operation runs.
    pub async fn sign_in(&self, account_id: AccountId) -> FarmResult<()> {
        let _guard = self.guard()?;
        self.pixel_cost()?;
        self.switch_account(account_id).await
    }

    /// Forgets the account and stops the balance animation. Global stats stay.
    ///
    /// Never blocked by an operation in flight. Such an operation drops its
    /// snapshot, and a submitted transaction still reports its amount.
    pub fn sign_out(&self) {
        self.teardown();
        self.account_id.send_replace(None);
        if self.pixel_cost.get().is_some() {
            self.state.send_replace(ScreenState::SignedOut);
        }
    }

    /// Refreshes the account when signed in, otherwise only the global stats.
    pub async fn refresh(&self) -> FarmResult<()> {
        if self.account_id().is_some() {
            self.refresh_account().await.map(|_| ())
        } else {
            let _guard = self.guard()?;
            self.load_stats().await.map(|_| ())
        }
    }

    pub async fn refresh_stats(&self) -> FarmResult<Arc<StatsView>> {
        let _guard = self.guard()?;
        self.load_stats().await
    }

    pub async fn refresh_account(&self) -> FarmResult<Arc<AccountView>> {
        let _guard = self.guard()?;
        let account_id = self.account_id().ok_or(FarmError::SignedOut)?;
        self.with_activity(Activity::Refreshing, self.load_account(&account_id))
            .await
    }

    /// Swaps bananas for cucumbers. The balance is refreshed first and the
    /// amount checked against it before anything is submitted.
    pub async fn stake(&self, request: StakeRequest) -> FarmResult<TxOutcome> {
        let _guard = self.guard()?;
        let account_id = self.account_id().ok_or(FarmError::SignedOut)?;
        let pixel_cost = self.pixel_cost()?;
        self.with_activity(Activity::Staking, async {
            let view = self.load_account(&account_id).await?;
            let amount =
                compute_stake_amount(request, pixel_cost, view.farm.banana_balance_raw)?;
            if amount == 0 {
                return Err(FarmError::InvalidAmount(format!(
                    "{request} amounts to no bananas"
                )));
            }
            let amount = call::stake_bananas(self.client.as_ref(), &self.config, amount).await?;
            Ok(TxOutcome {
                amount,
                refreshed: self.load_account(&account_id).await,
            })
        })
        .await
    }

    /// Claims accrued NEAR rewards. The outcome amount is in yoctoNEAR.
    pub async fn claim(&self) -> FarmResult<TxOutcome> {
        let _guard = self.guard()?;
        let account_id = self.account_id().ok_or(FarmError::SignedOut)?;
        self.with_activity(Activity::Claiming, async {
            let amount = call::claim_near(self.client.as_ref(), &self.config).await?;
            Ok(TxOutcome {
                amount,
                refreshed: self.load_account(&account_id).await,
            })
        })
        .await
    }

    /// Projected balances, updated every [`TICK_INTERVAL`] while signed in.
    pub fn subscribe(&self) -> watch::Receiver<Option<ExtrapolatedView>> {
        self.projected.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ScreenState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ScreenState {
        *self.state.borrow()
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id.borrow().clone()
    }

    pub fn account(&self) -> Option<Arc<AccountView>> {
        self.account.borrow().clone()
    }

    pub fn stats(&self) -> Option<Arc<StatsView>> {
        self.stats.borrow().clone()
    }

    pub fn config(&self) -> &FarmConfig {
        &self.config
    }

    pub fn pixel_cost(&self) -> FarmResult<PixelCost> {
        self.pixel_cost
            .get()
            .copied()
            .ok_or_else(|| FarmError::Configuration("session is not connected".to_string()))
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn guard(&self) -> FarmResult<tokio::sync::MutexGuard<'_, ()>> {
        self.in_flight
            .try_lock()
            .map_err(|_| FarmError::RefreshInFlight)
    }

    async fn with_activity<T>(
        &self,
        activity: Activity,
        fut: impl Future<Output = FarmResult<T>>,
    ) -> FarmResult<T> {
        self.set_activity(activity);
        let res = fut.await;
        self.set_activity(Activity::Idle);
        res
    }

    fn set_activity(&self, activity: Activity) {
        self.state.send_if_modified(|state| match state {
            ScreenState::SignedIn(current) if *current != activity => {
                *current = activity;
                true
            }
            _ => false,
        });
    }

    async fn switch_account(&self, account_id: AccountId) -> FarmResult<()> {
        self.teardown();
        self.account_id.send_replace(Some(account_id.clone()));
        self.state
            .send_replace(ScreenState::SignedIn(Activity::Idle));
        self.with_activity(Activity::Refreshing, self.load_account(&account_id))
            .await
            .map(|_| ())
    }

    async fn fetch_stats(&self, pixel_cost: PixelCost) -> FarmResult<StatsView> {
        let client = self.client.as_ref();
        let (raw, schedule) = tokio::try_join!(
            view::get_stats(client, &self.config),
            view::get_reward_schedule(client, &self.config),
        )?;
        Ok(normalize_stats(raw, schedule, pixel_cost, self.clock.now_ms()))
    }

    async fn load_stats(&self) -> FarmResult<Arc<StatsView>> {
        let stats = Arc::new(self.fetch_stats(self.pixel_cost()?).await?);
        self.stats.send_replace(Some(Arc::clone(&stats)));
        Ok(stats)
    }

    /// Publishes stats and account together, or nothing when any view fails.
    async fn load_account(&self, account_id: &AccountId) -> FarmResult<Arc<AccountView>> {
        let pixel_cost = self.pixel_cost()?;
        let client = self.client.as_ref();
        let (stats, farm, reward, wallet_balance) = tokio::try_join!(
            self.fetch_stats(pixel_cost),
            view::get_farm_account(client, &self.config, account_id),
            view::get_reward_account(client, &self.config, account_id),
            view::get_account_balance(client, account_id),
        )?;
        let start_time_ms = self.clock.now_ms();

        let view = Arc::new(AccountView::new(
            normalize_farm_account(farm, account_id, pixel_cost, start_time_ms),
            normalize_reward_account(reward, pixel_cost, &stats),
            yocto_to_near(wallet_balance),
        ));
        // Signed out while the snapshot was in flight.
        if self.account_id().as_ref() != Some(account_id) {
            return Err(FarmError::SignedOut);
        }
        self.stats.send_replace(Some(Arc::new(stats)));
        self.account.send_replace(Some(Arc::clone(&view)));
        self.restart_ticker(Arc::clone(&view));
        Ok(view)
    }

    fn restart_ticker(&self, snapshot: Arc<AccountView>) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
        self.projected
            .send_replace(Some(snapshot.extrapolate(self.clock.now_ms())));

        let projected = Arc::clone(&self.projected);
        let clock = Arc::clone(&self.clock);
        *ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                projected.send_replace(Some(snapshot.extrapolate(clock.now_ms())));
            }
        }));
    }

    fn teardown(&self) {
        self.stop_ticker();
        self.account.send_replace(None);
        self.projected.send_replace(None);
    }

    fn stop_ticker(&self) {
        if let Some(handle) = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl<C, K> Drop for Session<C, K> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .ticker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
