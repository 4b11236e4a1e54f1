//! Shared wiring for integration flows.

use dispatch_telemetry::{init_logging, TelemetryConfig};
use std::sync::Arc;
use tx_dispatch::{
    Account, AccountId, DispatchConfig, DispatchPorts, DispatchSession, InMemorySocialApi,
    InMemoryWallet, ManualTimeSource, RecordingNavigator, SocialActions,
};

/// Everything a scenario needs to drive and inspect dispatches.
pub struct World {
    /// Scripted social API and broadcast relay
    pub api: Arc<InMemorySocialApi>,
    /// Scripted wallet
    pub wallet: Arc<InMemoryWallet>,
    /// Navigation recorder
    pub navigator: Arc<RecordingNavigator>,
    /// Manual clock
    pub clock: Arc<ManualTimeSource>,
    /// Façade under test
    pub actions: Arc<SocialActions>,
}

impl World {
    /// Signed-in `account` at `initial_nonce`, wallet on the required chain.
    pub fn new(account: Account, initial_nonce: u64) -> Self {
        Self::with_wallet(account, initial_nonce, InMemoryWallet::on_chain(137))
    }

    /// Same as [`World::new`] with a custom wallet.
    pub fn with_wallet(account: Account, initial_nonce: u64, wallet: InMemoryWallet) -> Self {
        init_logging(&TelemetryConfig::for_tests()).ok();

        let api = Arc::new(InMemorySocialApi::new());
        let wallet = Arc::new(wallet);
        let navigator = Arc::new(RecordingNavigator::new());
        let clock = Arc::new(ManualTimeSource::new(1_700_000_000_000));
        let ports = DispatchPorts::new(api.clone(), wallet.clone(), wallet.clone())
            .with_navigator(navigator.clone())
            .with_clock(clock.clone());
        let session = Arc::new(DispatchSession::start(account, initial_nonce));
        let actions = Arc::new(SocialActions::new(
            session,
            api.clone(),
            ports,
            DispatchConfig::default(),
        ));

        Self {
            api,
            wallet,
            navigator,
            clock,
            actions,
        }
    }

    /// Current signing nonce.
    pub fn nonce(&self) -> u64 {
        self.actions.session().nonce().current()
    }
}

/// Profile-manager account with sponsorship.
pub fn relay_account() -> Account {
    Account::new(AccountId::new("0x01"), "0xowner").with_permissions(true, true)
}

/// Sponsored account without the profile manager.
pub fn broadcast_account() -> Account {
    Account::new(AccountId::new("0x01"), "0xowner").with_permissions(false, true)
}

/// Account that pays its own gas.
pub fn wallet_account() -> Account {
    Account::new(AccountId::new("0x01"), "0xowner")
}

/// Profile id `0x{n:02x}`.
pub fn profile(n: u32) -> AccountId {
    AccountId::new(format!("0x{n:02x}"))
}
