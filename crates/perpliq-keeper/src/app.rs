//! Keeper application.
//!
//! Builds an in-memory venue from the configuration, wires a
//! [`LiquidationHandler`] over it and runs the configured jobs in order.
//! Each job runs on a blocking task; Ctrl-C stops the run between jobs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use perpliq_core::Address;
use perpliq_handler::{
    ExecutionReceipt, LiquidationError, LiquidationHandler, StrategyDispatcher, StrategyRegistry,
};
use perpliq_venue::{
    Contracts, DataStore, EventLog, InMemoryDataStore, InMemoryOracle, InMemoryOrderVault,
    InMemoryReferralStorage, InMemoryRoleStore, InMemorySwapHandler,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Job, JobOperation, KeeperConfig};
use crate::error::{KeeperError, KeeperResult};

/// Result of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub name: String,
    pub operation: &'static str,
    pub executed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobOutcome {
    fn executed(job: &Job, receipt: &ExecutionReceipt) -> Self {
        Self {
            name: job.name.clone(),
            operation: job.operation.as_str(),
            executed: true,
            order_key: Some(receipt.order_key.to_string()),
            strategy: Some(receipt.strategy.to_string()),
            compute_used: Some(receipt.compute_used),
            reason: None,
            error: None,
        }
    }

    fn aborted(job: &Job, error: &LiquidationError) -> Self {
        Self {
            name: job.name.clone(),
            operation: job.operation.as_str(),
            executed: false,
            order_key: None,
            strategy: None,
            compute_used: None,
            reason: Some(error.reason()),
            error: Some(error.to_string()),
        }
    }
}

/// Summary printed at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub jobs: Vec<JobOutcome>,
    pub skipped: usize,
    pub orders: usize,
    pub positions_remaining: usize,
    pub events: Vec<&'static str>,
}

impl RunSummary {
    pub fn executed(&self) -> usize {
        self.jobs.iter().filter(|j| j.executed).count()
    }

    pub fn aborted(&self) -> usize {
        self.jobs.len() - self.executed()
    }
}

/// Keeper over an in-memory venue.
pub struct Keeper {
    keeper: Address,
    handler: Arc<LiquidationHandler>,
    data_store: Arc<InMemoryDataStore>,
    events: Arc<EventLog>,
    jobs: Vec<Job>,
}

impl Keeper {
    /// Build the venue and handler described by `config`.
    pub fn new(config: &KeeperConfig) -> KeeperResult<Self> {
        config.validate()?;

        let data_store = Arc::new(InMemoryDataStore::new(config.data_store_address()?));
        data_store.set_current_block(config.venue.current_block);
        for position in config.initial_positions()? {
            data_store.set_position(position);
        }
        for key in config.disabled_feature_keys()? {
            data_store.set_bool(key, true);
        }

        let role_store = Arc::new(InMemoryRoleStore::new());
        for (account, role) in config.role_grants()? {
            role_store.grant_role(account, &role);
        }

        let events = Arc::new(EventLog::new());
        let contracts = Contracts {
            data_store: data_store.clone(),
            role_store,
            event_emitter: events.clone(),
            order_vault: Arc::new(InMemoryOrderVault::new()),
            oracle: Arc::new(InMemoryOracle::new()),
            swap_handler: Arc::new(InMemorySwapHandler::new()),
            referral_storage: Arc::new(InMemoryReferralStorage::new()),
        };

        let dispatcher =
            StrategyDispatcher::new(config.routes()?, StrategyRegistry::with_builtin());
        let handler = Arc::new(LiquidationHandler::new(
            config.handler_address()?,
            config.handler.clone(),
            contracts,
            dispatcher,
        ));

        let jobs = config.parsed_jobs()?;
        info!(
            jobs = jobs.len(),
            positions = data_store.position_count(),
            "Keeper ready"
        );

        Ok(Self {
            keeper: config.keeper_address()?,
            handler,
            data_store,
            events,
            jobs,
        })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn handler(&self) -> &Arc<LiquidationHandler> {
        &self.handler
    }

    /// Run one job synchronously.
    pub fn run_job(&self, job: &Job) -> JobOutcome {
        run_job(&self.handler, self.keeper, job)
    }

    /// Run every job in order, stopping early once `shutdown` is set.
    pub async fn run(&self, shutdown: Arc<AtomicBool>) -> KeeperResult<RunSummary> {
        let mut outcomes = Vec::with_capacity(self.jobs.len());

        for (i, job) in self.jobs.iter().enumerate() {
            if shutdown.load(Ordering::SeqCst) {
                warn!(
                    remaining = self.jobs.len() - i,
                    "Shutdown requested, skipping remaining jobs"
                );
                break;
            }

            let handler = self.handler.clone();
            let keeper = self.keeper;
            let task_job = job.clone();
            let outcome = tokio::task::spawn_blocking(move || run_job(&handler, keeper, &task_job))
                .await
                .map_err(|e| KeeperError::Job {
                    job: job.name.clone(),
                    reason: e.to_string(),
                })?;
            outcomes.push(outcome);
        }

        Ok(self.summary(outcomes))
    }

    fn summary(&self, jobs: Vec<JobOutcome>) -> RunSummary {
        RunSummary {
            skipped: self.jobs.len() - jobs.len(),
            jobs,
            orders: self.data_store.order_count(),
            positions_remaining: self.data_store.position_count(),
            events: self.events.names(),
        }
    }
}

fn run_job(handler: &LiquidationHandler, keeper: Address, job: &Job) -> JobOutcome {
    let p = &job.position;
    let result = match job.operation {
        JobOperation::Liquidation => handler.execute_liquidation(
            keeper,
            p.account,
            p.market,
            p.collateral_token,
            p.is_long,
            &job.prices,
        ),
        JobOperation::Adl { size_delta_usd } => handler.execute_adl(
            keeper,
            p.account,
            p.market,
            p.collateral_token,
            p.is_long,
            size_delta_usd,
            &job.prices,
        ),
    };

    match result {
        Ok(receipt) => {
            info!(job = %job.name, order_key = %receipt.order_key, "Job executed");
            JobOutcome::executed(job, &receipt)
        }
        Err(e) => {
            warn!(job = %job.name, reason = e.reason(), error = %e, "Job aborted");
            JobOutcome::aborted(job, &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
handler_address = "0x1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f"
keeper = "0x4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b"

[venue]
data_store = "0xd5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5"
current_block = 1000

[[roles]]
account = "0x4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b"
role = "liquidation_keeper"

[[roles]]
account = "0x4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b"
role = "adl_keeper"

[[positions]]
account = "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1"
market = "0xb2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2"
collateral_token = "0xc3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3"
is_long = true
size_usd = "1000"
size_tokens = "10"

[[jobs]]
name = "deleverage"
operation = "adl"
account = "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1"
market = "0xb2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2"
collateral_token = "0xc3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3"
is_long = true
size_delta_usd = "400"

[[jobs.prices]]
token = "0xc3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3"
min = "100"

[[jobs]]
name = "liquidate"
account = "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1"
market = "0xb2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2"
collateral_token = "0xc3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3"
is_long = true

[[jobs.prices]]
token = "0xc3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3"
min = "100"

[[jobs]]
name = "liquidate-again"
account = "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1"
market = "0xb2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2"
collateral_token = "0xc3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3"
is_long = true

[[jobs.prices]]
token = "0xc3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3"
min = "100"
"#;

    #[tokio::test]
    async fn test_run_all_jobs() {
        let config = KeeperConfig::from_toml_str(CONFIG).unwrap();
        let keeper = Keeper::new(&config).unwrap();

        let summary = keeper.run(Arc::new(AtomicBool::new(false))).await.unwrap();

        assert_eq!(summary.jobs.len(), 3);
        assert!(summary.jobs[0].executed);
        assert!(summary.jobs[1].executed);
        assert!(!summary.jobs[2].executed);
        assert_eq!(summary.jobs[2].reason, Some("empty_position"));
        assert_eq!(summary.executed(), 2);
        assert_eq!(summary.aborted(), 1);
        assert_eq!(summary.orders, 2);
        assert_eq!(summary.positions_remaining, 0);
        assert_eq!(summary.events.last(), Some(&"LiquidationAborted"));
        assert!(!keeper.handler().is_locked());
    }

    #[tokio::test]
    async fn test_shutdown_skips_jobs() {
        let config = KeeperConfig::from_toml_str(CONFIG).unwrap();
        let keeper = Keeper::new(&config).unwrap();

        let summary = keeper.run(Arc::new(AtomicBool::new(true))).await.unwrap();

        assert!(summary.jobs.is_empty());
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.orders, 0);
    }

    #[test]
    fn test_summary_serializes() {
        let config = KeeperConfig::from_toml_str(CONFIG).unwrap();
        let keeper = Keeper::new(&config).unwrap();
        let outcome = keeper.run_job(&keeper.jobs()[1]);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["name"], "liquidate");
        assert_eq!(json["executed"], true);
        assert_eq!(json["strategy"], "decrease");
        assert!(json.get("reason").is_none());
    }
}
