//! Keeper configuration.
//!
//! Loaded from TOML with `PERPLIQ__*` environment overrides (for example
//! `PERPLIQ__HANDLER__COMPUTE_BUDGET=500000`). Addresses, prices and sizes
//! are strings in the file and parsed into typed values by the accessors
//! below, which is also where the file is validated.

use std::collections::HashMap;
use std::path::Path;

use perpliq_core::{
    parse_address, Address, CoreError, OrderType, Position, PositionDescriptor, Price, PriceProps,
    PriceSet, Role, TokenAmount, Usd, B256,
};
use perpliq_handler::{FeatureGate, HandlerConfig, StrategyKind, StrategyRoutes};
use serde::{Deserialize, Serialize};

use crate::error::{KeeperError, KeeperResult};

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "PERPLIQ";

/// Which guarded handler operation a job or feature flag refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    #[default]
    Liquidation,
    Adl,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liquidation => "liquidation",
            Self::Adl => "adl",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Data store address; order keys are derived from it.
    pub data_store: String,
    /// Block the venue starts at. Default: 0.
    #[serde(default)]
    pub current_block: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleGrant {
    pub account: String,
    /// Role name, e.g. "liquidation_keeper".
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisabledFeature {
    pub operation: OperationKind,
    /// Order type name, e.g. "liquidation" or "market_decrease".
    pub order_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionConfig {
    pub account: String,
    pub market: String,
    pub collateral_token: String,
    pub is_long: bool,
    pub size_usd: String,
    #[serde(default)]
    pub size_tokens: Option<String>,
    #[serde(default)]
    pub collateral: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEntry {
    pub token: String,
    pub min: String,
    /// Defaults to `min`.
    #[serde(default)]
    pub max: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    #[serde(default)]
    pub operation: OperationKind,
    pub account: String,
    pub market: String,
    pub collateral_token: String,
    pub is_long: bool,
    /// Required for ADL jobs.
    #[serde(default)]
    pub size_delta_usd: Option<String>,
    #[serde(default)]
    pub observed_at_block: Option<u64>,
    pub prices: Vec<PriceEntry>,
}

/// Keeper configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeeperConfig {
    /// Address identifying the handler in feature-flag keys.
    pub handler_address: String,
    /// Account the keeper calls the handler as.
    pub keeper: String,
    #[serde(default)]
    pub handler: HandlerConfig,
    pub venue: VenueConfig,
    #[serde(default)]
    pub roles: Vec<RoleGrant>,
    /// Order type name to strategy overrides on top of the default routes.
    #[serde(default)]
    pub routes: HashMap<String, StrategyKind>,
    #[serde(default)]
    pub disabled_features: Vec<DisabledFeature>,
    #[serde(default)]
    pub positions: Vec<PositionConfig>,
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

/// A job ready to hand to the handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub name: String,
    pub operation: JobOperation,
    pub position: PositionDescriptor,
    pub prices: PriceSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOperation {
    Liquidation,
    Adl { size_delta_usd: Usd },
}

impl JobOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liquidation => OperationKind::Liquidation.as_str(),
            Self::Adl { .. } => OperationKind::Adl.as_str(),
        }
    }
}

impl KeeperConfig {
    /// Load `path`, then apply environment overrides.
    pub fn from_file(path: &str) -> KeeperResult<Self> {
        if !Path::new(path).exists() {
            return Err(KeeperError::Config(format!("config file not found: {path}")));
        }

        let settings = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text without environment overrides.
    pub fn from_toml_str(content: &str) -> KeeperResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| KeeperError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field parses and the handler settings are usable.
    pub fn validate(&self) -> KeeperResult<()> {
        if self.handler.compute_budget == 0 {
            return Err(KeeperError::Config("handler.compute_budget must be > 0".to_string()));
        }
        if self.handler.step_cost.saturating_mul(4) >= self.handler.compute_budget {
            return Err(KeeperError::Config(format!(
                "handler.step_cost {} leaves no budget for strategies out of {}",
                self.handler.step_cost, self.handler.compute_budget
            )));
        }

        self.handler_address()?;
        self.keeper_address()?;
        self.data_store_address()?;
        self.role_grants()?;
        self.routes()?;
        self.disabled_feature_keys()?;
        self.initial_positions()?;
        self.parsed_jobs()?;
        Ok(())
    }

    pub fn handler_address(&self) -> KeeperResult<Address> {
        Ok(parse_address(&self.handler_address)?)
    }

    pub fn keeper_address(&self) -> KeeperResult<Address> {
        Ok(parse_address(&self.keeper)?)
    }

    pub fn data_store_address(&self) -> KeeperResult<Address> {
        Ok(parse_address(&self.venue.data_store)?)
    }

    pub fn role_grants(&self) -> KeeperResult<Vec<(Address, Role)>> {
        self.roles
            .iter()
            .map(|grant| -> KeeperResult<(Address, Role)> {
                Ok((parse_address(&grant.account)?, grant.role.parse()?))
            })
            .collect()
    }

    pub fn routes(&self) -> KeeperResult<StrategyRoutes> {
        self.routes
            .iter()
            .try_fold(
                StrategyRoutes::default(),
                |routes, (order_type, kind)| -> KeeperResult<StrategyRoutes> {
                    Ok(routes.set(order_type.parse::<OrderType>()?, *kind))
                },
            )
    }

    /// Data-store keys of the configured kill switches.
    pub fn disabled_feature_keys(&self) -> KeeperResult<Vec<B256>> {
        let handler = self.handler_address()?;
        self.disabled_features
            .iter()
            .map(|feature| -> KeeperResult<B256> {
                let order_type: OrderType = feature.order_type.parse()?;
                Ok(match feature.operation {
                    OperationKind::Liquidation => {
                        FeatureGate::execute_order_key(handler, order_type)
                    }
                    OperationKind::Adl => FeatureGate::execute_adl_key(handler, order_type),
                })
            })
            .collect()
    }

    pub fn initial_positions(&self) -> KeeperResult<Vec<Position>> {
        self.positions
            .iter()
            .map(|p| -> KeeperResult<Position> {
                let descriptor = PositionDescriptor::new(
                    parse_address(&p.account)?,
                    parse_address(&p.market)?,
                    parse_address(&p.collateral_token)?,
                    p.is_long,
                );
                let mut position = Position::empty(&descriptor);
                position.size_in_usd = p.size_usd.parse::<Usd>().map_err(CoreError::from)?;
                if let Some(tokens) = &p.size_tokens {
                    position.size_in_tokens =
                        tokens.parse::<TokenAmount>().map_err(CoreError::from)?;
                }
                if let Some(collateral) = &p.collateral {
                    position.collateral_amount =
                        collateral.parse::<TokenAmount>().map_err(CoreError::from)?;
                }
                position.increased_at_block = self.venue.current_block;
                Ok(position)
            })
            .collect()
    }

    pub fn parsed_jobs(&self) -> KeeperResult<Vec<Job>> {
        self.jobs.iter().map(parse_job).collect()
    }
}

fn parse_job(job: &JobConfig) -> KeeperResult<Job> {
    let invalid = |reason: String| KeeperError::Config(format!("job {}: {reason}", job.name));

    let position = PositionDescriptor::new(
        parse_address(&job.account)?,
        parse_address(&job.market)?,
        parse_address(&job.collateral_token)?,
        job.is_long,
    );

    let operation = match (job.operation, &job.size_delta_usd) {
        (OperationKind::Liquidation, None) => JobOperation::Liquidation,
        (OperationKind::Liquidation, Some(_)) => {
            return Err(invalid("size_delta_usd is only valid for adl jobs".to_string()));
        }
        (OperationKind::Adl, Some(delta)) => JobOperation::Adl {
            size_delta_usd: delta
                .parse::<Usd>()
                .map_err(|e| invalid(format!("size_delta_usd: {e}")))?,
        },
        (OperationKind::Adl, None) => {
            return Err(invalid("adl jobs need size_delta_usd".to_string()));
        }
    };

    let mut prices = PriceSet::new();
    for entry in &job.prices {
        let min: Price = entry
            .min
            .parse()
            .map_err(|e| invalid(format!("price of {}: {e}", entry.token)))?;
        let max: Price = match &entry.max {
            Some(max) => max
                .parse()
                .map_err(|e| invalid(format!("price of {}: {e}", entry.token)))?,
            None => min,
        };
        prices = prices.with_props(parse_address(&entry.token)?, PriceProps::new(min, max));
    }
    if let Some(block) = job.observed_at_block {
        prices = prices.observed_at(block);
    }
    prices
        .validate()
        .map_err(|e| invalid(format!("prices: {e}")))?;

    Ok(Job {
        name: job.name.clone(),
        operation,
        position,
        prices,
    })
}
