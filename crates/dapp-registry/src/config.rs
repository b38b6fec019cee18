//! Deployment configuration
//!
//! One YAML document per environment:
//! - ~/.config/dapp-registry/<env>.yaml
//!
//! It lists who owns what, the initial timelock, the token registry seed,
//! every filter contract with its parameters and the dapps to register on
//! first deployment.

use crate::filter::paraswap::{ExchangeKind, ParaswapConfig};
use crate::filter::uniswap::UniswapFactory;
use crate::filter::{
    AaveV1ATokenFilter, AaveV1LendingPoolFilter, AaveV2Filter, ArgentEnsManagerFilter,
    BalancerFilter, CompoundFilter, CurveFilter, DaiJoinFilter, Filter, FilterSet,
    GroDepositFilter, GroWithdrawFilter, LidoFilter, OnlyApproveFilter, ParaswapFilter, PotFilter,
    UniswapV2RouterFilter, UniswapV2UniZapFilter, VatFilter, WethFilter, YearnFilter,
    YearnV2Filter, ZkSyncFilter,
};
use crate::registry::{ListId, ROOT_LIST};
use crate::tokens::{SharedTokens, TokenRegistry, TradableTokens};
use alloy_primitives::Address;
use anyhow::{Context, Result};
use registry_core::Paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One week
pub const DEFAULT_TIMELOCK_PERIOD: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Owner of the root trust list
    #[serde(default)]
    pub root_owner: Address,

    /// Seconds between a request and its confirmation
    #[serde(default = "default_timelock_period")]
    pub timelock_period: u64,

    /// Owners of the trust lists other than the root one
    #[serde(default)]
    pub lists: BTreeMap<ListId, Address>,

    /// Initial token registry
    #[serde(default)]
    pub tokens: TokenRegistry,

    /// Filter contracts, by address
    #[serde(default)]
    pub filters: BTreeMap<Address, FilterSpec>,

    /// Dapps registered on deployment
    #[serde(default)]
    pub dapps: Vec<DappEntry>,
}

fn default_timelock_period() -> u64 {
    DEFAULT_TIMELOCK_PERIOD
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            root_owner: Address::ZERO,
            timelock_period: default_timelock_period(),
            lists: BTreeMap::new(),
            tokens: TokenRegistry::default(),
            filters: BTreeMap::new(),
            dapps: Vec::new(),
        }
    }
}

/// A dapp to register, with the filter vetting calls to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappEntry {
    /// Label for humans
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub list: ListId,

    pub address: Address,

    /// Filter address; absent means calls are not inspected
    #[serde(default)]
    pub filter: Option<Address>,
}

impl DappEntry {
    pub fn filter_address(&self) -> Address {
        self.filter.unwrap_or(Address::ZERO)
    }
}

/// Which filter lives at an address, and how it is parameterised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    OnlyApprove,
    Weth,
    Curve,
    Lido,
    MakerVat { dai_join: Address, pot: Address },
    MakerPot,
    MakerDaiJoin,
    AaveV1LendingPool,
    #[serde(rename = "aave_v1_atoken")]
    AaveV1AToken,
    AaveV2,
    Yearn {
        #[serde(default)]
        weth_vault: bool,
    },
    YearnV2,
    Balancer,
    GroDeposit,
    GroWithdraw,
    ArgentEnsManager,
    #[serde(rename = "zksync")]
    ZkSync,
    CompoundEther,
    CompoundToken { underlying: Address },
    UniswapV2Router { factory: UniswapFactory, weth: Address },
    UniswapV2Unizap { factory: UniswapFactory, weth: Address },
    Paraswap(ParaswapConfig),
}

impl FilterSpec {
    /// Instantiate the filter. Token-aware filters read `tokens` live.
    pub fn build(&self, tokens: Arc<dyn TradableTokens>) -> Arc<dyn Filter> {
        match self {
            FilterSpec::OnlyApprove => Arc::new(OnlyApproveFilter),
            FilterSpec::Weth => Arc::new(WethFilter),
            FilterSpec::Curve => Arc::new(CurveFilter),
            FilterSpec::Lido => Arc::new(LidoFilter),
            FilterSpec::MakerVat { dai_join, pot } => Arc::new(VatFilter::new(*dai_join, *pot)),
            FilterSpec::MakerPot => Arc::new(PotFilter),
            FilterSpec::MakerDaiJoin => Arc::new(DaiJoinFilter),
            FilterSpec::AaveV1LendingPool => Arc::new(AaveV1LendingPoolFilter),
            FilterSpec::AaveV1AToken => Arc::new(AaveV1ATokenFilter),
            FilterSpec::AaveV2 => Arc::new(AaveV2Filter),
            FilterSpec::Yearn { weth_vault } => Arc::new(YearnFilter::new(*weth_vault)),
            FilterSpec::YearnV2 => Arc::new(YearnV2Filter),
            FilterSpec::Balancer => Arc::new(BalancerFilter),
            FilterSpec::GroDeposit => Arc::new(GroDepositFilter),
            FilterSpec::GroWithdraw => Arc::new(GroWithdrawFilter),
            FilterSpec::ArgentEnsManager => Arc::new(ArgentEnsManagerFilter),
            FilterSpec::ZkSync => Arc::new(ZkSyncFilter),
            FilterSpec::CompoundEther => Arc::new(CompoundFilter::ether()),
            FilterSpec::CompoundToken { underlying } => Arc::new(CompoundFilter::token(*underlying)),
            FilterSpec::UniswapV2Router { factory, weth } => {
                Arc::new(UniswapV2RouterFilter::new(*factory, *weth, tokens))
            }
            FilterSpec::UniswapV2Unizap { factory, weth } => {
                Arc::new(UniswapV2UniZapFilter::new(*factory, *weth, tokens))
            }
            FilterSpec::Paraswap(config) => Arc::new(ParaswapFilter::new(config.clone(), tokens)),
        }
    }
}

impl DeploymentConfig {
    /// Every configured filter, bound to the shared token registry
    pub fn build_filters(&self, tokens: SharedTokens) -> FilterSet {
        let tradable: Arc<dyn TradableTokens> = tokens;
        let mut set = FilterSet::new();
        for (address, spec) in &self.filters {
            set.insert(*address, spec.build(tradable.clone()));
        }
        set
    }

    /// Owner of `list` as configured
    pub fn list_owner(&self, list: ListId) -> Option<Address> {
        if list == ROOT_LIST {
            return Some(self.root_owner);
        }
        self.lists.get(&list).copied()
    }

    /// Problems that would make a deployment from this config misbehave
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.root_owner.is_zero() {
            problems.push("root_owner is not set".to_string());
        }
        for (list, owner) in &self.lists {
            if *list == ROOT_LIST {
                problems.push("list 0 is the root list, set root_owner instead".to_string());
            } else if owner.is_zero() {
                problems.push(format!("list {} has no owner", list));
            }
        }
        for dapp in &self.dapps {
            if self.list_owner(dapp.list).is_none() {
                problems.push(format!("dapp {} uses unknown list {}", dapp.name, dapp.list));
            }
            if let Some(filter) = dapp.filter {
                if !filter.is_zero() && !self.filters.contains_key(&filter) {
                    problems.push(format!("dapp {} uses unconfigured filter {}", dapp.name, filter));
                }
            }
        }
        for (address, spec) in &self.filters {
            if let FilterSpec::Paraswap(paraswap) = spec {
                for (exchange, target) in &paraswap.target_exchanges {
                    if target.kind == ExchangeKind::UniswapV1 && target.token.is_none() {
                        problems.push(format!(
                            "filter {}: uniswap v1 exchange {} has no token",
                            address, exchange
                        ));
                    }
                }
            }
        }
        problems
    }
}

/// Read and write access to the deployment configuration
pub trait ConfigLoader {
    fn load(&self) -> Result<DeploymentConfig>;
    fn save(&self, config: &DeploymentConfig) -> Result<()>;
}

/// YAML file backed configuration
pub struct YamlConfigLoader {
    path: PathBuf,
}

impl YamlConfigLoader {
    /// Config for an environment at the default location
    pub fn new(env: &str) -> Self {
        Self::with_path(Paths::new().deployment(env))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigLoader for YamlConfigLoader {
    fn load(&self) -> Result<DeploymentConfig> {
        if !self.path.exists() {
            return Ok(DeploymentConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read deployment config from {:?}", self.path))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse deployment config from {:?}", self.path))?;
        Ok(config)
    }

    fn save(&self, config: &DeploymentConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(config)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write deployment config to {:?}", self.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::CallRequest;
    use alloy_primitives::address;

    const SAMPLE: &str = r#"
root_owner: "0x1000000000000000000000000000000000000001"
timelock_period: 86400
lists:
  1: "0x2000000000000000000000000000000000000002"
tokens:
  owner: "0x1000000000000000000000000000000000000001"
  tradable:
    - "0x6b175474e89094c44da98b954eedeac495271d0f"
filters:
  "0xf000000000000000000000000000000000000001":
    kind: curve
  "0xf000000000000000000000000000000000000002":
    kind: maker_vat
    dai_join: "0x9759a6ac90977b93b58547b4a71c78317f391a28"
    pot: "0x197e90f9fad81970ba7976f33cbd77088e5d7cf7"
  "0xf000000000000000000000000000000000000003":
    kind: uniswap_v2_router
    factory:
      factory: "0x5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f"
      init_code_hash: "0x96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f"
    weth: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
  "0xf000000000000000000000000000000000000005":
    kind: uniswap_v2_unizap
    factory:
      factory: "0x5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f"
      init_code_hash: "0x96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f"
    weth: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
  "0xf000000000000000000000000000000000000004":
    kind: paraswap
    augustus: "0xdef171fe48cf0115b1d80b88dc8eab59176fee57"
    weth: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
    uniswap_proxy: "0x0000000000000000000000000000000000000f01"
    uniswap:
      factory: "0x5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f"
      init_code_hash: "0x96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f"
    target_exchanges:
      "0xbebc44782c7db0a1a60cb6fe97d0b483032ff1c7":
        kind: curve
dapps:
  - name: curve 3pool
    address: "0xbebc44782c7db0a1a60cb6fe97d0b483032ff1c7"
    filter: "0xf000000000000000000000000000000000000001"
  - name: fee collector
    list: 1
    address: "0xc011ec7000000000000000000000000000000c01"
"#;

    const DAI: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
    const CURVE_FILTER: Address = address!("f000000000000000000000000000000000000001");
    const PARASWAP_FILTER: Address = address!("f000000000000000000000000000000000000004");
    const UNIZAP_FILTER: Address = address!("f000000000000000000000000000000000000005");

    #[test]
    fn test_parse_sample() {
        let config: DeploymentConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.timelock_period, 86_400);
        assert_eq!(config.list_owner(1), Some(address!("2000000000000000000000000000000000000002")));
        assert_eq!(config.list_owner(7), None);
        assert!(config.tokens.tradable.contains(&DAI));
        assert_eq!(config.filters.len(), 5);
        assert_eq!(config.dapps[1].filter_address(), Address::ZERO);
        assert!(config.validate().is_empty());

        match &config.filters[&PARASWAP_FILTER] {
            FilterSpec::Paraswap(paraswap) => {
                assert!(paraswap.uniswap_proxy_trusted);
                assert!(paraswap.adapters.is_empty());
            }
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn test_build_filters() {
        let config: DeploymentConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let tokens = config.tokens.clone().shared();
        let filters = config.build_filters(tokens);
        assert_eq!(filters.len(), 5);

        let curve = filters.get(CURVE_FILTER).unwrap();
        assert_eq!(curve.name(), "curve");
        assert!(!curve.is_valid(&CallRequest::direct(DAI, DAI, &[])));
        assert_eq!(filters.get(PARASWAP_FILTER).unwrap().name(), "paraswap");
        assert_eq!(filters.get(UNIZAP_FILTER).unwrap().name(), "uniswap_v2_unizap");
    }

    #[test]
    fn test_protocol_filter_kinds() {
        let yaml = r#"
"0xf000000000000000000000000000000000000011": { kind: aave_v1_lending_pool }
"0xf000000000000000000000000000000000000012": { kind: aave_v1_atoken }
"0xf000000000000000000000000000000000000013": { kind: yearn, weth_vault: true }
"0xf000000000000000000000000000000000000014": { kind: yearn }
"0xf000000000000000000000000000000000000015": { kind: yearn_v2 }
"0xf000000000000000000000000000000000000016": { kind: balancer }
"0xf000000000000000000000000000000000000017": { kind: gro_deposit }
"0xf000000000000000000000000000000000000018": { kind: gro_withdraw }
"0xf000000000000000000000000000000000000019": { kind: argent_ens_manager }
"0xf00000000000000000000000000000000000001a": { kind: zksync }
"#;
        let specs: BTreeMap<Address, FilterSpec> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            specs[&address!("f000000000000000000000000000000000000013")],
            FilterSpec::Yearn { weth_vault: true }
        );
        assert_eq!(
            specs[&address!("f000000000000000000000000000000000000014")],
            FilterSpec::Yearn { weth_vault: false }
        );

        let tokens: Arc<dyn TradableTokens> = TokenRegistry::default().shared();
        let names: Vec<&str> = specs
            .values()
            .map(|spec| spec.build(tokens.clone()).name())
            .collect();
        assert_eq!(
            names,
            [
                "aave_v1_lending_pool",
                "aave_v1_atoken",
                "yearn",
                "yearn",
                "yearn_v2",
                "balancer",
                "gro_deposit",
                "gro_withdraw",
                "argent_ens_manager",
                "zksync",
            ]
        );
    }

    #[test]
    fn test_validate() {
        let mut config = DeploymentConfig::default();
        config.dapps.push(DappEntry {
            name: "orphan".into(),
            list: 3,
            address: DAI,
            filter: Some(CURVE_FILTER),
        });
        let problems = config.validate();
        assert_eq!(problems.len(), 3, "{:?}", problems);

        let mut config: DeploymentConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
        if let Some(FilterSpec::Paraswap(paraswap)) = config.filters.get_mut(&PARASWAP_FILTER) {
            paraswap.target_exchanges.insert(
                DAI,
                serde_yaml::from_str("kind: uniswap_v1").unwrap(),
            );
        }
        let problems = config.validate();
        assert_eq!(problems.len(), 1, "{:?}", problems);
        assert!(problems[0].contains("has no token"));
    }

    #[test]
    fn test_loader_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let loader = YamlConfigLoader::with_path(dir.path().join("config").join("local.yaml"));

        let empty = loader.load().unwrap();
        assert_eq!(empty, DeploymentConfig::default());
        assert_eq!(empty.timelock_period, DEFAULT_TIMELOCK_PERIOD);

        let config: DeploymentConfig = serde_yaml::from_str(SAMPLE).unwrap();
        loader.save(&config).unwrap();
        assert_eq!(loader.load().unwrap(), config);
    }
}
