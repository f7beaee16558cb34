//! On-chain read access: typed contract bindings and the per-network RPC
//! client the validation flows run against.

use crate::config::NetworkCfg;
use alloy::{
    primitives::Address,
    providers::{Provider as _, RootProvider},
    sol,
};
use async_trait::async_trait;
use eyre::Context as _;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_RPC_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

type EvmProvider = RootProvider;

sol! {
    #[sol(rpc)]
    contract IStrictERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

sol! {
    #[sol(rpc)]
    contract IERC4626 {
        function asset() external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    contract IAggregatorWithMeta {
        function description() external view returns (string);
        function decimals() external view returns (uint8);
        function latestRoundData() external view returns (
            uint80 roundId,
            int256 answer,
            uint256 startedAt,
            uint256 updatedAt,
            uint80 answeredInRound
        );
    }
}

/// Best-effort ERC-20 metadata; an absent field just could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
}

impl TokenMetadata {
    /// `Name [SYMBOL]` when both are known, either alone otherwise.
    pub fn display_label(&self) -> Option<String> {
        match (&self.name, &self.symbol) {
            (Some(name), Some(symbol)) => Some(format!("{name} [{symbol}]")),
            (Some(name), None) => Some(name.clone()),
            (None, Some(symbol)) => Some(format!("[{symbol}]")),
            (None, None) => None,
        }
    }
}

/// Chainlink-style aggregator metadata. `description` is best-effort; the
/// rest was required reads, so it is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleMetadata {
    pub description: Option<String>,
    pub decimals: u8,
    /// `answer` from `latestRoundData`, in the feed's own decimals.
    pub latest_answer: i128,
}

impl OracleMetadata {
    pub fn display_price(&self) -> f64 {
        crate::bips::display_price(self.latest_answer, self.decimals)
    }
}

/// Read-only chain access the flows depend on.
///
/// Implemented over RPC in production and by in-memory fakes in tests, so the
/// whole interactive flow is testable without a network.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// ERC-20 metadata, every field best-effort.
    async fn token_metadata(&self, token: Address) -> TokenMetadata;

    /// ERC-4626 underlying asset. An error means the address does not behave
    /// like a vault, which callers treat as fatal.
    async fn vault_asset(&self, vault: Address) -> eyre::Result<Address>;

    /// Aggregator metadata; failing `decimals` or `latestRoundData` is an
    /// error.
    async fn aggregator_metadata(&self, aggregator: Address) -> eyre::Result<OracleMetadata>;

    /// Current chain head number.
    async fn block_number(&self) -> eyre::Result<u64>;
}

/// Builds a [`ChainReader`] for the operator's selected network.
pub trait ChainConnect: Send + Sync {
    fn connect(&self, network: &NetworkCfg) -> eyre::Result<Box<dyn ChainReader>>;
}

/// Production [`ChainConnect`]: RPC-backed [`NetworkClient`]s.
pub struct RpcConnect;

impl ChainConnect for RpcConnect {
    fn connect(&self, network: &NetworkCfg) -> eyre::Result<Box<dyn ChainReader>> {
        Ok(Box::new(NetworkClient::for_network(network)))
    }
}

/// RPC reader over a network's primary endpoint plus fallbacks.
pub struct NetworkClient {
    network_name: String,
    rpc_urls: Vec<String>,
}

impl NetworkClient {
    pub fn for_network(network: &NetworkCfg) -> Self {
        let mut rpc_urls = Vec::with_capacity(1 + network.fallback_rpc_urls.len());
        if !network.rpc_url.trim().is_empty() {
            rpc_urls.push(network.rpc_url.trim().to_owned());
        }
        for u in &network.fallback_rpc_urls {
            let t = u.trim();
            if t.is_empty() {
                continue;
            }
            if rpc_urls.iter().any(|x| x == t) {
                continue;
            }
            rpc_urls.push(t.to_owned());
        }
        Self {
            network_name: network.name.clone(),
            rpc_urls,
        }
    }

    fn provider_for_url(url: &str) -> eyre::Result<EvmProvider> {
        let u: reqwest::Url = url
            .parse()
            .with_context(|| format!("invalid rpc url: {url}"))?;
        let client = Client::builder()
            .timeout(DEFAULT_RPC_TIMEOUT)
            .connect_timeout(DEFAULT_RPC_CONNECT_TIMEOUT)
            .build()
            .context("build rpc http client")?;
        let http = alloy::transports::http::Http::with_client(client, u);
        let rpc_client = alloy::rpc::client::RpcClient::new(http, false);
        Ok(RootProvider::new(rpc_client))
    }

    /// Run `f` against each endpoint in order until one succeeds.
    ///
    /// Single pass, no backoff rounds: the operator is sitting at a prompt, so
    /// a dead endpoint should fail over immediately rather than retry.
    async fn with_any_endpoint<T, Fut>(
        &self,
        context_label: &'static str,
        f: impl Fn(EvmProvider) -> Fut + Sync,
    ) -> eyre::Result<T>
    where
        T: Send,
        Fut: std::future::Future<Output = eyre::Result<T>> + Send,
    {
        let mut last_err: Option<eyre::Report> = None;
        for url in &self.rpc_urls {
            match Self::provider_for_url(url) {
                Ok(provider) => match f(provider).await {
                    Ok(v) => return Ok(v),
                    Err(e) => {
                        tracing::debug!(url = %url, op = context_label, error = %e, "rpc attempt failed");
                        last_err = Some(e);
                    }
                },
                Err(e) => last_err = Some(e),
            }
        }
        let network = &self.network_name;
        Err(last_err
            .unwrap_or_else(|| eyre::eyre!("no rpc endpoints configured for {network}"))
            .wrap_err(context_label))
    }
}

#[async_trait]
impl ChainReader for NetworkClient {
    async fn token_metadata(&self, token: Address) -> TokenMetadata {
        let name = self
            .with_any_endpoint("erc20 name", |p| async move {
                IStrictERC20::new(token, &p).name().call().await.context("erc20 name")
            })
            .await
            .ok();
        let symbol = self
            .with_any_endpoint("erc20 symbol", |p| async move {
                IStrictERC20::new(token, &p).symbol().call().await.context("erc20 symbol")
            })
            .await
            .ok();
        let decimals = self
            .with_any_endpoint("erc20 decimals", |p| async move {
                IStrictERC20::new(token, &p).decimals().call().await.context("erc20 decimals")
            })
            .await
            .ok();
        TokenMetadata {
            name,
            symbol,
            decimals,
        }
    }

    async fn vault_asset(&self, vault: Address) -> eyre::Result<Address> {
        self.with_any_endpoint("erc4626 asset", |p| async move {
            IERC4626::new(vault, &p).asset().call().await.context("erc4626 asset")
        })
        .await
    }

    async fn aggregator_metadata(&self, aggregator: Address) -> eyre::Result<OracleMetadata> {
        let description = self
            .with_any_endpoint("aggregator description", |p| async move {
                IAggregatorWithMeta::new(aggregator, &p)
                    .description()
                    .call()
                    .await
                    .context("aggregator description")
            })
            .await
            .ok();

        let decimals = self
            .with_any_endpoint("aggregator decimals", |p| async move {
                IAggregatorWithMeta::new(aggregator, &p)
                    .decimals()
                    .call()
                    .await
                    .context("aggregator decimals")
            })
            .await?;

        let latest_answer = self
            .with_any_endpoint("aggregator latestRoundData", |p| async move {
                let round = IAggregatorWithMeta::new(aggregator, &p)
                    .latestRoundData()
                    .call()
                    .await
                    .context("aggregator latestRoundData")?;
                i128::try_from(round.answer)
                    .map_err(|e| eyre::eyre!("aggregator answer out of range: {e}"))
            })
            .await?;

        Ok(OracleMetadata {
            description,
            decimals,
            latest_answer,
        })
    }

    async fn block_number(&self) -> eyre::Result<u64> {
        self.with_any_endpoint("get block number", |p| async move {
            p.get_block_number().await.context("get block number")
        })
        .await
    }
}

/// In-memory [`ChainReader`] used by flow tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct FakeReader {
    pub tokens: std::collections::BTreeMap<Address, TokenMetadata>,
    pub vault_assets: std::collections::BTreeMap<Address, Address>,
    pub oracles: std::collections::BTreeMap<Address, OracleMetadata>,
    pub head: u64,
}

#[cfg(test)]
#[async_trait]
impl ChainReader for FakeReader {
    async fn token_metadata(&self, token: Address) -> TokenMetadata {
        self.tokens.get(&token).cloned().unwrap_or_default()
    }

    async fn vault_asset(&self, vault: Address) -> eyre::Result<Address> {
        self.vault_assets
            .get(&vault)
            .copied()
            .ok_or_else(|| eyre::eyre!("no asset() at {vault}"))
    }

    async fn aggregator_metadata(&self, aggregator: Address) -> eyre::Result<OracleMetadata> {
        self.oracles
            .get(&aggregator)
            .cloned()
            .ok_or_else(|| eyre::eyre!("no aggregator at {aggregator}"))
    }

    async fn block_number(&self) -> eyre::Result<u64> {
        Ok(self.head)
    }
}

/// [`ChainConnect`] handing out clones of one [`FakeReader`].
#[cfg(test)]
pub struct FakeConnect(pub FakeReader);

#[cfg(test)]
impl ChainConnect for FakeConnect {
    fn connect(&self, _network: &NetworkCfg) -> eyre::Result<Box<dyn ChainReader>> {
        Ok(Box::new(self.0.clone()))
    }
}
