use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One EVM network the generator can target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkCfg {
    /// Display name, also the key used in generated `ChainId.<Name>` references.
    pub name: String,
    pub chain_id: u64,
    /// Primary RPC endpoint URL.
    pub rpc_url: String,
    /// Additional RPC endpoints to try if the primary fails.
    #[serde(default)]
    pub fallback_rpc_urls: Vec<String>,
    /// Address book: label -> address. Mixed-case entries must carry a valid
    /// EIP-55 checksum.
    #[serde(default)]
    pub addresses: BTreeMap<String, String>,
}

/// The operator's once-per-run network choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkSelection {
    pub chain_id: u64,
    pub name: String,
}

impl From<&NetworkCfg> for NetworkSelection {
    fn from(network: &NetworkCfg) -> Self {
        Self {
            chain_id: network.chain_id,
            name: network.name.clone(),
        }
    }
}

/// Folder layout of the target Foundry project, relative to the working
/// directory the generator runs in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoundryLayout {
    pub src: String,
    pub script: String,
    pub test: String,
    pub utils: String,
}

impl Default for FoundryLayout {
    fn default() -> Self {
        Self {
            src: "src".into(),
            script: "script".into(),
            test: "test".into(),
            utils: "utils".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    pub networks: Vec<NetworkCfg>,
    pub foundry: FoundryLayout,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            networks: default_networks(),
            foundry: FoundryLayout::default(),
        }
    }
}

impl GenConfig {
    pub fn network_names(&self) -> Vec<String> {
        self.networks.iter().map(|n| n.name.clone()).collect()
    }

    #[cfg(test)]
    pub fn network(&self, name: &str) -> Option<&NetworkCfg> {
        self.networks.iter().find(|n| n.name == name)
    }
}

/// `ChainId.<Name>` enum reference rendered into generated tests, derived by
/// capitalising the first letter of the network name.
pub fn chain_id_ident(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("ChainId.{}{}", first.to_uppercase(), chars.as_str()),
        None => "ChainId.Unknown".to_owned(),
    }
}

/// A single network definition used by the table-driven [`GenConfig::default()`].
struct NetworkDef {
    name: &'static str,
    chain_id: u64,
    rpc_url: &'static str,
    fallbacks: &'static [&'static str],
    /// Default address-book labels (well-known tokens).
    labels: &'static [(&'static str, &'static str)],
}

/// Default network definitions. Real deployments configure their own address
/// books in `spellgen.toml`; these entries cover the common tokens.
const DEFAULT_NETWORKS: &[NetworkDef] = &[
    NetworkDef {
        name: "mainnet",
        chain_id: 1,
        rpc_url: "https://eth.llamarpc.com",
        fallbacks: &[
            "https://ethereum-rpc.publicnode.com",
            "https://cloudflare-eth.com",
        ],
        labels: &[
            ("usdc", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            ("weth", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
            ("wbtc", "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"),
        ],
    },
    NetworkDef {
        name: "arbitrum",
        chain_id: 42161,
        rpc_url: "https://arbitrum.llamarpc.com",
        fallbacks: &[
            "https://arb1.arbitrum.io/rpc",
            "https://arbitrum-rpc.publicnode.com",
        ],
        labels: &[
            ("usdc", "0xaf88d065e77c8cC2239327C5EDb3A432268e5831"),
            ("weth", "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
        ],
    },
    NetworkDef {
        name: "optimism",
        chain_id: 10,
        rpc_url: "https://optimism.llamarpc.com",
        fallbacks: &[
            "https://mainnet.optimism.io",
            "https://optimism-rpc.publicnode.com",
        ],
        labels: &[
            ("usdc", "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"),
            ("weth", "0x4200000000000000000000000000000000000006"),
        ],
    },
    NetworkDef {
        name: "base",
        chain_id: 8453,
        rpc_url: "https://base.llamarpc.com",
        fallbacks: &[
            "https://mainnet.base.org",
            "https://base-rpc.publicnode.com",
        ],
        labels: &[
            ("usdc", "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
            ("weth", "0x4200000000000000000000000000000000000006"),
        ],
    },
    NetworkDef {
        name: "polygon",
        chain_id: 137,
        rpc_url: "https://polygon.llamarpc.com",
        fallbacks: &[
            "https://polygon-rpc.com",
            "https://polygon-bor-rpc.publicnode.com",
        ],
        labels: &[("usdc", "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174")],
    },
];

fn default_networks() -> Vec<NetworkCfg> {
    DEFAULT_NETWORKS
        .iter()
        .map(|def| NetworkCfg {
            name: def.name.into(),
            chain_id: def.chain_id,
            rpc_url: def.rpc_url.into(),
            fallback_rpc_urls: def.fallbacks.iter().map(|&s| s.into()).collect(),
            addresses: def
                .labels
                .iter()
                .map(|&(label, address)| (label.into(), address.into()))
                .collect(),
        })
        .collect()
}
