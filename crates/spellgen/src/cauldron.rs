//! The cauldron deployment flow: collect lending-market parameters from the
//! operator, validating every address against live on-chain state before it
//! is accepted into the render payload.

use crate::{
    address::{resolve_named_address, AddressBook, NamedAddress},
    bips::{input_bips_as_percent, BipsPercent},
    chain::{ChainConnect, ChainReader, TokenMetadata},
    cli_output,
    config::{GenConfig, NetworkCfg},
    errors::GenError,
    prompt::Prompter,
};
use alloy::primitives::Address;
use eyre::Context as _;
use serde::Serialize;

/// Collateral kinds the generator understands.
///
/// The serialized names are rendered into generated scripts, so they are part
/// of the output contract and never change casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollateralType {
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC4626")]
    Erc4626,
    #[serde(rename = "UNISWAPV3_LP")]
    UniswapV3Lp,
}

/// The validated collateral: address, oracle feed, decimals, kind.
#[derive(Debug, Clone, Serialize)]
pub struct CollateralDescriptor {
    pub named_address: NamedAddress,
    pub aggregator_named_address: NamedAddress,
    /// Decimals recorded for the collateral token itself. For a vault this is
    /// the vault's own decimals, not the underlying asset's.
    pub decimals: u8,
    #[serde(rename = "type")]
    pub collateral_type: CollateralType,
}

/// Economic parameters, each captured as percent and stored as bips.
#[derive(Debug, Clone, Serialize)]
pub struct EconomicParameters {
    pub ltv: BipsPercent,
    pub interests: BipsPercent,
    pub borrow_fee: BipsPercent,
    pub liquidation_fee: BipsPercent,
}

/// Everything the cauldron script template consumes. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct CauldronScriptParameters {
    pub collateral: CollateralDescriptor,
    pub parameters: EconomicParameters,
}

/// Run the interactive cauldron flow: network, collateral, oracle, economics.
pub async fn collect_cauldron_parameters(
    cfg: &GenConfig,
    prompter: &mut dyn Prompter,
    connect: &dyn ChainConnect,
) -> eyre::Result<CauldronScriptParameters> {
    let network = select_network(cfg, prompter)?;
    let book = AddressBook::for_network(network)?;
    let reader = connect.connect(network)?;

    let collateral = resolve_named_address(&book, prompter, "Collateral")?;
    let (collateral_metadata, decimals) =
        query_token_path(reader.as_ref(), prompter, collateral.address).await?;

    let collateral_type = select_collateral_type(prompter)?;
    let aggregator = match collateral_type {
        CollateralType::Erc20 => {
            input_aggregator(&book, prompter, reader.as_ref(), &collateral_metadata).await?
        }
        CollateralType::Erc4626 => {
            let asset = reader.vault_asset(collateral.address).await.with_context(|| {
                format!(
                    "couldn't retrieve underlying asset information for {}",
                    collateral.address.to_checksum(None)
                )
            })?;
            let (asset_metadata, _) = query_token_path(reader.as_ref(), prompter, asset).await?;
            input_aggregator(&book, prompter, reader.as_ref(), &asset_metadata).await?
        }
        CollateralType::UniswapV3Lp => return Err(GenError::UnsupportedCollateral.into()),
    };

    Ok(CauldronScriptParameters {
        collateral: CollateralDescriptor {
            named_address: collateral,
            aggregator_named_address: aggregator,
            decimals,
            collateral_type,
        },
        parameters: EconomicParameters {
            ltv: input_bips_as_percent(prompter, "LTV")?,
            interests: input_bips_as_percent(prompter, "Interests")?,
            borrow_fee: input_bips_as_percent(prompter, "Borrow Fee")?,
            liquidation_fee: input_bips_as_percent(prompter, "Liquidation Fee")?,
        },
    })
}

pub(crate) fn select_network<'a>(
    cfg: &'a GenConfig,
    prompter: &mut dyn Prompter,
) -> eyre::Result<&'a NetworkCfg> {
    let names = cfg.network_names();
    let idx = prompter.select("Network", &names)?;
    cfg.networks
        .get(idx)
        .ok_or_else(|| eyre::eyre!("network choice out of range"))
}

fn select_collateral_type(prompter: &mut dyn Prompter) -> eyre::Result<CollateralType> {
    let choices = vec![
        "ERC20".to_owned(),
        "ERC4626".to_owned(),
        "Uniswap V3 LP".to_owned(),
    ];
    match prompter.select("Collateral Type", &choices)? {
        0 => Ok(CollateralType::Erc20),
        1 => Ok(CollateralType::Erc4626),
        _ => Ok(CollateralType::UniswapV3Lp),
    }
}

/// Token path of the metadata validation: echo name/symbol, then read
/// decimals, falling back to a manual prompt when the chain cannot provide
/// them. Used for the collateral itself and for a vault's underlying asset.
async fn query_token_path(
    reader: &dyn ChainReader,
    prompter: &mut dyn Prompter,
    token: Address,
) -> eyre::Result<(TokenMetadata, u8)> {
    let metadata = reader.token_metadata(token).await;
    if let Some(label) = metadata.display_label() {
        cli_output::note(&label);
    }
    let decimals = match metadata.decimals {
        Some(d) => {
            cli_output::note(&format!("Decimals: {d}"));
            d
        }
        None => {
            tracing::warn!(token = %token, "token decimals unreadable, asking the operator");
            cli_output::warn(&format!(
                "couldn't retrieve decimals for {}, please enter them manually",
                token.to_checksum(None)
            ));
            input_decimals(prompter)?
        }
    };
    Ok((metadata, decimals))
}

fn input_decimals(prompter: &mut dyn Prompter) -> eyre::Result<u8> {
    let answer = prompter.input_validated("Decimals", &|s| match s.trim().parse::<u8>() {
        Ok(_) => Ok(()),
        Err(_) => Err(format!("{s} is not an integer in [0...255]")),
    })?;
    answer.trim().parse::<u8>().context("parse decimals")
}

/// Resolve an aggregator address and validate it behaves like a price feed.
/// `token_metadata` is whatever token the feed is expected to price, used only
/// to label the prompt.
async fn input_aggregator(
    book: &AddressBook,
    prompter: &mut dyn Prompter,
    reader: &dyn ChainReader,
    token_metadata: &TokenMetadata,
) -> eyre::Result<NamedAddress> {
    let message = match token_metadata.display_label() {
        Some(label) => format!("{label} Aggregator"),
        None => "Aggregator".to_owned(),
    };
    let named = resolve_named_address(book, prompter, &message)?;

    let oracle = reader
        .aggregator_metadata(named.address)
        .await
        .with_context(|| {
            format!(
                "couldn't retrieve aggregator information for {}",
                named.address.to_checksum(None)
            )
        })?;
    if let Some(description) = &oracle.description {
        cli_output::note(&format!("Name: {description}"));
    }
    cli_output::note(&format!("Decimals: {}", oracle.decimals));
    cli_output::note(&format!("Price: {} USD", oracle.display_price()));

    Ok(named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_address;
    use crate::chain::{FakeConnect, FakeReader, OracleMetadata};
    use crate::prompt::ScriptedPrompter;
    use std::collections::BTreeMap;

    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    const VAULT: &str = "0x83f20f44975d03b1b09e64809b757c47f942beea";
    const FEED: &str = "0x8fffffd4afb6115b954bd326cbe7b4ba576818f6";

    fn test_cfg() -> GenConfig {
        GenConfig {
            networks: vec![NetworkCfg {
                name: "mainnet".into(),
                chain_id: 1,
                rpc_url: "http://unused.invalid".into(),
                fallback_rpc_urls: vec![],
                addresses: [("usdc".to_owned(), USDC.to_owned())].into_iter().collect(),
            }],
            foundry: crate::config::FoundryLayout::default(),
        }
    }

    fn usdc_metadata() -> TokenMetadata {
        TokenMetadata {
            name: Some("USD Coin".into()),
            symbol: Some("USDC".into()),
            decimals: Some(6),
        }
    }

    fn usdc_feed() -> OracleMetadata {
        OracleMetadata {
            description: Some("USDC / USD".into()),
            decimals: 8,
            latest_answer: 100_000_000,
        }
    }

    fn reader_with_usdc() -> eyre::Result<FakeReader> {
        Ok(FakeReader {
            tokens: [(parse_address(USDC)?, usdc_metadata())].into_iter().collect(),
            vault_assets: BTreeMap::new(),
            oracles: [(parse_address(FEED)?, usdc_feed())].into_iter().collect(),
            head: 19_000_000,
        })
    }

    #[tokio::test]
    async fn erc20_flow_collects_validated_parameters() -> eyre::Result<()> {
        let cfg = test_cfg();
        let connect = FakeConnect(reader_with_usdc()?);
        let mut prompter = ScriptedPrompter::new([
            "mainnet", // network
            "usdc",    // collateral by label
            "ERC20",   // collateral type
            FEED,      // aggregator by raw address
            "75",      // ltv
            "2",       // interests
            "0.5",     // borrow fee
            "5",       // liquidation fee
        ]);

        let collected = collect_cauldron_parameters(&cfg, &mut prompter, &connect).await?;

        assert_eq!(collected.collateral.named_address.name.as_deref(), Some("usdc"));
        assert_eq!(collected.collateral.named_address.address.to_checksum(None), USDC);
        assert_eq!(collected.collateral.aggregator_named_address.name, None);
        assert_eq!(collected.collateral.decimals, 6);
        assert_eq!(collected.collateral.collateral_type, CollateralType::Erc20);
        assert_eq!(collected.parameters.ltv.bips, 7500);
        assert_eq!(collected.parameters.interests.bips, 200);
        assert_eq!(collected.parameters.borrow_fee.bips, 50);
        assert_eq!(collected.parameters.liquidation_fee.bips, 500);
        Ok(())
    }

    #[tokio::test]
    async fn vault_flow_records_the_vaults_own_decimals() -> eyre::Result<()> {
        let cfg = test_cfg();
        let mut fake = reader_with_usdc()?;
        fake.tokens.insert(
            parse_address(VAULT)?,
            TokenMetadata {
                name: Some("Savings Dai".into()),
                symbol: Some("sDAI".into()),
                decimals: Some(18),
            },
        );
        fake.vault_assets.insert(parse_address(VAULT)?, parse_address(USDC)?);
        let connect = FakeConnect(fake);

        let mut prompter = ScriptedPrompter::new([
            "mainnet", VAULT, "ERC4626", FEED, "80", "1.5", "0.05", "7.5",
        ]);
        let collected = collect_cauldron_parameters(&cfg, &mut prompter, &connect).await?;

        assert_eq!(collected.collateral.decimals, 18, "vault decimals, not underlying");
        assert_eq!(collected.collateral.collateral_type, CollateralType::Erc4626);
        assert_eq!(collected.parameters.liquidation_fee.bips, 750);
        Ok(())
    }

    #[tokio::test]
    async fn vault_without_asset_is_fatal() -> eyre::Result<()> {
        let cfg = test_cfg();
        // VAULT has token metadata but no asset() behaviour.
        let mut fake = reader_with_usdc()?;
        fake.tokens.insert(
            parse_address(VAULT)?,
            TokenMetadata {
                decimals: Some(18),
                ..TokenMetadata::default()
            },
        );
        let connect = FakeConnect(fake);

        let mut prompter = ScriptedPrompter::new(["mainnet", VAULT, "ERC4626"]);
        let err = match collect_cauldron_parameters(&cfg, &mut prompter, &connect).await {
            Ok(_) => eyre::bail!("expected the vault flow to fail"),
            Err(e) => e,
        };
        let rendered = format!("{err:#}");
        assert!(
            rendered.contains("underlying asset information"),
            "unexpected error: {rendered}"
        );
        let vault_checksummed = parse_address(VAULT)?.to_checksum(None);
        assert!(
            rendered.contains(&vault_checksummed),
            "error should name the vault: {rendered}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn uniswap_lp_collateral_is_recognised_but_rejected() -> eyre::Result<()> {
        let cfg = test_cfg();
        let connect = FakeConnect(reader_with_usdc()?);
        let mut prompter = ScriptedPrompter::new(["mainnet", "usdc", "Uniswap V3 LP"]);

        let err = match collect_cauldron_parameters(&cfg, &mut prompter, &connect).await {
            Ok(_) => eyre::bail!("expected LP collateral to be rejected"),
            Err(e) => e,
        };
        assert!(
            matches!(err.downcast_ref::<GenError>(), Some(GenError::UnsupportedCollateral)),
            "unexpected error: {err:#}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_decimals_fall_back_to_manual_entry() -> eyre::Result<()> {
        let cfg = test_cfg();
        let mut fake = reader_with_usdc()?;
        // A token the fake knows nothing about: all metadata reads miss.
        let opaque = "0x1111111111111111111111111111111111111111";
        fake.tokens.clear();
        let connect = FakeConnect(fake);

        let mut prompter = ScriptedPrompter::new([
            "mainnet", opaque, "xyz", "300", "8", "ERC20", FEED, "75", "2", "0.5", "5",
        ]);
        let collected = collect_cauldron_parameters(&cfg, &mut prompter, &connect).await?;
        assert_eq!(collected.collateral.decimals, 8);
        assert_eq!(collected.collateral.named_address.name, None);
        Ok(())
    }

    #[tokio::test]
    async fn dead_aggregator_is_fatal() -> eyre::Result<()> {
        let cfg = test_cfg();
        let mut fake = reader_with_usdc()?;
        fake.oracles.clear();
        let connect = FakeConnect(fake);

        let mut prompter = ScriptedPrompter::new(["mainnet", "usdc", "ERC20", FEED]);
        let err = match collect_cauldron_parameters(&cfg, &mut prompter, &connect).await {
            Ok(_) => eyre::bail!("expected the aggregator probe to fail"),
            Err(e) => e,
        };
        let rendered = format!("{err:#}");
        assert!(
            rendered.contains("aggregator information"),
            "unexpected error: {rendered}"
        );
        Ok(())
    }
}
