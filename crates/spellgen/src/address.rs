//! Address parsing, per-network address books, and interactive resolution.

use crate::{cli_output, config::NetworkCfg, prompt::Prompter};
use alloy::primitives::Address;
use eyre::Context as _;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr as _;

/// An on-chain address plus the address-book label it resolved from, if any.
///
/// `name` is only ever set from a book match, never guessed, because generated
/// code renders named addresses as runtime lookups (see the `print_address`
/// template filter) and a wrong label would change what gets deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedAddress {
    #[serde(serialize_with = "serialize_checksummed")]
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn serialize_checksummed<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&address.to_checksum(None))
}

/// Parse an operator-supplied address the way wallets do: uniform-case hex is
/// accepted without a checksum, mixed case must carry a valid EIP-55 checksum.
/// The `0x` prefix is optional.
pub fn parse_address(raw: &str) -> eyre::Result<Address> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        eyre::bail!("not a 20-byte hex address: {trimmed}");
    }
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    if has_upper && has_lower {
        return Address::parse_checksummed(format!("0x{body}"), None)
            .map_err(|e| eyre::eyre!("bad checksum for {trimmed}: {e}"));
    }
    Address::from_str(body).with_context(|| format!("parse address {trimmed}"))
}

/// True when [`parse_address`] would accept `raw`.
pub fn is_address(raw: &str) -> bool {
    parse_address(raw).is_ok()
}

/// Read-only label/address view over one network's configured addresses.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    by_label: BTreeMap<String, Address>,
}

impl AddressBook {
    /// Build the book for one network, validating every configured entry.
    pub fn for_network(network: &NetworkCfg) -> eyre::Result<Self> {
        let mut by_label = BTreeMap::new();
        for (label, raw) in &network.addresses {
            let address = parse_address(raw)
                .with_context(|| format!("address book entry {label} on {}", network.name))?;
            by_label.insert(label.clone(), address);
        }
        Ok(Self { by_label })
    }

    pub fn address_of(&self, label: &str) -> Option<Address> {
        self.by_label.get(label).copied()
    }

    /// Reverse lookup; first matching label in book order wins.
    pub fn label_of(&self, address: Address) -> Option<&str> {
        self.by_label
            .iter()
            .find_map(|(label, a)| (*a == address).then_some(label.as_str()))
    }
}

/// Interactively resolve an answer that may be a book label or a raw address.
///
/// Raw addresses are reverse-matched so a pasted address still picks up its
/// book label. Unknown labels fall back to a validated raw-address prompt;
/// that second answer is taken literally and not re-checked against the book.
/// The resolved address is echoed back before this returns.
pub fn resolve_named_address(
    book: &AddressBook,
    prompter: &mut dyn Prompter,
    message: &str,
) -> eyre::Result<NamedAddress> {
    let answer = prompter.input(&format!("{message} (name or address)"))?;

    let (address, name) = if let Ok(address) = parse_address(&answer) {
        (address, book.label_of(address).map(str::to_owned))
    } else if let Some(address) = book.address_of(&answer) {
        (address, Some(answer))
    } else {
        cli_output::warn(&format!("no address found for {answer}, specify it manually"));
        let raw = prompter.input_validated(&format!("{message} (address)"), &|s| {
            if is_address(s) {
                Ok(())
            } else {
                Err(format!("{s} is not a valid address"))
            }
        })?;
        (parse_address(&raw)?, None)
    };

    match &name {
        Some(name) => cli_output::note(&format!("Address: {} ({name})", address.to_checksum(None))),
        None => cli_output::note(&format!("Address: {}", address.to_checksum(None))),
    }

    Ok(NamedAddress { address, name })
}
