use thiserror::Error;

/// Terminal generator failures with a fixed operator-facing message.
///
/// Everything else (RPC failures, unreadable files, template errors) travels
/// through `eyre` with call-site context attached.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("template {0} does not exist")]
    UnknownTemplate(String),

    #[error("Uniswap V3 LP collaterals are not supported yet")]
    UnsupportedCollateral,
}
