//! Static payment-token registry.
//!
//! Sales settle in a small closed set of tokens; anything outside the set is
//! an unknown payment instrument and must abort the run rather than be
//! silently misattributed.

use super::Address;

/// A known payment token: on-chain address, display symbol, decimal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentTokenInfo {
    pub address: &'static str,
    pub symbol: &'static str,
    pub decimals: u32,
}

/// Mainnet payment tokens observed across both marketplaces. The zero
/// address is how marketplaces denote native ETH.
pub const PAYMENT_TOKENS: &[PaymentTokenInfo] = &[
    PaymentTokenInfo {
        address: "0x0000000000000000000000000000000000000000",
        symbol: "ETH",
        decimals: 18,
    },
    PaymentTokenInfo {
        address: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
        symbol: "WETH",
        decimals: 18,
    },
    PaymentTokenInfo {
        address: "0x6b175474e89094c44da98b954eedeac495271d0f",
        symbol: "DAI",
        decimals: 18,
    },
    PaymentTokenInfo {
        address: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        symbol: "USDC",
        decimals: 6,
    },
];

/// Resolve a payment-token address to its registry entry.
pub fn lookup(address: &Address) -> Option<&'static PaymentTokenInfo> {
    PAYMENT_TOKENS
        .iter()
        .find(|info| info.address == address.as_str())
}

/// Resolve a symbol back to its registry entry (used by the report exporter
/// to recover the decimal scale).
pub fn symbol_info(symbol: &str) -> Option<&'static PaymentTokenInfo> {
    PAYMENT_TOKENS.iter().find(|info| info.symbol == symbol)
}
