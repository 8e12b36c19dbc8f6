/// One entry of the static symbol catalog: the short key used throughout
/// the app, the display label, and the ticker symbol the upstream API expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub symbol: &'static str,
}

const fn entry(key: &'static str, label: &'static str, symbol: &'static str) -> SymbolInfo {
    SymbolInfo { key, label, symbol }
}

/// Symbols the upstream price API supports.
pub static AVAILABLE_SYMBOLS: &[SymbolInfo] = &[
    entry("ETH", "Ethereum", "ETH"),
    entry("XRP", "XRP", "XRP"),
    entry("BTC", "Bitcoin", "BTC"),
    entry("AAPL", "Apple", "AAPL"),
    entry("GOOGL", "Google", "GOOGL"),
    entry("MSFT", "Microsoft", "MSFT"),
    entry("TSLA", "Tesla", "TSLA"),
    entry("NVDA", "NVIDIA", "NVDA"),
    entry("AMZN", "Amazon", "AMZN"),
    entry("META", "Meta", "META"),
    entry("SOL", "Solana", "SOL"),
    entry("ADA", "Cardano", "ADA"),
    entry("DOGE", "Dogecoin", "DOGE"),
];

/// Exact-match lookup by key. Case-sensitive, like the upstream API.
pub fn lookup(key: &str) -> Option<&'static SymbolInfo> {
    AVAILABLE_SYMBOLS.iter().find(|s| s.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn lookup_finds_known_symbols() {
        let eth = lookup("ETH").unwrap();
        assert_eq!(eth.label, "Ethereum");
        assert_eq!(eth.symbol, "ETH");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(lookup("eth").is_none());
        assert!(lookup("TA35").is_none());
    }

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = AVAILABLE_SYMBOLS.iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), AVAILABLE_SYMBOLS.len());
    }
}
