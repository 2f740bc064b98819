//! Per-network endpoints.

use sdk_core::Network;

/// Public fullnode JSON-RPC endpoint for a network.
pub const fn default_rpc_url(network: Network) -> &'static str {
    match network {
        Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
        Network::Testnet => "https://fullnode.testnet.sui.io:443",
        Network::Devnet => "https://fullnode.devnet.sui.io:443",
    }
}
