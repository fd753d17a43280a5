use solana_client::rpc_client::RpcClient;
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use std::time::Duration;

/// Thin wrapper around the blocking RPC client. The service only ever reads
/// transactions, so no send configuration is carried.
pub struct Rpc {
    inner: RpcClient,
    commitment_cfg: CommitmentConfig,
}

impl Rpc {
    pub fn new(rpc_url: &str, timeout_ms: u64, commitment: CommitmentLevel) -> Self {
        let commitment_cfg = CommitmentConfig { commitment };
        let inner = RpcClient::new_with_timeout_and_commitment(
            rpc_url.to_string(),
            Duration::from_millis(timeout_ms),
            commitment_cfg,
        );

        Self {
            inner,
            commitment_cfg,
        }
    }

    pub fn client(&self) -> &RpcClient {
        &self.inner
    }

    pub fn commitment_cfg(&self) -> &CommitmentConfig {
        &self.commitment_cfg
    }
}
