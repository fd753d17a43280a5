//! Payment verification against the Solana ledger.
//!
//! A vote is authorized by a finalized transfer of the voting fee from the
//! voter's wallet to the payment-collection wallet. Verification is read-only
//! and never retried here; the caller resubmits with a fresh transaction.

use crate::client::Rpc;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::UiTransactionEncoding;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Default voting fee: 0.02 SOL.
pub const DEFAULT_FEE_LAMPORTS: u64 = 20_000_000;
/// Default absolute tolerance on the received amount: 0.001 SOL.
pub const DEFAULT_TOLERANCE_LAMPORTS: u64 = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Transaction not found or not confirmed")]
    NotFound,
    #[error("Transaction failed")]
    Failed,
    #[error("Transaction does not involve the correct wallets")]
    WrongParties,
    #[error("Incorrect payment amount: expected {expected} lamports, received {received}")]
    WrongAmount { expected: u64, received: i64 },
}

/// Facts extracted from a confirmed transaction, enough to judge a payment
/// without holding on to the RPC types.
#[derive(Debug, Clone)]
pub struct PaymentFacts {
    pub account_keys: Vec<Pubkey>,
    pub failed: bool,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
}

/// Pure payment check over extracted facts. Returns the lamports received by
/// the collector on success.
pub fn check_payment(
    facts: &PaymentFacts,
    payer: &Pubkey,
    collector: &Pubkey,
    fee_lamports: u64,
    tolerance_lamports: u64,
) -> Result<u64, PaymentError> {
    if facts.failed {
        return Err(PaymentError::Failed);
    }

    let collector_idx = facts.account_keys.iter().position(|k| k == collector);
    let has_payer = facts.account_keys.iter().any(|k| k == payer);
    let Some(idx) = collector_idx else {
        return Err(PaymentError::WrongParties);
    };
    if !has_payer {
        return Err(PaymentError::WrongParties);
    }
    if idx >= facts.pre_balances.len() || idx >= facts.post_balances.len() {
        return Err(PaymentError::WrongParties);
    }

    let received = facts.post_balances[idx] as i64 - facts.pre_balances[idx] as i64;
    if (received - fee_lamports as i64).abs() > tolerance_lamports as i64 {
        return Err(PaymentError::WrongAmount {
            expected: fee_lamports,
            received,
        });
    }
    Ok(received.max(0) as u64)
}

pub struct PaymentVerifier {
    rpc: Rpc,
    collector: Pubkey,
    fee_lamports: u64,
    tolerance_lamports: u64,
}

impl PaymentVerifier {
    pub fn new(rpc: Rpc, collector: Pubkey, fee_lamports: u64, tolerance_lamports: u64) -> Self {
        Self {
            rpc,
            collector,
            fee_lamports,
            tolerance_lamports,
        }
    }

    pub fn fee_lamports(&self) -> u64 {
        self.fee_lamports
    }

    pub fn collector(&self) -> &Pubkey {
        &self.collector
    }

    /// Confirm that `tx_signature` paid the voting fee from `payer` to the
    /// collection wallet. Returns the received lamports.
    pub fn verify(&self, payer: &Pubkey, tx_signature: &str) -> Result<u64, PaymentError> {
        let sig = Signature::from_str(tx_signature).map_err(|_| PaymentError::NotFound)?;
        let facts = self.fetch_facts(&sig).ok_or(PaymentError::NotFound)?;
        let received = check_payment(
            &facts,
            payer,
            &self.collector,
            self.fee_lamports,
            self.tolerance_lamports,
        )?;
        debug!(%payer, tx = tx_signature, received, "payment verified");
        Ok(received)
    }

    fn fetch_facts(&self, sig: &Signature) -> Option<PaymentFacts> {
        let cfg = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Base64),
            commitment: Some(*self.rpc.commitment_cfg()),
            max_supported_transaction_version: Some(0),
        };
        let fetched = self.rpc.client().get_transaction_with_config(sig, cfg).ok()?;

        let decoded = fetched.transaction.transaction.decode()?;
        let meta = fetched.transaction.meta?;

        let mut account_keys: Vec<Pubkey> = decoded.message.static_account_keys().to_vec();
        // Balance arrays cover address-table accounts too; keep indexes aligned.
        if let OptionSerializer::Some(loaded) = &meta.loaded_addresses {
            for addr in loaded.writable.iter().chain(loaded.readonly.iter()) {
                if let Ok(key) = Pubkey::from_str(addr) {
                    account_keys.push(key);
                }
            }
        }

        Some(PaymentFacts {
            account_keys,
            failed: meta.err.is_some(),
            pre_balances: meta.pre_balances.clone(),
            post_balances: meta.post_balances.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(collector_delta: i64) -> (PaymentFacts, Pubkey, Pubkey) {
        let payer = Pubkey::new_unique();
        let collector = Pubkey::new_unique();
        let pre = 1_000_000_000i64;
        (
            PaymentFacts {
                account_keys: vec![payer, collector],
                failed: false,
                pre_balances: vec![2_000_000_000, pre as u64],
                post_balances: vec![1_979_000_000, (pre + collector_delta) as u64],
            },
            payer,
            collector,
        )
    }

    #[test]
    fn accepts_exact_fee() {
        let (f, payer, collector) = facts(20_000_000);
        let got = check_payment(&f, &payer, &collector, 20_000_000, 1_000_000).unwrap();
        assert_eq!(got, 20_000_000);
    }

    #[test]
    fn accepts_amount_within_tolerance() {
        let (f, payer, collector) = facts(19_100_000);
        assert!(check_payment(&f, &payer, &collector, 20_000_000, 1_000_000).is_ok());
    }

    #[test]
    fn rejects_amount_beyond_tolerance() {
        let (f, payer, collector) = facts(18_900_000);
        let err = check_payment(&f, &payer, &collector, 20_000_000, 1_000_000).unwrap_err();
        assert_eq!(
            err,
            PaymentError::WrongAmount {
                expected: 20_000_000,
                received: 18_900_000,
            }
        );
    }

    #[test]
    fn rejects_failed_transaction_even_with_right_amount() {
        let (mut f, payer, collector) = facts(20_000_000);
        f.failed = true;
        assert_eq!(
            check_payment(&f, &payer, &collector, 20_000_000, 1_000_000),
            Err(PaymentError::Failed)
        );
    }

    #[test]
    fn rejects_when_a_party_is_missing() {
        let (f, payer, collector) = facts(20_000_000);
        let stranger = Pubkey::new_unique();
        assert_eq!(
            check_payment(&f, &stranger, &collector, 20_000_000, 1_000_000),
            Err(PaymentError::WrongParties)
        );
        assert_eq!(
            check_payment(&f, &payer, &stranger, 20_000_000, 1_000_000),
            Err(PaymentError::WrongParties)
        );
    }
}
