use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::str::FromStr;

/// Verify an ed25519 signature over `message`, both base58-encoded as wallets
/// produce them. Any malformed input counts as a failed verification.
pub fn verify_wallet_signature(wallet: &str, message: &str, signature: &str) -> bool {
    let Ok(pubkey) = Pubkey::from_str(wallet) else {
        return false;
    };
    let Ok(sig) = Signature::from_str(signature) else {
        return false;
    };
    sig.verify(pubkey.as_ref(), message.as_bytes())
}
