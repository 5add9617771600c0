//! Address parsing, key handling and transaction signing.
//!
//! # Security
//! - Private keys are entered per transfer and never stored
//! - Key text is zeroized when dropped; the signer is consumed by signing
//! - Keys are never logged or serialized

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind};
use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::blockchain::types::{SignedTransaction, TransactionDraft};

/// Why a string is not a usable address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("expected 40 hex characters, got {0}")]
    Length(usize),

    #[error("contains non-hex characters")]
    NotHex,

    #[error("mixed-case address fails EIP-55 checksum")]
    Checksum,
}

/// Parse a 20-byte hex address with optional `0x` prefix.
///
/// All-lowercase and all-uppercase input is accepted as is; mixed case must
/// be a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    let trimmed = input.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex_part.len() != 40 {
        return Err(AddressError::Length(hex_part.len()));
    }
    if !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AddressError::NotHex);
    }

    let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(format!("0x{hex_part}"), None)
            .map_err(|_| AddressError::Checksum);
    }

    hex_part.parse().map_err(|_| AddressError::NotHex)
}

/// Private key text as typed by the user. Wiped from memory on drop.
pub struct SecretKey(Zeroizing<String>);

impl SecretKey {
    pub fn new(key: String) -> Self {
        Self(Zeroizing::new(key))
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for SecretKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Errors from key handling and signing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("Invalid private key format: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Single-use signer for one transfer.
#[derive(Debug)]
pub struct Wallet {
    /// The underlying signer (private key). k256 zeroizes it on drop.
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Derive the wallet from a hex-encoded private key.
    ///
    /// Takes ownership of the key so the caller's copy is wiped as soon as
    /// this returns, whatever the outcome.
    pub fn from_secret(key: SecretKey) -> Result<Self, WalletError> {
        let text = key.expose().trim();
        let key_hex = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);

        if key_hex.len() != 64 {
            return Err(WalletError::InvalidKey(format!(
                "expected 64 hex characters, got {}",
                key_hex.len()
            )));
        }

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::InvalidKey(format!("{}", e)))?;

        tracing::debug!(address = %signer.address(), "Sender derived from key");
        Ok(Self { signer })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a legacy EIP-155 transfer. Consumes the wallet.
    pub fn sign(self, draft: TransactionDraft) -> Result<SignedTransaction, WalletError> {
        let gas_price: u128 = draft
            .gas_price
            .try_into()
            .map_err(|_| WalletError::Signing("gas price does not fit in 128 bits".to_string()))?;

        let mut tx = TxLegacy {
            chain_id: Some(draft.chain_id),
            nonce: draft.nonce,
            gas_price,
            gas_limit: draft.gas_limit,
            to: TxKind::Call(draft.to),
            value: draft.value_wei,
            input: Bytes::new(),
        };

        let signature = self
            .signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| WalletError::Signing(e.to_string()))?;

        let signed = tx.into_signed(signature);
        let hash = *signed.hash();
        let raw = Bytes::from(TxEnvelope::from(signed).encoded_2718());

        Ok(SignedTransaction { draft, hash, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::U256;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn wallet() -> Wallet {
        Wallet::from_secret(SecretKey::new(TEST_PRIVATE_KEY.to_string())).unwrap()
    }

    fn draft(from: Address) -> TransactionDraft {
        TransactionDraft {
            from,
            to: Address::repeat_byte(0xaa),
            value_wei: U256::from(100_000_000_000_000_000u64),
            nonce: 7,
            gas_limit: 25_200,
            gas_price: U256::from(20_000_000_000u64),
            chain_id: 270,
        }
    }

    #[test]
    fn test_wallet_from_private_key() {
        assert_eq!(wallet().address().to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let wallet = Wallet::from_secret(format!("0x{}", TEST_PRIVATE_KEY).into()).unwrap();
        assert_eq!(wallet.address().to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_invalid_private_key() {
        let err = Wallet::from_secret("invalid_key".to_string().into()).unwrap_err();
        assert!(err.to_string().contains("Invalid private key"));

        let zero = "0".repeat(64);
        assert!(matches!(
            Wallet::from_secret(zero.into()),
            Err(WalletError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let key = SecretKey::new(TEST_PRIVATE_KEY.to_string());
        assert!(!format!("{:?}", key).contains("ac09"));
    }

    #[test]
    fn test_parse_address() {
        let all_a = format!("0x{}", "A".repeat(40));
        assert_eq!(parse_address(&all_a).unwrap(), Address::repeat_byte(0xaa));
        assert_eq!(parse_address(&"a".repeat(40)).unwrap(), Address::repeat_byte(0xaa));
        assert!(parse_address(TEST_ADDRESS).is_ok());
        // EIP-55 checksummed form of the Anvil address
        assert!(parse_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").is_ok());
    }

    #[test]
    fn test_parse_address_rejects_malformed() {
        assert_eq!(parse_address("0x1234"), Err(AddressError::Length(4)));
        assert_eq!(parse_address(&"g".repeat(40)), Err(AddressError::NotHex));
        assert_eq!(parse_address(""), Err(AddressError::Length(0)));
        // Checksum with one letter's case flipped
        assert_eq!(
            parse_address("0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            Err(AddressError::Checksum)
        );
    }

    #[test]
    fn test_sign_produces_decodable_envelope() {
        let wallet = wallet();
        let from = wallet.address();
        let signed = wallet.sign(draft(from)).unwrap();

        assert_eq!(signed.draft.nonce, 7);
        let decoded = TxEnvelope::decode_2718(&mut signed.raw.as_ref()).unwrap();
        assert_eq!(*decoded.tx_hash(), signed.hash);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let from = wallet().address();
        let a = wallet().sign(draft(from)).unwrap();
        let b = wallet().sign(draft(from)).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.raw, b.raw);
    }
}
