use rand::rngs::OsRng;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::instrument;

/// Hashing and code generation for one-time passcodes.
#[derive(Debug, Clone, Default)]
pub struct CryptoService;

impl CryptoService {
    pub fn new() -> Self {
        Self
    }

    /// Lowercase hex SHA-256 digest, the form OTP codes are stored in.
    pub fn hash_code(&self, code: &str) -> String {
        hex::encode(Sha256::digest(code.as_bytes()))
    }

    #[instrument(skip(self, code, hash))]
    pub fn verify_code(&self, code: &str, hash: &str) -> bool {
        self.hash_code(code.trim()).eq_ignore_ascii_case(hash)
    }

    /// Six digit code drawn from the operating system RNG.
    pub fn generate_otp_code(&self) -> String {
        let code: u32 = OsRng.gen_range(100_000..=999_999);
        code.to_string()
    }
}
