use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

const VERIFIER_BYTES: usize = 32;
const STATE_BYTES: usize = 24;

/// PKCE verifier with its S256 challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    pub fn generate() -> Self {
        let verifier = random_token(VERIFIER_BYTES);
        let challenge = s256_challenge(&verifier);
        Self {
            verifier,
            challenge,
        }
    }
}

/// Base64url (unpadded) SHA-256 digest of the verifier.
pub fn s256_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Opaque anti-forgery value for an authorization round trip.
pub fn random_state() -> String {
    random_token(STATE_BYTES)
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0_u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::{PkcePair, random_state, s256_challenge};

    #[test]
    fn challenge_matches_rfc_7636_example() {
        assert_eq!(
            s256_challenge("dBjftJeZ4CVP-1mB2OdT6Kr-4i9QVHPAX1ikkbUqEBk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn generated_pairs_are_consistent_and_unique() {
        let first = PkcePair::generate();
        let second = PkcePair::generate();

        assert_eq!(first.verifier.len(), 43);
        assert_eq!(s256_challenge(&first.verifier), first.challenge);
        assert_ne!(first.verifier, second.verifier);
    }

    #[test]
    fn state_is_url_safe() {
        let state = random_state();
        assert_eq!(state.len(), 32);
        assert!(
            state
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        );
    }
}
