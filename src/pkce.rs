use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::types::{CodeChallenge, CodeVerifier, OAuthState};

/// Generates a cryptographically random code verifier for PKCE.
///
/// 48 bytes from the thread-local CSPRNG, base64url without padding
/// (64 characters, inside the RFC 7636 range of 43-128).
#[must_use]
pub fn generate_verifier() -> CodeVerifier {
    let random_bytes: [u8; 48] = rand::rng().random();
    CodeVerifier(URL_SAFE_NO_PAD.encode(random_bytes))
}

/// Computes the S256 code challenge from a code verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`
#[must_use]
pub fn derive_challenge(verifier: &CodeVerifier) -> CodeChallenge {
    let hash = Sha256::digest(verifier.as_str().as_bytes());
    CodeChallenge(URL_SAFE_NO_PAD.encode(hash))
}

/// Generates a cryptographically random `state` parameter.
///
/// Returns a 43-character URL-safe string (32 random bytes → base64url).
#[must_use]
pub fn generate_state() -> OAuthState {
    let random_bytes: [u8; 32] = rand::rng().random();
    OAuthState(URL_SAFE_NO_PAD.encode(random_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_url_safe(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    #[test]
    fn test_verifier_length() {
        let verifier = generate_verifier();
        assert_eq!(verifier.as_str().len(), 64);
    }

    #[test]
    fn test_verifier_url_safe() {
        let verifier = generate_verifier();
        assert!(
            is_url_safe(verifier.as_str()),
            "verifier should be URL-safe: {}",
            verifier.as_str()
        );
    }

    #[test]
    fn test_verifier_uniqueness() {
        assert_ne!(generate_verifier(), generate_verifier());
    }

    #[test]
    fn test_challenge_rfc7636_vector() {
        // RFC 7636 Appendix B
        let verifier = CodeVerifier::from("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string());
        assert_eq!(
            derive_challenge(&verifier).as_str(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_challenge_has_no_padding() {
        let challenge = derive_challenge(&generate_verifier());
        assert_eq!(challenge.as_str().len(), 43);
        assert!(is_url_safe(challenge.as_str()));
    }

    #[test]
    fn test_challenge_different_for_different_verifiers() {
        let c1 = derive_challenge(&CodeVerifier::from("verifier_1".to_string()));
        let c2 = derive_challenge(&CodeVerifier::from("verifier_2".to_string()));
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_state_length_and_uniqueness() {
        let s1 = generate_state();
        let s2 = generate_state();
        assert_eq!(s1.as_str().len(), 43);
        assert_ne!(s1, s2, "states should be unique");
    }
}
