// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! K1 signature verification for YTA/EOS-style keys.
//!
//! Signatures arrive in the chain's textual envelope:
//!
//! ```text
//! SIG_K1_ base58( V || R || S || ripemd160(V || R || S || "K1")[..4] )
//! ```
//!
//! where `V = recovery_id + 27 + 4`. Public keys are stored without their
//! chain prefix as `base58(compressed_key || ripemd160(compressed_key)[..4])`
//! (37 bytes), or as the bare 33-byte compressed key.
//!
//! Verification recovers the signer's key from `sha256(message)` and compares
//! it with the stored key. Every failure mode collapses to `false`.

use base58::FromBase58;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Textual prefix of a recoverable secp256k1 signature.
pub const K1_SIGNATURE_PREFIX: &str = "SIG_K1_";

/// Suffix mixed into the signature checksum.
const K1_CHECKSUM_SUFFIX: &[u8] = b"K1";

/// `[V || R || S]` length.
const RECOVERABLE_SIGNATURE_LEN: usize = 65;

const CHECKSUM_LEN: usize = 4;

/// Compressed SEC1 public key length.
const COMPRESSED_KEY_LEN: usize = 33;

/// Compressed key plus checksum.
const CHECKSUMMED_KEY_LEN: usize = COMPRESSED_KEY_LEN + CHECKSUM_LEN;

/// Offset added to the recovery id in the stored `V` byte (27 + 4 for compressed keys).
const RECOVERY_BYTE_OFFSET: u8 = 31;

/// Verify `signature` over `message` against the stored `public_key`.
///
/// Returns `false` for any malformed input; this never panics and never errors.
pub fn verify(public_key: &str, message: &[u8], signature: &str) -> bool {
    let Some(encoded) = signature.strip_prefix(K1_SIGNATURE_PREFIX) else {
        return false;
    };

    let Some(recovered) = recover_compressed_key(message, encoded) else {
        return false;
    };

    let Ok(claimed) = public_key.from_base58() else {
        return false;
    };

    let mut candidate = recovered.to_vec();
    candidate.extend_from_slice(&ripemd160_checksum(&recovered));

    match claimed.len() {
        COMPRESSED_KEY_LEN | CHECKSUMMED_KEY_LEN => claimed[..] == candidate[..claimed.len()],
        _ => false,
    }
}

/// Decode the base58 body of a K1 signature and recover the compressed signer key.
fn recover_compressed_key(message: &[u8], encoded: &str) -> Option<[u8; COMPRESSED_KEY_LEN]> {
    let raw = encoded.from_base58().ok()?;
    if raw.len() < RECOVERABLE_SIGNATURE_LEN + CHECKSUM_LEN {
        return None;
    }

    let (sig_bytes, trailer) = raw.split_at(RECOVERABLE_SIGNATURE_LEN);
    let mut checked = sig_bytes.to_vec();
    checked.extend_from_slice(K1_CHECKSUM_SUFFIX);
    if ripemd160_checksum(&checked) != trailer[..CHECKSUM_LEN] {
        return None;
    }

    let recovery_byte = sig_bytes[0].checked_sub(RECOVERY_BYTE_OFFSET)?;
    let mut recovery_id = RecoveryId::from_byte(recovery_byte)?;
    let mut signature = Signature::from_slice(&sig_bytes[1..]).ok()?;

    // Recovery over k256 only accepts low-S; flip the parity along with S.
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let digest = Sha256::digest(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id).ok()?;

    key.to_encoded_point(true).as_bytes().try_into().ok()
}

/// First four bytes of `ripemd160(data)`.
fn ripemd160_checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Ripemd160::digest(data);
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&digest[..CHECKSUM_LEN]);
    checksum
}


#[cfg(test)]
mod tests {
    use base58::{FromBase58, ToBase58};

    use super::testing::*;
    use super::*;

    const MESSAGE: &[u8] = b"account=alice&ethaddr=0xABC";

    #[test]
    fn valid_signature_verifies() {
        let key = signing_key(0x11);
        let signature = sign(&key, MESSAGE);

        assert!(signature.starts_with(K1_SIGNATURE_PREFIX));
        assert!(verify(&public_key_string(&key), MESSAGE, &signature));
    }

    #[test]
    fn legacy_33_byte_key_form_verifies() {
        let key = signing_key(0x22);
        let signature = sign(&key, MESSAGE);
        let bare = key.verifying_key().to_encoded_point(true).as_bytes().to_base58();

        assert!(verify(&bare, MESSAGE, &signature));
    }

    #[test]
    fn different_message_fails() {
        let key = signing_key(0x11);
        let signature = sign(&key, MESSAGE);

        assert!(!verify(
            &public_key_string(&key),
            b"account=alice&ethaddr=0xDEF",
            &signature
        ));
    }

    #[test]
    fn different_key_fails() {
        let signer = signing_key(0x11);
        let other = signing_key(0x33);
        let signature = sign(&signer, MESSAGE);

        assert!(!verify(&public_key_string(&other), MESSAGE, &signature));
    }

    #[test]
    fn any_checksum_bit_flip_fails() {
        let key = signing_key(0x44);
        let public_key = public_key_string(&key);
        let signature = sign(&key, MESSAGE);
        let body = signature[K1_SIGNATURE_PREFIX.len()..].from_base58().unwrap();

        for byte in body.len() - CHECKSUM_LEN..body.len() {
            for bit in 0..8 {
                let mut corrupted = body.clone();
                corrupted[byte] ^= 1 << bit;
                let tampered = format!("{K1_SIGNATURE_PREFIX}{}", corrupted.to_base58());
                assert!(
                    !verify(&public_key, MESSAGE, &tampered),
                    "flip of bit {bit} in byte {byte} was accepted"
                );
            }
        }
    }

    #[test]
    fn corrupted_signature_body_fails_checksum() {
        let key = signing_key(0x44);
        let signature = sign(&key, MESSAGE);
        let mut body = signature[K1_SIGNATURE_PREFIX.len()..].from_base58().unwrap();
        body[10] ^= 0x01;
        let tampered = format!("{K1_SIGNATURE_PREFIX}{}", body.to_base58());

        assert!(!verify(&public_key_string(&key), MESSAGE, &tampered));
    }

    #[test]
    fn missing_prefix_is_rejected() {
        let key = signing_key(0x55);
        let signature = sign(&key, MESSAGE);
        let public_key = public_key_string(&key);

        let stripped = &signature[K1_SIGNATURE_PREFIX.len()..];
        assert!(!verify(&public_key, MESSAGE, stripped));
        assert!(!verify(&public_key, MESSAGE, &format!("SIG_R1_{stripped}")));
        assert!(!verify(&public_key, MESSAGE, ""));
    }

    #[test]
    fn malformed_inputs_return_false() {
        let key = signing_key(0x66);
        let public_key = public_key_string(&key);

        // '0' and 'l' are not in the base58 alphabet.
        assert!(!verify(&public_key, MESSAGE, "SIG_K1_0l0l0l"));
        // Too short to hold a signature and checksum.
        assert!(!verify(&public_key, MESSAGE, &format!("SIG_K1_{}", [1u8; 20].to_base58())));
        // Unparseable stored key.
        assert!(!verify("not-base58-0OIl", MESSAGE, &sign(&key, MESSAGE)));
        // Empty stored key (snapshot could not fetch one).
        assert!(!verify("", MESSAGE, &sign(&key, MESSAGE)));
    }

    #[test]
    fn wrong_key_length_fails() {
        let key = signing_key(0x77);
        let signature = sign(&key, MESSAGE);
        let point = key.verifying_key().to_encoded_point(true);
        let truncated = point.as_bytes()[..32].to_base58();

        assert!(!verify(&truncated, MESSAGE, &signature));
    }

    #[test]
    fn out_of_range_recovery_byte_fails() {
        let key = signing_key(0x88);
        let mut raw = sign_raw(&key, MESSAGE);
        let public_key = public_key_string(&key);

        raw[0] = 27; // below the compressed-key offset
        assert!(!verify(&public_key, MESSAGE, &encode_signature(&raw)));

        raw[0] = RECOVERY_BYTE_OFFSET + 4;
        assert!(!verify(&public_key, MESSAGE, &encode_signature(&raw)));
    }

    #[test]
    fn longer_checksum_trailer_compares_first_four_bytes() {
        let key = signing_key(0x99);
        let signature = sign(&key, MESSAGE);
        let mut body = signature[K1_SIGNATURE_PREFIX.len()..].from_base58().unwrap();
        body.extend_from_slice(&[0xAA, 0xBB]);
        let padded = format!("{K1_SIGNATURE_PREFIX}{}", body.to_base58());

        assert!(verify(&public_key_string(&key), MESSAGE, &padded));
    }

    #[test]
    fn high_s_signature_is_normalized() {
        use k256::Scalar;

        let key = signing_key(0xAB);
        let raw = sign_raw(&key, MESSAGE);
        let signature = Signature::from_slice(&raw[1..]).unwrap();
        let (r, s) = signature.split_scalars();
        let high_s: Scalar = -(*s);
        let high = Signature::from_scalars((*r).to_bytes(), high_s.to_bytes()).unwrap();
        assert!(high.normalize_s().is_some(), "fixture must carry a high S");
        let recovery = RecoveryId::from_byte(raw[0] - RECOVERY_BYTE_OFFSET).unwrap();
        let flipped = RecoveryId::new(!recovery.is_y_odd(), recovery.is_x_reduced());

        let mut malleated = vec![flipped.to_byte() + RECOVERY_BYTE_OFFSET];
        malleated.extend_from_slice(&high.to_bytes());

        assert!(verify(
            &public_key_string(&key),
            MESSAGE,
            &encode_signature(&malleated)
        ));
    }
}
