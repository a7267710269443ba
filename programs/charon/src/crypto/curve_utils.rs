//! BN254 curve helpers for Groth16 verification
//!
//! Point arithmetic goes through Solana's alt_bn128 syscalls. Encodings are
//! big-endian and uncompressed:
//! - G1: 64 bytes (x || y)
//! - G2: 128 bytes (x_c1 || x_c0 || y_c1 || y_c0)
//! - scalars: 32 bytes, must be below the group order `r`

use anchor_lang::prelude::*;
use num_bigint::BigUint;
use num_traits::Zero;
use solana_program::alt_bn128::{
    prelude::{alt_bn128_addition, alt_bn128_multiplication, alt_bn128_pairing},
    AltBn128Error,
};

use crate::error::CharonError;

/// BN254 base field modulus (p), big-endian
pub const BN254_FIELD_MODULUS: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29,
    0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x97, 0x81, 0x6a, 0x91, 0x68, 0x71, 0xca, 0x8d,
    0x3c, 0x20, 0x8c, 0x16, 0xd8, 0x7c, 0xfd, 0x47,
];

/// BN254 scalar field modulus (r), big-endian
pub const BN254_SCALAR_MODULUS: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29,
    0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91,
    0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

pub type G1Point = [u8; 64];
pub type G2Point = [u8; 128];
pub type ScalarField = [u8; 32];

/// G1 point || G2 point
pub type PairingElement = [u8; 192];

pub fn is_g1_identity(point: &G1Point) -> bool {
    point.iter().all(|&b| b == 0)
}

pub fn is_g2_identity(point: &G2Point) -> bool {
    point.iter().all(|&b| b == 0)
}

/// Check `y^2 = x^3 + 3 (mod p)` with coordinates in range.
pub fn validate_g1_point(point: &G1Point) -> Result<()> {
    if is_g1_identity(point) {
        return Ok(());
    }

    let p = BigUint::from_bytes_be(&BN254_FIELD_MODULUS);
    let x = BigUint::from_bytes_be(&point[0..32]);
    let y = BigUint::from_bytes_be(&point[32..64]);
    require!(x < p && y < p, CharonError::InvalidProof);

    let lhs = (&y * &y) % &p;
    let rhs = (&x * &x * &x + BigUint::from(3u32)) % &p;
    require!(lhs == rhs, CharonError::InvalidProof);

    Ok(())
}

/// Range check of the four Fp components. The pairing syscall rejects
/// points off the twist, so a full Fp2 curve check is left to it.
pub fn validate_g2_point(point: &G2Point) -> Result<()> {
    let p = BigUint::from_bytes_be(&BN254_FIELD_MODULUS);
    for chunk in point.chunks(32) {
        require!(BigUint::from_bytes_be(chunk) < p, CharonError::InvalidProof);
    }
    Ok(())
}

/// `-P = (x, p - y)`
pub fn negate_g1(point: &G1Point) -> Result<G1Point> {
    if is_g1_identity(point) {
        return Ok(*point);
    }

    let p = BigUint::from_bytes_be(&BN254_FIELD_MODULUS);
    let y = BigUint::from_bytes_be(&point[32..64]);
    require!(y < p, CharonError::InvalidProof);
    let neg_y = if y.is_zero() { y } else { &p - &y };

    let mut result = [0u8; 64];
    result[0..32].copy_from_slice(&point[0..32]);
    write_be_32(&neg_y, &mut result[32..64]);
    Ok(result)
}

pub fn g1_add(a: &G1Point, b: &G1Point) -> Result<G1Point> {
    let mut input = [0u8; 128];
    input[0..64].copy_from_slice(a);
    input[64..128].copy_from_slice(b);

    let output = alt_bn128_addition(&input).map_err(map_bn128_error)?;
    to_g1(&output)
}

pub fn g1_scalar_mul(point: &G1Point, scalar: &ScalarField) -> Result<G1Point> {
    let mut input = [0u8; 96];
    input[0..64].copy_from_slice(point);
    input[64..96].copy_from_slice(scalar);

    let output = alt_bn128_multiplication(&input).map_err(map_bn128_error)?;
    to_g1(&output)
}

pub fn make_pairing_element(g1: &G1Point, g2: &G2Point) -> PairingElement {
    let mut element = [0u8; 192];
    element[0..64].copy_from_slice(g1);
    element[64..192].copy_from_slice(g2);
    element
}

/// Returns true when the product of all pairings is the identity in GT.
pub fn verify_pairing(elements: &[PairingElement]) -> Result<bool> {
    let input: Vec<u8> = elements.iter().flat_map(|e| e.iter().copied()).collect();
    let output = alt_bn128_pairing(&input).map_err(map_bn128_error)?;
    Ok(output.len() == 32 && output[31] == 1 && output[..31].iter().all(|&b| b == 0))
}

/// `vk_x = IC[0] + sum(input[i] * IC[i + 1])`
pub fn compute_vk_x(ic: &[G1Point], public_inputs: &[ScalarField]) -> Result<G1Point> {
    require!(
        ic.len() == public_inputs.len() + 1,
        CharonError::InvalidPublicInputs
    );

    let mut acc = ic[0];
    for (input, point) in public_inputs.iter().zip(&ic[1..]) {
        require!(is_valid_scalar(input), CharonError::InvalidPublicInputs);
        let term = g1_scalar_mul(point, input)?;
        acc = g1_add(&acc, &term)?;
    }
    Ok(acc)
}

/// Scalar strictly below `r`.
pub fn is_valid_scalar(scalar: &ScalarField) -> bool {
    // Big-endian byte order compares like the integer it encodes
    scalar < &BN254_SCALAR_MODULUS
}

/// u64 as a big-endian field element.
pub fn u64_to_scalar(value: u64) -> ScalarField {
    let mut scalar = [0u8; 32];
    scalar[24..32].copy_from_slice(&value.to_be_bytes());
    scalar
}

/// Arbitrary 32 bytes reduced modulo `r`.
pub fn reduce_to_scalar(bytes: &[u8; 32]) -> ScalarField {
    let r = BigUint::from_bytes_be(&BN254_SCALAR_MODULUS);
    let reduced = BigUint::from_bytes_be(bytes) % r;
    let mut scalar = [0u8; 32];
    write_be_32(&reduced, &mut scalar);
    scalar
}

/// Public keys enter the circuit reduced into the scalar field.
pub fn pubkey_to_scalar(pubkey: &Pubkey) -> ScalarField {
    reduce_to_scalar(&pubkey.to_bytes())
}

fn write_be_32(value: &BigUint, out: &mut [u8]) {
    let bytes = value.to_bytes_be();
    let len = bytes.len().min(32);
    out.fill(0);
    out[32 - len..].copy_from_slice(&bytes[bytes.len() - len..]);
}

fn to_g1(bytes: &[u8]) -> Result<G1Point> {
    require!(bytes.len() == 64, CharonError::InvalidProof);
    let mut point = [0u8; 64];
    point.copy_from_slice(bytes);
    Ok(point)
}

fn map_bn128_error(e: AltBn128Error) -> anchor_lang::error::Error {
    msg!("BN254 operation failed: {:?}", e);
    error!(CharonError::InvalidProof)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (1, 2)
    fn g1_generator() -> G1Point {
        let mut point = [0u8; 64];
        point[31] = 1;
        point[63] = 2;
        point
    }

    #[test]
    fn test_generator_on_curve() {
        assert!(validate_g1_point(&g1_generator()).is_ok());

        let mut off_curve = g1_generator();
        off_curve[63] = 3;
        assert!(validate_g1_point(&off_curve).is_err());
    }

    #[test]
    fn test_negate_twice_is_identity_map() {
        let generator = g1_generator();
        let neg = negate_g1(&generator).unwrap();
        assert_ne!(neg, generator);
        assert!(validate_g1_point(&neg).is_ok());
        assert_eq!(negate_g1(&neg).unwrap(), generator);
        assert_eq!(negate_g1(&[0u8; 64]).unwrap(), [0u8; 64]);
    }

    #[test]
    fn test_scalar_bounds() {
        assert!(is_valid_scalar(&[0u8; 32]));
        assert!(is_valid_scalar(&u64_to_scalar(u64::MAX)));
        assert!(!is_valid_scalar(&BN254_SCALAR_MODULUS));
        assert!(!is_valid_scalar(&[0xffu8; 32]));
    }

    #[test]
    fn test_reduce_to_scalar() {
        assert_eq!(reduce_to_scalar(&BN254_SCALAR_MODULUS), [0u8; 32]);
        let reduced = reduce_to_scalar(&[0xffu8; 32]);
        assert!(is_valid_scalar(&reduced));
        assert_eq!(reduce_to_scalar(&u64_to_scalar(7)), u64_to_scalar(7));
    }

    #[test]
    fn test_vk_x_length_mismatch() {
        let ic = vec![g1_generator(); 3];
        assert!(compute_vk_x(&ic, &[[0u8; 32]]).is_err());
    }
}
