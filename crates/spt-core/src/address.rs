//! Witness address resolution and Bech32/Bech32m rendering.
//!
//! Payloads name addresses as raw witness programs. The index keys balances
//! by the output script those programs pay to (`OP_n <push program>`), and
//! renders descriptors back to human-readable form for diagnostics:
//! Bech32 ([BIP-173]) for version 0, Bech32m ([BIP-350]) for versions 1-16.
//!
//! [BIP-173]: https://github.com/bitcoin/bips/blob/master/bip-0173.mediawiki
//! [BIP-350]: https://github.com/bitcoin/bips/blob/master/bip-0350.mediawiki

use crate::constants::{
    DEFAULT_ADDRESS_HRP, MAX_WITNESS_PROGRAM_LEN, MAX_WITNESS_VERSION, MIN_WITNESS_PROGRAM_LEN,
    OP_0, OP_1, OP_16,
};
use crate::error::{AddressError, ResolveError};
use crate::traits::AddressResolver;
use crate::types::{AddressDescriptor, WitnessAddress};

/// Bech32 checksum constant (BIP-173).
const BECH32_CONST: u32 = 1;

/// Bech32m checksum constant (BIP-350).
const BECH32M_CONST: u32 = 0x2bc830a3;

/// Bech32 character set for encoding 5-bit values.
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Longest string a Bech32 decoder accepts.
const MAX_BECH32_LEN: usize = 90;

/// Check version and program length rules for a witness address.
pub fn validate_witness(address: &WitnessAddress) -> Result<(), AddressError> {
    if address.version > MAX_WITNESS_VERSION {
        return Err(AddressError::InvalidVersion(address.version));
    }
    let len = address.program.len();
    if !(MIN_WITNESS_PROGRAM_LEN..=MAX_WITNESS_PROGRAM_LEN).contains(&len) {
        return Err(AddressError::InvalidLength);
    }
    if address.version == 0 && len != 20 && len != 32 {
        return Err(AddressError::InvalidLength);
    }
    Ok(())
}

/// Output script paying to a witness program: `OP_n <push program>`.
///
/// The address must already satisfy [`validate_witness`].
pub fn witness_script(address: &WitnessAddress) -> Vec<u8> {
    let mut script = Vec::with_capacity(2 + address.program.len());
    script.push(version_opcode(address.version));
    script.push(address.program.len() as u8);
    script.extend_from_slice(&address.program);
    script
}

/// Recover the witness address from an output script, if it is one.
pub fn parse_witness_script(script: &[u8]) -> Option<WitnessAddress> {
    let (&opcode, rest) = script.split_first()?;
    let (&push_len, program) = rest.split_first()?;
    if program.len() != push_len as usize {
        return None;
    }
    let version = match opcode {
        OP_0 => 0,
        OP_1..=OP_16 => opcode - OP_1 + 1,
        _ => return None,
    };
    let address = WitnessAddress::new(version, program);
    validate_witness(&address).ok()?;
    Some(address)
}

fn version_opcode(version: u8) -> u8 {
    if version == 0 { OP_0 } else { OP_1 + version - 1 }
}

fn checksum_const(version: u8) -> u32 {
    if version == 0 { BECH32_CONST } else { BECH32M_CONST }
}

/// Encode a witness address as a Bech32 (v0) or Bech32m (v1+) string.
pub fn encode(hrp: &str, address: &WitnessAddress) -> Result<String, AddressError> {
    validate_witness(address)?;
    if hrp.is_empty() || !hrp.bytes().all(|c| (33..=126).contains(&c)) {
        return Err(AddressError::InvalidHrp);
    }
    let hrp = hrp.to_ascii_lowercase();
    let program_5bit =
        convert_bits(&address.program, 8, 5, true).ok_or(AddressError::InvalidPadding)?;

    let mut payload = Vec::with_capacity(1 + program_5bit.len());
    payload.push(address.version);
    payload.extend_from_slice(&program_5bit);

    let checksum = create_checksum(&hrp, &payload, checksum_const(address.version));

    let mut result = String::with_capacity(hrp.len() + 1 + payload.len() + 6);
    result.push_str(&hrp);
    result.push('1');
    for &d in payload.iter().chain(checksum.iter()) {
        result.push(CHARSET[d as usize] as char);
    }
    Ok(result)
}

/// Decode a Bech32/Bech32m witness address, returning its HRP and program.
pub fn decode(s: &str) -> Result<(String, WitnessAddress), AddressError> {
    if s.len() > MAX_BECH32_LEN {
        return Err(AddressError::InvalidLength);
    }
    let has_lower = s.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = s.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(AddressError::MixedCase);
    }

    let s_lower = s.to_ascii_lowercase();
    let sep_pos = s_lower.rfind('1').ok_or(AddressError::MissingSeparator)?;
    if sep_pos == 0 {
        return Err(AddressError::InvalidHrp);
    }
    // 1 version char + 6 checksum chars after the separator.
    if sep_pos + 8 > s_lower.len() {
        return Err(AddressError::InvalidLength);
    }

    let hrp = &s_lower[..sep_pos];
    let data_part = &s_lower[sep_pos + 1..];

    let mut data = Vec::with_capacity(data_part.len());
    for c in data_part.chars() {
        let pos = CHARSET
            .iter()
            .position(|&ch| ch as char == c)
            .ok_or(AddressError::InvalidCharacter(c))?;
        data.push(pos as u8);
    }

    let version = data[0];
    if version > MAX_WITNESS_VERSION {
        return Err(AddressError::InvalidVersion(version));
    }
    if !verify_checksum(hrp, &data, checksum_const(version)) {
        return Err(AddressError::InvalidChecksum);
    }

    let payload = &data[..data.len() - 6];
    let program = convert_bits(&payload[1..], 5, 8, false).ok_or(AddressError::InvalidPadding)?;
    let address = WitnessAddress::new(version, program);
    validate_witness(&address)?;
    Ok((hrp.to_string(), address))
}

/// Resolves payload witness addresses to output-script descriptors.
#[derive(Debug, Clone)]
pub struct WitnessResolver {
    hrp: String,
}

impl WitnessResolver {
    pub fn new(hrp: impl Into<String>) -> Self {
        Self { hrp: hrp.into() }
    }

    pub fn hrp(&self) -> &str {
        &self.hrp
    }
}

impl Default for WitnessResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS_HRP)
    }
}

impl AddressResolver for WitnessResolver {
    fn resolve(&self, address: &WitnessAddress) -> Result<AddressDescriptor, ResolveError> {
        if address.is_empty() {
            return Err(ResolveError::Missing);
        }
        validate_witness(address).map_err(|e| ResolveError::Invalid(e.to_string()))?;
        Ok(AddressDescriptor(witness_script(address)))
    }

    fn describe(&self, descriptor: &AddressDescriptor) -> String {
        parse_witness_script(descriptor.as_bytes())
            .and_then(|address| encode(&self.hrp, &address).ok())
            .unwrap_or_else(|| descriptor.to_string())
    }
}

// --- Bech32 internals ---

fn polymod(values: &[u8]) -> u32 {
    const GEN: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];
    let mut chk: u32 = 1;
    for &v in values {
        let b = chk >> 25;
        chk = ((chk & 0x1ffffff) << 5) ^ (v as u32);
        for (i, &g) in GEN.iter().enumerate() {
            if (b >> i) & 1 != 0 {
                chk ^= g;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut ret = Vec::with_capacity(hrp.len() * 2 + 1);
    for c in hrp.bytes() {
        ret.push(c >> 5);
    }
    ret.push(0);
    for c in hrp.bytes() {
        ret.push(c & 31);
    }
    ret
}

fn create_checksum(hrp: &str, data: &[u8], constant: u32) -> Vec<u8> {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    let pm = polymod(&values) ^ constant;
    (0..6).map(|i| ((pm >> (5 * (5 - i))) & 31) as u8).collect()
}

fn verify_checksum(hrp: &str, data: &[u8], constant: u32) -> bool {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    polymod(&values) == constant
}

/// Convert between bit widths (e.g. 8-bit bytes to 5-bit groups).
fn convert_bits(data: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut ret = Vec::new();
    let maxv = (1u32 << to_bits) - 1;
    for &value in data {
        let v = value as u32;
        if v >> from_bits != 0 {
            return None;
        }
        acc = (acc << from_bits) | v;
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            ret.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            ret.push(((acc << (to_bits - bits)) & maxv) as u8);
        }
    } else if bits >= from_bits || ((acc << (to_bits - bits)) & maxv) != 0 {
        return None;
    }
    Some(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p2wpkh_program() -> Vec<u8> {
        hex::decode("751e76e8199196d454941c45d1b3a323f1433bd6").unwrap()
    }

    // --- Encoding ---

    #[test]
    fn bip173_p2wpkh_vector() {
        let addr = WitnessAddress::new(0, p2wpkh_program());
        assert_eq!(encode("bc", &addr).unwrap(), "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
    }

    #[test]
    fn bip173_vector_decodes() {
        let (hrp, addr) = decode("BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4").unwrap();
        assert_eq!(hrp, "bc");
        assert_eq!(addr, WitnessAddress::new(0, p2wpkh_program()));
    }

    #[test]
    fn taproot_roundtrip_uses_bech32m() {
        let addr = WitnessAddress::new(1, vec![0x79; 32]);
        let s = encode("sys", &addr).unwrap();
        assert!(s.starts_with("sys1p"));
        assert_eq!(decode(&s).unwrap(), ("sys".to_string(), addr));
    }

    #[test]
    fn v1_with_bech32_checksum_rejected() {
        // Re-checksum a v1 payload with the v0 constant.
        let addr = WitnessAddress::new(1, vec![0x79; 32]);
        let mut payload = vec![1u8];
        payload.extend(convert_bits(&addr.program, 8, 5, true).unwrap());
        let checksum = create_checksum("sys", &payload, BECH32_CONST);
        let mut s = String::from("sys1");
        for &d in payload.iter().chain(checksum.iter()) {
            s.push(CHARSET[d as usize] as char);
        }
        assert_eq!(decode(&s), Err(AddressError::InvalidChecksum));
    }

    #[test]
    fn decode_rejects_mixed_case() {
        assert_eq!(
            decode("bc1QW508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"),
            Err(AddressError::MixedCase)
        );
    }

    #[test]
    fn decode_rejects_corrupted_char() {
        assert_eq!(
            decode("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5"),
            Err(AddressError::InvalidChecksum)
        );
    }

    #[test]
    fn decode_rejects_missing_separator() {
        assert_eq!(decode("qwertyqwerty"), Err(AddressError::MissingSeparator));
    }

    #[test]
    fn encode_rejects_bad_v0_length() {
        let addr = WitnessAddress::new(0, vec![1; 25]);
        assert_eq!(encode("sys", &addr), Err(AddressError::InvalidLength));
    }

    // --- Scripts ---

    #[test]
    fn witness_script_layout() {
        let addr = WitnessAddress::new(0, p2wpkh_program());
        let script = witness_script(&addr);
        assert_eq!(hex::encode(&script), "0014751e76e8199196d454941c45d1b3a323f1433bd6");
        assert_eq!(parse_witness_script(&script), Some(addr));
    }

    #[test]
    fn witness_script_v16_opcode() {
        let addr = WitnessAddress::new(16, vec![0xaa; 2]);
        let script = witness_script(&addr);
        assert_eq!(script[0], OP_16);
        assert_eq!(parse_witness_script(&script), Some(addr));
    }

    #[test]
    fn parse_rejects_length_mismatch() {
        assert_eq!(parse_witness_script(&[OP_0, 0x14, 0x01]), None);
        assert_eq!(parse_witness_script(&[]), None);
        assert_eq!(parse_witness_script(&[0x6a, 0x02, 0x01, 0x02]), None);
    }

    // --- Resolver ---

    #[test]
    fn resolver_missing_for_empty_program() {
        let r = WitnessResolver::default();
        assert_eq!(r.resolve(&WitnessAddress::none()), Err(ResolveError::Missing));
    }

    #[test]
    fn resolver_invalid_for_bad_version() {
        let r = WitnessResolver::default();
        let err = r.resolve(&WitnessAddress::new(17, vec![1; 20])).unwrap_err();
        assert!(matches!(err, ResolveError::Invalid(_)));
    }

    #[test]
    fn resolver_describe_renders_bech32() {
        let r = WitnessResolver::new("bc");
        let d = r.resolve(&WitnessAddress::new(0, p2wpkh_program())).unwrap();
        assert_eq!(r.describe(&d), "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
    }

    #[test]
    fn resolver_describe_falls_back_to_hex() {
        let r = WitnessResolver::default();
        let d = AddressDescriptor(vec![0x76, 0xa9]);
        assert_eq!(r.describe(&d), "76a9");
    }
}
