//! Base59: the base58 alphabet plus a trailing `'0'`
//!
//! Only multisig addresses use it. The `'0'` never appears in base58 text,
//! which is what lets it mark a multisig address.

use super::base58::{BaseDecodeError, BASE58_ALPHABET};

pub const BASE59_ALPHABET: &[u8; 59] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz0";

const BASE: u32 = 59;

pub fn encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|b| **b == 0).count();

    // base59 digits, least significant first
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for byte in &data[zeros..] {
        let mut carry = *byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % BASE) as u8;
            carry /= BASE;
        }
        while carry > 0 {
            digits.push((carry % BASE) as u8);
            carry /= BASE;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat(BASE59_ALPHABET[0] as char).take(zeros));
    out.extend(digits.iter().rev().map(|d| BASE59_ALPHABET[*d as usize] as char));
    out
}

pub fn decode(input: &str) -> Result<Vec<u8>, BaseDecodeError> {
    let leader = BASE59_ALPHABET[0] as char;
    let zeros = input.chars().take_while(|c| *c == leader).count();

    // bytes, least significant first
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len());
    for (index, character) in input.chars().enumerate() {
        let value = BASE59_ALPHABET
            .iter()
            .position(|x| *x as char == character)
            .ok_or(BaseDecodeError::InvalidCharacter { character, index })?;

        let mut carry = value as u32;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * BASE;
            *byte = (carry & 0xFF) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}

/// Decode, returning `None` instead of an error
pub fn decode_unsafe(input: &str) -> Option<Vec<u8>> {
    decode(input).ok()
}

pub fn is_base59_string(input: &str) -> bool {
    input.chars().all(|c| c == '0' || BASE58_ALPHABET.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multisig_address_bytes() {
        let address = "V23BXYqpNx3iKSEGGGMEyUNa7CoUM0";
        let bytes = decode(address).unwrap();
        assert_eq!(
            hex::encode_upper(&bytes),
            "A978FF44A3E0EC023AA39B6D67FA618E8EC283C50037"
        );
        assert_eq!(encode(&bytes), address);
    }

    #[test]
    fn test_matches_base58_below_58() {
        // digits below 58 map to the same symbols as base58
        assert_eq!(encode(&[57]), "z");
        assert_eq!(encode(&[58]), "0");
        assert_eq!(encode(&[59]), "21");
    }

    #[test]
    fn test_leading_zeros_and_empty() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").unwrap().is_empty());
        assert_eq!(encode(&[0, 0, 0xFF]), "115L");
        assert_eq!(decode("115L").unwrap(), vec![0, 0, 0xFF]);
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(
            decode("V2I").unwrap_err(),
            BaseDecodeError::InvalidCharacter {
                character: 'I',
                index: 2
            }
        );
        assert!(decode_unsafe("O").is_none());
        assert!(is_base59_string("V0"));
    }
}
