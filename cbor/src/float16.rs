/*!
Half-precision to single-precision conversion.

The conversion is exact for every input. NaN payloads are carried across by
shifting the 10 bit half-precision mantissa into the top of the 23 bit
single-precision mantissa, so distinct half-precision NaNs stay distinct.
*/

const F16_EXP_MASK: u16 = 0x7C00;
const F16_MAN_MASK: u16 = 0x03FF;
const F32_EXP_MASK: u32 = 0x7F80_0000;

// (127 - 15): difference between the single and half precision exponent biases
const REBIAS: u32 = 112;

/// Converts IEEE-754 binary16 bits into the binary32 bits of the same value.
pub const fn f16_to_f32_bits(bits: u16) -> u32 {
    let sign = ((bits & 0x8000) as u32) << 16;
    let exp = ((bits & F16_EXP_MASK) >> 10) as u32;
    let man = (bits & F16_MAN_MASK) as u32;

    match (exp, man) {
        (0, 0) => sign,
        (0, _) => {
            // Subnormal: shift the leading one up to the implicit bit position
            let mut exp = 1;
            let mut man = man;
            while man & 0x0400 == 0 {
                man <<= 1;
                exp -= 1;
            }
            sign | ((exp + REBIAS as i32) as u32) << 23 | (man & F16_MAN_MASK as u32) << 13
        }
        (0x1F, 0) => sign | F32_EXP_MASK,
        (0x1F, _) => sign | F32_EXP_MASK | man << 13,
        _ => sign | (exp + REBIAS) << 23 | man << 13,
    }
}

/// Converts IEEE-754 binary16 bits into an `f32`, keeping any NaN payload.
pub fn f16_to_f32(bits: u16) -> f32 {
    f32::from_bits(f16_to_f32_bits(bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specials() {
        assert_eq!(f16_to_f32_bits(0x0000), 0x0000_0000);
        assert_eq!(f16_to_f32_bits(0x8000), 0x8000_0000);
        assert_eq!(f16_to_f32_bits(0x7C00), 0x7F80_0000);
        assert_eq!(f16_to_f32_bits(0xFC00), 0xFF80_0000);
        assert_eq!(f16_to_f32_bits(0x7E00), 0x7FC0_0000);
        assert_eq!(f16_to_f32_bits(0x7C01), 0x7F80_2000);
        assert_eq!(f16_to_f32_bits(0xFE00), 0xFFC0_0000);
        assert_ne!(f16_to_f32_bits(0x7C01), f16_to_f32_bits(0x7E00));
    }

    #[test]
    fn rfc_examples() {
        assert_eq!(f16_to_f32(0x3C00), 1.0);
        assert_eq!(f16_to_f32(0x3E00), 1.5);
        assert_eq!(f16_to_f32(0x7BFF), 65504.0);
        assert_eq!(f16_to_f32(0x0001), 5.960464477539063e-8);
        assert_eq!(f16_to_f32(0x0400), 0.00006103515625);
        assert_eq!(f16_to_f32(0xC400), -4.0);
    }

    #[test]
    fn subnormals() {
        // Largest subnormal: 1023 * 2^-24
        assert_eq!(f16_to_f32(0x03FF), 1023.0 * 5.960464477539063e-8);
        assert_eq!(f16_to_f32(0x8001), -5.960464477539063e-8);
        assert_eq!(f16_to_f32(0x0200), 0.000030517578125);
    }

    #[test]
    fn matches_half_for_every_non_nan() {
        for bits in 0..=u16::MAX {
            let h = half::f16::from_bits(bits);
            if h.is_nan() {
                continue;
            }
            assert_eq!(
                f16_to_f32_bits(bits),
                h.to_f32().to_bits(),
                "mismatch for {bits:#06x}"
            );
        }
    }

    #[test]
    fn nan_payloads_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for man in 1..=0x03FFu16 {
            let bits = f16_to_f32_bits(0x7C00 | man);
            assert_eq!(bits & 0x7F80_0000, 0x7F80_0000);
            assert_eq!(bits & 0x1FFF, 0);
            assert!(seen.insert(bits));
        }
    }
}
