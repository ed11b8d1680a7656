use crate::errors::{Error, Result};

/// The minimum number of bits needed to hold `value` in two's complement
///
/// Zero needs no bits at all, a group of zero fields can be written with a width of 0.
pub fn signed_bits(value: i32) -> u32 {
    match value {
        0 => 0,
        v if v > 0 => 33 - v.leading_zeros(),
        v => 33 - (!v).leading_zeros(),
    }
}

/// The minimum number of bits needed to hold `value` unsigned
pub fn unsigned_bits(value: u32) -> u32 {
    32 - value.leading_zeros()
}

/// The minimum signed width able to hold every value in the group
pub fn signed_width(values: impl IntoIterator<Item = i32>) -> u32 {
    values.into_iter().map(signed_bits).max().unwrap_or(0)
}

/// The minimum unsigned width able to hold every value in the group
pub fn unsigned_width(values: impl IntoIterator<Item = u32>) -> u32 {
    values.into_iter().map(unsigned_bits).max().unwrap_or(0)
}

/// Whether `value` can be written as a signed field of `width` bits
pub fn fits_signed(value: i32, width: u32) -> bool {
    signed_bits(value) <= width
}

/// Whether `value` can be written as an unsigned field of `width` bits
pub fn fits_unsigned(value: u32, width: u32) -> bool {
    unsigned_bits(value) <= width
}

/// The signed width of a group whose width is itself stored in a `prefix` bit field
///
/// Fails when the widest value needs more bits than the prefix can express.
pub fn prefixed_width(field: &'static str, values: impl IntoIterator<Item = i32>, prefix: u32) -> Result<u32> {
    let width = signed_width(values);
    let max = (1u32 << prefix) - 1;
    if width > max {
        return Err(Error::range(field, width, 0, i64::from(max)));
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_widths() {
        assert_eq!(signed_bits(0), 0);
        assert_eq!(signed_bits(-1), 1);
        assert_eq!(signed_bits(1), 2);
        assert_eq!(signed_bits(127), 8);
        assert_eq!(signed_bits(-128), 8);
        assert_eq!(signed_bits(128), 9);
        assert_eq!(signed_bits(-129), 9);
        assert_eq!(signed_bits(i32::MAX), 32);
        assert_eq!(signed_bits(i32::MIN), 32);
    }

    #[test]
    fn extreme_value_decides_group_width() {
        assert_eq!(signed_width([-100, -100, 100, 100]), 8);
        assert_eq!(signed_width([3, -4000, 12]), 13);
        assert_eq!(signed_width([]), 0);
    }

    #[test]
    fn unsigned_widths() {
        assert_eq!(unsigned_bits(0), 0);
        assert_eq!(unsigned_bits(1), 1);
        assert_eq!(unsigned_bits(255), 8);
        assert_eq!(unsigned_width([1, 2, 3]), 2);
        assert!(fits_unsigned(127, 7));
        assert!(!fits_unsigned(128, 7));
        assert!(fits_signed(-16, 5));
        assert!(!fits_signed(16, 5));
    }

    #[test]
    fn prefix_limits_the_width() {
        assert_eq!(prefixed_width("coordinate", [-100, 100], 5).unwrap(), 8);
        assert!(prefixed_width("coordinate", [i32::MIN], 5).is_err());
        assert_eq!(prefixed_width("coordinate", [1 << 29], 5).unwrap(), 31);
    }
}
