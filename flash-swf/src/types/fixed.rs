//! Fixed point numbers stored as scaled integers

/// A signed 16.16 fixed point number
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Fixed16(pub i32);

impl Fixed16 {
    /// 1.0
    pub const ONE: Self = Fixed16(1 << 16);

    /// Convert from a float, rounding to the nearest representable value
    pub fn from_f64(value: f64) -> Self {
        Fixed16((value * 65536.0).round() as i32)
    }

    /// Convert to a float
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 65536.0
    }
}

/// A signed 8.8 fixed point number
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Fixed8(pub i16);

impl Fixed8 {
    /// 1.0
    pub const ONE: Self = Fixed8(1 << 8);

    /// Convert from a float, rounding to the nearest representable value
    pub fn from_f32(value: f32) -> Self {
        Fixed8((value * 256.0).round() as i16)
    }

    /// Convert to a float
    pub fn to_f32(self) -> f32 {
        f32::from(self.0) / 256.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(Fixed16::from_f64(1.5), Fixed16(0x18000));
        assert_eq!(Fixed16(-0x8000).to_f64(), -0.5);
        assert_eq!(Fixed8::from_f32(24.0), Fixed8(0x1800));
        assert_eq!(Fixed8::ONE.to_f32(), 1.0);
    }
}
