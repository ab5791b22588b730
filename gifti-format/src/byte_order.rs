use std::fmt;

pub mod constants {
    pub const BIG_ENDIAN: &str = "BigEndian";
    pub const LITTLE_ENDIAN: &str = "LittleEndian";
}

use self::constants::*;

#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    /// Byte order of the machine this crate was compiled for.
    pub const HOST: Endian = if cfg!(target_endian = "big") {
        Endian::Big
    } else {
        Endian::Little
    };

    #[inline(always)]
    pub const fn host() -> Endian {
        Self::HOST
    }

    #[inline(always)]
    pub const fn is_host(self) -> bool {
        matches!(
            (self, Self::HOST),
            (Endian::Big, Endian::Big) | (Endian::Little, Endian::Little)
        )
    }

    pub const fn gifti_name(self) -> &'static str {
        match self {
            Endian::Big => BIG_ENDIAN,
            Endian::Little => LITTLE_ENDIAN,
        }
    }

    pub fn from_gifti_name(name: &str) -> Option<Endian> {
        match name {
            BIG_ENDIAN => Some(Endian::Big),
            LITTLE_ENDIAN => Some(Endian::Little),
            _ => None,
        }
    }
}

impl Default for Endian {
    fn default() -> Self {
        Self::HOST
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gifti_name())
    }
}

impl fmt::Debug for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Scalars whose byte representation can be reversed in place.
pub trait SwapBytes: Copy {
    fn swapped(self) -> Self;
}

macro_rules! impl_swap_int {
    ($($t:ty),*) => {
        $(impl SwapBytes for $t {
            #[inline(always)]
            fn swapped(self) -> Self {
                self.swap_bytes()
            }
        })*
    };
}

impl_swap_int!(u16, i16, u32, i32, u64, i64);

impl SwapBytes for f32 {
    #[inline(always)]
    fn swapped(self) -> Self {
        f32::from_bits(self.to_bits().swap_bytes())
    }
}

impl SwapBytes for f64 {
    #[inline(always)]
    fn swapped(self) -> Self {
        f64::from_bits(self.to_bits().swap_bytes())
    }
}

/// Reverses the byte order of every element.
pub fn swap_in_place<T: SwapBytes>(values: &mut [T]) {
    for value in values.iter_mut() {
        *value = value.swapped();
    }
}

/// Reverses every `width` byte chunk of a raw buffer. Widths of 0 and 1 are no-ops.
pub fn swap_chunks_in_place(bytes: &mut [u8], width: usize) {
    if width < 2 {
        return;
    }
    for chunk in bytes.chunks_exact_mut(width) {
        chunk.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swapping_twice_is_identity() {
        let mut values = [1.5f32, -2.25, 1.0e-7, 3.0e5];
        let original = values;
        swap_in_place(&mut values);
        assert_ne!(values[0].to_bits(), original[0].to_bits());
        swap_in_place(&mut values);
        assert_eq!(values, original);
    }

    #[test]
    fn swaps_integer_bytes() {
        let mut values = [0x0102_0304i32, -1];
        swap_in_place(&mut values);
        assert_eq!(values, [0x0403_0201, -1]);

        let mut short = [0x0a0bu16];
        swap_in_place(&mut short);
        assert_eq!(short[0], 0x0b0a);
    }

    #[test]
    fn raw_chunks_match_typed_swap() {
        let value = 0x1122_3344_5566_7788u64;
        let mut bytes = value.to_ne_bytes();
        swap_chunks_in_place(&mut bytes, 8);
        assert_eq!(u64::from_ne_bytes(bytes), value.swapped());
    }

    #[test]
    fn names() {
        assert_eq!(Endian::from_gifti_name("BigEndian"), Some(Endian::Big));
        assert_eq!(Endian::from_gifti_name("LittleEndian"), Some(Endian::Little));
        assert_eq!(Endian::from_gifti_name("little"), None);
        assert!(Endian::host().is_host());
    }
}
