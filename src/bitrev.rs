//! Bit-reversal permutation.
//!
//! Half of the transform variants consume or produce their data in bit-reversed order:
//! the element at index `i` lives at index `reverse_bits(i, log2(n))`.

/// Reverses the low `bits` bits of `x`.
#[inline]
pub fn reverse_bits(x: usize, bits: u32) -> usize {
    if bits == 0 {
        0
    } else {
        x.reverse_bits() >> (usize::BITS - bits)
    }
}

/// Permutes `buffer` in place so that element `i` moves to `reverse_bits(i, log2(len))`.
///
/// # Panics
///
/// Panics if the length is not a power of two.
pub fn bit_reverse<T>(buffer: &mut [T]) {
    let n = buffer.len();
    assert!(n.is_power_of_two(), "length {} is not a power of two", n);
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = reverse_bits(i, bits);
        if i < j {
            buffer.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(0b0001, 4), 0b1000);
        assert_eq!(reverse_bits(0b0110, 4), 0b0110);
        assert_eq!(reverse_bits(0b1011, 4), 0b1101);
        assert_eq!(reverse_bits(5, 0), 0);
        assert_eq!(reverse_bits(1, 1), 1);
    }

    #[test]
    fn test_bit_reverse_involution() {
        let original: Vec<u32> = (0..64).collect();
        let mut data = original.clone();
        bit_reverse(&mut data);
        assert_eq!(data[1], 32);
        assert_eq!(data[2], 16);
        bit_reverse(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    #[should_panic]
    fn test_bit_reverse_non_power_of_two() {
        let mut data = [1, 2, 3];
        bit_reverse(&mut data);
    }
}
