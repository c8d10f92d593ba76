//! Dual (forward + reverse) Rabin-Karp rolling hash over a sliding window of
//! DNA characters.
//!
//! Both orientations are maintained simultaneously so the caller can read out
//! whichever one the k-mer factory currently reports as canonical, without
//! ever hashing the reverse-complement string from scratch.

use crate::alphabet;
use crate::mathutil;

/// Rolling hash state for a window of length `m`, modulus `q`, base `d`.
pub struct RollingHasherDual {
    /// Primary modulus. May be prime or a power of two.
    q: u64,
    /// Optional secondary modulus applied at read-out (0 disables it).
    rq: u64,
    /// Window length (the k-mer length).
    m: usize,
    /// Alphabet base, nominally 5 (the next prime above |{A,C,G,T}|).
    d: u64,
    /// `d^-1 mod q`, needed for the O(1) reverse-hash update.
    d_inv: u64,
    /// `d^(m-1) mod q`.
    h: u64,
    /// `true` if `q` is a power of two, enabling the `& (q-1)` fast path.
    pow2: bool,
    /// Number of characters folded in since the last reset.
    count: usize,
    hf: u64,
    hr: u64,
}

impl RollingHasherDual {
    /// Builds a hasher for window length `m` and modulus `q`, auto-deriving
    /// `d = 5` and its modular inverse, and auto-detecting the power-of-two
    /// fast path from `q`.
    pub fn new(q: u64, m: usize) -> Self {
        let d = 5u64;
        let pow2 = q.is_power_of_two();
        let d_inv = if pow2 {
            mod_inverse_pow2(d, q)
        } else {
            mathutil::modular_multiplicative_inverse_coprimes(d % q, q)
        };
        Self::with_base(q, m, d_inv, d)
    }

    /// Builds a hasher with an explicit `(d, d_inv)` pair, useful for tests
    /// that need to pin known values.
    pub fn with_base(q: u64, m: usize, d_inv: u64, d: u64) -> Self {
        Self::with_readout_modulus(q, m, d_inv, d, 0)
    }

    /// Like [`with_base`](Self::with_base), additionally applying a
    /// secondary modulus `rq` at read-out time (`0` disables it).
    pub fn with_readout_modulus(q: u64, m: usize, d_inv: u64, d: u64, rq: u64) -> Self {
        let pow2 = q.is_power_of_two();
        Self::with_pow2_override(q, m, d_inv, d, rq, pow2)
    }

    /// Like [`with_readout_modulus`](Self::with_readout_modulus), but forces
    /// the power-of-two fast path on or off instead of auto-detecting it
    /// from `q`.
    pub fn with_pow2_override(q: u64, m: usize, d_inv: u64, d: u64, rq: u64, pow2: bool) -> Self {
        assert!(q > 1, "modulus must be > 1");
        assert!(m >= 1, "window length must be >= 1");
        let h = mod_pow(d, (m as u64).saturating_sub(1), q, pow2);
        RollingHasherDual {
            q,
            rq,
            m,
            d,
            d_inv,
            h,
            pow2,
            count: 0,
            hf: 0,
            hr: 0,
        }
    }

    /// Clears both running hashes and the window-fill counter.
    pub fn reset(&mut self) {
        self.hf = 0;
        self.hr = 0;
        self.count = 0;
    }

    /// Folds in one incoming character while the window is not yet full
    /// (`count < m`).
    pub fn update_rolling_hash_in(&mut self, c_in: u8) {
        debug_assert!(self.count < self.m);
        let c_in = c_in as u64;
        let c_in_comp = alphabet::complement(c_in as u8) as u64;

        self.hf = self.modulo(self.mul(self.d, self.hf) + c_in);

        let pow = mod_pow(self.d, self.count as u64, self.q, self.pow2);
        self.hr = self.modulo(self.hr + self.mul(c_in_comp, pow));

        self.count += 1;
    }

    /// Steady-state update once the window is full: `c_in` enters, `c_out`
    /// (the character falling off the low end) leaves.
    pub fn update_rolling_hash_in_and_out(&mut self, c_in: u8, c_out: u8) {
        let c_in_code = c_in as u64;
        let c_out_code = c_out as u64;
        let c_in_comp = alphabet::complement(c_in) as u64;
        let c_out_comp = alphabet::complement(c_out) as u64;

        // H_f <- d*H_f + c_in - d*h*c_out  (mod q)
        let subtrahend = self.mul(self.mul(self.d, self.h), c_out_code);
        self.hf = self.modulo(self.mul(self.d, self.hf) + c_in_code + self.q - subtrahend % self.q);

        // H_r <- c_in_comp*h + (H_r - c_out_comp) * d_inv  (mod q)
        let diff = self.modulo(self.hr + self.q - c_out_comp % self.q);
        self.hr = self.modulo(self.mul(c_in_comp, self.h) + self.mul(diff, self.d_inv));

        self.count = self.m;
    }

    /// Read out the forward-orientation hash, applying the secondary
    /// modulus if one was configured.
    #[inline]
    pub fn hash_forward(&self) -> u64 {
        self.read_out(self.hf)
    }

    /// Read out the reverse-orientation hash, applying the secondary
    /// modulus if one was configured.
    #[inline]
    pub fn hash_backward(&self) -> u64 {
        self.read_out(self.hr)
    }

    #[inline]
    fn read_out(&self, h: u64) -> u64 {
        if self.rq == 0 {
            h
        } else {
            h % self.rq
        }
    }

    #[inline]
    fn modulo(&self, x: u64) -> u64 {
        if self.pow2 {
            x & (self.q - 1)
        } else {
            x % self.q
        }
    }

    #[inline]
    fn mul(&self, a: u64, b: u64) -> u64 {
        // A 128-bit widening multiply avoids overflow on the intermediate
        // product before reduction; required whenever q is not a power of
        // two (the `& (q-1)` fast path keeps operands within u64 range).
        (((a as u128) * (b as u128)) % self.q as u128) as u64
    }

}

/// `base^exp mod modulus`, using the `& (modulus-1)` fast path when
/// `pow2_modulus` is set.
fn mod_pow(mut base: u64, mut exp: u64, modulus: u64, pow2_modulus: bool) -> u64 {
    let mask = modulus - 1;
    let reduce = |x: u128| -> u64 {
        if pow2_modulus {
            (x as u64) & mask
        } else {
            (x % modulus as u128) as u64
        }
    };
    base = reduce(base as u128);
    let mut result = 1u64 % modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = reduce(result as u128 * base as u128);
        }
        base = reduce(base as u128 * base as u128);
        exp >>= 1;
    }
    result
}

/// Modular inverse of `a` with respect to a power-of-two modulus `q`,
/// computed via Newton's iteration for the inverse mod 2^n (valid because
/// the DNA-alphabet base `d = 5` is odd, and only odd numbers are invertible
/// mod a power of two).
fn mod_inverse_pow2(a: u64, q: u64) -> u64 {
    assert_eq!(a % 2, 1, "modular inverse mod a power of two requires an odd base");
    let mask = q - 1;
    let mut x = 1u64;
    // Doubles the number of correct low-order bits each iteration.
    loop {
        let err = (a.wrapping_mul(x)).wrapping_sub(1) & mask;
        if err == 0 {
            break;
        }
        x = x.wrapping_mul(2u64.wrapping_sub(a.wrapping_mul(x))) & mask;
    }
    x & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_then_replay_matches_fresh_hasher() {
        let q = mathutil::next_prime(1 << 20) as u64;
        let mut a = RollingHasherDual::new(q, 4);
        let mut b = RollingHasherDual::new(q, 4);

        for c in [0u8, 1, 2, 3] {
            a.update_rolling_hash_in(c);
        }
        assert_eq!(a.hash_forward(), {
            for c in [0u8, 1, 2, 3] {
                b.update_rolling_hash_in(c);
            }
            b.hash_forward()
        });

        a.reset();
        for c in [0u8, 1, 2, 3] {
            a.update_rolling_hash_in(c);
        }
        let mut c = RollingHasherDual::new(q, 4);
        for ch in [0u8, 1, 2, 3] {
            c.update_rolling_hash_in(ch);
        }
        assert_eq!(a.hash_forward(), c.hash_forward());
    }

    #[test]
    fn power_of_two_modulus_matches_prime_modulus_shape() {
        // Just exercises the pow2 fast path without overflow/panics.
        let q = 1u64 << 20;
        let mut h = RollingHasherDual::new(q, 3);
        h.update_rolling_hash_in(0);
        h.update_rolling_hash_in(1);
        h.update_rolling_hash_in(2);
        assert!(h.hash_forward() < q);
        h.update_rolling_hash_in_and_out(3, 0);
        assert!(h.hash_forward() < q);
        assert!(h.hash_backward() < q);
    }

    #[test]
    fn readout_modulus_bounds_the_result() {
        let q = mathutil::next_prime(1 << 24) as u64;
        let mut h = RollingHasherDual::with_readout_modulus(
            q,
            3,
            mathutil::modular_multiplicative_inverse_coprimes(5 % q, q),
            5,
            1 << 10,
        );
        h.update_rolling_hash_in(0);
        h.update_rolling_hash_in(1);
        h.update_rolling_hash_in(2);
        assert!(h.hash_forward() < (1 << 10));
    }
}
