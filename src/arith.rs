//! Big-integer arithmetic primitives: exact square roots and probabilistic
//! primality.
//!
//! Everything works in exact integer arithmetic. The square-root path in
//! particular never touches floating point, so discriminant checks stay
//! correct at any magnitude.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

/// Primes used for the trial-division stage of factoring and as a quick
/// pre-check before Miller-Rabin.
pub(crate) const SMALL_PRIMES: &[u64] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61,
];

/// Default Miller-Rabin round count.
pub const MILLER_RABIN_ROUNDS: u32 = 8;

/// Floor of sqrt(n) by Newton's method.
pub fn isqrt(n: &BigUint) -> BigUint {
    if n.is_zero() {
        return BigUint::zero();
    }
    if *n == BigUint::one() {
        return BigUint::one();
    }

    // Start from 2^((bits+1)/2), an upper bound on the root.
    let bits = n.bits();
    let mut x = BigUint::one() << ((bits + 1) / 2);

    loop {
        let next = (&x + n / &x) >> 1;
        if next >= x {
            return x;
        }
        x = next;
    }
}

/// Some(sqrt) when n is a perfect square, None otherwise.
pub fn is_perfect_square(n: &BigUint) -> Option<BigUint> {
    let s = isqrt(n);
    if &(&s * &s) == n {
        Some(s)
    } else {
        None
    }
}

/// Random value in [0, n). `n` must be nonzero.
pub(crate) fn random_below(n: &BigUint, rng: &mut impl Rng) -> BigUint {
    let mut bytes = vec![0u8; n.to_bytes_be().len()];
    rng.fill(&mut bytes[..]);
    BigUint::from_bytes_be(&bytes) % n
}

/// Miller-Rabin probabilistic primality test.
///
/// Small primes are handled by trial division; witnesses are drawn from the
/// caller's generator so runs stay reproducible under a fixed seed.
pub fn is_probably_prime(n: &BigUint, rounds: u32, rng: &mut impl Rng) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);

    if *n < two {
        return false;
    }
    for &p in SMALL_PRIMES {
        let bp = BigUint::from(p);
        if *n == bp {
            return true;
        }
        if (n % &bp).is_zero() {
            return false;
        }
    }

    // n is odd and > 61 from here on. Write n-1 as 2^r * d with d odd.
    let n_minus_1 = n - &one;
    let mut d = n_minus_1.clone();
    let mut r: u32 = 0;
    while d.is_even() {
        d >>= 1u32;
        r += 1;
    }

    'witness: for _ in 0..rounds {
        // Random witness a in [2, n-2].
        let a = loop {
            let a = random_below(n, rng);
            if a >= two && a <= &n_minus_1 - &one {
                break a;
            }
        };

        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_1 {
            continue 'witness;
        }

        for _ in 0..r - 1 {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn isqrt_exact_values() {
        assert_eq!(isqrt(&BigUint::from(0u32)), BigUint::from(0u32));
        assert_eq!(isqrt(&BigUint::from(1u32)), BigUint::from(1u32));
        assert_eq!(isqrt(&BigUint::from(2u32)), BigUint::from(1u32));
        assert_eq!(isqrt(&BigUint::from(15u32)), BigUint::from(3u32));
        assert_eq!(isqrt(&BigUint::from(16u32)), BigUint::from(4u32));
        assert_eq!(isqrt(&BigUint::from(17u32)), BigUint::from(4u32));

        let big = BigUint::from(10u32).pow(40);
        assert_eq!(isqrt(&(&big * &big)), big, "exact root of a 80-digit square");
        assert_eq!(isqrt(&(&big * &big + 1u32)), big);
    }

    #[test]
    fn perfect_square_detection() {
        assert_eq!(is_perfect_square(&BigUint::from(0u32)), Some(BigUint::from(0u32)));
        assert_eq!(is_perfect_square(&BigUint::from(1u32)), Some(BigUint::from(1u32)));
        assert_eq!(is_perfect_square(&BigUint::from(1024u32)), Some(BigUint::from(32u32)));
        assert_eq!(is_perfect_square(&BigUint::from(2u32)), None);
        assert_eq!(is_perfect_square(&BigUint::from(66u32)), None);
        assert_eq!(is_perfect_square(&BigUint::from(530u32)), None);
    }

    #[test]
    fn primality_on_small_values() {
        let mut rng = rng();
        for p in [2u64, 3, 5, 61, 67, 97, 104_729] {
            assert!(
                is_probably_prime(&BigUint::from(p), MILLER_RABIN_ROUNDS, &mut rng),
                "{} is prime",
                p
            );
        }
        for c in [0u64, 1, 4, 9, 91, 561, 104_730] {
            assert!(
                !is_probably_prime(&BigUint::from(c), MILLER_RABIN_ROUNDS, &mut rng),
                "{} is composite",
                c
            );
        }
    }

    #[test]
    fn primality_past_the_trial_table() {
        let mut rng = rng();
        // 2^61 - 1 is prime; 8051 = 83 * 97 has no factor in SMALL_PRIMES.
        let m61 = BigUint::from(2_305_843_009_213_693_951u64);
        assert!(is_probably_prime(&m61, MILLER_RABIN_ROUNDS, &mut rng));
        assert!(!is_probably_prime(
            &BigUint::from(8051u32),
            MILLER_RABIN_ROUNDS,
            &mut rng
        ));
    }

    #[test]
    fn random_below_stays_in_range() {
        let mut rng = rng();
        let n = BigUint::from(1000u32);
        for _ in 0..200 {
            assert!(random_below(&n, &mut rng) < n);
        }
    }
}
