//! Integer factorization sized for the search loop: trial division by a
//! small-prime table, then Pollard's rho with bounded retries.
//!
//! The loop must never stall on one stubborn cofactor, so a failed rho
//! split falls back to bounded trial division and finally records the
//! residual as if it were prime. That can hide divisors of a D value and
//! shrink the candidate set for that n; it never emits a wrong divisor,
//! and every solution is re-verified by cubing before it is reported.

use std::collections::BTreeMap;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

use crate::arith::{self, is_probably_prime, random_below, MILLER_RABIN_ROUNDS};

/// Prime factorization as prime -> exponent, keys ascending.
pub type Factorization = BTreeMap<BigUint, u32>;

/// Fresh-polynomial attempts before rho gives up on a cofactor.
const RHO_MAX_ATTEMPTS: u32 = 6;

/// Cycle-detection steps per rho attempt.
const RHO_MAX_ITERATIONS: u32 = 1_000_000;

/// Upper bound for the trial-division fallback after rho failure.
const FALLBACK_TRIAL_BOUND: u64 = 100_000;

/// Pollard's rho with Floyd cycle detection and random parameters per
/// attempt.
///
/// Returns a non-trivial divisor of n, or None when every attempt found
/// only trivial cycles. On prime n this burns all attempts and returns
/// None, so callers should test primality first.
pub fn pollard_rho(n: &BigUint, max_attempts: u32, rng: &mut impl Rng) -> Option<BigUint> {
    let one = BigUint::one();
    let two = BigUint::from(2u32);

    if *n <= BigUint::from(3u32) {
        return None;
    }
    if n.is_even() {
        return Some(two);
    }

    for _ in 0..max_attempts {
        // Fresh polynomial x^2 + c and starting point for every attempt.
        let c = loop {
            let c = random_below(n, rng);
            if !c.is_zero() && c != n - &two {
                break c;
            }
        };
        let f = |x: &BigUint| -> BigUint { (x * x + &c) % n };

        let start = loop {
            let s = random_below(n, rng);
            if s >= two {
                break s;
            }
        };
        let mut x = start.clone();
        let mut y = start;

        for _ in 0..RHO_MAX_ITERATIONS {
            x = f(&x);
            y = f(&f(&y));

            let diff = if x > y { &x - &y } else { &y - &x };
            let d = diff.gcd(n);

            if d == one {
                continue;
            }
            if d == *n {
                // Cycle collapsed; retry with a new polynomial.
                break;
            }
            return Some(d);
        }
    }

    None
}

/// Factor n into primes. Returns an empty map for n <= 1.
///
/// Trial division strips everything in the small-prime table; surviving
/// cofactors go through an explicit work stack, split by rho until
/// Miller-Rabin accepts them as prime.
pub fn factor(n: &BigUint, rng: &mut impl Rng) -> Factorization {
    let mut factors = Factorization::new();
    if *n <= BigUint::one() {
        return factors;
    }

    let mut remaining = n.clone();
    for &p in arith::SMALL_PRIMES {
        let bp = BigUint::from(p);
        while (&remaining % &bp).is_zero() {
            *factors.entry(bp.clone()).or_insert(0) += 1;
            remaining /= &bp;
        }
    }

    let mut stack = Vec::new();
    if !remaining.is_one() {
        stack.push(remaining);
    }

    while let Some(m) = stack.pop() {
        if is_probably_prime(&m, MILLER_RABIN_ROUNDS, rng) {
            *factors.entry(m).or_insert(0) += 1;
            continue;
        }
        match pollard_rho(&m, RHO_MAX_ATTEMPTS, rng) {
            Some(d) => {
                let q = &m / &d;
                stack.push(d);
                stack.push(q);
            }
            None => {
                // Rho gave up on a composite. Bounded trial division picks
                // up what it can; whatever is left is recorded as prime.
                let residual = trial_divide_into(&mut factors, m, FALLBACK_TRIAL_BOUND);
                if !residual.is_one() {
                    log::warn!("recording unsplit residual {} as prime", residual);
                    *factors.entry(residual).or_insert(0) += 1;
                }
            }
        }
    }

    factors
}

/// Divide m by every odd d up to the bound (while d*d <= m), recording
/// hits into `factors`. Returns the undivided remainder.
fn trial_divide_into(factors: &mut Factorization, m: BigUint, bound: u64) -> BigUint {
    let mut remaining = m;
    let mut d = 3u64;
    loop {
        let bd = BigUint::from(d);
        if d > bound || &bd * &bd > remaining {
            break;
        }
        while (&remaining % &bd).is_zero() {
            *factors.entry(bd.clone()).or_insert(0) += 1;
            remaining /= &bd;
        }
        d += 2;
    }
    remaining
}

/// All positive divisors of the factored value, ascending.
pub fn divisors(factors: &Factorization) -> Vec<BigUint> {
    let mut divs = vec![BigUint::one()];
    for (p, &e) in factors {
        let mut extended = Vec::with_capacity(divs.len() * (e as usize + 1));
        let mut power = BigUint::one();
        for _ in 0..=e {
            for d in &divs {
                extended.push(d * &power);
            }
            power *= p;
        }
        divs = extended;
    }
    divs.sort();
    divs
}
