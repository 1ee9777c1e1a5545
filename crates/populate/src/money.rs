//! Exact-decimal monetary rules.
//!
//! Prices and sale totals never pass through binary floating point.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::rng::SeedStream;

/// Lower bound of the sale price multiplier, in millionths.
const MULTIPLIER_MIN_MICROS: i64 = 900_000;
/// Upper bound of the sale price multiplier, in millionths.
const MULTIPLIER_MAX_MICROS: i64 = 1_100_000;

/// Catalog price bounds in cents.
const PRICE_MIN_CENTS: i64 = 500;
const PRICE_MAX_CENTS: i64 = 200_000;

/// Computes `round(quantity * unit_price * multiplier, 2)`.
///
/// Rounds half-to-even, the default for decimal quantization.
pub fn sale_total(unit_price: Decimal, quantity: u32, multiplier: Decimal) -> Decimal {
    (Decimal::from(quantity) * unit_price * multiplier)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Draws a multiplier uniformly from [0.9, 1.1] at 10⁻⁶ resolution.
pub fn sample_multiplier(rng: &mut SeedStream) -> Decimal {
    Decimal::new(rng.int_in(MULTIPLIER_MIN_MICROS..=MULTIPLIER_MAX_MICROS), 6)
}

/// Draws a catalog price in whole cents from [5.00, 2000.00].
pub fn sample_price(rng: &mut SeedStream) -> Decimal {
    Decimal::new(rng.int_in(PRICE_MIN_CENTS..=PRICE_MAX_CENTS), 2)
}

/// Whether a multiplier lies in the allowed sale range.
pub fn multiplier_in_range(multiplier: Decimal) -> bool {
    multiplier >= Decimal::new(MULTIPLIER_MIN_MICROS, 6)
        && multiplier <= Decimal::new(MULTIPLIER_MAX_MICROS, 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_total_exact() {
        // 3 * 19.99 * 1.05 = 62.9685
        let total = sale_total(Decimal::new(1999, 2), 3, Decimal::new(105, 2));
        assert_eq!(total, Decimal::new(6297, 2));
        assert_eq!(total.scale(), 2);
    }

    #[test]
    fn test_sale_total_half_even() {
        // 1 * 0.125 * 1 = 0.125 -> 0.12 (ties go to even)
        assert_eq!(
            sale_total(Decimal::new(125, 3), 1, Decimal::ONE),
            Decimal::new(12, 2)
        );
        // 1 * 0.135 * 1 = 0.135 -> 0.14
        assert_eq!(
            sale_total(Decimal::new(135, 3), 1, Decimal::ONE),
            Decimal::new(14, 2)
        );
    }

    #[test]
    fn test_no_float_drift_at_scale() {
        // 0.1 summed a million times is exactly 100000 in decimal.
        let dime = sale_total(Decimal::new(10, 2), 1, Decimal::ONE);
        let sum: Decimal = (0..1_000_000).map(|_| dime).sum();
        assert_eq!(sum, Decimal::new(100_000, 0));
    }

    #[test]
    fn test_samples_stay_in_bounds() {
        let mut rng = SeedStream::new(42);
        for _ in 0..10_000 {
            let m = sample_multiplier(&mut rng);
            assert!(multiplier_in_range(m));

            let p = sample_price(&mut rng);
            assert!(p >= Decimal::new(500, 2) && p <= Decimal::new(200_000, 2));
            assert!(p > Decimal::ZERO);
        }
    }

    #[test]
    fn test_smallest_total_is_positive() {
        let total = sale_total(Decimal::new(500, 2), 1, Decimal::new(900_000, 6));
        assert_eq!(total, Decimal::new(450, 2));
    }
}
