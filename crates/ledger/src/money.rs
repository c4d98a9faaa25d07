//! Fixed-point currency amounts (two fractional digits, half-up rounding).

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult};

/// Number of fractional digits every amount is normalised to.
pub const MONEY_SCALE: u32 = 2;

/// Largest magnitude any amount or balance may reach: `i64::MAX` cents.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(u32::MAX, i32::MAX as u32, 0, false, MONEY_SCALE);

/// An amount of money with exactly two fractional digits.
///
/// There are two ways to get one:
/// - *validated*: [`Money::of`] and [`Money::parse`] reject negative input.
///   Use them for anything a person typed in.
/// - *derived*: [`Money::checked_add`] / [`Money::checked_sub`] on existing
///   values, never re-checked for sign. Balances are derived and may go negative.
///
/// Both paths keep the magnitude within [`MAX_AMOUNT`], so the underlying
/// decimal arithmetic cannot overflow and the scale is always two digits.
/// Deserialisation goes through the validated path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Validated construction from a raw decimal.
    pub fn of(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation(format!(
                "amount cannot be negative: {amount}"
            )));
        }
        // -0.001 rounds to zero but must still be rejected above; after that the
        // rounded value is never negative.
        Self::bounded(amount)
    }

    /// Validated construction from user text such as `"12.50"`.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("amount is required"));
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|e| DomainError::validation(format!("amount `{trimmed}` is not a number: {e}")))?;
        Self::of(value)
    }

    /// Derived construction for balances and totals: may be negative, is
    /// still rounded and range-checked.
    pub fn from_signed(amount: Decimal) -> DomainResult<Self> {
        Self::bounded(amount)
    }

    pub fn zero() -> Self {
        Self::normalized(Decimal::ZERO)
    }

    /// Build an amount from a whole number of cents (may be negative; derived kind).
    pub(crate) fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, MONEY_SCALE))
    }

    /// Round, then refuse anything whose magnitude exceeds [`MAX_AMOUNT`].
    fn bounded(raw: Decimal) -> DomainResult<Self> {
        let value = Self::normalized(raw);
        if value.0.abs() > MAX_AMOUNT {
            return Err(DomainError::validation(format!(
                "amount {raw} is out of range (limit {MAX_AMOUNT})"
            )));
        }
        Ok(value)
    }

    fn normalized(raw: Decimal) -> Self {
        let mut value = raw.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(MONEY_SCALE);
        if value.is_zero() {
            // Avoid a signed zero leaking into equality and display.
            value.set_sign_positive(true);
        }
        Self(value)
    }

    /// Derived sum; the result is not checked for sign, only for range.
    pub fn checked_add(&self, other: &Money) -> DomainResult<Money> {
        let sum = self
            .0
            .checked_add(other.0)
            .ok_or_else(|| DomainError::validation("amount overflow"))?;
        Self::bounded(sum)
    }

    /// Derived difference; the result may be negative.
    pub fn checked_sub(&self, other: &Money) -> DomainResult<Money> {
        let difference = self
            .0
            .checked_sub(other.0)
            .ok_or_else(|| DomainError::validation("amount overflow"))?;
        Self::bounded(difference)
    }

    pub fn negate(&self) -> Money {
        Self::normalized(-self.0)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Whole number of cents.
    pub fn cents(&self) -> DomainResult<i64> {
        i64::try_from(self.0.mantissa())
            .map_err(|_| DomainError::validation(format!("amount {} is out of range", self.0)))
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_non_positive(&self) -> bool {
        !self.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Split into `parts` amounts that sum exactly to `self`.
    ///
    /// Every part gets `self / parts` truncated to the cent; the leftover cents
    /// go one each to the first parts. Amounts are never negative here.
    pub fn allocate(&self, parts: usize) -> DomainResult<Vec<Money>> {
        if parts == 0 {
            return Err(DomainError::validation("cannot split an amount into zero parts"));
        }
        if self.is_negative() {
            return Err(DomainError::validation("cannot split a negative amount"));
        }
        let total = self.cents()?;
        let n = i64::try_from(parts)
            .map_err(|_| DomainError::validation("too many parts to split across"))?;
        let base = total / n;
        let remainder = total % n;

        Ok((0..n)
            .map(|i| Money::from_cents(if i < remainder { base + 1 } else { base }))
            .collect())
    }

    /// Sum of many amounts (derived). Fails if a running total leaves the range.
    pub fn sum<'a>(amounts: impl IntoIterator<Item = &'a Money>) -> DomainResult<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::of(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn construction_rounds_half_up_to_two_places() {
        assert_eq!(Money::of(dec!(1.235)).unwrap().amount(), dec!(1.24));
        assert_eq!(Money::of(dec!(1.234)).unwrap().amount(), dec!(1.23));
        assert_eq!(Money::of(dec!(0.005)).unwrap().amount(), dec!(0.01));
    }

    #[test]
    fn scale_is_always_two_digits() {
        let m = Money::of(dec!(75)).unwrap();
        assert_eq!(m.amount().scale(), 2);
        assert_eq!(m.to_string(), "75.00");
    }

    #[test]
    fn negative_blank_and_garbage_input_is_rejected() {
        assert!(matches!(Money::of(dec!(-0.01)), Err(DomainError::Validation(_))));
        assert!(matches!(Money::parse("  "), Err(DomainError::Validation(_))));
        assert!(matches!(Money::parse("abc"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn tiny_negative_is_rejected_even_though_it_rounds_to_zero() {
        assert!(Money::of(dec!(-0.001)).is_err());
    }

    #[test]
    fn zero_is_valid_but_not_positive() {
        let zero = Money::of(dec!(0)).unwrap();
        assert_eq!(zero, Money::zero());
        assert!(zero.is_non_positive());
        assert!(!zero.is_negative());
    }

    #[test]
    fn subtraction_may_go_negative() {
        let a = Money::of(dec!(10)).unwrap();
        let b = Money::of(dec!(25.50)).unwrap();
        let diff = a.checked_sub(&b).unwrap();
        assert!(diff.is_negative());
        assert_eq!(diff.amount(), dec!(-15.50));
        assert_eq!(diff.checked_add(&b).unwrap(), a);
    }

    #[test]
    fn equality_ignores_input_scale() {
        assert_eq!(Money::of(dec!(5)).unwrap(), Money::of(dec!(5.000)).unwrap());
    }

    #[test]
    fn parse_accepts_plain_decimal_text() {
        assert_eq!(Money::parse(" 12.5 ").unwrap().amount(), dec!(12.50));
    }

    #[test]
    fn amounts_beyond_the_cent_range_are_rejected() {
        assert_eq!(Money::of(MAX_AMOUNT).unwrap().cents().unwrap(), i64::MAX);
        assert!(matches!(Money::of(Decimal::MAX), Err(DomainError::Validation(_))));
        assert!(matches!(
            Money::of(MAX_AMOUNT + dec!(0.01)),
            Err(DomainError::Validation(_))
        ));
        assert!(serde_json::from_str::<Money>("\"79228162514264337593543950335\"").is_err());
    }

    #[test]
    fn every_accepted_amount_has_two_digit_scale() {
        assert_eq!(Money::of(MAX_AMOUNT).unwrap().amount().scale(), 2);
        assert_eq!(Money::of(dec!(0.001)).unwrap().amount().scale(), 2);
    }

    #[test]
    fn derived_arithmetic_reports_overflow_instead_of_panicking() {
        let max = Money::of(MAX_AMOUNT).unwrap();
        let cent = Money::of(dec!(0.01)).unwrap();

        assert!(matches!(max.checked_add(&cent), Err(DomainError::Validation(_))));
        assert!(matches!(max.negate().checked_sub(&cent), Err(DomainError::Validation(_))));
        assert!(Money::sum(&[max, max]).is_err());
        assert_eq!(max.checked_sub(&max).unwrap(), Money::zero());
    }

    #[test]
    fn allocate_hands_leftover_cents_to_the_first_parts() {
        let parts = Money::of(dec!(100)).unwrap().allocate(3).unwrap();
        let amounts: Vec<Decimal> = parts.iter().map(Money::amount).collect();
        assert_eq!(amounts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
    }

    #[test]
    fn allocate_rejects_zero_parts() {
        assert!(Money::of(dec!(1)).unwrap().allocate(0).is_err());
    }

    #[test]
    fn deserialize_uses_validated_path() {
        let ok: Money = serde_json::from_str("\"3.455\"").unwrap();
        assert_eq!(ok.amount(), dec!(3.46));
        assert!(serde_json::from_str::<Money>("\"-1\"").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: allocation always sums back to the original amount and
        /// no two parts differ by more than one cent.
        #[test]
        fn allocation_is_exact(cents in 0i64..10_000_000i64, parts in 1usize..40usize) {
            let total = Money::from_cents(cents);
            let shares = total.allocate(parts).unwrap();

            prop_assert_eq!(shares.len(), parts);
            prop_assert_eq!(Money::sum(&shares).unwrap(), total);

            let min = shares.iter().min().unwrap().cents().unwrap();
            let max = shares.iter().max().unwrap().cents().unwrap();
            prop_assert!(max - min <= 1);
        }
    }
}
