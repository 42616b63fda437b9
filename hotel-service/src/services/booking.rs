//! Booking rules: stay validation, overlap detection and invoice totals.
//!
//! These are pure functions; the database layer applies them inside the
//! reservation transaction.

use crate::models::BookingRequest;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use service_core::error::AppError;
use thiserror::Error;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest value a `NUMERIC(12, 2)` money column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Largest value a `NUMERIC(5, 2)` percentage column holds.
pub const MAX_PERCENT: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);

/// Money and percentages are stored with cents precision.
const MONEY_SCALE: u32 = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("check-out ({check_out}) must be after check-in ({check_in})")]
    EmptyStay {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("amount must not exceed {}", MAX_AMOUNT)]
    AmountTooLarge,

    #[error("discount must be between 0 and 100 percent")]
    DiscountOutOfRange,

    #[error("tva must not be negative")]
    NegativeTva,

    #[error("tva must not exceed {} percent", MAX_PERCENT)]
    TvaTooLarge,

    #[error("{0} must have at most two decimal places")]
    TooPrecise(&'static str),

    #[error("total for this stay exceeds {}", MAX_AMOUNT)]
    TotalTooLarge,
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::BadRequest(anyhow::Error::new(err))
    }
}

/// Half-open stay `[check_in, check_out)`: the check-out day is free for the next guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stay {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl Stay {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        if check_out <= check_in {
            return Err(BookingError::EmptyStay {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

fn check_scale(value: Decimal, field: &'static str) -> Result<(), BookingError> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(BookingError::TooPrecise(field));
    }
    Ok(())
}

/// Validates the stay and the money fields of a booking against what the
/// reservation columns can store.
pub fn validate_booking(request: &BookingRequest) -> Result<Stay, BookingError> {
    let stay = Stay::new(request.check_in, request.check_out)?;

    if let Some(amount) = request.amount {
        if amount < Decimal::ZERO {
            return Err(BookingError::NegativeAmount);
        }
        if amount > MAX_AMOUNT {
            return Err(BookingError::AmountTooLarge);
        }
        check_scale(amount, "amount")?;
    }
    if request.discount < Decimal::ZERO || request.discount > HUNDRED {
        return Err(BookingError::DiscountOutOfRange);
    }
    check_scale(request.discount, "discount")?;
    if request.tva < Decimal::ZERO {
        return Err(BookingError::NegativeTva);
    }
    if request.tva > MAX_PERCENT {
        return Err(BookingError::TvaTooLarge);
    }
    check_scale(request.tva, "tva")?;

    if let Some(amount) = request.amount {
        compute_total(amount, request.discount, request.tva)?;
    }

    Ok(stay)
}

/// `amount × (1 − discount/100) × (1 + tva/100)`, rounded to cents (half away from zero).
///
/// Fails when the result does not fit an invoice amount.
pub fn compute_total(
    amount: Decimal,
    discount: Decimal,
    tva: Decimal,
) -> Result<Decimal, BookingError> {
    let taxed = HUNDRED
        .checked_sub(discount)
        .and_then(|kept| amount.checked_mul(kept))
        .and_then(|v| v.checked_div(HUNDRED))
        .zip(HUNDRED.checked_add(tva))
        .and_then(|(discounted, tax_factor)| discounted.checked_mul(tax_factor))
        .and_then(|v| v.checked_div(HUNDRED))
        .ok_or(BookingError::TotalTooLarge)?;

    let total = taxed.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if total > MAX_AMOUNT {
        return Err(BookingError::TotalTooLarge);
    }
    Ok(total)
}

/// Default base amount when the caller gives none: nightly rate × nights.
pub fn base_amount(nightly_rate: Decimal, stay: &Stay) -> Result<Decimal, BookingError> {
    nightly_rate
        .checked_mul(Decimal::from(stay.nights()))
        .filter(|amount| *amount <= MAX_AMOUNT)
        .ok_or(BookingError::AmountTooLarge)
}

/// Human-readable invoice code, e.g. `INV-2026-000042`.
pub fn invoice_code(year: i32, sequence: i64) -> String {
    format!("INV-{}-{:06}", year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stay(a: &str, b: &str) -> Stay {
        Stay::new(day(a), day(b)).unwrap()
    }

    fn request(check_in: &str, check_out: &str) -> BookingRequest {
        BookingRequest {
            customer_id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            check_in: day(check_in),
            check_out: day(check_out),
            amount: Some(dec!(300)),
            discount: dec!(10),
            tva: dec!(20),
            created_by: None,
        }
    }

    #[test]
    fn stay_rejects_empty_or_inverted_ranges() {
        assert!(Stay::new(day("2026-05-02"), day("2026-05-02")).is_err());
        assert!(Stay::new(day("2026-05-03"), day("2026-05-02")).is_err());
        assert_eq!(stay("2026-05-01", "2026-05-04").nights(), 3);
    }

    #[test]
    fn total_applies_discount_then_tax() {
        assert_eq!(compute_total(dec!(300), dec!(10), dec!(20)), Ok(dec!(324.00)));
        assert_eq!(compute_total(dec!(100), dec!(0), dec!(0)), Ok(dec!(100)));
        assert_eq!(compute_total(dec!(100), dec!(100), dec!(19)), Ok(dec!(0)));
        assert_eq!(compute_total(dec!(0), dec!(15), dec!(7)), Ok(dec!(0)));
    }

    #[test]
    fn total_rounds_to_cents() {
        // 99.99 * 0.95 * 1.055 = 100.2149...
        assert_eq!(compute_total(dec!(99.99), dec!(5), dec!(5.5)), Ok(dec!(100.21)));
        // 10.01 * 0.5 * 1.0 = 5.005 -> 5.01
        assert_eq!(compute_total(dec!(10.01), dec!(50), dec!(0)), Ok(dec!(5.01)));
    }

    #[test]
    fn total_overflow_is_an_error() {
        assert_eq!(
            compute_total(Decimal::MAX, dec!(0), dec!(20)),
            Err(BookingError::TotalTooLarge)
        );
        // Both inputs within their columns, product beyond the invoice column
        assert_eq!(
            compute_total(MAX_AMOUNT, dec!(0), MAX_PERCENT),
            Err(BookingError::TotalTooLarge)
        );
        assert_eq!(compute_total(MAX_AMOUNT, dec!(0), dec!(0)), Ok(MAX_AMOUNT));
    }

    #[test]
    fn validate_booking_checks_ranges() {
        assert!(validate_booking(&request("2026-05-01", "2026-05-03")).is_ok());

        let mut r = request("2026-05-01", "2026-05-03");
        r.amount = None;
        assert!(validate_booking(&r).is_ok());

        assert!(matches!(
            validate_booking(&request("2026-05-03", "2026-05-01")),
            Err(BookingError::EmptyStay { .. })
        ));

        let mut r = request("2026-05-01", "2026-05-03");
        r.discount = dec!(100.5);
        assert_eq!(validate_booking(&r), Err(BookingError::DiscountOutOfRange));

        let mut r = request("2026-05-01", "2026-05-03");
        r.amount = Some(dec!(-1));
        assert_eq!(validate_booking(&r), Err(BookingError::NegativeAmount));

        let mut r = request("2026-05-01", "2026-05-03");
        r.tva = dec!(-0.5);
        assert_eq!(validate_booking(&r), Err(BookingError::NegativeTva));
    }

    #[test]
    fn base_amount_is_rate_times_nights() {
        assert_eq!(
            base_amount(dec!(85.50), &stay("2026-05-01", "2026-05-04")),
            Ok(dec!(256.50))
        );
        assert_eq!(
            base_amount(MAX_AMOUNT, &stay("2026-05-01", "2026-05-03")),
            Err(BookingError::AmountTooLarge)
        );
    }

    #[test]
    fn column_limits() {
        assert_eq!(MAX_AMOUNT, dec!(9999999999.99));
        assert_eq!(MAX_PERCENT, dec!(999.99));
    }

    #[test]
    fn validate_booking_enforces_column_ranges() {
        let mut r = request("2026-05-01", "2026-05-03");
        r.amount = Some(dec!(100000000000));
        assert_eq!(validate_booking(&r), Err(BookingError::AmountTooLarge));

        let mut r = request("2026-05-01", "2026-05-03");
        r.amount = Some(MAX_AMOUNT);
        r.discount = dec!(0);
        r.tva = dec!(0);
        assert!(validate_booking(&r).is_ok());

        r.tva = dec!(20);
        assert_eq!(validate_booking(&r), Err(BookingError::TotalTooLarge));

        let mut r = request("2026-05-01", "2026-05-03");
        r.tva = dec!(1000);
        assert_eq!(validate_booking(&r), Err(BookingError::TvaTooLarge));

        let mut r = request("2026-05-01", "2026-05-03");
        r.tva = MAX_PERCENT;
        assert!(validate_booking(&r).is_ok());
    }

    #[test]
    fn validate_booking_rejects_sub_cent_values() {
        let mut r = request("2026-05-01", "2026-05-03");
        r.discount = dec!(10.555);
        assert_eq!(validate_booking(&r), Err(BookingError::TooPrecise("discount")));

        let mut r = request("2026-05-01", "2026-05-03");
        r.tva = dec!(19.999);
        assert_eq!(validate_booking(&r), Err(BookingError::TooPrecise("tva")));

        let mut r = request("2026-05-01", "2026-05-03");
        r.amount = Some(dec!(100.001));
        assert_eq!(validate_booking(&r), Err(BookingError::TooPrecise("amount")));

        // Trailing zeros are not extra precision
        let mut r = request("2026-05-01", "2026-05-03");
        r.discount = dec!(10.5000);
        assert!(validate_booking(&r).is_ok());
    }

    #[test]
    fn accepted_inputs_survive_storage_unchanged() {
        // Values that pass validation already have cents precision, so the
        // total recomputed from the stored row equals the invoiced one.
        let r = request("2026-05-01", "2026-05-03");
        validate_booking(&r).unwrap();
        let stored = |d: Decimal| d.round_dp(2);
        let amount = r.amount.unwrap();
        assert_eq!(
            compute_total(amount, r.discount, r.tva),
            compute_total(stored(amount), stored(r.discount), stored(r.tva))
        );
    }

    #[test]
    fn invoice_codes_are_zero_padded() {
        assert_eq!(invoice_code(2026, 42), "INV-2026-000042");
        assert_eq!(invoice_code(2026, 1_234_567), "INV-2026-1234567");
    }
}
