//! Tax computation.
//!
//! There are two entry points with different rate semantics:
//!
//! * [`compute_line_tax`] applies a line item's stored `cgst_rate` and
//!   `sgst_rate` as-is. Those fields already hold the per-head rates.
//! * [`calculate_tax`] takes a single combined rate and halves it into CGST
//!   and SGST for intrastate supplies.
//!
//! Amounts are exact decimals and are never rounded here. Arithmetic is
//! checked; leaving the decimal range yields [`GstError::AmountOverflow`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::GstError;
use crate::models::{LineItem, TaxBreakdown};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const TWO: Decimal = Decimal::TWO;

/// Result of splitting a combined rate over a taxable amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSplit {
    pub taxable_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub total_tax: Decimal,
    pub total_amount: Decimal,
}

/// Compute the tax breakdown of one line item.
///
/// The jurisdiction flag alone picks the branch; which rates happen to be
/// non-zero is irrelevant. Negative quantities or prices are not rejected
/// here and simply yield negative amounts.
pub fn compute_line_tax(item: &LineItem, interstate: bool) -> Result<TaxBreakdown, GstError> {
    let taxable_amount = mul(item.quantity, item.unit_price)?;

    let (igst_amount, cgst_amount, sgst_amount) = if interstate {
        (percent_of(taxable_amount, item.igst_rate)?, Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            Decimal::ZERO,
            percent_of(taxable_amount, item.cgst_rate)?,
            percent_of(taxable_amount, item.sgst_rate)?,
        )
    };

    let cess_amount = percent_of(taxable_amount, item.cess_rate)?;
    let total_amount = sum(&[
        taxable_amount,
        igst_amount,
        cgst_amount,
        sgst_amount,
        cess_amount,
    ])?;

    Ok(TaxBreakdown {
        taxable_amount,
        igst_amount,
        cgst_amount,
        sgst_amount,
        cess_amount,
        total_amount,
    })
}

/// Split a combined GST rate over `taxable_amount`.
///
/// Interstate supplies carry the full rate as IGST. Intrastate supplies carry
/// half the rate as CGST and half as SGST.
pub fn calculate_tax(
    taxable_amount: Decimal,
    tax_rate: Decimal,
    interstate: bool,
) -> Result<TaxSplit, GstError> {
    let (igst_amount, cgst_amount, sgst_amount) = if interstate {
        (percent_of(taxable_amount, tax_rate)?, Decimal::ZERO, Decimal::ZERO)
    } else {
        let half = percent_of(taxable_amount, tax_rate / TWO)?;
        (Decimal::ZERO, half, half)
    };

    let total_tax = sum(&[igst_amount, cgst_amount, sgst_amount])?;

    Ok(TaxSplit {
        taxable_amount,
        cgst_amount,
        sgst_amount,
        igst_amount,
        total_tax,
        total_amount: sum(&[taxable_amount, total_tax])?,
    })
}

const OVERFLOW: GstError = GstError::AmountOverflow { stage: "tax" };

fn mul(a: Decimal, b: Decimal) -> Result<Decimal, GstError> {
    a.checked_mul(b).ok_or(OVERFLOW)
}

/// `amount * rate / 100`. The division by 100 cannot overflow.
fn percent_of(amount: Decimal, rate: Decimal) -> Result<Decimal, GstError> {
    Ok(mul(amount, rate)? / HUNDRED)
}

/// Checked sum of `amounts`.
pub(crate) fn sum(amounts: &[Decimal]) -> Result<Decimal, GstError> {
    amounts
        .iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(*amount))
        .ok_or(OVERFLOW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, unit_price: Decimal, cess_rate: Decimal) -> LineItem {
        LineItem {
            description: Some("Notebook".to_string()),
            hsn_code: Some("4820".to_string()),
            quantity,
            unit_price,
            cgst_rate: dec!(9),
            sgst_rate: dec!(9),
            igst_rate: dec!(18),
            cess_rate,
        }
    }

    #[test]
    fn intrastate_applies_stored_cgst_and_sgst() {
        let tax = compute_line_tax(&item(dec!(2), dec!(100), dec!(0)), false).unwrap();

        assert_eq!(tax.taxable_amount, dec!(200));
        assert_eq!(tax.cgst_amount, dec!(18));
        assert_eq!(tax.sgst_amount, dec!(18));
        assert_eq!(tax.igst_amount, dec!(0));
        assert_eq!(tax.total_amount, dec!(236));
    }

    #[test]
    fn interstate_applies_igst_only() {
        let tax = compute_line_tax(&item(dec!(2), dec!(100), dec!(0)), true).unwrap();

        assert_eq!(tax.igst_amount, dec!(36));
        assert_eq!(tax.cgst_amount, dec!(0));
        assert_eq!(tax.sgst_amount, dec!(0));
        assert_eq!(tax.total_amount, dec!(236));
    }

    #[test]
    fn branch_follows_flag_not_rates() {
        let mut only_igst = item(dec!(1), dec!(50), dec!(0));
        only_igst.cgst_rate = dec!(0);
        only_igst.sgst_rate = dec!(0);

        let tax = compute_line_tax(&only_igst, false).unwrap();
        assert_eq!(tax.igst_amount, dec!(0));
        assert_eq!(tax.total_amount, dec!(50));
    }

    #[test]
    fn cess_is_added_on_top() {
        let tax = compute_line_tax(&item(dec!(1), dec!(1000), dec!(12)), true).unwrap();

        assert_eq!(tax.cess_amount, dec!(120));
        assert_eq!(tax.total_amount, dec!(1300));
    }

    #[test]
    fn total_is_exact_sum_of_components() {
        let tax = compute_line_tax(&item(dec!(3), dec!(33.33), dec!(1.5)), false).unwrap();

        assert_eq!(
            tax.total_amount,
            tax.taxable_amount + tax.igst_amount + tax.cgst_amount + tax.sgst_amount + tax.cess_amount
        );
        assert_eq!(tax.taxable_amount, dec!(99.99));
    }

    #[test]
    fn decimal_amounts_do_not_drift() {
        let tax = compute_line_tax(&item(dec!(1), dec!(0.1), dec!(0)), true).unwrap();
        assert_eq!(tax.igst_amount, dec!(0.018));
        assert_eq!(tax.total_amount, dec!(0.118));
    }

    #[test]
    fn negative_quantity_flows_through() {
        let tax = compute_line_tax(&item(dec!(-1), dec!(100), dec!(0)), true).unwrap();
        assert_eq!(tax.taxable_amount, dec!(-100));
        assert_eq!(tax.total_amount, dec!(-118));
    }

    #[test]
    fn combined_rate_is_halved_for_intrastate() {
        let split = calculate_tax(dec!(1000), dec!(18), false).unwrap();

        assert_eq!(split.cgst_amount, dec!(90));
        assert_eq!(split.sgst_amount, dec!(90));
        assert_eq!(split.igst_amount, dec!(0));
        assert_eq!(split.total_tax, dec!(180));
        assert_eq!(split.total_amount, dec!(1180));
    }

    #[test]
    fn combined_rate_is_igst_for_interstate() {
        let split = calculate_tax(dec!(1000), dec!(18), true).unwrap();

        assert_eq!(split.igst_amount, dec!(180));
        assert_eq!(split.cgst_amount, dec!(0));
        assert_eq!(split.sgst_amount, dec!(0));
        assert_eq!(split.total_amount, dec!(1180));
    }

    #[test]
    fn odd_combined_rate_splits_evenly() {
        let split = calculate_tax(dec!(200), dec!(5), false).unwrap();
        assert_eq!(split.cgst_amount, dec!(5));
        assert_eq!(split.sgst_amount, dec!(5));
    }

    #[test]
    fn huge_quantity_times_price_is_an_overflow_error() {
        let big = Decimal::from_str_exact("1000000000000000").unwrap();
        let err = compute_line_tax(&item(big, big, dec!(0)), true).unwrap_err();
        assert!(matches!(err, GstError::AmountOverflow { .. }));
    }

    #[test]
    fn rate_applied_to_max_amount_is_an_overflow_error() {
        let err = calculate_tax(Decimal::MAX, dec!(18), true).unwrap_err();
        assert!(matches!(err, GstError::AmountOverflow { .. }));
    }

    #[test]
    fn large_but_representable_amounts_still_compute() {
        let split = calculate_tax(dec!(1000000000000), dec!(28), true).unwrap();
        assert_eq!(split.igst_amount, dec!(280000000000));
    }
}
