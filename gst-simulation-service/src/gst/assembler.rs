//! Invoice assembly: jurisdiction detection and per-item tax application.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tax::sum;
use super::{compute_line_tax, GstError};
use crate::models::{ComputedLineItem, InvoiceTotals, LineItem, Party};

/// Output of [`assemble`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledInvoice {
    pub interstate: bool,
    pub items: Vec<ComputedLineItem>,
    pub totals: InvoiceTotals,
}

/// A supply is interstate when the two parties' states differ.
///
/// The comparison is exact: no case folding and no trimming.
pub fn is_interstate(supplier: &Party, recipient: &Party) -> bool {
    supplier.state() != recipient.state()
}

/// Apply the tax engine to every line item with a shared jurisdiction flag.
///
/// An empty item list yields an empty invoice with zero totals. Fails only
/// when an amount leaves the decimal range.
pub fn assemble(
    supplier: &Party,
    recipient: &Party,
    items: &[LineItem],
) -> Result<AssembledInvoice, GstError> {
    let interstate = is_interstate(supplier, recipient);

    let items = items
        .iter()
        .map(|item| {
            Ok(ComputedLineItem {
                tax: compute_line_tax(item, interstate)?,
                item: item.clone(),
            })
        })
        .collect::<Result<Vec<_>, GstError>>()?;

    let totals = summarize(&items)?;

    tracing::debug!(
        interstate,
        item_count = items.len(),
        grand_total = %totals.grand_total,
        "Invoice assembled"
    );

    Ok(AssembledInvoice {
        interstate,
        items,
        totals,
    })
}

fn summarize(items: &[ComputedLineItem]) -> Result<InvoiceTotals, GstError> {
    let column = |pick: fn(&ComputedLineItem) -> Decimal| {
        let values: Vec<Decimal> = items.iter().map(pick).collect();
        sum(&values)
    };

    let taxable_amount = column(|line| line.tax.taxable_amount)?;
    let cgst_amount = column(|line| line.tax.cgst_amount)?;
    let sgst_amount = column(|line| line.tax.sgst_amount)?;
    let igst_amount = column(|line| line.tax.igst_amount)?;
    let cess_amount = column(|line| line.tax.cess_amount)?;
    let total_tax = sum(&[cgst_amount, sgst_amount, igst_amount, cess_amount])?;

    Ok(InvoiceTotals {
        taxable_amount,
        cgst_amount,
        sgst_amount,
        igst_amount,
        cess_amount,
        total_tax,
        grand_total: sum(&[taxable_amount, total_tax])?,
    })
}
