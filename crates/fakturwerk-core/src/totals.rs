// SPDX-License-Identifier: MIT
//
// Financial derivation — the single source of truth for invoice totals.
//
// All arithmetic uses exact fixed-point decimals (`rust_decimal`), so
// repeated derivation over the same inputs is bit-identical and free of
// binary floating-point drift. Tax is computed on the discounted subtotal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FakturwerkError, Result};
use crate::types::LineItem;

/// Derived financial fields of an invoice.
///
/// Satisfies, exactly:
/// `subtotal = Σ(unit_price × quantity)`,
/// `discount = subtotal × discount_rate`,
/// `subtotal_less_discount = subtotal − discount`,
/// `tax_total = subtotal_less_discount × tax_rate`,
/// `balance_due = subtotal_less_discount + tax_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount_rate: Decimal,
    pub discount: Decimal,
    pub subtotal_less_discount: Decimal,
    pub tax_rate: Decimal,
    pub tax_total: Decimal,
    pub balance_due: Decimal,
}

impl Totals {
    /// Discount rate as a display percentage, e.g. `0.05` -> `5`.
    pub fn discount_rate_percent(&self) -> Decimal {
        (self.discount_rate * Decimal::ONE_HUNDRED).normalize()
    }

    /// Tax rate as a display percentage, e.g. `0.1` -> `10`.
    pub fn tax_rate_percent(&self) -> Decimal {
        (self.tax_rate * Decimal::ONE_HUNDRED).normalize()
    }
}

/// Compute invoice totals from line items and configured rates.
///
/// Pure function of its inputs: no hidden state, no time dependency. An
/// empty item sequence is valid and yields all-zero totals. Fails with
/// `InvalidLineItem` for a zero quantity or negative unit price, and with
/// `InvalidRate` for a rate outside [0, 1].
pub fn derive(
    line_items: &[LineItem],
    discount_rate: Decimal,
    tax_rate: Decimal,
) -> Result<Totals> {
    check_rate("discount", discount_rate)?;
    check_rate("tax", tax_rate)?;

    let mut subtotal = Decimal::ZERO;
    for item in line_items {
        if item.quantity < 1 {
            return Err(FakturwerkError::InvalidLineItem {
                index: item.index,
                reason: "quantity must be at least 1".into(),
            });
        }
        if item.unit_price < Decimal::ZERO {
            return Err(FakturwerkError::InvalidLineItem {
                index: item.index,
                reason: format!("unit price {} is negative", item.unit_price),
            });
        }
        subtotal += item.line_total();
    }

    let discount = subtotal * discount_rate;
    let subtotal_less_discount = subtotal - discount;
    let tax_total = subtotal_less_discount * tax_rate;
    let balance_due = subtotal_less_discount + tax_total;

    debug!(
        items = line_items.len(),
        %subtotal,
        %balance_due,
        "derived invoice totals"
    );

    Ok(Totals {
        subtotal,
        discount_rate,
        discount,
        subtotal_less_discount,
        tax_rate,
        tax_total,
        balance_due,
    })
}

fn check_rate(name: &'static str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(FakturwerkError::InvalidRate { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: u32, quantity: u32, cents: i64) -> LineItem {
        LineItem {
            index,
            name: format!("item {index}"),
            quantity,
            unit_price: Decimal::new(cents, 2),
        }
    }

    /// Worked example: [{qty 2, 10.00}, {qty 1, 5.00}], 5% discount, 10% tax.
    #[test]
    fn derives_worked_example_exactly() {
        let items = vec![item(1, 2, 1000), item(2, 1, 500)];
        let totals = derive(&items, Decimal::new(5, 2), Decimal::new(10, 2)).unwrap();

        assert_eq!(totals.subtotal, Decimal::new(2500, 2));
        assert_eq!(totals.discount, Decimal::new(125, 2));
        assert_eq!(totals.subtotal_less_discount, Decimal::new(2375, 2));
        assert_eq!(totals.tax_total, Decimal::new(2375, 3));
        assert_eq!(totals.balance_due, Decimal::new(26125, 3));
        // Display percentages come from the fractional rates, so a 0.1 rate
        // labels as 10%, never 0.1%.
        assert_eq!(totals.discount_rate_percent(), Decimal::from(5));
        assert_eq!(totals.tax_rate_percent(), Decimal::from(10));
    }

    #[test]
    fn empty_line_items_give_zero_totals() {
        let totals = derive(&[], Decimal::new(5, 2), Decimal::new(10, 2)).unwrap();
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.tax_total, Decimal::ZERO);
        assert_eq!(totals.balance_due, Decimal::ZERO);
    }

    /// Identical inputs must give bit-identical outputs.
    #[test]
    fn derivation_is_idempotent() {
        let items = vec![item(1, 3, 1999), item(2, 7, 42), item(3, 1, 123456)];
        let first = derive(&items, Decimal::new(125, 3), Decimal::new(19, 2)).unwrap();
        let second = derive(&items, Decimal::new(125, 3), Decimal::new(19, 2)).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.balance_due.serialize(),
            second.balance_due.serialize()
        );
    }

    #[test]
    fn subtotal_matches_sum_over_many_items() {
        // Pseudo-random but fixed prices/quantities; the invariant must hold
        // exactly, not approximately.
        let items: Vec<LineItem> = (1..=50)
            .map(|i| item(i, (i % 5) + 1, (i as i64 * 137) % 100_000))
            .collect();
        let totals = derive(&items, Decimal::ZERO, Decimal::new(10, 2)).unwrap();

        let expected: Decimal = items.iter().map(LineItem::line_total).sum();
        assert_eq!(totals.subtotal, expected);
        assert!(totals.balance_due >= totals.subtotal_less_discount);
        assert!(totals.subtotal_less_discount >= Decimal::ZERO);
    }

    #[test]
    fn rejects_zero_quantity() {
        let err = derive(&[item(3, 0, 100)], Decimal::ZERO, Decimal::ZERO).unwrap_err();
        assert!(matches!(
            err,
            FakturwerkError::InvalidLineItem { index: 3, .. }
        ));
    }

    #[test]
    fn rejects_negative_price() {
        let err = derive(&[item(1, 1, -100)], Decimal::ZERO, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, FakturwerkError::InvalidLineItem { .. }));
    }

    #[test]
    fn rejects_out_of_range_rates() {
        let items = vec![item(1, 1, 100)];
        assert!(matches!(
            derive(&items, Decimal::new(101, 2), Decimal::ZERO),
            Err(FakturwerkError::InvalidRate { name: "discount", .. })
        ));
        assert!(matches!(
            derive(&items, Decimal::ZERO, Decimal::new(-1, 2)),
            Err(FakturwerkError::InvalidRate { name: "tax", .. })
        ));
    }

    #[test]
    fn boundary_rates_are_accepted() {
        let items = vec![item(1, 1, 100)];
        let totals = derive(&items, Decimal::ONE, Decimal::ONE).unwrap();
        assert_eq!(totals.subtotal_less_discount, Decimal::ZERO);
        assert_eq!(totals.balance_due, Decimal::ZERO);
    }
}
