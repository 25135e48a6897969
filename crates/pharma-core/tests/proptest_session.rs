//! Property-based tests for the sale session state machine.
//!
//! These tests verify that:
//! - Quantity stays within `1..=stock` under any sequence of +/- intents
//! - Totals are always `quantity × unit price`, computed in exact cents
//! - Reset always returns to `Empty`
//! - A sale over stock is never prepared
//! - Manual quantities past `MAX_QUANTITY` are refused

use pharma_core::{CoreError, Money, Product, QuantityChange, SaleSession, MAX_QUANTITY};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Intent {
    Increase,
    Decrease,
}

fn arb_intents() -> impl Strategy<Value = Vec<Intent>> {
    prop::collection::vec(
        prop_oneof![Just(Intent::Increase), Just(Intent::Decrease)],
        0..60,
    )
}

fn product(price_cents: i64, stock: i64) -> Product {
    Product {
        id: 1,
        name: "Paracetamol 500mg".into(),
        barcode: "8901030865278".into(),
        category: None,
        price: Money::from_cents(price_cents),
        stock_quantity: stock,
        expiry_date: None,
        mfg_date: None,
        packaging_type: None,
        eco_score: None,
    }
}

fn selected(price_cents: i64, stock: i64) -> SaleSession {
    let mut session = SaleSession::new();
    session
        .select_product(product(price_cents, stock), "8901030865278")
        .unwrap();
    session
}

proptest! {
    /// Any mix of +/- keeps the quantity between 1 and stock.
    #[test]
    fn quantity_stays_within_stock(
        stock in 1i64..40,
        price in 0i64..100_000,
        intents in arb_intents(),
    ) {
        let mut session = selected(price, stock);

        for intent in intents {
            let before = session.quantity().unwrap();
            let change = match intent {
                Intent::Increase => session.increase_quantity(),
                Intent::Decrease => session.decrease_quantity(),
            };
            let after = session.quantity().unwrap();

            prop_assert!((1..=stock).contains(&after));
            match change {
                QuantityChange::Changed { quantity } => prop_assert_eq!(quantity, after),
                _ => prop_assert_eq!(before, after),
            }

            let totals = session.compute_totals().unwrap();
            prop_assert_eq!(totals.total, Money::from_cents(price * after));
            prop_assert!(!totals.over_stock);
        }

        prop_assert!(session.prepare_sale().is_ok());
    }

    /// Totals are exact for prices given as decimal text.
    #[test]
    fn totals_are_exact_cents(cents in 0i64..1_000_000, quantity in 1i64..500) {
        let text = format!("{}.{:02}", cents / 100, cents % 100);
        let price = Money::parse_decimal(&text).unwrap();
        prop_assert_eq!(price.cents(), cents);

        let mut session = SaleSession::new();
        let mut p = product(0, 1_000);
        p.price = price;
        session.select_product(p, "123").unwrap();
        session.set_quantity(quantity).unwrap();

        let totals = session.compute_totals().unwrap();
        prop_assert_eq!(totals.total.cents(), cents * quantity);
        prop_assert_eq!(session.prepare_sale().unwrap().amount, totals.total);
    }

    /// A manual quantity above stock is never turned into a sale record.
    #[test]
    fn over_stock_is_never_prepared(stock in 0i64..50, excess in 1i64..50) {
        let mut session = selected(500, stock);
        session.set_quantity(stock + excess).unwrap();

        prop_assert!(session.compute_totals().unwrap().over_stock);
        let is_insufficient = matches!(
            session.prepare_sale(),
            Err(CoreError::InsufficientStock { .. })
        );
        prop_assert!(is_insufficient);
    }

    /// A typed quantity is either accepted with exact totals or refused
    /// with the selection untouched.
    #[test]
    fn manual_quantity_is_bounded(
        quantity in prop_oneof![1i64..=MAX_QUANTITY, any::<i64>()],
        price in 0i64..10_000_000,
    ) {
        let mut session = selected(price, 10);

        match session.set_quantity(quantity) {
            Ok(()) => {
                prop_assert!((1..=MAX_QUANTITY).contains(&quantity));
                let totals = session.compute_totals().unwrap();
                prop_assert_eq!(totals.total.cents(), price * quantity);
            }
            Err(_) => prop_assert_eq!(session.quantity(), Some(1)),
        }
    }

    /// Reset returns to Empty from any reachable state.
    #[test]
    fn reset_always_empties(stock in 0i64..20, intents in arb_intents()) {
        let mut session = selected(199, stock);
        for intent in intents {
            match intent {
                Intent::Increase => { session.increase_quantity(); }
                Intent::Decrease => { session.decrease_quantity(); }
            }
        }

        session.reset();
        prop_assert!(session.is_empty());
        prop_assert!(session.compute_totals().is_none());
    }
}
