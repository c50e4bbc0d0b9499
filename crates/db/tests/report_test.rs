//! Report folds over data stored in a live PostgreSQL database.
//!
//! Run with `cargo test -p tally-db -- --ignored` and `DATABASE_URL` set.

#![allow(clippy::unwrap_used)]

mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use tally_core::reports::{AssetSnapshot, DateRange};
use tally_db::repositories::{ReportRepository, TransactionRepository};

use common::Fixture;

fn today() -> DateRange {
    let today = Utc::now().date_naive();
    DateRange::new(today, today).unwrap()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_profit_loss_reflects_posted_sale() {
    let fx = Fixture::new(common::connect().await.unwrap()).await;
    let cash = fx.account("Cash", "assets", dec!(1000)).await;
    let sales = fx.account("Sales", "income", dec!(0)).await;
    let rent = fx.account("Rent", "expenses", dec!(0)).await;

    let transactions = TransactionRepository::new(fx.db.clone());
    transactions
        .post_transaction(fx.posting("Cash sale", vec![(cash, dec!(500))], vec![(sales, dec!(500))]))
        .await
        .unwrap();
    transactions
        .post_transaction(fx.posting("Rent", vec![(rent, dec!(120))], vec![(cash, dec!(120))]))
        .await
        .unwrap();

    let report = ReportRepository::new(fx.db.clone())
        .profit_loss(today())
        .await
        .unwrap();

    let income = report
        .income_accounts
        .iter()
        .find(|a| a.account_id == sales)
        .unwrap();
    assert_eq!(income.amount, dec!(500));
    let expense = report
        .expenses_accounts
        .iter()
        .find(|a| a.account_id == rent)
        .unwrap();
    assert_eq!(expense.amount, dec!(120));
    assert_eq!(report.profit_loss, report.total_income - report.total_expenses);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_closing_assets_and_ledger_detail() {
    let fx = Fixture::new(common::connect().await.unwrap()).await;
    let cash = fx.account("Cash", "assets", dec!(0)).await;
    let capital = fx.account("Capital", "equity", dec!(0)).await;
    let rent = fx.account("Rent", "expenses", dec!(0)).await;

    let transactions = TransactionRepository::new(fx.db.clone());
    transactions
        .post_transaction(fx.posting("Investment", vec![(cash, dec!(200))], vec![(capital, dec!(200))]))
        .await
        .unwrap();
    transactions
        .post_transaction(fx.posting("Rent", vec![(rent, dec!(50))], vec![(cash, dec!(50))]))
        .await
        .unwrap();

    let reports = ReportRepository::new(fx.db.clone());
    let closing = reports
        .asset_balances(today(), AssetSnapshot::Closing)
        .await
        .unwrap();
    let line = closing.accounts.iter().find(|a| a.account_id == cash).unwrap();
    assert_eq!(line.amount, dec!(150));

    let view = reports.account_ledger(cash, today()).await.unwrap();
    assert_eq!(view.account.id, cash);
    assert_eq!(view.report.debit_entries.len(), 1);
    assert_eq!(view.report.debit_entries[0].entry_amount, dec!(-200));
    assert_eq!(view.report.debit_entries[0].running_balance, dec!(-200));
    assert_eq!(view.report.credit_entries[0].entry_amount, dec!(50));
    assert_eq!(view.report.credit_entries[0].running_balance, dec!(-150));
    assert_eq!(view.report.closing_balance, dec!(-150));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_received_paid_lists_fixture_category() {
    let fx = Fixture::new(common::connect().await.unwrap()).await;
    let cash = fx.account("Cash", "assets", dec!(0)).await;
    let sales = fx.account("Sales", "income", dec!(0)).await;

    TransactionRepository::new(fx.db.clone())
        .post_transaction(fx.posting("Cash sale", vec![(cash, dec!(80))], vec![(sales, dec!(80))]))
        .await
        .unwrap();

    let report = ReportRepository::new(fx.db.clone())
        .received_paid(today())
        .await
        .unwrap();

    let category = report
        .categories
        .iter()
        .find(|c| c.category_id == fx.category_id)
        .unwrap();
    assert_eq!(category.category_total, dec!(160));
    assert_eq!(category.category_accounts_array.len(), 2);
}
