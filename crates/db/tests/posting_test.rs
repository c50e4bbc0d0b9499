//! Posting and ledger projection against a live PostgreSQL database.
//!
//! Run with `cargo test -p tally-db -- --ignored` and `DATABASE_URL` set.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rust_decimal_macros::dec;
use tally_core::ledger::{LedgerError, TransactionPatch};
use tally_db::repositories::{
    AccountRepository, LedgerRepoError, LedgerRepository, TransactionRepository,
    UpdateAccountInput,
};
use tokio::sync::Barrier;

use common::Fixture;

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_cash_sale_moves_both_balances() {
    let fx = Fixture::new(common::connect().await.unwrap()).await;
    let cash = fx.account("Cash", "assets", dec!(1000)).await;
    let sales = fx.account("Sales", "income", dec!(0)).await;

    let tx = TransactionRepository::new(fx.db.clone())
        .post_transaction(fx.posting("Cash sale", vec![(cash, dec!(500))], vec![(sales, dec!(500))]))
        .await
        .unwrap();

    assert_eq!(tx.amount, dec!(500));
    assert!(!tx.is_posted);

    let accounts = AccountRepository::new(fx.db.clone());
    let cash_row = accounts.find_account(cash).await.unwrap().account;
    let sales_row = accounts.find_account(sales).await.unwrap().account;
    assert_eq!(cash_row.current_balance, dec!(1500));
    assert_eq!(sales_row.current_balance, dec!(-500));

    let verification = accounts.verify_balance(cash).await.unwrap();
    assert!(verification.is_consistent);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_failed_posting_leaves_balances_untouched() {
    let fx = Fixture::new(common::connect().await.unwrap()).await;
    let cash = fx.account("Cash", "assets", dec!(1000)).await;
    let ghost = tally_shared::types::AccountId::new();

    let err = TransactionRepository::new(fx.db.clone())
        .post_transaction(fx.posting("Broken", vec![(cash, dec!(500))], vec![(ghost, dec!(500))]))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerRepoError::Ledger(LedgerError::AccountNotFound(_))));
    let cash_row = AccountRepository::new(fx.db.clone())
        .find_account(cash)
        .await
        .unwrap()
        .account;
    assert_eq!(cash_row.current_balance, dec!(1000));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_postings_do_not_lose_updates() {
    let fx = Fixture::new(common::connect().await.unwrap()).await;
    let cash = fx.account("Cash", "assets", dec!(0)).await;
    let sales = fx.account("Sales", "income", dec!(0)).await;

    let repo = TransactionRepository::new(fx.db.clone());
    let barrier = Arc::new(Barrier::new(20));
    let tasks = (0..20).map(|i| {
        let repo = repo.clone();
        let barrier = barrier.clone();
        let input = fx.posting(&format!("Sale {i}"), vec![(cash, dec!(10))], vec![(sales, dec!(10))]);
        tokio::spawn(async move {
            barrier.wait().await;
            repo.post_transaction(input).await
        })
    });

    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let accounts = AccountRepository::new(fx.db.clone());
    assert_eq!(accounts.find_account(cash).await.unwrap().account.current_balance, dec!(200));
    assert_eq!(accounts.find_account(sales).await.unwrap().account.current_balance, dec!(-200));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_ledger_apply_is_exactly_once() {
    let fx = Fixture::new(common::connect().await.unwrap()).await;
    let cash = fx.account("Cash", "assets", dec!(0)).await;
    let capital = fx.account("Capital", "equity", dec!(0)).await;

    let tx = TransactionRepository::new(fx.db.clone())
        .post_transaction(fx.posting("Owner investment", vec![(cash, dec!(750))], vec![(capital, dec!(750))]))
        .await
        .unwrap();

    let ledgers = LedgerRepository::new(fx.db.clone());
    ledgers.open_ledger(cash).await.unwrap();

    let err = ledgers.apply_transaction(tx.id).await.unwrap_err();
    assert_eq!(err.error_code(), "LEDGER_NOT_FOUND");
    assert_eq!(ledgers.get_ledger(cash).await.unwrap().balance, dec!(0));

    ledgers.open_ledger(capital).await.unwrap();
    ledgers.apply_transaction(tx.id).await.unwrap();
    assert_eq!(ledgers.get_ledger(cash).await.unwrap().balance, dec!(750));
    assert_eq!(ledgers.get_ledger(capital).await.unwrap().balance, dec!(-750));

    let again = ledgers.apply_transaction(tx.id).await.unwrap_err();
    assert_eq!(again.error_code(), "ALREADY_APPLIED");
    assert_eq!(ledgers.get_ledger(cash).await.unwrap().balance, dec!(750));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_transactions_are_append_only() {
    let fx = Fixture::new(common::connect().await.unwrap()).await;
    let cash = fx.account("Cash", "assets", dec!(0)).await;
    let rent = fx.account("Rent", "expenses", dec!(0)).await;

    let repo = TransactionRepository::new(fx.db.clone());
    let tx = repo
        .post_transaction(fx.posting("Rent", vec![(rent, dec!(300))], vec![(cash, dec!(300))]))
        .await
        .unwrap();

    let err = repo.delete_transaction(tx.id).await;
    assert_eq!(err.error_code(), "TRANSACTION_IMMUTABLE");

    let updated = repo
        .update_transaction(
            tx.id,
            TransactionPatch {
                description: Some("October rent".to_string()),
                ..TransactionPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "October rent");
    assert_eq!(updated.amount, dec!(300));
    assert_eq!(updated.debit_legs.len(), 1);

    let err = AccountRepository::new(fx.db.clone())
        .delete_account(cash)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "IN_USE");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_account_update_completes_on_single_connection_pool() {
    let fx = Fixture::new(common::connect_single().await.unwrap()).await;
    let cash = fx.account("Cash", "assets", dec!(1000)).await;

    let accounts = AccountRepository::new(fx.db.clone());
    let update = accounts.update_account(
        cash,
        UpdateAccountInput {
            opening_balance: Some(dec!(1200)),
            ..UpdateAccountInput::default()
        },
    );
    let updated = tokio::time::timeout(Duration::from_secs(10), update)
        .await
        .expect("update must not wait on a second connection")
        .unwrap();

    assert_eq!(updated.account.opening_balance, dec!(1200));
    assert_eq!(updated.account.current_balance, dec!(1200));
}
