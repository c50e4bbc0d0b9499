//! Report generation service.
//!
//! Every report is a fold over a transaction window: pick the transactions the
//! report cares about, classify each leg by its account, and accumulate a
//! signed contribution into per-account buckets. Nothing here mutates state.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::ReportError;
use super::types::{
    AccountAmount, AccountIndex, AccountLedgerReport, AssetBalanceReport, AssetSnapshot,
    CategoryReport, DateRange, LedgerReportEntry, ProfitLossReport, ReceivedPaidReport,
};
use crate::directory::{AccountCategory, AccountKind, ClassifiedAccount};
use crate::ledger::{RunningBalance, Side, Transaction};

/// Per-account accumulator that keeps first-seen order.
#[derive(Debug, Default)]
struct Buckets {
    lines: Vec<AccountAmount>,
    index: HashMap<AccountId, usize>,
}

impl Buckets {
    fn add(&mut self, account: &ClassifiedAccount, amount: Decimal) {
        if let Some(&i) = self.index.get(&account.id) {
            self.lines[i].amount += amount;
        } else {
            self.index.insert(account.id, self.lines.len());
            self.lines.push(AccountAmount {
                account_id: account.id,
                account_name: account.account_name.clone(),
                amount,
            });
        }
    }

    fn total(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum()
    }

    fn into_lines(self) -> Vec<AccountAmount> {
        self.lines
    }
}

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Asset account balances at the opening or closing cut-off.
    ///
    /// Includes transactions at or before the cut-off. A debit leg on an asset
    /// account contributes `+leg.amount`, a credit leg `-leg.amount`.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedAccount` if any included leg names an unknown account.
    pub fn asset_balances(
        transactions: &[Transaction],
        accounts: &AccountIndex,
        range: DateRange,
        snapshot: AssetSnapshot,
    ) -> Result<AssetBalanceReport, ReportError> {
        let as_of = snapshot.as_of(&range);
        let mut buckets = Buckets::default();

        for tx in transactions.iter().filter(|t| t.created_at <= as_of) {
            for (side, leg) in tx.legs() {
                let account = accounts.resolve(tx.id, leg.account_id)?;
                if account.kind == AccountKind::Assets {
                    buckets.add(account, side.signed(leg.amount));
                }
            }
        }

        let total = buckets.total();
        Ok(AssetBalanceReport {
            start_date: range.start_date,
            end_date: range.end_date,
            snapshot,
            as_of,
            accounts: buckets.into_lines(),
            total,
        })
    }

    /// Profit and loss over a window.
    ///
    /// Income: credit `+amount`, debit `-amount`. Expenses: debit `+amount`,
    /// credit `-amount`. Buckets hold the same signed nets as the totals, so
    /// each total equals the sum of its bucket list.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedAccount` if any included leg names an unknown account.
    pub fn profit_loss(
        transactions: &[Transaction],
        accounts: &AccountIndex,
        range: DateRange,
    ) -> Result<ProfitLossReport, ReportError> {
        let mut income = Buckets::default();
        let mut expenses = Buckets::default();
        let mut total_income = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;

        for tx in transactions.iter().filter(|t| range.contains(t.created_at)) {
            for (side, leg) in tx.legs() {
                let account = accounts.resolve(tx.id, leg.account_id)?;
                match account.kind {
                    AccountKind::Income => {
                        let amount = -side.signed(leg.amount);
                        total_income += amount;
                        income.add(account, amount);
                    }
                    AccountKind::Expenses => {
                        let amount = side.signed(leg.amount);
                        total_expenses += amount;
                        expenses.add(account, amount);
                    }
                    _ => {}
                }
            }
        }

        Ok(ProfitLossReport {
            start_date: range.start_date,
            end_date: range.end_date,
            total_income,
            total_expenses,
            profit_loss: total_income - total_expenses,
            income_accounts: income.into_lines(),
            expenses_accounts: expenses.into_lines(),
        })
    }

    /// Received/paid activity per category over a window.
    ///
    /// Both sides accumulate the unsigned leg amount. Every supplied category
    /// appears in the output, including those with no activity.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedAccount` if any included leg names an unknown account.
    pub fn received_paid(
        transactions: &[Transaction],
        accounts: &AccountIndex,
        categories: &[AccountCategory],
        range: DateRange,
    ) -> Result<ReceivedPaidReport, ReportError> {
        let mut per_category: HashMap<_, Buckets> = HashMap::new();

        for tx in transactions.iter().filter(|t| range.contains(t.created_at)) {
            for (_, leg) in tx.legs() {
                let account = accounts.resolve(tx.id, leg.account_id)?;
                per_category
                    .entry(account.category_id)
                    .or_default()
                    .add(account, leg.amount);
            }
        }

        let categories = categories
            .iter()
            .map(|category| {
                let buckets = per_category.remove(&category.id).unwrap_or_default();
                let category_total = buckets.total();
                CategoryReport {
                    category_id: category.id,
                    category_name: category.name.clone(),
                    category_type: category.category_type.clone(),
                    category_accounts_array: buckets.into_lines(),
                    category_total,
                }
            })
            .collect();

        Ok(ReceivedPaidReport {
            start_date: range.start_date,
            end_date: range.end_date,
            categories,
        })
    }

    /// Per-account ledger detail over a window.
    ///
    /// `transactions` must be in chronological order. For each transaction
    /// touching the account, `entry_amount = credits - debits` for that account,
    /// accumulated into a running balance. Negative entries are listed as
    /// debit entries named after the first credit leg's account; the rest are
    /// credit entries named after the first debit leg's account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if `account_id` is not indexed, or
    /// `UnresolvedAccount` if a counterparty leg names an unknown account.
    pub fn account_ledger(
        transactions: &[Transaction],
        accounts: &AccountIndex,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<AccountLedgerReport, ReportError> {
        if accounts.get(account_id).is_none() {
            return Err(ReportError::AccountNotFound(account_id.into_inner()));
        }

        let mut debit_entries = Vec::new();
        let mut credit_entries = Vec::new();
        let mut running: Option<RunningBalance> = None;

        for tx in transactions
            .iter()
            .filter(|t| range.contains(t.created_at) && t.references(account_id))
        {
            let entry_amount = tx.credit_amount_for(account_id) - tx.debit_amount_for(account_id);
            let step = RunningBalance::advance(running.as_ref(), entry_amount);
            running = Some(step);

            let (counter_side, bucket) = if entry_amount < Decimal::ZERO {
                (Side::Credit, &mut debit_entries)
            } else {
                (Side::Debit, &mut credit_entries)
            };
            let counterparty = match counter_side {
                Side::Credit => tx.first_credit_account(),
                Side::Debit => tx.first_debit_account(),
            };
            let account_name = counterparty
                .map(|id| accounts.resolve(tx.id, id).map(|a| a.account_name.clone()))
                .transpose()?;

            bucket.push(LedgerReportEntry {
                transaction_id: tx.id,
                transaction_date: tx.created_at,
                transaction_details: tx.description.clone(),
                entry_amount,
                running_balance: step.current_balance,
                account_name,
            });
        }

        Ok(AccountLedgerReport {
            account_id,
            start_date: range.start_date,
            end_date: range.end_date,
            debit_entries,
            credit_entries,
            closing_balance: running.map_or(Decimal::ZERO, |r| r.current_balance),
        })
    }
}
