//! Initial database migration.
//!
//! Creates the directory tables, the transaction and leg tables, and the
//! ledger projection table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ACCOUNT DIRECTORY
        // ============================================================
        db.execute_unprepared(DIRECTORY_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(APPEND_ONLY_LEGS_SQL).await?;

        // ============================================================
        // PART 4: LEDGER PROJECTION
        // ============================================================
        db.execute_unprepared(LEDGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE leg_side AS ENUM ('debit', 'credit');
CREATE TYPE transaction_type AS ENUM ('Transfer', 'Debit', 'Credit');
CREATE TYPE payment_type AS ENUM ('Cash', 'Bank');
";

const DIRECTORY_SQL: &str = r"
CREATE TABLE account_types (
    id UUID PRIMARY KEY,
    type_name VARCHAR(100) NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_type_name_not_blank CHECK (btrim(type_name) <> '')
);

CREATE UNIQUE INDEX idx_account_types_name ON account_types(lower(type_name));

CREATE TABLE account_sub_types (
    id UUID PRIMARY KEY,
    sub_type_name VARCHAR(100) NOT NULL,
    account_type_id UUID NOT NULL REFERENCES account_types(id) ON DELETE RESTRICT,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_sub_type_name_not_blank CHECK (btrim(sub_type_name) <> '')
);

CREATE INDEX idx_account_sub_types_type ON account_sub_types(account_type_id);

CREATE TABLE account_categories (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    category_type VARCHAR(50) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_category_name_not_blank CHECK (btrim(name) <> '')
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    account_name VARCHAR(255) NOT NULL,
    account_type_id UUID NOT NULL REFERENCES account_types(id) ON DELETE RESTRICT,
    account_sub_type_id UUID NOT NULL REFERENCES account_sub_types(id) ON DELETE RESTRICT,
    account_category_id UUID NOT NULL REFERENCES account_categories(id) ON DELETE RESTRICT,
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_by UUID NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_account_name_not_blank CHECK (btrim(account_name) <> '')
);

CREATE INDEX idx_accounts_type ON accounts(account_type_id);
CREATE INDEX idx_accounts_sub_type ON accounts(account_sub_type_id);
CREATE INDEX idx_accounts_category ON accounts(account_category_id);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    description TEXT NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    created_by UUID NOT NULL,
    is_posted BOOLEAN NOT NULL DEFAULT false,
    notes TEXT,
    transaction_type transaction_type NOT NULL,
    payment_type payment_type NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transaction_amount_positive CHECK (amount > 0)
);

-- Report windows and list ordering
CREATE INDEX idx_transactions_created ON transactions(created_at, id);

CREATE TABLE transaction_legs (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE RESTRICT,
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    side leg_side NOT NULL,
    position INTEGER NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    CONSTRAINT chk_leg_amount_positive CHECK (amount > 0),
    CONSTRAINT uq_leg_position UNIQUE (transaction_id, side, position)
);

CREATE INDEX idx_transaction_legs_account ON transaction_legs(account_id, transaction_id);
";

const APPEND_ONLY_LEGS_SQL: &str = r"
CREATE OR REPLACE FUNCTION prevent_leg_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Transaction legs are append-only. Post an opposite transaction instead.';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_leg_mod
BEFORE UPDATE OR DELETE ON transaction_legs
FOR EACH ROW
EXECUTE FUNCTION prevent_leg_modification();
";

const LEDGERS_SQL: &str = r"
CREATE TABLE ledgers (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL UNIQUE REFERENCES accounts(id) ON DELETE RESTRICT,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    last_updated TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ledgers CASCADE;
DROP TRIGGER IF EXISTS trg_prevent_leg_mod ON transaction_legs;
DROP FUNCTION IF EXISTS prevent_leg_modification();
DROP TABLE IF EXISTS transaction_legs CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS account_categories CASCADE;
DROP TABLE IF EXISTS account_sub_types CASCADE;
DROP TABLE IF EXISTS account_types CASCADE;
DROP TYPE IF EXISTS payment_type;
DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS leg_side;
";
