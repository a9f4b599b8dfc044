table! {
    events (id) {
        id -> Binary,
        aggregate_id -> Binary,
        version -> BigInt,
        kind -> Text,
        payload -> Text,
        user_id -> Nullable<Binary>,
        created_at -> Timestamp,
    }
}

table! {
    ledger_postings (id) {
        id -> Binary,
        tx_id -> Binary,
        from_account -> Text,
        to_account -> Text,
        amount -> BigInt,
        idempotency_key -> Text,
        metadata -> Text,
        created_at -> Timestamp,
    }
}

table! {
    ledger_accounts (account) {
        account -> Text,
        balance -> BigInt,
    }
}

allow_tables_to_appear_in_same_query!(events, ledger_postings, ledger_accounts,);
