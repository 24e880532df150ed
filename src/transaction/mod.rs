//! Recording, listing and deleting a user's transactions.

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod transactions_page;

pub use self::core::{
    NewTransaction, Transaction, TransactionFilter, TransactionId, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, get_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use transactions_page::get_transactions_page;
