use rusqlite::Connection;

use crate::{
    auth::{PasswordHash, User, create_user},
    db::initialize,
};

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

/// Insert a user with a dummy password hash.
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> User {
    create_user(email, PasswordHash::new_unchecked("hunter2"), connection)
        .expect("Could not create test user")
}
