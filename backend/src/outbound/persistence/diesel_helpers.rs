//! Error mapping shared by the Diesel repositories.
//!
//! Every repository port error exposes the same three shapes: a connection
//! failure, a query failure and, for tables backed by a unique index, a
//! duplicate key. [`StoreError`] lets one mapping serve all of them.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{
    BeerPersistenceError, EventPersistenceError, FavoritePersistenceError,
    ParticipantPersistenceError, ReviewPersistenceError, UserPersistenceError,
};

use super::pool::PoolError;

/// Port errors constructible from database failures.
pub(crate) trait StoreError: Sized {
    /// The database could not be reached.
    fn from_connection(message: String) -> Self;
    /// The statement failed or returned unusable data.
    fn from_query(message: String) -> Self;
    /// A unique index rejected the write.
    fn from_unique_violation(message: String) -> Self {
        Self::from_query(message)
    }
}

macro_rules! impl_store_error {
    ($error:ident) => {
        impl StoreError for $error {
            fn from_connection(message: String) -> Self {
                $error::connection(message)
            }

            fn from_query(message: String) -> Self {
                $error::query(message)
            }
        }
    };
    ($error:ident, unique) => {
        impl StoreError for $error {
            fn from_connection(message: String) -> Self {
                $error::connection(message)
            }

            fn from_query(message: String) -> Self {
                $error::query(message)
            }

            fn from_unique_violation(message: String) -> Self {
                $error::duplicate_key(message)
            }
        }
    };
}

impl_store_error!(UserPersistenceError, unique);
impl_store_error!(EventPersistenceError, unique);
impl_store_error!(ParticipantPersistenceError, unique);
impl_store_error!(BeerPersistenceError);
impl_store_error!(FavoritePersistenceError, unique);
impl_store_error!(ReviewPersistenceError, unique);

/// Pool checkout or build failures are connection errors.
pub(crate) fn map_pool_error<E: StoreError>(error: PoolError) -> E {
    E::from_connection(error.into_message())
}

/// Classify a Diesel error for the port.
///
/// Unique violations carry the constraint name so callers can tell which
/// index fired.
pub(crate) fn map_diesel_error<E: StoreError>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            E::from_unique_violation(
                info.constraint_name()
                    .map_or_else(|| info.message().to_owned(), str::to_owned),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::from_connection("database connection error".to_owned())
        }
        DieselError::NotFound => E::from_query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::from_query("database query error".to_owned()),
        _ => E::from_query("database error".to_owned()),
    }
}

/// Convert loaded rows, failing on the first row that does not map.
pub(crate) fn convert_rows<R, T, E: StoreError>(
    rows: Vec<R>,
    convert: impl Fn(R) -> Result<T, String>,
) -> Result<Vec<T>, E> {
    rows.into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()
        .map_err(E::from_query)
}
