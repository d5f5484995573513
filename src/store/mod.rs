//! Store boundary: every handler talks to a `Repository<R>` and gets an
//! explicit `Result` back, whichever backend sits behind it.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use crate::{cars::Car, db_client::Database, error::StoreError, rentals::Rental, resource::Resource, users::User};

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
	async fn list(&self) -> StoreResult<Vec<R>>;

	/// Rows whose integer `column` equals `value`.
	async fn list_by(&self, column: &'static str, value: i32) -> StoreResult<Vec<R>>;

	async fn get(&self, id: i32) -> StoreResult<Option<R>>;

	/// Returns the store-assigned key.
	async fn insert(&self, fields: &R::Fields) -> StoreResult<i32>;

	/// Returns the affected-row count.
	async fn update(&self, id: i32, fields: &R::Fields) -> StoreResult<u64>;

	/// Returns the affected-row count.
	async fn delete(&self, id: i32) -> StoreResult<u64>;
}

pub type Repo<R> = Arc<dyn Repository<R>>;

/// One repository per resource, handed to the router at startup.
#[derive(Clone)]
pub struct Stores {
	pub cars: Repo<Car>,
	pub rentals: Repo<Rental>,
	pub users: Repo<User>,
}

impl Stores {
	pub fn postgres(db: &Database) -> Self {
		Stores {
			cars: Arc::new(PgRepository::new(db.pool())),
			rentals: Arc::new(PgRepository::new(db.pool())),
			users: Arc::new(PgRepository::new(db.pool())),
		}
	}

	pub fn memory() -> Self {
		Stores {
			cars: Arc::new(MemoryRepository::new()),
			rentals: Arc::new(MemoryRepository::new()),
			users: Arc::new(MemoryRepository::new()),
		}
	}
}
