use std::{
	collections::BTreeMap,
	sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use super::{Repository, StoreResult};
use crate::{error::StoreError, resource::Resource};

struct Rows<R> {
	by_id: BTreeMap<i32, R>,
	last_id: i32,
	failure: Option<String>,
}

/// Process-local table with auto-incrementing keys. Backs the router tests
/// and can be told to fail every call to exercise the 500 path.
pub struct MemoryRepository<R> {
	rows: Mutex<Rows<R>>,
}

impl<R: Resource> MemoryRepository<R> {
	pub fn new() -> Self {
		MemoryRepository {
			rows: Mutex::new(Rows {
				by_id: BTreeMap::new(),
				last_id: 0,
				failure: None,
			}),
		}
	}

	/// Every subsequent call returns `StoreError::Unavailable(message)`.
	pub fn failing(message: impl Into<String>) -> Self {
		let repo = Self::new();
		repo.lock_unchecked().failure = Some(message.into());
		repo
	}

	fn lock_unchecked(&self) -> MutexGuard<'_, Rows<R>> {
		self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn lock(&self) -> StoreResult<MutexGuard<'_, Rows<R>>> {
		let rows = self.lock_unchecked();
		match &rows.failure {
			Some(message) => Err(StoreError::Unavailable(message.clone())),
			None => Ok(rows),
		}
	}
}

impl<R: Resource> Default for MemoryRepository<R> {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl<R: Resource> Repository<R> for MemoryRepository<R> {
	async fn list(&self) -> StoreResult<Vec<R>> {
		Ok(self.lock()?.by_id.values().cloned().collect())
	}

	async fn list_by(&self, column: &'static str, value: i32) -> StoreResult<Vec<R>> {
		let rows = self.lock()?;
		let mut matched = Vec::new();
		for row in rows.by_id.values() {
			let json = serde_json::to_value(row).map_err(|e| StoreError::Unavailable(e.to_string()))?;
			if json.get(column).and_then(|v| v.as_i64()) == Some(i64::from(value)) {
				matched.push(row.clone());
			}
		}
		Ok(matched)
	}

	async fn get(&self, id: i32) -> StoreResult<Option<R>> {
		Ok(self.lock()?.by_id.get(&id).cloned())
	}

	async fn insert(&self, fields: &R::Fields) -> StoreResult<i32> {
		let mut rows = self.lock()?;
		rows.last_id += 1;
		let id = rows.last_id;
		rows.by_id.insert(id, R::assemble(id, R::stored(fields)));
		Ok(id)
	}

	async fn update(&self, id: i32, fields: &R::Fields) -> StoreResult<u64> {
		let mut rows = self.lock()?;
		match rows.by_id.get_mut(&id) {
			Some(row) => {
				*row = R::assemble(id, R::stored(fields));
				Ok(1)
			}
			None => Ok(0),
		}
	}

	async fn delete(&self, id: i32) -> StoreResult<u64> {
		Ok(self.lock()?.by_id.remove(&id).map_or(0, |_| 1))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::users::{User, UserFields};

	fn ada() -> UserFields {
		UserFields {
			name: "Ada".into(),
			email: "ada@example.com".into(),
			password: "secret".into(),
		}
	}

	#[tokio::test]
	async fn keys_are_never_reused() {
		let repo = MemoryRepository::<User>::new();
		let first = repo.insert(&ada()).await.unwrap();
		assert_eq!(repo.delete(first).await.unwrap(), 1);
		let second = repo.insert(&ada()).await.unwrap();
		assert!(second > first);
	}

	#[tokio::test]
	async fn update_reports_affected_rows() {
		let repo = MemoryRepository::<User>::new();
		let id = repo.insert(&ada()).await.unwrap();
		assert_eq!(repo.update(id, &ada()).await.unwrap(), 1);
		assert_eq!(repo.update(id + 1, &ada()).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn failing_repository_surfaces_message() {
		let repo = MemoryRepository::<User>::failing("too many connections");
		let err = repo.list().await.unwrap_err();
		assert_eq!(err.to_string(), "too many connections");
	}
}
