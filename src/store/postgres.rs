use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::types::ToSql;

use super::{Repository, StoreResult};
use crate::resource::Resource;

/// Runs each operation as a single statement on a pooled connection.
#[derive(Clone)]
pub struct PgRepository {
	pool: Pool,
}

impl PgRepository {
	pub fn new(pool: Pool) -> Self {
		PgRepository { pool }
	}
}

#[async_trait]
impl<R: Resource> Repository<R> for PgRepository {
	async fn list(&self) -> StoreResult<Vec<R>> {
		let client = self.pool.get().await?;
		let statement = client.prepare_cached(&R::TABLE.select_all()).await?;
		let rows = client.query(&statement, &[]).await?;
		Ok(rows.iter().map(R::try_from_row).collect::<Result<_, _>>()?)
	}

	async fn list_by(&self, column: &'static str, value: i32) -> StoreResult<Vec<R>> {
		let client = self.pool.get().await?;
		let statement = client.prepare_cached(&R::TABLE.select_by(column)).await?;
		let rows = client.query(&statement, &[&value]).await?;
		Ok(rows.iter().map(R::try_from_row).collect::<Result<_, _>>()?)
	}

	async fn get(&self, id: i32) -> StoreResult<Option<R>> {
		let client = self.pool.get().await?;
		let statement = client.prepare_cached(&R::TABLE.select_one()).await?;
		match client.query_opt(&statement, &[&id]).await? {
			Some(row) => Ok(Some(R::try_from_row(&row)?)),
			None => Ok(None),
		}
	}

	async fn insert(&self, fields: &R::Fields) -> StoreResult<i32> {
		let client = self.pool.get().await?;
		let statement = client.prepare_cached(&R::TABLE.insert()).await?;
		let row = client.query_one(&statement, &R::params(fields)).await?;
		Ok(row.try_get(0)?)
	}

	async fn update(&self, id: i32, fields: &R::Fields) -> StoreResult<u64> {
		let client = self.pool.get().await?;
		let statement = client.prepare_cached(&R::TABLE.update()).await?;
		let mut params: Vec<&(dyn ToSql + Sync)> = R::params(fields);
		params.push(&id);
		Ok(client.execute(&statement, &params).await?)
	}

	async fn delete(&self, id: i32) -> StoreResult<u64> {
		let client = self.pool.get().await?;
		let statement = client.prepare_cached(&R::TABLE.delete()).await?;
		Ok(client.execute(&statement, &[&id]).await?)
	}
}
