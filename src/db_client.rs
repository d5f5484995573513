use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

use crate::{config::Config, error::StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "Cars" (
	"CarID" SERIAL PRIMARY KEY,
	"Make" TEXT NOT NULL,
	"Model" TEXT NOT NULL,
	"Year" INTEGER NOT NULL,
	"Color" TEXT NOT NULL,
	"LicensePlate" TEXT NOT NULL,
	"DailyRate" DOUBLE PRECISION NOT NULL,
	"Status" TEXT NOT NULL CHECK ("Status" IN ('Available', 'Rented', 'Maintenance')),
	"ImageURL" TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS "Users" (
	"UserID" SERIAL PRIMARY KEY,
	"Name" TEXT NOT NULL,
	"Email" TEXT NOT NULL,
	"Password" TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS "Rentals" (
	"RentalID" SERIAL PRIMARY KEY,
	"CarID" INTEGER NOT NULL,
	"UserID" INTEGER NOT NULL,
	"StartDate" TEXT NOT NULL,
	"EndDate" TEXT,
	"TotalAmount" DOUBLE PRECISION NOT NULL
);
"#;

/// Owns the connection pool for the life of the process.
///
/// Connections are opened lazily on first checkout; `close` stops handing
/// them out and drops idle ones, so call it only after the server drained.
#[derive(Clone)]
pub struct Database {
	pool: Pool,
}

impl Database {
	pub fn connect(config: &Config) -> Result<Self, StoreError> {
		let pg_config: tokio_postgres::Config = config.database_url.parse()?;
		let manager = Manager::from_config(
			pg_config,
			NoTls,
			ManagerConfig {
				recycling_method: RecyclingMethod::Fast,
			},
		);
		let pool = Pool::builder(manager).max_size(config.pool_max_size).build()?;
		Ok(Database { pool })
	}

	pub fn pool(&self) -> Pool {
		self.pool.clone()
	}

	/// Creates any missing table. Existing tables are left untouched.
	pub async fn init_schema(&self) -> Result<(), StoreError> {
		let client = self.pool.get().await?;
		client.batch_execute(SCHEMA).await?;
		log::info!("database schema ready");
		Ok(())
	}

	pub fn close(&self) {
		let status = self.pool.status();
		log::info!("closing database pool ({} connections, {} idle)", status.size, status.available);
		self.pool.close();
		log::info!("database pool closed");
	}
}
