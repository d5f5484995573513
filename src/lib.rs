//! Car rental backend: CRUD over the Cars, Rentals and Users tables.

pub mod cars;
pub mod config;
pub mod db_client;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod rentals;
pub mod resource;
pub mod store;
pub mod users;

use axum::Router;
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;

use crate::{
	cars::Car,
	config::Config,
	db_client::Database,
	store::Stores,
	users::User,
};

/// Every resource route, mounted under `base_path` ("" mounts at the root).
pub fn build_router(stores: Stores, base_path: &str) -> Router {
	let api = Router::new()
		.merge(handlers::routes::<Car>("/cars").with_state(stores.cars))
		.merge(rentals::routes(stores.rentals))
		.merge(handlers::routes::<User>("/users").with_state(stores.users));

	let app = if base_path.is_empty() {
		api
	} else {
		Router::new().nest(base_path, api)
	};
	app.layer(CorsLayer::permissive())
}

/// Serves until SIGINT/SIGTERM, waits for in-flight requests, then closes the pool.
pub async fn run(config: Config) -> anyhow::Result<()> {
	let db = Database::connect(&config)?;
	if config.init_schema {
		db.init_schema().await?;
	}

	let app = build_router(Stores::postgres(&db), &config.base_path);
	let listener = TcpListener::bind(config.bind_addr).await?;
	log::info!(
		"listening on {} under '{}' (pool size {})",
		config.bind_addr,
		if config.base_path.is_empty() { "/" } else { config.base_path.as_str() },
		config.pool_max_size
	);

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

	log::info!("server drained");
	db.close();
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			log::error!("failed to listen for SIGINT: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			}
			Err(e) => {
				log::error!("failed to listen for SIGTERM: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => log::info!("received SIGINT, shutting down"),
		_ = terminate => log::info!("received SIGTERM, shutting down"),
	}
}
