use car_rental_server::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = Config::from_env()?;
	car_rental_server::run(config).await
}
