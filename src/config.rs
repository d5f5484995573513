use std::{env, net::SocketAddr};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("{name} has an invalid value '{value}': {reason}")]
	Invalid {
		name: &'static str,
		value: String,
		reason: String,
	},
}

/// Startup settings, read once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
	pub bind_addr: SocketAddr,
	pub database_url: String,
	pub pool_max_size: usize,
	pub base_path: String,
	pub init_schema: bool,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			bind_addr: SocketAddr::from(([0, 0, 0, 0], 4000)),
			database_url: "host=localhost user=postgres password=postgres dbname=car_rental".to_string(),
			pool_max_size: 10,
			base_path: "/api".to_string(),
			init_schema: true,
		}
	}
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Builds a config from any variable source; unset names keep their defaults.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut config = Config::default();

		if let Some(value) = lookup("BIND_ADDR") {
			config.bind_addr = value
				.trim()
				.parse()
				.map_err(|e: std::net::AddrParseError| invalid("BIND_ADDR", &value, &e.to_string()))?;
		}
		if let Some(value) = lookup("DATABASE_URL") {
			config.database_url = value;
		}
		if let Some(value) = lookup("POOL_MAX_SIZE") {
			config.pool_max_size = match value.trim().parse::<usize>() {
				Ok(size) if size > 0 => size,
				Ok(_) => return Err(invalid("POOL_MAX_SIZE", &value, "must be at least 1")),
				Err(e) => return Err(invalid("POOL_MAX_SIZE", &value, &e.to_string())),
			};
		}
		if let Some(value) = lookup("BASE_PATH") {
			config.base_path = normalize_base_path(&value);
		}
		if let Some(value) = lookup("INIT_SCHEMA") {
			config.init_schema = match value.trim().to_ascii_lowercase().as_str() {
				"1" | "true" | "yes" | "on" => true,
				"0" | "false" | "no" | "off" => false,
				_ => return Err(invalid("INIT_SCHEMA", &value, "expected true or false")),
			};
		}

		Ok(config)
	}
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
	ConfigError::Invalid {
		name,
		value: value.to_string(),
		reason: reason.to_string(),
	}
}

/// "api/" and "/api" both become "/api"; an empty path or "/" means the root.
fn normalize_base_path(raw: &str) -> String {
	let trimmed = raw.trim().trim_matches('/');
	if trimmed.is_empty() {
		String::new()
	} else {
		format!("/{}", trimmed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
		move |name| vars.get(name).cloned()
	}

	#[test]
	fn defaults_when_unset() {
		let config = Config::from_lookup(lookup(&[])).unwrap();
		assert_eq!(config.bind_addr.port(), 4000);
		assert_eq!(config.pool_max_size, 10);
		assert_eq!(config.base_path, "/api");
		assert!(config.init_schema);
	}

	#[test]
	fn reads_overrides() {
		let config = Config::from_lookup(lookup(&[
			("BIND_ADDR", "127.0.0.1:8080"),
			("POOL_MAX_SIZE", "3"),
			("BASE_PATH", "rental/"),
			("INIT_SCHEMA", "off"),
		]))
		.unwrap();
		assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
		assert_eq!(config.pool_max_size, 3);
		assert_eq!(config.base_path, "/rental");
		assert!(!config.init_schema);
	}

	#[test]
	fn root_base_path_is_empty() {
		let config = Config::from_lookup(lookup(&[("BASE_PATH", "/")])).unwrap();
		assert_eq!(config.base_path, "");
	}

	#[test]
	fn rejects_bad_values() {
		let err = Config::from_lookup(lookup(&[("POOL_MAX_SIZE", "0")])).unwrap_err();
		assert!(err.to_string().starts_with("POOL_MAX_SIZE"));
		assert!(Config::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])).is_err());
		assert!(Config::from_lookup(lookup(&[("INIT_SCHEMA", "maybe")])).is_err());
	}
}
