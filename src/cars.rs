use std::{error::Error, fmt, str::FromStr};

use bytes::BytesMut;
use postgres_from_row::FromRow;
use serde::{Deserialize, Serialize};
use tokio_postgres::{
	types::{to_sql_checked, FromSql, IsNull, ToSql, Type},
	Row,
};

use crate::resource::{Resource, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarStatus {
	Available,
	Rented,
	Maintenance,
}

impl CarStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			CarStatus::Available => "Available",
			CarStatus::Rented => "Rented",
			CarStatus::Maintenance => "Maintenance",
		}
	}
}

impl fmt::Display for CarStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug)]
pub struct UnknownStatus(String);

impl fmt::Display for UnknownStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown car status '{}'", self.0)
	}
}

impl Error for UnknownStatus {}

impl FromStr for CarStatus {
	type Err = UnknownStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"Available" => Ok(CarStatus::Available),
			"Rented" => Ok(CarStatus::Rented),
			"Maintenance" => Ok(CarStatus::Maintenance),
			other => Err(UnknownStatus(other.to_string())),
		}
	}
}

// Stored as plain text so the column stays readable from any client.
impl ToSql for CarStatus {
	fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
		self.as_str().to_sql(ty, out)
	}

	fn accepts(ty: &Type) -> bool {
		<&str as ToSql>::accepts(ty)
	}

	to_sql_checked!();
}

impl<'a> FromSql<'a> for CarStatus {
	fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
		let s = <&str as FromSql>::from_sql(ty, raw)?;
		Ok(s.parse()?)
	}

	fn accepts(ty: &Type) -> bool {
		<&str as FromSql>::accepts(ty)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CarFields {
	#[serde(rename = "Make")]
	#[from_row(rename = "Make")]
	pub make: String,
	#[serde(rename = "Model")]
	#[from_row(rename = "Model")]
	pub model: String,
	#[serde(rename = "Year")]
	#[from_row(rename = "Year")]
	pub year: i32,
	#[serde(rename = "Color")]
	#[from_row(rename = "Color")]
	pub color: String,
	#[serde(rename = "LicensePlate")]
	#[from_row(rename = "LicensePlate")]
	pub license_plate: String,
	#[serde(rename = "DailyRate")]
	#[from_row(rename = "DailyRate")]
	pub daily_rate: f64,
	#[serde(rename = "Status")]
	#[from_row(rename = "Status")]
	pub status: CarStatus,
	#[serde(rename = "ImageURL")]
	#[from_row(rename = "ImageURL")]
	pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Car {
	#[serde(rename = "CarID")]
	#[from_row(rename = "CarID")]
	pub car_id: i32,
	#[serde(flatten)]
	#[from_row(flatten)]
	pub fields: CarFields,
}

impl Resource for Car {
	type Fields = CarFields;

	const NAME: &'static str = "Car";
	const TABLE: Table = Table {
		name: "Cars",
		key: "CarID",
		columns: &["Make", "Model", "Year", "Color", "LicensePlate", "DailyRate", "Status", "ImageURL"],
	};

	fn assemble(car_id: i32, fields: CarFields) -> Self {
		Car { car_id, fields }
	}

	fn params(f: &CarFields) -> Vec<&(dyn ToSql + Sync)> {
		vec![&f.make, &f.model, &f.year, &f.color, &f.license_plate, &f.daily_rate, &f.status, &f.image_url]
	}

	fn try_from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
		<Car as FromRow>::try_from_row(row)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn corolla() -> serde_json::Value {
		json!({
			"Make": "Toyota",
			"Model": "Corolla",
			"Year": 2020,
			"Color": "Blue",
			"LicensePlate": "ABC123",
			"DailyRate": 29.99,
			"Status": "Available",
			"ImageURL": "http://x/y.png"
		})
	}

	#[test]
	fn accepts_well_typed_body() {
		let fields: CarFields = serde_json::from_value(corolla()).unwrap();
		assert_eq!(fields.make, "Toyota");
		assert_eq!(fields.status, CarStatus::Available);
		assert_eq!(fields.daily_rate, 29.99);
	}

	#[test]
	fn integral_daily_rate_is_a_number() {
		let mut body = corolla();
		body["DailyRate"] = json!(30);
		let fields: CarFields = serde_json::from_value(body).unwrap();
		assert_eq!(fields.daily_rate, 30.0);
	}

	#[test]
	fn rejects_unknown_status() {
		let mut body = corolla();
		body["Status"] = json!("Broken");
		assert!(serde_json::from_value::<CarFields>(body).is_err());
	}

	#[test]
	fn rejects_stringly_typed_numbers() {
		let mut body = corolla();
		body["Year"] = json!("2020");
		assert!(serde_json::from_value::<CarFields>(body).is_err());

		let mut body = corolla();
		body["DailyRate"] = json!("29.99");
		assert!(serde_json::from_value::<CarFields>(body).is_err());
	}

	#[test]
	fn rejects_missing_field() {
		let mut body = corolla();
		body.as_object_mut().unwrap().remove("ImageURL");
		assert!(serde_json::from_value::<CarFields>(body).is_err());
	}

	#[test]
	fn serializes_with_store_column_names() {
		let fields: CarFields = serde_json::from_value(corolla()).unwrap();
		let car = Car::assemble(7, fields);
		let mut expected = corolla();
		expected["CarID"] = json!(7);
		assert_eq!(serde_json::to_value(&car).unwrap(), expected);
	}

	#[test]
	fn status_round_trips_through_text() {
		for status in [CarStatus::Available, CarStatus::Rented, CarStatus::Maintenance] {
			assert_eq!(status.to_string().parse::<CarStatus>().unwrap(), status);
		}
		assert!("available".parse::<CarStatus>().is_err());
	}
}
