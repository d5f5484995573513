use std::error::Error;

use axum::{extract::State, routing::get, Json, Router};
use bytes::BytesMut;
use postgres_from_row::FromRow;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tokio_postgres::{
	types::{to_sql_checked, FromSql, IsNull, ToSql, Type},
	Row,
};

use crate::{
	error::{ApiError, ApiResult},
	extract::PathId,
	handlers,
	resource::{Resource, Table},
	store::Repo,
	users::User,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RentalFields {
	#[serde(rename = "CarID")]
	#[from_row(rename = "CarID")]
	pub car_id: i32,
	#[serde(rename = "UserID")]
	#[from_row(rename = "UserID")]
	pub user_id: i32,
	#[serde(rename = "StartDate")]
	#[from_row(rename = "StartDate")]
	pub start_date: String,
	#[serde(rename = "EndDate", default)]
	#[from_row(rename = "EndDate")]
	pub end_date: EndDate,
	#[serde(rename = "TotalAmount")]
	#[from_row(rename = "TotalAmount")]
	pub total_amount: f64,
}

/// A rental's end date, type-checked only when truthy. A string is stored
/// as sent. Absent, null, false and 0 store NULL, but the value a client
/// sent is what a write echoes back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndDate(Value);

impl EndDate {
	pub fn date(&self) -> Option<&str> {
		self.0.as_str()
	}

	/// What the store keeps: the date string or nothing.
	pub fn stored(&self) -> EndDate {
		EndDate::from(self.date().map(str::to_string))
	}
}

impl From<Option<String>> for EndDate {
	fn from(date: Option<String>) -> Self {
		EndDate(date.map_or(Value::Null, Value::String))
	}
}

impl Serialize for EndDate {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.0.serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for EndDate {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		match Value::deserialize(deserializer)? {
			Value::String(s) => Ok(EndDate(Value::String(s))),
			v if is_truthy(&v) => Err(D::Error::custom("EndDate must be a string")),
			v => Ok(EndDate(v)),
		}
	}
}

fn is_truthy(v: &Value) -> bool {
	match v {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

impl ToSql for EndDate {
	fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
		self.date().to_sql(ty, out)
	}

	fn accepts(ty: &Type) -> bool {
		<&str as ToSql>::accepts(ty)
	}

	to_sql_checked!();
}

impl<'a> FromSql<'a> for EndDate {
	fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
		Ok(EndDate::from(Some(String::from_sql(ty, raw)?)))
	}

	fn from_sql_null(_: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
		Ok(EndDate::default())
	}

	fn accepts(ty: &Type) -> bool {
		<String as FromSql>::accepts(ty)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Rental {
	#[serde(rename = "RentalID")]
	#[from_row(rename = "RentalID")]
	pub rental_id: i32,
	#[serde(flatten)]
	#[from_row(flatten)]
	pub fields: RentalFields,
}

impl Resource for Rental {
	type Fields = RentalFields;

	const NAME: &'static str = "Rental";
	const TABLE: Table = Table {
		name: "Rentals",
		key: "RentalID",
		columns: &["CarID", "UserID", "StartDate", "EndDate", "TotalAmount"],
	};

	fn assemble(rental_id: i32, fields: RentalFields) -> Self {
		Rental { rental_id, fields }
	}

	fn params(f: &RentalFields) -> Vec<&(dyn ToSql + Sync)> {
		vec![&f.car_id, &f.user_id, &f.start_date, &f.end_date, &f.total_amount]
	}

	fn try_from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
		<Rental as FromRow>::try_from_row(row)
	}

	fn stored(f: &RentalFields) -> RentalFields {
		RentalFields {
			end_date: f.end_date.stored(),
			..f.clone()
		}
	}
}

/// The shared CRUD routes plus the per-user listing.
pub fn routes(repo: Repo<Rental>) -> Router {
	handlers::routes::<Rental>("/rentals")
		.route("/rentals/user/:user_id", get(list_for_user))
		.with_state(repo)
}

async fn list_for_user(State(repo): State<Repo<Rental>>, PathId(id): PathId) -> ApiResult<Json<Vec<Rental>>> {
	let id = id.ok_or_else(ApiError::invalid_id::<User>)?;
	let Ok(user_id) = i32::try_from(id) else {
		return Ok(Json(Vec::new()));
	};
	let rentals = repo.list_by("UserID", user_id).await?;
	Ok(Json(rentals))
}
