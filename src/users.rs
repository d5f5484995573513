use postgres_from_row::FromRow;
use serde::{Deserialize, Serialize};
use tokio_postgres::{types::ToSql, Row};

use crate::resource::{Resource, Table};

// TODO: hash Password on write and drop it from responses once clients stop reading it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserFields {
	#[serde(rename = "Name")]
	#[from_row(rename = "Name")]
	pub name: String,
	#[serde(rename = "Email")]
	#[from_row(rename = "Email")]
	pub email: String,
	#[serde(rename = "Password")]
	#[from_row(rename = "Password")]
	pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
	#[serde(rename = "UserID")]
	#[from_row(rename = "UserID")]
	pub user_id: i32,
	#[serde(flatten)]
	#[from_row(flatten)]
	pub fields: UserFields,
}

impl Resource for User {
	type Fields = UserFields;

	const NAME: &'static str = "User";
	const TABLE: Table = Table {
		name: "Users",
		key: "UserID",
		columns: &["Name", "Email", "Password"],
	};

	fn assemble(user_id: i32, fields: UserFields) -> Self {
		User { user_id, fields }
	}

	fn params(f: &UserFields) -> Vec<&(dyn ToSql + Sync)> {
		vec![&f.name, &f.email, &f.password]
	}

	fn try_from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
		<User as FromRow>::try_from_row(row)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn requires_every_field_as_string() {
		let ok = json!({"Name": "Ada", "Email": "ada@example.com", "Password": "hunter2"});
		assert!(serde_json::from_value::<UserFields>(ok).is_ok());

		let missing = json!({"Name": "Ada", "Email": "ada@example.com"});
		assert!(serde_json::from_value::<UserFields>(missing).is_err());

		let numeric = json!({"Name": "Ada", "Email": "ada@example.com", "Password": 1234});
		assert!(serde_json::from_value::<UserFields>(numeric).is_err());
	}

	#[test]
	fn ignores_extra_fields() {
		let body = json!({"Name": "Ada", "Email": "a@b.c", "Password": "x", "Role": "admin"});
		let fields: UserFields = serde_json::from_value(body).unwrap();
		let user = User::assemble(3, fields);
		assert_eq!(
			serde_json::to_value(&user).unwrap(),
			json!({"UserID": 3, "Name": "Ada", "Email": "a@b.c", "Password": "x"})
		);
	}
}
