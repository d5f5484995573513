//! The table-backed entity abstraction shared by cars, rentals and users.

use serde::{de::DeserializeOwned, Serialize};
use tokio_postgres::{types::ToSql, Row};

/// Layout of a resource table. Identifiers are quoted so the store keeps
/// the PascalCase column names the JSON bodies use.
#[derive(Debug)]
pub struct Table {
	pub name: &'static str,
	pub key: &'static str,
	pub columns: &'static [&'static str],
}

impl Table {
	fn column_list(&self) -> String {
		self.columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ")
	}

	fn select(&self) -> String {
		format!("SELECT {}, {} FROM {}", quote(self.key), self.column_list(), quote(self.name))
	}

	pub fn select_all(&self) -> String {
		format!("{} ORDER BY {}", self.select(), quote(self.key))
	}

	pub fn select_by(&self, column: &str) -> String {
		format!("{} WHERE {} = $1 ORDER BY {}", self.select(), quote(column), quote(self.key))
	}

	pub fn select_one(&self) -> String {
		format!("{} WHERE {} = $1", self.select(), quote(self.key))
	}

	pub fn insert(&self) -> String {
		let placeholders = (1..=self.columns.len()).map(|i| format!("${}", i)).collect::<Vec<_>>().join(", ");
		format!(
			"INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
			quote(self.name),
			self.column_list(),
			placeholders,
			quote(self.key)
		)
	}

	/// Full-record replace; the key is bound after every column.
	pub fn update(&self) -> String {
		let assignments = self
			.columns
			.iter()
			.enumerate()
			.map(|(i, c)| format!("{} = ${}", quote(c), i + 1))
			.collect::<Vec<_>>()
			.join(", ");
		format!(
			"UPDATE {} SET {} WHERE {} = ${}",
			quote(self.name),
			assignments,
			quote(self.key),
			self.columns.len() + 1
		)
	}

	pub fn delete(&self) -> String {
		format!("DELETE FROM {} WHERE {} = $1", quote(self.name), quote(self.key))
	}
}

fn quote(ident: &str) -> String {
	format!("\"{}\"", ident)
}

/// A record stored in one table: a store-assigned key plus the fields
/// clients send on create and update.
pub trait Resource: Serialize + Clone + Send + Sync + 'static {
	/// Request body schema, shared by create and update.
	type Fields: DeserializeOwned + Serialize + Clone + Send + Sync + 'static;

	/// Display name used in error messages ("Car not found").
	const NAME: &'static str;
	const TABLE: Table;

	fn assemble(id: i32, fields: Self::Fields) -> Self;

	/// Bind parameters in `TABLE.columns` order.
	fn params(fields: &Self::Fields) -> Vec<&(dyn ToSql + Sync)>;

	fn try_from_row(row: &Row) -> Result<Self, tokio_postgres::Error>;

	/// The fields a later read returns for a row written with `fields`.
	fn stored(fields: &Self::Fields) -> Self::Fields {
		fields.clone()
	}
}

/// Parses a path identifier the way a lenient integer parse does: leading
/// whitespace and an optional sign are accepted, then the leading run of
/// digits is the value. Anything else after the digits is ignored.
///
/// The value is not bounded to the key type. Callers treat an id that no
/// key can hold as parsed but absent.
pub fn parse_id(raw: &str) -> Option<i64> {
	let s = raw.trim_start();
	let (negative, rest) = match s.as_bytes().first() {
		Some(b'-') => (true, &s[1..]),
		Some(b'+') => (false, &s[1..]),
		_ => (false, s),
	};
	let digits = rest.bytes().take_while(u8::is_ascii_digit);
	let (count, magnitude) = digits.fold((0usize, 0i64), |(count, acc), b| {
		(count + 1, acc.saturating_mul(10).saturating_add(i64::from(b - b'0')))
	});
	if count == 0 {
		return None;
	}
	Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
	use super::*;

	const WIDGETS: Table = Table {
		name: "Widgets",
		key: "WidgetID",
		columns: &["Name", "Weight"],
	};

	#[test]
	fn builds_parameterized_statements() {
		assert_eq!(
			WIDGETS.select_all(),
			r#"SELECT "WidgetID", "Name", "Weight" FROM "Widgets" ORDER BY "WidgetID""#
		);
		assert_eq!(
			WIDGETS.select_one(),
			r#"SELECT "WidgetID", "Name", "Weight" FROM "Widgets" WHERE "WidgetID" = $1"#
		);
		assert_eq!(
			WIDGETS.insert(),
			r#"INSERT INTO "Widgets" ("Name", "Weight") VALUES ($1, $2) RETURNING "WidgetID""#
		);
		assert_eq!(
			WIDGETS.update(),
			r#"UPDATE "Widgets" SET "Name" = $1, "Weight" = $2 WHERE "WidgetID" = $3"#
		);
		assert_eq!(WIDGETS.delete(), r#"DELETE FROM "Widgets" WHERE "WidgetID" = $1"#);
	}

	#[test]
	fn select_by_filters_on_column() {
		assert_eq!(
			WIDGETS.select_by("Name"),
			r#"SELECT "WidgetID", "Name", "Weight" FROM "Widgets" WHERE "Name" = $1 ORDER BY "WidgetID""#
		);
	}

	#[test]
	fn parse_id_accepts_leading_digits() {
		assert_eq!(parse_id("42"), Some(42));
		assert_eq!(parse_id("  7"), Some(7));
		assert_eq!(parse_id("+3"), Some(3));
		assert_eq!(parse_id("-5"), Some(-5));
		assert_eq!(parse_id("12abc"), Some(12));
		assert_eq!(parse_id("3.9"), Some(3));
	}

	#[test]
	fn parse_id_rejects_non_numeric() {
		assert_eq!(parse_id("abc"), None);
		assert_eq!(parse_id(""), None);
		assert_eq!(parse_id("-"), None);
		assert_eq!(parse_id("x12"), None);
	}

	#[test]
	fn parse_id_is_not_bounded_by_the_key_type() {
		assert_eq!(parse_id("99999999999"), Some(99_999_999_999));
		assert_eq!(parse_id("-2147483649"), Some(-2_147_483_649));
		assert_eq!(parse_id("123456789012345678901234567890"), Some(i64::MAX));
		assert_eq!(parse_id("-123456789012345678901234567890"), Some(-i64::MAX));
	}
}
