use std::fmt::Display;

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// PostgREST read/filter request against one table or view.
///
/// Values are URL-encoded when the path is rendered; values placed inside an
/// `or=(...)` group are additionally double-quoted so that commas, dots and
/// parentheses in user input stay literal.
#[derive(Debug, Clone)]
pub struct RestQuery {
    table: String,
    params: Vec<(String, String)>,
}

impl RestQuery {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            params: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns.to_string())
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("eq.{}", value))
    }

    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("neq.{}", value))
    }

    /// Case-insensitive substring match of `needle` against any of `columns`.
    pub fn any_contains(self, columns: &[&str], needle: &str) -> Self {
        let pattern = quote(&format!("*{}*", needle));
        let clauses: Vec<String> = columns
            .iter()
            .map(|column| format!("{}.ilike.{}", column, pattern))
            .collect();
        self.param("or", format!("({})", clauses.join(",")))
    }

    pub fn order(self, column: &str, order: Order) -> Self {
        self.param("order", format!("{}.{}", column, order.as_str()))
    }

    pub fn limit(self, limit: u64) -> Self {
        self.param("limit", limit.to_string())
    }

    pub fn offset(self, offset: u64) -> Self {
        self.param("offset", offset.to_string())
    }

    fn param(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }

    pub fn to_path(&self) -> String {
        let mut path = format!("/rest/v1/{}", self.table);

        if !self.params.is_empty() {
            let query: Vec<String> = self
                .params
                .iter()
                .map(|(key, value)| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
                })
                .collect();
            path.push('?');
            path.push_str(&query.join("&"));
        }

        path
    }
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Column assignments for a single PATCH. Only the fields that were set end
/// up in the rendered body.
#[derive(Debug, Clone, Default)]
pub struct Changeset {
    fields: Map<String, Value>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn set_some<V: Into<Value>>(self, field: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(field, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_body(self) -> Value {
        Value::Object(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_path_without_params() {
        assert_eq!(RestQuery::table("doctors").to_path(), "/rest/v1/doctors");
    }

    #[test]
    fn test_to_path_encodes_filters() {
        let path = RestQuery::table("appointments")
            .select("id")
            .eq("doctor_id", "d-1")
            .eq("appointment_date", "2025-03-01T09:00:00Z")
            .eq("slot", "09:00-09:30")
            .neq("status", "cancelled")
            .to_path();

        assert_eq!(
            path,
            "/rest/v1/appointments?select=id&doctor_id=eq.d-1\
             &appointment_date=eq.2025-03-01T09%3A00%3A00Z\
             &slot=eq.09%3A00-09%3A30&status=neq.cancelled"
        );
    }

    #[test]
    fn test_user_text_cannot_add_parameters() {
        let path = RestQuery::table("doctors")
            .eq("specialization", "Cardiology&limit=1000")
            .to_path();
        assert_eq!(path, "/rest/v1/doctors?specialization=eq.Cardiology%26limit%3D1000");
    }

    #[test]
    fn test_any_contains_quotes_needle() {
        let query = RestQuery::table("doctor_directory").any_contains(&["name", "specialization"], "smith");
        assert_eq!(
            query.params,
            vec![(
                "or".to_string(),
                r#"(name.ilike."*smith*",specialization.ilike."*smith*")"#.to_string()
            )]
        );

        let query = RestQuery::table("doctor_directory").any_contains(&["name"], r#"a,b"c"#);
        assert_eq!(query.params[0].1, r#"(name.ilike."*a,b\"c*")"#);
    }

    #[test]
    fn test_order_limit_offset() {
        let path = RestQuery::table("doctor_directory")
            .order("name", Order::Asc)
            .limit(20)
            .offset(40)
            .to_path();
        assert_eq!(path, "/rest/v1/doctor_directory?order=name.asc&limit=20&offset=40");
    }

    #[test]
    fn test_changeset_only_renders_set_fields() {
        let changes = Changeset::new()
            .set("updated_at", "2025-03-01T09:00:00Z")
            .set_some("slot", Some("morning"))
            .set_some::<String>("notes", None);

        assert_eq!(
            changes.into_body(),
            json!({ "updated_at": "2025-03-01T09:00:00Z", "slot": "morning" })
        );
    }

    #[test]
    fn test_changeset_empty() {
        assert!(Changeset::new().is_empty());
        assert_eq!(Changeset::new().into_body(), json!({}));
    }
}
