use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The subset of a `users` row exposed alongside doctor and appointment
/// records. `id` is omitted where the joined view does not carry it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_with_id() {
        let summary = UserSummary {
            id: Some(Uuid::nil()),
            name: "Dr. Smith".into(),
            email: "smith@hospital.example".into(),
        };
        assert_eq!(serde_json::to_value(summary).unwrap(), json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "name": "Dr. Smith",
            "email": "smith@hospital.example"
        }));
    }

    #[test]
    fn test_summary_without_id() {
        let summary = UserSummary { id: None, name: "Dr. Smith".into(), email: "smith@hospital.example".into() };
        assert!(serde_json::to_value(summary).unwrap().get("id").is_none());
    }
}
