use serde::{Deserialize, Serialize};

/// Estado de una entrega de comida; solo avanza hacia adelante.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealIssueStatus {
    Issued,
    Served,
    Confirmed,
}

/// Derecho de un alumno sobre un menú concreto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealIssue {
    pub id: i64,
    pub user_id: i64,
    pub menu_id: i64,
    #[serde(default)]
    pub served_by_id: Option<i64>,
    pub status: MealIssueStatus,
    #[serde(default)]
    pub served_at: Option<String>,
    #[serde(default)]
    pub confirmed_at: Option<String>,
    pub created_at: String,
}

/// Respuesta de /meal-issues/me y de su long-poll
#[derive(Debug, Clone, Deserialize)]
pub struct MealIssueListResponse {
    #[serde(default)]
    pub items: Vec<MealIssue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_order_follows_lifecycle() {
        assert!(MealIssueStatus::Issued < MealIssueStatus::Served);
        assert!(MealIssueStatus::Served < MealIssueStatus::Confirmed);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::from_str::<MealIssueStatus>("\"served\"").unwrap(),
            MealIssueStatus::Served
        );
        assert_eq!(
            serde_json::to_string(&MealIssueStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
    }
}
