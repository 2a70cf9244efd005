use serde::{Deserialize, Serialize};

/// Entrada del buzón de avisos del usuario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub id: i64,
    pub notification_id: i64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub created_by_id: Option<i64>,
    #[serde(default)]
    pub read_at: Option<String>,
}

impl NotificationItem {
    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }
}

/// Respuesta de /notifications y de su long-poll
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationListResponse {
    #[serde(default)]
    pub items: Vec<NotificationItem>,
    #[serde(default)]
    pub unread_count: u32,
}
