use serde::{Deserialize, Serialize};

/// Rol del usuario autenticado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Cook,
    Student,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(default)]
    pub dietary_preferences: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Respuesta de /auth/login
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: User,
}

/// Cuerpo de /auth/register
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_preferences: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 3,
            "email": "ana@example.com",
            "full_name": "Ana",
            "role": "student"
        }))
        .unwrap();
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(
            serde_json::to_value(UserRole::Cook).unwrap(),
            serde_json::json!("cook")
        );
    }
}
