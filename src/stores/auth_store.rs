// ============================================================================
// AUTH STORE - Sesión autenticada (usuario + token)
// ============================================================================

use crate::models::User;
use crate::utils::jwt;
use crate::utils::storage::{load_json, save_json, StorageBackend};

const TOKEN_KEY: &str = "comedor_token";
const USER_KEY: &str = "comedor_user";

/// Estado de sesión: anónimo (campos vacíos) o autenticado
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthStore {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl AuthStore {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// Restaura la sesión persistida. Un token ya vencido se descarta y se
    /// limpia el almacén, igual que un logout.
    pub fn load(storage: &dyn StorageBackend, now_ms: i64) -> Self {
        let token = match storage.get(TOKEN_KEY) {
            Some(token) => token,
            None => return Self::default(),
        };
        if jwt::is_expired(&token, now_ms) {
            log::info!("⌛ Token persistido vencido: sesión descartada");
            Self::clear(storage);
            return Self::default();
        }
        let user: Option<User> = load_json(storage, USER_KEY);
        if user.is_none() {
            Self::clear(storage);
            return Self::default();
        }
        Self { user, token: Some(token) }
    }

    pub fn persist(
        storage: &dyn StorageBackend,
        user: &User,
        token: &str,
    ) -> Result<(), String> {
        save_json(storage, USER_KEY, user)?;
        storage.set(TOKEN_KEY, token)
    }

    /// Idempotente: limpiar dos veces no es un error
    pub fn clear(storage: &dyn StorageBackend) {
        let _ = storage.remove(USER_KEY);
        let _ = storage.remove(TOKEN_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::utils::storage::MemoryStorage;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn user() -> User {
        User {
            id: 7,
            email: "ana@example.com".to_string(),
            full_name: "Ana".to_string(),
            role: UserRole::Student,
            dietary_preferences: None,
            is_active: Some(true),
            created_at: None,
        }
    }

    fn token_with_exp(exp_secs: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp_secs }).to_string().as_bytes());
        format!("{}.{}.firma", header, payload)
    }

    #[test]
    fn test_persist_and_load_roundtrip() {
        let storage = MemoryStorage::new();
        let token = token_with_exp(2_000_000_000);
        AuthStore::persist(&storage, &user(), &token).unwrap();

        let loaded = AuthStore::load(&storage, 1_000_000_000_000);
        assert!(loaded.is_authenticated());
        assert_eq!(loaded.token.as_deref(), Some(token.as_str()));
        assert_eq!(loaded.user.unwrap().email, "ana@example.com");
    }

    #[test]
    fn test_expired_token_is_dropped_on_load() {
        let storage = MemoryStorage::new();
        AuthStore::persist(&storage, &user(), &token_with_exp(1_000)).unwrap();

        let loaded = AuthStore::load(&storage, 2_000_000_000_000);
        assert!(!loaded.is_authenticated());
        // El almacén quedó limpio, no solo el estado en memoria
        assert!(storage.get(TOKEN_KEY).is_none());
        assert!(storage.get(USER_KEY).is_none());
    }

    #[test]
    fn test_undecodable_token_is_kept() {
        let storage = MemoryStorage::new();
        AuthStore::persist(&storage, &user(), "token-opaco-sin-formato").unwrap();
        let loaded = AuthStore::load(&storage, i64::MAX);
        assert!(loaded.is_authenticated());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let storage = MemoryStorage::new();
        AuthStore::persist(&storage, &user(), "t").unwrap();
        AuthStore::clear(&storage);
        AuthStore::clear(&storage);
        assert_eq!(AuthStore::load(&storage, 0), AuthStore::default());
    }
}
