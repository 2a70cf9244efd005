// ============================================================================
// AUTH VIEWMODEL - Login, registro y cierre de sesión
// ============================================================================
// Máquina de estados: anónimo -> autenticado -> anónimo. Las transiciones
// salen de aquí; el gateway solo aporta la señal de 401.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use crate::models::RegisterRequest;
use crate::services::api_client::ApiClient;
use crate::services::session_events;
use crate::state::reactivity::ReactiveState;
use crate::stores::auth_store::AuthStore;
use crate::utils::jwt;
use crate::utils::storage::StorageBackend;

/// Resultado estructurado de login/registro: nunca lanza, siempre informa
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub ok: bool,
    pub message: Option<String>,
}

impl AuthOutcome {
    fn success() -> Self {
        Self { ok: true, message: None }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self { ok: false, message: Some(message.into()) }
    }
}

/// Datos del formulario de registro de alumnos
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub dietary_preferences: Option<String>,
}

/// Normaliza el identificador y valida que haya credenciales completas
fn validate_credentials(identifier: &str, password: &str) -> Result<String, String> {
    let login = identifier.trim().to_lowercase();
    if login.is_empty() || password.is_empty() {
        return Err("Completa el correo y la contraseña.".to_string());
    }
    Ok(login)
}

fn validate_register_form(form: &RegisterForm) -> Result<(String, String), String> {
    let email = form.email.trim().to_lowercase();
    let full_name = form.full_name.trim().to_string();
    if email.is_empty() || full_name.is_empty() || form.password.is_empty() {
        return Err("Completa los campos obligatorios.".to_string());
    }
    Ok((email, full_name))
}

pub struct AuthViewModel {
    api: ApiClient,
    storage: Rc<dyn StorageBackend>,
    pub state: ReactiveState<AuthStore>,
    watching_unauthorized: Cell<bool>,
}

impl AuthViewModel {
    /// Restaura la sesión persistida (si el token sigue vigente)
    pub fn new(api: ApiClient, storage: Rc<dyn StorageBackend>, now_ms: i64) -> Self {
        let restored = AuthStore::load(storage.as_ref(), now_ms);
        if restored.is_authenticated() {
            log::info!("🔐 Sesión restaurada desde el almacén");
        }
        Self {
            api,
            storage,
            state: ReactiveState::new(restored),
            watching_unauthorized: Cell::new(false),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state.read(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read(AuthStore::is_authenticated)
    }

    pub async fn login(&self, identifier: &str, password: &str) -> AuthOutcome {
        let login = match validate_credentials(identifier, password) {
            Ok(login) => login,
            Err(message) => return AuthOutcome::failure(message),
        };

        match self.api.login(&login, password).await {
            Ok(response) => {
                if let Err(error) =
                    AuthStore::persist(self.storage.as_ref(), &response.user, &response.access_token)
                {
                    log::error!("💾 No se pudo persistir la sesión: {}", error);
                }
                self.state.update(|s| {
                    s.user = Some(response.user.clone());
                    s.token = Some(response.access_token.clone());
                });
                log::info!("✅ Sesión iniciada: {}", login);
                AuthOutcome::success()
            }
            Err(message) => AuthOutcome::failure(message),
        }
    }

    /// Registro de alumno con login automático al terminar
    pub async fn register(&self, form: RegisterForm) -> AuthOutcome {
        let (email, full_name) = match validate_register_form(&form) {
            Ok(values) => values,
            Err(message) => return AuthOutcome::failure(message),
        };

        let payload = RegisterRequest {
            email: email.clone(),
            password: form.password.clone(),
            full_name,
            dietary_preferences: form
                .dietary_preferences
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        };

        if let Err(message) = self.api.register(&payload).await {
            return AuthOutcome::failure(message);
        }

        self.login(&email, &form.password).await
    }

    /// Idempotente: puede llegar desde el usuario, la señal de 401 o el
    /// vencimiento del token, incluso varias veces seguidas.
    pub fn logout(&self) {
        AuthStore::clear(self.storage.as_ref());
        self.state.update(|s| {
            s.user = None;
            s.token = None;
        });
        log::info!("👋 Sesión cerrada");
    }

    /// ¿El token venció? Si venció, fuerza el cierre de sesión.
    pub fn check_token_expiry(&self, now_ms: i64) -> bool {
        let expired = self
            .state
            .read(|s| s.token.as_deref().map(|t| jwt::is_expired(t, now_ms)))
            .unwrap_or(false);
        if expired {
            log::info!("⌛ Token vencido: cierre de sesión forzado");
            self.logout();
        }
        expired
    }

    /// Engancha el cierre de sesión a la señal de 401 del gateway.
    /// Solo se registra una vez por instancia.
    pub fn watch_unauthorized(&self) {
        if self.watching_unauthorized.get() {
            log::warn!("⚠️ watch_unauthorized ya estaba registrado");
            return;
        }
        self.watching_unauthorized.set(true);

        let state = self.state.clone();
        let storage = self.storage.clone();
        session_events::on_session_invalidated(move || {
            AuthStore::clear(storage.as_ref());
            state.update(|s| {
                s.user = None;
                s.token = None;
            });
            log::info!("🔒 Sesión invalidada por el backend");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, UserRole};
    use crate::utils::storage::MemoryStorage;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn viewmodel_with(storage: Rc<MemoryStorage>) -> AuthViewModel {
        AuthViewModel::new(ApiClient::with_base_url("/api"), storage, 0)
    }

    fn token_with_exp(exp_secs: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp_secs }).to_string().as_bytes());
        format!("{}.{}.firma", header, payload)
    }

    fn seeded_state(token: &str) -> AuthStore {
        AuthStore {
            user: Some(User {
                id: 7,
                email: "ana@example.com".to_string(),
                full_name: "Ana".to_string(),
                role: UserRole::Student,
                dietary_preferences: None,
                is_active: Some(true),
                created_at: None,
            }),
            token: Some(token.to_string()),
        }
    }

    #[test]
    fn test_credentials_are_normalized() {
        assert_eq!(
            validate_credentials("  Ana@Example.COM ", "secreto"),
            Ok("ana@example.com".to_string())
        );
    }

    #[test]
    fn test_empty_credentials_fail_fast() {
        assert!(validate_credentials("", "secreto").is_err());
        assert!(validate_credentials("   ", "secreto").is_err());
        assert!(validate_credentials("ana@example.com", "").is_err());
    }

    #[test]
    fn test_register_form_requires_fields() {
        let mut form = RegisterForm {
            email: " Ana@Example.com ".to_string(),
            full_name: " Ana García ".to_string(),
            password: "secreto123".to_string(),
            dietary_preferences: None,
        };
        assert_eq!(
            validate_register_form(&form),
            Ok(("ana@example.com".to_string(), "Ana García".to_string()))
        );

        form.full_name = "  ".to_string();
        assert!(validate_register_form(&form).is_err());
    }

    #[test]
    fn test_expired_token_forces_logout() {
        let storage = Rc::new(MemoryStorage::new());
        let vm = viewmodel_with(storage);
        vm.state.set(seeded_state(&token_with_exp(1_000)));

        assert!(vm.check_token_expiry(2_000_000));
        assert!(!vm.is_authenticated());
        // Repetir no falla ni cambia nada
        assert!(!vm.check_token_expiry(2_000_000));
    }

    #[test]
    fn test_undecodable_token_does_not_force_logout() {
        let storage = Rc::new(MemoryStorage::new());
        let vm = viewmodel_with(storage);
        vm.state.set(seeded_state("token-opaco"));

        assert!(!vm.check_token_expiry(i64::MAX));
        assert!(vm.is_authenticated());
    }

    #[test]
    fn test_unauthorized_signal_clears_session() {
        session_events::clear_subscribers();
        let storage = Rc::new(MemoryStorage::new());
        let vm = viewmodel_with(storage.clone());
        vm.state.set(seeded_state(&token_with_exp(2_000_000_000)));
        vm.watch_unauthorized();
        // La segunda llamada no duplica el registro
        vm.watch_unauthorized();

        session_events::emit_session_invalidated();
        assert!(!vm.is_authenticated());
        assert!(storage.get("comedor_token").is_none());

        // Señal repetida sobre sesión ya cerrada: inofensiva
        session_events::emit_session_invalidated();
        assert!(!vm.is_authenticated());
        session_events::clear_subscribers();
    }

    #[test]
    fn test_logout_is_idempotent() {
        let storage = Rc::new(MemoryStorage::new());
        let vm = viewmodel_with(storage);
        vm.state.set(seeded_state(&token_with_exp(2_000_000_000)));
        vm.logout();
        vm.logout();
        assert!(!vm.is_authenticated());
    }
}
