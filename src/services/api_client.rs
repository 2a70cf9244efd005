// ============================================================================
// API CLIENT - Gateway HTTP hacia el backend del comedor
// ============================================================================
// Toda petición pasa por `call`: prefijo de URL, token Bearer, cuerpos JSON
// o de formulario, y normalización de errores a mensajes legibles.
// Ante un 401 con token emite la señal de sesión invalidada y nada más:
// el estado de sesión decide qué hacer con ella.
// ============================================================================

use serde::de::DeserializeOwned;
use serde_json::Value;

use gloo_net::http::{Request, RequestBuilder};

use crate::models::{
    MealIssue, MealIssueListResponse, MenuListResponse, NotificationItem,
    NotificationListResponse, Payment, PaymentListResponse, RegisterRequest, TokenResponse, User,
};
use crate::services::session_events;
use crate::utils::constants::API_BASE;

pub const SESSION_EXPIRED_MESSAGE: &str = "Sesión expirada. Inicia sesión de nuevo.";
const GENERIC_ERROR_MESSAGE: &str = "Error en la petición";

/// Cuerpo de la petición saliente
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// Opciones de una llamada al backend
pub struct CallOptions {
    method: &'static str,
    token: Option<String>,
    body: Option<RequestBody>,
}

impl CallOptions {
    pub fn get() -> Self {
        Self { method: "GET", token: None, body: None }
    }

    pub fn post() -> Self {
        Self { method: "POST", token: None, body: None }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }
}

/// Cuerpo de la respuesta, ya leído
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Json(Value),
    Text(String),
}

impl ApiBody {
    fn into_typed<T: DeserializeOwned>(self) -> Result<T, String> {
        match self {
            ApiBody::Json(value) => serde_json::from_value(value)
                .map_err(|e| format!("Error al interpretar la respuesta: {}", e)),
            ApiBody::Text(_) => Err("Respuesta inesperada del backend (no es JSON)".to_string()),
        }
    }
}

/// Extrae un mensaje legible de un cuerpo de error del backend.
/// Preferencia: `detail` | `message`; una lista de errores de validación se
/// une por los campos `msg`.
pub fn extract_error_message(body: &ApiBody) -> String {
    match body {
        ApiBody::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                GENERIC_ERROR_MESSAGE.to_string()
            } else {
                trimmed.to_string()
            }
        }
        ApiBody::Json(payload) => {
            let detail = payload.get("detail").or_else(|| payload.get("message"));
            match detail {
                Some(Value::String(message)) => message.clone(),
                Some(Value::Array(entries)) => entries
                    .iter()
                    .map(|entry| match entry.get("msg").and_then(Value::as_str) {
                        Some(msg) => msg.to_string(),
                        None => entry.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => GENERIC_ERROR_MESSAGE.to_string(),
            }
        }
    }
}

/// Cliente del backend: solo comunicación HTTP, sin estado propio
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new() -> Self {
        Self { base_url: API_BASE.to_string() }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self { base_url: base_url.to_string() }
    }

    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }
        if path.starts_with('/') {
            return format!("{}{}", self.base_url, path);
        }
        format!("{}/{}", self.base_url, path)
    }

    /// Llamada genérica al backend. Resuelve con el cuerpo (JSON o texto
    /// según el content-type) en 2xx; en otro caso devuelve un mensaje.
    pub async fn call(&self, path: &str, options: CallOptions) -> Result<ApiBody, String> {
        let url = self.build_url(path);
        let mut builder: RequestBuilder = match options.method {
            "POST" => Request::post(&url),
            "PUT" => Request::put(&url),
            "DELETE" => Request::delete(&url),
            _ => Request::get(&url),
        };

        if let Some(token) = &options.token {
            builder = builder.header("Authorization", &format!("Bearer {}", token));
        }

        let request = match options.body {
            None => builder
                .build()
                .map_err(|e| format!("Error construyendo la petición: {}", e))?,
            Some(RequestBody::Json(value)) => builder
                .json(&value)
                .map_err(|e| format!("Error serializando la petición: {}", e))?,
            Some(RequestBody::Form(fields)) => {
                let params = web_sys::UrlSearchParams::new()
                    .map_err(|_| "Error construyendo el formulario".to_string())?;
                for (key, value) in &fields {
                    params.append(key, value);
                }
                builder
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(String::from(params.to_string()))
                    .map_err(|e| format!("Error construyendo la petición: {}", e))?
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| format!("Error de red: {}", e))?;

        let content_type = response
            .headers()
            .get("content-type")
            .unwrap_or_default();
        let body = if content_type.contains("application/json") {
            ApiBody::Json(
                response
                    .json::<Value>()
                    .await
                    .map_err(|e| format!("Error al interpretar la respuesta: {}", e))?,
            )
        } else {
            ApiBody::Text(response.text().await.unwrap_or_default())
        };

        if !response.ok() {
            if response.status() == 401 && options.token.is_some() {
                session_events::emit_session_invalidated();
                return Err(SESSION_EXPIRED_MESSAGE.to_string());
            }
            return Err(extract_error_message(&body));
        }

        Ok(body)
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        path: &str,
        options: CallOptions,
    ) -> Result<T, String> {
        self.call(path, options).await?.into_typed()
    }

    // ==========================================
    // AUTENTICACIÓN
    // ==========================================

    /// Login con formulario (username/password), como espera el backend
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, String> {
        self.call_typed(
            "/auth/login",
            CallOptions::post().with_form(vec![
                ("username".to_string(), username.to_string()),
                ("password".to_string(), password.to_string()),
            ]),
        )
        .await
    }

    pub async fn register(&self, payload: &RegisterRequest) -> Result<User, String> {
        let body = serde_json::to_value(payload)
            .map_err(|e| format!("Error serializando la petición: {}", e))?;
        self.call_typed("/auth/register", CallOptions::post().with_json(body))
            .await
    }

    // ==========================================
    // NOTIFICACIONES
    // ==========================================

    pub async fn fetch_notifications(
        &self,
        token: &str,
    ) -> Result<NotificationListResponse, String> {
        self.call_typed("/notifications", CallOptions::get().with_token(token))
            .await
    }

    /// Long-poll: el servidor retiene la respuesta hasta que haya novedades
    /// o venza su propio timeout. Sin timeout en el cliente.
    pub async fn long_poll_notifications(
        &self,
        token: &str,
        since: &str,
    ) -> Result<NotificationListResponse, String> {
        let since = String::from(js_sys::encode_uri_component(since));
        self.call_typed(
            &format!("/notifications/long-poll?since={}", since),
            CallOptions::get().with_token(token),
        )
        .await
    }

    pub async fn mark_notification_read(
        &self,
        token: &str,
        id: i64,
    ) -> Result<NotificationItem, String> {
        self.call_typed(
            &format!("/notifications/{}/read", id),
            CallOptions::post().with_token(token),
        )
        .await
    }

    pub async fn mark_all_notifications_read(&self, token: &str) -> Result<(), String> {
        self.call("/notifications/read-all", CallOptions::post().with_token(token))
            .await?;
        Ok(())
    }

    // ==========================================
    // ENTREGAS DE COMIDA
    // ==========================================

    pub async fn fetch_meal_issues(&self, token: &str) -> Result<MealIssueListResponse, String> {
        self.call_typed("/meal-issues/me", CallOptions::get().with_token(token))
            .await
    }

    pub async fn long_poll_meal_issues(
        &self,
        token: &str,
        since: &str,
    ) -> Result<MealIssueListResponse, String> {
        let since = String::from(js_sys::encode_uri_component(since));
        self.call_typed(
            &format!("/meal-issues/me/long-poll?since={}", since),
            CallOptions::get().with_token(token),
        )
        .await
    }

    /// Confirmar la recepción de un menú ya servido
    pub async fn confirm_meal(&self, token: &str, menu_id: i64) -> Result<MealIssue, String> {
        self.call_typed(
            "/meal-issues/me",
            CallOptions::post()
                .with_token(token)
                .with_json(serde_json::json!({ "menu_id": menu_id })),
        )
        .await
    }

    /// Reclamar un menú cubierto por abono (crea la entrega en `issued`)
    pub async fn issue_from_subscription(
        &self,
        token: &str,
        menu_id: i64,
    ) -> Result<MealIssue, String> {
        self.call_typed(
            "/meal-issues/me/issue",
            CallOptions::post()
                .with_token(token)
                .with_json(serde_json::json!({ "menu_id": menu_id })),
        )
        .await
    }

    // ==========================================
    // MENÚS Y PAGOS
    // ==========================================

    pub async fn fetch_menus(&self, token: &str) -> Result<MenuListResponse, String> {
        self.call_typed("/menus/", CallOptions::get().with_token(token))
            .await
    }

    pub async fn fetch_payments(&self, token: &str) -> Result<PaymentListResponse, String> {
        self.call_typed("/payments/me", CallOptions::get().with_token(token))
            .await
    }

    pub async fn pay_one_time(&self, token: &str, menu_id: i64) -> Result<Payment, String> {
        self.call_typed(
            "/payments/one-time",
            CallOptions::post()
                .with_token(token)
                .with_json(serde_json::json!({ "menu_id": menu_id })),
        )
        .await
    }

    pub async fn pay_subscription(
        &self,
        token: &str,
        period_start: &str,
        period_end: &str,
    ) -> Result<Payment, String> {
        self.call_typed(
            "/payments/subscription",
            CallOptions::post()
                .with_token(token)
                .with_json(serde_json::json!({
                    "period_start": period_start,
                    "period_end": period_end,
                })),
        )
        .await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
