// ============================================================================
// APP - Composición de la aplicación
// ============================================================================
// Construye las capacidades compartidas (notifier, almacén, cliente HTTP),
// restaura la sesión y arranca/detiene los sincronizadores según el estado
// de autenticación.
// ============================================================================

use std::rc::Rc;

use chrono::Utc;
use wasm_bindgen_futures::spawn_local;

use crate::config::AppConfig;
use crate::models::UserRole;
use crate::services::api_client::ApiClient;
use crate::services::notifier::Notifier;
use crate::services::sync_service::{LongPollSync, MealIssueSource, NotificationSource};
use crate::utils::storage::{LocalStorage, StorageBackend};
use crate::viewmodels::{AuthViewModel, MenuViewModel, NotificationViewModel};

pub struct App {
    pub config: AppConfig,
    pub auth: Rc<AuthViewModel>,
    pub notifications_sync: LongPollSync<NotificationSource>,
    pub meal_issues_sync: LongPollSync<MealIssueSource>,
    pub notifications: Rc<NotificationViewModel>,
    pub menus: Rc<MenuViewModel>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let api = ApiClient::new();
        let storage: Rc<dyn StorageBackend> = Rc::new(LocalStorage);
        let notifier = Rc::new(Notifier::new(config.notifier_config.sound_throttle_ms));

        let auth = Rc::new(AuthViewModel::new(
            api.clone(),
            storage,
            Utc::now().timestamp_millis(),
        ));
        auth.watch_unauthorized();

        let notifications_sync = LongPollSync::new(
            NotificationSource::new(api.clone()),
            notifier.clone(),
            config.poll_config.retry_backoff_ms,
        );
        let meal_issues_sync = LongPollSync::new(
            MealIssueSource::new(api.clone()),
            notifier.clone(),
            config.poll_config.retry_backoff_ms,
        );

        let notifications = Rc::new(NotificationViewModel::new(
            api.clone(),
            notifications_sync.feed(),
            notifier.clone(),
        ));
        let menus = Rc::new(MenuViewModel::new(api, meal_issues_sync.feed(), notifier));

        Self {
            config,
            auth,
            notifications_sync,
            meal_issues_sync,
            notifications,
            menus,
        }
    }

    /// Alinea las tareas de fondo con el estado de sesión. Se llama al
    /// arrancar y en cada cambio de autenticación.
    pub fn sync_session_state(&self) {
        if self.auth.check_token_expiry(Utc::now().timestamp_millis()) {
            // El logout forzado vuelve a disparar esta función vía subscribers
            return;
        }

        let token = match self.auth.token() {
            Some(token) if self.auth.is_authenticated() => token,
            _ => {
                self.notifications_sync.stop();
                self.meal_issues_sync.stop();
                return;
            }
        };

        if !self.notifications_sync.is_active() {
            self.notifications_sync.start(token.clone());
            let notifications = self.notifications.clone();
            let task_token = token.clone();
            spawn_local(async move {
                if let Err(error) = notifications.load(&task_token).await {
                    log::error!("❌ Carga inicial de avisos fallida: {}", error);
                }
            });
        }

        // Las entregas por long-poll son cosa del alumno
        let is_student = self
            .auth
            .state
            .read(|s| s.user.as_ref().map(|u| u.role) == Some(UserRole::Student));
        if is_student {
            if !self.meal_issues_sync.is_active() {
                self.meal_issues_sync.start(token.clone());
                let menus = self.menus.clone();
                spawn_local(async move {
                    menus.load_all(&token).await;
                });
            }
        } else {
            self.meal_issues_sync.stop();
        }
    }
}
