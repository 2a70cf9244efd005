// ============================================================================
// NOTIFICATION VIEWMODEL - Buzón de avisos del usuario
// ============================================================================
// El feed lo alimenta el sincronizador; aquí viven la carga inicial y el
// marcado de lectura. El marcado es optimista: el cambio local se ve al
// instante y el backend lo confirma después.
// ============================================================================

use std::rc::Rc;

use crate::models::NotificationItem;
use crate::services::api_client::ApiClient;
use crate::services::notifier::Notifier;
use crate::state::feed::{now_iso, Feed};
use crate::state::reactivity::ReactiveState;

pub struct NotificationViewModel {
    api: ApiClient,
    pub feed: ReactiveState<Feed<NotificationItem>>,
    notifier: Rc<Notifier>,
}

impl NotificationViewModel {
    pub fn new(
        api: ApiClient,
        feed: ReactiveState<Feed<NotificationItem>>,
        notifier: Rc<Notifier>,
    ) -> Self {
        Self { api, feed, notifier }
    }

    pub fn unread_count(&self) -> u32 {
        self.feed.read(|feed| feed.unread_count())
    }

    /// Carga completa inicial: siembra el feed y deja la marca de agua en
    /// el aviso más reciente visto.
    pub async fn load(&self, token: &str) -> Result<(), String> {
        let data = self.api.fetch_notifications(token).await?;
        log::info!(
            "📬 {} avisos cargados ({} sin leer)",
            data.items.len(),
            data.unread_count
        );
        self.feed
            .update(|f| f.seed(data.items, Some(data.unread_count), &now_iso()));
        Ok(())
    }

    pub async fn mark_read(&self, token: &str, id: i64) {
        // Primero el cambio local, luego la persistencia
        self.feed.update(|f| {
            f.mark_read(id, &now_iso());
        });
        if let Err(message) = self.api.mark_notification_read(token, id).await {
            self.notifier.error(&message);
        }
    }

    pub async fn mark_all_read(&self, token: &str) {
        self.feed.update(|f| f.mark_all_read(&now_iso()));
        if let Err(message) = self.api.mark_all_notifications_read(token).await {
            self.notifier.error(&message);
        }
    }
}
