// ============================================================================
// SYNC SERVICE - Sincronización por long-poll
// ============================================================================
// Bucle secuencial por instancia: nunca hay dos peticiones en vuelo a la
// vez. Los fallos de red se reintentan con espera fija y sin molestar al
// usuario; la cancelación se comprueba tras cada punto de suspensión y los
// resultados que llegan después de desactivar se descartan.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;

use crate::models::{MealIssue, NotificationItem};
use crate::services::api_client::ApiClient;
use crate::services::notifier::Notifier;
use crate::state::feed::{now_iso, BatchOutcome, Feed, FeedBatch, FeedRecord};
use crate::state::reactivity::ReactiveState;

/// Origen de datos de una instancia del sincronizador
#[allow(async_fn_in_trait)]
pub trait PollSource: Clone + 'static {
    type Record: FeedRecord + 'static;

    /// Pide al backend los registros posteriores a `since`. El servidor
    /// retiene la respuesta; el cliente no aplica timeout propio.
    async fn poll(&self, token: &str, since: &str) -> Result<FeedBatch<Self::Record>, String>;

    /// Texto del aviso cuando llega un lote con novedades
    fn toast_message(&self, headline: Option<String>) -> String;

    /// Etiqueta para el log
    fn label(&self) -> &'static str;
}

/// Avisos del usuario: lotes genéricos con contador de no leídos
#[derive(Clone)]
pub struct NotificationSource {
    api: ApiClient,
}

impl NotificationSource {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl PollSource for NotificationSource {
    type Record = NotificationItem;

    async fn poll(&self, token: &str, since: &str) -> Result<FeedBatch<NotificationItem>, String> {
        let response = self.api.long_poll_notifications(token, since).await?;
        Ok(FeedBatch {
            items: response.items,
            unread_count: Some(response.unread_count),
        })
    }

    fn toast_message(&self, headline: Option<String>) -> String {
        headline.unwrap_or_else(|| "Nueva notificación".to_string())
    }

    fn label(&self) -> &'static str {
        "notificaciones"
    }
}

/// Entregas de comida del alumno: el aviso es siempre el mismo porque la
/// acción pendiente (confirmar la recepción) no depende del lote.
#[derive(Clone)]
pub struct MealIssueSource {
    api: ApiClient,
}

impl MealIssueSource {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl PollSource for MealIssueSource {
    type Record = MealIssue;

    async fn poll(&self, token: &str, since: &str) -> Result<FeedBatch<MealIssue>, String> {
        let response = self.api.long_poll_meal_issues(token, since).await?;
        Ok(FeedBatch { items: response.items, unread_count: None })
    }

    fn toast_message(&self, _headline: Option<String>) -> String {
        "Comida servida. Confirma la recepción.".to_string()
    }

    fn label(&self) -> &'static str {
        "entregas"
    }
}

/// Sincronizador de un feed contra su endpoint de long-poll
pub struct LongPollSync<S: PollSource> {
    source: S,
    feed: ReactiveState<Feed<S::Record>>,
    notifier: Rc<Notifier>,
    retry_backoff_ms: u32,
    active: Rc<Cell<bool>>,
    // Época del bucle: arrancar de nuevo invalida cualquier bucle anterior
    epoch: Rc<Cell<u32>>,
}

impl<S: PollSource> LongPollSync<S> {
    pub fn new(source: S, notifier: Rc<Notifier>, retry_backoff_ms: u32) -> Self {
        Self {
            source,
            feed: ReactiveState::new(Feed::new(&now_iso())),
            notifier,
            retry_backoff_ms,
            active: Rc::new(Cell::new(false)),
            epoch: Rc::new(Cell::new(0)),
        }
    }

    /// Handle compartido del feed (los clones ven el mismo estado)
    pub fn feed(&self) -> ReactiveState<Feed<S::Record>> {
        self.feed.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Arranca el bucle para la sesión actual. Un arranque posterior
    /// sustituye al bucle anterior (cambio de época).
    pub fn start(&self, token: String) {
        if token.is_empty() {
            log::warn!("⚠️ Sync {}: sin token, no se arranca", self.source.label());
            return;
        }

        self.active.set(true);
        let my_epoch = self.epoch.get().wrapping_add(1);
        self.epoch.set(my_epoch);

        let source = self.source.clone();
        let feed = self.feed.clone();
        let notifier = self.notifier.clone();
        let active = self.active.clone();
        let epoch = self.epoch.clone();
        let backoff = self.retry_backoff_ms;

        log::info!("🔄 Sync {}: bucle iniciado", source.label());

        spawn_local(async move {
            // Se consulta tras cada punto de suspensión
            let alive = || active.get() && epoch.get() == my_epoch;

            while alive() {
                let since = feed.read(|f| f.watermark().to_string());

                match source.poll(&token, &since).await {
                    Ok(batch) => {
                        // Resultado en vuelo tras desactivar: se descarta
                        if !alive() {
                            break;
                        }
                        let outcome = feed.update_with(|f| f.apply_batch(batch, &now_iso()));
                        match outcome {
                            BatchOutcome::Fresh { merged, headline } => {
                                log::info!(
                                    "📥 Sync {}: {} novedades",
                                    source.label(),
                                    merged
                                );
                                notifier.notify_new_data(&source.toast_message(headline));
                            }
                            BatchOutcome::Backlog { merged } => {
                                log::info!(
                                    "📥 Sync {}: {} registros previos (sin aviso)",
                                    source.label(),
                                    merged
                                );
                            }
                            BatchOutcome::Empty => {}
                        }
                    }
                    Err(error) => {
                        // Fallo transitorio: espera fija, sin tocar la marca
                        // de agua y sin avisar al usuario
                        log::debug!("🔁 Sync {}: reintento tras fallo: {}", source.label(), error);
                        TimeoutFuture::new(backoff).await;
                    }
                }
            }

            log::info!("🛑 Sync {}: bucle detenido", source.label());
        });
    }

    /// Desactiva el bucle; no se emiten más peticiones tras la actual
    pub fn stop(&self) {
        self.active.set(false);
    }
}
