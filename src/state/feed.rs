// ============================================================================
// FEED - Colección local alimentada por long-poll
// ============================================================================
// Núcleo puro del sincronizador: fusión por id, marca de agua y supresión
// del primer lote. El bucle asíncrono vive en services/sync_service.rs.
// ============================================================================

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::models::{MealIssue, NotificationItem};

/// Instante actual en ISO-8601 UTC
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// El backend emite fechas ISO con o sin zona horaria; las sin zona son UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// ¿`candidate` es posterior a `reference`?
/// Si alguna no se puede interpretar, se comparan como cadenas.
fn is_later(candidate: &str, reference: &str) -> bool {
    match (parse_timestamp(candidate), parse_timestamp(reference)) {
        (Some(a), Some(b)) => a > b,
        _ => candidate > reference,
    }
}

/// Registro sincronizable por long-poll
pub trait FeedRecord: Clone {
    fn record_id(&self) -> i64;

    /// Marca temporal que mueve la marca de agua del feed
    fn event_time(&self) -> Option<&str>;

    /// Texto destacado para el aviso al usuario, si el registro lo aporta
    fn headline(&self) -> Option<String> {
        None
    }

    /// Integrar una versión entrante del mismo registro
    fn absorb(&mut self, incoming: Self) {
        *self = incoming;
    }
}

impl FeedRecord for NotificationItem {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn event_time(&self) -> Option<&str> {
        Some(self.created_at.as_str())
    }

    fn headline(&self) -> Option<String> {
        Some(self.title.clone())
    }
}

impl FeedRecord for MealIssue {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn event_time(&self) -> Option<&str> {
        self.served_at.as_deref().or(Some(self.created_at.as_str()))
    }

    /// El estado solo avanza: un lote rezagado con estado anterior se ignora
    fn absorb(&mut self, incoming: Self) {
        if incoming.status < self.status {
            return;
        }
        *self = incoming;
    }
}

/// Lote devuelto por un endpoint de long-poll o por el fetch inicial
#[derive(Debug, Clone)]
pub struct FeedBatch<T> {
    pub items: Vec<T>,
    pub unread_count: Option<u32>,
}

/// Resultado de aplicar un lote al feed
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Lote vacío: la marca de agua avanza, sin efectos visibles
    Empty,
    /// Primer lote tras la activación: datos absorbidos sin avisar
    Backlog { merged: usize },
    /// Lote con novedades: toca avisar al usuario (una sola vez por lote)
    Fresh {
        merged: usize,
        headline: Option<String>,
    },
}

/// Colección local ordenada (más reciente primero) y fusionada por id
#[derive(Debug, Clone)]
pub struct Feed<T: FeedRecord> {
    items: Vec<T>,
    watermark: String,
    initialized: bool,
    unread_count: Option<u32>,
}

impl<T: FeedRecord> Feed<T> {
    pub fn new(now: &str) -> Self {
        Self {
            items: Vec::new(),
            watermark: now.to_string(),
            initialized: false,
            unread_count: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn watermark(&self) -> &str {
        &self.watermark
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn unread_count(&self) -> u32 {
        self.unread_count.unwrap_or(0)
    }

    pub fn find(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.record_id() == id)
    }

    /// Carga completa inicial (o recarga): reemplaza los elementos.
    /// La marca de agua solo avanza, nunca retrocede.
    pub fn seed(&mut self, items: Vec<T>, unread_count: Option<u32>, now: &str) {
        if let Some(count) = unread_count {
            self.unread_count = Some(count);
        }
        self.items = items;
        self.sort();
        let event_times: Vec<String> = self
            .items
            .iter()
            .filter_map(|item| item.event_time().map(str::to_string))
            .collect();
        let mut advanced = false;
        for time in &event_times {
            advanced |= self.advance_watermark(time);
        }
        if !advanced {
            self.advance_watermark(now);
        }
    }

    /// Aplicar un lote del long-poll. Fusión por id idempotente; la marca de
    /// agua avanza por `max` para tolerar lotes repetidos o desordenados.
    pub fn apply_batch(&mut self, batch: FeedBatch<T>, now: &str) -> BatchOutcome {
        if let Some(count) = batch.unread_count {
            self.unread_count = Some(count);
        }

        if batch.items.is_empty() {
            // Sin novedades: avanzar para no re-pedir un rango vacío
            self.advance_watermark(now);
            self.initialized = true;
            return BatchOutcome::Empty;
        }

        let headline = batch.items.first().and_then(FeedRecord::headline);
        let event_times: Vec<String> = batch
            .items
            .iter()
            .filter_map(|item| item.event_time().map(str::to_string))
            .collect();

        let merged = self.merge(batch.items);
        for time in &event_times {
            self.advance_watermark(time);
        }

        let first_batch = !self.initialized;
        self.initialized = true;
        if first_batch {
            BatchOutcome::Backlog { merged }
        } else {
            BatchOutcome::Fresh { merged, headline }
        }
    }

    /// Mutar un elemento por id; devuelve si existía
    pub fn update_item(&mut self, id: i64, mutate: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|item| item.record_id() == id) {
            Some(item) => {
                mutate(item);
                true
            }
            None => false,
        }
    }

    fn merge(&mut self, incoming: Vec<T>) -> usize {
        let merged = incoming.len();
        for item in incoming {
            match self
                .items
                .iter_mut()
                .find(|existing| existing.record_id() == item.record_id())
            {
                Some(existing) => existing.absorb(item),
                None => self.items.push(item),
            }
        }
        self.sort();
        merged
    }

    fn sort(&mut self) {
        self.items.sort_by(|a, b| {
            let left = a.event_time().and_then(parse_timestamp);
            let right = b.event_time().and_then(parse_timestamp);
            right
                .cmp(&left)
                .then_with(|| b.record_id().cmp(&a.record_id()))
        });
    }

    fn advance_watermark(&mut self, candidate: &str) -> bool {
        if is_later(candidate, &self.watermark) {
            self.watermark = candidate.to_string();
            return true;
        }
        false
    }
}

impl Feed<NotificationItem> {
    /// Marcado optimista: el cambio local es visible antes de confirmar
    /// contra el backend.
    pub fn mark_read(&mut self, id: i64, now: &str) -> bool {
        let mut was_unread = false;
        let found = self.update_item(id, |item| {
            if item.read_at.is_none() {
                was_unread = true;
                item.read_at = Some(now.to_string());
            }
        });
        if was_unread {
            let current = self.unread_count();
            self.unread_count = Some(current.saturating_sub(1));
        }
        found
    }

    pub fn mark_all_read(&mut self, now: &str) {
        for item in &mut self.items {
            if item.read_at.is_none() {
                item.read_at = Some(now.to_string());
            }
        }
        self.unread_count = Some(0);
    }
}
