// ============================================================================
// MENU VIEWMODEL - Menús, pagos y entregas del alumno
// ============================================================================
// Las entregas llegan del sincronizador; menús y pagos se cargan aquí.
// La clasificación por menú se deriva al vuelo con state::coverage.
// ============================================================================

use std::collections::HashMap;
use std::rc::Rc;

use crate::models::{MealIssue, MealIssueStatus, Menu, Payment};
use crate::services::api_client::ApiClient;
use crate::services::notifier::Notifier;
use crate::state::coverage::{self, MenuCoverage, SubscriptionStatus};
use crate::state::feed::{now_iso, Feed};
use crate::state::reactivity::ReactiveState;

/// Valida el periodo de un abono antes de llamar al backend
fn validate_subscription_period(period_start: &str, period_end: &str) -> Result<(), String> {
    if period_start.is_empty() || period_end.is_empty() {
        return Err("Selecciona el periodo del abono.".to_string());
    }
    if period_end < period_start {
        return Err("La fecha final no puede ser anterior a la inicial.".to_string());
    }
    Ok(())
}

/// ¿Hay una entrega servida (pendiente de confirmar) para este menú?
fn served_issue_for_menu(feed: &Feed<MealIssue>, menu_id: i64) -> bool {
    feed.items()
        .iter()
        .any(|issue| issue.menu_id == menu_id && issue.status == MealIssueStatus::Served)
}

pub struct MenuViewModel {
    api: ApiClient,
    notifier: Rc<Notifier>,
    pub menus: ReactiveState<Vec<Menu>>,
    pub payments: ReactiveState<Vec<Payment>>,
    /// Handle del feed del sincronizador de entregas (estado compartido)
    pub issues: ReactiveState<Feed<MealIssue>>,
    pub loading: ReactiveState<bool>,
    pub paying: ReactiveState<bool>,
    pub confirming_menu_id: ReactiveState<Option<i64>>,
}

impl MenuViewModel {
    pub fn new(
        api: ApiClient,
        issues: ReactiveState<Feed<MealIssue>>,
        notifier: Rc<Notifier>,
    ) -> Self {
        Self {
            api,
            notifier,
            menus: ReactiveState::new(Vec::new()),
            payments: ReactiveState::new(Vec::new()),
            issues,
            loading: ReactiveState::new(false),
            paying: ReactiveState::new(false),
            confirming_menu_id: ReactiveState::new(None),
        }
    }

    /// Carga inicial de menús, pagos y entregas. Los fallos parciales se
    /// juntan en un único aviso; lo que sí llegó se queda.
    pub async fn load_all(&self, token: &str) {
        self.loading.set(true);
        let mut errors: Vec<String> = Vec::new();

        match self.api.fetch_menus(token).await {
            Ok(response) => self.menus.set(response.items),
            Err(message) => errors.push(message),
        }

        match self.api.fetch_payments(token).await {
            Ok(response) => self.payments.set(response.items),
            Err(message) => errors.push(message),
        }

        match self.api.fetch_meal_issues(token).await {
            Ok(response) => {
                self.issues
                    .update(|feed| feed.seed(response.items, None, &now_iso()));
            }
            Err(message) => errors.push(message),
        }

        self.loading.set(false);
        if !errors.is_empty() {
            self.notifier.error(&errors.join(" "));
        }
    }

    /// Clasificación derivada de cada menú (se recalcula en cada llamada)
    pub fn classification(&self) -> HashMap<i64, MenuCoverage> {
        let menus = self.menus.snapshot();
        let payments = self.payments.snapshot();
        self.issues
            .read(|feed| coverage::classify(&menus, &payments, feed.items()))
    }

    pub fn subscription_status(&self, today: &str) -> SubscriptionStatus {
        self.payments
            .read(|payments| coverage::subscription_status(today, payments))
    }

    pub fn suggested_subscription_start(&self, today: &str) -> String {
        self.payments
            .read(|payments| coverage::next_subscription_start(today, payments))
    }

    /// Acción del botón de pago: si el abono ya cubre el menú se reclama la
    /// entrega; si no, se cobra el pago puntual.
    pub async fn pay_or_claim(&self, token: &str, menu: &Menu) {
        let covered = self
            .payments
            .read(|payments| coverage::covered_by_subscription(&menu.menu_date, payments));
        if covered {
            self.claim_from_subscription(token, menu.id).await;
        } else {
            self.pay_menu(token, menu.id).await;
        }
    }

    pub async fn pay_menu(&self, token: &str, menu_id: i64) {
        if self.paying.snapshot() {
            return;
        }
        self.paying.set(true);
        match self.api.pay_one_time(token, menu_id).await {
            Ok(_) => {
                self.notifier.success("Pago del menú realizado.");
                self.refresh_payments_and_issues(token).await;
            }
            Err(message) => self.notifier.error(&message),
        }
        self.paying.set(false);
    }

    pub async fn pay_subscription(&self, token: &str, period_start: &str, period_end: &str) {
        if self.paying.snapshot() {
            return;
        }
        if let Err(message) = validate_subscription_period(period_start, period_end) {
            self.notifier.error(&message);
            return;
        }
        self.paying.set(true);
        match self.api.pay_subscription(token, period_start, period_end).await {
            Ok(payment) => {
                self.notifier.success(&format!(
                    "Abono contratado: {} — {} por {} {}.",
                    payment.period_start.as_deref().unwrap_or(period_start),
                    payment.period_end.as_deref().unwrap_or(period_end),
                    payment.amount,
                    payment.currency
                ));
                self.refresh_payments_and_issues(token).await;
            }
            Err(message) => self.notifier.error(&message),
        }
        self.paying.set(false);
    }

    /// Menú cubierto por abono: crea la entrega sin pasar por caja
    pub async fn claim_from_subscription(&self, token: &str, menu_id: i64) {
        if self.paying.snapshot() {
            return;
        }
        self.paying.set(true);
        match self.api.issue_from_subscription(token, menu_id).await {
            Ok(_) => {
                self.notifier
                    .success("Menú apuntado para entrega con el abono.");
                self.refresh_payments_and_issues(token).await;
            }
            Err(message) => self.notifier.error(&message),
        }
        self.paying.set(false);
    }

    /// Confirmar la recepción; solo tiene sentido tras `served`
    pub async fn confirm_receipt(&self, token: &str, menu_id: i64) {
        let can_confirm = self
            .issues
            .read(|feed| served_issue_for_menu(feed, menu_id));
        if !can_confirm {
            self.notifier
                .error("La confirmación se abre cuando cocina marca la entrega.");
            return;
        }
        if self.confirming_menu_id.snapshot().is_some() {
            return;
        }
        self.confirming_menu_id.set(Some(menu_id));
        match self.api.confirm_meal(token, menu_id).await {
            Ok(_) => {
                self.notifier.success("Recepción confirmada. ¡Buen provecho!");
                self.refresh_payments_and_issues(token).await;
            }
            Err(message) => self.notifier.error(&message),
        }
        self.confirming_menu_id.set(None);
    }

    /// Tras cualquier mutación: recargar pagos y entregas del backend
    async fn refresh_payments_and_issues(&self, token: &str) {
        match self.api.fetch_payments(token).await {
            Ok(response) => self.payments.set(response.items),
            Err(message) => log::error!("❌ Recarga de pagos fallida: {}", message),
        }
        match self.api.fetch_meal_issues(token).await {
            Ok(response) => {
                self.issues
                    .update(|feed| feed.seed(response.items, None, &now_iso()));
            }
            Err(message) => log::error!("❌ Recarga de entregas fallida: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_period_validation() {
        assert!(validate_subscription_period("2024-03-01", "2024-03-31").is_ok());
        assert!(validate_subscription_period("2024-03-01", "2024-03-01").is_ok());
        assert!(validate_subscription_period("", "2024-03-31").is_err());
        assert!(validate_subscription_period("2024-03-01", "").is_err());
        assert!(validate_subscription_period("2024-03-31", "2024-03-01").is_err());
    }

    #[test]
    fn test_served_issue_gates_confirmation() {
        let mut feed = Feed::new("2024-03-10T00:00:00Z");
        feed.seed(
            vec![
                MealIssue {
                    id: 1,
                    user_id: 7,
                    menu_id: 11,
                    served_by_id: Some(2),
                    status: MealIssueStatus::Served,
                    served_at: Some("2024-03-10T12:00:00Z".to_string()),
                    confirmed_at: None,
                    created_at: "2024-03-10T08:00:00Z".to_string(),
                },
                MealIssue {
                    id: 2,
                    user_id: 7,
                    menu_id: 12,
                    served_by_id: None,
                    status: MealIssueStatus::Issued,
                    served_at: None,
                    confirmed_at: None,
                    created_at: "2024-03-10T08:00:00Z".to_string(),
                },
            ],
            None,
            "2024-03-10T12:30:00Z",
        );

        assert!(served_issue_for_menu(&feed, 11));
        assert!(!served_issue_for_menu(&feed, 12)); // aún sin servir
        assert!(!served_issue_for_menu(&feed, 99)); // sin entrega
    }
}
