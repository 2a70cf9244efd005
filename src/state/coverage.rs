// ============================================================================
// COVERAGE - Estado derivado de cada menú para el alumno
// ============================================================================
// Función pura: misma entrada, misma salida. Se recalcula en cada render
// a partir de menús, pagos y entregas; no guarda nada propio.
// ============================================================================

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{MealIssue, MealIssueStatus, Menu, Payment};

/// Clasificación de un menú, en orden de precedencia
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCoverage {
    /// Recepción confirmada por el alumno (estado final)
    Confirmed,
    /// Servido por cocina: se puede confirmar la recepción
    Served,
    /// Pagado o con entrega creada: pendiente de cocina
    IssuedOrPaid,
    /// Dentro del periodo de un abono pagado; la entrega se crea al reclamarla
    CoveredBySubscription,
    /// Sin pago ni entrega: se puede pagar
    Unpaid,
}

/// Estado del abono a fecha de hoy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Upcoming,
    Inactive,
}

/// ¿`date` cae dentro de [start, end]? Fechas ISO inclusivas, comparadas
/// como cadenas.
fn is_within_period(date: &str, start: Option<&str>, end: Option<&str>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => date >= start && date <= end,
        _ => false,
    }
}

/// ¿Algún abono pagado cubre la fecha del menú?
pub fn covered_by_subscription(menu_date: &str, payments: &[Payment]) -> bool {
    payments.iter().any(|payment| {
        payment.is_paid_subscription()
            && is_within_period(
                menu_date,
                payment.period_start.as_deref(),
                payment.period_end.as_deref(),
            )
    })
}

/// Clasifica cada menú según entregas, pagos puntuales y abonos
pub fn classify(
    menus: &[Menu],
    payments: &[Payment],
    issues: &[MealIssue],
) -> HashMap<i64, MenuCoverage> {
    // Entrega por menú: ante duplicados gana el estado más avanzado
    let mut issue_by_menu: HashMap<i64, MealIssueStatus> = HashMap::new();
    for issue in issues {
        issue_by_menu
            .entry(issue.menu_id)
            .and_modify(|status| {
                if issue.status > *status {
                    *status = issue.status;
                }
            })
            .or_insert(issue.status);
    }

    let paid_menu_ids: Vec<i64> = payments
        .iter()
        .filter(|payment| payment.is_paid_one_time())
        .filter_map(|payment| payment.menu_id)
        .collect();

    let mut result = HashMap::new();
    for menu in menus {
        let coverage = match issue_by_menu.get(&menu.id) {
            Some(MealIssueStatus::Confirmed) => MenuCoverage::Confirmed,
            Some(MealIssueStatus::Served) => MenuCoverage::Served,
            Some(MealIssueStatus::Issued) => MenuCoverage::IssuedOrPaid,
            None if paid_menu_ids.contains(&menu.id) => MenuCoverage::IssuedOrPaid,
            None if covered_by_subscription(&menu.menu_date, payments) => {
                MenuCoverage::CoveredBySubscription
            }
            None => MenuCoverage::Unpaid,
        };
        result.insert(menu.id, coverage);
    }
    result
}

/// Abono activo hoy; si hay varios solapados gana el de fin más lejano
/// (solo para mostrarlo: la cobertura en sí no necesita desempate).
pub fn active_subscription<'a>(today: &str, payments: &'a [Payment]) -> Option<&'a Payment> {
    payments
        .iter()
        .filter(|payment| payment.is_paid_subscription())
        .filter(|payment| {
            is_within_period(
                today,
                payment.period_start.as_deref(),
                payment.period_end.as_deref(),
            )
        })
        .max_by(|a, b| a.period_end.cmp(&b.period_end))
}

/// Abono pagado que todavía no ha empezado (el que empieza antes)
pub fn upcoming_subscription<'a>(today: &str, payments: &'a [Payment]) -> Option<&'a Payment> {
    payments
        .iter()
        .filter(|payment| payment.is_paid_subscription())
        .filter(|payment| matches!(payment.period_start.as_deref(), Some(start) if start > today))
        .min_by(|a, b| a.period_start.cmp(&b.period_start))
}

/// Último abono pagado por fecha de fin
pub fn latest_subscription(payments: &[Payment]) -> Option<&Payment> {
    payments
        .iter()
        .filter(|payment| payment.is_paid_subscription())
        .max_by(|a, b| a.period_end.cmp(&b.period_end))
}

pub fn subscription_status(today: &str, payments: &[Payment]) -> SubscriptionStatus {
    if active_subscription(today, payments).is_some() {
        SubscriptionStatus::Active
    } else if upcoming_subscription(today, payments).is_some() {
        SubscriptionStatus::Upcoming
    } else {
        SubscriptionStatus::Inactive
    }
}

/// Fecha de inicio sugerida para un abono nuevo: el día siguiente al fin del
/// último abono si aún no ha pasado; si no, hoy.
pub fn next_subscription_start(today: &str, payments: &[Payment]) -> String {
    if let Some(latest) = latest_subscription(payments) {
        if let Some(end) = latest.period_end.as_deref() {
            if end >= today {
                if let Ok(parsed) = NaiveDate::parse_from_str(end, "%Y-%m-%d") {
                    if let Some(next) = parsed.succ_opt() {
                        return next.format("%Y-%m-%d").to_string();
                    }
                }
            }
        }
    }
    today.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MealType, PaymentStatus, PaymentType};

    fn menu(id: i64, menu_date: &str) -> Menu {
        Menu {
            id,
            menu_date: menu_date.to_string(),
            meal_type: MealType::Lunch,
            title: None,
            price: Some(250.0),
            menu_items: Vec::new(),
        }
    }

    fn one_time(id: i64, menu_id: i64, status: PaymentStatus) -> Payment {
        Payment {
            id,
            user_id: 7,
            menu_id: Some(menu_id),
            amount: 250.0,
            currency: "RUB".to_string(),
            payment_type: PaymentType::OneTime,
            status,
            paid_at: None,
            period_start: None,
            period_end: None,
            created_at: "2024-03-01T10:00:00Z".to_string(),
        }
    }

    fn subscription(id: i64, start: &str, end: &str, status: PaymentStatus) -> Payment {
        Payment {
            id,
            user_id: 7,
            menu_id: None,
            amount: 3400.0,
            currency: "RUB".to_string(),
            payment_type: PaymentType::Subscription,
            status,
            paid_at: None,
            period_start: Some(start.to_string()),
            period_end: Some(end.to_string()),
            created_at: "2024-03-01T10:00:00Z".to_string(),
        }
    }

    fn issue(id: i64, menu_id: i64, status: MealIssueStatus) -> MealIssue {
        MealIssue {
            id,
            user_id: 7,
            menu_id,
            served_by_id: None,
            status,
            served_at: None,
            confirmed_at: None,
            created_at: "2024-03-10T08:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_subscription_window_covers_menu() {
        let menus = vec![menu(1, "2024-03-10")];
        let payments = vec![subscription(1, "2024-03-01", "2024-03-31", PaymentStatus::Paid)];
        let result = classify(&menus, &payments, &[]);
        assert_eq!(result[&1], MenuCoverage::CoveredBySubscription);
    }

    #[test]
    fn test_subscription_window_is_inclusive() {
        let payments = vec![subscription(1, "2024-03-01", "2024-03-31", PaymentStatus::Paid)];
        assert!(covered_by_subscription("2024-03-01", &payments));
        assert!(covered_by_subscription("2024-03-31", &payments));
        assert!(!covered_by_subscription("2024-02-29", &payments));
        assert!(!covered_by_subscription("2024-04-01", &payments));
    }

    #[test]
    fn test_unpaid_subscription_does_not_cover() {
        let payments = vec![subscription(1, "2024-03-01", "2024-03-31", PaymentStatus::Pending)];
        assert!(!covered_by_subscription("2024-03-10", &payments));
    }

    #[test]
    fn test_precedence_issue_over_payment_over_subscription() {
        let menus = vec![
            menu(1, "2024-03-10"),
            menu(2, "2024-03-11"),
            menu(3, "2024-03-12"),
            menu(4, "2024-03-13"),
            menu(5, "2024-04-20"),
        ];
        let payments = vec![
            subscription(1, "2024-03-01", "2024-03-31", PaymentStatus::Paid),
            one_time(2, 4, PaymentStatus::Paid),
        ];
        let issues = vec![
            issue(1, 1, MealIssueStatus::Confirmed),
            issue(2, 2, MealIssueStatus::Served),
            issue(3, 3, MealIssueStatus::Issued),
        ];

        let result = classify(&menus, &payments, &issues);
        assert_eq!(result[&1], MenuCoverage::Confirmed);
        assert_eq!(result[&2], MenuCoverage::Served);
        assert_eq!(result[&3], MenuCoverage::IssuedOrPaid);
        assert_eq!(result[&4], MenuCoverage::IssuedOrPaid);
        assert_eq!(result[&5], MenuCoverage::Unpaid);
    }

    #[test]
    fn test_failed_one_time_payment_leaves_menu_unpaid() {
        let menus = vec![menu(1, "2024-05-10")];
        let payments = vec![one_time(1, 1, PaymentStatus::Failed)];
        let result = classify(&menus, &payments, &[]);
        assert_eq!(result[&1], MenuCoverage::Unpaid);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let menus = vec![menu(1, "2024-03-10"), menu(2, "2024-03-11")];
        let payments = vec![
            subscription(1, "2024-03-01", "2024-03-31", PaymentStatus::Paid),
            one_time(2, 2, PaymentStatus::Paid),
        ];
        let issues = vec![issue(1, 2, MealIssueStatus::Served)];

        let first = classify(&menus, &payments, &issues);
        let second = classify(&menus, &payments, &issues);
        assert_eq!(first, second);
    }

    #[test]
    fn test_overlapping_subscriptions_pick_latest_end_for_display() {
        let payments = vec![
            subscription(1, "2024-03-01", "2024-03-15", PaymentStatus::Paid),
            subscription(2, "2024-03-01", "2024-03-31", PaymentStatus::Paid),
        ];
        let active = active_subscription("2024-03-10", &payments).unwrap();
        assert_eq!(active.id, 2);
        // La cobertura solo necesita una coincidencia
        assert!(covered_by_subscription("2024-03-10", &payments));
    }

    #[test]
    fn test_subscription_status_banner() {
        let paid = vec![subscription(1, "2024-03-01", "2024-03-31", PaymentStatus::Paid)];
        assert_eq!(subscription_status("2024-03-10", &paid), SubscriptionStatus::Active);
        assert_eq!(subscription_status("2024-02-10", &paid), SubscriptionStatus::Upcoming);
        assert_eq!(subscription_status("2024-04-10", &paid), SubscriptionStatus::Inactive);
        assert_eq!(subscription_status("2024-03-10", &[]), SubscriptionStatus::Inactive);
    }

    #[test]
    fn test_next_subscription_start_follows_latest_period() {
        let payments = vec![subscription(1, "2024-03-01", "2024-03-31", PaymentStatus::Paid)];
        assert_eq!(next_subscription_start("2024-03-10", &payments), "2024-04-01");
        // Abono ya vencido: se sugiere hoy
        assert_eq!(next_subscription_start("2024-05-10", &payments), "2024-05-10");
        assert_eq!(next_subscription_start("2024-05-10", &[]), "2024-05-10");
    }
}
