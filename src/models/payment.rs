use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    OneTime,
    Subscription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Pago del usuario: puntual (ligado a un menú) o abono por periodo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub menu_id: Option<i64>,
    #[serde(with = "crate::models::numeric")]
    pub amount: f64,
    pub currency: String,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    #[serde(default)]
    pub paid_at: Option<String>,
    /// Periodo del abono, fechas ISO inclusivas
    #[serde(default)]
    pub period_start: Option<String>,
    #[serde(default)]
    pub period_end: Option<String>,
    pub created_at: String,
}

impl Payment {
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    pub fn is_paid_subscription(&self) -> bool {
        self.is_paid() && self.payment_type == PaymentType::Subscription
    }

    pub fn is_paid_one_time(&self) -> bool {
        self.is_paid() && self.payment_type == PaymentType::OneTime
    }
}

/// Respuesta de /payments/me
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentListResponse {
    #[serde(default)]
    pub items: Vec<Payment>,
}
