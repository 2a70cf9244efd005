pub mod meal_issue;
pub mod menu;
pub mod notification;
pub mod payment;
pub mod user;

pub use meal_issue::{MealIssue, MealIssueListResponse, MealIssueStatus};
pub use menu::{Allergy, Dish, MealType, Menu, MenuItem, MenuListResponse};
pub use notification::{NotificationItem, NotificationListResponse};
pub use payment::{Payment, PaymentListResponse, PaymentStatus, PaymentType};
pub use user::{RegisterRequest, TokenResponse, User, UserRole};

/// Importes monetarios: el backend los serializa a veces como número y a
/// veces como cadena decimal. Aceptamos ambos.
pub(crate) mod numeric {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    fn to_f64<E: serde::de::Error>(raw: Raw) -> Result<f64, E> {
        match raw {
            Raw::Number(value) => Ok(value),
            Raw::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("importe no numérico: {}", text))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        to_f64(Raw::deserialize(deserializer)?)
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*value)
    }

    pub mod optional {
        use super::{to_f64, Raw};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            match Option::<Raw>::deserialize(deserializer)? {
                Some(raw) => Ok(Some(to_f64(raw)?)),
                None => Ok(None),
            }
        }

        pub fn serialize<S: Serializer>(
            value: &Option<f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(v),
                None => serializer.serialize_none(),
            }
        }
    }
}
