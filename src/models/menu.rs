use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergy {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub allergies: Vec<Allergy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    #[serde(default)]
    pub dish: Option<Dish>,
    #[serde(default, with = "crate::models::numeric::optional")]
    pub portion_size: Option<f64>,
    #[serde(default)]
    pub planned_qty: Option<i64>,
    #[serde(default)]
    pub remaining_qty: Option<i64>,
}

/// Menú publicado para una fecha y tipo de comida
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub id: i64,
    /// Fecha ISO (AAAA-MM-DD); se compara como cadena
    pub menu_date: String,
    pub meal_type: MealType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, with = "crate::models::numeric::optional")]
    pub price: Option<f64>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
}

/// Respuesta de /menus/
#[derive(Debug, Clone, Deserialize)]
pub struct MenuListResponse {
    #[serde(default)]
    pub items: Vec<Menu>,
}
