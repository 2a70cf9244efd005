// ============================================================================
// STORAGE - Persistencia clave/valor
// ============================================================================
// Capacidad inyectable: el navegador usa localStorage, los tests usan
// un backend en memoria.
// ============================================================================

use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use web_sys::window;

/// Almacén clave/valor durable
pub trait StorageBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;
}

/// Guardar un valor serializable bajo una clave
pub fn save_json<T: Serialize>(
    storage: &dyn StorageBackend,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let json = serde_json::to_string(value).map_err(|e| format!("Error serializando datos: {}", e))?;
    storage.set(key, &json)
}

/// Cargar un valor serializado; None si no existe o no se puede interpretar
pub fn load_json<T: DeserializeOwned>(storage: &dyn StorageBackend, key: &str) -> Option<T> {
    let json = storage.get(key)?;
    serde_json::from_str(&json).ok()
}

/// Backend sobre localStorage del navegador
#[derive(Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn raw(&self) -> Option<web_sys::Storage> {
        window()?.local_storage().ok()?
    }
}

impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.raw()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let storage = self.raw().ok_or("No se pudo acceder a localStorage")?;
        storage
            .set_item(key, value)
            .map_err(|_| "Error guardando en localStorage".to_string())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        let storage = self.raw().ok_or("No se pudo acceder a localStorage")?;
        storage
            .remove_item(key)
            .map_err(|_| "Error eliminando de localStorage".to_string())
    }
}

/// Backend en memoria (tests y entornos sin navegador)
#[derive(Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        save_json(&storage, "clave", &vec![1, 2, 3]).unwrap();
        let loaded: Vec<i32> = load_json(&storage, "clave").unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);

        storage.remove("clave").unwrap();
        assert!(load_json::<Vec<i32>>(&storage, "clave").is_none());
    }

    #[test]
    fn test_load_json_tolerates_garbage() {
        let storage = MemoryStorage::new();
        storage.set("clave", "esto no es json").unwrap();
        assert!(load_json::<Vec<i32>>(&storage, "clave").is_none());
    }
}
