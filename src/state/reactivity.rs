// ============================================================================
// REACTIVITY - Estado observable para re-renderizar al cambiar datos
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

type Callback = Box<dyn Fn()>;

/// Estado compartido con notificación a subscribers.
/// Los clones comparten valor y subscribers (son "handles" del mismo estado).
pub struct ReactiveState<T> {
    value: Rc<RefCell<T>>,
    subscribers: Rc<RefCell<Vec<Callback>>>,
}

impl<T> ReactiveState<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Leer el valor a través de un closure (no escapa la referencia)
    pub fn read<R>(&self, reader: impl FnOnce(&T) -> R) -> R {
        reader(&self.value.borrow())
    }

    /// Reemplazar el valor y notificar
    pub fn set(&self, new_value: T) {
        *self.value.borrow_mut() = new_value;
        self.notify();
    }

    /// Mutar el valor y notificar
    pub fn update(&self, updater: impl FnOnce(&mut T)) {
        updater(&mut self.value.borrow_mut());
        self.notify();
    }

    /// Mutar el valor devolviendo un resultado, y notificar
    pub fn update_with<R>(&self, updater: impl FnOnce(&mut T) -> R) -> R {
        let result = updater(&mut self.value.borrow_mut());
        self.notify();
        result
    }

    /// Suscribirse a cambios
    pub fn subscribe(&self, callback: impl Fn() + 'static) {
        self.subscribers.borrow_mut().push(Box::new(callback));
    }

    fn notify(&self) {
        // El borrow del valor ya se soltó: los subscribers pueden leer
        for callback in self.subscribers.borrow().iter() {
            callback();
        }
    }
}

impl<T: Clone> ReactiveState<T> {
    pub fn snapshot(&self) -> T {
        self.value.borrow().clone()
    }
}

impl<T> Clone for ReactiveState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            subscribers: self.subscribers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_clones_share_value_and_subscribers() {
        let state = ReactiveState::new(0);
        let handle = state.clone();
        let fired = Rc::new(Cell::new(0));
        {
            let fired = fired.clone();
            state.subscribe(move || fired.set(fired.get() + 1));
        }

        handle.update(|v| *v += 5);
        assert_eq!(state.snapshot(), 5);
        assert_eq!(fired.get(), 1);

        let doubled = state.update_with(|v| {
            *v *= 2;
            *v
        });
        assert_eq!(doubled, 10);
        assert_eq!(fired.get(), 2);
    }
}
