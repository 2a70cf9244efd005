// ============================================================================
// SESSION EVENTS - Señal de sesión invalidada (401 del backend)
// ============================================================================
// Canal único entre el gateway HTTP y el estado de sesión: el gateway emite,
// el estado de sesión escucha. Nadie más muta la sesión por aquí.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    static SUBSCRIBERS: RefCell<Vec<Rc<dyn Fn()>>> = RefCell::new(Vec::new());
}

/// Suscribirse a la señal. Pensado para llamarse una sola vez por proceso
/// (el estado de sesión se registra al arrancar la app).
pub fn on_session_invalidated(callback: impl Fn() + 'static) {
    SUBSCRIBERS.with(|subscribers| {
        subscribers.borrow_mut().push(Rc::new(callback));
    });
}

/// Emitir la señal. Los callbacks se clonan antes de invocarse para que
/// puedan re-entrar (un logout dentro del callback es seguro).
pub fn emit_session_invalidated() {
    let callbacks: Vec<Rc<dyn Fn()>> =
        SUBSCRIBERS.with(|subscribers| subscribers.borrow().clone());
    for callback in callbacks {
        callback();
    }
}

#[cfg(test)]
pub fn clear_subscribers() {
    SUBSCRIBERS.with(|subscribers| subscribers.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_subscriber_and_reentry_is_safe() {
        clear_subscribers();
        let fired = Rc::new(Cell::new(0));
        {
            let fired = fired.clone();
            on_session_invalidated(move || {
                fired.set(fired.get() + 1);
            });
        }

        emit_session_invalidated();
        emit_session_invalidated();
        assert_eq!(fired.get(), 2);
        clear_subscribers();
    }
}
