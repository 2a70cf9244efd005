// ============================================================================
// NOTIFIER - Avisos al usuario (toast + sonido)
// ============================================================================
// Capacidad inyectada: se construye una vez por proceso y se comparte por
// referencia. Los toasts se emiten como CustomEvent de window para que la
// capa de vistas los pinte; el sonido lleva su propio límite de repetición.
// ============================================================================

use std::cell::{Cell, RefCell};

use wasm_bindgen::JsValue;
use web_sys::{window, AudioContext, AudioContextState, CustomEvent, CustomEventInit, OscillatorType};

/// Nombre del evento que consume la capa de vistas
pub const TOAST_EVENT: &str = "comedor:toast";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

pub struct Notifier {
    sound_throttle_ms: i64,
    last_sound_at: Cell<i64>,
    audio: RefCell<Option<AudioContext>>,
}

impl Notifier {
    pub fn new(sound_throttle_ms: i64) -> Self {
        Self {
            sound_throttle_ms,
            last_sound_at: Cell::new(0),
            audio: RefCell::new(None),
        }
    }

    pub fn info(&self, message: &str) {
        self.toast(ToastKind::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.toast(ToastKind::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.toast(ToastKind::Error, message);
    }

    /// Aviso de datos nuevos del sincronizador: sonido + toast informativo
    pub fn notify_new_data(&self, message: &str) {
        self.play_sound();
        self.info(message);
    }

    pub fn toast(&self, kind: ToastKind, message: &str) {
        let message = message.trim();
        if message.is_empty() {
            return;
        }
        log::info!("🔔 [{}] {}", kind.as_str(), message);
        let Some(window) = window() else { return };

        let detail = js_sys::Object::new();
        let _ = js_sys::Reflect::set(
            &detail,
            &JsValue::from_str("type"),
            &JsValue::from_str(kind.as_str()),
        );
        let _ = js_sys::Reflect::set(
            &detail,
            &JsValue::from_str("message"),
            &JsValue::from_str(message),
        );

        let init = CustomEventInit::new();
        init.set_detail(&detail);
        if let Ok(event) = CustomEvent::new_with_event_init_dict(TOAST_EVENT, &init) {
            let _ = window.dispatch_event(&event);
        }
    }

    /// Pitido corto de aviso. Los fallos de audio se ignoran: el sonido es
    /// cosmético y el navegador puede bloquearlo hasta el primer gesto.
    pub fn play_sound(&self) {
        let now = js_sys::Date::now() as i64;
        if !self.should_play(now) {
            return;
        }
        if let Err(error) = self.beep() {
            log::debug!("🔇 Audio no disponible: {:?}", error);
        }
    }

    /// Control del límite de repetición; actualiza la marca si toca sonar
    fn should_play(&self, now_ms: i64) -> bool {
        if now_ms - self.last_sound_at.get() < self.sound_throttle_ms {
            return false;
        }
        self.last_sound_at.set(now_ms);
        true
    }

    fn beep(&self) -> Result<(), JsValue> {
        let mut audio = self.audio.borrow_mut();
        if audio.is_none() {
            *audio = Some(AudioContext::new()?);
        }
        let context = audio.as_ref().unwrap();

        if context.state() == AudioContextState::Suspended {
            let _ = context.resume();
        }

        let oscillator = context.create_oscillator()?;
        let gain = context.create_gain()?;
        oscillator.set_type(OscillatorType::Sine);
        oscillator.frequency().set_value(880.0);
        gain.gain().set_value(0.06);
        oscillator.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&context.destination())?;

        let stop_at = context.current_time() + 0.12;
        oscillator.start()?;
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, stop_at)?;
        oscillator.stop_with_when(stop_at)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_throttle_window() {
        let notifier = Notifier::new(1_200);
        assert!(notifier.should_play(10_000));
        // Dentro de la ventana: silencio
        assert!(!notifier.should_play(10_500));
        assert!(!notifier.should_play(11_199));
        // Fuera de la ventana: vuelve a sonar
        assert!(notifier.should_play(11_200));
        assert!(!notifier.should_play(11_300));
    }
}
