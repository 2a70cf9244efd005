/// Prefijo base del backend REST
/// Configurado en tiempo de compilación:
/// - Por defecto: /api (mismo origen, detrás del proxy del servidor web)
/// - Producción: via API_BASE en .env
pub const API_BASE: &str = match option_env!("API_BASE") {
    Some(url) => url,
    None => "/api",
};
