// [libs/shared/telemetry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TELEMETRY BOOTSTRAP
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: INICIALIZACIÓN DE TRAZADO Y CAPTURA DE PANICOS
 * =================================================================
 */

use std::panic;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the process-wide tracing subscriber and panic hook.
///
/// Development builds get compact, human-readable output; release builds
/// emit flat JSON suitable for log aggregation. Safe to call once per
/// process; a second call panics (global subscriber already set).
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{service_name}={level},reqwest=warn,sqlx=warn",
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    let service = service_name.to_string();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>");
        tracing::error!(target: "panic_monitor", service = %service, location = %location, "panic: {payload}");
    }));

    tracing::info!("telemetry online for [{service_name}]");
}
