//! Journalisation du codec d'oligos
//!
//! Les lots ouvrent un span `lot` portant le nom de l'opération et le
//! nombre d'oligos ; sa fermeture est journalisée avec sa durée.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

/// Filtre appliqué quand `RUST_LOG` n'est pas défini
pub const DEFAULT_FILTER: &str = "oligo_core=info,oligo_simulation=info";

/// Initialise le système de logging
///
/// Le niveau se règle via `RUST_LOG` (par exemple `RUST_LOG=oligo_core=debug`),
/// sinon [`DEFAULT_FILTER`] s'applique. Un second appel est sans effet.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .try_init();
}

/// Exécute un bloc dans le span d'un lot de `$count` oligos
///
/// Renvoie la valeur du bloc ; la durée est journalisée en millisecondes.
#[macro_export]
macro_rules! log_operation {
    ($name:expr, $count:expr, $block:block) => {{
        let span = tracing::info_span!("lot", operation = $name, oligos = $count);
        let _guard = span.enter();
        let started = std::time::Instant::now();
        let result = $block;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
            "lot traité"
        );
        result
    }};
}

/// Journalise une [`OligoError`](crate::OligoError) et la renvoie
///
/// Le champ `fatal` distingue les incohérences internes.
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {{
        let error: $crate::OligoError = $error;
        tracing::error!(fatal = error.is_fatal(), %error, "échec du codec");
        error
    }};
}
