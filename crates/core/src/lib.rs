//! Oligo Core Library
//!
//! Codec de stockage ADN de niveau 1 : des blocs de données de 4 octets et
//! une adresse sont transformés en un oligo respectant des contraintes
//! biochimiques, encadré par deux amorces, et inversement.

pub mod batch;
pub mod codec;
pub mod constraints;
pub mod error;
pub mod logging;
pub mod sequence;

// Réexportations principales
pub use batch::{decode_batch, encode_batch, BatchReport, EncodeRequest};
pub use codec::{CodecConfig, Decoded, OligoCodec, Polarity, Recovery, GC_THRESHOLD};
pub use constraints::{Criteria, Homopolymer, Unconstrained};
pub use error::{Inconsistency, OligoError, Result};
pub use logging::init_logging;
// Les macros log_operation et log_error sont automatiquement exportées à la racine du crate
pub use sequence::{Nt, Oligo, PrimerMatch};
