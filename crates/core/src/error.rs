//! Types d'erreurs pour le codec d'oligos
//!
//! Deux classes distinctes :
//! - les erreurs récupérables, dues aux entrées de l'appelant ou au bruit
//!   de séquençage, renvoyées comme des `Result` ordinaires ;
//! - les incohérences internes ([`Inconsistency`]), qui signalent un bug de
//!   configuration ou d'algorithme et ne doivent jamais être ignorées.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OligoError {
    #[error("Nombre de blocs invalide: attendu {expected}, obtenu {actual}")]
    InvalidBlockCount { expected: usize, actual: usize },

    #[error("Taille de bloc invalide: le bloc {index} fait {actual} octets au lieu de {expected}")]
    InvalidBlockSize {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Amorce 5' trop courte: {len} nt (minimum {min})")]
    PrimerTooShort { len: usize, min: usize },

    /// L'adresse doit être strictement inférieure à `max` : la valeur
    /// `max` elle-même se confondrait avec l'adresse 0 marquée effacement.
    #[error("Adresse hors plage: {address} (maximum exclusif {max})")]
    AddressOutOfRange { address: u64, max: u64 },

    #[error("Amorce introuvable")]
    PrimerMismatch,

    #[error("Métadonnées irrécupérables")]
    MetadataUnrecoverable,

    #[error("Largeur de métadonnées invalide: {0} (attendu 3, 4 ou 5)")]
    InvalidMetadataWidth(usize),

    #[error("Base invalide: {0}")]
    InvalidBase(char),

    #[error("Erreur d'encodage: {0}")]
    Encoding(String),

    #[error("Erreur de décodage: {0}")]
    Decoding(String),

    #[error("Erreur de sérialisation: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Incohérence interne: {0}")]
    Internal(#[from] Inconsistency),
}

/// Violations d'invariants internes
///
/// Aucune entrée valide ne doit pouvoir les provoquer : leur présence
/// indique un codec mal configuré ou un critère incompatible avec la table
/// des bases de métadonnées.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Inconsistency {
    #[error("construction du code d'effacement impossible ({data} fragments de données, {parity} de parité)")]
    ErasureCoder { data: usize, parity: usize },

    #[error("les deux polarités dépassent le seuil GC (directe {direct:.3}, inversée {inverted:.3})")]
    BothPolaritiesHighGc { direct: f64, inverted: f64 },

    #[error("résidu non nul après découpage de l'adresse: {0}")]
    NonZeroResidual(u64),

    #[error("bloc de métadonnées trop large pour le code d'effacement octet par octet (largeur {0})")]
    MetadataTooWide(usize),

    #[error("espace d'adresses trop grand: {base}^{digits} dépasse 64 bits")]
    AddressSpaceOverflow { base: u64, digits: usize },

    #[error("capacité insuffisante pour des segments de {width} bases: {capacity} < {required}")]
    InsufficientCapacity {
        width: usize,
        capacity: u64,
        required: u64,
    },
}

impl OligoError {
    /// Vrai pour les incohérences internes (classe « assertion »)
    pub fn is_fatal(&self) -> bool {
        matches!(self, OligoError::Internal(_))
    }
}

/// Journalise une incohérence interne et la convertit en erreur fatale
pub(crate) fn fatal(inconsistency: Inconsistency) -> OligoError {
    crate::log_error!(OligoError::Internal(inconsistency))
}

pub type Result<T> = std::result::Result<T, OligoError>;
