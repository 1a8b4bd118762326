//! Configuration sérialisable du codec d'oligos

use crate::codec::oligo_codec::OligoCodec;
use crate::constraints::Homopolymer;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration du codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Nombre de blocs de 4 octets par oligo
    pub blocks: usize,

    /// Largeur des chiffres de métadonnées (3, 4 ou 5 bases)
    pub metadata_width: usize,

    /// Nombre de blocs portant la parité des métadonnées
    pub erasure_blocks: usize,

    /// Longueur maximale d'un homopolymère
    pub max_homopolymer: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            blocks: 8,
            metadata_width: 3,
            erasure_blocks: 2,
            max_homopolymer: 3,
        }
    }
}

impl CodecConfig {
    /// Lit une configuration JSON ; les champs absents prennent leur valeur par défaut
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Construit le codec correspondant
    pub fn build(&self) -> Result<OligoCodec> {
        OligoCodec::new(
            self.blocks,
            self.metadata_width,
            self.erasure_blocks,
            Arc::new(Homopolymer::new(self.max_homopolymer)),
        )
    }
}
