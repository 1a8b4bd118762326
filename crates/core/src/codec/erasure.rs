//! Code d'effacement Reed-Solomon des métadonnées
//!
//! Chaque chiffre de métadonnées est un fragment d'un octet : les
//! `data_shards` premiers portent l'adresse, les `parity_shards` suivants la
//! redondance, le tout formant un mot de code Reed-Solomon sur GF(256).
//!
//! Le mot de code complet doit tenir dans 255 octets (contrainte du
//! décodeur).

use crate::error::{Inconsistency, OligoError, Result};
use reed_solomon::{Decoder, Encoder};
use std::fmt;

/// Longueur maximale d'un mot de code
const MAX_CODEWORD_LEN: usize = 255;

/// Code d'effacement des chiffres de métadonnées
pub struct MetadataErasure {
    /// Absent quand il n'y a aucun fragment de parité
    rs: Option<(Encoder, Decoder)>,
    data_shards: usize,
    parity_shards: usize,
}

impl MetadataErasure {
    /// Crée un code pour `data_shards` fragments de données et
    /// `parity_shards` fragments de parité
    pub fn new(data_shards: usize, parity_shards: usize) -> std::result::Result<Self, Inconsistency> {
        if data_shards == 0 || data_shards + parity_shards > MAX_CODEWORD_LEN {
            return Err(Inconsistency::ErasureCoder {
                data: data_shards,
                parity: parity_shards,
            });
        }

        let rs = (parity_shards > 0)
            .then(|| (Encoder::new(parity_shards), Decoder::new(parity_shards)));

        Ok(Self {
            rs,
            data_shards,
            parity_shards,
        })
    }

    /// Nombre de fragments de données
    pub fn data_shards(&self) -> usize {
        self.data_shards
    }

    /// Nombre de fragments de parité
    pub fn parity_shards(&self) -> usize {
        self.parity_shards
    }

    /// Nombre total de fragments
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Recalcule les fragments de parité en place
    pub fn encode(&self, shards: &mut [u8]) -> Result<()> {
        self.check_len(shards)?;
        let Some((encoder, _)) = &self.rs else {
            return Ok(());
        };

        let encoded = encoder.encode(&shards[..self.data_shards]);
        shards[self.data_shards..].copy_from_slice(encoded.ecc());
        Ok(())
    }

    /// Vérifie la cohérence des fragments
    pub fn verify(&self, shards: &[u8]) -> bool {
        if shards.len() != self.total_shards() {
            return false;
        }
        match &self.rs {
            Some((_, decoder)) => !decoder.is_corrupted(shards),
            None => true,
        }
    }

    /// Corrige les fragments en place
    ///
    /// `erasures` liste les positions connues comme invalides ; des erreurs
    /// en positions inconnues sont aussi corrigées dans la limite de la
    /// capacité du code (2 × erreurs + effacements <= fragments de parité).
    pub fn reconstruct(&self, shards: &mut [u8], erasures: &[usize]) -> Result<()> {
        self.check_len(shards)?;

        if erasures.len() > self.parity_shards || erasures.iter().any(|&p| p >= shards.len()) {
            return Err(OligoError::MetadataUnrecoverable);
        }

        if self.verify(shards) && erasures.is_empty() {
            return Ok(());
        }

        let Some((_, decoder)) = &self.rs else {
            return Err(OligoError::MetadataUnrecoverable);
        };

        // Positions d'effacements relatives au mot de code (toujours < 255)
        let positions: Vec<u8> = erasures.iter().map(|&p| p as u8).collect();
        let erase_pos = if positions.is_empty() {
            None
        } else {
            Some(&positions[..])
        };

        let corrected = decoder
            .correct(shards, erase_pos)
            .map_err(|_| OligoError::MetadataUnrecoverable)?;

        shards[..self.data_shards].copy_from_slice(corrected.data());
        self.encode(shards)?;
        Ok(())
    }

    fn check_len(&self, shards: &[u8]) -> Result<()> {
        if shards.len() != self.total_shards() {
            return Err(OligoError::Encoding(format!(
                "nombre de fragments invalide: {} au lieu de {}",
                shards.len(),
                self.total_shards()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for MetadataErasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataErasure")
            .field("data_shards", &self.data_shards)
            .field("parity_shards", &self.parity_shards)
            .finish()
    }
}
