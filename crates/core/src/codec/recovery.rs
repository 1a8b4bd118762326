//! Récupération des métadonnées après échec de la vérification

use crate::codec::block::Block;
use crate::codec::oligo_codec::OligoCodec;
use crate::error::{OligoError, Result};
use crate::sequence::{Nt, Oligo};
use std::fmt;

/// Blocs et chiffres de métadonnées corrigés
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub blocks: Vec<Option<Block>>,
    pub digits: Vec<u64>,
}

/// Stratégie de récupération invoquée quand la vérification primaire échoue
///
/// `body` est le corps de l'oligo, amorces retirées ; `inverted` est
/// l'hypothèse de polarité en cours. Les erreurs renvoyées sont propagées
/// telles quelles par le décodeur.
pub trait Recovery: Send + Sync + fmt::Debug {
    fn recover(
        &self,
        codec: &OligoCodec,
        p5: &Oligo,
        p3: &Oligo,
        body: &[Nt],
        inverted: bool,
    ) -> Result<Recovered>;
}

/// Récupération par correction Reed-Solomon des chiffres de métadonnées
///
/// Les chiffres illisibles ou hors plage sont traités comme des
/// effacements ; les autres erreurs sont corrigées dans la limite de la
/// capacité du code.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErasureRecovery;

impl Recovery for ErasureRecovery {
    fn recover(
        &self,
        codec: &OligoCodec,
        p5: &Oligo,
        _p3: &Oligo,
        body: &[Nt],
        inverted: bool,
    ) -> Result<Recovered> {
        let parsed = codec.parse_body(p5.bases(), body, inverted);
        let packer = codec.packer();

        let mut shards = vec![0u8; packer.total_digits()];
        let mut erasures = Vec::new();
        for (index, digit) in parsed.digits.iter().enumerate() {
            match digit {
                Some(d) if packer.digit_in_range(index, *d) => shards[index] = *d as u8,
                _ => erasures.push(index),
            }
        }

        packer.erasure().reconstruct(&mut shards, &erasures)?;

        let digits: Vec<u64> = shards.into_iter().map(u64::from).collect();
        if !packer.verify(&digits) {
            return Err(OligoError::MetadataUnrecoverable);
        }

        tracing::debug!(
            "métadonnées reconstruites ({} effacement(s))",
            erasures.len()
        );

        Ok(Recovered {
            blocks: parsed.blocks,
            digits,
        })
    }
}
