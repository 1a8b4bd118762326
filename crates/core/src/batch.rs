//! Encodage et décodage parallèles de lots d'oligos
//!
//! Chaque oligo est traité indépendamment ; le codec est partagé en lecture
//! seule entre les threads de rayon. L'ordre des résultats suit celui des
//! entrées.

use crate::codec::{Block, Decoded, OligoCodec};
use crate::error::Result;
use crate::log_operation;
use crate::sequence::Oligo;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Une demande d'encodage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeRequest {
    pub address: u64,
    pub erasure: bool,
    pub blocks: Vec<Block>,
}

impl EncodeRequest {
    /// Découpe `data` en blocs de 4 octets, complétés par des zéros
    pub fn from_bytes(address: u64, erasure: bool, data: &[u8]) -> Self {
        let blocks = data
            .chunks(4)
            .map(|chunk| {
                let mut block = [0u8; 4];
                block[..chunk.len()].copy_from_slice(chunk);
                block
            })
            .collect();

        Self {
            address,
            erasure,
            blocks,
        }
    }
}

/// Encode un lot d'oligos en parallèle
pub fn encode_batch(
    codec: &OligoCodec,
    p5: &Oligo,
    p3: &Oligo,
    requests: &[EncodeRequest],
) -> Vec<Result<Oligo>> {
    log_operation!("encode_batch", requests.len(), {
        requests
            .par_iter()
            .map(|req| codec.encode(p5, p3, req.address, req.erasure, &req.blocks))
            .collect()
    })
}

/// Décode un lot d'oligos en parallèle
pub fn decode_batch(
    codec: &OligoCodec,
    p5: &Oligo,
    p3: &Oligo,
    oligos: &[Oligo],
    recover: bool,
) -> Vec<Result<Decoded>> {
    log_operation!("decode_batch", oligos.len(), {
        oligos
            .par_iter()
            .map(|oligo| codec.decode(p5, p3, oligo, recover))
            .collect()
    })
}

/// Bilan d'un lot décodé
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub oligos: usize,
    pub decoded: usize,
    pub failed: usize,
    pub fatal: usize,
    pub blocks_recovered: usize,
    pub blocks_lost: usize,
}

impl BatchReport {
    pub fn from_results(results: &[Result<Decoded>]) -> Self {
        let mut report = Self {
            oligos: results.len(),
            ..Self::default()
        };

        for result in results {
            match result {
                Ok(decoded) => {
                    report.decoded += 1;
                    report.blocks_recovered += decoded.recovered_blocks();
                    report.blocks_lost += decoded.blocks.len() - decoded.recovered_blocks();
                }
                Err(e) => {
                    report.failed += 1;
                    if e.is_fatal() {
                        report.fatal += 1;
                    }
                }
            }
        }

        report
    }

    /// Fraction d'oligos décodés
    pub fn success_rate(&self) -> f64 {
        if self.oligos == 0 {
            0.0
        } else {
            self.decoded as f64 / self.oligos as f64
        }
    }
}
