//! Métriques de simulation

use oligo_core::{Decoded, OligoError};
use serde::{Deserialize, Serialize};

/// Erreurs injectées dans un oligo
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    /// Nombre total de bases
    pub total_bases: usize,

    /// Nombre de substitutions
    pub substitutions: usize,

    /// Nombre d'insertions
    pub insertions: usize,

    /// Nombre de délétions
    pub deletions: usize,

    /// Nombre total de bases affectées
    pub affected_bases: usize,
}

impl SimulationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn rate(&self, count: usize) -> f64 {
        if self.total_bases == 0 {
            return 0.0;
        }
        count as f64 / self.total_bases as f64
    }

    /// Taux d'erreur total
    pub fn error_rate(&self) -> f64 {
        self.rate(self.affected_bases)
    }

    pub fn substitution_rate(&self) -> f64 {
        self.rate(self.substitutions)
    }

    pub fn insertion_rate(&self) -> f64 {
        self.rate(self.insertions)
    }

    pub fn deletion_rate(&self) -> f64 {
        self.rate(self.deletions)
    }

    /// Cumule les métriques d'un autre oligo
    pub fn merge(&mut self, other: &SimulationMetrics) {
        self.total_bases += other.total_bases;
        self.substitutions += other.substitutions;
        self.insertions += other.insertions;
        self.deletions += other.deletions;
        self.affected_bases += other.affected_bases;
    }
}

/// Bilan du décodage d'oligos bruités
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryMetrics {
    pub oligos: usize,
    pub decoded: usize,
    pub primer_mismatches: usize,
    pub metadata_lost: usize,
    pub other_failures: usize,
    pub blocks_total: usize,
    pub blocks_recovered: usize,
}

impl RecoveryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre le résultat du décodage d'un oligo de `blocks` blocs
    pub fn record_decode(&mut self, blocks: usize, result: &Result<Decoded, OligoError>) {
        self.oligos += 1;
        self.blocks_total += blocks;

        match result {
            Ok(decoded) => {
                self.decoded += 1;
                self.blocks_recovered += decoded.recovered_blocks();
            }
            Err(OligoError::PrimerMismatch) => self.primer_mismatches += 1,
            Err(OligoError::MetadataUnrecoverable) => self.metadata_lost += 1,
            Err(e) => {
                tracing::warn!("échec de décodage inattendu: {}", e);
                self.other_failures += 1;
            }
        }
    }

    /// Fraction d'oligos dont l'adresse a été retrouvée
    pub fn oligo_recovery_rate(&self) -> f64 {
        if self.oligos == 0 {
            return 0.0;
        }
        self.decoded as f64 / self.oligos as f64
    }

    /// Fraction des blocs émis retrouvés intacts
    pub fn block_recovery_rate(&self) -> f64 {
        if self.blocks_total == 0 {
            return 0.0;
        }
        self.blocks_recovered as f64 / self.blocks_total as f64
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_rate() {
        let mut metrics = SimulationMetrics::new();
        assert_eq!(metrics.error_rate(), 0.0);

        metrics.total_bases = 100;
        metrics.substitutions = 5;
        metrics.affected_bases = 5;
        assert!((metrics.error_rate() - 0.05).abs() < 1e-9);
        assert!((metrics.substitution_rate() - 0.05).abs() < 1e-9);
        assert_eq!(metrics.deletion_rate(), 0.0);
    }

    #[test]
    fn test_merge() {
        let mut total = SimulationMetrics::new();
        let one = SimulationMetrics {
            total_bases: 200,
            substitutions: 2,
            insertions: 1,
            deletions: 0,
            affected_bases: 3,
        };
        total.merge(&one);
        total.merge(&one);
        assert_eq!(total.total_bases, 400);
        assert_eq!(total.affected_bases, 6);
        assert!((total.insertion_rate() - 0.005).abs() < 1e-9);
    }

    #[test]
    fn test_record_decode() {
        let mut metrics = RecoveryMetrics::new();
        metrics.record_decode(
            4,
            &Ok(Decoded {
                address: 3,
                erasure: false,
                inverted: false,
                blocks: vec![Some([0; 4]), None, Some([1; 4]), Some([2; 4])],
            }),
        );
        metrics.record_decode(4, &Err(OligoError::PrimerMismatch));
        metrics.record_decode(4, &Err(OligoError::MetadataUnrecoverable));
        metrics.record_decode(4, &Err(OligoError::Decoding("x".to_string())));

        assert_eq!(metrics.oligos, 4);
        assert_eq!(metrics.decoded, 1);
        assert_eq!(metrics.primer_mismatches, 1);
        assert_eq!(metrics.metadata_lost, 1);
        assert_eq!(metrics.other_failures, 1);
        assert_eq!(metrics.blocks_recovered, 3);
        assert!((metrics.oligo_recovery_rate() - 0.25).abs() < 1e-9);
        assert!((metrics.block_recovery_rate() - 3.0 / 16.0).abs() < 1e-9);
        assert!(metrics.to_json().unwrap().contains("\"decoded\": 1"));
    }
}
