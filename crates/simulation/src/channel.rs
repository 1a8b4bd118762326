//! Canal de synthèse/séquençage simulé

use crate::error_model::{ErrorModel, ErrorType};
use crate::metrics::SimulationMetrics;
use oligo_core::{Nt, Oligo};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Canal bruité appliqué base par base
pub struct OligoChannel {
    model: ErrorModel,
    rng: ChaCha8Rng,
}

impl OligoChannel {
    pub fn new(model: ErrorModel) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(model.seed);
        Self { model, rng }
    }

    pub fn model(&self) -> &ErrorModel {
        &self.model
    }

    /// Transmet un oligo à travers le canal
    pub fn transmit(&mut self, oligo: &Oligo) -> (Oligo, SimulationMetrics) {
        let mut out = Vec::with_capacity(oligo.len() + oligo.len() / 10);
        let mut metrics = SimulationMetrics::new();

        for &base in oligo.bases() {
            let roll: f64 = self.rng.gen();
            match self.model.classify(roll) {
                Some(ErrorType::Substitution) => {
                    out.push(self.substitute_base(base));
                    metrics.substitutions += 1;
                }
                Some(ErrorType::Insertion) => {
                    out.push(self.random_base());
                    out.push(base);
                    metrics.insertions += 1;
                }
                Some(ErrorType::Deletion) => {
                    metrics.deletions += 1;
                }
                None => out.push(base),
            }
        }

        metrics.total_bases = oligo.len();
        metrics.affected_bases = metrics.substitutions + metrics.insertions + metrics.deletions;

        tracing::trace!(
            "transmission: {} substitution(s), {} insertion(s), {} délétion(s)",
            metrics.substitutions,
            metrics.insertions,
            metrics.deletions
        );

        (Oligo::from_bases(out), metrics)
    }

    /// Transmet chaque oligo une fois, dans l'ordre
    pub fn transmit_many(&mut self, oligos: &[Oligo]) -> Vec<(Oligo, SimulationMetrics)> {
        oligos.iter().map(|o| self.transmit(o)).collect()
    }

    /// Réinitialise le RNG
    pub fn reset_rng(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.model.seed);
    }

    /// Base différente de `base`, tirée uniformément
    fn substitute_base(&mut self, base: Nt) -> Nt {
        let offset = self.rng.gen_range(1..4);
        Nt::from_index(base.index() + offset)
    }

    fn random_base(&mut self) -> Nt {
        Nt::from_index(self.rng.gen_range(0..4))
    }
}
