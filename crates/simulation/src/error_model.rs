//! Modèles d'erreur pour la simulation

use serde::{Deserialize, Serialize};

/// Type d'erreur ADN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorType {
    /// Base remplacée par une autre
    Substitution,
    /// Base aléatoire insérée avant la base courante
    Insertion,
    /// Base perdue
    Deletion,
}

/// Modèle d'erreur indépendant par base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorModel {
    /// Taux de substitution (par base)
    pub substitution_rate: f64,

    /// Taux d'insertion (par base)
    pub insertion_rate: f64,

    /// Taux de délétion (par base)
    pub deletion_rate: f64,

    /// Seed pour reproductibilité
    pub seed: u64,
}

impl Default for ErrorModel {
    fn default() -> Self {
        Self {
            substitution_rate: 0.01,
            insertion_rate: 0.005,
            deletion_rate: 0.005,
            seed: 42,
        }
    }
}

impl ErrorModel {
    pub fn new(substitution_rate: f64, insertion_rate: f64, deletion_rate: f64) -> Self {
        Self {
            substitution_rate,
            insertion_rate,
            deletion_rate,
            seed: 42,
        }
    }

    /// Substitutions seules, le cas que le décodeur sait absorber
    pub fn substitutions_only(rate: f64) -> Self {
        Self::new(rate, 0.0, 0.0)
    }

    /// Définit le seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Taux d'erreur total
    pub fn total_error_rate(&self) -> f64 {
        self.substitution_rate + self.insertion_rate + self.deletion_rate
    }

    /// Vérifie si le modèle est valide
    pub fn is_valid(&self) -> bool {
        self.total_error_rate() < 1.0
            && self.substitution_rate >= 0.0
            && self.insertion_rate >= 0.0
            && self.deletion_rate >= 0.0
    }

    /// Erreur associée à un tirage uniforme dans `[0, 1)`
    pub fn classify(&self, roll: f64) -> Option<ErrorType> {
        if roll < self.substitution_rate {
            Some(ErrorType::Substitution)
        } else if roll < self.substitution_rate + self.insertion_rate {
            Some(ErrorType::Insertion)
        } else if roll < self.total_error_rate() {
            Some(ErrorType::Deletion)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model() {
        let model = ErrorModel::default();
        assert!(model.is_valid());
        assert!((model.total_error_rate() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_substitutions_only() {
        let model = ErrorModel::substitutions_only(0.02).with_seed(7);
        assert_eq!(model.insertion_rate, 0.0);
        assert_eq!(model.deletion_rate, 0.0);
        assert_eq!(model.seed, 7);
        assert_eq!(model.classify(0.01), Some(ErrorType::Substitution));
        assert_eq!(model.classify(0.03), None);
    }

    #[test]
    fn test_classify_intervals() {
        let model = ErrorModel::new(0.1, 0.1, 0.1);
        assert_eq!(model.classify(0.05), Some(ErrorType::Substitution));
        assert_eq!(model.classify(0.15), Some(ErrorType::Insertion));
        assert_eq!(model.classify(0.25), Some(ErrorType::Deletion));
        assert_eq!(model.classify(0.35), None);
    }

    #[test]
    fn test_validity() {
        let invalid = ErrorModel::new(0.5, 0.5, 0.5);
        assert!(!invalid.is_valid());

        let negative = ErrorModel::new(-0.1, 0.0, 0.0);
        assert!(!negative.is_valid());
    }
}
