//! Critères biochimiques appliqués lors de l'encodage des segments
//!
//! Un critère est un prédicat à contexte fini : il décide si une base peut
//! suivre les `context_len()` bases qui la précèdent. Cette forme permet au
//! codec de segments de dénombrer exactement les séquences valides.

use crate::sequence::{gc_content, Nt};
use std::fmt;

/// Longueur maximale de contexte (longueur du préfixe transmis au codec)
pub const MAX_CONTEXT_LEN: usize = 4;

/// Critère biochimique enfichable
pub trait Criteria: Send + Sync + fmt::Debug {
    /// Nom court du critère
    fn name(&self) -> &str;

    /// Nombre de bases de contexte examinées (au plus [`MAX_CONTEXT_LEN`])
    fn context_len(&self) -> usize;

    /// `window` contient `context_len()` bases suivies de la base candidate
    fn accepts(&self, window: &[Nt]) -> bool;

    /// Vérifie une séquence complète
    fn check(&self, bases: &[Nt]) -> bool {
        let width = self.context_len() + 1;
        bases.len() < width || bases.windows(width).all(|w| self.accepts(w))
    }

    /// Ratio GC utilisé par l'équilibrage de polarité
    fn gc_content(&self, bases: &[Nt]) -> f64 {
        gc_content(bases)
    }
}

/// Limite la longueur des homopolymères
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Homopolymer {
    max_run: usize,
}

impl Homopolymer {
    /// Crée un critère limitant les homopolymères à `max_run` bases
    ///
    /// `max_run` est ramené dans `1..=MAX_CONTEXT_LEN`.
    pub fn new(max_run: usize) -> Self {
        Self {
            max_run: max_run.clamp(1, MAX_CONTEXT_LEN),
        }
    }

    /// Longueur maximale autorisée
    pub fn max_run(&self) -> usize {
        self.max_run
    }
}

impl Default for Homopolymer {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Criteria for Homopolymer {
    fn name(&self) -> &str {
        "homopolymer"
    }

    fn context_len(&self) -> usize {
        self.max_run
    }

    fn accepts(&self, window: &[Nt]) -> bool {
        match window.split_last() {
            Some((candidate, context)) => {
                context.len() < self.max_run || context.iter().any(|b| b != candidate)
            }
            None => true,
        }
    }
}

/// Accepte toutes les séquences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unconstrained;

impl Criteria for Unconstrained {
    fn name(&self) -> &str {
        "unconstrained"
    }

    fn context_len(&self) -> usize {
        0
    }

    fn accepts(&self, _window: &[Nt]) -> bool {
        true
    }
}

/// Trouve la longueur maximale d'homopolymère dans une séquence
pub fn find_max_homopolymer(bases: &[Nt]) -> usize {
    if bases.is_empty() {
        return 0;
    }

    let mut max_run = 1;
    let mut current_run = 1;

    for window in bases.windows(2) {
        if window[0] == window[1] {
            current_run += 1;
            max_run = max_run.max(current_run);
        } else {
            current_run = 1;
        }
    }

    max_run
}
