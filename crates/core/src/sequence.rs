//! Séquences de nucléotides (oligos)

use crate::error::{OligoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nucléotide standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Nt {
    A, // Adénine
    C, // Cytosine
    G, // Guanine
    T, // Thymine
}

impl Nt {
    /// Les quatre bases, dans l'ordre de leur index
    pub const ALL: [Nt; 4] = [Nt::A, Nt::C, Nt::G, Nt::T];

    /// Convertit un caractère en base
    pub fn from_char(c: char) -> Result<Self> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Nt::A),
            'C' => Ok(Nt::C),
            'G' => Ok(Nt::G),
            'T' => Ok(Nt::T),
            _ => Err(OligoError::InvalidBase(c)),
        }
    }

    /// Convertit une base en caractère
    pub fn as_char(self) -> char {
        match self {
            Nt::A => 'A',
            Nt::C => 'C',
            Nt::G => 'G',
            Nt::T => 'T',
        }
    }

    /// Index 2 bits (A=0, C=1, G=2, T=3)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Base correspondant à un index 2 bits
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index & 0b11]
    }

    /// Retourne true si c'est une base GC
    pub fn is_gc(self) -> bool {
        matches!(self, Nt::G | Nt::C)
    }
}

impl fmt::Display for Nt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Nt {
    type Error = OligoError;

    fn try_from(c: char) -> Result<Self> {
        Nt::from_char(c)
    }
}

/// Ratio GC d'une suite de bases (0.0 pour une suite vide)
pub fn gc_content(bases: &[Nt]) -> f64 {
    if bases.is_empty() {
        return 0.0;
    }

    let gc_count = bases.iter().filter(|b| b.is_gc()).count();
    gc_count as f64 / bases.len() as f64
}

/// Occurrence approchée d'un motif dans un oligo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimerMatch {
    /// Position de début dans le texte
    pub position: usize,
    /// Nombre de bases du texte couvertes
    pub len: usize,
    /// Distance d'édition avec le motif
    pub distance: usize,
}

impl PrimerMatch {
    /// Position juste après l'occurrence
    pub fn end(&self) -> usize {
        self.position + self.len
    }
}

/// Oligo : suite de nucléotides possédée
///
/// Les extractions (`slice`) produisent des copies indépendantes ; aucun
/// oligo ne partage son stockage avec un autre.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Oligo {
    bases: Vec<Nt>,
}

impl Oligo {
    /// Crée un oligo vide
    pub fn new() -> Self {
        Self::default()
    }

    /// Crée un oligo vide avec une capacité réservée
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bases: Vec::with_capacity(capacity),
        }
    }

    /// Crée un oligo depuis des bases
    pub fn from_bases(bases: Vec<Nt>) -> Self {
        Self { bases }
    }

    /// Retourne les bases
    pub fn bases(&self) -> &[Nt] {
        &self.bases
    }

    /// Consomme l'oligo et retourne ses bases
    pub fn into_bases(self) -> Vec<Nt> {
        self.bases
    }

    /// Retourne la longueur de l'oligo
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Vérifie si l'oligo est vide
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Copie de la plage `[start, end)`, bornes ramenées dans l'oligo
    pub fn slice(&self, start: usize, end: usize) -> Oligo {
        let end = end.min(self.bases.len());
        let start = start.min(end);
        Oligo::from_bases(self.bases[start..end].to_vec())
    }

    /// Les `n` dernières bases (toutes si l'oligo est plus court)
    pub fn tail(&self, n: usize) -> &[Nt] {
        &self.bases[self.bases.len().saturating_sub(n)..]
    }

    /// Ajoute une copie des bases en fin d'oligo
    pub fn append(&mut self, bases: &[Nt]) {
        self.bases.extend_from_slice(bases);
    }

    /// Remplace la base en position `index`
    pub fn set(&mut self, index: usize, base: Nt) {
        self.bases[index] = base;
    }

    /// Ratio GC
    pub fn gc_content(&self) -> f64 {
        gc_content(&self.bases)
    }

    /// Longueur du plus long homopolymère
    pub fn max_homopolymer(&self) -> usize {
        crate::constraints::find_max_homopolymer(&self.bases)
    }

    /// Recherche approchée de `pattern` avec au plus `max_errors` éditions
    ///
    /// Parmi les alignements acceptables, retient la plus petite distance,
    /// puis la position la plus à gauche, puis la longueur la plus proche de
    /// celle du motif.
    pub fn find(&self, pattern: &[Nt], max_errors: usize) -> Option<PrimerMatch> {
        let text = &self.bases;
        let m = pattern.len();
        if m == 0 {
            return None;
        }

        let mut best: Option<(usize, usize, usize, PrimerMatch)> = None;
        let mut prev = Vec::new();
        let mut cur = Vec::new();

        for start in 0..text.len() {
            let window = &text[start..text.len().min(start + m + max_errors)];

            // Ligne i : distance entre pattern[..i] et window[..l]
            prev.clear();
            prev.extend(0..=window.len());
            for (i, &p) in pattern.iter().enumerate() {
                cur.clear();
                cur.push(i + 1);
                for (l, &t) in window.iter().enumerate() {
                    let substitution = prev[l] + usize::from(p != t);
                    let deletion = prev[l + 1] + 1;
                    let insertion = cur[l] + 1;
                    cur.push(substitution.min(deletion).min(insertion));
                }
                std::mem::swap(&mut prev, &mut cur);
            }

            for (len, &distance) in prev.iter().enumerate().skip(1) {
                if distance > max_errors {
                    continue;
                }

                let key = (distance, start, len.abs_diff(m));
                if best.map_or(true, |(d, s, l, _)| key < (d, s, l)) {
                    best = Some((
                        key.0,
                        key.1,
                        key.2,
                        PrimerMatch {
                            position: start,
                            len,
                            distance,
                        },
                    ));
                }
            }
        }

        best.map(|(_, _, _, found)| found)
    }
}

impl From<Vec<Nt>> for Oligo {
    fn from(bases: Vec<Nt>) -> Self {
        Self::from_bases(bases)
    }
}

impl From<&[Nt]> for Oligo {
    fn from(bases: &[Nt]) -> Self {
        Self::from_bases(bases.to_vec())
    }
}

impl AsRef<[Nt]> for Oligo {
    fn as_ref(&self) -> &[Nt] {
        &self.bases
    }
}

impl FromStr for Oligo {
    type Err = OligoError;

    fn from_str(s: &str) -> Result<Self> {
        let bases = s
            .trim()
            .chars()
            .map(Nt::from_char)
            .collect::<Result<Vec<Nt>>>()?;
        Ok(Self { bases })
    }
}

impl fmt::Display for Oligo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in &self.bases {
            write!(f, "{}", base.as_char())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oligo(s: &str) -> Oligo {
        s.parse().unwrap()
    }

    #[test]
    fn test_base_conversion() {
        assert_eq!(Nt::from_char('A').unwrap(), Nt::A);
        assert_eq!(Nt::from_char('g').unwrap(), Nt::G);
        assert!(Nt::from_char('N').is_err());
        assert_eq!(Nt::from_index(3), Nt::T);
        assert_eq!(Nt::C.index(), 1);
    }

    #[test]
    fn test_parse_and_display() {
        let o = oligo("acgtAC");
        assert_eq!(o.len(), 6);
        assert_eq!(o.to_string(), "ACGTAC");
        assert!("ACGU".parse::<Oligo>().is_err());
    }

    #[test]
    fn test_gc_content() {
        assert_eq!(oligo("ACGT").gc_content(), 0.5);
        assert_eq!(oligo("GGCC").gc_content(), 1.0);
        assert_eq!(Oligo::new().gc_content(), 0.0);
    }

    #[test]
    fn test_slice_is_independent() {
        let mut o = oligo("ACGTACGT");
        let s = o.slice(2, 5);
        assert_eq!(s.to_string(), "GTA");

        o.set(2, Nt::A);
        assert_eq!(s.to_string(), "GTA");

        // Bornes hors plage ramenées dans l'oligo
        assert_eq!(o.slice(6, 100).to_string(), "GT");
        assert!(o.slice(10, 12).is_empty());
    }

    #[test]
    fn test_tail_and_append() {
        let mut o = oligo("ACG");
        assert_eq!(o.tail(2), &[Nt::C, Nt::G]);
        assert_eq!(o.tail(10).len(), 3);

        let other = oligo("TT");
        o.append(other.bases());
        assert_eq!(o.to_string(), "ACGTT");
        assert_eq!(o.max_homopolymer(), 2);
    }

    #[test]
    fn test_find_exact_and_approximate() {
        let pattern = oligo("ACGT");

        let found = oligo("TTACGTAA").find(pattern.bases(), 0).unwrap();
        assert_eq!((found.position, found.len, found.distance), (2, 4, 0));
        assert_eq!(found.end(), 6);

        let found = oligo("TTACCTAA").find(pattern.bases(), 1).unwrap();
        assert_eq!((found.position, found.len, found.distance), (2, 4, 1));

        assert!(oligo("TTTTTTTT").find(pattern.bases(), 1).is_none());
    }

    #[test]
    fn test_find_prefers_pattern_length_on_ties() {
        // Dernière base corrompue : l'alignement pleine longueur gagne
        let found = oligo("ACGAGGGG").find(oligo("ACGT").bases(), 1).unwrap();
        assert_eq!((found.position, found.len, found.distance), (0, 4, 1));
    }
}
