//! Localisation des amorces lors du décodage

use crate::error::{OligoError, Result};
use crate::sequence::{Nt, Oligo};
use std::ops::Range;

/// Nombre d'erreurs tolérées dans une amorce
pub const PRIMER_ERRORS: usize = 3;

/// Longueur minimale de l'amorce 5' (elle fournit le premier contexte)
pub const MIN_PRIMER5_LEN: usize = 4;

/// Localise le corps de l'oligo entre les amorces
///
/// L'amorce 5' doit commencer en position 0 et l'amorce 3' finir
/// exactement en fin d'oligo, chacune à au plus [`PRIMER_ERRORS`] éditions.
pub fn locate_body(p5: &[Nt], p3: &[Nt], oligo: &Oligo) -> Result<Range<usize>> {
    let head = oligo
        .find(p5, PRIMER_ERRORS)
        .filter(|m| m.position == 0)
        .ok_or(OligoError::PrimerMismatch)?;

    let tail = oligo
        .find(p3, PRIMER_ERRORS)
        .filter(|m| m.end() == oligo.len())
        .ok_or(OligoError::PrimerMismatch)?;

    if tail.position < head.end() {
        return Err(OligoError::PrimerMismatch);
    }

    tracing::trace!(
        "amorces localisées: 5' d={} [0..{}), 3' d={} [{}..{})",
        head.distance,
        head.end(),
        tail.distance,
        tail.position,
        tail.end()
    );

    Ok(head.end()..tail.position)
}

#[cfg(test)]
mod tests {
    use super::*;

    const P5: &str = "ACACGACGCTCTTCCGATCT";
    const P3: &str = "AGATCGGAAGAGCACACGTC";

    fn oligo(s: &str) -> Oligo {
        s.parse().unwrap()
    }

    fn bases(s: &str) -> Vec<Nt> {
        oligo(s).into_bases()
    }

    #[test]
    fn test_exact_primers() {
        let full = oligo(&format!("{}GATTACAGATTACA{}", P5, P3));
        let body = locate_body(&bases(P5), &bases(P3), &full).unwrap();
        assert_eq!(body, 20..34);
    }

    #[test]
    fn test_missing_primers() {
        let p5 = bases(P5);
        let p3 = bases(P3);

        let no_head = oligo(&format!("GATTACAGATTACA{}", P3));
        assert!(matches!(locate_body(&p5, &p3, &no_head), Err(OligoError::PrimerMismatch)));

        let no_tail = oligo(&format!("{}GATTACAGATTACA", P5));
        assert!(matches!(locate_body(&p5, &p3, &no_tail), Err(OligoError::PrimerMismatch)));

        // Amorce 3' présente mais suivie de bases parasites
        let trailing = oligo(&format!("{}GATTACAGATTACA{}CCCCGGGG", P5, P3));
        assert!(matches!(locate_body(&p5, &p3, &trailing), Err(OligoError::PrimerMismatch)));
    }
}
