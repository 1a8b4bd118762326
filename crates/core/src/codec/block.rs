//! Assemblage et analyse des blocs d'un oligo
//!
//! Le corps d'un oligo est une suite de `B` paires (segment de données de
//! 17 bases, segment de métadonnées). Le segment de métadonnées fait `M`
//! bases pour les `B − R` premiers blocs et 5 bases pour les `R` blocs de
//! parité, afin qu'un octet quelconque y tienne.

use crate::codec::segment::SegmentCodec;
use crate::error::Result;
use crate::sequence::{Nt, Oligo};

/// Longueur d'un segment de données (32 bits + 1 bit de parité)
pub const DATA_SEGMENT_LEN: usize = 17;

/// Longueur d'un segment de métadonnées de parité
pub const PARITY_SEGMENT_LEN: usize = 5;

/// Bits significatifs d'un mot de données
pub const DATA_WORD_BITS: u32 = 33;

/// Nombre d'octets par bloc de données
pub const BLOCK_SIZE: usize = 4;

/// Longueur du préfixe de contexte transmis au codec de segments
pub const PREFIX_LEN: usize = 4;

/// Bloc de données de 4 octets
pub type Block = [u8; BLOCK_SIZE];

/// Mot de 33 bits : valeur petit-boutiste décalée d'un bit, plus un bit de
/// parité rendant le nombre total de bits à 1 pair
pub fn data_word(block: &Block) -> u64 {
    let word = u64::from(u32::from_le_bytes(*block)) << 1;
    word | u64::from(word.count_ones() % 2)
}

/// Valeur 32 bits d'un mot dont la parité est correcte
///
/// Un mot portant des bits au-delà du 33e est rejeté.
pub fn check_word(word: u64) -> Option<u32> {
    if word >> DATA_WORD_BITS != 0 || word.count_ones() % 2 != 0 {
        return None;
    }
    u32::try_from(word >> 1).ok()
}

/// Complément binaire d'un bloc
pub fn invert_block(block: &Block) -> Block {
    block.map(|b| !b)
}

/// Résultat de l'analyse du corps d'un oligo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBody {
    /// Blocs dont la parité est correcte (`None` sinon)
    pub blocks: Vec<Option<Block>>,
    /// Chiffres de métadonnées décodés (`None` si illisibles)
    pub digits: Vec<Option<u64>>,
}

impl ParsedBody {
    /// Vrai si tous les chiffres de métadonnées ont été lus
    pub fn digits_complete(&self) -> bool {
        self.digits.iter().all(Option::is_some)
    }

    /// Chiffres lus, si tous sont présents
    pub fn complete_digits(&self) -> Option<Vec<u64>> {
        self.digits.iter().copied().collect()
    }
}

/// Disposition des segments dans le corps d'un oligo
#[derive(Debug, Clone, Copy)]
pub struct BlockLayout {
    pub blocks: usize,
    pub erasure_blocks: usize,
    pub metadata_width: usize,
}

impl BlockLayout {
    /// Largeur du segment de métadonnées du bloc `index`
    pub fn metadata_len(&self, index: usize) -> usize {
        if index >= self.blocks - self.erasure_blocks {
            PARITY_SEGMENT_LEN
        } else {
            self.metadata_width
        }
    }

    /// Longueur du corps (sans les amorces)
    pub fn body_len(&self) -> usize {
        self.blocks * DATA_SEGMENT_LEN
            + self.metadata_width * (self.blocks - self.erasure_blocks)
            + PARITY_SEGMENT_LEN * self.erasure_blocks
    }

    /// Ajoute à `oligo` les segments de tous les blocs
    ///
    /// `oligo` doit déjà contenir au moins [`PREFIX_LEN`] bases (l'amorce 5').
    pub fn assemble(
        &self,
        segments: &SegmentCodec,
        oligo: &mut Oligo,
        blocks: &[Block],
        digits: &[u64],
    ) -> Result<()> {
        for (index, (block, &digit)) in blocks.iter().zip(digits).enumerate() {
            let data = segments.encode_spread(
                oligo.tail(PREFIX_LEN),
                data_word(block),
                DATA_WORD_BITS,
                DATA_SEGMENT_LEN,
            )?;
            oligo.append(data.bases());

            let metadata = segments.encode(oligo.tail(PREFIX_LEN), digit, self.metadata_len(index))?;
            oligo.append(metadata.bases());
        }

        Ok(())
    }

    /// Analyse le corps d'un oligo, bloc par bloc
    ///
    /// `prefix` est le contexte du premier segment (fin de l'amorce 5'). Un
    /// segment court ou illisible donne un bloc ou un chiffre absent sans
    /// interrompre l'analyse.
    pub fn parse(&self, segments: &SegmentCodec, prefix: &[Nt], body: &[Nt], inverted: bool) -> ParsedBody {
        let mut blocks = Vec::with_capacity(self.blocks);
        let mut digits = Vec::with_capacity(self.blocks);

        let mut prefix = prefix;
        let mut rest = body;
        for index in 0..self.blocks {
            let metadata_len = self.metadata_len(index);

            blocks.push(parse_data(segments, prefix, rest, inverted));
            digits.push(parse_metadata(segments, rest, metadata_len));

            let consumed = DATA_SEGMENT_LEN + metadata_len;
            prefix = clamped(rest, consumed - PREFIX_LEN, consumed);
            rest = clamped(rest, consumed, rest.len());
        }

        ParsedBody { blocks, digits }
    }
}

fn clamped(bases: &[Nt], start: usize, end: usize) -> &[Nt] {
    let end = end.min(bases.len());
    &bases[start.min(end)..end]
}

/// Décode le segment de données en tête de `rest`
fn parse_data(segments: &SegmentCodec, prefix: &[Nt], rest: &[Nt], inverted: bool) -> Option<Block> {
    if rest.len() < DATA_SEGMENT_LEN {
        return None;
    }

    let word = segments
        .decode_spread(prefix, &rest[..DATA_SEGMENT_LEN], DATA_WORD_BITS)
        .ok()?;
    let value = check_word(word)?;
    let value = if inverted { !value } else { value };
    Some(value.to_le_bytes())
}

/// Décode le segment de métadonnées qui suit le segment de données
///
/// Son contexte est la fin du segment de données tel que lu, même si ce
/// dernier était invalide.
fn parse_metadata(segments: &SegmentCodec, rest: &[Nt], metadata_len: usize) -> Option<u64> {
    let end = DATA_SEGMENT_LEN + metadata_len;
    if rest.len() < end {
        return None;
    }

    let prefix = &rest[DATA_SEGMENT_LEN - PREFIX_LEN..DATA_SEGMENT_LEN];
    segments.decode(prefix, &rest[DATA_SEGMENT_LEN..end]).ok()
}
