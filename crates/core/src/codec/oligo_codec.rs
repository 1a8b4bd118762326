//! Codec de niveau 1 : blocs de données + adresse <-> oligo
//!
//! Structure d'un oligo :
//!
//! ```text
//! [amorce 5'] ([données 17 nt][métadonnées M ou 5 nt]) × B [amorce 3']
//! ```
//!
//! L'encodage essaie d'abord la polarité directe et bascule sur la charge
//! utile complémentée si le contenu GC dépasse [`GC_THRESHOLD`]. Le décodage
//! suppose d'abord la polarité directe, puis refait une seule passe en
//! polarité inversée si les métadonnées l'indiquent.

use crate::codec::address::{AddressPacker, Unpacked};
use crate::codec::block::{
    invert_block, Block, BlockLayout, ParsedBody, BLOCK_SIZE, DATA_SEGMENT_LEN, DATA_WORD_BITS,
    PARITY_SEGMENT_LEN, PREFIX_LEN,
};
use crate::codec::primer::{locate_body, MIN_PRIMER5_LEN};
use crate::codec::recovery::{ErasureRecovery, Recovery};
use crate::codec::segment::SegmentCodec;
use crate::constraints::Criteria;
use crate::error::{fatal, Inconsistency, OligoError, Result};
use crate::sequence::{Nt, Oligo};
use std::sync::Arc;

/// Contenu GC maximal d'un oligo
pub const GC_THRESHOLD: f64 = 0.6;

/// Polarité de la charge utile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Octets tels quels
    Direct,
    /// Octets complémentés pour réduire le contenu GC
    Inverted,
}

impl Polarity {
    pub fn is_inverted(self) -> bool {
        self == Polarity::Inverted
    }
}

/// Résultat du décodage d'un oligo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub address: u64,
    /// Oligo d'effacement
    pub erasure: bool,
    /// L'oligo avait été encodé en polarité inversée
    pub inverted: bool,
    /// Un bloc par position ; `None` si la parité du bloc est fausse
    pub blocks: Vec<Option<Block>>,
}

impl Decoded {
    /// Nombre de blocs récupérés
    pub fn recovered_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }
}

/// Codec d'oligos de niveau 1
///
/// Immuable après construction : une même instance peut servir à des
/// encodages et décodages concurrents.
#[derive(Debug)]
pub struct OligoCodec {
    layout: BlockLayout,
    packer: AddressPacker,
    segments: SegmentCodec,
    criteria: Arc<dyn Criteria>,
    recovery: Arc<dyn Recovery>,
}

impl OligoCodec {
    /// Crée un codec de `blocks` blocs, dont `erasure_blocks` portent la
    /// parité des métadonnées, avec des chiffres de métadonnées de
    /// `metadata_width` bases (3, 4 ou 5)
    ///
    /// Le critère doit laisser, après n'importe quel contexte, assez de
    /// segments pour un mot de données, un chiffre de métadonnées et un
    /// octet de parité ; sinon la construction échoue avec
    /// [`Inconsistency::InsufficientCapacity`].
    pub fn new(
        blocks: usize,
        metadata_width: usize,
        erasure_blocks: usize,
        criteria: Arc<dyn Criteria>,
    ) -> Result<Self> {
        let packer = AddressPacker::new(metadata_width, blocks, erasure_blocks)?;
        let segments = SegmentCodec::new(Arc::clone(&criteria), DATA_SEGMENT_LEN);

        let mut required = vec![
            (DATA_SEGMENT_LEN, 1u64 << DATA_WORD_BITS),
            (metadata_width, packer.base()),
        ];
        if erasure_blocks > 0 {
            required.push((PARITY_SEGMENT_LEN, 1 << u8::BITS));
        }
        for (width, needed) in required {
            let capacity = segments.min_capacity(width);
            if capacity < needed {
                return Err(fatal(Inconsistency::InsufficientCapacity {
                    width,
                    capacity,
                    required: needed,
                }));
            }
        }

        let codec = Self {
            layout: BlockLayout {
                blocks,
                erasure_blocks,
                metadata_width,
            },
            packer,
            segments,
            criteria,
            recovery: Arc::new(ErasureRecovery),
        };

        tracing::debug!(
            "codec créé: {} blocs, {} de parité, métadonnées {} nt, critère {}, oligo {} nt",
            blocks,
            erasure_blocks,
            metadata_width,
            codec.criteria.name(),
            codec.oligo_len()
        );

        Ok(codec)
    }

    /// Remplace la stratégie de récupération des métadonnées
    pub fn with_recovery(mut self, recovery: Arc<dyn Recovery>) -> Self {
        self.recovery = recovery;
        self
    }

    /// Nombre de blocs par oligo
    pub fn block_num(&self) -> usize {
        self.layout.blocks
    }

    /// Nombre d'octets par bloc de données
    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Nombre d'octets de données par oligo
    pub fn data_len(&self) -> usize {
        self.layout.blocks * BLOCK_SIZE
    }

    /// Longueur de l'oligo, amorces non comprises
    pub fn oligo_len(&self) -> usize {
        self.layout.body_len()
    }

    /// Borne exclusive des adresses encodables
    pub fn max_addr(&self) -> u64 {
        self.packer.max_addr()
    }

    /// Largeur des chiffres de métadonnées de données
    pub fn metadata_width(&self) -> usize {
        self.layout.metadata_width
    }

    /// Nombre de blocs de parité des métadonnées
    pub fn erasure_blocks(&self) -> usize {
        self.layout.erasure_blocks
    }

    /// Critère biochimique appliqué
    pub fn criteria(&self) -> &dyn Criteria {
        self.criteria.as_ref()
    }

    /// Empaqueteur d'adresses
    pub fn packer(&self) -> &AddressPacker {
        &self.packer
    }

    /// Codec de segments
    pub fn segments(&self) -> &SegmentCodec {
        &self.segments
    }

    /// Largeur du segment de métadonnées du bloc `index`
    pub fn metadata_len(&self, index: usize) -> usize {
        if index < self.layout.blocks {
            self.layout.metadata_len(index)
        } else {
            PARITY_SEGMENT_LEN
        }
    }

    /// Encode des données dans un oligo
    ///
    /// `p5` et `p3` sont les amorces 5' et 3' ; `p5` doit faire au moins
    /// quatre bases. `erasure` marque un oligo portant de la redondance.
    pub fn encode<B: AsRef<[u8]>>(
        &self,
        p5: &Oligo,
        p3: &Oligo,
        address: u64,
        erasure: bool,
        data: &[B],
    ) -> Result<Oligo> {
        let direct = self.encode_with_polarity(p5, p3, address, erasure, Polarity::Direct, data)?;
        let direct_gc = self.criteria.gc_content(direct.bases());
        if direct_gc <= GC_THRESHOLD {
            return Ok(direct);
        }

        let inverted = self.encode_with_polarity(p5, p3, address, erasure, Polarity::Inverted, data)?;
        let inverted_gc = self.criteria.gc_content(inverted.bases());
        if inverted_gc > GC_THRESHOLD {
            return Err(fatal(Inconsistency::BothPolaritiesHighGc {
                direct: direct_gc,
                inverted: inverted_gc,
            }));
        }

        tracing::debug!(
            "adresse {}: GC {:.3} > {}, polarité inversée ({:.3})",
            address,
            direct_gc,
            GC_THRESHOLD,
            inverted_gc
        );

        Ok(inverted)
    }

    /// Encode des données avec une polarité imposée, sans équilibrage GC
    pub fn encode_with_polarity<B: AsRef<[u8]>>(
        &self,
        p5: &Oligo,
        p3: &Oligo,
        address: u64,
        erasure: bool,
        polarity: Polarity,
        data: &[B],
    ) -> Result<Oligo> {
        if data.len() != self.block_num() {
            return Err(OligoError::InvalidBlockCount {
                expected: self.block_num(),
                actual: data.len(),
            });
        }

        let mut blocks = Vec::with_capacity(data.len());
        for (index, block) in data.iter().enumerate() {
            let block: Block = block.as_ref().try_into().map_err(|_| OligoError::InvalidBlockSize {
                index,
                expected: BLOCK_SIZE,
                actual: block.as_ref().len(),
            })?;
            blocks.push(if polarity.is_inverted() {
                invert_block(&block)
            } else {
                block
            });
        }

        if p5.len() < MIN_PRIMER5_LEN {
            return Err(OligoError::PrimerTooShort {
                len: p5.len(),
                min: MIN_PRIMER5_LEN,
            });
        }

        let digits = self.packer.pack(address, erasure, polarity.is_inverted())?;

        let mut oligo = Oligo::with_capacity(p5.len() + self.oligo_len() + p3.len());
        oligo.append(p5.bases());
        self.layout.assemble(&self.segments, &mut oligo, &blocks, &digits)?;
        oligo.append(p3.bases());

        Ok(oligo)
    }

    /// Décode un oligo en adresse, drapeaux et blocs de données
    ///
    /// Si `recover` est vrai, un échec de vérification des métadonnées est
    /// confié à la stratégie de récupération au lieu de produire
    /// [`OligoError::MetadataUnrecoverable`].
    pub fn decode(&self, p5: &Oligo, p3: &Oligo, oligo: &Oligo, recover: bool) -> Result<Decoded> {
        let first = self.decode_with_polarity(p5, p3, oligo, Polarity::Direct, recover)?;
        if !first.inverted {
            return Ok(first);
        }

        // Oligo à GC élevé : une seule passe supplémentaire, renvoyée telle quelle
        tracing::trace!("polarité inversée détectée, seconde passe");
        self.decode_with_polarity(p5, p3, oligo, Polarity::Inverted, recover)
    }

    /// Une passe de décodage sous une hypothèse de polarité
    pub fn decode_with_polarity(
        &self,
        p5: &Oligo,
        p3: &Oligo,
        oligo: &Oligo,
        polarity: Polarity,
        recover: bool,
    ) -> Result<Decoded> {
        if p5.len() < MIN_PRIMER5_LEN {
            return Err(OligoError::PrimerTooShort {
                len: p5.len(),
                min: MIN_PRIMER5_LEN,
            });
        }

        let range = locate_body(p5.bases(), p3.bases(), oligo)?;
        let body = &oligo.bases()[range];

        let parsed = self.parse_body(p5.bases(), body, polarity.is_inverted());

        let verified = parsed
            .complete_digits()
            .filter(|digits| self.packer.verify(digits));

        let (blocks, digits) = match verified {
            Some(digits) => (parsed.blocks, digits),
            None if !recover => return Err(OligoError::MetadataUnrecoverable),
            None => {
                tracing::warn!("vérification des métadonnées échouée, récupération");
                let recovered = self
                    .recovery
                    .recover(self, p5, p3, body, polarity.is_inverted())?;
                (recovered.blocks, recovered.digits)
            }
        };

        let Unpacked {
            address,
            erasure,
            inverted,
        } = self.packer.unpack(&digits);

        Ok(Decoded {
            address,
            erasure,
            inverted,
            blocks,
        })
    }

    /// Analyse le corps d'un oligo (amorces retirées)
    ///
    /// Le premier contexte est formé des quatre dernières bases de `p5`.
    pub fn parse_body(&self, p5: &[Nt], body: &[Nt], inverted: bool) -> ParsedBody {
        let prefix = &p5[p5.len().saturating_sub(PREFIX_LEN)..];
        self.layout.parse(&self.segments, prefix, body, inverted)
    }
}
