//! Empaquetage de l'adresse et des drapeaux en chiffres de métadonnées
//!
//! La valeur `adresse + ef·max + sf·2·max` est découpée en `B − R`
//! chiffres de base `baseM` (poids fort en premier), suivis de `R`
//! chiffres de parité Reed-Solomon d'un octet chacun. Le quart supérieur de
//! l'espace des chiffres (facteur 4) est réservé aux deux drapeaux.

use crate::codec::erasure::MetadataErasure;
use crate::error::{fatal, Inconsistency, OligoError, Result};

/// Nombre de valeurs représentables par un chiffre de métadonnées de
/// `width` bases, ou `None` pour une largeur non prise en charge
pub const fn metadata_base(width: usize) -> Option<u64> {
    match width {
        3 => Some(47),
        4 => Some(186),
        5 => Some(733),
        _ => None,
    }
}

/// Adresse et drapeaux extraits des chiffres de métadonnées
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unpacked {
    pub address: u64,
    /// Oligo d'effacement (porte de la redondance)
    pub erasure: bool,
    /// Charge utile complémentée pour réduire le GC
    pub inverted: bool,
}

/// Conversion adresse + drapeaux <-> chiffres de métadonnées
#[derive(Debug)]
pub struct AddressPacker {
    width: usize,
    base: u64,
    max_addr: u64,
    erasure: MetadataErasure,
}

impl AddressPacker {
    /// Crée un empaqueteur pour `blocks` chiffres dont `erasure_blocks` de
    /// parité, chaque chiffre de données faisant `width` bases
    pub fn new(width: usize, blocks: usize, erasure_blocks: usize) -> Result<Self> {
        let base = metadata_base(width).ok_or(OligoError::InvalidMetadataWidth(width))?;

        let data_digits = blocks.checked_sub(erasure_blocks).ok_or_else(|| {
            fatal(Inconsistency::ErasureCoder {
                data: 0,
                parity: erasure_blocks,
            })
        })?;

        let erasure = MetadataErasure::new(data_digits, erasure_blocks).map_err(fatal)?;

        let space = u32::try_from(data_digits)
            .ok()
            .and_then(|digits| base.checked_pow(digits))
            .ok_or_else(|| {
                fatal(Inconsistency::AddressSpaceOverflow {
                    base,
                    digits: data_digits,
                })
            })?;

        Ok(Self {
            width,
            base,
            max_addr: space / 4,
            erasure,
        })
    }

    /// Largeur (en bases) d'un chiffre de données
    pub fn width(&self) -> usize {
        self.width
    }

    /// Base des chiffres de données
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Nombre de chiffres portant l'adresse
    pub fn data_digits(&self) -> usize {
        self.erasure.data_shards()
    }

    /// Nombre de chiffres de parité
    pub fn parity_digits(&self) -> usize {
        self.erasure.parity_shards()
    }

    /// Nombre total de chiffres (un par bloc)
    pub fn total_digits(&self) -> usize {
        self.erasure.total_shards()
    }

    /// Borne de l'espace d'adresses : `floor(baseM^(B−R) / 4)`
    ///
    /// Les adresses valides sont strictement inférieures à cette borne.
    pub fn max_addr(&self) -> u64 {
        self.max_addr
    }

    /// Code d'effacement des chiffres
    pub fn erasure(&self) -> &MetadataErasure {
        &self.erasure
    }

    /// Vrai si `digit` est une valeur possible en position `index`
    pub fn digit_in_range(&self, index: usize, digit: u64) -> bool {
        if index < self.data_digits() {
            digit < self.base
        } else {
            digit <= u64::from(u8::MAX)
        }
    }

    /// Calcule les chiffres de métadonnées (données puis parité)
    ///
    /// Échoue avec [`OligoError::AddressOutOfRange`] dès que
    /// `address >= max_addr()` : la borne est exclusive.
    pub fn pack(&self, address: u64, erasure: bool, inverted: bool) -> Result<Vec<u64>> {
        // `max_addr` lui-même se confondrait avec (0, ef) au décodage
        if address >= self.max_addr {
            return Err(OligoError::AddressOutOfRange {
                address,
                max: self.max_addr,
            });
        }

        let mut value = address;
        if inverted {
            value += 2 * self.max_addr;
        }
        if erasure {
            value += self.max_addr;
        }

        let mut digits = vec![0u64; self.total_digits()];
        for digit in digits[..self.data_digits()].iter_mut().rev() {
            *digit = value % self.base;
            value /= self.base;
        }

        if value != 0 {
            return Err(fatal(Inconsistency::NonZeroResidual(value)));
        }

        // Le code d'effacement travaille octet par octet
        if self.width * 2 > 8 {
            return Err(fatal(Inconsistency::MetadataTooWide(self.width)));
        }

        let mut shards: Vec<u8> = digits.iter().map(|&d| d as u8).collect();
        self.erasure.encode(&mut shards)?;

        Ok(shards.into_iter().map(u64::from).collect())
    }

    /// Vérifie des chiffres décodés contre le code d'effacement
    pub fn verify(&self, digits: &[u64]) -> bool {
        if digits.len() != self.total_digits() {
            return false;
        }

        if digits
            .iter()
            .enumerate()
            .any(|(i, &d)| !self.digit_in_range(i, d))
        {
            return false;
        }

        let shards: Vec<u8> = digits.iter().map(|&d| d as u8).collect();
        self.erasure.verify(&shards)
    }

    /// Reconstitue l'adresse et les drapeaux (`sf` est testé avant `ef`)
    pub fn unpack(&self, digits: &[u64]) -> Unpacked {
        let mut value = digits
            .iter()
            .take(self.data_digits())
            .fold(0u64, |acc, &d| acc.wrapping_mul(self.base).wrapping_add(d));

        let inverted = value >= 2 * self.max_addr;
        if inverted {
            value -= 2 * self.max_addr;
        }

        let erasure = value >= self.max_addr;
        if erasure {
            value -= self.max_addr;
        }

        Unpacked {
            address: value,
            erasure,
            inverted,
        }
    }
}
