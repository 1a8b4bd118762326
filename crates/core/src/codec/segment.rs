//! Codec de segments (niveau 0) : entier <-> segment de nucléotides
//!
//! Codage énumératif : la valeur `v` est représentée par la `v`-ième
//! séquence valide de `width` bases pouvant suivre le préfixe, au sens d'un
//! critère biochimique. Les séquences sont énumérées dans l'ordre
//! colexicographique de [`SYMBOL_ORDER`] : la dernière base porte le choix
//! de poids fort, la première celui de poids faible.
//!
//! Les bases fortes (C, G) sont énumérées en premier : les petites valeurs
//! donnent des segments riches en GC, les grandes des segments pauvres. Le
//! préfixe ne contraint que les premières bases, donc les bits de poids
//! faible ; deux rangs miroirs `r` et `capacité − 1 − r` donnent ainsi des
//! segments de contenus GC presque complémentaires, quel que soit le
//! contexte.

use crate::constraints::{Criteria, MAX_CONTEXT_LEN};
use crate::error::{OligoError, Result};
use crate::sequence::{Nt, Oligo};
use std::borrow::Cow;
use std::sync::Arc;

/// Ordre d'énumération des bases
pub const SYMBOL_ORDER: [Nt; 4] = [Nt::C, Nt::G, Nt::A, Nt::T];

/// Automate du critère et dénombrement des séquences valides
///
/// Un état code en base 4 (base la plus ancienne en poids fort) les
/// dernières bases lues, au moins une, pour que la dernière base d'un état
/// soit toujours connue.
#[derive(Debug, Clone)]
struct CountTable {
    context_len: usize,
    state_len: usize,
    states: usize,
    width: usize,
    /// État suivant par base (indexé par [`Nt::index`]), `None` si refusée
    moves: Vec<[Option<usize>; 4]>,
    /// Continuations valides, par longueur restante et par état
    counts: Vec<u64>,
}

impl CountTable {
    fn build(criteria: &dyn Criteria, width: usize) -> Self {
        let context_len = criteria.context_len().min(MAX_CONTEXT_LEN);
        let state_len = context_len.max(1);
        let states = 1usize << (2 * state_len);

        let moves: Vec<[Option<usize>; 4]> = (0..states)
            .map(|state| {
                let mut window = Self::window_of(state, state_len);
                let mut row = [None; 4];
                for base in Nt::ALL {
                    window[state_len] = base;
                    if criteria.accepts(&window[state_len - context_len..=state_len]) {
                        row[base.index()] = Some(Self::next_state(state, base, states));
                    }
                }
                row
            })
            .collect();

        let mut counts = vec![0u64; (width + 1) * states];
        counts[..states].fill(1);
        for remaining in 1..=width {
            for state in 0..states {
                let total = moves[state].iter().flatten().fold(0u64, |total, &next| {
                    total.saturating_add(counts[(remaining - 1) * states + next])
                });
                counts[remaining * states + state] = total;
            }
        }

        Self {
            context_len,
            state_len,
            states,
            width,
            moves,
            counts,
        }
    }

    fn count(&self, remaining: usize, state: usize) -> u64 {
        self.counts[remaining * self.states + state]
    }

    fn window_of(state: usize, len: usize) -> [Nt; MAX_CONTEXT_LEN + 1] {
        let mut window = [Nt::A; MAX_CONTEXT_LEN + 1];
        for (j, slot) in window.iter_mut().take(len).enumerate() {
            *slot = Nt::from_index(state >> (2 * (len - 1 - j)));
        }
        window
    }

    fn next_state(state: usize, base: Nt, states: usize) -> usize {
        ((state << 2) | base.index()) & (states - 1)
    }

    /// État initial à partir des dernières bases du préfixe
    fn state_of(&self, prefix: &[Nt]) -> Option<usize> {
        if prefix.len() < self.context_len {
            return None;
        }

        let take = self.state_len.min(prefix.len());
        let context = &prefix[prefix.len() - take..];
        Some(context.iter().fold(0, |state, base| (state << 2) | base.index()))
    }

    fn capacity(&self, prefix: &[Nt], width: usize) -> Option<u64> {
        self.state_of(prefix).map(|state| self.count(width, state))
    }

    /// Plus petite capacité sur l'ensemble des contextes
    fn min_capacity(&self, width: usize) -> u64 {
        (0..self.states)
            .map(|state| self.count(width, state))
            .min()
            .unwrap_or(0)
    }

    /// `reach[len][state]` : séquences valides de `len` bases partant de
    /// `start` et finissant dans `state`
    fn reach(&self, start: usize, width: usize) -> Vec<u64> {
        let states = self.states;
        let mut reach = vec![0u64; (width + 1) * states];
        reach[start] = 1;

        for len in 1..=width {
            for state in 0..states {
                let paths = reach[(len - 1) * states + state];
                if paths == 0 {
                    continue;
                }
                for &next in self.moves[state].iter().flatten() {
                    let slot = &mut reach[len * states + next];
                    *slot = slot.saturating_add(paths);
                }
            }
        }

        reach
    }

    /// Vrai si `tail` peut suivre l'état `state`
    fn fits(&self, mut state: usize, tail: &[Nt]) -> bool {
        for base in tail.iter().take(self.context_len) {
            match self.moves[state][base.index()] {
                Some(next) => state = next,
                None => return false,
            }
        }
        true
    }

    /// Séquences valides dont la base `len − 1` vaut `base` et suivies de `tail`
    fn weight(&self, reach: &[u64], len: usize, base: Nt, tail: &[Nt]) -> u64 {
        (base.index()..self.states)
            .step_by(4)
            .filter(|&state| self.fits(state, tail))
            .fold(0u64, |total, state| {
                total.saturating_add(reach[len * self.states + state])
            })
    }

    fn encode(&self, prefix: &[Nt], value: u64, width: usize) -> Result<Oligo> {
        let start = self.state_of(prefix).ok_or_else(|| {
            OligoError::Encoding(format!(
                "préfixe trop court: {} < {} bases",
                prefix.len(),
                self.context_len
            ))
        })?;

        let capacity = self.count(width, start);
        if value >= capacity {
            return Err(OligoError::Encoding(format!(
                "valeur {} hors capacité ({} séquences de {} bases)",
                value, capacity, width
            )));
        }

        let reach = self.reach(start, width);
        let mut bases = vec![Nt::A; width];
        let mut rest = value;

        // De la dernière base vers la première
        for position in (0..width).rev() {
            let tail = &bases[position + 1..];
            let mut chosen = None;

            for base in SYMBOL_ORDER {
                let count = self.weight(&reach, position + 1, base, tail);
                if rest < count {
                    chosen = Some(base);
                    break;
                }
                rest -= count;
            }

            bases[position] = chosen.ok_or_else(|| {
                OligoError::Encoding(format!("aucune base valide en position {}", position))
            })?;
        }

        Ok(Oligo::from_bases(bases))
    }

    fn decode(&self, criteria: &dyn Criteria, prefix: &[Nt], segment: &[Nt]) -> Result<u64> {
        let start = self.state_of(prefix).ok_or_else(|| {
            OligoError::Decoding(format!(
                "préfixe trop court: {} < {} bases",
                prefix.len(),
                self.context_len
            ))
        })?;

        let mut state = start;
        for (position, observed) in segment.iter().enumerate() {
            state = self.moves[state][observed.index()].ok_or_else(|| {
                OligoError::Decoding(format!(
                    "critère {} violé en position {}",
                    criteria.name(),
                    position
                ))
            })?;
        }

        let reach = self.reach(start, segment.len());
        let mut value = 0u64;
        for (position, &observed) in segment.iter().enumerate().rev() {
            let tail = &segment[position + 1..];
            for base in SYMBOL_ORDER.into_iter().take_while(|&b| b != observed) {
                value = value.saturating_add(self.weight(&reach, position + 1, base, tail));
            }
        }

        Ok(value)
    }
}

/// Codec de segments lié à un critère, avec table de dénombrement précalculée
#[derive(Debug, Clone)]
pub struct SegmentCodec {
    criteria: Arc<dyn Criteria>,
    table: CountTable,
}

impl SegmentCodec {
    /// Crée un codec dont la table couvre les segments jusqu'à `max_width` bases
    pub fn new(criteria: Arc<dyn Criteria>, max_width: usize) -> Self {
        let table = CountTable::build(criteria.as_ref(), max_width);
        Self { criteria, table }
    }

    /// Critère appliqué
    pub fn criteria(&self) -> &dyn Criteria {
        self.criteria.as_ref()
    }

    /// Largeur maximale couverte par la table
    pub fn max_width(&self) -> usize {
        self.table.width
    }

    fn table_for(&self, width: usize) -> Cow<'_, CountTable> {
        if width > self.table.width {
            Cow::Owned(CountTable::build(self.criteria(), width))
        } else {
            Cow::Borrowed(&self.table)
        }
    }

    /// Nombre de segments valides de `width` bases après `prefix`
    pub fn capacity(&self, prefix: &[Nt], width: usize) -> u64 {
        self.table_for(width).capacity(prefix, width).unwrap_or(0)
    }

    /// Capacité garantie pour `width` bases, quel que soit le préfixe
    pub fn min_capacity(&self, width: usize) -> u64 {
        self.table_for(width).min_capacity(width)
    }

    /// Encode `value` en un segment d'exactement `width` bases
    pub fn encode(&self, prefix: &[Nt], value: u64, width: usize) -> Result<Oligo> {
        self.table_for(width).encode(prefix, value, width)
    }

    /// Décode un segment encodé après `prefix`
    pub fn decode(&self, prefix: &[Nt], segment: &[Nt]) -> Result<u64> {
        self.table_for(segment.len())
            .decode(self.criteria(), prefix, segment)
    }

    /// Encode une valeur de `bits` bits étalée sur tous les rangs du segment
    ///
    /// Le rang retenu est `⌊value · capacité / 2^bits⌋` : le complément de
    /// `value` tombe sur le rang miroir.
    pub fn encode_spread(&self, prefix: &[Nt], value: u64, bits: u32, width: usize) -> Result<Oligo> {
        let span = 1u128 << bits;
        let capacity = u128::from(self.capacity(prefix, width));
        if u128::from(value) >= span {
            return Err(OligoError::Encoding(format!(
                "valeur {} sur plus de {} bits",
                value, bits
            )));
        }
        if capacity < span {
            return Err(OligoError::Encoding(format!(
                "capacité {} insuffisante pour {} bits sur {} bases",
                capacity, bits, width
            )));
        }

        let rank = u128::from(value) * capacity / span;
        self.encode(prefix, rank as u64, width)
    }

    /// Inverse de [`SegmentCodec::encode_spread`]
    ///
    /// Un rang qui n'est l'image d'aucune valeur est une erreur de décodage.
    pub fn decode_spread(&self, prefix: &[Nt], segment: &[Nt], bits: u32) -> Result<u64> {
        let span = 1u128 << bits;
        let capacity = u128::from(self.capacity(prefix, segment.len()));
        if capacity < span {
            return Err(OligoError::Decoding(format!(
                "capacité {} insuffisante pour {} bits sur {} bases",
                capacity,
                bits,
                segment.len()
            )));
        }

        let rank = u128::from(self.decode(prefix, segment)?);
        let value = (rank * span).div_ceil(capacity);
        if value >= span || value * capacity / span != rank {
            return Err(OligoError::Decoding(format!("rang {} hors de l'image", rank)));
        }

        Ok(value as u64)
    }
}

/// Nombre de segments valides de `width` bases après `prefix`
pub fn capacity(prefix: &[Nt], width: usize, criteria: &dyn Criteria) -> u64 {
    CountTable::build(criteria, width)
        .capacity(prefix, width)
        .unwrap_or(0)
}

/// Encode `value` en un segment d'exactement `width` bases
pub fn encode(prefix: &[Nt], value: u64, width: usize, criteria: &dyn Criteria) -> Result<Oligo> {
    CountTable::build(criteria, width).encode(prefix, value, width)
}

/// Décode un segment encodé après `prefix`
pub fn decode(prefix: &[Nt], segment: &[Nt], criteria: &dyn Criteria) -> Result<u64> {
    CountTable::build(criteria, segment.len()).decode(criteria, prefix, segment)
}
