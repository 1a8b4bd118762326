//! Codec d'oligos : segments de niveau 0 et assemblage de niveau 1

pub mod address;
pub mod block;
pub mod config;
pub mod erasure;
pub mod oligo_codec;
pub mod primer;
pub mod recovery;
pub mod segment;

pub use address::{metadata_base, AddressPacker, Unpacked};
pub use block::{
    Block, BlockLayout, ParsedBody, BLOCK_SIZE, DATA_SEGMENT_LEN, DATA_WORD_BITS, PARITY_SEGMENT_LEN,
};
pub use config::CodecConfig;
pub use erasure::MetadataErasure;
pub use oligo_codec::{Decoded, OligoCodec, Polarity, GC_THRESHOLD};
pub use primer::{locate_body, PRIMER_ERRORS};
pub use recovery::{ErasureRecovery, Recovered, Recovery};
pub use segment::SegmentCodec;
