//! Tests de roundtrip du codec d'oligos
//!
//! Encodage puis décodage pour plusieurs géométries d'oligos, charges
//! utiles et drapeaux.

use oligo_core::{CodecConfig, Homopolymer, OligoCodec, OligoError, Oligo, Unconstrained};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

const P5: &str = "ACACGACGCTCTTCCGATCT";
const P3: &str = "AGATCGGAAGAGCACACGTC";

fn primers() -> (Oligo, Oligo) {
    (P5.parse().unwrap(), P3.parse().unwrap())
}

fn codec(blocks: usize, width: usize, erasure_blocks: usize) -> OligoCodec {
    OligoCodec::new(blocks, width, erasure_blocks, Arc::new(Homopolymer::default())).unwrap()
}

fn assert_roundtrip(codec: &OligoCodec, address: u64, erasure: bool, data: &[[u8; 4]]) {
    let (p5, p3) = primers();
    let oligo = codec.encode(&p5, &p3, address, erasure, data).unwrap();
    assert_eq!(oligo.len(), p5.len() + codec.oligo_len() + p3.len());
    let body = oligo.slice(p5.len() - 4, oligo.len() - p3.len());
    assert!(codec.criteria().check(body.bases()));

    let decoded = codec.decode(&p5, &p3, &oligo, false).unwrap();
    assert_eq!(decoded.address, address);
    assert_eq!(decoded.erasure, erasure);
    assert_eq!(decoded.blocks, data.iter().copied().map(Some).collect::<Vec<_>>());
}

#[test]
fn test_reference_oligo() {
    let c = codec(8, 3, 2);
    let (p5, p3) = primers();
    let data = vec![[1u8, 2, 3, 4]; 8];

    let oligo = c.encode(&p5, &p3, 12345, false, &data).unwrap();
    assert_eq!(c.oligo_len(), 164);
    assert_eq!(oligo.len(), 204);

    let decoded = c.decode(&p5, &p3, &oligo, false).unwrap();
    assert_eq!(decoded.address, 12345);
    assert!(!decoded.erasure);
    assert_eq!(decoded.recovered_blocks(), 8);
    assert_eq!(decoded.blocks[5], Some([1, 2, 3, 4]));
}

#[test]
fn test_erasure_flag_and_extreme_addresses() {
    let c = codec(8, 3, 2);
    assert_roundtrip(&c, 12345, true, &[[1, 2, 3, 4]; 8]);
    assert_roundtrip(&c, 0, false, &[[0xff; 4]; 8]);
    assert_roundtrip(&c, c.max_addr() - 1, false, &[[0xde, 0xad, 0xbe, 0xef]; 8]);
}

#[test]
fn test_high_gc_payload_roundtrip() {
    let c = codec(8, 3, 2);
    let (p5, p3) = primers();
    let data = vec![[0u8; 4]; 8];

    let oligo = c.encode(&p5, &p3, 7, false, &data).unwrap();
    assert!(oligo.gc_content() <= oligo_core::GC_THRESHOLD);

    let decoded = c.decode(&p5, &p3, &oligo, false).unwrap();
    assert!(decoded.inverted);
    assert_eq!(decoded.address, 7);
    assert_eq!(decoded.blocks, vec![Some([0u8; 4]); 8]);
}

#[test]
fn test_wide_metadata_digits() {
    let c = codec(8, 4, 2);
    assert_eq!(c.max_addr(), 10_351_842_935_184);

    let data: Vec<[u8; 4]> = (0..8)
        .map(|i| [0, 1, 2, 3].map(|j: usize| ((i * 4 + j) * 37 % 256) as u8))
        .collect();
    assert_roundtrip(&c, 987_654_321, true, &data);
}

#[test]
fn test_small_oligo() {
    let c = codec(4, 3, 1);
    assert_eq!(c.max_addr(), 25_955);
    assert_roundtrip(&c, 42, false, &[[9, 8, 7, 6]; 4]);
}

#[test]
fn test_without_metadata_parity() {
    let c = codec(6, 3, 0);
    let (p5, p3) = primers();
    let data = vec![[0x5a, 0xa5, 0x0f, 0xf0]; 6];

    let oligo = c.encode(&p5, &p3, 1000, false, &data).unwrap();
    let decoded = c.decode(&p5, &p3, &oligo, true).unwrap();
    assert_eq!(decoded.address, 1000);
    assert_eq!(decoded.recovered_blocks(), 6);
}

#[test]
fn test_unconstrained_criteria() {
    let c = OligoCodec::new(8, 3, 2, Arc::new(Unconstrained)).unwrap();
    assert_roundtrip(&c, 31337, false, &[[0xff; 4]; 8]);
}

#[test]
fn test_random_payloads() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let codecs = [codec(8, 3, 2), codec(8, 4, 2), codec(10, 4, 2)];

    for c in &codecs {
        for _ in 0..20 {
            let data: Vec<[u8; 4]> = (0..c.block_num()).map(|_| rng.gen()).collect();
            let address = rng.gen_range(0..c.max_addr());
            assert_roundtrip(c, address, rng.gen(), &data);
        }
    }
}

#[test]
fn test_config_built_codec() {
    let c = CodecConfig::from_json(r#"{ "blocks": 6, "metadata_width": 4, "erasure_blocks": 2 }"#)
        .unwrap()
        .build()
        .unwrap();
    assert_roundtrip(&c, 123_456, true, &[[7, 7, 7, 7]; 6]);
}

#[test]
fn test_caller_errors() {
    let c = codec(8, 3, 2);
    let (p5, p3) = primers();
    let data = vec![[0u8; 4]; 8];

    assert!(matches!(
        c.encode(&p5, &p3, 1, false, &data[..2]),
        Err(OligoError::InvalidBlockCount { .. })
    ));
    assert!(matches!(
        c.encode(&p5, &p3, c.max_addr(), true, &data),
        Err(OligoError::AddressOutOfRange { .. })
    ));

    let oligo = c.encode(&p5, &p3, 1, false, &data).unwrap();
    let short: Oligo = "ACG".parse().unwrap();
    assert!(matches!(
        c.decode(&short, &p3, &oligo, false),
        Err(OligoError::PrimerTooShort { .. })
    ));

    // Amorces d'un autre lot
    let other: Oligo = "TTGGTTGGTTGGTTGGTTGG".parse().unwrap();
    assert!(matches!(
        c.decode(&other, &p3, &oligo, true),
        Err(OligoError::PrimerMismatch)
    ));
}

#[test]
fn test_truncated_oligo() {
    let c = codec(8, 3, 2);
    let (p5, p3) = primers();
    let data = vec![[0xffu8; 4]; 8];
    let oligo = c.encode(&p5, &p3, 99, false, &data).unwrap();

    // Suppression du dernier bloc : corps trop court, chiffres manquants
    let body_end = oligo.len() - p3.len();
    let mut truncated = oligo.slice(0, body_end - 22);
    truncated.append(p3.bases());

    assert!(matches!(
        c.decode(&p5, &p3, &truncated, false),
        Err(OligoError::MetadataUnrecoverable)
    ));
}
