//! Décodage d'oligos passés dans le canal simulé

use oligo_core::{decode_batch, encode_batch, CodecConfig, EncodeRequest, Oligo};
use oligo_simulation::{ErrorModel, OligoChannel, RecoveryMetrics, SimulationMetrics};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const P5: &str = "ACACGACGCTCTTCCGATCT";
const P3: &str = "AGATCGGAAGAGCACACGTC";

fn encoded_pool(count: u64) -> (Vec<EncodeRequest>, Vec<Oligo>) {
    let codec = CodecConfig::default().build().unwrap();
    let p5: Oligo = P5.parse().unwrap();
    let p3: Oligo = P3.parse().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    let requests: Vec<EncodeRequest> = (0..count)
        .map(|address| EncodeRequest {
            address,
            erasure: address % 10 == 9,
            blocks: (0..codec.block_num()).map(|_| rng.gen()).collect(),
        })
        .collect();

    let oligos = encode_batch(&codec, &p5, &p3, &requests)
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    (requests, oligos)
}

#[test]
fn test_noise_free_channel_recovers_everything() {
    let codec = CodecConfig::default().build().unwrap();
    let p5: Oligo = P5.parse().unwrap();
    let p3: Oligo = P3.parse().unwrap();
    let (requests, oligos) = encoded_pool(50);

    let mut channel = OligoChannel::new(ErrorModel::new(0.0, 0.0, 0.0));
    let received: Vec<Oligo> = channel
        .transmit_many(&oligos)
        .into_iter()
        .map(|(o, _)| o)
        .collect();

    let mut metrics = RecoveryMetrics::new();
    for (req, result) in requests.iter().zip(decode_batch(&codec, &p5, &p3, &received, true)) {
        metrics.record_decode(codec.block_num(), &result);
        let decoded = result.unwrap();
        assert_eq!(decoded.address, req.address);
        assert_eq!(decoded.erasure, req.erasure);
    }

    assert_eq!(metrics.decoded, 50);
    assert_eq!(metrics.block_recovery_rate(), 1.0);
}

#[test]
fn test_substitution_noise() {
    let codec = CodecConfig::default().build().unwrap();
    let p5: Oligo = P5.parse().unwrap();
    let p3: Oligo = P3.parse().unwrap();
    let (_, oligos) = encoded_pool(100);

    let mut channel = OligoChannel::new(ErrorModel::substitutions_only(0.01).with_seed(2024));
    let mut injected = SimulationMetrics::new();
    let mut received = Vec::with_capacity(oligos.len());
    for (oligo, m) in channel.transmit_many(&oligos) {
        injected.merge(&m);
        received.push(oligo);
    }

    assert_eq!(injected.insertions + injected.deletions, 0);
    assert!(injected.substitutions > 0);

    let mut metrics = RecoveryMetrics::new();
    let results = decode_batch(&codec, &p5, &p3, &received, true);
    for result in &results {
        assert!(!matches!(result, Err(e) if e.is_fatal()));
    }
    for result in results {
        metrics.record_decode(codec.block_num(), &result);
    }

    assert_eq!(metrics.oligos, 100);
    assert_eq!(
        metrics.decoded + metrics.primer_mismatches + metrics.metadata_lost + metrics.other_failures,
        100
    );
    assert!(metrics.decoded > 0);
    assert!(metrics.blocks_recovered <= metrics.blocks_total);
}
