use dage_consensus::{decode, encode, expand_compact, ConsensusError, EncodingError};
use dage_core::{target_from_hex, target_to_hex, Target};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct DecodeVector {
    name: String,
    bits: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    canonical: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EncodeVector {
    name: String,
    target: String,
    bits: String,
}

#[derive(Debug, Deserialize)]
struct CompactVectors {
    decode: Vec<DecodeVector>,
    encode: Vec<EncodeVector>,
}

fn vectors_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("vectors")
        .join("compact.json")
}

fn load() -> CompactVectors {
    let data = fs::read_to_string(vectors_path()).expect("vector file");
    serde_json::from_str(&data).expect("parse json")
}

fn parse_bits(s: &str) -> u32 {
    u32::from_str_radix(s, 16).expect("bits hex")
}

fn error_kind(name: &str) -> EncodingError {
    match name {
        "negative" => EncodingError::Negative,
        "overflow" => EncodingError::Overflow,
        "zero" => EncodingError::Zero,
        "above_limit" => EncodingError::AboveLimit,
        other => panic!("unknown error kind {other}"),
    }
}

#[test]
fn compact_decode_vectors() {
    let vectors = load();
    assert!(!vectors.decode.is_empty());

    for v in vectors.decode {
        let bits = parse_bits(&v.bits);
        let got = expand_compact(bits);
        match (&v.error, &v.target) {
            (Some(kind), None) => {
                assert_eq!(
                    got,
                    Err(ConsensusError::InvalidEncoding {
                        bits,
                        kind: error_kind(kind)
                    }),
                    "decode error mismatch for {}",
                    v.name
                );
                // No ceiling makes an invalid encoding valid.
                assert!(decode(bits, &Target::MAX).is_err(), "{}", v.name);
            }
            (None, Some(target_hex)) => {
                let target = got.unwrap_or_else(|e| panic!("{}: {e}", v.name));
                assert_eq!(target_to_hex(&target), *target_hex, "target mismatch for {}", v.name);
                let raw = hex::decode(target_hex).expect("target hex");
                assert_eq!(raw, target.to_be_bytes(), "byte order for {}", v.name);
                let canonical = parse_bits(v.canonical.as_deref().expect("canonical"));
                assert_eq!(encode(&target), canonical, "canonical mismatch for {}", v.name);
                assert_eq!(decode(bits, &target), Ok(target), "{}", v.name);
                if target > Target::ONE {
                    assert_eq!(
                        decode(bits, &(target - Target::ONE)),
                        Err(ConsensusError::InvalidEncoding {
                            bits,
                            kind: EncodingError::AboveLimit
                        }),
                        "{}",
                        v.name
                    );
                }
            }
            _ => panic!("vector {} needs exactly one of error/target", v.name),
        }
    }
}

#[test]
fn compact_encode_vectors() {
    let vectors = load();
    assert!(!vectors.encode.is_empty());

    for v in vectors.encode {
        let target = target_from_hex(&v.target).expect("target hex");
        assert_eq!(
            format!("{:08x}", encode(&target)),
            v.bits,
            "encode mismatch for {}",
            v.name
        );
    }
}
