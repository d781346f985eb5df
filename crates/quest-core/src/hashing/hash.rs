//! Hash helpers sobre blake3.

use blake3::Hasher;
use serde_json::Value;

use super::to_canonical_json;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hashea la forma canónica de un valor JSON.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// Proyecta un string a un bucket estable en `0..buckets`.
/// Usado para asignar grupos de experimento de forma determinista.
pub fn hash_bucket(input: &str, buckets: usize) -> usize {
    if buckets == 0 {
        return 0;
    }
    let digest = blake3::hash(input.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    (u64::from_le_bytes(head) % buckets as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_hash_ignores_key_order() {
        let a = json!({"x": 1, "y": 2});
        let b = json!({"y": 2, "x": 1});
        assert_eq!(hash_value(&a), hash_value(&b));
    }

    #[test]
    fn bucket_is_stable_and_in_range() {
        let first = hash_bucket("session-42", 4);
        assert!(first < 4);
        assert_eq!(first, hash_bucket("session-42", 4));
        assert_eq!(hash_bucket("anything", 0), 0);
    }
}
