use std::io;

/// Prefix of every ephemeral clone directory
pub const SCRATCH_PREFIX: &str = "spiegel-";

/// Generate a random 8-character hex id for an ephemeral clone
///
/// Uses cryptographic randomness from getrandom. Uniqueness on disk is
/// enforced by the caller creating the directory exclusively.
pub fn generate_scratch_id() -> io::Result<String> {
    let mut bytes = [0u8; 4];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| io::Error::other(format!("failed to generate random bytes: {}", e)))?;
    Ok(hex::encode(bytes))
}

/// Directory name for a scratch id: `spiegel-<id>`
pub fn scratch_dir_name(id: &str) -> String {
    format!("{}{}", SCRATCH_PREFIX, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_scratch_id_format() {
        let id = generate_scratch_id().unwrap();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_scratch_id_varies() {
        let ids: HashSet<String> = (0..50).map(|_| generate_scratch_id().unwrap()).collect();
        // 32 bits of randomness: 50 draws colliding down to a handful is not plausible
        assert!(ids.len() > 45);
    }

    #[test]
    fn test_scratch_dir_name() {
        assert_eq!(scratch_dir_name("00ff10ab"), "spiegel-00ff10ab");
    }
}
