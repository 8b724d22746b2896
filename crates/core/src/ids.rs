//! Record identifier generation (§6): `debate_{base36(now)}_{6-char base36 random}`,
//! `ws_…`, `sim_…`.

use chrono::Utc;
use rand::Rng;

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 alphabet is ASCII")
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36_ALPHABET[rng.gen_range(0..36)] as char)
        .collect()
}

fn stamped_id(prefix: &str) -> String {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    format!("{prefix}_{}_{}", to_base36(now), random_base36(6))
}

pub fn new_debate_id() -> String {
    stamped_id("debate")
}

pub fn new_workspace_id() -> String {
    stamped_id("ws")
}

pub fn new_simulation_id() -> String {
    stamped_id("sim")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_the_right_prefix_and_shape() {
        let id = new_debate_id();
        assert!(id.starts_with("debate_"));
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 6);

        assert!(new_workspace_id().starts_with("ws_"));
        assert!(new_simulation_id().starts_with("sim_"));
    }

    #[test]
    fn base36_roundtrips_small_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
