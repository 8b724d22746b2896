use std::collections::HashMap;

use tokio::sync::RwLock;

/// Supervisor weight map (§3 "Supervisor", §5 "guarded by a single map
/// lock"). Default weight is 1.0; all writes clamp to [0,2].
#[derive(Default)]
pub struct WeightMap {
    weights: RwLock<HashMap<String, f64>>,
}

impl WeightMap {
    pub fn new() -> Self {
        Self { weights: RwLock::new(HashMap::new()) }
    }

    pub async fn get(&self, name: &str) -> f64 {
        self.weights.read().await.get(name).copied().unwrap_or(1.0)
    }

    pub async fn set(&self, name: impl Into<String>, weight: f64) {
        self.weights.write().await.insert(name.into(), weight.clamp(0.0, 2.0));
    }

    /// A snapshot taken at debate start; later edits never retroactively
    /// affect votes recorded against this snapshot (§4.5 "Weight policy").
    pub async fn snapshot(&self, names: &[String]) -> HashMap<String, f64> {
        let guard = self.weights.read().await;
        names.iter().map(|n| (n.clone(), guard.get(n).copied().unwrap_or(1.0))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_to_one() {
        let map = WeightMap::new();
        assert_eq!(map.get("gpt-4").await, 1.0);
    }

    #[tokio::test]
    async fn clamps_to_zero_two_range() {
        let map = WeightMap::new();
        map.set("gpt-4", 5.0).await;
        assert_eq!(map.get("gpt-4").await, 2.0);
        map.set("gpt-4", -1.0).await;
        assert_eq!(map.get("gpt-4").await, 0.0);
    }

    #[tokio::test]
    async fn snapshot_is_independent_of_later_edits() {
        let map = WeightMap::new();
        map.set("gpt-4", 1.5).await;
        let snapshot = map.snapshot(&["gpt-4".to_string()]).await;
        map.set("gpt-4", 0.2).await;
        assert_eq!(snapshot["gpt-4"], 1.5);
        assert_eq!(map.get("gpt-4").await, 0.2);
    }
}
