use crate::config::PredictorConfig;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

// Edges decaying below this under adaptive mode are pruned.
const PRUNE_EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug)]
struct AdaptiveParams {
    decay: f64,
    min_conf: f64,
    top_k: usize,
}

#[derive(Clone, Debug)]
struct Edge {
    weight: f64,
    tick: u64,
}

struct State {
    succ: FxHashMap<String, FxHashMap<String, Edge>>,
    total: FxHashMap<String, f64>,
    last: Option<String>,
    tick: u64,
}

pub struct Predictor {
    adaptive: Option<AdaptiveParams>,
    state: Mutex<State>,
}

impl Predictor {
    pub fn new(adaptive: bool, params: PredictorConfig) -> Self {
        Self {
            adaptive: adaptive.then_some(AdaptiveParams {
                decay: params.decay,
                min_conf: params.min_conf,
                top_k: params.top_k,
            }),
            state: Mutex::new(State {
                succ: FxHashMap::default(),
                total: FxHashMap::default(),
                last: None,
                tick: 0,
            }),
        }
    }

    pub fn is_adaptive(&self) -> bool {
        self.adaptive.is_some()
    }

    // Self-transitions (prev == path) never create an edge.
    pub fn observe(&self, path: &str) {
        let mut state = self.state.lock();

        if let Some(prev) = state.last.clone() {
            if prev != path {
                state.tick += 1;
                let tick = state.tick;

                if let Some(adaptive) = self.adaptive {
                    if let Some(succs) = state.succ.get_mut(&prev) {
                        for edge in succs.values_mut() {
                            edge.weight *= adaptive.decay;
                        }
                    }
                }

                let succs = state.succ.entry(prev.clone()).or_default();
                let edge = succs.entry(path.to_string()).or_insert(Edge { weight: 0.0, tick });
                edge.weight += 1.0;
                edge.tick = tick;

                if self.adaptive.is_some() {
                    if let Some(succs) = state.succ.get_mut(&prev) {
                        succs.retain(|_, edge| edge.weight >= PRUNE_EPSILON);
                    }
                }

                let total = state
                    .succ
                    .get(&prev)
                    .map(|succs| succs.values().map(|e| e.weight).sum())
                    .unwrap_or(0.0);
                state.total.insert(prev, total);
            }
        }

        state.last = Some(path.to_string());
    }

    // Sorted by weight descending, ties broken by most recent update.
    // top_k only truncates in adaptive mode.
    pub fn predict(&self) -> Vec<String> {
        let state = self.state.lock();

        let Some(last) = state.last.as_deref() else {
            return Vec::new();
        };
        let Some(succs) = state.succ.get(last) else {
            return Vec::new();
        };
        let total = state.total.get(last).copied().unwrap_or(0.0);

        let mut candidates: Vec<(&String, &Edge)> = succs
            .iter()
            .filter(|(_, edge)| edge.weight > 0.0)
            .collect();

        candidates.sort_by(|(_, a), (_, b)| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.tick.cmp(&a.tick))
        });

        let (top_k, min_conf) = match self.adaptive {
            Some(params) => (params.top_k, Some(params.min_conf)),
            None => (usize::MAX, None),
        };

        candidates
            .into_iter()
            .filter(|(_, edge)| match min_conf {
                Some(min_conf) => total > 0.0 && edge.weight / total >= min_conf,
                None => true,
            })
            .take(top_k)
            .map(|(path, _)| path.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(top_k: usize) -> Predictor {
        Predictor::new(
            false,
            PredictorConfig {
                top_k,
                decay: 1.0,
                min_conf: 0.0,
            },
        )
    }

    #[test]
    fn unknown_last_path_predicts_nothing() {
        let predictor = fixed(8);
        assert!(predictor.predict().is_empty());
    }

    #[test]
    fn basic_markov_ranking() {
        // S5: a,b,a,b,a,c -> predict() from c is empty, then observing a
        // again ranks b (weight 2) ahead of c (weight 1).
        let predictor = fixed(8);
        for path in ["a", "b", "a", "b", "a", "c"] {
            predictor.observe(path);
        }
        assert!(predictor.predict().is_empty());

        predictor.observe("a");
        assert_eq!(predictor.predict(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn self_transitions_are_ignored() {
        // Repeating the same path never creates an a -> a edge; if it did,
        // predict() would return "a" itself.
        let predictor = fixed(8);
        predictor.observe("a");
        predictor.observe("a");
        predictor.observe("a");
        assert!(predictor.predict().is_empty());
    }

    #[test]
    fn top_k_truncates_in_adaptive_mode() {
        let predictor = Predictor::new(
            true,
            PredictorConfig {
                top_k: 1,
                decay: 1.0,
                min_conf: 0.0,
            },
        );
        for path in ["a", "b", "a", "b", "a", "c"] {
            predictor.observe(path);
        }
        predictor.observe("a");
        let predicted = predictor.predict();
        assert_eq!(predicted.len(), 1);
        assert_eq!(predicted[0], "b");
    }

    #[test]
    fn non_adaptive_mode_does_not_truncate() {
        let predictor = fixed(1);
        for path in ["a", "b", "a", "c", "a"] {
            predictor.observe(path);
        }
        // top_k is only consulted in adaptive mode, so both successors
        // of "a" are returned even though the field above is 1.
        let predicted = predictor.predict();
        assert_eq!(predicted.len(), 2);
    }

    #[test]
    fn min_confidence_drops_low_probability_candidates_in_adaptive_mode() {
        let predictor = Predictor::new(
            true,
            PredictorConfig {
                top_k: 8,
                decay: 1.0,
                min_conf: 0.5,
            },
        );
        // a -> b observed 3 times, a -> c observed once: c's share is 0.25.
        for _ in 0..3 {
            predictor.observe("a");
            predictor.observe("b");
        }
        predictor.observe("a");
        predictor.observe("c");
        predictor.observe("a");

        let predicted = predictor.predict();
        assert_eq!(predicted, vec!["b".to_string()]);
    }

    #[test]
    fn decay_eventually_prunes_stale_edges() {
        let predictor = Predictor::new(
            true,
            PredictorConfig {
                top_k: 8,
                decay: 0.1,
                min_conf: 0.0,
            },
        );
        predictor.observe("a");
        predictor.observe("old");
        // Churn many unrelated transitions from "a" so "old"'s weight
        // decays well below the prune epsilon.
        for _ in 0..20 {
            predictor.observe("a");
            predictor.observe("new");
        }
        predictor.observe("a");
        let predicted = predictor.predict();
        assert!(!predicted.contains(&"old".to_string()));
        assert!(predicted.contains(&"new".to_string()));
    }

    #[test]
    fn predict_is_sorted_non_increasing_by_weight() {
        let predictor = fixed(8);
        for path in ["a", "b", "a", "b", "a", "b", "a", "c"] {
            predictor.observe(path);
        }
        predictor.observe("a");
        let predicted = predictor.predict();
        assert_eq!(predicted, vec!["b".to_string(), "c".to_string()]);
    }
}
