//! Linearization properties

use std::sync::Arc;

use proptest::prelude::*;
use traitclass::traits::{CompositeType, Trait};

/// Build a random DAG: trait `i` may only pick bases among traits `< i`.
/// Each entry is a list of candidate base indices.
fn build_dag(shape: &[Vec<usize>]) -> Vec<Arc<Trait>> {
    let mut traits: Vec<Arc<Trait>> = Vec::new();
    for (i, picks) in shape.iter().enumerate() {
        let mut builder = Trait::builder(&format!("T{}", i));
        let mut used = Vec::new();
        for &p in picks {
            if i == 0 {
                break;
            }
            let idx = p % i;
            if !used.contains(&idx) {
                used.push(idx);
                builder = builder.base(&traits[idx]);
            }
        }
        // inconsistent orders are allowed to fail; fall back to a leaf so the DAG keeps growing
        let built = builder
            .build()
            .unwrap_or_else(|_| Trait::builder(&format!("T{}", i)).build().unwrap());
        traits.push(built);
    }
    traits
}

proptest! {
    #[test]
    fn linearization_is_consistent(
        shape in prop::collection::vec(prop::collection::vec(0usize..16, 0..3), 1..8),
        picks in prop::collection::vec(0usize..16, 1..4),
    ) {
        let traits = build_dag(&shape);
        let mut chosen: Vec<Arc<Trait>> = Vec::new();
        for p in picks {
            let t = &traits[p % traits.len()];
            if !chosen.iter().any(|c| c.id() == t.id()) {
                chosen.push(Arc::clone(t));
            }
        }

        if let Ok(composite) = CompositeType::build("HostTrait", &chosen) {
            let mro = composite.mro();

            // each trait appears exactly once
            for (i, t) in mro.iter().enumerate() {
                prop_assert!(mro[i + 1..].iter().all(|u| u.id() != t.id()));
            }

            // closure: every declared trait and all of its ancestors are present
            for t in &chosen {
                prop_assert!(composite.is_subtype_of(t));
                for ancestor in t.ancestors() {
                    prop_assert!(composite.is_subtype_of(ancestor));
                }
            }

            // local precedence: declared order is preserved
            let position = |t: &Arc<Trait>| mro.iter().position(|u| u.id() == t.id()).unwrap();
            for pair in chosen.windows(2) {
                prop_assert!(position(&pair[0]) < position(&pair[1]));
            }

            // monotonicity: each trait's own order is a subsequence
            for t in &chosen {
                let own = t.linearization();
                for pair in own.windows(2) {
                    prop_assert!(position(&pair[0]) < position(&pair[1]));
                }
            }
        }
    }
}
