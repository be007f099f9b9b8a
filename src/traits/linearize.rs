//! C3 线性化
//!
//! 将多个特质基序列展平为一个一致的解析顺序：
//! - 单调：每个基特质自身的线性化顺序被保留
//! - 局部优先：声明顺序靠前的特质优先
//! - 公共祖先只出现一次

use std::sync::Arc;

use super::definition::Trait;
use super::errors::DefinitionError;

/// 线性化 `head` 的基序列
///
/// 返回值不含 `head` 自身。基序列中重复出现同一特质、或约束互相矛盾时失败。
pub fn linearize(
    head: &str,
    bases: &[Arc<Trait>],
) -> Result<Vec<Arc<Trait>>, DefinitionError> {
    for (i, base) in bases.iter().enumerate() {
        if bases[..i].iter().any(|earlier| earlier.id() == base.id()) {
            return Err(DefinitionError::DuplicateTrait {
                name: head.to_string(),
                duplicate: base.name().to_string(),
            });
        }
    }

    let mut sequences: Vec<Vec<Arc<Trait>>> = bases.iter().map(Trait::linearization).collect();
    sequences.push(bases.to_vec());

    let mut order = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(order);
        }

        // 候选者：某序列的首元素，且不出现在任何序列的尾部
        let candidate = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|first| {
                !sequences
                    .iter()
                    .any(|seq| seq[1..].iter().any(|t| t.id() == first.id()))
            })
            .cloned();

        let Some(next) = candidate else {
            return Err(DefinitionError::Composition {
                name: head.to_string(),
                bases: bases.iter().map(|b| b.name().to_string()).collect(),
            });
        };

        for seq in sequences.iter_mut() {
            if seq[0].id() == next.id() {
                seq.remove(0);
            }
        }
        order.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> Arc<Trait> {
        Trait::builder(name).build().unwrap()
    }

    fn names(order: &[Arc<Trait>]) -> Vec<&str> {
        order.iter().map(|t| t.name()).collect()
    }

    #[test]
    fn test_empty_bases() {
        assert!(linearize("Empty", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_declared_order_preserved() {
        let a = leaf("A");
        let b = leaf("B");
        let c = leaf("C");
        let order = linearize("Host", &[a, b, c]).unwrap();
        assert_eq!(names(&order), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_diamond_merges_common_ancestor_once() {
        let base = leaf("Base");
        let left = Trait::builder("Left").base(&base).build().unwrap();
        let right = Trait::builder("Right").base(&base).build().unwrap();
        let order = linearize("Diamond", &[left, right]).unwrap();
        assert_eq!(names(&order), vec!["Left", "Right", "Base"]);
    }

    #[test]
    fn test_classic_c3_example() {
        // O; A(O) B(O) C(O) D(O) E(O); K1(A,B,C) K2(D,B,E) K3(D,A); Z(K1,K2,K3)
        let o = leaf("O");
        let mk = |name: &str, bases: &[&Arc<Trait>]| {
            bases
                .iter()
                .fold(Trait::builder(name), |b, base| b.base(base))
                .build()
                .unwrap()
        };
        let a = mk("A", &[&o]);
        let b = mk("B", &[&o]);
        let c = mk("C", &[&o]);
        let d = mk("D", &[&o]);
        let e = mk("E", &[&o]);
        let k1 = mk("K1", &[&a, &b, &c]);
        let k2 = mk("K2", &[&d, &b, &e]);
        let k3 = mk("K3", &[&d, &a]);
        let order = linearize("Z", &[k1, k2, k3]).unwrap();
        assert_eq!(
            names(&order),
            vec!["K1", "K2", "K3", "D", "A", "B", "C", "E", "O"]
        );
    }

    #[test]
    fn test_inconsistent_order_fails() {
        let x = leaf("X");
        let y = leaf("Y");
        let xy = Trait::builder("XY").base(&x).base(&y).build().unwrap();
        let yx = Trait::builder("YX").base(&y).base(&x).build().unwrap();
        let err = linearize("Broken", &[xy, yx]).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::Composition {
                name: "Broken".to_string(),
                bases: vec!["XY".to_string(), "YX".to_string()],
            }
        );
    }

    #[test]
    fn test_base_before_derived_fails() {
        let base = leaf("Base");
        let derived = Trait::builder("Derived").base(&base).build().unwrap();
        assert!(matches!(
            linearize("Host", &[base, derived]),
            Err(DefinitionError::Composition { .. })
        ));
    }

    #[test]
    fn test_duplicate_base_fails() {
        let a = leaf("A");
        let err = linearize("Host", &[a.clone(), a]).unwrap_err();
        assert_eq!(err.code(), "E7003");
    }
}
