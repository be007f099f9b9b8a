//! 组合类型构建器
//!
//! 将有序特质序列合成为一个组合类型。组合类型的基序列正是给定的特质序列，
//! 解析顺序由 C3 线性化得出。组合类型只作为查找表使用，从不实例化。

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::definition::{collect_required, Member, Trait};
use super::errors::DefinitionError;
use super::linearize::linearize;

/// 组合类型
///
/// 每个宿主类型恰好拥有一个，在定义期计算一次，此后只读。
pub struct CompositeType {
    name: String,
    bases: Vec<Arc<Trait>>,
    /// 扁平解析顺序：(特质名, 成员表) 即 `mro[i].name()` / `mro[i].members()`
    mro: Vec<Arc<Trait>>,
    required: BTreeSet<String>,
}

impl CompositeType {
    /// 构建组合类型
    ///
    /// 空序列为配置错误；线性化矛盾为组合错误。
    pub fn build(
        name: impl Into<String>,
        traits: &[Arc<Trait>],
    ) -> Result<Arc<Self>, DefinitionError> {
        let name = name.into();
        if traits.is_empty() {
            return Err(DefinitionError::Configuration {
                type_name: name,
                entry: "CompositeType::build".to_string(),
            });
        }

        let mro = linearize(&name, traits)?;
        let required = collect_required(mro.iter().map(|t| t.members()));

        debug!(
            composite = %name,
            mro = ?mro.iter().map(|t| t.name()).collect::<Vec<_>>(),
            required = ?required,
            "built composite type"
        );

        Ok(Arc::new(Self {
            name,
            bases: traits.to_vec(),
            mro,
            required,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 声明的特质序列
    pub fn bases(&self) -> &[Arc<Trait>] {
        &self.bases
    }

    /// 线性化后的特质序列
    pub fn mro(&self) -> &[Arc<Trait>] {
        &self.mro
    }

    pub fn mro_names(&self) -> Vec<&str> {
        self.mro.iter().map(|t| t.name()).collect()
    }

    /// 未实现的必需操作
    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// 沿解析顺序查找，先声明者优先
    pub fn lookup(
        &self,
        name: &str,
    ) -> Option<(&Arc<Trait>, &Member)> {
        self.mro
            .iter()
            .find_map(|t| t.member(name).map(|member| (t, member)))
    }

    /// 组合类型是否为 `trait_` 的线性化后代
    pub fn is_subtype_of(
        &self,
        trait_: &Trait,
    ) -> bool {
        self.mro.iter().any(|t| t.id() == trait_.id())
    }

    /// 每个可见名称及其解析来源（按解析顺序首次出现排序）
    pub fn resolution_table(&self) -> Vec<(&str, &Arc<Trait>, &Member)> {
        let mut seen = BTreeSet::new();
        let mut table = Vec::new();
        for t in &self.mro {
            for (name, member) in t.members() {
                if seen.insert(name.as_str()) {
                    table.push((name.as_str(), t, member));
                }
            }
        }
        table
    }
}

impl fmt::Debug for CompositeType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("CompositeType")
            .field("name", &self.name)
            .field("mro", &self.mro_names())
            .field("required", &self.required)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::value::{Signature, Value};

    #[test]
    fn test_empty_sequence_is_configuration_error() {
        let err = CompositeType::build("EmptyTrait", &[]).unwrap_err();
        assert!(matches!(err, DefinitionError::Configuration { .. }));
    }

    #[test]
    fn test_first_declared_wins() {
        let first = Trait::builder("First").data("greeting", "first").build().unwrap();
        let second = Trait::builder("Second").data("greeting", "second").build().unwrap();
        let composite = CompositeType::build("HostTrait", &[first, second]).unwrap();

        let (owner, member) = composite.lookup("greeting").unwrap();
        assert_eq!(owner.name(), "First");
        assert!(matches!(member, Member::Data(Value::Str(s)) if &**s == "first"));
    }

    #[test]
    fn test_concrete_member_earlier_satisfies_later_requirement() {
        let concrete = Trait::builder("Concrete")
            .method("area", Signature::new(), |_, _| Ok(Value::Int(1)))
            .build()
            .unwrap();
        let abstract_ = Trait::builder("Abstract")
            .required("area")
            .required("perimeter")
            .build()
            .unwrap();
        let composite = CompositeType::build("ShapeTrait", &[concrete, abstract_]).unwrap();
        let required: Vec<_> = composite.required().iter().cloned().collect();
        assert_eq!(required, vec!["perimeter".to_string()]);
    }

    #[test]
    fn test_is_subtype_of_covers_closure() {
        let base = Trait::builder("Base").build().unwrap();
        let mid = Trait::builder("Mid").base(&base).build().unwrap();
        let other = Trait::builder("Other").build().unwrap();
        let composite = CompositeType::build("HostTrait", &[mid.clone()]).unwrap();

        assert!(composite.is_subtype_of(&mid));
        assert!(composite.is_subtype_of(&base));
        assert!(!composite.is_subtype_of(&other));
        assert_eq!(composite.mro_names(), vec!["Mid", "Base"]);
    }

    #[test]
    fn test_resolution_table_lists_each_name_once() {
        let a = Trait::builder("A").data("x", 1).data("y", 2).build().unwrap();
        let b = Trait::builder("B").data("y", 3).data("z", 4).build().unwrap();
        let composite = CompositeType::build("HostTrait", &[a, b]).unwrap();
        let table: Vec<_> = composite
            .resolution_table()
            .into_iter()
            .map(|(name, owner, _)| (name, owner.name()))
            .collect();
        assert_eq!(table, vec![("x", "A"), ("y", "A"), ("z", "B")]);
    }
}
