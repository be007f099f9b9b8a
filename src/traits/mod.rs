//! 特质组合
//!
//! 给定声明了特质序列的宿主类型，合成一个代表这些特质行为并集的组合类型，
//! 并让每个特质成员都可通过宿主实例访问，如同直接写在宿主类型上。
//!
//! # 模块结构
//!
//! - [`definition`] - 特质与成员定义
//! - [`linearize`] - C3 线性化
//! - [`composite`] - 组合类型构建器
//! - [`host`] - 宿主类型增强器
//! - [`instance`] - 实例与两阶段属性解析
//! - [`errors`] - 错误类型
//!
//! # 示例
//!
//! ```
//! use traitclass::runtime::value::{Args, Signature, Value};
//! use traitclass::traits::{HostType, Trait};
//!
//! let simple = Trait::builder("SimpleTrait")
//!     .property("is_simple", |_| Ok(Value::Bool(true)))
//!     .method(
//!         "method_with_args",
//!         Signature::new().param("foo").param("bar").param_with_default("baz", 0),
//!         |_, args| Ok(Value::Int(args.int("foo")? + args.int("bar")? + args.int("baz")?)),
//!     )
//!     .build()?;
//! let host = HostType::builder("SimpleTraitedClass").traits([&simple]).define()?;
//!
//! let obj = host.instantiate()?;
//! assert_eq!(obj.getattr("is_simple")?, Value::Bool(true));
//! let sum = obj.call_method("method_with_args", Args::new().arg(1).kwarg("bar", 2))?;
//! assert_eq!(sum, Value::Int(3));
//! assert!(host.extends(&simple));
//! # Ok::<(), traitclass::traits::Error>(())
//! ```

pub mod composite;
pub mod definition;
pub mod errors;
pub mod host;
pub mod instance;
pub mod linearize;

use std::fmt;
use std::sync::Arc;

pub use composite::CompositeType;
pub use definition::{Member, MemberKind, Property, RequiredOp, Trait, TraitBuilder, TraitId};
pub use errors::{
    AttributeError, CallError, DefinitionError, Error, InstantiationError, InternalError, Result,
};
pub use host::{extends, FallbackHook, HostBuilder, HostType, Namespace};
pub use instance::Instance;
pub use linearize::linearize;

/// 宿主类型声明特质序列的保留名称
pub const TRAITS_ATTR: &str = "__traits__";

/// 组合类型的保留名称
pub const TRAITCLASS_ATTR: &str = "__traitclass__";

/// 未实现必需操作集的保留名称
pub const ABSTRACT_METHODS_ATTR: &str = "__abstractmethods__";

/// 从不转发的名称前缀
pub const PRIVATE_PREFIX: &str = "__";

/// 组合类型名后缀
pub const COMPOSITE_SUFFIX: &str = "Trait";

/// 是否为实现私有名称（双下划线约定）
pub fn is_private_name(name: &str) -> bool {
    name.starts_with(PRIVATE_PREFIX)
}

/// 类型对象句柄
#[derive(Clone)]
pub enum TypeHandle {
    Trait(Arc<Trait>),
    Composite(Arc<CompositeType>),
    Host(Arc<HostType>),
}

impl TypeHandle {
    pub fn name(&self) -> &str {
        match self {
            TypeHandle::Trait(t) => t.name(),
            TypeHandle::Composite(c) => c.name(),
            TypeHandle::Host(h) => h.name(),
        }
    }
}

impl PartialEq for TypeHandle {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (TypeHandle::Trait(a), TypeHandle::Trait(b)) => a.id() == b.id(),
            (TypeHandle::Composite(a), TypeHandle::Composite(b)) => Arc::ptr_eq(a, b),
            (TypeHandle::Host(a), TypeHandle::Host(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            TypeHandle::Trait(t) => write!(f, "Trait({})", t.name()),
            TypeHandle::Composite(c) => write!(f, "Composite({})", c.name()),
            TypeHandle::Host(h) => write!(f, "Host({})", h.name()),
        }
    }
}

/// 结构子类判断
///
/// 组合类型是其特质的子类型；宿主类型从不是特质的子类型。
pub fn issubclass(
    sub: &TypeHandle,
    sup: &TypeHandle,
) -> bool {
    match (sub, sup) {
        (TypeHandle::Trait(a), TypeHandle::Trait(b)) => a.is_subtrait_of(b),
        (TypeHandle::Composite(c), TypeHandle::Trait(t)) => c.is_subtype_of(t),
        (TypeHandle::Composite(a), TypeHandle::Composite(b)) => Arc::ptr_eq(a, b),
        (TypeHandle::Host(a), TypeHandle::Host(b)) => a.is_subclass_of(b),
        _ => false,
    }
}

#[cfg(test)]
mod tests;
