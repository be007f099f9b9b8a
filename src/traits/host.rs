//! 宿主类型增强器
//!
//! 拦截宿主类型的创建，依次执行：
//!
//! 1. 校验：`__traits__` 必须存在且非空
//! 2. 组合：构建 `名称 + "Trait"` 组合类型并挂载为 `__traitclass__`
//! 3. 提升必需操作：组合类型中未被宿主实现的必需操作并入宿主的必需操作集
//! 4. 安装回退解析器：保留宿主自身的回退钩子，特质转发作为最后手段
//! 5. 安装成员查询：`extends(trait)`
//!
//! 宿主类型从不在结构上继承其特质。

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::composite::CompositeType;
use super::definition::{Member, Property, RequiredOp, Trait};
use super::errors::{AttributeError, CallError, DefinitionError, InternalError};
use super::instance::Instance;
use super::{TypeHandle, COMPOSITE_SUFFIX};
use crate::runtime::value::{BoundArgs, Function, Signature, Value};

/// 宿主自身的回退钩子（`__getattr__`）
///
/// 仅在常规解析失败后调用；返回 `Missing` / `Private` 时回退链继续。
pub type FallbackHook = dyn Fn(&Arc<Instance>, &str) -> Result<Value, AttributeError> + Send + Sync;

/// 类型定义的原始输入：成员表、声明的特质序列、自身回退钩子
#[derive(Clone, Default)]
pub struct Namespace {
    members: IndexMap<String, Member>,
    traits: Option<Vec<Arc<Trait>>>,
    fallback: Option<Arc<FallbackHook>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明 `__traits__`
    pub fn with_traits(
        mut self,
        traits: Vec<Arc<Trait>>,
    ) -> Self {
        self.traits = Some(traits);
        self
    }

    /// 安装自身回退钩子
    pub fn with_fallback(
        mut self,
        hook: Arc<FallbackHook>,
    ) -> Self {
        self.fallback = Some(hook);
        self
    }

    /// 插入成员
    pub fn insert(
        &mut self,
        name: &str,
        member: Member,
    ) {
        self.members.insert(name.to_string(), member);
    }

    pub fn members(&self) -> &IndexMap<String, Member> {
        &self.members
    }

    pub fn traits(&self) -> Option<&[Arc<Trait>]> {
        self.traits.as_deref()
    }
}

impl fmt::Debug for Namespace {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field(
                "traits",
                &self
                    .traits
                    .as_ref()
                    .map(|ts| ts.iter().map(|t| t.name()).collect::<Vec<_>>()),
            )
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// 增强后的宿主类型
pub struct HostType {
    name: String,
    parent: Option<Arc<HostType>>,
    members: IndexMap<String, Member>,
    /// 自身声明的 `__traits__`（子类未重新声明时为 `None`）
    declared_traits: Option<Vec<Arc<Trait>>>,
    trait_class: Arc<CompositeType>,
    required: BTreeSet<String>,
    fallback: Option<Arc<FallbackHook>>,
}

impl HostType {
    /// 普通声明语法
    pub fn builder(name: &str) -> HostBuilder {
        HostBuilder {
            name: name.to_string(),
            parent: None,
            namespace: Namespace::new(),
        }
    }

    /// 底层类型构造入口
    pub fn define(
        name: &str,
        parent: Option<Arc<HostType>>,
        namespace: Namespace,
    ) -> Result<Arc<HostType>, DefinitionError> {
        Self::augment(name, parent, namespace, "HostType::define")
    }

    fn augment(
        name: &str,
        parent: Option<Arc<HostType>>,
        namespace: Namespace,
        entry: &str,
    ) -> Result<Arc<HostType>, DefinitionError> {
        let Namespace {
            members,
            traits: declared_traits,
            fallback,
        } = namespace;

        // 1. 校验
        let inherited = parent.as_ref().map(|p| p.traits());
        let traits = declared_traits.as_deref().or(inherited).unwrap_or_default();
        if traits.is_empty() {
            return Err(DefinitionError::Configuration {
                type_name: name.to_string(),
                entry: entry.to_string(),
            });
        }

        // 2. 组合：每个宿主类型独占一个组合类型，子类从继承的特质序列重新构建
        let trait_class = CompositeType::build(format!("{}{}", name, COMPOSITE_SUFFIX), traits)?;
        debug!(
            host = %name,
            composite = %trait_class.name(),
            inherited = declared_traits.is_none(),
            "attached __traitclass__"
        );

        let fallback = fallback.or_else(|| parent.as_ref().and_then(|p| p.fallback.clone()));
        let mut host = HostType {
            name: name.to_string(),
            parent,
            members,
            declared_traits,
            trait_class,
            required: BTreeSet::new(),
            // 4. 自身钩子优先，否则继承父类型；特质转发在 Instance::getattr 中作为最后手段
            fallback,
        };

        // 3. 提升必需操作
        host.required = host.lift_required();
        debug!(
            host = %host.name,
            required = ?host.required,
            own_fallback = host.fallback.is_some(),
            "augmented host type"
        );

        Ok(Arc::new(host))
    }

    /// 候选名称：组合类型的必需操作，以及宿主链上声明的必需操作；
    /// 在宿主链上解析为具体成员的名称不再必需。
    ///
    /// 父类型剩余的集合不参与计算，重新声明特质的子类不会保留旧特质的必需操作。
    fn lift_required(&self) -> BTreeSet<String> {
        let mut candidates: BTreeSet<&str> =
            self.trait_class.required().iter().map(String::as_str).collect();
        for host in self.chain() {
            candidates.extend(
                host.members
                    .iter()
                    .filter(|(_, m)| m.is_required())
                    .map(|(name, _)| name.as_str()),
            );
        }

        candidates
            .into_iter()
            .filter(|name| {
                self.resolve_member(name)
                    .map_or(true, |(_, member)| member.is_required())
            })
            .map(str::to_string)
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<HostType>> {
        self.parent.as_ref()
    }

    /// 自身声明的成员
    pub fn members(&self) -> &IndexMap<String, Member> {
        &self.members
    }

    /// 沿宿主链查找成员（自身优先，然后父类型）
    pub fn resolve_member(
        &self,
        name: &str,
    ) -> Option<(&HostType, &Member)> {
        self.chain()
            .find_map(|host| host.members.get(name).map(|m| (host, m)))
    }

    /// 结构继承链（自身在首位）
    pub fn chain(&self) -> impl Iterator<Item = &HostType> {
        std::iter::successors(Some(self), |host| host.parent.as_deref())
    }

    /// 生效的特质序列（自身声明或继承）
    pub fn traits(&self) -> &[Arc<Trait>] {
        match &self.declared_traits {
            Some(traits) => traits,
            None => self.trait_class.bases(),
        }
    }

    /// 是否自身声明了 `__traits__`
    pub fn declares_traits(&self) -> bool {
        self.declared_traits.is_some()
    }

    /// `__traitclass__`
    pub fn trait_class(&self) -> &Arc<CompositeType> {
        &self.trait_class
    }

    /// `__abstractmethods__`：仍未实现的必需操作
    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// 是否可以实例化
    pub fn is_abstract(&self) -> bool {
        !self.required.is_empty()
    }

    pub fn fallback(&self) -> Option<&Arc<FallbackHook>> {
        self.fallback.as_ref()
    }

    /// 宿主类型是否包含特质 `trait_`（含特质图中的全部中间特质）
    pub fn extends(
        &self,
        trait_: &Trait,
    ) -> bool {
        self.trait_class.is_subtype_of(trait_)
    }

    /// 结构子类关系，只沿宿主链判断
    pub fn is_subclass_of(
        &self,
        other: &HostType,
    ) -> bool {
        self.chain().any(|host| std::ptr::eq(host, other))
    }
}

/// 对任意类型句柄执行成员查询
///
/// 特质句柄没有 `__traitclass__`，返回内部一致性错误。
pub fn extends(
    ty: &TypeHandle,
    trait_: &Trait,
) -> Result<bool, InternalError> {
    match ty {
        TypeHandle::Host(host) => Ok(host.extends(trait_)),
        TypeHandle::Composite(composite) => Ok(composite.is_subtype_of(trait_)),
        TypeHandle::Trait(t) => Err(InternalError::MissingTraitClass {
            type_name: t.name().to_string(),
        }),
    }
}

impl fmt::Debug for HostType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("HostType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field("trait_class", &self.trait_class)
            .field("required", &self.required)
            .finish()
    }
}

/// 宿主类型构建器
pub struct HostBuilder {
    name: String,
    parent: Option<Arc<HostType>>,
    namespace: Namespace,
}

impl HostBuilder {
    /// 父宿主类型
    pub fn parent(
        mut self,
        parent: &Arc<HostType>,
    ) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// 声明 `__traits__`
    pub fn traits<'a, I>(
        mut self,
        traits: I,
    ) -> Self
    where
        I: IntoIterator<Item = &'a Arc<Trait>>,
    {
        self.namespace.traits = Some(traits.into_iter().cloned().collect());
        self
    }

    pub fn method<F>(
        mut self,
        name: &str,
        signature: Signature,
        body: F,
    ) -> Self
    where
        F: Fn(&Arc<Instance>, &BoundArgs) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.namespace.insert(
            name,
            Member::Method(Function::new(name, signature, body)),
        );
        self
    }

    pub fn property<G>(
        mut self,
        name: &str,
        getter: G,
    ) -> Self
    where
        G: Fn(&Arc<Instance>) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.namespace
            .insert(name, Member::Property(Property::new(name, getter)));
        self
    }

    pub fn data(
        mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Self {
        self.namespace.insert(name, Member::Data(value.into()));
        self
    }

    pub fn required(
        mut self,
        name: &str,
    ) -> Self {
        self.namespace.insert(
            name,
            Member::Required(RequiredOp {
                name: name.to_string(),
            }),
        );
        self
    }

    pub fn member(
        mut self,
        name: &str,
        member: Member,
    ) -> Self {
        self.namespace.insert(name, member);
        self
    }

    /// 自身回退钩子（`__getattr__`）
    pub fn fallback<F>(
        mut self,
        hook: F,
    ) -> Self
    where
        F: Fn(&Arc<Instance>, &str) -> Result<Value, AttributeError> + Send + Sync + 'static,
    {
        self.namespace.fallback = Some(Arc::new(hook));
        self
    }

    /// 完成定义并增强
    pub fn define(self) -> Result<Arc<HostType>, DefinitionError> {
        HostType::augment(&self.name, self.parent, self.namespace, "HostType::builder")
    }
}
