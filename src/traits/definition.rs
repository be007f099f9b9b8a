//! 特质定义
//!
//! 特质是一组具名行为：方法、计算属性、访问器对、必需操作与标记属性。
//! 特质可以由其他特质组合而成（特质的特质），定义后不可变，引擎从不实例化特质。

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use super::errors::{AttributeError, CallError, DefinitionError};
use super::instance::Instance;
use super::linearize::linearize;
use crate::runtime::value::{BoundArgs, Function, Signature, Value};

static NEXT_TRAIT_ID: AtomicU32 = AtomicU32::new(0);

/// 特质 ID（定义期分配，全局唯一）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraitId(pub u32);

impl TraitId {
    fn next() -> Self {
        TraitId(NEXT_TRAIT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// 属性读取函数
pub type Getter = dyn Fn(&Arc<Instance>) -> Result<Value, CallError> + Send + Sync;

/// 属性写入函数
pub type Setter = dyn Fn(&Arc<Instance>, Value) -> Result<(), CallError> + Send + Sync;

/// 计算属性（访问器对）
#[derive(Clone)]
pub struct Property {
    name: Arc<str>,
    getter: Arc<Getter>,
    setter: Option<Arc<Setter>>,
}

impl Property {
    /// 只读计算属性
    pub fn new<G>(
        name: &str,
        getter: G,
    ) -> Self
    where
        G: Fn(&Arc<Instance>) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            getter: Arc::new(getter),
            setter: None,
        }
    }

    /// 附加 setter
    pub fn with_setter<S>(
        mut self,
        setter: S,
    ) -> Self
    where
        S: Fn(&Arc<Instance>, Value) -> Result<(), CallError> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// 以实例为接收者求值
    pub fn get(
        &self,
        instance: &Arc<Instance>,
    ) -> Result<Value, CallError> {
        (self.getter)(instance)
    }

    /// 以实例为接收者写入；无 setter 时为只读错误
    pub fn set(
        &self,
        instance: &Arc<Instance>,
        value: Value,
    ) -> Result<(), CallError> {
        match &self.setter {
            Some(setter) => setter(instance, value),
            None => Err(AttributeError::ReadOnly {
                type_name: instance.type_name().to_string(),
                attr: self.name.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// 必需操作（声明但未实现）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredOp {
    pub name: String,
}

/// 成员种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Property,
    Data,
    Required,
}

impl fmt::Display for MemberKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            MemberKind::Method => write!(f, "method"),
            MemberKind::Property => write!(f, "property"),
            MemberKind::Data => write!(f, "data"),
            MemberKind::Required => write!(f, "required"),
        }
    }
}

/// 特质或宿主类型上的成员
#[derive(Debug, Clone)]
pub enum Member {
    Method(Function),
    Property(Property),
    Data(Value),
    Required(RequiredOp),
}

impl Member {
    pub fn kind(&self) -> MemberKind {
        match self {
            Member::Method(_) => MemberKind::Method,
            Member::Property(_) => MemberKind::Property,
            Member::Data(_) => MemberKind::Data,
            Member::Required(_) => MemberKind::Required,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Member::Required(_))
    }
}

/// 收集线性化序列上首次解析为必需操作的名称
pub(crate) fn collect_required<'a, I>(tables: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a IndexMap<String, Member>> + Clone,
{
    let mut required = BTreeSet::new();
    for table in tables.clone() {
        for (name, member) in table {
            if !member.is_required() {
                continue;
            }
            let first = tables.clone().into_iter().find_map(|t| t.get(name));
            if first.is_some_and(Member::is_required) {
                required.insert(name.clone());
            }
        }
    }
    required
}

/// 特质定义
pub struct Trait {
    id: TraitId,
    name: String,
    bases: SmallVec<[Arc<Trait>; 4]>,
    members: IndexMap<String, Member>,
    /// 线性化序列（不含自身）
    ancestors: Vec<Arc<Trait>>,
    required: BTreeSet<String>,
}

impl Trait {
    /// 创建特质构建器
    pub fn builder(name: &str) -> TraitBuilder {
        TraitBuilder {
            name: name.to_string(),
            bases: SmallVec::new(),
            members: IndexMap::new(),
        }
    }

    pub fn id(&self) -> TraitId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 直接基特质（声明顺序）
    pub fn bases(&self) -> &[Arc<Trait>] {
        &self.bases
    }

    /// 自身声明的成员
    pub fn members(&self) -> &IndexMap<String, Member> {
        &self.members
    }

    /// 自身声明的单个成员
    pub fn member(
        &self,
        name: &str,
    ) -> Option<&Member> {
        self.members.get(name)
    }

    /// 线性化序列中除自身以外的部分
    pub fn ancestors(&self) -> &[Arc<Trait>] {
        &self.ancestors
    }

    /// 完整线性化序列（自身在首位）
    pub fn linearization(self: &Arc<Self>) -> Vec<Arc<Trait>> {
        let mut order = Vec::with_capacity(self.ancestors.len() + 1);
        order.push(Arc::clone(self));
        order.extend(self.ancestors.iter().cloned());
        order
    }

    /// 线性化序列的名称
    pub fn mro_names(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.ancestors.iter().map(|t| t.name.as_str()))
            .collect()
    }

    /// 沿自身线性化序列查找名称，先到先得
    pub fn lookup(
        &self,
        name: &str,
    ) -> Option<(&Trait, &Member)> {
        if let Some(member) = self.members.get(name) {
            return Some((self, member));
        }
        self.ancestors
            .iter()
            .find_map(|t| t.members.get(name).map(|m| (t.as_ref(), m)))
    }

    /// 通过线性化序列可见的必需操作
    pub fn required_operations(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// 自身即为 `other`，或 `other` 出现在线性化序列中
    pub fn is_subtrait_of(
        &self,
        other: &Trait,
    ) -> bool {
        self.id == other.id || self.ancestors.iter().any(|t| t.id == other.id)
    }
}

impl PartialEq for Trait {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.id == other.id
    }
}

impl Eq for Trait {}

impl fmt::Debug for Trait {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Trait")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mro", &self.mro_names())
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for Trait {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// 特质构建器
pub struct TraitBuilder {
    name: String,
    bases: SmallVec<[Arc<Trait>; 4]>,
    members: IndexMap<String, Member>,
}

impl TraitBuilder {
    /// 追加基特质
    pub fn base(
        mut self,
        base: &Arc<Trait>,
    ) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// 定义方法
    pub fn method<F>(
        mut self,
        name: &str,
        signature: Signature,
        body: F,
    ) -> Self
    where
        F: Fn(&Arc<Instance>, &BoundArgs) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.members.insert(
            name.to_string(),
            Member::Method(Function::new(name, signature, body)),
        );
        self
    }

    /// 定义只读计算属性
    pub fn property<G>(
        mut self,
        name: &str,
        getter: G,
    ) -> Self
    where
        G: Fn(&Arc<Instance>) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.members
            .insert(name.to_string(), Member::Property(Property::new(name, getter)));
        self
    }

    /// 定义访问器对
    pub fn accessor<G, S>(
        mut self,
        name: &str,
        getter: G,
        setter: S,
    ) -> Self
    where
        G: Fn(&Arc<Instance>) -> Result<Value, CallError> + Send + Sync + 'static,
        S: Fn(&Arc<Instance>, Value) -> Result<(), CallError> + Send + Sync + 'static,
    {
        let property = Property::new(name, getter).with_setter(setter);
        self.members
            .insert(name.to_string(), Member::Property(property));
        self
    }

    /// 定义数据或标记属性
    pub fn data(
        mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Self {
        self.members
            .insert(name.to_string(), Member::Data(value.into()));
        self
    }

    /// 声明必需操作
    pub fn required(
        mut self,
        name: &str,
    ) -> Self {
        self.members.insert(
            name.to_string(),
            Member::Required(RequiredOp {
                name: name.to_string(),
            }),
        );
        self
    }

    /// 插入任意成员
    pub fn member(
        mut self,
        name: &str,
        member: Member,
    ) -> Self {
        self.members.insert(name.to_string(), member);
        self
    }

    /// 完成定义：线性化基特质并计算必需操作
    pub fn build(self) -> Result<Arc<Trait>, DefinitionError> {
        let ancestors = linearize(&self.name, &self.bases)?;
        let required = collect_required(
            std::iter::once(&self.members).chain(ancestors.iter().map(|t| &t.members)),
        );

        debug!(
            trait_name = %self.name,
            bases = self.bases.len(),
            required = required.len(),
            "defined trait"
        );

        Ok(Arc::new(Trait {
            id: TraitId::next(),
            name: self.name,
            bases: self.bases,
            members: self.members,
            ancestors,
            required,
        }))
    }
}
