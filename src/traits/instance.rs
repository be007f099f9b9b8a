//! 宿主实例与两阶段属性解析
//!
//! - 第一阶段：保留名称、实例存储、宿主链成员
//! - 第二阶段（仅在第一阶段未命中时）：宿主自身回退钩子 → 双下划线守卫 → 组合类型查找
//!
//! 在任一阶段找到的方法都会绑定到请求实例，每次访问都产生新的绑定方法。

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::trace;

use super::composite::CompositeType;
use super::definition::Member;
use super::errors::{AttributeError, CallError, InstantiationError};
use super::host::HostType;
use super::{is_private_name, TypeHandle, ABSTRACT_METHODS_ATTR, TRAITCLASS_ATTR, TRAITS_ATTR};
use crate::runtime::value::{Args, Value};

impl HostType {
    /// 实例化守卫：存在未实现的必需操作时拒绝
    pub fn instantiate(self: &Arc<Self>) -> Result<Arc<Instance>, InstantiationError> {
        if self.is_abstract() {
            return Err(InstantiationError::Abstract {
                type_name: self.name().to_string(),
                missing: self.required().iter().cloned().collect(),
            });
        }
        Ok(Arc::new(Instance {
            host: Arc::clone(self),
            storage: RwLock::new(IndexMap::new()),
        }))
    }
}

/// 宿主类型的实例
pub struct Instance {
    host: Arc<HostType>,
    storage: RwLock<IndexMap<String, Value>>,
}

impl Instance {
    pub fn host(&self) -> &Arc<HostType> {
        &self.host
    }

    pub fn type_name(&self) -> &str {
        self.host.name()
    }

    /// `__traitclass__`
    pub fn trait_class(&self) -> &Arc<CompositeType> {
        self.host.trait_class()
    }

    /// 直接读取实例存储，不经过任何解析阶段
    pub fn load(
        &self,
        name: &str,
    ) -> Option<Value> {
        self.storage.read().get(name).cloned()
    }

    /// 直接写入实例存储，不经过访问器
    ///
    /// 存储持有强引用：写入绑定到本实例的 `Value::Method` 会形成 `Arc` 环，
    /// 实例将不会被释放，直到该属性被 [`delattr`](Self::delattr) 删除或覆盖。
    pub fn store(
        &self,
        name: &str,
        value: Value,
    ) {
        self.storage.write().insert(name.to_string(), value);
    }

    /// 实例存储快照
    pub fn vars(&self) -> IndexMap<String, Value> {
        self.storage.read().clone()
    }

    /// 属性访问
    pub fn getattr(
        self: &Arc<Self>,
        name: &str,
    ) -> Result<Value, CallError> {
        if let Some(found) = self.lookup_direct(name) {
            return found;
        }
        self.resolve_fallback(name)
    }

    /// 属性是否可解析
    pub fn hasattr(
        self: &Arc<Self>,
        name: &str,
    ) -> bool {
        self.getattr(name).is_ok()
    }

    /// 第一阶段：保留名称、实例存储、宿主链
    fn lookup_direct(
        self: &Arc<Self>,
        name: &str,
    ) -> Option<Result<Value, CallError>> {
        match name {
            TRAITCLASS_ATTR => {
                let handle = TypeHandle::Composite(Arc::clone(self.trait_class()));
                return Some(Ok(Value::Type(handle)));
            }
            TRAITS_ATTR => {
                let traits = self
                    .host
                    .traits()
                    .iter()
                    .map(|t| Value::Type(TypeHandle::Trait(Arc::clone(t))))
                    .collect();
                return Some(Ok(Value::List(traits)));
            }
            ABSTRACT_METHODS_ATTR => {
                let names = self.host.required().iter().map(|n| Value::from(n.as_str())).collect();
                return Some(Ok(Value::List(names)));
            }
            _ => {}
        }

        let stored = self.load(name);
        if let Some(value) = stored {
            return Some(Ok(value));
        }

        self.host
            .resolve_member(name)
            .map(|(_, member)| self.materialize(name, member))
    }

    /// 第二阶段：自身回退钩子，然后转发到组合类型
    fn resolve_fallback(
        self: &Arc<Self>,
        name: &str,
    ) -> Result<Value, CallError> {
        if let Some(hook) = self.host.fallback() {
            match hook(self, name) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_missing() => {}
                Err(err) => return Err(err.into()),
            }
        }

        if is_private_name(name) {
            return Err(AttributeError::Private {
                type_name: self.type_name().to_string(),
                attr: name.to_string(),
            }
            .into());
        }

        let (owner, member) = self
            .trait_class()
            .lookup(name)
            .ok_or_else(|| AttributeError::missing(self.type_name(), name))?;
        trace!(host = %self.type_name(), attr = name, from = %owner.name(), "forwarded to trait");
        self.materialize(name, member)
    }

    /// 将成员转换为值：方法绑定、属性求值、数据原样返回
    fn materialize(
        self: &Arc<Self>,
        name: &str,
        member: &Member,
    ) -> Result<Value, CallError> {
        match member {
            Member::Method(function) => Ok(Value::Method(function.bind_to(Arc::clone(self)))),
            Member::Property(property) => property.get(self),
            Member::Data(Value::Function(function)) => {
                Ok(Value::Method(function.bind_to(Arc::clone(self))))
            }
            Member::Data(Value::Method(method)) => {
                Ok(Value::Method(method.function().bind_to(Arc::clone(self))))
            }
            Member::Data(value) => Ok(value.clone()),
            Member::Required(_) => Err(AttributeError::Unimplemented {
                type_name: self.type_name().to_string(),
                attr: name.to_string(),
            }
            .into()),
        }
    }

    /// 属性写入
    ///
    /// 宿主链或组合类型上声明的访问器调用其 setter；其余情况写入实例存储。
    pub fn setattr(
        self: &Arc<Self>,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), CallError> {
        let value = value.into();
        if matches!(name, TRAITCLASS_ATTR | TRAITS_ATTR | ABSTRACT_METHODS_ATTR) {
            return Err(AttributeError::ReadOnly {
                type_name: self.type_name().to_string(),
                attr: name.to_string(),
            }
            .into());
        }

        match self.host.resolve_member(name) {
            Some((_, Member::Property(property))) => return property.set(self, value),
            Some(_) => {
                self.store(name, value);
                return Ok(());
            }
            None => {}
        }

        if !is_private_name(name) {
            if let Some((_, Member::Property(property))) = self.trait_class().lookup(name) {
                return property.set(self, value);
            }
        }

        self.store(name, value);
        Ok(())
    }

    /// 删除实例存储中的属性
    pub fn delattr(
        &self,
        name: &str,
    ) -> Result<Value, AttributeError> {
        self.storage
            .write()
            .shift_remove(name)
            .ok_or_else(|| AttributeError::missing(self.type_name(), name))
    }

    /// 解析并调用方法
    pub fn call_method(
        self: &Arc<Self>,
        name: &str,
        args: Args,
    ) -> Result<Value, CallError> {
        self.getattr(name)?.call(args)
    }
}

impl fmt::Debug for Instance {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_name())
            .field("storage", &self.storage.read().keys().collect::<Vec<_>>())
            .finish()
    }
}
