//! 特质组合错误
//!
//! 定义类型定义期与属性访问期的全部错误类型
//!
//! # 错误码
//!
//! - E70xx: 类型定义错误（致命，定义期抛出）
//! - E80xx: 访问与调用错误（可恢复，访问期抛出）
//! - E89xx: 内部一致性错误（编程错误）

use thiserror::Error;

/// 统一结果类型
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 类型定义错误
///
/// 在宿主类型或特质定义时产生，从不延迟到实例化或属性访问期。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// 宿主类型未声明特质，或声明了空序列
    #[error("type `{type_name}` defined through `{entry}` expects a non-empty `__traits__` sequence")]
    Configuration { type_name: String, entry: String },

    /// 特质基序列无法一致线性化
    #[error("cannot create a consistent resolution order for `{name}` from bases [{}]", .bases.join(", "))]
    Composition { name: String, bases: Vec<String> },

    /// 同一特质在基序列中重复出现
    #[error("duplicate trait `{duplicate}` in the bases of `{name}`")]
    DuplicateTrait { name: String, duplicate: String },
}

impl DefinitionError {
    /// 诊断错误码
    pub fn code(&self) -> &'static str {
        match self {
            DefinitionError::Configuration { .. } => "E7001",
            DefinitionError::Composition { .. } => "E7002",
            DefinitionError::DuplicateTrait { .. } => "E7003",
        }
    }
}

/// 属性解析错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// 所有解析阶段都未找到该名称
    #[error("'{type_name}' object has no attribute '{attr}'")]
    Missing { type_name: String, attr: String },

    /// 双下划线名称不会从特质转发
    #[error("{attr} not defined on {type_name}")]
    Private { type_name: String, attr: String },

    /// 名称解析到未实现的必需操作
    #[error("'{type_name}' leaves required operation '{attr}' unimplemented")]
    Unimplemented { type_name: String, attr: String },

    /// 访问器没有 setter
    #[error("attribute '{attr}' of '{type_name}' is read-only")]
    ReadOnly { type_name: String, attr: String },
}

impl AttributeError {
    /// 诊断错误码
    pub fn code(&self) -> &'static str {
        match self {
            AttributeError::Missing { .. } => "E8001",
            AttributeError::Private { .. } => "E8002",
            AttributeError::Unimplemented { .. } => "E8003",
            AttributeError::ReadOnly { .. } => "E8004",
        }
    }

    /// 是否属于"名称未找到"一类（回退链可以继续下一阶段）
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            AttributeError::Missing { .. } | AttributeError::Private { .. }
        )
    }

    pub(crate) fn missing(
        type_name: &str,
        attr: &str,
    ) -> Self {
        AttributeError::Missing {
            type_name: type_name.to_string(),
            attr: attr.to_string(),
        }
    }
}

/// 调用错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CallError {
    #[error("{function}() takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        function: String,
        expected: usize,
        given: usize,
    },

    #[error("{function}() got an unexpected keyword argument '{param}'")]
    UnexpectedKeyword { function: String, param: String },

    #[error("{function}() got multiple values for argument '{param}'")]
    DuplicateArgument { function: String, param: String },

    #[error("{function}() missing required argument: '{param}'")]
    MissingArgument { function: String, param: String },

    #[error("argument '{param}' expected {expected}, found {found}")]
    TypeMismatch {
        param: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{type_name}' object is not callable")]
    NotCallable { type_name: &'static str },

    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

impl CallError {
    /// 诊断错误码
    pub fn code(&self) -> &'static str {
        match self {
            CallError::TooManyPositional { .. }
            | CallError::UnexpectedKeyword { .. }
            | CallError::DuplicateArgument { .. }
            | CallError::MissingArgument { .. } => "E8101",
            CallError::TypeMismatch { .. } => "E8102",
            CallError::NotCallable { .. } => "E8103",
            CallError::Attribute(e) => e.code(),
        }
    }
}

/// 实例化守卫错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InstantiationError {
    #[error("can't instantiate abstract type {type_name} with abstract methods {}", .missing.join(", "))]
    Abstract {
        type_name: String,
        missing: Vec<String>,
    },
}

impl InstantiationError {
    pub fn code(&self) -> &'static str {
        "E8201"
    }
}

/// 内部一致性错误
///
/// 增强后的宿主类型必然持有组合类型，出现此错误说明调用方传入了未增强的类型。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("__traitclass__ not found in {type_name}")]
    MissingTraitClass { type_name: String },
}

impl InternalError {
    pub fn code(&self) -> &'static str {
        "E8901"
    }
}

/// 顶层错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Instantiation(#[from] InstantiationError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Definition(e) => e.code(),
            Error::Attribute(e) => e.code(),
            Error::Call(e) => e.code(),
            Error::Instantiation(e) => e.code(),
            Error::Internal(e) => e.code(),
        }
    }
}
