//! 特质组合测试
//!
//! - 宿主类型定义与配置错误
//! - 特质成员转发
//! - 必需操作提升与实例化守卫
//! - 成员查询
