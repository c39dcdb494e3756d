//! 元数据定义
//!
//! 提供组件目标类型的元数据信息

use std::any::TypeId;

/// 类型信息
///
/// 组件声明携带的目标类型标签，按类型查找时用于匹配。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称（不含模块路径）
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 完整模块路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            name: full_name.split("::").last().unwrap_or(full_name).to_string(),
            id: TypeId::of::<T>(),
            module_path: full_name.to_string(),
        }
    }

    /// 获取简短的类型名称
    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
