//! 解析上下文
//!
//! 记录一次解析调用的递归链路，提供重入保护和深度限制。
//! 依赖图在注册阶段已验证无环，这里的链路检查防止的是单例
//! 初始化单元的同线程重入，它会在锁上自我死锁而不是报错。

use infrastructure_common::{DependencyError, DependencyResult};

/// 解析上下文
#[derive(Debug)]
pub struct ResolveContext {
    /// 当前解析链，按进入顺序
    chain: Vec<String>,
    /// 最大递归深度
    max_depth: usize,
}

impl ResolveContext {
    /// 创建新的解析上下文
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            chain: Vec::new(),
            max_depth,
        }
    }

    /// 将标识压入解析链
    ///
    /// 同一标识重复出现说明存在循环；超过最大深度则拒绝继续递归。
    pub fn push(&mut self, name: &str) -> DependencyResult<()> {
        if self.chain.iter().any(|entry| entry == name) {
            let mut chain = self.chain.clone();
            chain.push(name.to_string());
            return Err(DependencyError::CircularDependency {
                dependency_chain: chain.join(" -> "),
            });
        }

        if self.chain.len() >= self.max_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                max_depth: self.max_depth,
                chain: self.chain.join(" -> "),
            });
        }

        self.chain.push(name.to_string());
        Ok(())
    }

    /// 从解析链中弹出最近的标识
    pub fn pop(&mut self) {
        self.chain.pop();
    }

    /// 当前链路深度
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain.len()
    }
}
