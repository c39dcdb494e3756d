//! 依赖图
//!
//! 按标识组织的有向依赖图。节点之间通过标识互相引用，集中存放在
//! 一个映射里，不持有对方的所有权，避免节点间的引用循环。

use std::collections::{HashMap, VecDeque};

use infrastructure_common::{DependencyError, DependencyResult};
use tracing::debug;

/// 依赖图节点
///
/// 依赖和被依赖两个方向都按边插入顺序记录，保证遍历顺序可复现。
#[derive(Debug, Clone)]
struct GraphNode {
    /// 该节点依赖的标识
    dependencies: Vec<String>,
    /// 依赖该节点的标识
    dependents: Vec<String>,
}

/// 有向依赖图
///
/// 注册阶段单线程构建，完成后只读。
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: HashMap<String, GraphNode>,
    insertion_order: Vec<String>,
}

impl DependencyGraph {
    /// 创建空的依赖图
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个节点及其依赖边
    ///
    /// 声明引用的每个依赖标识都必须已经注册，否则返回
    /// [`DependencyError::UnresolvedDependency`] 并保持图不变。
    /// 自依赖会按循环处理，在拓扑排序时报错。
    pub fn register(&mut self, name: &str, dependencies: &[String]) -> DependencyResult<()> {
        if self.nodes.contains_key(name) {
            return Err(DependencyError::DuplicateComponent {
                name: name.to_string(),
            });
        }

        // 先插入节点再校验依赖，使自依赖被识别为循环而不是未注册
        self.nodes.insert(
            name.to_string(),
            GraphNode {
                dependencies: dependencies.to_vec(),
                dependents: Vec::new(),
            },
        );

        for dependency in dependencies {
            if !self.nodes.contains_key(dependency) {
                self.nodes.remove(name);
                return Err(DependencyError::UnresolvedDependency {
                    component: name.to_string(),
                    dependency: dependency.clone(),
                });
            }
        }

        for dependency in dependencies {
            if let Some(node) = self.nodes.get_mut(dependency) {
                node.dependents.push(name.to_string());
            }
        }

        self.insertion_order.push(name.to_string());
        debug!("注册依赖图节点: {} (依赖 {} 个)", name, dependencies.len());
        Ok(())
    }

    /// 节点数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 图是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 是否包含指定标识
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// 计算确定性的构造顺序（Kahn 算法）
    ///
    /// 就绪队列按注册顺序播种，后继按边插入顺序递减入度，因此同时
    /// 就绪的节点之间以稳定的注册顺序决胜，启动/关闭顺序跨运行可
    /// 复现。输出长度小于节点数说明存在循环。
    pub fn topological_order(&self) -> DependencyResult<Vec<String>> {
        let mut in_degree: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|(name, node)| (name.as_str(), node.dependencies.len()))
            .collect();

        let mut queue: VecDeque<&str> = self
            .insertion_order
            .iter()
            .map(String::as_str)
            .filter(|name| in_degree.get(name) == Some(&0))
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(name) = queue.pop_front() {
            sorted.push(name.to_string());

            if let Some(node) = self.nodes.get(name) {
                for dependent in &node.dependents {
                    if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(dependent);
                        }
                    }
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            let cycle: Vec<&str> = self
                .insertion_order
                .iter()
                .map(String::as_str)
                .filter(|name| in_degree.get(name).is_some_and(|degree| *degree > 0))
                .collect();
            return Err(DependencyError::CircularDependency {
                dependency_chain: cycle.join(" -> "),
            });
        }

        Ok(sorted)
    }

    /// 拓扑顺序的精确逆序，用于销毁
    pub fn reverse_order(&self) -> DependencyResult<Vec<String>> {
        let mut order = self.topological_order()?;
        order.reverse();
        Ok(order)
    }
}
