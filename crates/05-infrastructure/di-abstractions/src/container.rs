//! 依赖注入容器统计

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// 已注册组件数量
    pub registered_units: usize,
    /// 已提供的构造参数数量
    pub arguments: usize,
    /// 顶层解析请求数量
    pub resolutions: u64,
    /// 失败的顶层解析数量
    pub resolution_errors: u64,
}
