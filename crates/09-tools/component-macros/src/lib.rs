//! # Component Macros
//!
//! 这个 crate 提供了用于声明字段注入的过程宏。
//!
//! ## 核心宏
//!
//! - [`Injectable`](derive@Injectable) - 根据 `#[inject]` 字段属性生成注入点
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::Injectable;
//! use di_abstractions::Inject;
//!
//! #[derive(Injectable)]
//! pub struct OrderService {
//!     #[inject(default, require)]
//!     repository: Inject<dyn OrderRepository>,
//!     #[inject("audit")]
//!     audit: Inject<dyn AuditLog>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod injectable;
mod utils;

// Re-exports are not allowed in proc-macro crates

/// 可注入组件派生宏
///
/// 为结构体实现 `di_abstractions::Injectable`，每个带 `#[inject]` 属性的字段生成一个注入点。
/// `Inject<dyn Trait>` 字段可以被赋值，其它类型的字段在解析到依赖时报告字段不可赋值。
///
/// # 属性
///
/// - `#[inject]` - 按字段的能力类型解析，可选
/// - `#[inject(default, require)]` - 按字段的能力类型解析，必需
/// - `#[inject("name")]` - 按 (能力类型, 名称) 解析
/// - `#[inject = "name,require"]` - 直接给出指令文本
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Injectable)]
/// pub struct Object1 {
///     #[inject("object2", require)]
///     next: Inject<dyn ObjectIFace>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::derive_injectable_impl(input)
}
