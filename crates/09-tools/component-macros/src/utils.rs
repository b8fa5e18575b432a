//! 宏工具函数

use syn::{Field, Type};

/// 从类型中提取第一个泛型参数
pub fn extract_generic_type(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Path(type_path) => {
            let segment = type_path.path.segments.last()?;
            match &segment.arguments {
                syn::PathArguments::AngleBracketed(args) => match args.args.first() {
                    Some(syn::GenericArgument::Type(inner_type)) => Some(inner_type),
                    _ => None,
                },
                _ => None,
            }
        }
        _ => None,
    }
}

/// 检查类型的最后一段是否为指定名称
pub fn is_type_named(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == name)
            .unwrap_or(false),
        _ => false,
    }
}

/// 检查类型是否为 Inject<T>
pub fn is_inject_type(ty: &Type) -> bool {
    is_type_named(ty, "Inject") && extract_generic_type(ty).is_some()
}

/// 推断字段声明的能力类型
///
/// 剥掉 `Inject`、`Option`、`Arc`、`Box` 等包装，例如 `Option<Arc<dyn Storage>>` 得到 `dyn Storage`
pub fn capability_type(ty: &Type) -> &Type {
    let mut current = ty;
    while ["Inject", "Option", "Arc", "Rc", "Box"]
        .iter()
        .any(|wrapper| is_type_named(current, wrapper))
    {
        match extract_generic_type(current) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// 检查字段是否有特定属性
pub fn field_has_attribute(field: &Field, attr_name: &str) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident(attr_name))
}
