//! Injectable 派生宏实现

use crate::utils::{capability_type, field_has_attribute, is_inject_type};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, punctuated::Punctuated, Attribute, Data, DeriveInput, Expr,
    Field, Ident, Lit, LitStr, Member, Meta, Result, Token,
};

const DEFAULT_TARGET: &str = "default";
const REQUIRE_FLAG: &str = "require";

/// `#[inject(...)]` 列表中的一项
enum InjectArg {
    Ident(Ident),
    Name(LitStr),
}

impl Parse for InjectArg {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(LitStr) {
            input.parse().map(Self::Name)
        } else {
            input.parse().map(Self::Ident)
        }
    }
}

/// 把字段上的注入属性转换为注入指令文本
///
/// 支持的形式：
/// - `#[inject]` - 按类型解析的可选依赖
/// - `#[inject(default, require)]` - 按类型解析的必需依赖
/// - `#[inject("storage", require)]` - 按名称解析
/// - `#[inject = "storage,require"]` - 直接给出指令文本
fn parse_directive(attr: &Attribute) -> Result<String> {
    match &attr.meta {
        Meta::Path(_) => Ok(DEFAULT_TARGET.to_string()),
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(expr_lit) => match &expr_lit.lit {
                Lit::Str(lit_str) => Ok(lit_str.value()),
                other => Err(syn::Error::new_spanned(other, "注入指令必须是字符串")),
            },
            other => Err(syn::Error::new_spanned(other, "注入指令必须是字符串")),
        },
        Meta::List(_) => {
            let args = attr.parse_args_with(Punctuated::<InjectArg, Token![,]>::parse_terminated)?;
            let mut tokens = Vec::with_capacity(args.len());

            for (index, arg) in args.into_iter().enumerate() {
                match arg {
                    InjectArg::Name(name) if index == 0 => {
                        if name.value().trim().is_empty() || name.value().contains(',') {
                            return Err(syn::Error::new(name.span(), "组件名称不能为空或包含逗号"));
                        }
                        tokens.push(name.value());
                    }
                    InjectArg::Ident(ident) if index == 0 && ident == DEFAULT_TARGET => {
                        tokens.push(DEFAULT_TARGET.to_string());
                    }
                    InjectArg::Ident(ident) if ident == REQUIRE_FLAG => {
                        if index == 0 {
                            tokens.push(DEFAULT_TARGET.to_string());
                        }
                        tokens.push(REQUIRE_FLAG.to_string());
                    }
                    InjectArg::Ident(ident) => {
                        return Err(syn::Error::new(
                            ident.span(),
                            format!("无法识别的注入修饰项 `{}`, 只支持 `require`", ident),
                        ));
                    }
                    InjectArg::Name(name) => {
                        return Err(syn::Error::new(name.span(), "组件名称必须是第一项"));
                    }
                }
            }

            if tokens.is_empty() {
                tokens.push(DEFAULT_TARGET.to_string());
            }
            Ok(tokens.join(","))
        }
    }
}

fn injection_point(index: usize, field: &Field, attr: &Attribute) -> Result<TokenStream2> {
    let directive = parse_directive(attr)?;
    let (member, field_name) = match &field.ident {
        Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
        None => (Member::Unnamed(index.into()), index.to_string()),
    };
    let ty = &field.ty;

    if is_inject_type(ty) {
        Ok(quote! {
            ::di_abstractions::InjectionPoint::settable(
                #field_name,
                ::di_abstractions::InjectDirective::parse(#directive),
                &self.#member,
            )
        })
    } else {
        let capability = capability_type(ty);
        Ok(quote! {
            ::di_abstractions::InjectionPoint::unsettable(
                #field_name,
                ::di_abstractions::CapabilityType::of::<#capability>(),
                ::di_abstractions::InjectDirective::parse(#directive),
            )
        })
    }
}

/// 实现 #[derive(Injectable)]
pub fn derive_injectable_impl(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new(
                Span::call_site(),
                "Injectable 只能用于结构体",
            ))
        }
    };

    let mut points = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if !field_has_attribute(field, "inject") {
            continue;
        }
        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("inject")) {
            points.push(injection_point(index, field, attr)?);
        }
    }

    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::di_abstractions::Injectable for #struct_name #ty_generics #where_clause {
            fn injection_points(&self) -> ::std::vec::Vec<::di_abstractions::InjectionPoint<'_>> {
                ::std::vec![#(#points),*]
            }
        }
    })
}
