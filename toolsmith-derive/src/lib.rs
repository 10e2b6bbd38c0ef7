//! Derive macros for the toolsmith tool library

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Fields, Lit, LitStr, Path, Variant};

/// Derive macro for the `ToolEnum` trait
///
/// Each unit variant becomes one allowed value. By default the value is the
/// variant name in snake_case; `#[tool_enum(value = ...)]` sets it to a string,
/// integer or boolean literal instead. The derive also implements `Describe`,
/// so the enum can be declared as a tool parameter directly.
///
/// Generated code refers to `::toolsmith_core`. Crates that only depend on
/// the `toolsmith` facade point it there with `#[tool_enum(crate = "toolsmith")]`
/// on the enum.
///
/// # Example
///
/// ```rust,ignore
/// use toolsmith_core::ToolEnum;
/// use toolsmith_derive::ToolEnum;
///
/// #[derive(ToolEnum)]
/// enum Priority {
///     Low,
///     High,
///     #[tool_enum(value = "p0")]
///     Critical,
/// }
///
/// // ["low", "high", "p0"]
/// let values = Priority::variants();
/// ```
#[proc_macro_derive(ToolEnum, attributes(tool_enum))]
pub fn derive_tool_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return syn::Error::new_spanned(&input, "ToolEnum can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    if variants.is_empty() {
        return syn::Error::new_spanned(&input, "ToolEnum requires at least one variant")
            .to_compile_error()
            .into();
    }

    let krate = match crate_path(&input) {
        Ok(krate) => krate,
        Err(err) => return err.to_compile_error().into(),
    };

    let mut values = Vec::with_capacity(variants.len());
    for variant in variants {
        match variant_value(variant) {
            Ok(value) => values.push(value),
            Err(err) => return err.to_compile_error().into(),
        }
    }

    let expanded = quote! {
        impl #impl_generics #krate::ToolEnum for #name #ty_generics #where_clause {
            fn variants() -> ::std::vec::Vec<#krate::__private::Value> {
                ::std::vec![#(#krate::__private::Value::from(#values),)*]
            }
        }

        impl #impl_generics #krate::Describe for #name #ty_generics #where_clause {
            fn describe() -> #krate::ParamType {
                #krate::ParamType::enumeration::<Self>()
            }
        }
    };

    expanded.into()
}

/// Path of the crate that defines `ToolEnum`, from `#[tool_enum(crate = "...")]`
fn crate_path(input: &DeriveInput) -> syn::Result<Path> {
    let mut krate = None;
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("tool_enum")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let path: LitStr = meta.value()?.parse()?;
                krate = Some(path.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported tool_enum attribute, expected `crate`"))
            }
        })?;
    }
    Ok(krate.unwrap_or_else(|| parse_quote!(::toolsmith_core)))
}

/// The value literal emitted for one variant
fn variant_value(variant: &Variant) -> syn::Result<proc_macro2::TokenStream> {
    if !matches!(variant.fields, Fields::Unit) {
        return Err(syn::Error::new_spanned(
            variant,
            "ToolEnum variants cannot carry fields",
        ));
    }

    let mut value = None;
    for attr in variant.attrs.iter().filter(|attr| attr.path().is_ident("tool_enum")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("value") {
                let lit: Lit = meta.value()?.parse()?;
                value = Some(literal_tokens(&lit)?);
                Ok(())
            } else {
                Err(meta.error("unsupported tool_enum attribute, expected `value`"))
            }
        })?;
    }

    Ok(value.unwrap_or_else(|| {
        let snake = to_snake_case(&variant.ident.to_string());
        quote! { #snake }
    }))
}

fn literal_tokens(lit: &Lit) -> syn::Result<proc_macro2::TokenStream> {
    match lit {
        Lit::Str(s) => {
            let s = s.value();
            Ok(quote! { #s })
        }
        Lit::Int(i) => {
            let i: i64 = i.base10_parse()?;
            Ok(quote! { #i })
        }
        Lit::Bool(b) => {
            let b = b.value;
            Ok(quote! { #b })
        }
        other => Err(syn::Error::new_spanned(
            other,
            "tool_enum value must be a string, integer or boolean literal",
        )),
    }
}

/// `OptionA` -> `option_a`, `HTTPServer` -> `http_server`
fn to_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::to_snake_case;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("OptionA"), "option_a");
        assert_eq!(to_snake_case("Low"), "low");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("Version2Beta"), "version2_beta");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }
}
