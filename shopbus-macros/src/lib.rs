//! Procedural macros for shopbus

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,
}

/// Variant-level attributes for #[derive(Action)]
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Name override for logging and filters
    #[darling(default)]
    name: Option<String>,
}

/// Derive macro for the Action trait
///
/// Generates `name()` returning the variant name, or the value of
/// `#[action(name = "...")]` when given.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum CartAction {
///     AddItem { id: String, name: String, price: f64 },
///     #[action(name = "Clear")]
///     ClearCart,
/// }
///
/// assert_eq!(CartAction::ClearCart.name(), "Clear");
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let name_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        let variant_str = v.name.clone().unwrap_or_else(|| variant_name.to_string());

        match &v.fields.style {
            darling::ast::Style::Unit => quote! {
                #name::#variant_name => #variant_str
            },
            darling::ast::Style::Tuple => quote! {
                #name::#variant_name(..) => #variant_str
            },
            darling::ast::Style::Struct => quote! {
                #name::#variant_name { .. } => #variant_str
            },
        }
    });

    let expanded = quote! {
        impl shopbus::Action for #name {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Container-level attributes for #[derive(BusEvent)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(bus), supports(enum_unit, enum_newtype))]
struct BusEventOpts {
    ident: syn::Ident,
    vis: syn::Visibility,
    generics: syn::Generics,
    data: darling::ast::Data<BusVariant, ()>,

    /// Name of the generated kind enum
    kind: syn::Ident,
}

/// Variant-level attributes for #[derive(BusEvent)]
#[derive(Debug, FromVariant)]
#[darling(attributes(bus))]
struct BusVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<syn::Field>,

    /// Wire name, e.g. `"cart:item-added"`
    name: String,
}

/// Derive macro declaring an event registry
///
/// Applied to an enum whose variants are either unit (signals) or newtypes
/// wrapping a payload struct. Every variant needs a unique wire name.
///
/// Generates:
/// - a fieldless `#[bus(kind = "...")]` enum implementing `EventKind`,
///   `Display` and `FromStr`
/// - `BusEvent` for the registry enum
/// - `Payload<Registry>` and `From<Payload>` for each payload type
///
/// Reusing a wire name or a payload type is a compile error.
///
/// # Example
/// ```ignore
/// #[derive(BusEvent, Clone, Debug)]
/// #[bus(kind = "EventName")]
/// pub enum AppEvent {
///     #[bus(name = "cart:item-added")]
///     CartItemAdded(ItemAdded),
///     #[bus(name = "cart:cleared")]
///     CartCleared,
/// }
///
/// assert_eq!(EventName::CartCleared.name(), "cart:cleared");
/// assert_eq!("cart:item-added".parse::<EventName>(), Ok(EventName::CartItemAdded));
/// assert!(EventName::CartCleared.is_signal());
/// ```
#[proc_macro_derive(BusEvent, attributes(bus))]
pub fn derive_bus_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match BusEventOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    if !opts.generics.params.is_empty() {
        return syn::Error::new_spanned(&opts.generics, "BusEvent registries cannot be generic")
            .to_compile_error()
            .into();
    }

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "BusEvent can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    // Names and payload types must each map to exactly one variant
    let mut seen_names: HashMap<&str, &syn::Ident> = HashMap::new();
    let mut seen_payloads: HashMap<String, &syn::Ident> = HashMap::new();
    for v in variants.iter() {
        if v.name.is_empty() {
            return syn::Error::new_spanned(&v.ident, "event name cannot be empty")
                .to_compile_error()
                .into();
        }
        if let Some(first) = seen_names.insert(v.name.as_str(), &v.ident) {
            let msg = format!("event name `{}` is already used by `{}`", v.name, first);
            return syn::Error::new_spanned(&v.ident, msg)
                .to_compile_error()
                .into();
        }
        if let Some(field) = v.fields.fields.first() {
            let ty = &field.ty;
            let key = quote!(#ty).to_string();
            if let Some(first) = seen_payloads.insert(key, &v.ident) {
                let msg = format!("payload type is already bound to `{}`", first);
                return syn::Error::new_spanned(ty, msg).to_compile_error().into();
            }
        }
    }

    let name = &opts.ident;
    let kind = &opts.kind;
    let vis = &opts.vis;

    let kind_variants = variants.iter().map(|v| {
        let ident = &v.ident;
        let doc = format!("`{}`", v.name);
        quote! {
            #[doc = #doc]
            #ident
        }
    });

    let kind_name_arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let wire = &v.name;
        quote! { #kind::#ident => #wire }
    });

    let all_kinds = variants.iter().map(|v| {
        let ident = &v.ident;
        quote! { #kind::#ident }
    });

    let signals: Vec<_> = variants
        .iter()
        .filter(|v| matches!(v.fields.style, darling::ast::Style::Unit))
        .map(|v| {
            let ident = &v.ident;
            quote! { #kind::#ident }
        })
        .collect();

    let is_signal_body = if signals.is_empty() {
        quote! { false }
    } else {
        quote! { ::core::matches!(self, #(#signals)|*) }
    };

    let event_kind_arms = variants.iter().map(|v| {
        let ident = &v.ident;
        match v.fields.style {
            darling::ast::Style::Unit => quote! { #name::#ident => #kind::#ident },
            _ => quote! { #name::#ident(..) => #kind::#ident },
        }
    });

    let payload_impls = variants.iter().filter_map(|v| {
        let field = v.fields.fields.first()?;
        let ident = &v.ident;
        let ty = &field.ty;
        Some(quote! {
            impl shopbus::Payload<#name> for #ty {
                const KIND: #kind = #kind::#ident;

                fn from_event(event: &#name) -> ::core::option::Option<&Self> {
                    match event {
                        #name::#ident(payload) => ::core::option::Option::Some(payload),
                        #[allow(unreachable_patterns)]
                        _ => ::core::option::Option::None,
                    }
                }

                fn into_event(self) -> #name {
                    #name::#ident(self)
                }
            }

            impl ::core::convert::From<#ty> for #name {
                fn from(payload: #ty) -> Self {
                    #name::#ident(payload)
                }
            }
        })
    });

    let kind_doc = format!("Event names of [`{}`]", name);

    let expanded = quote! {
        #[doc = #kind_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #vis enum #kind {
            #(#kind_variants),*
        }

        impl shopbus::EventKind for #kind {
            fn name(&self) -> &'static str {
                match self {
                    #(#kind_name_arms),*
                }
            }

            fn all() -> &'static [Self] {
                static ALL: &[#kind] = &[#(#all_kinds),*];
                ALL
            }

            fn is_signal(&self) -> bool {
                #is_signal_body
            }
        }

        impl ::core::fmt::Display for #kind {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(shopbus::EventKind::name(self))
            }
        }

        impl ::core::str::FromStr for #kind {
            type Err = shopbus::UnknownEvent;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                <#kind as shopbus::EventKind>::parse(s)
            }
        }

        impl shopbus::BusEvent for #name {
            type Kind = #kind;

            fn kind(&self) -> #kind {
                match self {
                    #(#event_kind_arms),*
                }
            }
        }

        #(#payload_impls)*
    };

    TokenStream::from(expanded)
}
