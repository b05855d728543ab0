//! Procedural macros for testkit-double
//!
//! This crate provides the `#[testkit_double::test]` attribute macro for
//! writing tests that patch collaborators and always undo the patches.
//!
//! # Example
//!
//! ```rust,ignore
//! use testkit_double::prelude::*;
//!
//! #[testkit_double::test]
//! fn charges_card(patcher: Patcher) {
//!     let gateway = patcher.start(Patch::object(&ns, "gateway")).unwrap();
//!     checkout();
//!     gateway.as_mock().unwrap().assert_called_once().unwrap();
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, FnArg, Ident, ItemFn, Lit, Pat, PatIdent, Token, Type,
};

/// Configuration options for the test macro.
#[derive(Default)]
struct TestConfig {
    /// Fail the test if patches are still active when the body returns
    strict: bool,
}

impl Parse for TestConfig {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut config = TestConfig::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "strict" => {
                    let lit: Lit = input.parse()?;
                    if let Lit::Bool(b) = lit {
                        config.strict = b.value();
                    } else {
                        return Err(syn::Error::new_spanned(lit, "expected `true` or `false`"));
                    }
                }
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {ident}"),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(config)
    }
}

/// Determines if a function parameter is requesting a Patcher.
fn is_patcher_param(arg: &FnArg) -> bool {
    if let FnArg::Typed(pat_type) = arg {
        if let Type::Path(type_path) = &*pat_type.ty {
            if let Some(segment) = type_path.path.segments.last() {
                return segment.ident == "Patcher";
            }
        }
    }
    false
}

/// The parameter pattern with any `mut` dropped; the body receives a
/// `&mut Patcher`.
fn patcher_binding(arg: &FnArg) -> Option<Pat> {
    let FnArg::Typed(pat_type) = arg else {
        return None;
    };
    match &*pat_type.pat {
        Pat::Ident(ident) => Some(Pat::Ident(PatIdent {
            mutability: None,
            ..ident.clone()
        })),
        other => Some(other.clone()),
    }
}

/// Test attribute macro that hands the test a [`Patcher`] and undoes every
/// patch when the body returns or panics.
///
/// The function may be sync or async. Async bodies are driven to completion
/// on the current thread.
///
/// # Basic Usage
///
/// ```rust,ignore
/// #[testkit_double::test]
/// fn test_basic() {
///     assert!(true);
/// }
/// ```
///
/// # With Patcher Injection
///
/// Add a `patcher: Patcher` parameter to receive a patcher owned by the test
/// harness. Inside the body it is a `&mut Patcher`:
///
/// ```rust,ignore
/// use testkit_double::prelude::*;
///
/// #[testkit_double::test]
/// async fn test_with_patcher(patcher: Patcher) {
///     patcher.start(Patch::object(&ns, "clock").new(0)).unwrap();
///     assert_eq!(ns.get("clock"), Some(0.into()));
/// }
/// ```
///
/// # Configuration Options
///
/// - `strict = true` - Fail if any patch is still active when the body
///   returns. The patches are undone either way.
///
/// ```rust,ignore
/// #[testkit_double::test(strict = true)]
/// fn test_cleans_up(patcher: Patcher) {
///     patcher.start(Patch::object(&ns, "clock")).unwrap();
///     patcher.stop(&ns, "clock");
/// }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let config = parse_macro_input!(attr as TestConfig);
    let input = parse_macro_input!(item as ItemFn);

    expand_test(&config, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_test(config: &TestConfig, input: ItemFn) -> syn::Result<TokenStream2> {
    let name = &input.sig.ident;
    let body = &input.block;
    let attrs = &input.attrs;
    let vis = &input.vis;
    let output = &input.sig.output;
    let asyncness = &input.sig.asyncness;

    if !input.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.sig.generics,
            "test function cannot be generic",
        ));
    }

    let mut patcher_param = None;
    for arg in &input.sig.inputs {
        if !is_patcher_param(arg) {
            return Err(syn::Error::new_spanned(
                arg,
                "unsupported test parameter; only `Patcher` can be injected",
            ));
        }
        if patcher_param.is_some() {
            return Err(syn::Error::new_spanned(arg, "only one `Patcher` can be injected"));
        }
        patcher_param = patcher_binding(arg);
    }

    let inner = format_ident!("__testkit_{}", name);
    let patcher = format_ident!("__testkit_patcher");

    let (inner_params, inner_args) = match &patcher_param {
        Some(pat) => (
            quote! { #pat: &mut ::testkit_double::patch::Patcher },
            quote! { &mut #patcher },
        ),
        None => (quote! {}, quote! {}),
    };

    let run = if asyncness.is_some() {
        quote! { ::testkit_double::__private::block_on(#inner(#inner_args)) }
    } else {
        quote! { #inner(#inner_args) }
    };

    let patcher_init = if config.strict {
        quote! { ::testkit_double::patch::Patcher::strict() }
    } else {
        quote! { ::testkit_double::patch::Patcher::new() }
    };

    let wrapper = if patcher_param.is_some() {
        quote! {
            #[::core::prelude::v1::test]
            #(#attrs)*
            #vis fn #name() #output {
                #asyncness fn #inner(#inner_params) #output #body

                let mut #patcher = #patcher_init;
                let __testkit_result = #run;
                if let ::core::result::Result::Err(err) = #patcher.finish() {
                    ::core::panic!("{}", err);
                }
                __testkit_result
            }
        }
    } else {
        quote! {
            #[::core::prelude::v1::test]
            #(#attrs)*
            #vis fn #name() #output {
                #asyncness fn #inner() #output #body

                #run
            }
        }
    };

    Ok(wrapper)
}
