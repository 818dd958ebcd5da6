//! # Cortex Macros
//!
//! Procedural macros for the Cortex lifecycle extension system.
//!
//! ## `#[extension]` Macro
//!
//! Implements `cortex_core::plugin::Extension` for a struct and wires the
//! listed capability accessors to return `Some(self)`. The capability traits
//! themselves are still implemented by hand.
//!
//! ### Example
//!
//! ```ignore
//! use cortex_core::prelude::*;
//! use cortex_macros::extension;
//!
//! #[extension(name = "run-logger", hooks(RunStarted, RunFailed))]
//! struct RunLogger;
//!
//! #[async_trait::async_trait]
//! impl RunStarted for RunLogger {
//!     async fn on_run_started(
//!         &self,
//!         _ctx: &HookContext,
//!         agent_id: AgentId,
//!         run_id: RunId,
//!         _input: &str,
//!     ) -> Result<()> {
//!         tracing::info!(%agent_id, %run_id, "run started");
//!         Ok(())
//!     }
//! }
//! // ... impl RunFailed for RunLogger
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parenthesized, parse_macro_input, DeriveInput, Ident, LitStr, Token};

/// Capability traits an extension may declare
const HOOKS: [&str; 17] = [
    "RunStarted",
    "RunCompleted",
    "RunFailed",
    "StepStarted",
    "StepCompleted",
    "ToolCalled",
    "ToolCompleted",
    "ToolFailed",
    "PersonaResolved",
    "BehaviorTriggered",
    "CognitivePhaseChanged",
    "CheckpointCreated",
    "CheckpointResolved",
    "OrchestrationStarted",
    "OrchestrationCompleted",
    "AgentHandoff",
    "Shutdown",
];

/// Arguments for the `#[extension]` attribute
#[derive(Default)]
struct ExtensionArgs {
    name: Option<String>,
    hooks: Vec<Ident>,
}

impl Parse for ExtensionArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ExtensionArgs::default();

        while !input.is_empty() {
            let key: Ident = input.parse()?;

            match key.to_string().as_str() {
                "name" => {
                    input.parse::<Token![=]>()?;
                    let value: LitStr = input.parse()?;
                    args.name = Some(value.value());
                }
                "hooks" => {
                    let content;
                    parenthesized!(content in input);
                    let list = Punctuated::<Ident, Token![,]>::parse_terminated(&content)?;
                    args.hooks.extend(list);
                }
                _ => {
                    return Err(syn::Error::new(key.span(), "unknown attribute"));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

/// `RunStarted` -> `run_started`
fn snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn expand(args: ExtensionArgs, input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let name = args
        .name
        .unwrap_or_else(|| struct_name.to_string().to_lowercase());

    let mut seen = Vec::new();
    let mut accessors = Vec::new();
    for hook in &args.hooks {
        let hook_str = hook.to_string();
        if !HOOKS.contains(&hook_str.as_str()) {
            return Err(syn::Error::new(
                hook.span(),
                format!("unknown hook `{}`, expected one of: {}", hook_str, HOOKS.join(", ")),
            ));
        }
        if seen.contains(&hook_str) {
            return Err(syn::Error::new(hook.span(), "hook listed twice"));
        }
        seen.push(hook_str.clone());

        let method = format_ident!("as_{}", snake_case(&hook_str));
        accessors.push(quote! {
            fn #method(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::option::Option<::std::sync::Arc<dyn ::cortex_core::plugin::#hook>> {
                ::std::option::Option::Some(self)
            }
        });
    }

    Ok(quote! {
        impl #impl_generics ::cortex_core::plugin::Extension for #struct_name #ty_generics #where_clause {
            fn name(&self) -> &str {
                #name
            }

            #(#accessors)*
        }
    })
}

/// Attribute macro implementing `Extension` for a struct.
///
/// # Arguments
///
/// * `name` - (Optional) Extension name used in diagnostics; defaults to the
///   lowercased struct name
/// * `hooks(...)` - Capability traits the struct implements
///
/// # Example
///
/// ```ignore
/// #[extension(name = "audit-hook", hooks(RunStarted, ToolFailed))]
/// struct AuditHook {
///     // ... fields
/// }
/// ```
#[proc_macro_attribute]
pub fn extension(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ExtensionArgs);
    let input = parse_macro_input!(item as DeriveInput);

    let imp = match expand(args, &input) {
        Ok(tokens) => tokens,
        Err(e) => return e.to_compile_error().into(),
    };

    TokenStream::from(quote! {
        #input

        #imp
    })
}

/// Derive macro for implementing `Extension`.
///
/// Reads the same arguments as [`macro@extension`] from a `#[cortex(...)]`
/// helper attribute.
///
/// # Example
///
/// ```ignore
/// #[derive(Extension)]
/// #[cortex(name = "tool-tracker", hooks(ToolCalled, ToolCompleted))]
/// struct ToolTracker;
/// ```
#[proc_macro_derive(Extension, attributes(cortex))]
pub fn derive_extension(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let mut args = ExtensionArgs::default();
    for attr in &input.attrs {
        if attr.path().is_ident("cortex") {
            match attr.parse_args::<ExtensionArgs>() {
                Ok(parsed) => {
                    if parsed.name.is_some() {
                        args.name = parsed.name;
                    }
                    args.hooks.extend(parsed.hooks);
                }
                Err(e) => return e.to_compile_error().into(),
            }
        }
    }

    match expand(args, &input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
