// Procedural macros for the segment engine

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, Ident, ItemFn, Meta, Pat, PatType, parse_macro_input};

/// Procedural macro to convert a plain function into a catalog function.
///
/// The given function can take any number of arguments, as long as each one
/// can be converted from `Value` via its `TryFromValue` implementation. It
/// must return a type convertible to `Result<Value, RuntimeError>` via
/// `FunctionOutput`.
///
/// By default, arguments are extracted and converted as positional arguments
/// from the call's argument list, in declaration order. A single argument may
/// instead be annotated:
/// - `#[context]` - pass the evaluation context, rather than an argument.
/// - `#[raw]` - pass the unreduced `Expression` for this argument rather than
///   a computed `Value`. Used by operators like `BY` that must re-evaluate
///   their argument once per iteration element instead of once up front.
#[proc_macro_attribute]
pub fn function(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut inner_fn = parse_macro_input!(item as ItemFn);

    let meta = parse_macro_input!(attr as Meta);
    let context_type: Ident = match meta {
        Meta::Path(path) => path.get_ident().cloned(),
        _ => None,
    }
    .expect("#[function] expects a context type as its argument");

    let vis = inner_fn.vis.clone();
    let original_fn_ident = inner_fn.sig.ident.clone();
    let inner_fn_ident = format_ident!("{}_inner", original_fn_ident);
    inner_fn.sig.ident = inner_fn_ident.clone();
    inner_fn.vis = syn::Visibility::Inherited;

    let arg_infos: Vec<ArgumentInfo> = inner_fn
        .sig
        .inputs
        .iter_mut()
        .filter_map(|input| match input {
            FnArg::Receiver(_) => None,
            FnArg::Typed(pat_type) => ArgumentInfo::from_pattern(pat_type),
        })
        .collect();

    let argument_extracts = arg_infos.iter().map(ArgumentInfo::extract);
    let call_args = arg_infos.iter().map(|info| {
        let name = &info.name;
        quote! { #name }
    });

    quote! {
        #vis fn #original_fn_ident(
            #[allow(unused_mut)]
            mut arguments: ::segment_engine::Arguments<'_, #context_type>,
        ) -> ::core::result::Result<
            ::segment_engine::Value,
            ::segment_engine::RuntimeError,
        > {
            #inner_fn

            #(#argument_extracts)*
            arguments.ensure_consumed()?;
            let output = #inner_fn_ident(#(#call_args),*);
            ::segment_engine::FunctionOutput::into_result(output)
        }
    }
    .into()
}

/// Metadata about a parameter to a catalog function
struct ArgumentInfo {
    name: Ident,
    kind: ArgumentKind,
}

impl ArgumentInfo {
    /// Detect the argument name and kind from its pattern, stripping any
    /// recognized attributes from the pattern as it goes.
    fn from_pattern(pat_type: &mut PatType) -> Option<Self> {
        let pat_ident = match &*pat_type.pat {
            Pat::Ident(pat_ident) => pat_ident.ident.clone(),
            _ => return None,
        };

        let mut attributes = ArgumentAttributes::default();
        pat_type.attrs.retain(|attr| {
            if let Some(ident) = attr.path().get_ident() {
                !attributes.add(ident)
            } else {
                true
            }
        });
        let kind = ArgumentKind::from_attributes(attributes);

        Some(Self {
            name: pat_ident,
            kind,
        })
    }

    /// Generate code to extract this argument from an `Arguments` value
    fn extract(&self) -> proc_macro2::TokenStream {
        let name = &self.name;
        match self.kind {
            ArgumentKind::Context => quote! {
                let #name = arguments.context();
            },
            ArgumentKind::Positional => quote! {
                let #name = arguments.pop_position()?;
            },
            ArgumentKind::Raw => quote! {
                let #name = arguments.pop_position_raw()?;
            },
        }
    }
}

/// Track what attributes are on a function argument
#[derive(Default)]
struct ArgumentAttributes {
    /// `#[context]` attribute is present
    context: bool,
    /// `#[raw]` attribute is present
    raw: bool,
}

impl ArgumentAttributes {
    /// Enable the given attribute. Return false if it's an unknown attribute
    fn add(&mut self, ident: &Ident) -> bool {
        match ident.to_string().as_str() {
            "context" => {
                self.context = true;
                true
            }
            "raw" => {
                self.raw = true;
                true
            }
            _ => false,
        }
    }
}

/// The kind of an argument defines how it should be extracted
enum ArgumentKind {
    /// Extract the evaluation context
    Context,
    /// Default (no attribute) - extract the next positional argument and
    /// convert it via `TryFromValue`
    Positional,
    /// Extract the next positional argument's unreduced expression, without
    /// evaluating it
    Raw,
}

impl ArgumentKind {
    fn from_attributes(attributes: ArgumentAttributes) -> Self {
        match attributes {
            ArgumentAttributes {
                context: false,
                raw: false,
            } => Self::Positional,
            ArgumentAttributes {
                context: true,
                raw: false,
            } => Self::Context,
            ArgumentAttributes {
                context: false,
                raw: true,
            } => Self::Raw,
            ArgumentAttributes { context: true, .. } => {
                panic!("#[context] cannot be used with other attributes")
            }
        }
    }
}
