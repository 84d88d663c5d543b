use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, LitStr, PatType, Type};

/// Turns a typed function into an `exprule` built-in.
///
/// The generated function takes `(args: &[Node], scope: &Scope<'_>)`, checks
/// the argument count, then evaluates each argument left to right and binds it
/// to the matching parameter. Supported parameter types are `String`, `i64`,
/// `f64`, `bool` and `Value`; values are never coerced between types. `scope`
/// stays visible inside the body.
///
/// The optional string argument names the function in error messages, e.g.
/// `#[builtin("matchString")]`. Generated code refers to `crate::` paths and is
/// meant for use inside the `exprule` crate.
#[proc_macro_attribute]
pub fn builtin(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let display_name = if attr.is_empty() {
        input.sig.ident.to_string()
    } else {
        parse_macro_input!(attr as LitStr).value()
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let fn_name = &input.sig.ident;
    let fn_args = &input.sig.inputs;
    let fn_body = &input.block;
    let fn_output = &input.sig.output;

    let mut arg_extractions = Vec::new();

    for (i, arg) in fn_args.iter().enumerate() {
        if let FnArg::Typed(PatType { pat, ty, .. }) = arg {
            let arg_name = match **pat {
                syn::Pat::Ident(ref ident) => &ident.ident,
                _ => panic!("Unsupported pattern"),
            };
            let position = i + 1;

            let extract = |variant: proc_macro2::TokenStream, expected: &str| {
                quote! {
                    let #arg_name = match scope.evaluate(&args[#i])? {
                        crate::ast::Value::#variant(value) => value,
                        other => {
                            return Err(crate::error::Error::argument_type(
                                #display_name,
                                #position,
                                #expected,
                                &other,
                            ))
                        }
                    };
                }
            };

            let extract_code = match **ty {
                Type::Path(ref type_path) => {
                    let type_ident = &type_path.path.segments.last().unwrap().ident;
                    match type_ident.to_string().as_str() {
                        "String" => extract(quote!(Str), "string"),
                        "i64" => extract(quote!(Int), "int"),
                        "f64" => extract(quote!(Float), "float"),
                        "bool" => extract(quote!(Bool), "bool"),
                        "Value" => quote! {
                            let #arg_name = scope.evaluate(&args[#i])?;
                        },
                        _ => panic!("Unsupported type {}", type_ident),
                    }
                }
                _ => panic!("Unsupported argument type"),
            };

            arg_extractions.push(extract_code);
        }
    }

    let args_len = arg_extractions.len();
    let expanded = quote! {
        #(#attrs)*
        #vis fn #fn_name(
            args: &[crate::ast::Node],
            scope: &crate::ast::Scope<'_>,
        ) #fn_output {
            if args.len() != #args_len {
                return Err(crate::error::Error::ArgumentCount {
                    function: #display_name.to_string(),
                    expected: #args_len,
                    found: args.len(),
                });
            }

            #(#arg_extractions)*

            #fn_body
        }
    };

    TokenStream::from(expanded)
}
