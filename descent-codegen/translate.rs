use std::collections::HashMap;

use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::{format_ident, quote};

use crate::analysis::Diagnostic;
use crate::ast::*;
use crate::CompileOptions;

/// Names the generated module imports from `::descent::prelude`.
const PRELUDE: &[&str] = &["Value", "Choice", "MatchResult", "Parser", "ParserExt"];

/// Rule names that cannot become a binding in generated handlers.
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_", "matched"];

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn", "else", "enum",
    "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "macro", "match", "mod",
    "move", "mut", "override", "priv", "pub", "ref", "return", "static", "struct", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// The struct name generated for a rule: its first letter upper-cased.
pub fn type_name(rule: &str) -> String {
    let mut chars = rule.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn binding_ident(name: &str) -> Ident {
    if KEYWORDS.contains(&name) {
        Ident::new_raw(name, Span::call_site())
    } else {
        Ident::new(name, Span::call_site())
    }
}

pub(crate) fn compile_grammar(grammar: &Grammar, options: &CompileOptions) -> Result<TokenStream, Vec<Diagnostic>> {
    let mut diagnostics = check_names(grammar);
    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    let mut items = Vec::new();
    for rule in grammar.iter_rules() {
        match compile_rule(rule, options) {
            Ok(tokens) => items.push(tokens),
            Err(mut errors) => diagnostics.append(&mut errors),
        }
    }

    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    Ok(quote! {
        #[allow(unused_imports)]
        use ::descent::prelude::*;

        #(#items)*
    })
}

fn check_names(grammar: &Grammar) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut taken: HashMap<String, String> = PRELUDE
        .iter()
        .map(|name| (name.to_string(), format!("the prelude item `{}`", name)))
        .collect();

    for rule in grammar.iter_rules() {
        if RESERVED.contains(&rule.name.as_str()) {
            diagnostics.push(Diagnostic::ReservedName(rule.name.clone()));
            continue;
        }
        let ty = type_name(&rule.name);
        if ty == rule.name {
            diagnostics.push(Diagnostic::UncasedName(rule.name.clone()));
            continue;
        }
        for generated in [ty.clone(), format!("{}Alt", ty)] {
            match taken.get(&generated) {
                Some(other) => diagnostics.push(Diagnostic::NameCollision {
                    rule: rule.name.clone(),
                    generated,
                    other: other.clone(),
                }),
                None => {
                    taken.insert(generated, format!("a name generated for rule `{}`", rule.name));
                }
            }
        }
    }

    diagnostics
}

fn compile_rule(rule: &Rule, options: &CompileOptions) -> Result<TokenStream, Vec<Diagnostic>> {
    let ty = format_ident!("{}", type_name(&rule.name));
    let alt = format_ident!("{}Alt", type_name(&rule.name));
    let unrolled = options.unroll_right_recursion && rule.has_right_recursion();

    let mut errors = Vec::new();
    let mut variants = Vec::new();
    let mut decode_arms = Vec::new();
    let mut branches = Vec::new();
    let mut handlers = Vec::new();
    let mut repetitions = Vec::new();

    for (index, sequence) in rule.sequences.iter().enumerate() {
        let variant = format_ident!("Seq{}", index);
        decode_arms.push(quote!(#index => ::std::option::Option::Some(#alt::#variant(items)),));
        variants.push(variant.clone());

        let recursive = unrolled && sequence.right_recursive;
        let items = if recursive { sequence.prefix() } else { &sequence.items[..] };

        let mut parsers = Vec::new();
        for item in items {
            match compile_item(rule, item) {
                Ok(parser) => parsers.push(parser),
                Err(e) => errors.push(e),
            }
        }
        let action = match compile_action(rule, sequence) {
            Ok(action) => action,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        let parser = quote!(::descent::ParserExt::boxed(::descent::Sequence::new(::std::vec![#(#parsers),*])));
        let bindings = compile_bindings(sequence);

        if recursive {
            branches.push(quote!(::descent::Branch::Recursive(#parser)));
            handlers.push(quote! {
                #alt::#variant(matched) => { ::descent::Value::List(matched) }
            });
            repetitions.push(quote! {
                #alt::#variant(mut matched) => {
                    if !tail.is_discard() {
                        matched.push(tail);
                    }
                    #bindings
                    #action
                }
            });
        } else {
            branches.push(if unrolled { quote!(::descent::Branch::Base(#parser)) } else { parser });
            handlers.push(quote! {
                #alt::#variant(matched) => {
                    #bindings
                    #action
                }
            });
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let (tree_ty, tree) = if unrolled {
        (quote!(::descent::Unrolled), quote!(::descent::Unrolled::new(::std::vec![#(#branches),*])))
    } else {
        (quote!(::descent::Alternative), quote!(::descent::Alternative::new(::std::vec![#(#branches),*])))
    };

    let handle = if unrolled {
        quote! {
            fn handle(value: ::descent::Value) -> ::descent::Value {
                let mut steps = value.into_list();
                let mut result = match steps.pop() {
                    ::std::option::Option::Some(::descent::Value::Choice(choice)) => match #alt::from_choice(choice) {
                        ::std::option::Option::Some(alt) => #ty::handle_alt(alt),
                        ::std::option::Option::None => ::descent::Value::Nil,
                    },
                    _ => ::descent::Value::Nil,
                };
                while let ::std::option::Option::Some(step) = steps.pop() {
                    if let ::descent::Value::Choice(choice) = step {
                        if let ::std::option::Option::Some(alt) = #alt::from_choice(choice) {
                            result = #ty::handle_repetition(alt, result);
                        }
                    }
                }
                result
            }

            fn handle_repetition(alt: #alt, tail: ::descent::Value) -> ::descent::Value {
                match alt {
                    #(#repetitions)*
                    other => #ty::handle_alt(other),
                }
            }
        }
    } else {
        quote! {
            fn handle(value: ::descent::Value) -> ::descent::Value {
                match value {
                    ::descent::Value::Choice(choice) => match #alt::from_choice(choice) {
                        ::std::option::Option::Some(alt) => #ty::handle_alt(alt),
                        ::std::option::Option::None => ::descent::Value::Nil,
                    },
                    other => other,
                }
            }
        }
    };

    let body = if options.trace {
        let name = rule.name.as_str();
        quote! {
            ::descent::__private::tracing::trace!(rule = #name, "enter");
            let result = ::descent::Parser::parse(&*PARSER, input).map(#ty::handle);
            ::descent::__private::tracing::trace!(
                rule = #name,
                success = result.is_success(),
                consumed = result.consumed.len(),
                "exit"
            );
            result
        }
    } else {
        quote!(::descent::Parser::parse(&*PARSER, input).map(#ty::handle))
    };

    let doc = format!("Parser for the `{}` rule.", rule.name);

    Ok(quote! {
        #[doc = #doc]
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #ty;

        #[allow(non_camel_case_types)]
        enum #alt {
            #(#variants(::std::vec::Vec<::descent::Value>),)*
        }

        impl #alt {
            fn from_choice(choice: ::descent::Choice) -> ::std::option::Option<#alt> {
                let items = (*choice.value).into_list();
                match choice.index {
                    #(#decode_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        #[allow(unused_variables, unused_mut, unreachable_patterns, non_snake_case, clippy::all)]
        impl #ty {
            #handle

            fn handle_alt(alt: #alt) -> ::descent::Value {
                match alt {
                    #(#handlers)*
                }
            }
        }

        impl ::descent::Parser for #ty {
            fn parse<'i>(&self, input: &'i str) -> ::descent::MatchResult<'i> {
                static PARSER: ::descent::__private::Lazy<#tree_ty> = ::descent::__private::Lazy::new(|| #tree);
                #body
            }
        }
    })
}

fn compile_item(rule: &Rule, item: &LexItem) -> Result<TokenStream, Diagnostic> {
    Ok(match item {
        LexItem::Reference(name) => {
            let ty = format_ident!("{}", type_name(name));
            quote!(::descent::ParserExt::boxed(#ty))
        }
        LexItem::Literal(text) => {
            let text = Literal::string(text);
            quote!(::descent::ParserExt::boxed(::descent::ParserExt::padded(::descent::Literal::new(#text))))
        }
        LexItem::Pattern(source) => {
            if let Err(e) = descent_runtime::Pattern::new(source) {
                return Err(Diagnostic::InvalidPattern {
                    rule: rule.name.clone(),
                    pattern: source.clone(),
                    error: e.to_string(),
                });
            }
            let source = Literal::string(source);
            quote! {
                ::descent::ParserExt::boxed(::descent::ParserExt::padded(
                    ::descent::Pattern::new(#source).expect("pattern was checked when the grammar was compiled")
                ))
            }
        }
    })
}

/// One `let` per reference item, bound to that item's value by position.
fn compile_bindings(sequence: &Sequence) -> TokenStream {
    let lets = sequence.items.iter().enumerate().filter_map(|(index, item)| {
        let name = binding_ident(item.reference()?);
        Some(quote!(let #name = matched.get(#index).cloned().unwrap_or_default();))
    });
    quote!(#(#lets)*)
}

fn compile_action(rule: &Rule, sequence: &Sequence) -> Result<TokenStream, Diagnostic> {
    match sequence.action.as_deref().map(str::trim) {
        None => Ok(quote!(::descent::Value::List(matched))),
        Some("") => Ok(quote!(::descent::Value::Nil)),
        Some(code) => {
            let tokens: TokenStream = code.parse().map_err(|e: proc_macro2::LexError| Diagnostic::InvalidAction {
                rule: rule.name.clone(),
                error: e.to_string(),
            })?;
            Ok(quote!(::descent::Value::from({ #tokens })))
        }
    }
}
