//! Derive macros for configuration structs.
//!
//! Both derives read the documentation of each field. A field documented with
//! `(Default: <expr>)` gets `<expr>` as its default value.
use proc_macro2::{Span, TokenStream};
use quote::quote;
use regex::Regex;
use syn::{parse_quote, Attribute, Data, Expr, Fields, Ident, Lit, LitStr, Meta, MetaNameValue};
use synstructure::decl_derive;

/// Trimmed, non-empty doc comment lines.
fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter_map(|attr| match attr.parse_meta() {
            Ok(Meta::NameValue(MetaNameValue {
                path,
                lit: Lit::Str(doc_str),
                ..
            })) if path.is_ident("doc") => Some(doc_str.value().trim().to_owned()),
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect()
}

fn default_re() -> Regex {
    Regex::new(r"\(Default: (.*)\)").unwrap()
}

/// Derives a default instance from the documentation.
fn derive_doc_default(s: synstructure::Structure) -> TokenStream {
    let variant = match s.variants() {
        [variant] => variant,
        _ => panic!("DocDefault requires a struct"),
    };

    let default_re = default_re();

    let body = variant.construct(|field, _| {
        let mut default_value: Expr = parse_quote!(Default::default());
        for line in doc_lines(&field.attrs) {
            if let Some(default_str) = default_re.captures(&line) {
                let default_str = LitStr::new(&default_str[1], Span::call_site());
                default_value = default_str
                    .parse()
                    .expect("error parsing default expression");
            }
        }
        default_value
    });

    s.gen_impl(quote! {
        gen impl Default for @Self {
            fn default() -> Self {
                #body
            }
        }
    })
}

/// Derives a `<Name>Update` struct holding an optional value per field.
///
/// The update struct can be deserialized with serde, merged with other updates and applied to the
/// configuration. The configuration also gets a `help()` text listing all fields with their docs.
fn derive_config_update(s: synstructure::Structure) -> TokenStream {
    let ast = s.ast();
    let name = &ast.ident;
    let vis = &ast.vis;
    let update_name = Ident::new(&format!("{}Update", name), name.span());

    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("ConfigUpdate requires named fields"),
        },
        _ => panic!("ConfigUpdate requires a struct"),
    };

    let mut update_fields = vec![];
    let mut merge_fields = vec![];
    let mut apply_fields = vec![];
    let mut help = String::new();

    for field in fields.iter() {
        let ident = field.ident.as_ref().expect("named field");
        let ty = &field.ty;
        let docs = doc_lines(&field.attrs);
        let doc = docs.join(" ");

        update_fields.push(quote! {
            #[doc = #doc]
            pub #ident: Option<#ty>
        });
        merge_fields.push(quote! {
            if other.#ident.is_some() {
                self.#ident = other.#ident;
            }
        });
        apply_fields.push(quote! {
            if let Some(value) = &self.#ident {
                config.#ident = value.clone();
            }
        });

        help.push_str(&format!("{}:\n", ident));
        for line in docs.iter() {
            help.push_str(&format!("    {}\n", line));
        }
    }

    let update_doc = format!(
        "Partial update for [`{}`]. Fields set to `None` are left unchanged.",
        name
    );

    quote! {
        #[doc = #update_doc]
        #[derive(Default, Debug, Clone, serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        #vis struct #update_name {
            #(#update_fields,)*
        }

        impl #update_name {
            /// Update that changes nothing.
            pub fn new() -> #update_name {
                #update_name::default()
            }

            /// Merge another update into this one, values set in `other` take precedence.
            pub fn merge(&mut self, other: #update_name) {
                #(#merge_fields)*
            }

            /// Overwrite every field of `config` that is set in this update.
            pub fn apply(&self, config: &mut #name) {
                #(#apply_fields)*
            }
        }

        impl #name {
            /// Description of all options.
            pub fn help() -> &'static str {
                #help
            }
        }
    }
}

decl_derive!([DocDefault] => derive_doc_default);
decl_derive!([ConfigUpdate] => derive_config_update);
