use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Field, Fields, Ident, LitInt, Result,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_message(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`Message` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`Message` may only be derived on structs with named fields.",
        ))?
    };

    let Some(attr) = input.attrs.iter().find(|a| a.path().is_ident("message")) else {
        Err(Error::new_spanned(
            &input.ident,
            "`Message` requires a `message(N)` attribute naming the global message number.",
        ))?
    };

    let MessageAttribute { number } = attr.meta.require_list()?.parse_args()?;
    number.base10_parse::<u16>()?;

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for field in &fields {
        if !seen.insert(field.number.base10_parse::<u8>()?) {
            Err(Error::new(
                field.number.span(),
                "Field numbers must be unique.",
            ))?
        }
    }

    // Fields are emitted in declaration order, which becomes definition order.
    let emits = fields.iter().map(|FieldMetadata { name, number }| {
        quote! {
            emit(::chainring::sans::data::Field::new(
                #number,
                ::chainring::sans::data::ToValue::to_value(&self.#name),
            ));
        }
    });

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::chainring::sans::data::Message for #name #ty_generics #where_clause {
            const NUMBER: u16 = #number;

            fn fields<'a>(&'a self, mut emit: impl FnMut(::chainring::sans::data::Field<'a>)) {
                #(#emits)*
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    number: LitInt,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let FieldAttribute { number } = attr.meta.require_list()?.parse_args()?;

        Ok(Some(Self { name, number }))
    }
}

#[derive(Debug)]
struct MessageAttribute {
    number: LitInt,
}

impl Parse for MessageAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let number = input.parse::<LitInt>()?;
        Ok(Self { number })
    }
}

#[derive(Debug)]
struct FieldAttribute {
    number: LitInt,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let number = input.parse::<LitInt>()?;
        if !input.is_empty() {
            Err(input.error("Field attribute takes a single field number."))?
        }
        Ok(Self { number })
    }
}
