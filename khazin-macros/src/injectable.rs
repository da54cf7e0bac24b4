//! `#[derive(Injectable)]` expansion.

use darling::ast::{Data, Fields, Style};
use darling::{Error, FromDeriveInput, FromField};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, GenericArgument, Ident, Path, PathArguments, Type};

#[derive(FromDeriveInput)]
#[darling(attributes(inject), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: Ident,
    generics: syn::Generics,
    data: Data<(), InjectField>,
    #[darling(default)]
    name: Option<String>,
    #[darling(default, rename = "crate")]
    krate: Option<Path>,
}

#[derive(FromField)]
#[darling(attributes(inject))]
struct InjectField {
    ident: Option<Ident>,
    ty: Type,
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    default: bool,
}

pub fn expand(input: &DeriveInput) -> darling::Result<TokenStream> {
    let input = InjectableInput::from_derive_input(input)?;

    if !input.generics.params.is_empty() {
        return Err(Error::custom("Injectable can't be derived for generic types")
            .with_span(&input.generics));
    }

    let krate = input
        .krate
        .clone()
        .unwrap_or_else(|| syn::parse_quote!(::khazin));
    let ident = &input.ident;
    let name = input.name.clone().unwrap_or_else(|| ident.to_string());

    let fields = match input.data {
        Data::Struct(fields) => fields,
        Data::Enum(_) => return Err(Error::unsupported_shape("enum")),
    };

    let (parameters, body) = construction(&fields)?;

    Ok(quote! {
        impl #krate::Injectable for #ident {
            const NAME: &'static str = #name;

            fn parameters() -> &'static [&'static str] {
                &[#(#parameters),*]
            }

            #[allow(unused_variables)]
            fn construct(arguments: &mut #krate::Arguments) -> #krate::Result<Self> {
                ::core::result::Result::Ok(#body)
            }
        }

        #krate::__private::inventory::submit! {
            #krate::Discoverable::new(
                <#ident as #krate::Injectable>::descriptor,
                ::core::file!(),
                ::core::module_path!(),
            )
        }
    })
}

/// Parameter names and the struct expression that consumes them.
fn construction(fields: &Fields<InjectField>) -> darling::Result<(Vec<String>, TokenStream)> {
    if fields.style == Style::Unit {
        return Ok((Vec::new(), quote!(Self)));
    }

    let mut errors = Error::accumulator();
    let mut parameters = Vec::new();
    let mut initializers = Vec::new();

    for field in fields.iter() {
        let Some(field_ident) = &field.ident else {
            continue;
        };

        if field.default {
            initializers.push(quote! {
                #field_ident: ::core::default::Default::default()
            });
            continue;
        }

        let Some(inner) = errors.handle(arc_inner(&field.ty)) else {
            continue;
        };

        let parameter = field
            .name
            .clone()
            .unwrap_or_else(|| field_ident.to_string().trim_start_matches("r#").to_string());
        parameters.push(parameter);
        initializers.push(quote! {
            #field_ident: arguments.next::<#inner>()?
        });
    }

    errors.finish()?;
    Ok((parameters, quote!(Self { #(#initializers),* })))
}

/// `T` out of `Arc<T>` (also `std::sync::Arc<T>`).
fn arc_inner(ty: &Type) -> darling::Result<&Type> {
    let unsupported = || {
        Error::custom("Injectable fields must be `Arc<T>`; mark others with #[inject(default)]")
            .with_span(ty)
    };

    let Type::Path(type_path) = ty else {
        return Err(unsupported());
    };
    let segment = type_path.path.segments.last().ok_or_else(unsupported)?;
    if segment.ident != "Arc" {
        return Err(unsupported());
    }

    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Ok(inner),
            _ => Err(unsupported()),
        },
        _ => Err(unsupported()),
    }
}
