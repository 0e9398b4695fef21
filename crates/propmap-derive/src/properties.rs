// #[derive(Properties)] implementation
//
// Generates the Reflect and Properties impls for a struct with named fields.

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_quote, Data, DeriveInput, Error, Field, Fields, GenericArgument, Generics, Ident,
    PathArguments, Result, Type, Visibility, WherePredicate,
};

use crate::attrs::FieldOptions;

/// A field that becomes a property
struct Property<'a> {
    name: String,
    ident: &'a Ident,
    ty: &'a Type,
    options: FieldOptions,
    optional: bool,
}

/// Expands #[derive(Properties)].
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[derive(Properties)]
/// struct Cust {
///     #[property(rename = "ID")]
///     pub id: String,
/// }
///
/// // Output:
/// impl ::propmap::Reflect for Cust {
///     fn get_property(&self, name: &str) -> Option<::propmap::Value> {
///         match name {
///             "ID" => Some(::propmap::ToValue::to_value(&self.id)),
///             _ => None,
///         }
///     }
///     // set_property, type_name, reflect_type_id, property_defs, as_any
/// }
///
/// impl ::propmap::Properties for Cust {
///     const TYPE_NAME: &'static str = "Cust";
///     const PROPERTIES: &'static [::propmap::PropertyDef] = &[
///         ::propmap::PropertyDef::new("ID", ::propmap::Access::ReadWrite,
///             <String as ::propmap::PropertyType>::DECLARED),
///     ];
/// }
/// ```
pub fn expand_properties(input: DeriveInput) -> Result<TokenStream> {
    let properties = collect_properties(&input)?;

    let name = &input.ident;
    let type_name = name.to_string();
    let generics = bounded_generics(&input.generics, &properties)?;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let defs = properties.iter().map(property_def);
    let get_arms = properties
        .iter()
        .filter(|p| p.options.can_read())
        .map(get_arm);
    let set_arms = properties
        .iter()
        .filter(|p| p.options.can_write())
        .map(set_arm);

    Ok(quote! {
        impl #impl_generics ::propmap::Reflect for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn reflect_type_id(&self) -> ::std::any::TypeId {
                ::std::any::TypeId::of::<Self>()
            }

            fn property_defs(&self) -> &'static [::propmap::PropertyDef] {
                <Self as ::propmap::Properties>::PROPERTIES
            }

            #[allow(unused_variables)]
            fn get_property(&self, name: &str) -> ::std::option::Option<::propmap::Value> {
                match name {
                    #(#get_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn set_property(
                &mut self,
                name: &str,
                value: ::propmap::Value,
            ) -> ::std::result::Result<bool, ::propmap::ValueError> {
                match name {
                    #(#set_arms)*
                    _ => ::std::result::Result::Ok(false),
                }
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl #impl_generics ::propmap::Properties for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;
            const PROPERTIES: &'static [::propmap::PropertyDef] = &[#(#defs),*];
        }
    })
}

/// Adds the bounds generated code needs once the struct has type parameters.
///
/// Every type parameter must be `'static + Send + Sync` to satisfy `Reflect`,
/// and every property's field type must convert through `PropertyType` (or
/// the object helpers for `#[property(object)]` fields).
fn bounded_generics(generics: &Generics, properties: &[Property<'_>]) -> Result<Generics> {
    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(Error::new_spanned(
            lifetime,
            "Properties requires a 'static type; lifetime parameters are not supported",
        ));
    }

    let mut generics = generics.clone();
    let params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
    if params.is_empty() {
        return Ok(generics);
    }

    let where_clause = generics.make_where_clause();
    for param in &params {
        where_clause.predicates.push(parse_quote! {
            #param: 'static + ::std::marker::Send + ::std::marker::Sync
        });
    }
    for property in properties {
        where_clause.predicates.push(field_bound(property));
    }

    Ok(generics)
}

fn field_bound(property: &Property<'_>) -> WherePredicate {
    let ty = property.ty;
    if !property.options.object {
        return parse_quote!(#ty: ::propmap::PropertyType);
    }

    let carried = if property.optional {
        option_inner(ty).unwrap_or(ty)
    } else {
        ty
    };
    parse_quote! {
        #carried: ::std::clone::Clone
            + ::std::cmp::PartialEq
            + ::std::marker::Send
            + ::std::marker::Sync
            + 'static
    }
}

fn collect_properties(input: &DeriveInput) -> Result<Vec<Property<'_>>> {
    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(Error::new_spanned(
                    &input.ident,
                    "Properties requires named fields; tuple structs have no property names",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                &input.ident,
                "Properties can only be derived for structs",
            ));
        }
    };

    let mut properties = Vec::new();
    // Lower-cased name -> declared name
    let mut seen: HashMap<String, String> = HashMap::new();

    for field in fields {
        let options = FieldOptions::from_field(field)?;
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        if !matches!(field.vis, Visibility::Public(_)) {
            if options.annotated && !options.skip {
                return Err(Error::new_spanned(
                    ident,
                    "#[property] has no effect on a non-pub field",
                ));
            }
            continue;
        }
        if options.skip {
            continue;
        }

        let name = options
            .rename
            .clone()
            .unwrap_or_else(|| ident.unraw().to_string());
        if let Some(first) = seen.insert(name.to_lowercase(), name.clone()) {
            return Err(Error::new_spanned(
                ident,
                format!("property `{name}` collides with `{first}`; names must differ by more than case"),
            ));
        }

        properties.push(Property {
            name,
            ident,
            ty: &field.ty,
            optional: option_inner(&field.ty).is_some(),
            options,
        });
    }

    Ok(properties)
}

fn property_def(property: &Property<'_>) -> TokenStream {
    let name = &property.name;
    let ty = property.ty;

    let access = match (property.options.readonly, property.options.writeonly) {
        (true, _) => quote!(::propmap::Access::ReadOnly),
        (_, true) => quote!(::propmap::Access::WriteOnly),
        _ => quote!(::propmap::Access::ReadWrite),
    };

    let declared = if property.options.object {
        match option_inner(ty) {
            Some(inner) => quote! {
                ::propmap::DeclaredType::nullable(::propmap::DeclaredType::object(stringify!(#inner)))
            },
            None => quote!(::propmap::DeclaredType::object(stringify!(#ty))),
        }
    } else {
        quote!(<#ty as ::propmap::PropertyType>::DECLARED)
    };

    quote! {
        ::propmap::PropertyDef::new(#name, #access, #declared)
    }
}

fn get_arm(property: &Property<'_>) -> TokenStream {
    let name = &property.name;
    let ident = property.ident;

    let read = match (property.options.object, property.optional) {
        (true, true) => quote!(::propmap::object::optional_to_value(&self.#ident)),
        (true, false) => quote!(::propmap::object::to_value(&self.#ident)),
        (false, _) => quote!(::propmap::ToValue::to_value(&self.#ident)),
    };

    quote! {
        #name => ::std::option::Option::Some(#read),
    }
}

fn set_arm(property: &Property<'_>) -> TokenStream {
    let name = &property.name;
    let ident = property.ident;
    let ty = property.ty;

    let convert = match (property.options.object, property.optional) {
        (true, true) => quote!(::propmap::object::optional_from_value(value)?),
        (true, false) => quote!(::propmap::object::from_value(value)?),
        (false, _) => quote!(<#ty as ::propmap::FromValue>::from_value(value)?),
    };

    quote! {
        #name => {
            self.#ident = #convert;
            ::std::result::Result::Ok(true)
        }
    }
}

/// Returns `T` for a field typed `Option<T>` (matched by the last path segment).
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }

    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
