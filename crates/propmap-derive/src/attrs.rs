// #[property(...)] field attribute parsing

use syn::{Field, LitStr, Result};

/// Options collected from a field's #[property] attributes.
#[derive(Debug, Default)]
pub struct FieldOptions {
    pub rename: Option<String>,
    pub readonly: bool,
    pub writeonly: bool,
    pub skip: bool,
    pub object: bool,
    /// Whether any #[property] attribute was present
    pub annotated: bool,
}

impl FieldOptions {
    /// Parses all #[property] attributes on a field.
    ///
    /// Repeated attributes merge; a later `rename` replaces an earlier one.
    pub fn from_field(field: &Field) -> Result<Self> {
        let mut options = FieldOptions::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("property") {
                continue;
            }
            options.annotated = true;

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    let name = lit.value();
                    if name.trim().is_empty() {
                        return Err(meta.error("property name cannot be empty"));
                    }
                    options.rename = Some(name);
                } else if meta.path.is_ident("readonly") {
                    options.readonly = true;
                } else if meta.path.is_ident("writeonly") {
                    options.writeonly = true;
                } else if meta.path.is_ident("skip") {
                    options.skip = true;
                } else if meta.path.is_ident("object") {
                    options.object = true;
                } else {
                    return Err(meta.error(
                        "unknown property option, expected `rename`, `readonly`, `writeonly`, `skip` or `object`",
                    ));
                }
                Ok(())
            })?;
        }

        if options.readonly && options.writeonly {
            return Err(syn::Error::new_spanned(
                field,
                "a property cannot be both `readonly` and `writeonly`",
            ));
        }

        Ok(options)
    }

    pub fn can_read(&self) -> bool {
        !self.writeonly
    }

    pub fn can_write(&self) -> bool {
        !self.readonly
    }
}
