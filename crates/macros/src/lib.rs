use proc_macro::TokenStream;
use quote::quote;

#[derive(deluxe::ParseMetaItem)]
#[deluxe(attributes(penalty))]
struct PenaltyAttributes(syn::Ident, #[deluxe(flatten)] PenaltyNamedAttributes);

#[derive(deluxe::ParseMetaItem)]
struct PenaltyNamedAttributes {
  name: String,
}

/// Turn a `fn penalty(&self, params, lhs, rhs) -> f64` body into a named
/// unit struct implementing `Penalty`.
///
/// The `Penalty` trait must be in scope where the attribute is used.
#[proc_macro_attribute]
pub fn penalty(attrs: TokenStream, input: TokenStream) -> TokenStream {
  let PenaltyAttributes(ident, PenaltyNamedAttributes { name }) = match deluxe::parse2::<PenaltyAttributes>(attrs.into()) {
    Ok(attrs) => attrs,
    Err(err) => return err.into_compile_error().into(),
  };

  let input = proc_macro2::TokenStream::from(input);

  quote! {
      pub(crate) struct #ident;

      impl Penalty for #ident {
        fn name(&self) -> &'static str {
            #name
        }

        #[tracing::instrument(level = "trace", name = #name, skip_all)]
        #input
      }
  }
  .into()
}
