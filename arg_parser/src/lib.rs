extern crate proc_macro;

use std::collections::BTreeMap;

use proc_macro::TokenStream;
use quote::{quote, format_ident};
use syn::{self, DeriveInput, Type};

#[derive(deluxe::ExtractAttributes, Debug)]
#[deluxe(attributes(metadata))]
struct MetaDataDefinition {
    #[deluxe(default = String::from(""))]
    description: String,
}

#[derive(deluxe::ExtractAttributes, Debug)]
#[deluxe(attributes(arg))]
struct ArgDefinition {
    short: String,

    #[deluxe(default = String::from(""))]
    long: String,

    #[deluxe(default = String::from(""))]
    description: String,

    #[deluxe(default = false)]
    required: bool,
}

/// How a field is filled from the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldKind {
    /// `bool`, set to `true` when the option is present
    Flag,
    /// `String`, takes the next argument
    Value,
    /// `Option<String>`, takes the next argument
    OptionalValue
}

struct ArgData {
    short: String,
    long: Option<String>,
    description: Option<String>,
    required: bool,
    kind: FieldKind
}

impl ArgData {
    fn from_arg_attribs(attrs: ArgDefinition, kind: FieldKind) -> ArgData {
        ArgData {
            short: attrs.short,
            long: match attrs.long.len() {
                0 => None,
                _ => Some(attrs.long)
            },
            description: match attrs.description.len() {
                0 => None,
                _ => Some(attrs.description)
            },
            required: attrs.required,
            kind
        }
    }

    fn takes_parameter(&self) -> bool {
        self.kind != FieldKind::Flag
    }
}

fn field_kind(field: &Type) -> syn::Result<FieldKind> {
    if let Type::Path(type_path) = field {
        if let Some(path_segment) = type_path.path.segments.last() {
            return Ok(match path_segment.ident.to_string().as_str() {
                "bool" => FieldKind::Flag,
                "Option" => FieldKind::OptionalValue,
                _ => FieldKind::Value
            });
        }
    }
    Err(syn::Error::new_spanned(field, "CmdArgs fields must be bool, String or Option<String>"))
}

fn extract_arg_field_attrs(ast: &mut DeriveInput) -> deluxe::Result<BTreeMap<String, ArgData>> {
    let mut field_attrs: BTreeMap<String, ArgData> = BTreeMap::new();

    let span_source = ast.ident.clone();
    let s = match &mut ast.data {
        syn::Data::Struct(s) => s,
        _ => return Err(syn::Error::new_spanned(span_source, "CmdArgs only supports structs"))
    };

    for field in s.fields.iter_mut() {
        let field_name = match &field.ident {
            Some(ident) => ident.to_string(),
            None => return Err(syn::Error::new_spanned(&field.ty, "CmdArgs needs named fields"))
        };
        let kind = field_kind(&field.ty)?;
        let attrs: ArgDefinition = deluxe::extract_attributes(field)?;
        field_attrs.insert(field_name, ArgData::from_arg_attribs(attrs, kind));
    }

    Ok(field_attrs)
}

fn build_match_arm(index: usize, field_name: &str, attr: &ArgData) -> proc_macro2::TokenStream {
    let short_str = syn::LitStr::new(&attr.short, proc_macro2::Span::call_site());
    let pattern = match &attr.long {
        Some(long) => {
            let long_str = syn::LitStr::new(long, proc_macro2::Span::call_site());
            quote! { #short_str | #long_str }
        },
        None => quote! { #short_str }
    };

    let field_name = format_ident!("{}", field_name);
    let read_parameter = quote! {
        i += 1;
        let value = match args.get(i) {
            Some(value) if !known_options.contains(&value.as_str()) => value.clone(),
            _ => return Err(format!("'{}' requires an argument to be passed", arg))
        };
    };
    let set_struct_field = match attr.kind {
        FieldKind::Flag => quote! {
            return_struct.#field_name = true;
        },
        FieldKind::Value => quote! {
            #read_parameter
            return_struct.#field_name = value;
        },
        FieldKind::OptionalValue => quote! {
            #read_parameter
            return_struct.#field_name = Some(value);
        }
    };

    quote! {
        #pattern => {
            if processed[#index] {
                return Err(format!("Option '{}' has already been processed", arg));
            }
            processed[#index] = true;

            #set_struct_field
        }
    }
}

fn parse_cmd_args_derive2(item: proc_macro2::TokenStream) -> deluxe::Result<proc_macro2::TokenStream> {
    // parse
    let mut ast: DeriveInput = syn::parse2(item)?;
    let meta_data: MetaDataDefinition = deluxe::extract_attributes(&mut ast)?;

    // extract field attributes
    let field_attrs: BTreeMap<String, ArgData> = extract_arg_field_attrs(&mut ast)?;

    let mut match_arms = Vec::new();
    let mut required = Vec::new();
    let mut option_names = Vec::new();
    let mut known_options = vec![String::from("-h"), String::from("--help")];

    let mut usage_str = String::from("Usage: EXEC_NAME [OPTIONS]");
    let mut options_str = String::from("");

    for (index, (field, attr)) in field_attrs.iter().enumerate() {
        match_arms.push(build_match_arm(index, field, attr));
        required.push(attr.required);
        option_names.push(attr.short.clone());
        known_options.push(attr.short.clone());
        known_options.extend(attr.long.clone());

        let long = attr.long.clone().unwrap_or_default();
        let description = attr.description.clone().unwrap_or_default();
        let parameter = match attr.takes_parameter() {
            true => format!("<{}>", field.to_uppercase()),
            false => "".to_owned()
        };

        if attr.required {
            usage_str += &format!(" {} {}", attr.short, parameter);
        }

        options_str += &format!("   {:03} {:20} {:20} {}", attr.short, long, parameter, description);
        if attr.required {
            options_str += " (Required)";
        }
        options_str += "\n";
    }
    options_str += &format!("   {:03} {:20} {:20} {}", "-h", "--help", "", "Displays help");

    if !meta_data.description.is_empty() {
        usage_str += &format!("\n\n{}", &meta_data.description);
    }

    let options_count = field_attrs.len();

    let ident = &ast.ident;
    let (impl_generics, type_generics, where_clause) = ast.generics.split_for_impl();

    // Generate
    let code = quote! {
        impl #impl_generics #ident #type_generics #where_clause {
            /// Usage line, description and the options table.
            pub fn usage() -> String {
                let exec_name = std::env::current_exe()
                    .ok()
                    .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
                    .unwrap_or_else(|| String::from(env!("CARGO_PKG_NAME")));
                format!("{}\n\nOptions:\n{}", #usage_str.replace("EXEC_NAME", &exec_name), #options_str)
            }

            /// Parses `args` (without the executable name).
            /// `Ok(None)` means `-h`/`--help` was given.
            pub fn try_parse_from<I, S>(args: I) -> Result<Option<#ident #type_generics>, String>
            where
                I: IntoIterator<Item = S>,
                S: AsRef<str>
            {
                let args: Vec<String> = args.into_iter().map(|arg| arg.as_ref().to_owned()).collect();
                let mut return_struct: #ident #type_generics = Default::default();
                let mut processed: [bool; #options_count] = [false; #options_count];
                let required: [bool; #options_count] = [#(#required),*];
                let option_names: [&str; #options_count] = [#(#option_names),*];
                // A value may start with '-' as long as it is not itself an option
                let known_options: &[&str] = &[#(#known_options),*];

                let mut i = 0;
                while i < args.len() {
                    let arg = args[i].as_str();
                    match arg {
                        "-h" | "--help" => return Ok(None),
                        #(#match_arms),*
                        _ => return Err(format!("'{}' is not a valid option", arg))
                    };
                    i += 1;
                }

                for index in 0..#options_count {
                    if required[index] && !processed[index] {
                        return Err(format!("Option '{}' is required", option_names[index]));
                    }
                }

                Ok(Some(return_struct))
            }

            /// Parses the process arguments. Prints usage and exits on `-h`/`--help`
            /// (status 0) or on invalid arguments (status 64).
            pub fn parse() -> #ident #type_generics {
                match Self::try_parse_from(std::env::args().skip(1)) {
                    Ok(Some(options)) => options,
                    Ok(None) => {
                        println!("{}", Self::usage());
                        std::process::exit(0);
                    },
                    Err(message) => {
                        eprintln!("[ERROR] {}", message);
                        eprintln!("{}", Self::usage());
                        std::process::exit(64);
                    }
                }
            }
        }
    };

    Ok(code)
}

#[proc_macro_derive(CmdArgs, attributes(metadata, arg))]
pub fn parse_cmd_args_derive(input: TokenStream) -> TokenStream {
    match parse_cmd_args_derive2(input.into()) {
        Ok(code) => code.into(),
        Err(err) => err.to_compile_error().into()
    }
}
