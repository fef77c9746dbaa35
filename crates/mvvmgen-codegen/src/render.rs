//! Artifact text rendering.
//!
//! One artifact per module:
//!
//! ```text
//! <license line>
//!
//! <generated-file banner>
//!
//! #include "<registry header>"
//!
//! #include "<header>"            one per declaring header, sorted
//!
//! <descriptor definition>        one per declaration
//!
//! struct FViewModelPropertiesRegistrator
//! {
//!     FViewModelPropertiesRegistrator()
//!     {
//!         <register call>        one per declaration
//!     }
//! } GViewModelPropertiesRegistrator_<Module>;
//! ```
//!
//! Declarations are ordered by class qualified name, then property name, so
//! the text depends only on the declaration set.

use mvvmgen_core::{AccessSpecifier, PropertyDeclaration};

use crate::config::GeneratorConfig;
use crate::include::sorted_includes;

const BANNER: [&str; 4] = [
    "/* ------------------------------------------------ *",
    "     This file was generated by UnrealMvvm plugin",
    "     DO NOT modify it manually!",
    " * ------------------------------------------------ */",
];

/// Order declarations the way they appear in an artifact.
pub fn sort_declarations(declarations: &mut [&PropertyDeclaration]) {
    declarations.sort_by(|a, b| {
        a.class
            .qualified_name()
            .cmp(b.class.qualified_name())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Render the artifact of `module`.
///
/// `declarations` must all belong to `module`; they are sorted here.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn render_module(
    module: &str,
    declarations: &[&PropertyDeclaration],
    config: &GeneratorConfig,
) -> String {
    let mut sorted = declarations.to_vec();
    sort_declarations(&mut sorted);

    let mut out = String::with_capacity(512 + sorted.len() * 256);

    push_line(&mut out, &config.license_header);
    out.push('\n');
    for line in BANNER {
        push_line(&mut out, line);
    }
    out.push('\n');

    push_line(&mut out, &format!("#include \"{}\"", config.registry_header));
    out.push('\n');
    for include in sorted_includes(sorted.iter().copied()) {
        push_line(&mut out, &format!("#include \"{include}\""));
    }
    out.push('\n');

    for decl in &sorted {
        push_line(&mut out, &descriptor_line(decl, config));
    }
    out.push('\n');

    push_line(&mut out, "struct FViewModelPropertiesRegistrator");
    push_line(&mut out, "{");
    push_line(&mut out, "    FViewModelPropertiesRegistrator()");
    push_line(&mut out, "    {");
    for decl in &sorted {
        push_line(&mut out, &format!("        {}", register_line(decl, config)));
    }
    push_line(&mut out, "    }");
    push_line(&mut out, &format!("}} GViewModelPropertiesRegistrator_{module};"));

    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// `C::FPProperty C::PPropertyValue = { getter, setter, offset, vis, vis };`
pub fn descriptor_line(decl: &PropertyDeclaration, config: &GeneratorConfig) -> String {
    let class = decl.class.qualified_name();
    let name = &decl.name;

    let setter = if decl.has_setter() {
        format!("&{class}::Set{name}")
    } else {
        "nullptr".to_string()
    };
    let offset = if decl.auto_field() {
        format!("STRUCT_OFFSET({class}, {name}Field)")
    } else {
        "0".to_string()
    };

    format!(
        "{class}::F{name}Property {class}::{name}PropertyValue = {{ &{class}::Get{name}, {setter}, {offset}, {}, {} }};",
        visibility(config, decl.getter_access),
        visibility(config, decl.setter_access),
    )
}

/// `<RegisterFn>(C::PProperty(), "P");`
pub fn register_line(decl: &PropertyDeclaration, config: &GeneratorConfig) -> String {
    format!(
        "{}({}::{}Property(), \"{}\");",
        config.register_function,
        decl.class.qualified_name(),
        decl.name,
        decl.name
    )
}

fn visibility(config: &GeneratorConfig, access: AccessSpecifier) -> String {
    format!("{}V_{}", config.visibility_scope, access)
}
