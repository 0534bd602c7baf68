//! jq pre-filter for schema documents (e.g. pull `.tools[]` out of a larger config).
use anyhow::{Context, Result, anyhow};
use jaq_core::{Compiler, Ctx, RcIter, compile::Undefined, load};
use jaq_json::Val;
use serde_json::Value;

/// Run `filter_src` over `input`; every output becomes one JSON value.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    for item in outputs {
        let val = item.map_err(|e| anyhow!("jq filter `{filter_src}` failed: {e:?}"))?;
        // Val: Display -> JSON text
        let text = val.to_string();
        let value = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("jq filter `{filter_src}` produced non-JSON output"))?;
        out.push(value);
    }
    Ok(out)
}

type LoadErrors<'a> = Vec<(load::File<&'a str, ()>, load::Error<&'a str>)>;
type CompileErrors<'a> = Vec<(load::File<&'a str, ()>, Vec<(&'a str, Undefined)>)>;

fn format_parse_errors(errs: LoadErrors<'_>) -> anyhow::Error {
    let details = errs.iter().map(|(_, err)| format!("{err:?}")).collect::<Vec<_>>();
    anyhow!("cannot parse jq expression for schema selection: {}", details.join("; "))
}

fn format_undefined_errors(errs: CompileErrors<'_>) -> anyhow::Error {
    let names = errs
        .iter()
        .flat_map(|(_, list)| list.iter().map(|(name, _)| format!("`{name}`")))
        .collect::<Vec<_>>();
    anyhow!("jq expression for schema selection uses undefined {}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selects_nested_function_list() {
        let doc = json!({ "version": 1, "tools": [{ "name": "a" }, { "name": "b" }] });
        let out = run_jaq(".tools", &doc).unwrap();
        assert_eq!(out, vec![json!([{ "name": "a" }, { "name": "b" }])]);
    }

    #[test]
    fn each_output_is_a_document() {
        let doc = json!({ "tools": [{ "name": "a" }, { "name": "b" }] });
        let out = run_jaq(".tools[]", &doc).unwrap();
        assert_eq!(out, vec![json!({ "name": "a" }), json!({ "name": "b" })]);
    }

    #[test]
    fn bad_filter_is_an_error() {
        let err = run_jaq(".tools[", &json!({})).unwrap_err();
        assert!(err.to_string().starts_with("cannot parse jq expression"), "{err}");
    }

    #[test]
    fn undefined_function_is_named() {
        let err = run_jaq(".tools | no_such_fn", &json!({})).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("undefined `no_such_fn`"), "{message}");
    }
}
