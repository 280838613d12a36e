use serde_json::Value;

pub const REGENERATE_COMMAND: &str = "ctags-index.regenerate";
pub const REINDEX_COMMAND: &str = "ctags-index.reindex";

pub(crate) fn all() -> Vec<String> {
    vec![REGENERATE_COMMAND.to_string(), REINDEX_COMMAND.to_string()]
}

/// Extra generator arguments from `workspace/executeCommand`: either the
/// arguments themselves as strings, or a single array of strings.
/// Non-string values are ignored.
pub(crate) fn generator_args(arguments: &[Value]) -> Vec<String> {
    match arguments {
        [Value::Array(inner)] => strings(inner),
        _ => strings(arguments),
    }
}

fn strings(values: &[Value]) -> Vec<String> {
    values.iter().filter_map(|value| value.as_str().map(str::to_owned)).collect()
}

#[cfg(test)]
#[path = "../../tests/src/server/commands_tests.rs"]
mod tests;
