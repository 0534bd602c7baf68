//! Plain-text documentation for a function schema.
use crate::schema::{FunctionSpec, ParamType, Parameter};

const INDENT: &str = "  ";

#[derive(Default)]
struct DocWriter {
    lines: Vec<String>,
}

impl DocWriter {
    fn line(&mut self, level: usize, text: impl AsRef<str>) {
        self.lines.push(format!("{}{}", INDENT.repeat(level), text.as_ref()));
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn into_string(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

pub fn render_documentation(functions: &[FunctionSpec]) -> String {
    let mut doc = DocWriter::default();
    doc.line(0, "Available Functions:");
    doc.blank();
    for function in functions {
        doc.line(0, format!("{}:", function.name()));
        doc.line(1, format!("Description: {}", function.description()));
        if function.parameters().is_empty() {
            doc.line(1, "Parameters: none");
        } else {
            doc.line(1, "Parameters:");
            for (name, param) in function.parameters() {
                document_parameter(&mut doc, name, param, 2);
            }
        }
        doc.blank();
    }
    doc.into_string()
}

fn document_parameter(doc: &mut DocWriter, name: &str, param: &Parameter, level: usize) {
    let presence = if param.is_required() { "required" } else { "optional" };
    let mut line = format!("{name} ({}, {presence})", param.type_label());
    if let Some(description) = describe(param) {
        line.push_str(": ");
        line.push_str(&description);
    }
    doc.line(level, line);

    match param.ty() {
        ParamType::Object(fields) => {
            doc.line(level + 1, "Structure:");
            for (field, child) in fields {
                document_parameter(doc, field, child, level + 2);
            }
        }
        ParamType::Array(element) => {
            doc.line(level + 1, "Element Type:");
            document_parameter(doc, "item", element, level + 2);
        }
        ParamType::String
        | ParamType::Boolean
        | ParamType::Integer
        | ParamType::Float(_)
        | ParamType::Enum(_) => {}
    }
}

/// Description text plus any type-specific annotation.
fn describe(param: &Parameter) -> Option<String> {
    let note = match param.ty() {
        ParamType::Enum(values) => Some(format!("(Valid values: {})", or_list(values.as_slice()))),
        ParamType::Float(Some(precision)) => Some(format!("(exactly {precision} decimal places)")),
        _ => None,
    };
    match (param.description(), note) {
        (Some(text), Some(note)) => Some(format!("{text} {note}")),
        (Some(text), None) => Some(text.to_owned()),
        (None, note) => note,
    }
}

/// `a`, `a or b`, `a, b or c`.
fn or_list(values: &[String]) -> String {
    match values {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_function_layout() {
        let f = FunctionSpec::new(
            "send_message",
            "Sends a message to the User.",
            [("message", Parameter::string().describe("Message you want to send to the user."))],
        )
        .unwrap();
        assert_eq!(
            render_documentation(&[f]),
            "Available Functions:\n\
             \n\
             send_message:\n  \
             Description: Sends a message to the User.\n  \
             Parameters:\n    \
             message (string, required): Message you want to send to the user.\n\
             \n"
        );
    }

    #[test]
    fn nested_structures_indent_further() {
        let address = Parameter::object([
            ("street", Parameter::string().describe("Street name")),
            ("zip_code", Parameter::string().optional()),
        ])
        .unwrap()
        .describe("Postal address");
        let samples = Parameter::array(Parameter::float(Some(5)).unwrap().describe("Reading"));
        let role = Parameter::enumeration(["Admin", "User", "Guest"]).unwrap().describe("Role");
        let f = FunctionSpec::new(
            "create_user_profile",
            "Create a user profile",
            [("address", address), ("samples", samples), ("role", role.optional())],
        )
        .unwrap();

        let doc = render_documentation(&[f]);
        let lines: Vec<_> = doc.lines().collect();
        assert_eq!(
            lines[5..],
            [
                "    address (object, required): Postal address",
                "      Structure:",
                "        street (string, required): Street name",
                "        zip_code (string, optional)",
                "    samples (array, required)",
                "      Element Type:",
                "        item (float, required): Reading (exactly 5 decimal places)",
                "    role (enum, optional): Role (Valid values: Admin, User or Guest)",
                "",
            ]
        );
    }

    #[test]
    fn enum_without_description_still_lists_values() {
        let f = FunctionSpec::new("f", "d", [("e", Parameter::enumeration(["on"]).unwrap())]).unwrap();
        assert!(render_documentation(&[f]).contains("    e (enum, required): (Valid values: on)\n"));
    }

    #[test]
    fn parameterless_function() {
        let f = FunctionSpec::new("get_time", "Current time", Vec::<(String, Parameter)>::new()).unwrap();
        assert!(render_documentation(&[f]).contains("get_time:\n  Description: Current time\n  Parameters: none\n"));
    }

    #[test]
    fn number_keeps_its_declared_label() {
        let f: FunctionSpec = serde_json::from_value(serde_json::json!({
            "name": "set_volume",
            "parameters": {
                "level": { "type": "number", "description": "Volume" },
                "step": { "type": "integer", "required": false }
            }
        }))
        .unwrap();
        let doc = render_documentation(&[f]);
        assert!(doc.contains("    level (number, required): Volume\n"), "{doc}");
        assert!(doc.contains("    step (integer, optional)\n"), "{doc}");
    }

    #[test]
    fn or_list_shapes() {
        let v = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(or_list(&v(&["a"])), "a");
        assert_eq!(or_list(&v(&["a", "b"])), "a or b");
        assert_eq!(or_list(&v(&["a", "b", "c"])), "a, b or c");
    }
}
