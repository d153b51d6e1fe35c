//! Fixed prompt templates exposed over `prompts/list` and `prompts/get`.
//!
//! Templates interpolate `{argument}` placeholders from the request;
//! unknown or missing arguments become empty strings.

use serde_json::{Value, json};

use crate::error::{McpError, McpResult};

struct PromptTemplate {
    name: &'static str,
    description: &'static str,
    arguments: &'static [(&'static str, &'static str)],
    template: &'static str,
}

static TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        name: "fiori-element-review",
        description: "Review a Fiori elements page configuration for a given control",
        arguments: &[("control", "Control or building block to focus on")],
        template: "Review my Fiori elements configuration with a focus on {control}. \
                   Search the SAPUI5 documentation for {control} guidance first, then check \
                   annotations, manifest settings and known restrictions.",
    },
    PromptTemplate {
        name: "cap-service-checklist",
        description: "Checklist for exposing a CAP service",
        arguments: &[("service", "Name of the CDS service definition")],
        template: "Walk through a production checklist for the CAP service {service}: \
                   authorization annotations, draft handling, localization, and deployment \
                   descriptors. Cite CAP documentation sections for each point.",
    },
    PromptTemplate {
        name: "abap-syntax-lookup",
        description: "Look up an ABAP statement across language flavors",
        arguments: &[
            ("statement", "ABAP statement or keyword"),
            ("flavor", "on-prem or cloud"),
        ],
        template: "Look up the ABAP statement {statement} in the {flavor} keyword \
                   documentation and summarize syntax, restrictions and cloud-release \
                   differences.",
    },
];

/// Prompt catalog for `prompts/list`.
#[must_use]
pub fn list() -> Value {
    let prompts: Vec<Value> = TEMPLATES
        .iter()
        .map(|template| {
            json!({
                "name": template.name,
                "description": template.description,
                "arguments": template
                    .arguments
                    .iter()
                    .map(|(name, description)| json!({
                        "name": name,
                        "description": description,
                        "required": false,
                    }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "prompts": prompts })
}

/// Renders one prompt with interpolated arguments.
pub fn get(name: &str, args: Option<&Value>) -> McpResult<Value> {
    let template = TEMPLATES
        .iter()
        .find(|template| template.name == name)
        .ok_or_else(|| McpError::InvalidParams(format!("unknown prompt '{name}'")))?;

    let mut text = template.template.to_string();
    for (arg, _) in template.arguments {
        let value = args
            .and_then(|a| a.get(arg))
            .and_then(Value::as_str)
            .unwrap_or_default();
        text = text.replace(&format!("{{{arg}}}"), value);
    }

    Ok(json!({
        "description": template.description,
        "messages": [{
            "role": "user",
            "content": { "type": "text", "text": text }
        }]
    }))
}
