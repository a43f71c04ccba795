use crate::engine::predict::FieldValue;
use crate::engine::signature::{OutputField, PromptSpec};

/// Builds the full prompt sent to the LLM.
/// Only formats text: no networking, no validation.
pub struct PromptBuilder;

impl PromptBuilder {
    /// `values` are in the same order as `spec.inputs()`.
    pub fn build(spec: &PromptSpec, values: &[&FieldValue]) -> String {
        let mut prompt = String::new();

        push_instruction(&mut prompt, spec);
        push_format_section(&mut prompt, spec);

        for (field, value) in spec.inputs().iter().zip(values) {
            push_prefix(&mut prompt, &field.prefix);
            push_value(&mut prompt, value);
            prompt.push_str("\n\n");
        }

        push_prefix(&mut prompt, &spec.output().prefix);
        prompt
    }

    /// Strips the output prefix only when the completion opens with it;
    /// anything else is returned untouched.
    pub fn extract_output(field: &OutputField, completion: &str) -> String {
        let marker = field.prefix.trim();
        if marker.is_empty() {
            return completion.to_string();
        }
        match completion.trim_start().strip_prefix(marker) {
            Some(rest) => rest.trim().to_string(),
            None => completion.to_string(),
        }
    }
}

fn push_instruction(prompt: &mut String, spec: &PromptSpec) {
    prompt.push_str(spec.instruction());
    prompt.push_str("\n\n---\n\n");
}

fn push_format_section(prompt: &mut String, spec: &PromptSpec) {
    prompt.push_str("Follow the following format.\n\n");
    for field in spec.inputs() {
        push_prefix(prompt, &field.prefix);
        prompt.push_str("${");
        prompt.push_str(&field.name);
        prompt.push_str("}\n\n");
    }
    let output = spec.output();
    push_prefix(prompt, &output.prefix);
    prompt.push_str("${");
    prompt.push_str(&output.name);
    prompt.push_str("}\n\n---\n\n");
}

fn push_prefix(prompt: &mut String, prefix: &str) {
    prompt.push_str(prefix);
    if !prefix.ends_with('\n') && !prefix.ends_with(' ') {
        prompt.push(' ');
    }
}

fn push_value(prompt: &mut String, value: &FieldValue) {
    match value {
        FieldValue::Text(text) => prompt.push_str(text),
        FieldValue::List(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    prompt.push('\n');
                }
                prompt.push_str(&format!("[{}] {}", i + 1, item));
            }
        }
    }
}
