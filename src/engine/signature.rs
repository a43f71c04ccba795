use std::collections::HashSet;

use crate::error::{ResearchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    Text,
    List,
}

impl FieldFormat {
    pub fn describe(self) -> &'static str {
        match self {
            FieldFormat::Text => "a text value",
            FieldFormat::List => "a list of text values",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub name: String,
    pub prefix: String,
    pub format: FieldFormat,
}

impl InputField {
    pub fn new(name: &str, prefix: &str, format: FieldFormat) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputField {
    pub name: String,
    pub prefix: String,
}

impl OutputField {
    pub fn new(name: &str, prefix: &str) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
        }
    }
}

/// A typed prompt template: named inputs in, one named output back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    name: String,
    instruction: String,
    inputs: Vec<InputField>,
    output: OutputField,
}

impl PromptSpec {
    pub fn new(
        name: &str,
        instruction: &str,
        inputs: Vec<InputField>,
        output: OutputField,
    ) -> Result<Self> {
        let invalid = |reason: &str| ResearchError::InvalidSignature {
            spec: name.to_string(),
            reason: reason.to_string(),
        };

        if name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if instruction.trim().is_empty() {
            return Err(invalid("instruction must not be empty"));
        }
        if inputs.is_empty() {
            return Err(invalid("at least one input field is required"));
        }

        let mut seen = HashSet::new();
        for field in inputs.iter().map(|f| &f.name).chain(std::iter::once(&output.name)) {
            if field.trim().is_empty() {
                return Err(invalid("field names must not be empty"));
            }
            if !seen.insert(field.as_str()) {
                return Err(invalid(&format!("duplicate field `{}`", field)));
            }
        }

        Ok(Self {
            name: name.into(),
            instruction: instruction.into(),
            inputs,
            output,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn inputs(&self) -> &[InputField] {
        &self.inputs
    }

    pub fn output(&self) -> &OutputField {
        &self.output
    }

    pub fn input(&self, name: &str) -> Option<&InputField> {
        self.inputs.iter().find(|f| f.name == name)
    }
}

pub const DESCRIPTION: &str = "description";
pub const ANALYSIS: &str = "analysis";
pub const DESCRIPTIONS: &str = "descriptions";
pub const COMPARISON: &str = "comparison";

/// Prompt spec for a single architecture analysis.
pub fn analyze_architecture() -> Result<PromptSpec> {
    PromptSpec::new(
        "AnalyzeArchitecture",
        "Analyze a given software or systems architecture description.",
        vec![InputField::new(
            DESCRIPTION,
            "Architecture description:\n",
            FieldFormat::Text,
        )],
        OutputField::new(ANALYSIS, "Analysis:\n"),
    )
}

/// Prompt spec for one comparison over several descriptions.
pub fn compare_architectures() -> Result<PromptSpec> {
    PromptSpec::new(
        "CompareArchitectures",
        "Compare multiple software or systems architecture descriptions.",
        vec![InputField::new(
            DESCRIPTIONS,
            "Architecture descriptions:\n",
            FieldFormat::List,
        )],
        OutputField::new(COMPARISON, "Comparison:\n"),
    )
}
