use std::collections::HashMap;

use tracing::debug;

use crate::engine::llm_client::LanguageModel;
use crate::engine::prompt_builder::PromptBuilder;
use crate::engine::signature::{FieldFormat, PromptSpec};
use crate::error::{ResearchError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn format(&self) -> FieldFormat {
        match self {
            FieldValue::Text(_) => FieldFormat::Text,
            FieldValue::List(_) => FieldFormat::List,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl<S: AsRef<str>> From<&[S]> for FieldValue {
    fn from(values: &[S]) -> Self {
        FieldValue::List(values.iter().map(|v| v.as_ref().to_string()).collect())
    }
}

/// The parsed result of one model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    outputs: HashMap<String, String>,
}

impl Prediction {
    pub fn into_output(mut self, field: &str) -> Result<String> {
        self.outputs
            .remove(field)
            .ok_or_else(|| ResearchError::MissingOutput(field.to_string()))
    }
}

pub struct Predictor {
    spec: PromptSpec,
}

impl Predictor {
    pub fn new(spec: PromptSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &PromptSpec {
        &self.spec
    }

    /// Binds `inputs`, makes exactly one engine call, and extracts the output field.
    /// Binding errors are reported before the engine is touched.
    pub fn call<E>(&self, engine: &E, inputs: &[(&str, FieldValue)]) -> Result<Prediction>
    where
        E: LanguageModel + ?Sized,
    {
        let bound = self.bind(inputs)?;
        let prompt = PromptBuilder::build(&self.spec, &bound);

        debug!(
            spec = self.spec.name(),
            model = engine.model_name(),
            "invoking predictor"
        );
        let completion = engine.complete(&prompt)?;

        let output = self.spec.output();
        let value = PromptBuilder::extract_output(output, &completion);

        let mut outputs = HashMap::new();
        outputs.insert(output.name.clone(), value);
        Ok(Prediction { outputs })
    }

    fn bind<'a>(&self, inputs: &'a [(&str, FieldValue)]) -> Result<Vec<&'a FieldValue>> {
        for (name, _) in inputs {
            if self.spec.input(name).is_none() {
                return Err(ResearchError::UnknownInput {
                    spec: self.spec.name().to_string(),
                    field: name.to_string(),
                });
            }
        }

        self.spec
            .inputs()
            .iter()
            .map(|field| {
                let value = inputs
                    .iter()
                    .rev()
                    .find(|(name, _)| *name == field.name)
                    .map(|(_, value)| value)
                    .ok_or_else(|| ResearchError::MissingInput {
                        spec: self.spec.name().to_string(),
                        field: field.name.clone(),
                    })?;
                if value.format() != field.format {
                    return Err(ResearchError::InputFormat {
                        field: field.name.clone(),
                        expected: field.format.describe(),
                    });
                }
                Ok(value)
            })
            .collect()
    }
}
