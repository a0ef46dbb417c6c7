use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Post-job action type that retypes an output after the job runs.
pub const CHANGE_DATATYPE_ACTION: &str = "ChangeDatatypeAction";

/// The field data of one workflow step: its declared inputs, outputs and
/// post-job actions. Terminals are (re)built 1:1 from these sequences.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StepDefinition {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub inputs: Vec<InputDefinition>,
    #[serde(default)]
    pub outputs: Vec<OutputDefinition>,
    #[serde(default)]
    pub post_job_actions: Vec<PostJobAction>,
}

/// A declared step input.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct InputDefinition {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub collection_types: Option<Vec<String>>,
    /// `"dataset"`, `"dataset_collection"` or `"parameter"`.
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default, rename = "type")]
    pub parameter_type: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

/// A declared step output.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OutputDefinition {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub collection: bool,
    #[serde(default)]
    pub collection_type: Option<String>,
    #[serde(default)]
    pub parameter: bool,
    #[serde(default, rename = "type")]
    pub parameter_type: Option<String>,
}

/// A step-level action applied after the job, keyed to one output by name.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PostJobAction {
    pub action_type: String,
    #[serde(default)]
    pub output_name: String,
    #[serde(default)]
    pub action_arguments: AHashMap<String, serde_json::Value>,
}

impl StepDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_input(mut self, input: InputDefinition) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: OutputDefinition) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn with_post_job_action(mut self, action: PostJobAction) -> Self {
        self.post_job_actions.push(action);
        self
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

impl InputDefinition {
    /// A single-dataset input accepting `extensions`.
    pub fn data(name: &str, extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            extensions: to_strings(extensions),
            input_type: Some("dataset".to_string()),
            ..Self::default()
        }
    }

    /// A dataset input accepting repeated connections.
    pub fn multiple(name: &str, extensions: &[&str]) -> Self {
        Self {
            multiple: true,
            ..Self::data(name, extensions)
        }
    }

    /// A collection input. An empty `collection_types` accepts any collection.
    pub fn collection(name: &str, extensions: &[&str], collection_types: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            extensions: to_strings(extensions),
            collection_types: (!collection_types.is_empty()).then(|| to_strings(collection_types)),
            input_type: Some("dataset_collection".to_string()),
            ..Self::default()
        }
    }

    /// A workflow parameter input of the given parameter type.
    pub fn parameter(name: &str, parameter_type: &str) -> Self {
        Self {
            name: name.to_string(),
            input_type: Some("parameter".to_string()),
            parameter_type: Some(parameter_type.to_string()),
            ..Self::default()
        }
    }

    pub fn is_collection(&self) -> bool {
        self.input_type.as_deref() == Some("dataset_collection")
    }

    pub fn is_parameter(&self) -> bool {
        self.input_type.as_deref() == Some("parameter")
    }
}

impl OutputDefinition {
    pub fn data(name: &str, extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            extensions: to_strings(extensions),
            ..Self::default()
        }
    }

    pub fn collection(name: &str, extensions: &[&str], collection_type: &str) -> Self {
        Self {
            name: name.to_string(),
            extensions: to_strings(extensions),
            collection: true,
            collection_type: Some(collection_type.to_string()),
            ..Self::default()
        }
    }

    pub fn parameter(name: &str, parameter_type: &str) -> Self {
        Self {
            name: name.to_string(),
            parameter: true,
            parameter_type: Some(parameter_type.to_string()),
            ..Self::default()
        }
    }
}

impl PostJobAction {
    /// A `ChangeDatatypeAction` retyping `output_name` to `newtype`.
    pub fn change_datatype(output_name: &str, newtype: &str) -> Self {
        let mut action_arguments = AHashMap::new();
        action_arguments.insert(
            "newtype".to_string(),
            serde_json::Value::String(newtype.to_string()),
        );
        Self {
            action_type: CHANGE_DATATYPE_ACTION.to_string(),
            output_name: output_name.to_string(),
            action_arguments,
        }
    }

    /// The new datatype this action assigns to `output_name`, if it is a
    /// datatype change aimed at exactly that output.
    pub fn retyped_output(&self, output_name: &str) -> Option<&str> {
        if self.action_type != CHANGE_DATATYPE_ACTION || self.output_name != output_name {
            return None;
        }
        self.action_arguments
            .get("newtype")
            .and_then(serde_json::Value::as_str)
    }
}
