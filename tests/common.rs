//! Common test utilities for building workflows, steps and datatype tables.
use setsuzoku::prelude::*;

/// Datatype table used across the tests.
///
/// Hierarchy: `data` <- `txt` <- `tabular`, and `data` <- `binary`.
#[allow(dead_code)]
pub fn create_datatypes() -> DatatypesMapping {
    DatatypesMapping::new()
        .with_datatype("data", "galaxy.datatypes.data.Data", &[])
        .with_datatype(
            "txt",
            "galaxy.datatypes.data.Text",
            &["galaxy.datatypes.data.Data"],
        )
        .with_datatype(
            "tabular",
            "galaxy.datatypes.tabular.Tabular",
            &["galaxy.datatypes.data.Text", "galaxy.datatypes.data.Data"],
        )
        .with_datatype(
            "binary",
            "galaxy.datatypes.binary.Binary",
            &["galaxy.datatypes.data.Data"],
        )
}

/// Same hierarchy as [`create_datatypes`], in the registry's JSON shape.
#[allow(dead_code)]
pub const DATATYPES_JSON: &str = r#"{
    "datatypes": ["data", "txt", "tabular", "binary"],
    "datatypes_mapping": {
        "ext_to_class_name": {
            "data": "galaxy.datatypes.data.Data",
            "txt": "galaxy.datatypes.data.Text",
            "tabular": "galaxy.datatypes.tabular.Tabular",
            "binary": "galaxy.datatypes.binary.Binary"
        },
        "class_to_classes": {
            "galaxy.datatypes.data.Data": {"galaxy.datatypes.data.Data": true},
            "galaxy.datatypes.data.Text": {
                "galaxy.datatypes.data.Text": true,
                "galaxy.datatypes.data.Data": true
            },
            "galaxy.datatypes.tabular.Tabular": {
                "galaxy.datatypes.tabular.Tabular": true,
                "galaxy.datatypes.data.Text": true,
                "galaxy.datatypes.data.Data": true
            },
            "galaxy.datatypes.binary.Binary": {
                "galaxy.datatypes.binary.Binary": true,
                "galaxy.datatypes.data.Data": true
            }
        }
    }
}"#;

/// Routes engine logs to the test output. Safe to call from every test.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A workflow over [`create_datatypes`] with an event log attached.
#[allow(dead_code)]
pub fn workflow_with_log() -> (Workflow, EventLog) {
    init_tracing();
    let log = EventLog::new();
    let workflow = Workflow::builder()
        .with_datatypes(create_datatypes())
        .with_sink(log.clone())
        .build();
    (workflow, log)
}

/// A step with a single data output named `output`.
#[allow(dead_code)]
pub fn data_source(workflow: &mut Workflow, extension: &str) -> TerminalKey {
    let step = workflow.add_step(
        StepDefinition::new()
            .with_label("input dataset")
            .with_output(OutputDefinition::data("output", &[extension])),
    );
    TerminalKey::output(step, "output")
}

/// A step with a single collection output named `output`.
#[allow(dead_code)]
pub fn collection_source(
    workflow: &mut Workflow,
    extension: &str,
    collection_type: &str,
) -> TerminalKey {
    let step = workflow.add_step(
        StepDefinition::new()
            .with_label("input collection")
            .with_output(OutputDefinition::collection(
                "output",
                &[extension],
                collection_type,
            )),
    );
    TerminalKey::output(step, "output")
}

/// A cat-like tool: one dataset input `input1` and one output `out_file1`.
#[allow(dead_code)]
pub fn cat_step(workflow: &mut Workflow, extensions: &[&str]) -> StepId {
    workflow.add_step(
        StepDefinition::new()
            .with_label("cat1")
            .with_input(InputDefinition::data("input1", extensions))
            .with_output(OutputDefinition::data("out_file1", &["txt"])),
    )
}

/// A tool with two dataset inputs, `input1` and `queries_0|input2`, and one output.
#[allow(dead_code)]
pub fn two_input_step(workflow: &mut Workflow) -> StepId {
    workflow.add_step(
        StepDefinition::new()
            .with_label("cat with queries")
            .with_input(InputDefinition::data("input1", &["data"]))
            .with_input(InputDefinition::data("queries_0|input2", &["data"]))
            .with_output(OutputDefinition::data("out_file1", &["txt"])),
    )
}

/// A step consuming `paired` collections through input `f1`, with output `out1`.
#[allow(dead_code)]
pub fn paired_consumer(workflow: &mut Workflow) -> StepId {
    workflow.add_step(
        StepDefinition::new()
            .with_label("collection paired test")
            .with_input(InputDefinition::collection("f1", &["txt"], &["paired"]))
            .with_output(OutputDefinition::data("out1", &["txt"])),
    )
}

/// Current map-over of a terminal; `Null` if the terminal does not exist.
#[allow(dead_code)]
pub fn map_over_of(workflow: &Workflow, key: &TerminalKey) -> CollectionTypeDescription {
    workflow
        .terminal(key)
        .map(|t| t.map_over().clone())
        .unwrap_or_default()
}

/// True if `connect` would be allowed right now.
#[allow(dead_code)]
pub fn accepts(workflow: &Workflow, output: &TerminalKey, input: &TerminalKey) -> bool {
    workflow
        .can_accept(input, output)
        .expect("terminals exist")
        .can_accept
}
