//! Unit tests for the supporting types: errors, events, connectors,
//! datatype tables and step definitions.
mod common;
use common::*;
use setsuzoku::datatypes::satisfies;
use setsuzoku::prelude::*;

#[test]
fn test_terminal_key_display() {
    let key = TerminalKey::input(StepId(3), "input1");
    assert_eq!(format!("{}", key), "input 'input1' of step 3");
    assert_eq!(
        format!("{}", TerminalKey::output(StepId(0), "out_file1")),
        "output 'out_file1' of step 0"
    );
}

#[test]
fn test_error_display() {
    let err = WorkflowError::TerminalNotFound {
        step: StepId(2),
        side: Side::Output,
        name: "out_file1".to_string(),
    };
    assert!(err.to_string().contains("output"));
    assert!(err.to_string().contains("out_file1"));

    let err = WorkflowError::InvalidConnection {
        output: TerminalKey::output(StepId(0), "output"),
        input: TerminalKey::input(StepId(1), "input1"),
        reason: "Incompatible collection type(s) for attachment.".to_string(),
    };
    assert!(err.to_string().contains("input1"));
    assert!(err.to_string().contains("Incompatible"));

    let err = DatatypesError::Io {
        path: "missing.json".to_string(),
        message: "No such file".to_string(),
    };
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn test_unattached_connector_touches_no_terminal() {
    let (mut workflow, log) = workflow_with_log();
    let source = data_source(&mut workflow, "txt");
    log.drain();

    let id = workflow.create_connector(Some(&source), None).unwrap();
    let connector = workflow.connector(id).unwrap();
    assert_eq!(connector.state(), ConnectorState::Unattached);
    assert_eq!(connector.handle1(), Some(&source));
    assert!(connector.endpoints().is_none());
    assert!(workflow.terminal(&source).unwrap().connectors().is_empty());
    assert!(log.is_empty());

    // Destroying it changes nothing.
    workflow.destroy_connector(id).unwrap();
    assert_eq!(
        workflow.connector(id).unwrap().state(),
        ConnectorState::Unattached
    );
}

#[test]
fn test_create_connector_skips_checks() {
    let (mut workflow, _) = workflow_with_log();
    let binary = data_source(&mut workflow, "binary");
    let cat = cat_step(&mut workflow, &["txt"]);
    let input = TerminalKey::input(cat, "input1");

    let id = workflow.create_connector(Some(&binary), Some(&input)).unwrap();
    assert!(workflow.connector(id).unwrap().is_live());
    assert_eq!(workflow.connected_outputs(&input).len(), 1);

    // A later revalidation catches it.
    assert!(workflow.destroy_if_invalid(id).unwrap());
    assert!(!workflow.destroy_if_invalid(id).unwrap());
}

#[test]
fn test_connector_with_missing_terminal_is_an_error() {
    let (mut workflow, _) = workflow_with_log();
    let source = data_source(&mut workflow, "txt");
    let missing = TerminalKey::input(StepId(9), "input1");

    let err = workflow.create_connector(Some(&source), Some(&missing)).unwrap_err();
    assert_eq!(err, WorkflowError::StepNotFound(StepId(9)));
    assert!(workflow.live_connectors().is_empty());

    let first = workflow.create_connector(Some(&source), None).unwrap();
    let second = workflow.create_connector(None, None).unwrap();
    assert!(second.value() > first.value());
}

#[test]
fn test_connector_ids_are_not_reused() {
    let (mut workflow, _) = workflow_with_log();
    let source = data_source(&mut workflow, "txt");
    let cat = cat_step(&mut workflow, &["txt"]);
    let input = TerminalKey::input(cat, "input1");

    let first = workflow.connect(&source, &input).unwrap();
    workflow.destroy_connector(first).unwrap();
    let second = workflow.connect(&source, &input).unwrap();
    assert_ne!(first, second);
    assert_eq!(workflow.connectors_between(&source, &input), vec![second]);
}

#[test]
fn test_prune_evicts_only_destroyed_connectors() {
    let (mut workflow, _) = workflow_with_log();
    let source = data_source(&mut workflow, "txt");
    let cat = cat_step(&mut workflow, &["txt"]);
    let input = TerminalKey::input(cat, "input1");

    let pending = workflow.create_connector(Some(&source), None).unwrap();
    let old = workflow.connect(&source, &input).unwrap();
    workflow.destroy_connector(old).unwrap();
    let current = workflow.connect(&source, &input).unwrap();
    assert_eq!(workflow.connector(old).unwrap().state(), ConnectorState::Destroyed);

    assert_eq!(workflow.prune_destroyed_connectors(), 1);
    assert!(workflow.connector(old).is_none());
    assert!(workflow.connector(pending).is_some());
    assert!(workflow.connector(current).unwrap().is_live());
    assert_eq!(workflow.prune_destroyed_connectors(), 0);
}

#[test]
fn test_closure_sink_receives_events() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let seen = Rc::new(RefCell::new(0usize));
    let counter = Rc::clone(&seen);
    let mut workflow = Workflow::builder()
        .with_datatypes(create_datatypes())
        .with_sink(move |_: &WorkflowEvent| *counter.borrow_mut() += 1)
        .build();
    workflow.add_step(StepDefinition::new());
    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn test_closure_oracle() {
    let oracle = |candidate: &str, required: &str| candidate == "fastqsanger" && required == "fastq";
    let mut workflow = Workflow::builder().with_datatypes(oracle).build();
    let source = data_source(&mut workflow, "fastqsanger");
    let step = cat_step(&mut workflow, &["fastq"]);
    assert!(accepts(&workflow, &source, &TerminalKey::input(step, "input1")));
}

#[test]
fn test_satisfies_pass_through_rules() {
    let datatypes = create_datatypes();
    assert!(satisfies(&datatypes, "binary", "input"));
    assert!(satisfies(&datatypes, "input_collection", "txt"));
    assert!(satisfies(&datatypes, "tabular", "data"));
    assert!(!satisfies(&datatypes, "data", "tabular"));
}

#[test]
fn test_datatypes_from_registry_json() {
    let datatypes = DatatypesMapping::from_json(DATATYPES_JSON).unwrap();
    assert!(datatypes.knows("binary"));
    assert!(datatypes.is_subtype("tabular", "txt"));
    assert!(!datatypes.is_subtype("binary", "txt"));
}

#[test]
fn test_datatypes_from_missing_file() {
    let err = DatatypesMapping::from_file("does/not/exist.json").unwrap_err();
    assert!(matches!(err, DatatypesError::Io { .. }));
}

#[test]
fn test_step_definition_from_json() {
    let json = r#"{
        "label": "collection paired test",
        "inputs": [
            {"name": "f1", "extensions": ["txt"], "input_type": "dataset_collection", "collection_types": ["paired"]},
            {"name": "pattern", "input_type": "parameter", "type": "select"}
        ],
        "outputs": [
            {"name": "out1", "extensions": ["txt"]},
            {"name": "pairs", "extensions": ["txt"], "collection": true, "collection_type": "list:paired"}
        ],
        "post_job_actions": [
            {"action_type": "ChangeDatatypeAction", "output_name": "out1", "action_arguments": {"newtype": "tabular"}}
        ]
    }"#;
    let definition: StepDefinition = serde_json::from_str(json).unwrap();
    let mut workflow = Workflow::new();
    let step = workflow.add_step(definition);
    let step = workflow.step(step).unwrap();

    assert_eq!(step.label(), Some("collection paired test"));
    assert_eq!(
        step.input("f1").unwrap().kind(),
        &TerminalKind::InputCollection {
            collection_types: vec![CollectionTypeDescription::paired()]
        }
    );
    assert_eq!(
        step.input("pattern").unwrap().kind(),
        &TerminalKind::InputParameter {
            parameter_type: "select".to_string(),
            optional: false
        }
    );
    assert_eq!(
        step.output("pairs").unwrap().own_collection_type(),
        CollectionTypeDescription::new("list:paired")
    );
    assert_eq!(step.retyped_output("out1"), Some("tabular"));
    assert_eq!(step.retyped_output("pairs"), None);
}

#[test]
fn test_into_step_conversion() {
    struct ToolForm {
        inputs: Vec<(&'static str, &'static str)>,
    }

    impl IntoStep for ToolForm {
        fn into_step(self) -> Result<StepDefinition, DefinitionError> {
            if self.inputs.is_empty() {
                return Err(DefinitionError::ValidationError(
                    "tool form has no inputs".to_string(),
                ));
            }
            Ok(self
                .inputs
                .into_iter()
                .fold(StepDefinition::new(), |step, (name, ext)| {
                    step.with_input(InputDefinition::data(name, &[ext]))
                }))
        }
    }

    let definition = ToolForm {
        inputs: vec![("input1", "txt"), ("input2", "tabular")],
    }
    .into_step()
    .unwrap();
    assert_eq!(definition.inputs.len(), 2);

    let err = ToolForm { inputs: vec![] }.into_step().unwrap_err();
    assert!(err.to_string().contains("no inputs"));
}
