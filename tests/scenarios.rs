//! End-to-end scenarios for the retrieval installation.

use showstate::config::{ConfigError, ConfigProblem, Settings, Table};
use showstate::core::{Emission, Token};
use showstate::installation;
use showstate::machine::{EventOutcome, RecordingSink, StateMachine};
use showstate::protocol::Command;
use showstate::StateMachineError;
use std::fs;

const STATES: &str = "\
idle,/video/play idle.mov 1,/audio/gain 0
retrieval1,/video/play retrieval1.mov 0
retrieval2,/video/play retrieval2.mov 0
exit,/video/play exit.mov 0
fin,/video/stop
retrieval1,/light/cue 0
";

const CONDITIONS: &str = "\
/retrieval,2
/video/object,2
/video,1
";

fn machine() -> StateMachine<RecordingSink> {
    let mut machine = StateMachine::new(Settings::default(), RecordingSink::new())
        .with_resolvers(installation::retrieval::resolvers());
    machine
        .load_tables(
            &Table::parse(STATES).unwrap(),
            &Table::parse(CONDITIONS).unwrap(),
        )
        .unwrap();
    machine.init().unwrap();
    machine.sink_mut().clear();
    machine
}

fn retrieval1() -> StateMachine<RecordingSink> {
    let mut machine = machine();
    machine.handle_event("/retrieval", 0, 1.0).unwrap();
    assert_eq!(machine.current_state_name(), Some("retrieval1"));
    machine.sink_mut().clear();
    machine
}

#[test]
fn init_announces_and_emits_initial_actions() {
    let mut machine = StateMachine::new(Settings::default(), RecordingSink::new())
        .with_resolvers(installation::retrieval::resolvers());
    machine
        .load_tables(
            &Table::parse(STATES).unwrap(),
            &Table::parse(CONDITIONS).unwrap(),
        )
        .unwrap();
    machine.init().unwrap();

    let emissions = machine.sink().emissions();
    assert_eq!(emissions[0], Emission::Announce("idle".to_string()));
    let actions: Vec<_> = machine.sink().actions().map(ToString::to_string).collect();
    assert_eq!(actions, vec!["/video/play idle.mov 1", "/audio/gain 0"]);
}

#[test]
fn retrieval_trigger_moves_idle_to_retrieval1() {
    let mut machine = machine();

    let outcome = machine.handle_event("/retrieval", 0, 1.0).unwrap();

    assert_eq!(
        outcome,
        EventOutcome::Transitioned {
            from: "idle".to_string(),
            to: "retrieval1".to_string(),
        }
    );
    assert_eq!(
        machine.sink().announcements().collect::<Vec<_>>(),
        vec!["retrieval1"]
    );
}

#[test]
fn second_retrieval_slot_moves_idle_to_retrieval2() {
    let mut machine = machine();
    machine.handle_event("/retrieval", 1, 1.0).unwrap();
    assert_eq!(machine.current_state_name(), Some("retrieval2"));
}

#[test]
fn zero_retrieval_value_keeps_idle() {
    let mut machine = machine();

    let outcome = machine.handle_event("/retrieval", 0, 0.0).unwrap();

    assert_eq!(outcome, EventOutcome::Stayed("idle".to_string()));
    assert!(machine.sink().emissions().is_empty());
}

#[test]
fn both_objects_placed_leads_to_exit() {
    let mut machine = machine();
    // The second object is already in place when the retrieval starts.
    machine.handle_event("/video/object", 1, 1.0).unwrap();
    assert_eq!(machine.current_state_name(), Some("idle"));
    machine.handle_event("/retrieval", 0, 1.0).unwrap();
    machine.sink_mut().clear();

    let outcome = machine.handle_event("/video/object", 0, 1.0).unwrap();

    assert_eq!(outcome.state(), "exit");
    let actions: Vec<_> = machine.sink().actions().map(ToString::to_string).collect();
    assert_eq!(actions, vec!["/light/cue 0", "/video/play exit.mov 0"]);
}

#[test]
fn single_object_returns_to_idle() {
    let mut machine = retrieval1();

    let outcome = machine.handle_event("/video/object", 0, 1.0).unwrap();

    assert_eq!(outcome.state(), "idle");
    assert_eq!(machine.conditions().get("/video/object"), Some(&[1.0, 0.0][..]));
}

#[test]
fn exit_finishes_on_video_event() {
    let mut machine = machine();
    machine.handle_event("/video/object", 1, 1.0).unwrap();
    machine.handle_event("/retrieval", 0, 1.0).unwrap();
    machine.handle_event("/video/object", 0, 1.0).unwrap();
    assert_eq!(machine.current_state_name(), Some("exit"));

    machine.handle_event("/video", 0, 1.0).unwrap();

    assert_eq!(machine.current_state_name(), Some("fin"));
    assert_eq!(
        machine.journal().path(),
        vec!["idle", "retrieval1", "exit", "fin"]
    );
}

#[test]
fn unknown_channel_is_rejected_without_side_effects() {
    let mut machine = retrieval1();
    let before = machine.conditions().clone();

    let err = machine.handle_event("/bogus", 0, 1.0).unwrap_err();

    assert!(matches!(err, StateMachineError::UnknownChannel { ref channel } if channel == "/bogus"));
    assert_eq!(machine.current_state_name(), Some("retrieval1"));
    assert_eq!(machine.conditions(), &before);
    assert!(machine.sink().emissions().is_empty());
}

#[test]
fn empty_cells_are_dropped_and_tokens_coerced() {
    let states = Table::from_rows([vec!["idle", "/out/1 5", "", "  "]]);
    let conditions = Table::from_rows([vec!["/video", "1"]]);
    let mut machine = StateMachine::new(Settings::default(), RecordingSink::new());
    machine.load_tables(&states, &conditions).unwrap();

    let idle = machine.state("idle").unwrap();
    assert_eq!(idle.entry_actions().len(), 1);
    assert_eq!(
        idle.entry_actions()[0].tokens(),
        &[Token::Text("/out/1".to_string()), Token::Number(5.0)]
    );
}

#[test]
fn events_are_refused_until_init() {
    let mut machine = StateMachine::new(Settings::default(), RecordingSink::new());
    assert!(matches!(
        machine.handle_event("/video", 0, 1.0),
        Err(StateMachineError::NotConfigured)
    ));

    machine
        .load_tables(
            &Table::parse(STATES).unwrap(),
            &Table::parse(CONDITIONS).unwrap(),
        )
        .unwrap();
    assert!(matches!(
        machine.handle_event("/video", 0, 1.0),
        Err(StateMachineError::NotInitialized)
    ));
}

#[test]
fn reset_then_init_starts_over() {
    let mut machine = retrieval1();
    machine.handle_event("/video/object", 1, 1.0).unwrap();

    machine.reset();
    assert!(matches!(machine.init(), Ok(())));

    assert_eq!(machine.current_state_name(), Some("idle"));
    assert_eq!(machine.conditions().get("/video/object"), Some(&[0.0, 0.0][..]));
    machine.handle_event("/retrieval", 1, 1.0).unwrap();
    assert_eq!(machine.current_state_name(), Some("retrieval2"));
}

#[test]
fn protocol_lines_drive_the_machine() {
    let mut machine = machine();

    for line in ["/retrieval 1 1", "/video/object 1 1"] {
        match Command::parse(line).unwrap() {
            Command::Event {
                channel,
                index,
                value,
            } => {
                machine.handle_event(&channel, index, value).unwrap();
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    assert_eq!(machine.journal().path(), vec!["idle", "retrieval1", "idle"]);
}

#[test]
fn load_dir_reads_both_tables() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("states.csv"), STATES).unwrap();
    fs::write(dir.path().join("conditions.csv"), CONDITIONS).unwrap();

    let mut machine = StateMachine::new(Settings::default(), RecordingSink::new());
    machine.load_dir(dir.path()).unwrap();

    assert_eq!(
        machine.state_names().collect::<Vec<_>>(),
        vec!["idle", "retrieval1", "retrieval2", "exit", "fin"]
    );
    assert_eq!(
        machine.state("retrieval1").unwrap().exit_actions()[0].to_string(),
        "/light/cue 0"
    );
}

#[test]
fn load_dir_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("states.csv"), STATES).unwrap();

    let mut machine = StateMachine::new(Settings::default(), RecordingSink::new());
    let err = machine.load_dir(dir.path()).unwrap_err();

    assert!(matches!(
        err,
        StateMachineError::Config(ConfigError::Io { .. })
    ));
    assert!(!machine.is_configured());
}

#[test]
fn load_dir_reports_every_problem() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("states.csv"), "idle,/a 1\nidle,/a 0\nidle,/a 2\n").unwrap();
    fs::write(dir.path().join("conditions.csv"), "/a,1\n/a,2\n").unwrap();

    let mut machine = StateMachine::new(Settings::default(), RecordingSink::new());
    let err = machine.load_dir(dir.path()).unwrap_err();

    let problems = match err {
        StateMachineError::MalformedConfiguration(problems) => problems,
        other => panic!("expected malformed configuration, got {other:?}"),
    };
    assert_eq!(problems.len(), 2);
    assert!(problems
        .iter()
        .any(|p| matches!(p, ConfigProblem::RepeatedState { name, .. } if name == "idle")));
    assert!(problems
        .iter()
        .any(|p| matches!(p, ConfigProblem::DuplicateChannel { channel, .. } if channel == "/a")));
}
