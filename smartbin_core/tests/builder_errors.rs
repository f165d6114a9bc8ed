use smartbin_core::ControlLoop;
use smartbin_core::error::BuildError;
use smartbin_core::mocks::{ScriptedRanging, SpyActuator, SpyBuzzer, SpyIndicators};
use rstest::rstest;

#[rstest]
fn builder_missing_actuator_yields_typed_build_error() {
    let err = ControlLoop::builder()
        .with_lid_ranging(ScriptedRanging::default())
        .with_fill_ranging(ScriptedRanging::default())
        // missing with_actuator()
        .with_indicators(SpyIndicators::default())
        .with_buzzer(SpyBuzzer::default())
        .try_build()
        .err()
        .expect("should fail with MissingActuator");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingActuator) => {}
        other => panic!("expected MissingActuator, got: {other:?}"),
    }
}

#[rstest]
fn builder_reports_missing_ranging_first() {
    let err = ControlLoop::builder()
        .try_build()
        .err()
        .expect("empty builder must fail");
    assert_eq!(
        err.downcast_ref::<BuildError>(),
        Some(&BuildError::MissingLidRanging)
    );
}

#[rstest]
fn actuator_fault_at_build_is_not_a_build_error() {
    let act = SpyActuator::default();
    act.set_failing(true);
    let err = ControlLoop::builder()
        .with_lid_ranging(ScriptedRanging::default())
        .with_fill_ranging(ScriptedRanging::default())
        .with_actuator(act)
        .with_indicators(SpyIndicators::default())
        .with_buzzer(SpyBuzzer::default())
        .try_build()
        .err()
        .expect("closing the lid fails");
    assert!(err.downcast_ref::<BuildError>().is_none());
    assert!(err.to_string().contains("actuator fault"));
}
