use fcs_config::*;

fn component(name: &str, kind: ComponentKindDef) -> ComponentDef {
    ComponentDef {
        name: name.to_string(),
        kind,
        inputs: vec!["fcs/x".to_string()],
        outputs: Vec::new(),
        clipto: None,
        delay: None,
    }
}

fn summer(name: &str) -> ComponentDef {
    component(name, ComponentKindDef::Summer { bias: 0.0 })
}

fn config(components: Vec<ComponentDef>) -> FcsConfig {
    FcsConfig {
        version: LATEST_VERSION,
        name: "t".to_string(),
        dt: 0.01,
        engines: 0,
        seed: 0,
        autopilot: None,
        flight_control: Some(SystemDef {
            name: "fcs".to_string(),
            channels: vec![ChannelDef {
                name: "main".to_string(),
                execute: None,
                rate: 1,
                components,
            }],
        }),
    }
}

#[test]
fn accepts_minimal_config() {
    validate_config(&config(vec![summer("a"), summer("b")])).unwrap();
}

#[test]
fn rejects_duplicate_component_names() {
    let err = validate_config(&config(vec![summer("Pitch Sum"), summer("pitch-sum")])).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateName { .. }));
}

#[test]
fn rejects_two_producers_for_one_property() {
    let mut a = summer("a");
    a.outputs.push("fcs/elevator-pos-rad".to_string());
    let mut b = summer("b");
    b.outputs.push("/fcs/Elevator-pos-rad".to_string());
    let err = validate_config(&config(vec![a, b])).unwrap_err();
    assert_eq!(
        err,
        ValidationError::DuplicateOutput {
            property: "fcs/elevator-pos-rad".to_string(),
            first: "a".to_string(),
            second: "b".to_string(),
        }
    );
}

#[test]
fn output_may_not_shadow_another_component() {
    let mut b = summer("b");
    b.outputs.push("fcs/a".to_string());
    let err = validate_config(&config(vec![summer("a"), b])).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateOutput { .. }));
}

#[test]
fn rejects_bad_timing() {
    let mut c = config(vec![summer("a")]);
    c.dt = 0.0;
    assert!(matches!(
        validate_config(&c),
        Err(ValidationError::InvalidValue { .. })
    ));

    let mut c = config(vec![summer("a")]);
    c.flight_control.as_mut().unwrap().channels[0].rate = 0;
    assert!(matches!(
        validate_config(&c),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn rejects_unsupported_version() {
    let mut c = config(vec![summer("a")]);
    c.version = LATEST_VERSION + 1;
    assert_eq!(
        validate_config(&c),
        Err(ValidationError::UnsupportedVersion {
            version: LATEST_VERSION + 1
        })
    );
}

#[test]
fn rejects_constant_inverted_clip_and_negative_delay() {
    let mut a = summer("a");
    a.clipto = Some(ClipDef {
        min: Some(ParamDef::Value(1.0)),
        max: Some(ParamDef::Value(-1.0)),
        cyclic: false,
    });
    assert!(validate_config(&config(vec![a])).is_err());

    let mut a = summer("a");
    a.delay = Some(DelayDef {
        value: -2.0,
        delay_type: DelayType::Frames,
    });
    assert!(validate_config(&config(vec![a])).is_err());
}

#[test]
fn rejects_empty_input_name() {
    let mut a = summer("a");
    a.inputs = vec!["-".to_string()];
    assert!(validate_config(&config(vec![a])).is_err());
}
