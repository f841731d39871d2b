use super::*;

#[test]
fn steps_parse_with_defaults() {
    let r = Recipe::from_json_str(
        r#"{ "steps": [
            { "op": "create", "name": "a", "width": 32, "height": 16 },
            { "op": "fill", "target": "a", "color": [1, 0, 0, 1] },
            { "op": "blur", "target": "a", "shape": { "kind": "square", "level": 2 }, "into": "b" },
            { "op": "spread_points", "points": "p", "iterations": 3 }
        ] }"#,
    )
    .unwrap();
    assert_eq!(r.steps.len(), 4);
    assert_eq!(
        r.steps[1],
        Step::Fill {
            target: "a".into(),
            color: Texel::new(1.0, 0.0, 0.0, 1.0),
            mask: ChannelMask::ALL,
        }
    );
    match &r.steps[2] {
        Step::Blur {
            factor, mask, into, ..
        } => {
            assert_eq!(*factor, 1.0);
            assert_eq!(*mask, ChannelMask::ALL);
            assert_eq!(into.as_deref(), Some("b"));
        }
        other => panic!("unexpected step {other:?}"),
    }
    assert!(matches!(
        r.steps[3],
        Step::SpreadPoints { strength, .. } if strength == 0.5
    ));
}

#[test]
fn channels_and_masks_use_wire_values() {
    let r = Recipe::from_json_str(
        r#"{ "steps": [
            { "op": "copy_channel", "target": "a", "source": "b", "channel": 4, "mask": 9 }
        ] }"#,
    )
    .unwrap();
    assert_eq!(
        r.steps[0],
        Step::CopyChannel {
            target: "a".into(),
            source: "b".into(),
            channel: Channel::B,
            mask: ChannelMask::new(9).unwrap(),
        }
    );
}

#[test]
fn bad_documents_are_rejected() {
    assert!(Recipe::from_json_str(r#"{ "steps": [ { "op": "explode" } ] }"#).is_err());
    assert!(Recipe::from_json_str(
        r#"{ "steps": [ { "op": "copy_channel", "target": "a", "source": "b", "channel": 3 } ] }"#
    )
    .is_err());
    assert!(Recipe::from_json_str(
        r#"{ "steps": [ { "op": "fill", "target": "a", "color": [0, 0, 0, 0], "mask": 16 } ] }"#
    )
    .is_err());
    assert!(Recipe::from_json_str(r#"{ "steps": [], "extra": 1 }"#).is_err());
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("proctex-no-such-recipe.json");
    assert!(matches!(Recipe::load(&path), Err(TexError::Io { .. })));
}
