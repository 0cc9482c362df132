use pretty_assertions::assert_eq;
use sql_chat::{
    action::Action,
    config::{parse_key_sequence, Config},
    mode::Mode,
    pipeline::{QueryOutcome, TurnReport},
};

#[test]
fn test_every_bound_action_is_parameterless() {
    let config = Config::defaults().unwrap();
    for (mode, keymap) in config.keybindings.iter() {
        for action in keymap.values() {
            // config entries are bare names, so the action must print back as one
            let name = action.to_string();
            let reparsed: Action = serde_json::from_value(serde_json::Value::String(name.clone())).unwrap();
            assert_eq!(&reparsed, action, "{mode:?} binds {name}");
        }
    }
}

#[test]
fn test_chat_copy_bindings() {
    let config = Config::defaults().unwrap();
    let chat = &config.keybindings[&Mode::Chat];

    assert_eq!(chat.get(&parse_key_sequence("<Ctrl-y>").unwrap()), Some(&Action::CopyAnswer));
    assert_eq!(chat.get(&parse_key_sequence("<Ctrl-q>").unwrap()), Some(&Action::CopyQuery));
    assert_eq!(chat.get(&parse_key_sequence("<Ctrl-s>").unwrap()), Some(&Action::ToggleQueryDetails));
}

#[test]
fn test_turn_completed_carries_report() {
    let report = TurnReport {
        question: "How many albums?".to_string(),
        sql: "SELECT COUNT(*) FROM Album;".to_string(),
        outcome: QueryOutcome::Rows("[(347)]".to_string()),
        answer: "There are 347 albums.".to_string(),
    };
    let json = serde_json::to_value(Action::TurnCompleted(Some(report))).unwrap();

    assert_eq!(json["TurnCompleted"]["outcome"]["Rows"], "[(347)]");
    assert_eq!(json["TurnCompleted"]["answer"], "There are 347 albums.");
}
