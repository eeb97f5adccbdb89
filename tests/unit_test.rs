// Unit tests for attitude-manager
// These tests work with the public API without modifying the main codebase

#[cfg(test)]
mod listview_tests {
    use attitude_manager::api::{GroupAttitude, GroupSortKey, UserAttitude, UserSortKey};
    use attitude_manager::listview::ListView;

    fn user(id: &str, name: Option<&str>, attitude: Option<&str>) -> UserAttitude {
        UserAttitude {
            user_id: id.to_string(),
            username: name.map(|s| s.to_string()),
            nickname: None,
            attitude: attitude.map(|s| s.to_string()),
            relationship: None,
            other: None,
        }
    }

    fn group(id: &str, name: Option<&str>, attitude: Option<&str>) -> GroupAttitude {
        GroupAttitude {
            group_id: id.to_string(),
            channel_name: name.map(|s| s.to_string()),
            attitude: attitude.map(|s| s.to_string()),
            other: None,
        }
    }

    #[test]
    fn empty_load_has_single_empty_page() {
        let mut view: ListView<UserAttitude> = ListView::new(10);
        view.load(vec![]);
        let page = view.current_page();
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 1);
        assert_eq!((page.range_start, page.range_end), (0, 0));
        assert!(page.items.is_empty());
    }

    #[test]
    fn null_attitude_sorts_before_negative_numbers() {
        let mut view: ListView<UserAttitude> = ListView::new(10);
        view.load(vec![
            user("a", None, None),
            user("b", None, Some("-5")),
            user("c", None, Some("3")),
        ]);
        view.set_sort(UserSortKey::Attitude);
        let attitudes: Vec<Option<&str>> =
            view.filtered().iter().map(|u| u.attitude.as_deref()).collect();
        assert_eq!(attitudes, [None, Some("-5"), Some("3")]);

        // Descending keeps "no attitude" as the conceptual minimum.
        view.set_sort(UserSortKey::Attitude);
        let attitudes: Vec<Option<&str>> =
            view.filtered().iter().map(|u| u.attitude.as_deref()).collect();
        assert_eq!(attitudes, [Some("3"), Some("-5"), None]);
    }

    #[test]
    fn toggling_same_key_reverses_order_without_ties() {
        let mut view: ListView<GroupAttitude> = ListView::new(10);
        view.load(vec![
            group("g2", Some("beta"), None),
            group("g1", Some("alpha"), None),
            group("g3", Some("gamma"), None),
        ]);
        view.set_sort(GroupSortKey::Name);
        let first: Vec<String> = view.filtered().iter().map(|g| g.display_name()).collect();
        view.set_sort(GroupSortKey::Name);
        let second: Vec<String> = view.filtered().iter().map(|g| g.display_name()).collect();
        let mut reversed = first.clone();
        reversed.reverse();
        assert_eq!(second, reversed);
    }

    #[test]
    fn user_search_covers_id_name_nickname_and_relationship() {
        let mut view: ListView<UserAttitude> = ListView::new(10);
        let mut annoying = user("222", Some("rex"), None);
        annoying.relationship = Some("Enemy".to_string());
        let mut nicknamed = user("333", Some("carol"), None);
        nicknamed.nickname = Some("Cc".to_string());
        view.load(vec![user("111", Some("alice"), None), annoying, nicknamed]);

        view.set_search_term("ALI");
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].user_id, "111");

        view.set_search_term("enem");
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].user_id, "222");

        view.set_search_term("cc");
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].user_id, "333");

        view.set_search_term("");
        assert_eq!(view.filtered().len(), view.all().len());
    }

    #[test]
    fn group_search_matches_the_stripped_id() {
        let mut view: ListView<GroupAttitude> = ListView::new(10);
        view.load(vec![
            group("group_4455", None, None),
            group("9900", Some("ops"), None),
            group("8811", None, None),
        ]);
        // The legacy prefix is stripped before matching.
        view.set_search_term("4455");
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].group_id, "group_4455");

        // Placeholder names are searchable too.
        view.set_search_term("group_88");
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].group_id, "8811");
    }

    #[test]
    fn twenty_five_records_paginate_in_three_pages() {
        let mut view: ListView<UserAttitude> = ListView::new(10);
        view.load((1..=25).map(|i| user(&format!("{:02}", i), None, None)).collect());
        let page = view.current_page();
        assert_eq!(page.total_pages, 3);
        assert_eq!((page.range_start, page.range_end), (1, 10));
        view.set_page(3);
        let page = view.current_page();
        assert_eq!(page.items.len(), 5);
        assert_eq!((page.range_start, page.range_end), (21, 25));
    }

    #[test]
    fn search_twice_equals_search_once() {
        let mut view: ListView<UserAttitude> = ListView::new(10);
        view.load(vec![
            user("1", Some("alice"), None),
            user("2", Some("alina"), None),
            user("3", Some("bob"), None),
        ]);
        view.set_search_term("ali");
        let once: Vec<UserAttitude> = view.filtered().to_vec();
        view.set_search_term("ali");
        assert_eq!(view.filtered(), &once[..]);
        assert_eq!(once.len(), 2);
    }
}

#[cfg(test)]
mod export_tests {
    use attitude_manager::api::{GroupAttitude, UserAttitude};
    use attitude_manager::listview::{EXPORT_VERSION, ListView};

    #[test]
    fn export_contains_only_matching_records_with_explicit_nulls() {
        let mut view: ListView<UserAttitude> = ListView::new(10);
        view.load(vec![
            UserAttitude {
                user_id: "42".to_string(),
                username: None,
                nickname: None,
                attitude: None,
                relationship: None,
                other: None,
            },
            UserAttitude {
                user_id: "77".to_string(),
                username: Some("bob".to_string()),
                nickname: None,
                attitude: Some("1.5".to_string()),
                relationship: Some("friend".to_string()),
                other: None,
            },
        ]);
        view.set_search_term("42");

        let value = serde_json::to_value(view.export_snapshot()).unwrap();
        assert_eq!(value["version"], EXPORT_VERSION);
        assert_eq!(value["type"], "users");
        let data = value["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        let row = data[0].as_object().unwrap();
        assert_eq!(row["user_id"], "42");
        // Absent optional fields export as explicit null, never omitted.
        assert!(row.contains_key("attitude") && row["attitude"].is_null());
        assert!(row.contains_key("username") && row["username"].is_null());
        assert!(row.contains_key("nickname") && row["nickname"].is_null());
    }

    #[test]
    fn group_export_resolves_placeholder_names() {
        let mut view: ListView<GroupAttitude> = ListView::new(10);
        view.load(vec![GroupAttitude {
            group_id: "1234567".to_string(),
            channel_name: None,
            attitude: Some("-2".to_string()),
            other: None,
        }]);
        let value = serde_json::to_value(view.export_snapshot()).unwrap();
        assert_eq!(value["type"], "groups");
        assert_eq!(value["data"][0]["id"], "1234567");
        assert_eq!(value["data"][0]["name"], "group_12345");
        assert!(value["data"][0]["other"].is_null());
    }
}

#[cfg(test)]
mod record_tests {
    use attitude_manager::api::UserAttitude;

    fn user(id: &str) -> UserAttitude {
        UserAttitude {
            user_id: id.to_string(),
            username: None,
            nickname: None,
            attitude: None,
            relationship: None,
            other: None,
        }
    }

    #[test]
    fn display_id_strips_only_the_known_prefix() {
        assert_eq!(user("user_31337").display_id(), "31337");
        assert_eq!(user("31337").display_id(), "31337");
        // Unknown prefixes pass through untouched.
        assert_eq!(user("member_5").display_id(), "member_5");
    }

    #[test]
    fn nickname_falls_back_to_username_then_dash() {
        let mut u = user("1");
        assert_eq!(u.display_nickname(), "-");
        u.username = Some("alice".to_string());
        assert_eq!(u.display_nickname(), "alice");
        u.nickname = Some("Al".to_string());
        assert_eq!(u.display_nickname(), "Al");
    }

    #[test]
    fn list_records_deserialize_with_missing_optionals() {
        let parsed: Vec<UserAttitude> =
            serde_json::from_str(r#"[{"user_id": "9"}, {"user_id": "10", "attitude": "0.3"}]"#)
                .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].attitude, None);
        assert_eq!(parsed[1].attitude_value(), Some(0.3));
    }
}

#[cfg(test)]
mod error_handling_tests {
    use attitude_manager::api::ApiError;
    use attitude_manager::error::{Context, SimpleError, simple_error};
    use std::error::Error as _;

    #[test]
    fn context_error_chaining() {
        let base_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let result: Result<(), std::io::Error> = Err(base_error);

        let with_context = result.with_ctx(|| "failed to read view config".to_string());

        assert!(with_context.is_err());
        let err = with_context.unwrap_err();
        let err_string = err.to_string();
        assert!(err_string.contains("failed to read view config"));
        assert!(err_string.contains("file not found"));
        assert!(err.source().is_some());
    }

    #[test]
    fn simple_error_displays_message() {
        let err = simple_error("custom error message");
        assert_eq!(err.to_string(), "custom error message");

        let err2 = SimpleError::new("another error");
        assert_eq!(err2.to_string(), "another error");
    }

    #[test]
    fn api_error_display_per_taxonomy() {
        let net = ApiError::Network("connection refused".to_string());
        assert_eq!(net.to_string(), "network error: connection refused");

        let backend = ApiError::Backend {
            status: Some(404),
            message: "user 9 not found".to_string(),
        };
        assert_eq!(backend.to_string(), "backend error (404): user 9 not found");

        let soft = ApiError::Backend {
            status: None,
            message: "unknown error".to_string(),
        };
        assert_eq!(soft.to_string(), "unknown error");

        let validation = ApiError::Validation("user id is required".to_string());
        assert_eq!(validation.to_string(), "user id is required");
    }
}

#[cfg(test)]
mod app_state_tests {
    use attitude_manager::app::{
        ActiveTab, AppState, GroupForm, InputMode, ModalState, UserForm,
    };

    #[test]
    fn app_state_defaults() {
        let app = AppState::new(false);
        assert_eq!(app.active_tab, ActiveTab::Users);
        assert!(matches!(app.input_mode, InputMode::Normal));
        assert_eq!(app.selected_user_row, 0);
        assert_eq!(app.selected_group_row, 0);
        assert!(app.users.all().is_empty());
        assert!(!app.show_response_pane);
    }

    #[test]
    fn dev_flag_opens_the_response_pane() {
        let app = AppState::new(true);
        assert!(app.dev);
        assert!(app.show_response_pane);
    }

    #[test]
    fn forms_prefill_from_records() {
        let record = attitude_manager::api::UserAttitude {
            user_id: "user_88".to_string(),
            username: Some("dana".to_string()),
            nickname: None,
            attitude: Some("0.7".to_string()),
            relationship: Some("friend".to_string()),
            other: None,
        };
        let form = UserForm::from_record(&record);
        assert_eq!(form.user_id, "user_88");
        assert_eq!(form.attitude, "0.7");
        assert_eq!(form.nickname, "");

        let mut form = GroupForm::default();
        form.field_mut(0).push_str("g7");
        assert_eq!(form.group_id, "g7");
    }

    #[test]
    fn modal_state_variants() {
        let modal = ModalState::Info {
            message: "test".to_string(),
        };
        assert!(matches!(modal, ModalState::Info { .. }));

        let modal = ModalState::ConfirmDeleteUser {
            user_id: "1".to_string(),
            selected: 1,
        };
        assert!(matches!(modal, ModalState::ConfirmDeleteUser { .. }));
    }
}

#[cfg(test)]
mod keymap_tests {
    use attitude_manager::app::keymap::{KeyAction, Keymap};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn defaults_resolve_core_actions() {
        let km = Keymap::default();
        let resolve = |code| km.resolve(&KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(resolve(KeyCode::Char('q')), Some(KeyAction::Quit));
        assert_eq!(resolve(KeyCode::Char('/')), Some(KeyAction::StartSearch));
        assert_eq!(resolve(KeyCode::Char('r')), Some(KeyAction::Refresh));
        assert_eq!(resolve(KeyCode::Char('e')), Some(KeyAction::Export));
        assert_eq!(resolve(KeyCode::Enter), Some(KeyAction::EditSelection));
        assert_eq!(resolve(KeyCode::Delete), Some(KeyAction::DeleteSelection));
        assert_eq!(resolve(KeyCode::Char('j')), Some(KeyAction::MoveDown));
        assert_eq!(resolve(KeyCode::Char('1')), None); // digits stay free for sort
    }

    #[test]
    fn format_key_handles_modifiers() {
        assert_eq!(
            Keymap::format_key(KeyModifiers::CONTROL, KeyCode::Char('q')),
            "Ctrl+q"
        );
        assert_eq!(Keymap::format_key(KeyModifiers::NONE, KeyCode::BackTab), "BackTab");
    }
}
