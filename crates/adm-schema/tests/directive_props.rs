//! Property tests for directive parsing and field building

use adm_form::{convert_str, FieldValue, ValueKind};
use adm_schema::{Directives, FieldConfig, FieldDescriptor, Inclusion, ModelDescriptor};
use proptest::prelude::*;

fn inclusion_token() -> impl Strategy<Value = String> {
    let keys = prop::sample::select(vec![
        "listDisplay",
        "listFetch",
        "search",
        "view",
        "addForm",
        "editForm",
    ]);
    let values = prop::sample::select(vec!["include", "exclude"]);
    (keys, values).prop_map(|(k, v)| format!("{k}:{v}"))
}

proptest! {
    #[test]
    fn parsing_is_idempotent(raw in ".{0,64}", name in "[A-Za-z]{1,12}", pk in any::<bool>()) {
        let first = Inclusion::resolve(&Directives::parse(&raw), &name, pk);
        let second = Inclusion::resolve(&Directives::parse(&raw), &name, pk);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn primary_key_fetched_unless_list_fetch_given(
        tokens in prop::collection::vec(inclusion_token(), 0..6),
    ) {
        let raw = tokens.join(";");
        let directives = Directives::parse(&raw);
        let inclusion = Inclusion::resolve(&directives, "ID", true).unwrap();
        if !directives.has("listFetch") {
            prop_assert!(inclusion.list_fetch);
        }
    }

    #[test]
    fn integer_initial_round_trips(n in any::<i64>()) {
        let field = FieldDescriptor::new("Count", ValueKind::Integer).directives(format!("initial:{n}"));
        let config = FieldConfig::build(&field, false, &ModelDescriptor::new("T")).unwrap();
        let initial = config.add_widget.and_then(|w| w.initial()).unwrap();
        prop_assert_eq!(convert_str(&initial.to_form_string(), ValueKind::Integer).unwrap(), FieldValue::Integer(n));
    }

    #[test]
    fn text_initial_round_trips(s in "[^;]{0,32}") {
        let field = FieldDescriptor::new("Label", ValueKind::Text).directives(format!("initial:{s}"));
        let config = FieldConfig::build(&field, false, &ModelDescriptor::new("T")).unwrap();
        let initial = config.add_widget.and_then(|w| w.initial()).unwrap();
        prop_assert_eq!(convert_str(&initial.to_form_string(), ValueKind::Text).unwrap(), FieldValue::Text(s));
    }
}
