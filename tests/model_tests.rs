//! Integration tests for models: construction, aggregated validation and output

use pretty_assertions::assert_eq;
use std::sync::Arc;
use xmodels::namespaces::XSI_NAMESPACE;
use xmodels::validators::Choice;
use xmodels::{
    Context, Error, ErrorMap, Field, Model, ModelOptions, Native, Occurs, Sequence,
    SequenceElement, UnknownKeys, ValidityStatus, Value,
};

fn person() -> Arc<Model> {
    Model::builder("Person")
        .field("name", Field::text().required())
        .field("age", Field::integer().min(0))
        .build()
        .unwrap()
}

fn address() -> Arc<Model> {
    Model::builder("Address")
        .field("street", Field::text().required())
        .field("zip", Field::regex("[0-9]{5}"))
        .build()
        .unwrap()
}

fn paths(errors: &ErrorMap) -> Vec<&str> {
    errors.paths().collect()
}

#[test]
fn test_person_scenario() {
    let model = person();

    let mut joe = model
        .from_primitive(&Value::map([("name", Value::from("Joe")), ("age", Value::from(-5))]))
        .unwrap();
    let err = joe.validate().unwrap_err();
    assert_eq!(paths(err.errors()), vec!["age"]);
    assert_eq!(err.errors().get("age").unwrap(), ["must be >= 0"]);

    let mut nobody = model.from_primitive(&Value::map([("age", -5)])).unwrap();
    let err = nobody.validate().unwrap_err();
    assert_eq!(paths(err.errors()), vec!["name", "age"]);
    assert_eq!(err.errors().get("name").unwrap(), ["required"]);
    assert_eq!(err.errors().get("age").unwrap(), ["must be >= 0"]);
    assert_eq!(err.model, "Person");
}

#[test]
fn test_aggregation_is_complete() {
    let model = Model::builder("Record")
        .field("count", Field::integer().min(1))
        .field("code", Field::regex("[A-Z]+"))
        .field("owner", Field::text().required())
        .field("note", Field::text())
        .build()
        .unwrap();
    let input = Value::map([("count", Value::from(0)), ("code", Value::from("abc"))]);

    let errors = model.from_primitive(&input).unwrap().errors();
    assert_eq!(paths(&errors), vec!["count", "code", "owner"]);
    assert_eq!(errors.message_count(), 3);
}

#[test]
fn test_validate_is_idempotent() {
    let model = person();
    let mut instance = model.new_instance();
    assert_eq!(instance.status(), ValidityStatus::NotKnown);

    instance.set("name", "Ann").unwrap();
    assert!(instance.validate().is_ok());
    assert!(instance.validate().is_ok());
    assert_eq!(instance.status(), ValidityStatus::Valid);

    instance.set("age", -1).unwrap();
    assert_eq!(instance.status(), ValidityStatus::NotKnown);
    assert!(instance.validate().is_err());
    assert_eq!(instance.status(), ValidityStatus::Invalid);

    instance.remove("age");
    assert!(instance.is_valid());
}

#[test]
fn test_nested_model_paths() {
    let address = address();
    let model = Model::builder("Customer")
        .field("name", Field::text().required())
        .field("address", Field::model(&address))
        .build()
        .unwrap();

    let input = Value::map([
        ("name", Value::from("Joe")),
        ("address", Value::map([("zip", "123")])),
    ]);
    let errors = model.from_primitive(&input).unwrap().errors();
    assert_eq!(paths(&errors), vec!["address.street", "address.zip"]);
    assert_eq!(errors.get("address.street").unwrap(), ["required"]);
    assert_eq!(errors.get("address.zip").unwrap(), ["must match pattern '[0-9]{5}'"]);

    let without = model.from_primitive(&Value::map([("name", "Joe")])).unwrap();
    assert!(without.is_valid());
}

#[test]
fn test_collection_paths_and_order() {
    let person = person();
    let model = Model::builder("Roster")
        .field("people", Field::models(&person))
        .build()
        .unwrap();

    let people = vec![
        Value::map([("name", Value::from("Ann")), ("age", Value::from(30))]),
        Value::map([("name", Value::from("Bob")), ("age", Value::from(40))]),
        Value::map([("name", Value::from("Cid")), ("age", Value::from(-1))]),
    ];
    let input = Value::map([("people", Value::Seq(people.clone()))]);
    let roster = model.from_primitive(&input).unwrap();

    let names: Vec<&str> = roster
        .get("people")
        .and_then(Native::as_instances)
        .unwrap()
        .iter()
        .map(|p| p.get("name").and_then(Native::as_str).unwrap())
        .collect();
    assert_eq!(names, vec!["Ann", "Bob", "Cid"]);

    let errors = roster.errors();
    assert_eq!(paths(&errors), vec!["people[2].age"]);

    let output = roster.to_primitive(None).unwrap();
    assert_eq!(output.get("people"), Some(&Value::Seq(people)));
}

#[test]
fn test_single_element_promoted_to_collection() {
    let person = person();
    let model = Model::builder("Roster")
        .field("people", Field::models(&person))
        .build()
        .unwrap();

    let input = Value::map([("people", Value::map([("name", "Ann")]))]);
    let roster = model.from_primitive(&input).unwrap();
    assert_eq!(roster.get("people").and_then(Native::as_instances).unwrap().len(), 1);
}

#[test]
fn test_lax_conversion_errors_are_reported_with_paths() {
    let person = person();
    let model = Model::builder("Roster")
        .field("people", Field::models(&person))
        .build()
        .unwrap();
    let input = Value::map([(
        "people",
        Value::Seq(vec![
            Value::map([("name", "Ann")]),
            Value::map([("name", "Bob"), ("age", "old")]),
        ]),
    )]);

    let errors = model.from_primitive(&input).unwrap().errors();
    assert_eq!(
        errors.get("people[1].age").unwrap(),
        ["could not convert to integer, value: \"old\""]
    );
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_lax_collection_keeps_converting_after_a_bad_element() {
    let item = Model::builder("Item")
        .field("n", Field::integer())
        .build()
        .unwrap();
    let model = Model::builder("Basket")
        .field("items", Field::models(&item))
        .build()
        .unwrap();
    let input = Value::map([(
        "items",
        Value::Seq(vec![
            Value::map([("n", 1)]),
            Value::Seq(Vec::new()),
            Value::map([("n", "x")]),
        ]),
    )]);

    let basket = model.from_primitive(&input).unwrap();
    let items = basket.get("items").and_then(Native::as_instances).unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].get("n"), Some(&Native::Int(1)));

    let errors = basket.errors();
    assert_eq!(paths(&errors), vec!["items[1]", "items[2].n"]);
    assert_eq!(
        errors.get("items[1]").unwrap(),
        ["expected a mapping for model Item, value: []"]
    );
    assert_eq!(
        errors.get("items[2].n").unwrap(),
        ["could not convert to integer, value: \"x\""]
    );
}

#[test]
fn test_lax_choice_collection_reports_every_bad_element() {
    let model = Model::builder("Counts")
        .field("counts", Field::list(Field::integer()))
        .build()
        .unwrap();
    let input = Value::map([(
        "counts",
        Value::Seq(vec![Value::from("1"), Value::from("two"), Value::from("three")]),
    )]);

    let errors = model.from_primitive(&input).unwrap().errors();
    assert_eq!(paths(&errors), vec!["counts[1]", "counts[2]"]);
}

#[test]
fn test_strict_conversion_fails_with_path() {
    let person = person();
    let model = Model::builder("Roster")
        .field("people", Field::models(&person))
        .build()
        .unwrap();
    let input = Value::map([(
        "people",
        Value::Seq(vec![
            Value::map([("name", "Ann")]),
            Value::map([("name", "Bob"), ("age", "old")]),
        ]),
    )]);

    match model.from_primitive_with(&input, &Context::strict()) {
        Err(Error::Conversion(e)) => {
            assert_eq!(e.path, "people[1].age");
            assert_eq!(e.message, "could not convert to integer");
        }
        other => panic!("expected a conversion error, got {:?}", other),
    }
}

#[test]
fn test_set_converts_strictly() {
    let model = person();
    let mut instance = model.new_instance();
    match instance.set("age", "old") {
        Err(Error::Conversion(e)) => assert_eq!(e.path, "age"),
        other => panic!("expected a conversion error, got {:?}", other),
    }
    assert!(matches!(instance.set("nickname", "J"), Err(Error::Key(_))));

    instance.set_native("age", Native::from("x")).unwrap();
    assert_eq!(
        instance.errors().get("age").unwrap(),
        ["expected integer value"]
    );
}

#[test]
fn test_defaults_applied() {
    let model = Model::builder("Settings")
        .field("retries", Field::integer().default(3))
        .field("verbose", Field::boolean().default(false))
        .field("label", Field::text())
        .build()
        .unwrap();

    let instance = model.from_primitive(&Value::map([("label", "x")])).unwrap();
    assert_eq!(instance.get("retries"), Some(&Native::Int(3)));
    assert_eq!(
        Value::Map(instance.to_primitive(None).unwrap()),
        Value::map([
            ("retries", Value::Int(3)),
            ("verbose", Value::Bool(false)),
            ("label", Value::from("x")),
        ])
    );
    assert!(instance.is_valid());
}

#[test]
fn test_attributes_and_text() {
    let amount = Model::builder("Amount")
        .attribute("currency", Field::enumeration(["EUR", "USD"]))
        .text("value", Field::decimal().required())
        .build()
        .unwrap();
    let order = Model::builder("Order")
        .field("total", Field::model(&amount))
        .build()
        .unwrap();

    let input = Value::map([("@currency", "eur"), ("#text", "10.50")]);
    let instance = amount.from_primitive(&input).unwrap();
    assert_eq!(instance.get("currency"), Some(&Native::from("EUR")));
    assert_eq!(
        Value::Map(instance.to_primitive(None).unwrap()),
        Value::map([("@currency", "EUR"), ("#text", "10.50")])
    );

    let input = Value::map([("total", "3")]);
    let instance = order.from_primitive(&input).unwrap();
    assert_eq!(Value::Map(instance.to_primitive(None).unwrap()), input);
}

#[test]
fn test_source_key() {
    let model = Model::builder("Suite")
        .field("system_out", Field::text().no_strip().source("system-out"))
        .build()
        .unwrap();
    let input = Value::map([("system-out", "line\n")]);
    let instance = model.from_primitive(&input).unwrap();
    assert_eq!(instance.get("system_out"), Some(&Native::from("line\n")));
    assert_eq!(Value::Map(instance.to_primitive(None).unwrap()), input);
}

#[test]
fn test_unknown_keys_ignored_by_default() {
    let model = person();
    let input = Value::map([("name", "Joe"), ("nickname", "J"), ("@lang", "en")]);
    let instance = model.from_primitive(&input).unwrap();
    assert!(instance.is_valid());
    assert_eq!(
        Value::Map(instance.to_primitive(None).unwrap()),
        Value::map([("name", "Joe")])
    );
}

#[test]
fn test_unknown_keys_rejected() {
    let model = Model::builder("Person")
        .field("name", Field::text())
        .options(ModelOptions::reject_unknown())
        .build()
        .unwrap();
    let input = Value::map([("name", "Joe"), ("nickname", "J"), ("@lang", "en")]);

    let errors = model.from_primitive(&input).unwrap().errors();
    assert_eq!(
        errors.get("_extra").unwrap(),
        [
            "Found extra element fields: nickname",
            "Found extra attribute fields: @lang"
        ]
    );

    match model.from_primitive_with(&input, &Context::strict()) {
        Err(Error::Conversion(e)) => {
            assert_eq!(e.path, "_extra");
            assert_eq!(e.message, "Found extra element fields: nickname");
        }
        other => panic!("expected a conversion error, got {:?}", other),
    }
}

#[test]
fn test_unknown_policies_per_key_kind() {
    let model = Model::builder("Person")
        .field("name", Field::text())
        .options(
            ModelOptions::new()
                .unknown_elements(UnknownKeys::Reject)
                .unknown_attributes(UnknownKeys::Preserve),
        )
        .build()
        .unwrap();
    let input = Value::map([("name", "Joe"), ("@lang", "en")]);
    let instance = model.from_primitive(&input).unwrap();
    assert!(instance.is_valid());
    assert_eq!(instance.extra().get("@lang"), Some(&Value::from("en")));
    assert_eq!(Value::Map(instance.to_primitive(None).unwrap()), input);
}

#[test]
fn test_schema_location_and_declarations_are_not_unknown() {
    let model = Model::builder("Person")
        .field("name", Field::text())
        .options(ModelOptions::reject_unknown())
        .build()
        .unwrap();
    let input = Value::map([
        ("@xmlns:xsi", XSI_NAMESPACE),
        ("@xsi:schemaLocation", "urn:people people.xsd"),
        ("name", "Joe"),
    ]);
    let instance = model.from_primitive(&input).unwrap();
    assert!(instance.is_valid());
}

#[test]
fn test_namespaces() {
    let author = Model::builder("Author")
        .namespace("urn:people")
        .field("name", Field::text().required())
        .build()
        .unwrap();
    let book = Model::builder("Book")
        .namespace("urn:books")
        .root("book")
        .field("title", Field::text().required())
        .field("author", Field::model(&author))
        .build()
        .unwrap();

    let content = Value::map([
        ("@xmlns:b", Value::from("urn:books")),
        ("@xmlns:p", Value::from("urn:people")),
        ("b:title", Value::from("Dune")),
        ("p:author", Value::map([("p:name", "Frank")])),
    ]);
    let document = Value::map([("b:book", content.clone())]);

    let instance = book.from_document(&document).unwrap();
    assert!(instance.is_valid());
    assert_eq!(instance.get("title"), Some(&Native::from("Dune")));
    assert_eq!(instance.namespaces().len(), 2);
    assert_eq!(Value::Map(instance.to_primitive(None).unwrap()), content);
    assert_eq!(instance.to_document(None).unwrap(), document);
}

#[test]
fn test_default_namespace_keys_are_unprefixed() {
    let book = Model::builder("Book")
        .namespace("urn:books")
        .field("title", Field::text().required())
        .build()
        .unwrap();
    let input = Value::map([("@xmlns", "urn:books"), ("title", "Dune")]);
    let instance = book.from_primitive(&input).unwrap();
    assert!(instance.is_valid());
    assert_eq!(Value::Map(instance.to_primitive(None).unwrap()), input);
}

#[test]
fn test_missing_root_element() {
    let model = person();
    let document = Value::map([("Animal", Value::map([("name", "Rex")]))]);
    assert!(matches!(model.from_document(&document), Err(Error::Key(_))));
}

#[test]
fn test_role_filtering() {
    let model = Model::builder("Account")
        .field("login", Field::text())
        .field("password_hash", Field::text().only_for_roles(["admin"]))
        .field("internal_note", Field::text().hidden_for_roles(["public"]))
        .build()
        .unwrap();
    let input = Value::map([
        ("login", "joe"),
        ("password_hash", "x1"),
        ("internal_note", "vip"),
    ]);
    let instance = model.from_primitive(&input).unwrap();

    let keys = |role: Option<&str>| -> Vec<String> {
        instance.to_primitive(role).unwrap().keys().cloned().collect()
    };
    assert_eq!(keys(None), vec!["login", "password_hash", "internal_note"]);
    assert_eq!(keys(Some("public")), vec!["login"]);
    assert_eq!(keys(Some("support")), vec!["login", "internal_note"]);
    assert_eq!(keys(Some("admin")), vec!["login", "password_hash", "internal_note"]);
}

fn contact() -> Arc<Model> {
    Model::builder("Contact")
        .attribute("id", Field::text())
        .field("note", Field::text())
        .field("email", Field::email())
        .field("phone", Field::text())
        .field("name", Field::text())
        .field("tags", Field::list(Field::token()))
        .sequence(
            Sequence::new()
                .element("name", Occurs::once())
                .choice(
                    Choice::new()
                        .element(SequenceElement::required("email"))
                        .element(SequenceElement::required("phone")),
                )
                .element("note", Occurs::optional())
                .element("tags", Occurs::new(0, Some(2))),
        )
        .build()
        .unwrap()
}

#[test]
fn test_sequence_output_order() {
    let model = contact();
    let input = Value::map([
        ("note", "met at conference"),
        ("email", "ann@example.com"),
        ("@id", "c1"),
        ("name", "Ann"),
    ]);
    let instance = model.from_primitive(&input).unwrap();
    assert!(instance.is_valid());

    let keys: Vec<String> = instance.to_primitive(None).unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["@id", "name", "email", "note"]);
}

#[test]
fn test_sequence_violations() {
    let model = contact();

    let errors = model
        .from_primitive(&Value::map([("email", "ann@example.com")]))
        .unwrap()
        .errors();
    assert_eq!(errors.get("name").unwrap(), ["missing required element"]);

    let errors = model
        .from_primitive(&Value::map([("name", "Ann")]))
        .unwrap()
        .errors();
    assert_eq!(
        errors.get("_sequence").unwrap(),
        ["Could not match keys: (none) with choices: (email | phone)"]
    );

    let errors = model
        .from_primitive(&Value::map([
            ("name", "Ann"),
            ("email", "ann@example.com"),
            ("phone", "555"),
        ]))
        .unwrap()
        .errors();
    assert_eq!(
        errors.get("_sequence").unwrap(),
        ["Could not match keys: email, phone with choices: (email | phone)"]
    );

    let tags = Value::Seq(vec![Value::from("a"), Value::from("b"), Value::from("c")]);
    let errors = model
        .from_primitive(&Value::map([
            ("name", Value::from("Ann")),
            ("phone", Value::from("555")),
            ("tags", tags),
        ]))
        .unwrap()
        .errors();
    assert_eq!(paths(&errors), vec!["tags"]);
    assert_eq!(errors.get("tags").unwrap(), ["expected at most 2 occurrences"]);
}

#[test]
fn test_missing_required_element_reported_once() {
    let model = Model::builder("Pair")
        .field("a", Field::text().required())
        .field("b", Field::text())
        .sequence(
            Sequence::new()
                .element("a", Occurs::once())
                .element("b", Occurs::once()),
        )
        .build()
        .unwrap();

    let errors = model.new_instance().errors();
    assert_eq!(paths(&errors), vec!["a", "b"]);
    assert_eq!(errors.get("a").unwrap(), ["required"]);
    assert_eq!(errors.get("b").unwrap(), ["missing required element"]);
}

#[test]
fn test_identity_constraints() {
    let book = Model::builder("Book")
        .attribute("id", Field::id().required())
        .field("title", Field::text())
        .build()
        .unwrap();
    let loan = Model::builder("Loan")
        .attribute("book", Field::idref().required())
        .build()
        .unwrap();
    let library = Model::builder("Library")
        .field("books", Field::models(&book))
        .field("loans", Field::models(&loan))
        .build()
        .unwrap();

    let input = Value::map([
        (
            "books",
            Value::Seq(vec![
                Value::map([("@id", "b1"), ("title", "Dune")]),
                Value::map([("@id", "b1"), ("title", "Emma")]),
                Value::map([("@id", "b2"), ("title", "Ulysses")]),
            ]),
        ),
        (
            "loans",
            Value::Seq(vec![Value::map([("@book", "b2")]), Value::map([("@book", "b9")])]),
        ),
    ]);

    let errors = library.from_primitive(&input).unwrap().errors();
    assert_eq!(paths(&errors), vec!["books[1].id", "loans[1].book"]);
    assert_eq!(
        errors.get("books[1].id").unwrap(),
        ["duplicate ID 'b1' (first used at books[0].id)"]
    );
    assert_eq!(
        errors.get("loans[1].book").unwrap(),
        ["could not resolve IDREF 'b9'"]
    );
}

fn register_map() -> Arc<Model> {
    let field = Model::builder("Field")
        .field("name", Field::key_name(["fieldKey"], 2))
        .field("label", Field::unique_name(["labelUnique"], 2))
        .build()
        .unwrap();
    let register = Model::builder("Register")
        .field("name", Field::key_name(["registerKey"], 2))
        .field("field", Field::models(&field))
        .key("fieldKey")
        .unique("labelUnique")
        .build()
        .unwrap();
    let view = Model::builder("View")
        .attribute("register", Field::key_ref("registerKey"))
        .build()
        .unwrap();
    Model::builder("RegisterMap")
        .field("register", Field::models(&register))
        .field("view", Field::models(&view))
        .key("registerKey")
        .build()
        .unwrap()
}

#[test]
fn test_key_and_unique_constraints() {
    let input = Value::from_json_str(
        r#"{
            "register": [
                {
                    "name": "ctrl",
                    "field": [
                        {"name": "enable", "label": "Enable"},
                        {"name": "mode", "label": ""},
                        {"name": "enable", "label": ""}
                    ]
                },
                {
                    "name": "status",
                    "field": [
                        {"name": "enable", "label": "Enable"},
                        {"name": "", "label": "Enable"}
                    ]
                },
                {"name": "ctrl"}
            ],
            "view": [{"@register": "status"}, {"@register": "irq"}]
        }"#,
    )
    .unwrap();

    let errors = register_map().from_primitive(&input).unwrap().errors();
    assert_eq!(
        paths(&errors),
        vec![
            "register[0].field[2].name",
            "register[1].field[1].name",
            "register[1].field[1].label",
            "register[2].name",
            "view[1].register",
        ]
    );
    assert_eq!(
        errors.get("register[0].field[2].name").unwrap(),
        ["enable is a duplicate entry for key fieldKey"]
    );
    assert_eq!(
        errors.get("register[1].field[1].name").unwrap(),
        ["key value may not be empty"]
    );
    assert_eq!(
        errors.get("register[1].field[1].label").unwrap(),
        ["Enable is a duplicate entry for key labelUnique"]
    );
    assert_eq!(
        errors.get("register[2].name").unwrap(),
        ["ctrl is a duplicate entry for key registerKey"]
    );
    assert_eq!(
        errors.get("view[1].register").unwrap(),
        ["could not resolve 'irq' for key registerKey"]
    );
}

#[test]
fn test_json_round_trip() {
    let model = person();
    let text = r#"{"name":"Joe","age":30}"#;
    let instance = model.from_json_str(text).unwrap();
    assert_eq!(instance.get("age"), Some(&Native::Int(30)));
    assert_eq!(instance.to_json_string(None).unwrap(), text);
}

#[test]
fn test_schema_errors() {
    let person = person();
    let result = Model::builder("Team")
        .field("lead", Field::model(&person).attribute())
        .build();
    assert!(matches!(result, Err(Error::Schema(_))));

    let result = Model::builder("Team")
        .text("a", Field::text())
        .text("b", Field::text())
        .build();
    assert!(matches!(result, Err(Error::Schema(_))));
}
