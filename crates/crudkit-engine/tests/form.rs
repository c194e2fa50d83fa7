//! Integration tests for the form engine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crudkit_engine::{
    BoxError, Component, EngineError, FieldEvent, FormEngine, FormOptions, FormSettings, Handlers,
    Hooks,
};
use crudkit_model::{
    ActionConfig, FieldConfig, FieldProxy, GroupConfig, Record, SchemaProvide, Scope,
    ValidationRule,
};
use crudkit_validate::ValidatorRegistry;
use serde_json::{Value, json};

fn record(value: Value) -> Record {
    serde_json::from_value(value).expect("object literal")
}

fn users() -> Arc<SchemaProvide> {
    Arc::new(
        SchemaProvide::new("users", "id")
            .with_group("address", GroupConfig::with_icon("home"))
            .with_field(FieldConfig::text("id").with_scopes([Scope::View, Scope::Edit]))
            .with_field(FieldConfig::text("name").with_validation(ValidationRule::new("required")))
            .with_field(FieldConfig::text("country").with_group("address").with_default("NL"))
            .with_field(FieldConfig::text("city").with_group("address"))
            .with_field(FieldConfig::text("notes").with_order(5))
            .with_action(
                ActionConfig::new("save")
                    .with_scopes([Scope::Add, Scope::Edit])
                    .with_order(2),
            )
            .with_action(ActionConfig::new("cancel").open().with_order(1))
            .with_action(ActionConfig::new("purge").hidden())
            .with_action(ActionConfig::new("archive").with_scopes([Scope::View])),
    )
}

fn form(scope: Scope) -> FormEngine {
    FormEngine::new(users(), FormOptions::new(Component::new(scope)))
}

// =============================================================================
// Values and validation
// =============================================================================

#[test]
fn required_error_appears_and_clears() {
    let form = form(Scope::Add);
    form.set_value("name", "");
    assert_eq!(form.errors().get("name").map(Vec::len), Some(1));
    assert!(!form.valid());

    form.set_value("name", "Alice");
    assert!(!form.errors().contains_key("name"));
    assert!(form.valid());
}

#[test]
fn initial_values_cover_every_declared_field() {
    let options = FormOptions::new(Component::new(Scope::Edit))
        .with_initial_values(record(json!({ "id": 7, "name": "Ada", "unknown": 1 })));
    let form = FormEngine::new(users(), options);

    let values = form.values();
    assert_eq!(values.len(), 5);
    assert_eq!(values["country"], json!("NL"));
    assert_eq!(values["city"], Value::Null);
    assert!(!values.contains_key("unknown"));
    assert!(!form.dirty());
    assert!(!form.loading());
}

#[test]
fn dirty_uses_structural_equality() {
    let options = FormOptions::new(Component::new(Scope::Edit))
        .with_initial_values(record(json!({ "notes": { "tags": ["a"] } })));
    let form = FormEngine::new(users(), options);

    form.set_value("notes", json!({ "tags": ["a"] }));
    assert!(!form.dirty());
    form.set_value("notes", json!({ "tags": ["a", "b"] }));
    assert!(form.dirty());
}

#[test]
fn validate_only_checks_scoped_fields() {
    let schema = Arc::new(
        SchemaProvide::new("users", "id")
            .with_field(FieldConfig::text("id"))
            .with_field(
                FieldConfig::text("secret")
                    .with_scopes([Scope::Edit])
                    .with_validation(ValidationRule::new("required")),
            ),
    );
    let add = FormEngine::new(Arc::clone(&schema), FormOptions::new(Component::new(Scope::Add)));
    assert!(add.validate());

    let edit = FormEngine::new(schema, FormOptions::new(Component::new(Scope::Edit)));
    assert!(!edit.validate());
    assert_eq!(edit.errors().len(), 1);
}

#[test]
fn validate_on_change_can_be_disabled() {
    let options = FormOptions::new(Component::new(Scope::Add))
        .with_settings(FormSettings { validate_on_change: false });
    let form = FormEngine::new(users(), options);
    form.set_value("name", "");
    assert!(form.errors().is_empty());
    assert!(!form.validate());
}

#[test]
fn scoped_registry_and_translator() {
    let mut registry = ValidatorRegistry::with_builtins();
    registry.register("even", |value, _, _| {
        let n = value.as_i64()?;
        (n % 2 != 0).then(|| "Must be even".to_string())
    });
    let schema = Arc::new(
        SchemaProvide::new("numbers", "id")
            .with_field(FieldConfig::text("id").with_validation(ValidationRule::new("required")))
            .with_field(FieldConfig::text("n").with_validation(ValidationRule::new("even"))),
    );
    let translations =
        HashMap::from([("validation.required".to_string(), "Pflichtfeld".to_string())]);
    let options = FormOptions::new(Component::new(Scope::Add))
        .with_validators(Arc::new(registry))
        .with_translator(translations);
    let form = FormEngine::new(schema, options);

    form.set_value("n", 3);
    form.set_value("id", "");
    let errors = form.errors();
    assert_eq!(errors["n"], vec!["Must be even"]);
    assert_eq!(errors["id"], vec!["Pflichtfeld"]);
}

#[test]
fn reset_restores_baseline_and_is_idempotent() {
    let options = FormOptions::new(Component::new(Scope::Edit))
        .with_initial_values(record(json!({ "name": "Ada" })));
    let form = FormEngine::new(users(), options);
    form.set_value("name", "");
    assert!(form.dirty());
    assert!(!form.valid());

    form.reset(None);
    let first = form.snapshot();
    form.reset(None);
    assert_eq!(form.snapshot(), first);
    assert_eq!(form.value("name"), json!("Ada"));
    assert!(form.valid());
    assert!(!form.dirty());

    form.reset(Some(record(json!({ "name": "Grace" }))));
    assert_eq!(form.value("name"), json!("Grace"));
}

// =============================================================================
// Field layout
// =============================================================================

#[test]
fn fields_are_scoped_and_ordered() {
    let names: Vec<String> = form(Scope::Add).fields().into_iter().map(|f| f.name).collect();
    assert_eq!(names, ["name", "country", "city", "notes"]);

    let names: Vec<String> = form(Scope::Edit).fields().into_iter().map(|f| f.name).collect();
    assert_eq!(names, ["id", "name", "country", "city", "notes"]);
}

#[test]
fn sections_group_declared_groups() {
    let sections = form(Scope::Add).sections();
    let kinds: Vec<&str> = sections.iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, ["ungrouped", "group", "ungrouped"]);
    let grouped: Vec<&str> = sections[1].fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(grouped, ["country", "city"]);
}

#[test]
fn field_props_of_unknown_field_use_default_proxy() {
    let props = form(Scope::Add).field_props("nope");
    assert!(props.config.is_none());
    assert_eq!(props.proxy, FieldProxy::default());
    assert_eq!(props.proxy.width, 100);
    assert_eq!(props.proxy.height, 1);
    assert_eq!(props.value, Value::Null);
    assert!(props.errors.is_empty());
}

// =============================================================================
// Event handlers
// =============================================================================

fn country_handlers() -> Handlers {
    Handlers::new()
        .on("country", FieldEvent::Change, |ctx| {
            let supported = ctx.state.get("country").as_str() == Some("DE");
            ctx.state.set("city", "");
            if let Some(mut city) = ctx.schema.field_mut("city") {
                city.set_disabled(!supported);
            }
        })
        .on("notes", FieldEvent::Blur, |ctx| {
            let trimmed = ctx.state.get("notes").as_str().map(str::trim).map(str::to_string);
            if let Some(trimmed) = trimmed {
                ctx.state.set("notes", trimmed);
            }
        })
}

#[test]
fn change_handler_merges_state_and_overrides() {
    let options = FormOptions::new(Component::new(Scope::Add))
        .with_initial_values(record(json!({ "city": "Utrecht" })))
        .with_handlers(country_handlers());
    let form = FormEngine::new(users(), options);

    form.set_value("country", "FR");
    assert_eq!(form.value("city"), json!(""));
    assert_eq!(form.value("country"), json!("FR"));
    assert!(form.field_props("city").proxy.disabled);

    form.set_value("country", "DE");
    assert!(!form.field_props("city").proxy.disabled);
    assert_eq!(form.overrides()["city"].disabled, Some(false));
}

#[test]
fn fire_event_without_handler_returns_candidate() {
    let form = form(Scope::Add);
    let candidate = record(json!({ "name": "x" }));
    assert_eq!(form.fire_event("name", FieldEvent::Focus, candidate.clone()), candidate);
    assert!(form.overrides().is_empty());
}

#[test]
fn blur_commits_handler_changes() {
    let options =
        FormOptions::new(Component::new(Scope::Add)).with_handlers(country_handlers());
    let form = FormEngine::new(users(), options);
    form.set_value("notes", "  padded  ");
    form.blur("notes");
    assert_eq!(form.value("notes"), json!("padded"));
}

// =============================================================================
// Bootstrap
// =============================================================================

#[tokio::test]
async fn bootstrap_hydrates_and_overrides_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let hooks = Hooks::new().bootstrap(Scope::Edit, move |ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
            let id = ctx.context["id"].clone();
            ctx.hydrate(&record(json!({ "id": id, "name": "Ada" })));
            ctx.with_schema(|schema| {
                if let Some(mut field) = schema.field_mut("id") {
                    field.set_disabled(true);
                }
            });
            Ok(())
        }
    });
    let options = FormOptions::new(Component::new(Scope::Edit))
        .with_hooks(hooks)
        .with_context(json!({ "id": 42 }));
    let form = FormEngine::new(users(), options);
    assert!(form.loading());

    form.bootstrap().await.expect("bootstrap");
    form.bootstrap().await.expect("second bootstrap");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!form.loading());
    assert!(!form.dirty());
    assert_eq!(form.value("id"), json!(42));
    assert_eq!(form.value("country"), json!("NL"));
    assert!(form.field_props("id").proxy.disabled);
}

#[tokio::test]
async fn bootstrap_failure_clears_loading_and_propagates() {
    let hooks = Hooks::new().bootstrap(Scope::Edit, |ctx| async move {
        ctx.with_schema(|schema| {
            if let Some(mut field) = schema.field_mut("name") {
                field.set_hidden(true);
            }
        });
        Err(BoxError::from("record not found"))
    });
    let options = FormOptions::new(Component::new(Scope::Edit)).with_hooks(hooks);
    let form = FormEngine::new(users(), options);

    let err = form.bootstrap().await.expect_err("hook fails");
    assert!(matches!(err, EngineError::Bootstrap { scope: Scope::Edit, .. }));
    assert!(!form.loading());
    assert!(form.overrides().is_empty());
}

#[tokio::test]
async fn bootstrap_without_hook_for_scope_is_a_no_op() {
    let hooks = Hooks::new().bootstrap(Scope::Edit, |_| async { Ok(()) });
    let options = FormOptions::new(Component::new(Scope::Add)).with_hooks(hooks);
    let form = FormEngine::new(users(), options);
    assert!(!form.loading());
    form.bootstrap().await.expect("no hook");
}

// =============================================================================
// Actions and permissions
// =============================================================================

#[tokio::test]
async fn actions_are_filtered_sorted_and_executable() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let handlers = Handlers::new().action("save", move |ctx| {
        let log = Arc::clone(&log);
        async move {
            let form = ctx.form().expect("form surface");
            log.lock().unwrap().push(ctx.state.clone());
            if !form.validate() {
                return Err(BoxError::from("invalid"));
            }
            ctx.component.toast().success("Saved");
            Ok(())
        }
    });
    let options = FormOptions::new(Component::new(Scope::Edit))
        .with_handlers(handlers)
        .with_permissions(["users.action.save", "users.action.archive"]);
    let form = FormEngine::new(users(), options);

    let actions = form.actions();
    let names: Vec<&str> = actions.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["cancel", "save"]);
    assert!(!actions[0].has_handler());
    actions[0].execute().await.expect("missing handler is a no-op");

    let err = actions[1].execute().await.expect_err("name is required");
    assert!(matches!(err, EngineError::Action { ref action, .. } if action == "save"));

    form.set_value("name", "Ada");
    actions[1].execute().await.expect("valid form saves");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1]["name"], json!("Ada"));
}

#[test]
fn actions_without_permissions_only_include_open_ones() {
    let names: Vec<String> = form(Scope::Edit).actions().into_iter().map(|a| a.name).collect();
    assert_eq!(names, ["cancel"]);
}

#[test]
fn permitted_checks_scope_permission() {
    assert!(!form(Scope::Edit).permitted());
    let options =
        FormOptions::new(Component::new(Scope::Edit)).with_permissions(["users.scope.edit"]);
    assert!(FormEngine::new(users(), options).permitted());
}

// =============================================================================
// Observation
// =============================================================================

#[test]
fn listeners_are_notified_until_unsubscribed() {
    let form = form(Scope::Add);
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let subscription = form.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    form.set_value("name", "Ada");
    form.validate();
    form.reset(None);
    assert_eq!(count.load(Ordering::SeqCst), 3);

    drop(subscription);
    form.set_value("name", "Grace");
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn listener_may_read_the_form() {
    let form = form(Scope::Add);
    let reader = form.clone();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let _subscription = form.subscribe(move || {
        log.lock().unwrap().push(reader.value("name"));
    });
    form.set_value("name", "Ada");
    assert_eq!(*seen.lock().unwrap(), vec![json!("Ada")]);
}

#[test]
fn snapshot_serializes_state() {
    let schema = Arc::new(
        SchemaProvide::new("users", "id")
            .with_field(FieldConfig::text("id"))
            .with_field(FieldConfig::text("name").with_validation(ValidationRule::new("required"))),
    );
    let options = FormOptions::new(Component::new(Scope::Edit))
        .with_initial_values(record(json!({ "id": 7, "name": "Ada" })));
    let form = FormEngine::new(schema, options);
    form.set_value("name", "");

    insta::assert_json_snapshot!(form.snapshot(), @r#"
    {
      "values": {
        "id": 7,
        "name": ""
      },
      "errors": {
        "name": [
          "This field is required"
        ]
      },
      "overrides": {},
      "loading": false,
      "dirty": true,
      "valid": false
    }
    "#);
}
