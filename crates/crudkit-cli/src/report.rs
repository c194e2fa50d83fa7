//! Schema inspection and record validation, as serializable reports.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use crudkit_engine::{
    Component, FormEngine, FormOptions, FormSettings, Section, TableEngine, TableOptions, access,
};
use crudkit_model::{ActionConfig, ActionVariant, DataType, Record, SchemaProvide, Scope};
use crudkit_validate::FieldErrors;
use serde::Serialize;

/// One form field as rendered in the given scope.
#[derive(Debug, Clone, Serialize)]
pub struct FieldRow {
    pub name: String,
    pub component: String,
    pub data_type: DataType,
    pub width: u32,
    pub hidden: bool,
    pub disabled: bool,
    pub rules: Vec<String>,
}

/// One form section.
#[derive(Debug, Clone, Serialize)]
pub struct SectionRow {
    pub kind: &'static str,
    pub group: Option<String>,
    pub fields: Vec<FieldRow>,
}

/// One table column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnRow {
    pub name: String,
    pub visible: bool,
    pub order: i32,
    pub sortable: bool,
    pub filterable: bool,
}

/// Where a visible action renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Form,
    Table,
    Row,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionRow {
    pub name: String,
    pub surface: Surface,
    pub variant: ActionVariant,
    pub order: i32,
}

/// Everything a renderer would show for one scope of a schema.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub domain: String,
    pub scope: Scope,
    pub permitted: bool,
    pub sections: Vec<SectionRow>,
    pub columns: Vec<ColumnRow>,
    pub actions: Vec<ActionRow>,
}

/// Outcome of validating one record.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub domain: String,
    pub scope: Scope,
    pub valid: bool,
    pub errors: FieldErrors,
}

/// Read a schema declaration; `.json` files are JSON, anything else TOML.
pub fn load_schema(path: &Path) -> Result<SchemaProvide> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("read schema {}", path.display()))?;
    let schema = if path.extension().is_some_and(|ext| ext == "json") {
        SchemaProvide::from_json_str(&source)
    } else {
        SchemaProvide::from_toml_str(&source)
    };
    schema.with_context(|| format!("load schema {}", path.display()))
}

/// Read a record from a JSON file holding one object.
pub fn load_record(path: &Path) -> Result<Record> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("read record {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&source)
        .with_context(|| format!("parse record {}", path.display()))?;
    match value {
        serde_json::Value::Object(record) => Ok(record),
        other => bail!(
            "record {} must be a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ),
    }
}

/// Every scope and action permission string the schema can check.
pub fn all_permissions(schema: &SchemaProvide) -> Vec<String> {
    let scopes = schema
        .scopes
        .iter()
        .map(|scope| access::scope_permission(&schema.domain, *scope));
    let actions = schema
        .actions
        .iter()
        .map(|action| access::action_permission(&schema.domain, &action.name));
    scopes.chain(actions).collect()
}

/// Resolve form sections, table columns and actions for `scope`.
pub fn inspect(
    schema: Arc<SchemaProvide>,
    scope: Scope,
    permissions: Option<&[String]>,
) -> InspectReport {
    let mut form_options = FormOptions::new(Component::new(scope));
    let mut table_options = TableOptions::new(Component::new(scope));
    if let Some(permissions) = permissions {
        form_options = form_options.with_permissions(permissions.iter().cloned());
        table_options = table_options.with_permissions(permissions.iter().cloned());
    }
    let form = FormEngine::new(Arc::clone(&schema), form_options);
    let table = TableEngine::new(Arc::clone(&schema), table_options);

    let sections = form.sections().iter().map(section_row).collect();
    let columns = table
        .available_columns()
        .into_iter()
        .map(|column| ColumnRow {
            order: column.config.table.order,
            sortable: column.config.table.sortable,
            filterable: column.config.table.filterable,
            visible: column.visible,
            name: column.name,
        })
        .collect();

    // The index scope renders a table; every other scope renders a form.
    let mut actions: Vec<ActionRow> = if scope == Scope::Index {
        table
            .actions()
            .iter()
            .map(|action| action_row(&action.config, Surface::Table))
            .collect()
    } else {
        form.actions()
            .iter()
            .filter(|action| !action.config.is_row())
            .map(|action| action_row(&action.config, Surface::Form))
            .collect()
    };
    // Row conditions need a record; list every row action that could apply.
    if scope == Scope::Index {
        let mut row_actions: Vec<ActionRow> = schema
            .actions
            .iter()
            .filter(|action| action.is_row())
            .filter(|action| {
                access::is_action_visible(&schema.domain, action, scope, permissions)
            })
            .map(|action| action_row(action, Surface::Row))
            .collect();
        row_actions.sort_by_key(|action| action.order);
        actions.extend(row_actions);
    }

    InspectReport {
        domain: schema.domain.clone(),
        scope,
        permitted: form.permitted(),
        sections,
        columns,
        actions,
    }
}

/// Run form validation over `record` in `scope`.
pub fn validate_record(
    schema: Arc<SchemaProvide>,
    record: Record,
    scope: Scope,
    settings: FormSettings,
) -> ValidationReport {
    let domain = schema.domain.clone();
    let options = FormOptions::new(Component::new(scope))
        .with_initial_values(record)
        .with_settings(settings);
    let form = FormEngine::new(schema, options);
    let valid = form.validate();
    tracing::debug!(%domain, %scope, valid, "validated record");
    ValidationReport {
        domain,
        scope,
        valid,
        errors: form.errors(),
    }
}

fn section_row(section: &Section) -> SectionRow {
    let group = match section {
        Section::Group { name, .. } => Some(name.clone()),
        Section::Ungrouped { .. } => None,
    };
    SectionRow {
        kind: section.kind(),
        group,
        fields: section
            .fields()
            .iter()
            .map(|field| FieldRow {
                name: field.name.clone(),
                component: field.config.component.clone(),
                data_type: field.config.data_type,
                width: field.proxy.width,
                hidden: field.proxy.hidden,
                disabled: field.proxy.disabled,
                rules: field
                    .config
                    .validations
                    .iter()
                    .map(|rule| rule.rule.clone())
                    .collect(),
            })
            .collect(),
    }
}

fn action_row(config: &ActionConfig, surface: Surface) -> ActionRow {
    ActionRow {
        name: config.name.clone(),
        surface,
        variant: config.variant,
        order: config.order,
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
