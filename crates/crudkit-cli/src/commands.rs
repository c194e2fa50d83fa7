use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use crudkit_cli::report::{
    InspectReport, ValidationReport, all_permissions, inspect, load_record, load_schema,
    validate_record,
};
use crudkit_engine::Settings;

use crate::cli::{InspectArgs, ValidateArgs};

pub fn run_inspect(args: &InspectArgs) -> Result<InspectReport> {
    let schema = load_schema(&args.schema)?;
    let span = info_span!("inspect", domain = %schema.domain);
    let _guard = span.enter();

    let permissions = if args.all_permissions {
        Some(all_permissions(&schema))
    } else if args.permissions.is_empty() {
        None
    } else {
        Some(args.permissions.clone())
    };
    debug!(?permissions, "resolved permissions");

    let report = inspect(Arc::new(schema), args.scope.into(), permissions.as_deref());
    info!(
        sections = report.sections.len(),
        columns = report.columns.len(),
        actions = report.actions.len(),
        "inspected schema"
    );
    Ok(report)
}

pub fn run_validate(args: &ValidateArgs, config: Option<&Path>) -> Result<ValidationReport> {
    let settings = match config {
        Some(path) => Settings::load(path).context("load settings")?,
        None => Settings::default(),
    };
    let schema = load_schema(&args.schema)?;
    let span = info_span!("validate", domain = %schema.domain);
    let _guard = span.enter();

    let record = load_record(&args.record)?;
    let report = validate_record(Arc::new(schema), record, args.scope.into(), settings.form);
    info!(
        valid = report.valid,
        failed = report.errors.len(),
        "validated record"
    );
    Ok(report)
}
