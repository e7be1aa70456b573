//! Parse, validate, emit
//!
//! A single linear pass per invocation. Any stage failure aborts the run
//! and is returned as a [`buildplan_core::Error`] carrying the offending
//! key or field.

use crate::descriptor::SigningRegistry;
use crate::parser::{parse_descriptor, RawConfig};
use crate::plan::{emit, BuildPlan};
use crate::validate::{validate, ValidatedDescriptor};
use buildplan_core::Result;
use buildplan_telemetry::timed_span;
use tracing::info;

/// Parse and validate without emitting
pub fn check(raw: &RawConfig, registry: &SigningRegistry) -> Result<ValidatedDescriptor> {
    let descriptor = {
        timed_span!("parse", keys = raw.len());
        parse_descriptor(raw)?
    };

    let validated = {
        timed_span!("validate");
        validate(descriptor, registry)?
    };

    Ok(validated)
}

/// Run the whole pipeline and return the build plan
pub fn build_plan(raw: &RawConfig, registry: &SigningRegistry) -> Result<BuildPlan> {
    let validated = check(raw, registry)?;

    let plan = {
        timed_span!("emit");
        emit(&validated)
    };

    info!(
        application_id = %validated.descriptor().application_id,
        task = %plan.gradle_task,
        "Build plan ready"
    );
    Ok(plan)
}
