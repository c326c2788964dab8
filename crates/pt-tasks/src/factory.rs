//! Build tasks from specs, validating per-kind parameters.

use std::time::Duration;

use pt_behavior::Task;

use crate::{
    Approach, FollowRoute, PartyWait, Rest, TaskConfigError, TaskConfigResult, TaskKind, TaskSpec,
    Wait,
};

/// Construct the task described by `spec`.
///
/// Fails with [`TaskConfigError::MissingParam`] or
/// [`TaskConfigError::InvalidParam`] when the kind's required parameters are
/// absent or out of range.  Parameters a kind doesn't use are ignored.
pub fn build_task(spec: &TaskSpec) -> TaskConfigResult<Box<dyn Task>> {
    if spec.name.trim().is_empty() {
        return Err(invalid(spec, "name", "must not be empty"));
    }
    let p = &spec.params;

    let task: Box<dyn Task> = match spec.kind {
        TaskKind::PartyWait => {
            let max = positive(spec, "max_distance", p.max_distance)?;
            Box::new(PartyWait::new(&spec.name, spec.priority, max).with_timeout(p.timeout()))
        }

        TaskKind::Rest => {
            let threshold = fraction(spec, "threshold", p.threshold)?;
            let resume_at = fraction(spec, "resume_at", p.resume_at)?;
            if resume_at < threshold {
                return Err(invalid(spec, "resume_at", "must be at least `threshold`"));
            }
            Box::new(Rest::new(&spec.name, spec.priority, threshold, resume_at).with_timeout(p.timeout()))
        }

        TaskKind::Approach => {
            if p.targets.is_empty() {
                return Err(TaskConfigError::MissingParam { task: spec.name.clone(), param: "targets" });
            }
            let max = positive(spec, "max_distance", p.max_distance)?;
            let range = positive(spec, "interact_range", p.interact_range)?;
            if range > max {
                return Err(invalid(spec, "interact_range", "must not exceed `max_distance`"));
            }
            let interact = duration(spec, p.timeout_ms)?;
            Box::new(Approach::new(&spec.name, spec.priority, p.targets.clone(), max, range, interact))
        }

        TaskKind::Wait => {
            let pause = duration(spec, p.timeout_ms)?;
            Box::new(Wait::new(&spec.name, spec.priority, pause))
        }

        TaskKind::FollowRoute => Box::new(FollowRoute::new(&spec.name, spec.priority)),
    };
    Ok(task)
}

/// Build every spec in order, stopping at the first error.
pub fn build_tasks(specs: &[TaskSpec]) -> TaskConfigResult<Vec<Box<dyn Task>>> {
    specs.iter().map(build_task).collect()
}

// ── Parameter checks ──────────────────────────────────────────────────────────

fn invalid(spec: &TaskSpec, param: &'static str, reason: &str) -> TaskConfigError {
    TaskConfigError::InvalidParam {
        task:   spec.name.clone(),
        param,
        reason: reason.to_owned(),
    }
}

fn required<T>(spec: &TaskSpec, param: &'static str, value: Option<T>) -> TaskConfigResult<T> {
    value.ok_or_else(|| TaskConfigError::MissingParam { task: spec.name.clone(), param })
}

fn positive(spec: &TaskSpec, param: &'static str, value: Option<f32>) -> TaskConfigResult<f32> {
    let v = required(spec, param, value)?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(invalid(spec, param, &format!("expected a positive distance, got {v}")))
    }
}

fn fraction(spec: &TaskSpec, param: &'static str, value: Option<f32>) -> TaskConfigResult<f32> {
    let v = required(spec, param, value)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(invalid(spec, param, &format!("expected a fraction in [0, 1], got {v}")))
    }
}

fn duration(spec: &TaskSpec, ms: Option<u64>) -> TaskConfigResult<Duration> {
    match required(spec, "timeout_ms", ms)? {
        0  => Err(invalid(spec, "timeout_ms", "must be non-zero")),
        ms => Ok(Duration::from_millis(ms)),
    }
}
