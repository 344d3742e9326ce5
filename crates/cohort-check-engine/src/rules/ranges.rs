//! Value checks: operators without values and inverted ranges

use crate::context::RuleContext;
use crate::location::Location;
use crate::rules::describe;
use cohort_check_diagnostics::{Finding, FindingKind};
use cohort_check_model::{Attributes, RangeOp};

/// Operator of an attribute, when it parses
fn range_op(attribute: &str, op: &str, location: &Location) -> Option<RangeOp> {
    match op.parse::<RangeOp>() {
        Ok(op) => Some(op),
        Err(e) => {
            log::debug!("{attribute} at {location}: {e}");
            None
        }
    }
}

fn empty_attribute_values(subject: &str, location: &Location, attributes: &Attributes<'_>) -> Vec<String> {
    let mut messages = Vec::new();

    for (name, range) in &attributes.dates {
        let Some(op) = range.op() else { continue };
        if range.value().is_none() {
            messages.push(format!("{subject}: {name} has operator '{op}' but an empty value"));
        } else if range_op(name, op, location).is_some_and(|op| op.needs_extent()) && range.extent().is_none() {
            messages.push(format!("{subject}: {name} has operator '{op}' but an empty end value"));
        }
    }

    for (name, range) in &attributes.numbers {
        let Some(op) = range.op() else { continue };
        if range.value.is_none() {
            messages.push(format!("{subject}: {name} has operator '{op}' but an empty value"));
        } else if range_op(name, op, location).is_some_and(|op| op.needs_extent()) && range.extent.is_none() {
            messages.push(format!("{subject}: {name} has operator '{op}' but an empty end value"));
        }
    }

    for (name, filter) in &attributes.texts {
        let Some(op) = filter.op() else { continue };
        if filter.text().is_none() {
            messages.push(format!("{subject}: {name} has operator '{op}' but an empty value"));
        }
    }

    messages
}

/// Operators with a missing value, occurrences and counted groups without a count
pub fn empty_values(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut messages = Vec::new();

    for site in ctx.index.criteria() {
        let subject = describe(site);
        messages.extend(empty_attribute_values(&subject, &site.location, &site.criteria.attributes()));

        if let Some(occurrence) = site.correlated.and_then(|c| c.occurrence.as_ref()) {
            if occurrence.count.is_none() {
                messages.push(format!(
                    "{subject}: occurrence {} has an empty count",
                    occurrence.occurrence_type
                ));
            }
        }
    }

    for site in ctx.index.demographics() {
        let subject = format!("Demographic criteria at {}", site.location);
        messages.extend(empty_attribute_values(
            &subject,
            &site.location,
            &site.demographic.attributes(),
        ));
    }

    for site in ctx.index.groups() {
        let group_type = site.group.group_type();
        if group_type.needs_count() && site.group.count.is_none() {
            messages.push(format!(
                "Group at {} requires a count of criteria ({}) but the count is empty",
                site.location,
                group_type.as_str()
            ));
        }
    }

    messages
        .into_iter()
        .map(|message| Finding::of(FindingKind::EmptyValue, message))
        .collect()
}

fn inverted_ranges(subject: &str, location: &Location, attributes: &Attributes<'_>) -> Vec<String> {
    let mut messages = Vec::new();

    for (name, range) in &attributes.dates {
        let Some(op) = range.op().and_then(|op| range_op(name, op, location)) else {
            continue;
        };
        if !op.needs_extent() {
            continue;
        }
        match range.dates() {
            Some((start, end)) if start > end => messages.push(format!(
                "{subject}: {name} start date {start} is greater than end date {end}"
            )),
            Some(_) => {}
            None if range.value().is_some() && range.extent().is_some() => {
                log::debug!("{name} at {location}: dates do not parse, range not compared");
            }
            None => {}
        }
    }

    for (name, range) in &attributes.numbers {
        let Some(op) = range.op().and_then(|op| range_op(name, op, location)) else {
            continue;
        };
        if let (true, Some(start), Some(end)) = (op.needs_extent(), range.value, range.extent) {
            if start > end {
                messages.push(format!(
                    "{subject}: {name} start value {start} is greater than end value {end}"
                ));
            }
        }
    }

    messages
}

/// Between ranges whose start lies after their end, and an inverted censor window
pub fn contradictory(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut messages = Vec::new();

    for site in ctx.index.criteria() {
        messages.extend(inverted_ranges(
            &describe(site),
            &site.location,
            &site.criteria.attributes(),
        ));
    }

    for site in ctx.index.demographics() {
        let subject = format!("Demographic criteria at {}", site.location);
        messages.extend(inverted_ranges(&subject, &site.location, &site.demographic.attributes()));
    }

    if let Some((start, end)) = ctx.expression.censor_window.as_ref().and_then(|w| w.dates()) {
        if start > end {
            messages.push(format!(
                "Censor window start date {start} is greater than end date {end}"
            ));
        }
    }

    messages
        .into_iter()
        .map(|message| Finding::of(FindingKind::ContradictoryRange, message))
        .collect()
}
