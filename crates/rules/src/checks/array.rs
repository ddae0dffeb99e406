//! `arrayof:` element checks.

use super::{CheckResult, Failure, Layer, Messages, Subject, dispatch};
use crate::directive::Element;

/// Applies `element` to every item of the array at `depth`.
///
/// `arrayof:optional` and `arrayof:nullable` only mark the depth as
/// tolerating `undefined`/`null` items for the `arrayof:` directives that
/// follow. Item failures are collected across the whole array, labelled
/// `label[index]`.
pub(crate) fn check(
    element: &Element,
    subject: Subject<'_>,
    layers: &mut Vec<Layer>,
    depth: usize,
) -> CheckResult {
    subject.require()?;
    let Some(items) = subject.value.as_array() else {
        return Err(subject.fail("must be a valid array"));
    };

    if layers.len() <= depth {
        layers.resize(depth + 1, Layer::default());
    }
    let check = match element {
        Element::Optional => {
            layers[depth].allow_undefined = true;
            return Ok(());
        }
        Element::Nullable => {
            layers[depth].allow_null = true;
            return Ok(());
        }
        Element::Check(check) => check,
        Element::Ignored(_) => return Ok(()),
    };

    let layer = layers[depth];
    let mut messages = Messages::new();
    for (index, item) in items.iter().enumerate() {
        if layer.skips(item) {
            continue;
        }
        let label = format!("{}[{index}]", subject.label);
        let item = Subject::new(item, &label, subject.quotes);
        match dispatch(check, item, &layer.declared, layers, depth + 1) {
            Ok(()) => {}
            Err(Failure::Invalid(found)) => messages.extend(found),
            Err(fault @ Failure::Fault(_)) => return Err(fault),
        }
    }
    layers[depth].declared.record(check);

    if messages.is_empty() {
        Ok(())
    } else {
        Err(Failure::Invalid(messages))
    }
}
