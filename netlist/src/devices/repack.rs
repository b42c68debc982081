//! Packaging variants: the same behavior under a different pin
//! arrangement.
//!
//! A [`Repackaged`] model owns an inner model and a pin map, and
//! nothing else.  Levels flow in through the map, writes flow back
//! out through it, delays pass through untouched: for equivalent
//! input sequences the variant produces bit-identical output
//! sequences to the inner type.  This is the one place a device
//! legitimately inherits all behavior, replacing only pin identity.
use logic::Level;

use crate::device::{Model, PinLayout, Reaction};
use crate::error::ConfigError;

pub struct Repackaged {
    type_name: String,
    inner: Box<dyn Model>,
    layout: PinLayout,
    /// Outer input index to inner input index.
    input_to_inner: Vec<usize>,
    /// Inner output index to outer output index.
    output_to_outer: Vec<usize>,
    inner_input_count: usize,
}

fn build_map(
    inner_names: &[String],
    map: &[(&str, &str)],
) -> Result<(Vec<String>, Vec<usize>), ConfigError> {
    let mut outer_names: Vec<String> = Vec::with_capacity(map.len());
    let mut to_inner: Vec<usize> = Vec::with_capacity(map.len());
    let mut used = vec![false; inner_names.len()];
    for (outer, inner) in map {
        let index = match inner_names.iter().position(|name| name == inner) {
            Some(index) => index,
            None => {
                return Err(ConfigError::RepackUnknownPin {
                    pin: inner.to_string(),
                });
            }
        };
        if used[index] {
            return Err(ConfigError::RepackUnknownPin {
                pin: inner.to_string(),
            });
        }
        used[index] = true;
        outer_names.push(outer.to_string());
        to_inner.push(index);
    }
    if let Some(index) = used.iter().position(|mapped| !mapped) {
        return Err(ConfigError::RepackIncomplete {
            pin: inner_names[index].clone(),
        });
    }
    Ok((outer_names, to_inner))
}

impl Repackaged {
    /// Wraps `inner` under new pin names.  `inputs` and `outputs` are
    /// `(new name, inner name)` pairs in the variant's declared
    /// order; every inner pin must be mapped exactly once.
    pub fn new(
        type_name: &str,
        inner: Box<dyn Model>,
        inputs: &[(&str, &str)],
        outputs: &[(&str, &str)],
    ) -> Result<Repackaged, ConfigError> {
        let inner_layout = inner.layout();
        let (input_names, input_to_inner) = build_map(&inner_layout.inputs, inputs)?;
        let (output_names, output_map) = build_map(&inner_layout.outputs, outputs)?;
        // Invert the output map: writes come back keyed by inner
        // index.
        let mut output_to_outer = vec![0usize; output_map.len()];
        for (outer, inner_index) in output_map.iter().enumerate() {
            output_to_outer[*inner_index] = outer;
        }
        Ok(Repackaged {
            type_name: type_name.to_string(),
            inner,
            layout: PinLayout {
                inputs: input_names,
                outputs: output_names,
            },
            input_to_inner,
            output_to_outer,
            inner_input_count: inner_layout.inputs.len(),
        })
    }

    fn remap_inputs(&self, inputs: &[Level]) -> Vec<Level> {
        let mut inner_inputs = vec![Level::Undefined; self.inner_input_count];
        for (outer, inner_index) in self.input_to_inner.iter().enumerate() {
            inner_inputs[*inner_index] = inputs[outer];
        }
        inner_inputs
    }
}

impl Model for Repackaged {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn layout(&self) -> PinLayout {
        self.layout.clone()
    }

    fn react(&mut self, inputs: &[Level], outcome: &mut Reaction) {
        let inner_inputs = self.remap_inputs(inputs);
        let mut inner_outcome = Reaction::default();
        self.inner.react(&inner_inputs, &mut inner_outcome);
        for (output, level, delay) in inner_outcome.take_writes() {
            outcome.drive(self.output_to_outer[output], level, delay);
        }
    }

    fn skip_input_change(&self, inputs: &[Level], changed: usize) -> bool {
        let inner_inputs = self.remap_inputs(inputs);
        self.inner
            .skip_input_change(&inner_inputs, self.input_to_inner[changed])
    }
}

impl std::fmt::Debug for Repackaged {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repackaged")
            .field("type", &self.type_name)
            .field("inner", &self.inner.type_name())
            .finish_non_exhaustive()
    }
}
