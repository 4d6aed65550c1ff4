//! Structural validation of a loaded configuration.
//!
//! Checks that need no property store run here, before any component is
//! built. Component-specific requirements (detent counts, mandatory tables,
//! filter coefficients) are checked when the component is constructed.

use std::collections::{HashMap, HashSet};

use fcs_props::{component_property_name, normalize};

use crate::schema::{ChannelDef, ComponentDef, FcsConfig, ParamDef, SystemDef};

/// Newest configuration version this crate reads.
pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Property '{property}' is written by both '{first}' and '{second}'")]
    DuplicateOutput {
        property: String,
        first: String,
        second: String,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_config(config: &FcsConfig) -> Result<(), ValidationError> {
    if config.version == 0 || config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    if !config.dt.is_finite() || config.dt <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "dt".to_string(),
            value: config.dt.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }

    let mut component_names = HashSet::new();
    let mut producers: HashMap<String, String> = HashMap::new();
    for system in config.systems() {
        validate_system(system, &mut component_names, &mut producers)?;
    }

    Ok(())
}

fn validate_system(
    system: &SystemDef,
    component_names: &mut HashSet<String>,
    producers: &mut HashMap<String, String>,
) -> Result<(), ValidationError> {
    let mut channel_names = HashSet::new();
    for channel in &system.channels {
        if !channel_names.insert(&channel.name) {
            return Err(ValidationError::DuplicateName {
                name: channel.name.clone(),
                context: format!("system '{}' channels", system.name),
            });
        }
        validate_channel(channel)?;

        for component in &channel.components {
            if !component_names.insert(normalize(&component.name)) {
                return Err(ValidationError::DuplicateName {
                    name: component.name.clone(),
                    context: format!("channel '{}' components", channel.name),
                });
            }
            validate_component(component)?;

            let own = component_property_name(&component.name);
            let outputs = component.outputs.iter().map(|o| normalize(o));
            for property in std::iter::once(own).chain(outputs) {
                if let Some(first) = producers.get(&property) {
                    if first != &component.name {
                        return Err(ValidationError::DuplicateOutput {
                            property,
                            first: first.clone(),
                            second: component.name.clone(),
                        });
                    }
                    continue;
                }
                producers.insert(property, component.name.clone());
            }
        }
    }
    Ok(())
}

fn validate_channel(channel: &ChannelDef) -> Result<(), ValidationError> {
    if channel.rate == 0 {
        return Err(ValidationError::InvalidValue {
            field: format!("channel '{}' rate", channel.name),
            value: channel.rate.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if let Some(execute) = &channel.execute
        && normalize(execute).is_empty()
    {
        return Err(ValidationError::InvalidValue {
            field: format!("channel '{}' execute", channel.name),
            value: execute.clone(),
            reason: "must name a property".to_string(),
        });
    }
    Ok(())
}

fn validate_component(component: &ComponentDef) -> Result<(), ValidationError> {
    if normalize(&component.name).is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "component name".to_string(),
            value: component.name.clone(),
            reason: "must not be empty".to_string(),
        });
    }

    for input in &component.inputs {
        if input.trim().trim_start_matches('-').is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("component '{}' input", component.name),
                value: input.clone(),
                reason: "must name a property".to_string(),
            });
        }
    }

    for output in &component.outputs {
        if normalize(output).is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("component '{}' output", component.name),
                value: output.clone(),
                reason: "must name a property".to_string(),
            });
        }
    }

    if let Some(delay) = &component.delay
        && (!delay.value.is_finite() || delay.value < 0.0)
    {
        return Err(ValidationError::InvalidValue {
            field: format!("component '{}' delay", component.name),
            value: delay.value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }

    if let Some(clip) = &component.clipto
        && let (Some(ParamDef::Value(min)), Some(ParamDef::Value(max))) = (&clip.min, &clip.max)
        && max < min
    {
        return Err(ValidationError::InvalidValue {
            field: format!("component '{}' clipto", component.name),
            value: format!("[{min}, {max}]"),
            reason: "max is below min".to_string(),
        });
    }

    Ok(())
}
