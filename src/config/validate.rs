// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, ReswatchError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ReswatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.group))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_groups(cfg)?;
    validate_global_config(cfg)?;
    validate_resources(cfg)?;
    validate_group_references(cfg)?;
    validate_reference_graph(cfg)?;
    Ok(())
}

fn ensure_has_groups(cfg: &RawConfigFile) -> Result<()> {
    if cfg.group.is_empty() {
        return Err(ReswatchError::Config(
            "model must contain at least one [group.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.update_period_secs == 0 {
        return Err(ReswatchError::Config(
            "[config].update_period_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_resources(cfg: &RawConfigFile) -> Result<()> {
    for (name, group) in cfg.group.iter() {
        if group.resources.iter().any(|r| r.uri.trim().is_empty()) {
            return Err(ReswatchError::Config(format!(
                "group '{}' contains a resource with an empty uri",
                name
            )));
        }
    }
    Ok(())
}

fn validate_group_references(cfg: &RawConfigFile) -> Result<()> {
    for (name, group) in cfg.group.iter() {
        for referenced in group.groups.iter() {
            if referenced == name {
                return Err(ReswatchError::Config(format!(
                    "group '{}' cannot reference itself in `groups`",
                    name
                )));
            }
            if !cfg.group.contains_key(referenced) {
                return Err(ReswatchError::Config(format!(
                    "group '{}' references unknown group '{}' in `groups`",
                    name, referenced
                )));
            }
        }
    }
    Ok(())
}

fn validate_reference_graph(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: referenced -> referencing.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.group.keys() {
        graph.add_node(name.as_str());
    }

    for (name, group) in cfg.group.iter() {
        for referenced in group.groups.iter() {
            graph.add_edge(referenced.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(ReswatchError::GroupCycle(format!(
            "cycle detected in group references involving group '{}'",
            cycle.node_id()
        ))),
    }
}
