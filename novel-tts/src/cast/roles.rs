//! Role extraction: ask the oracle for the cast of the whole text.

use log::info;

use super::Role;
use crate::error::Result;
use crate::oracle::{Oracle, parse_list};

/// Identify the speaking roles in `text`.
///
/// Oracle failures propagate unchanged; there is no partial result.
pub async fn extract_roles(oracle: &Oracle, system_prompt: &str, text: &str) -> Result<Vec<Role>> {
    let raw = oracle.complete_json(system_prompt, text).await?;
    let roles: Vec<Role> = parse_list(&raw, "role extraction", "roles")?;

    info!("Identified {} roles", roles.len());
    Ok(roles)
}
