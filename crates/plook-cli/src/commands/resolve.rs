//! `plook resolve`: print the candidate URLs of a file without fetching it

use plook_config::PlookToml;
use plook_core::error::PlookResult;
use plook_core::types::CandidateUrl;

use super::{build_plook, CommandContext};

pub async fn execute(
    package: &str,
    version: &str,
    file: &str,
    config: &PlookToml,
    ctx: &CommandContext,
) -> PlookResult<[CandidateUrl; 2]> {
    let plook = build_plook(config)?;

    match plook.find_urls(package, version, file).await {
        Ok(candidates) => {
            for candidate in &candidates {
                ctx.output.line(candidate.as_str());
            }
            Ok(candidates)
        }
        Err(error) => {
            ctx.output.error(&ctx.errors.format_error(&error));
            Err(error)
        }
    }
}
