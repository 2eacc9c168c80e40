//! Platform service factory
//!
//! Creates platform services based on configuration.

use crate::auth::get_github_auth;
use crate::error::Result;
use crate::platform::{GitHubService, PlatformService};
use crate::types::PlatformConfig;

/// Create a platform service from configuration
///
/// An explicit token is used as-is; otherwise the usual GitHub credential
/// sources are consulted (see [`get_github_auth`]).
pub async fn create_platform_service(
    config: &PlatformConfig,
    token: Option<&str>,
) -> Result<Box<dyn PlatformService>> {
    let auth = get_github_auth(token).await?;
    Ok(Box::new(GitHubService::new(
        &auth.token,
        config.owner.clone(),
        config.repo.clone(),
        config.host.clone(),
    )?))
}
