use std::path::Path;

use anyhow::bail;
use indoc::indoc;

use crate::Config;

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Startup invariants. A configuration that fails here must halt the
/// process before serving begins.
pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    if config.auth.clients.is_empty() {
        bail!(indoc! {r#"
            No clients registered. Datagate requires at least one registered client to function.

            Example configuration:

              [auth.clients]
              demo_client_id_123 = "demo_secret_xyz789"
        "#});
    }

    if config.rate_limits.max_requests == 0 {
        bail!("rate_limits.max_requests must be greater than zero");
    }

    if config.rate_limits.window.is_zero() {
        bail!("rate_limits.window must be greater than zero");
    }

    if config.backend.project_id.is_empty() {
        bail!("backend.project_id must be set");
    }

    if config.backend.request_timeout.is_zero() {
        bail!("backend.request_timeout must be greater than zero");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use insta::assert_snapshot;

    use crate::Config;

    fn parse(input: &str) -> Config {
        toml::from_str(input).unwrap()
    }

    const MINIMAL: &str = indoc! {r#"
        [auth.clients]
        demo_client_id_123 = "demo_secret_xyz789"

        [backend]
        project_id = "acme-analytics"
        access_token = "token"
    "#};

    #[test]
    fn minimal_config_validates() {
        let config = parse(MINIMAL);
        assert!(super::validate(&config).is_ok());
    }

    #[test]
    fn empty_roster_is_fatal() {
        let config = parse("");
        let error = super::validate(&config).unwrap_err().to_string();

        assert_snapshot!(error, @r#"
        No clients registered. Datagate requires at least one registered client to function.

        Example configuration:

          [auth.clients]
          demo_client_id_123 = "demo_secret_xyz789"
        "#);
    }

    #[test]
    fn zero_request_quota_is_fatal() {
        let config = parse(indoc! {r#"
            [auth.clients]
            demo_client_id_123 = "demo_secret_xyz789"

            [rate_limits]
            max_requests = 0
        "#});

        let error = super::validate(&config).unwrap_err().to_string();
        assert_snapshot!(error, @"rate_limits.max_requests must be greater than zero");
    }

    #[test]
    fn missing_project_is_fatal() {
        let config = parse(indoc! {r#"
            [auth.clients]
            demo_client_id_123 = "demo_secret_xyz789"
        "#});

        let error = super::validate(&config).unwrap_err().to_string();
        assert_snapshot!(error, @"backend.project_id must be set");
    }
}
