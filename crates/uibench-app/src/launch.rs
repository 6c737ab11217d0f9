//! Harness launch URLs.

use anyhow::Context;
use tracing::debug;
use uibench_types::{ConfigFile, LaunchOptions};

/// Query parameters a harness window reads on startup, in the order they are appended.
pub fn launch_query(options: &LaunchOptions) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("report", "true".to_string()),
        ("i", options.iterations.to_string()),
    ];
    if options.disable_scu {
        query.push(("disableSCU", "true".to_string()));
    }
    if options.enable_dom_recycling {
        query.push(("enableDOMRecycling", "true".to_string()));
    }
    if options.mobile_mode {
        query.push(("mobile", "true".to_string()));
    }
    if let Some(filter) = options.test_filter.as_deref().filter(|f| !f.is_empty()) {
        query.push(("filter", filter.to_string()));
    }
    query
}

/// Append the launch query to `base`, keeping whatever query it already has.
pub fn launch_url(base: &str, options: &LaunchOptions) -> anyhow::Result<String> {
    let mut url = url::Url::parse(base).with_context(|| format!("invalid benchmark url {base:?}"))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in launch_query(options) {
            pairs.append_pair(key, &value);
        }
    }
    Ok(url.into())
}

/// One harness window to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub name: String,
    pub url: String,
}

pub struct LaunchUseCase;

impl LaunchUseCase {
    /// Launch URL for every contestant in `config`, or just for `custom_url` when one is
    /// given.
    pub fn plan(
        config: &ConfigFile,
        options: &LaunchOptions,
        custom_url: Option<&str>,
    ) -> anyhow::Result<Vec<LaunchRequest>> {
        if let Some(custom) = custom_url {
            return Ok(vec![LaunchRequest {
                name: "custom".to_string(),
                url: launch_url(custom, options)?,
            }]);
        }

        config
            .contestants
            .iter()
            .map(|contestant| -> anyhow::Result<LaunchRequest> {
                let url = launch_url(&contestant.benchmark_url, options)
                    .with_context(|| format!("contestant {:?}", contestant.name))?;
                debug!(name = %contestant.name, %url, "planned launch");
                Ok(LaunchRequest {
                    name: contestant.name.clone(),
                    url,
                })
            })
            .collect()
    }
}
