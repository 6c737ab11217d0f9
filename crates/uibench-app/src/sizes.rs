//! Contestant bundle sizes.

use tracing::warn;
use uibench_adapters::BundleProbe;
use uibench_types::Contestant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSize {
    pub name: String,

    /// Total over every bundle location. `None` when any probe failed or the contestant
    /// lists no bundles.
    pub bytes: Option<u64>,
}

impl BundleSize {
    /// `"<n> bytes"`, or nothing when the size is zero or unknown.
    pub fn display(&self) -> Option<String> {
        match self.bytes {
            Some(n) if n > 0 => Some(format!("{n} bytes")),
            _ => None,
        }
    }
}

pub struct BundleSizeUseCase<P: BundleProbe> {
    probe: P,
}

impl<P: BundleProbe> BundleSizeUseCase<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    pub fn execute(&self, contestants: &[Contestant]) -> Vec<BundleSize> {
        contestants
            .iter()
            .map(|c| BundleSize {
                name: c.name.clone(),
                bytes: self.contestant_bytes(c),
            })
            .collect()
    }

    fn contestant_bytes(&self, contestant: &Contestant) -> Option<u64> {
        let locations = contestant.bundle_url.to_vec();
        if locations.is_empty() {
            return None;
        }

        let mut total = 0u64;
        for location in locations {
            match self.probe.bundle_len(location) {
                Ok(n) => total = total.saturating_add(n),
                Err(err) => {
                    warn!(
                        contestant = %contestant.name,
                        location,
                        error = %err,
                        "bundle size unavailable"
                    );
                    return None;
                }
            }
        }
        Some(total)
    }
}
