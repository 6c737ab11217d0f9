#![no_main]

use libfuzzer_sys::fuzz_target;
use uibench_types::LaunchOptions;

fuzz_target!(|data: &str| {
    if let Ok(config) = uibench_app::load_config(data) {
        for contestant in &config.contestants {
            let _ = contestant.bundle_url.to_vec();
            let _ = uibench_app::launch_url(&contestant.benchmark_url, &config.defaults);
        }
        let _ = uibench_app::launch_query(&LaunchOptions::default());
    }
});
